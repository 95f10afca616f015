//! The data record one form submission is filled from.
//!
//! Records come from a YAML document plus caller overrides. Booleans become the
//! literal strings `"Yes"` / `"No"` (the labels the form's radio inputs carry)
//! and numbers become their decimal text before the record is built. Missing or
//! unknown keys fail construction; nothing downstream tolerates a partial
//! record.

use serde::{Deserialize, Serialize};
use serde_yaml_ng::{Mapping, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::result::{FormError, FormResult};

/// Every value the event registration form needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[allow(missing_docs)]
pub struct EventFormRecord {
    pub start_time: String,
    pub end_time: String,
    pub host: String,
    pub event_name: String,
    pub about_html: String,
    pub location: String,
    pub contact_person: String,
    pub is_virtual: String,
    pub tags: Vec<String>,
    pub contact_email: String,
    pub contact_phone: String,
    pub attendance_goal: String,
    pub need_access_beforehand: String,
    pub estimated_attendance: String,
    pub agency_account: String,
    pub after_2pm_or_weekend: String,
    pub hired_speaker: String,
    pub agency_account_number: String,
    pub payment_expenses_source: String,
    pub event_creator_source: String,
    pub is_submitter_in_charge: String,
    pub is_multi_org_collab: String,
    pub is_religious: String,
    pub is_money_exchanged: String,
    pub is_parking_needed: String,
    pub is_serving_food: String,
    pub is_serving_alcohol: String,
    pub inside_or_outside: String,
    pub facility_or_space: String,
    pub requested_room: String,
    pub room_if_unlisted: String,
    pub requested_setup: String,
    pub need_additional_equipment: String,
    pub event_notes_html: String,
    pub budget: String,
    pub cost: String,
    pub rsvp_link: String,
    pub cover_image_file_path: String,
    pub on_or_off_campus: String,
}

/// A single-valued record attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Field {
    StartTime,
    EndTime,
    Host,
    EventName,
    AboutHtml,
    Location,
    ContactPerson,
    IsVirtual,
    ContactEmail,
    ContactPhone,
    AttendanceGoal,
    NeedAccessBeforehand,
    EstimatedAttendance,
    AgencyAccount,
    After2pmOrWeekend,
    HiredSpeaker,
    AgencyAccountNumber,
    PaymentExpensesSource,
    EventCreatorSource,
    IsSubmitterInCharge,
    IsMultiOrgCollab,
    IsReligious,
    IsMoneyExchanged,
    IsParkingNeeded,
    IsServingFood,
    IsServingAlcohol,
    InsideOrOutside,
    FacilityOrSpace,
    RequestedRoom,
    RoomIfUnlisted,
    RequestedSetup,
    NeedAdditionalEquipment,
    EventNotesHtml,
    Budget,
    Cost,
    RsvpLink,
    CoverImageFilePath,
    OnOrOffCampus,
}

impl Field {
    /// The record key this field is read from
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::StartTime => "start_time",
            Self::EndTime => "end_time",
            Self::Host => "host",
            Self::EventName => "event_name",
            Self::AboutHtml => "about_html",
            Self::Location => "location",
            Self::ContactPerson => "contact_person",
            Self::IsVirtual => "is_virtual",
            Self::ContactEmail => "contact_email",
            Self::ContactPhone => "contact_phone",
            Self::AttendanceGoal => "attendance_goal",
            Self::NeedAccessBeforehand => "need_access_beforehand",
            Self::EstimatedAttendance => "estimated_attendance",
            Self::AgencyAccount => "agency_account",
            Self::After2pmOrWeekend => "after_2pm_or_weekend",
            Self::HiredSpeaker => "hired_speaker",
            Self::AgencyAccountNumber => "agency_account_number",
            Self::PaymentExpensesSource => "payment_expenses_source",
            Self::EventCreatorSource => "event_creator_source",
            Self::IsSubmitterInCharge => "is_submitter_in_charge",
            Self::IsMultiOrgCollab => "is_multi_org_collab",
            Self::IsReligious => "is_religious",
            Self::IsMoneyExchanged => "is_money_exchanged",
            Self::IsParkingNeeded => "is_parking_needed",
            Self::IsServingFood => "is_serving_food",
            Self::IsServingAlcohol => "is_serving_alcohol",
            Self::InsideOrOutside => "inside_or_outside",
            Self::FacilityOrSpace => "facility_or_space",
            Self::RequestedRoom => "requested_room",
            Self::RoomIfUnlisted => "room_if_unlisted",
            Self::RequestedSetup => "requested_setup",
            Self::NeedAdditionalEquipment => "need_additional_equipment",
            Self::EventNotesHtml => "event_notes_html",
            Self::Budget => "budget",
            Self::Cost => "cost",
            Self::RsvpLink => "rsvp_link",
            Self::CoverImageFilePath => "cover_image_file_path",
            Self::OnOrOffCampus => "on_or_off_campus",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A list-valued record attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListField {
    /// Event tags, one dropdown selection each
    Tags,
}

impl ListField {
    /// The record key this field is read from
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Tags => "tags",
        }
    }
}

/// Values layered over the loaded document, keyed by record field name
pub type Overrides = BTreeMap<String, String>;

impl EventFormRecord {
    /// Value of a single-valued field
    #[must_use]
    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::StartTime => &self.start_time,
            Field::EndTime => &self.end_time,
            Field::Host => &self.host,
            Field::EventName => &self.event_name,
            Field::AboutHtml => &self.about_html,
            Field::Location => &self.location,
            Field::ContactPerson => &self.contact_person,
            Field::IsVirtual => &self.is_virtual,
            Field::ContactEmail => &self.contact_email,
            Field::ContactPhone => &self.contact_phone,
            Field::AttendanceGoal => &self.attendance_goal,
            Field::NeedAccessBeforehand => &self.need_access_beforehand,
            Field::EstimatedAttendance => &self.estimated_attendance,
            Field::AgencyAccount => &self.agency_account,
            Field::After2pmOrWeekend => &self.after_2pm_or_weekend,
            Field::HiredSpeaker => &self.hired_speaker,
            Field::AgencyAccountNumber => &self.agency_account_number,
            Field::PaymentExpensesSource => &self.payment_expenses_source,
            Field::EventCreatorSource => &self.event_creator_source,
            Field::IsSubmitterInCharge => &self.is_submitter_in_charge,
            Field::IsMultiOrgCollab => &self.is_multi_org_collab,
            Field::IsReligious => &self.is_religious,
            Field::IsMoneyExchanged => &self.is_money_exchanged,
            Field::IsParkingNeeded => &self.is_parking_needed,
            Field::IsServingFood => &self.is_serving_food,
            Field::IsServingAlcohol => &self.is_serving_alcohol,
            Field::InsideOrOutside => &self.inside_or_outside,
            Field::FacilityOrSpace => &self.facility_or_space,
            Field::RequestedRoom => &self.requested_room,
            Field::RoomIfUnlisted => &self.room_if_unlisted,
            Field::RequestedSetup => &self.requested_setup,
            Field::NeedAdditionalEquipment => &self.need_additional_equipment,
            Field::EventNotesHtml => &self.event_notes_html,
            Field::Budget => &self.budget,
            Field::Cost => &self.cost,
            Field::RsvpLink => &self.rsvp_link,
            Field::CoverImageFilePath => &self.cover_image_file_path,
            Field::OnOrOffCampus => &self.on_or_off_campus,
        }
    }

    /// Values of a list-valued field, in order
    #[must_use]
    pub fn list(&self, field: ListField) -> &[String] {
        match field {
            ListField::Tags => &self.tags,
        }
    }

    /// Build a record from a YAML document with `overrides` applied on top
    pub fn from_yaml_str(source: &str, overrides: &Overrides) -> FormResult<Self> {
        let document: Value = serde_yaml_ng::from_str(source)?;
        let mut mapping = match document {
            Value::Mapping(mapping) => mapping,
            Value::Null => Mapping::new(),
            other => {
                return Err(FormError::record(format!(
                    "expected a mapping at the top level, found {}",
                    kind(&other)
                )))
            }
        };
        for (key, value) in overrides {
            let _ = mapping.insert(Value::String(key.clone()), Value::String(value.clone()));
        }
        let normalized = Value::Mapping(
            mapping
                .into_iter()
                .map(|(k, v)| (k, normalize(v)))
                .collect(),
        );
        serde_yaml_ng::from_value(normalized).map_err(|e| FormError::record(e.to_string()))
    }

    /// Read and build a record from a YAML file
    pub fn from_yaml_file(path: &Path, overrides: &Overrides) -> FormResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&source, overrides)
    }
}

fn normalize(value: Value) -> Value {
    match value {
        Value::Bool(b) => Value::String(if b { "Yes" } else { "No" }.to_string()),
        Value::Number(n) => Value::String(n.to_string()),
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(normalize).collect()),
        other => other,
    }
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) mod tests {
    use super::*;

    /// A complete document with placeholder values; booleans left as YAML booleans
    pub(crate) const SAMPLE: &str = r#"
start_time: "2026-10-17 15:45"
end_time: "2026-10-17 18:45"
host: Chess Club
event_name: Weekly Meetup
about_html: "<p>About</p>"
location: Student Center
contact_person: Jordan Lee
is_virtual: false
tags: [Music]
contact_email: club@example.edu
contact_phone: 555-0100
attendance_goal: 20
need_access_beforehand: false
estimated_attendance: 20
agency_account: none
after_2pm_or_weekend: true
hired_speaker: false
agency_account_number: "000123"
payment_expenses_source: No expenses
event_creator_source: Recognized Student Organization
is_submitter_in_charge: true
is_multi_org_collab: false
is_religious: false
is_money_exchanged: false
is_parking_needed: false
is_serving_food: false
is_serving_alcohol: false
inside_or_outside: Inside
facility_or_space: Student Center
requested_room: Room 101
room_if_unlisted: n/a
requested_setup: Classroom
need_additional_equipment: false
event_notes_html: "<p>Notes</p>"
budget: 0
cost: 0
rsvp_link: https://example.edu/rsvp
cover_image_file_path: cover.jpg
on_or_off_campus: On Campus
"#;

    #[test]
    fn test_booleans_become_yes_no() {
        let record = EventFormRecord::from_yaml_str(SAMPLE, &Overrides::new()).unwrap();
        assert_eq!(record.is_virtual, "No");
        assert_eq!(record.after_2pm_or_weekend, "Yes");
    }

    #[test]
    fn test_numbers_become_strings() {
        let record = EventFormRecord::from_yaml_str(SAMPLE, &Overrides::new()).unwrap();
        assert_eq!(record.budget, "0");
        assert_eq!(record.attendance_goal, "20");
        assert_eq!(record.agency_account_number, "000123");
    }

    #[test]
    fn test_overrides_win() {
        let mut overrides = Overrides::new();
        let _ = overrides.insert("start_time".into(), "2026-10-24 15:45".into());
        let _ = overrides.insert("about_html".into(), "<h1>Hi</h1>".into());
        let record = EventFormRecord::from_yaml_str(SAMPLE, &overrides).unwrap();
        assert_eq!(record.start_time, "2026-10-24 15:45");
        assert_eq!(record.about_html, "<h1>Hi</h1>");
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let partial = SAMPLE.replace("host: Chess Club\n", "");
        let err = EventFormRecord::from_yaml_str(&partial, &Overrides::new()).unwrap_err();
        assert!(err.to_string().contains("host"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let extra = format!("{SAMPLE}mascot: owl\n");
        assert!(EventFormRecord::from_yaml_str(&extra, &Overrides::new()).is_err());
    }

    #[test]
    fn test_null_is_rejected() {
        let nulled = SAMPLE.replace("location: Student Center", "location: ~");
        assert!(EventFormRecord::from_yaml_str(&nulled, &Overrides::new()).is_err());
    }

    #[test]
    fn test_top_level_must_be_mapping() {
        let err = EventFormRecord::from_yaml_str("- a\n- b\n", &Overrides::new()).unwrap_err();
        assert!(err.to_string().contains("sequence"));
    }

    #[test]
    fn test_field_lookup_matches_key() {
        let record = EventFormRecord::from_yaml_str(SAMPLE, &Overrides::new()).unwrap();
        assert_eq!(record.text(Field::Host), "Chess Club");
        assert_eq!(Field::Host.key(), "host");
        assert_eq!(record.list(ListField::Tags), ["Music".to_string()]);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, SAMPLE).unwrap();
        let record = EventFormRecord::from_yaml_file(&path, &Overrides::new()).unwrap();
        assert_eq!(record.event_name, "Weekly Meetup");
    }
}
