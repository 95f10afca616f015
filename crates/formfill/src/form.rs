//! The event registration form as a fixed, ordered schema.
//!
//! [`SCHEMA`] lists every step in the order the form renders its fields.
//! [`FormFiller::fill`] walks it once against a page and a record; the first
//! failing step ends the fill.

use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, instrument};

use crate::config::FillConfig;
use crate::fill::{FieldFiller, TextMatch};
use crate::locator::Page;
use crate::record::{EventFormRecord, Field, ListField};
use crate::result::{FormError, FormResult};

/// Label text of a text field and how it is matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    /// Text shown next to the field
    pub text: &'static str,
    /// Comparison used to find it
    pub matching: TextMatch,
}

impl Label {
    /// Match labels containing `text`
    #[must_use]
    pub const fn contains(text: &'static str) -> Self {
        Self {
            text,
            matching: TextMatch::Contains,
        }
    }

    /// Match labels whose normalized text is `text`
    #[must_use]
    pub const fn exact(text: &'static str) -> Self {
        Self {
            text,
            matching: TextMatch::Exact,
        }
    }
}

/// One entry of the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStep {
    /// Plain text input
    Text {
        /// Field label
        label: Label,
        /// Value source
        field: Field,
    },
    /// Rich editor filled with raw HTML
    RichText {
        /// Field label
        label: &'static str,
        /// Value source
        field: Field,
    },
    /// Chosen dropdown, one option
    Select {
        /// Field label
        label: &'static str,
        /// Value source
        field: Field,
    },
    /// Chosen dropdown, one selection per list element
    SelectEach {
        /// Field label
        label: &'static str,
        /// Value source
        field: ListField,
    },
    /// Input whose `aria-label` is the record value, under a question label
    LabeledClick {
        /// Question label
        label: &'static str,
        /// Value source
        field: Field,
    },
    /// Start and end date/time pickers
    Times {
        /// Start value
        start: Field,
        /// End value
        end: Field,
    },
    /// File input accepting `extension`
    File {
        /// Accepted extension, e.g. `.jpg`
        extension: &'static str,
        /// Path source
        field: Field,
    },
    /// Every terms checkbox
    AgreeAll,
}

impl fmt::Display for FillStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text { label, .. } => write!(f, "text '{}'", label.text),
            Self::RichText { label, .. } => write!(f, "rich text '{label}'"),
            Self::Select { label, .. } => write!(f, "select '{label}'"),
            Self::SelectEach { label, .. } => write!(f, "select each '{label}'"),
            Self::LabeledClick { label, .. } => write!(f, "click '{label}'"),
            Self::Times { .. } => f.write_str("start/end times"),
            Self::File { extension, .. } => write!(f, "file {extension}"),
            Self::AgreeAll => f.write_str("agree to terms"),
        }
    }
}

const fn text(label: &'static str, field: Field) -> FillStep {
    FillStep::Text {
        label: Label::contains(label),
        field,
    }
}

const fn exact(label: &'static str, field: Field) -> FillStep {
    FillStep::Text {
        label: Label::exact(label),
        field,
    }
}

const fn click(label: &'static str, field: Field) -> FillStep {
    FillStep::LabeledClick { label, field }
}

const fn select(label: &'static str, field: Field) -> FillStep {
    FillStep::Select { label, field }
}

/// The registration form, in render order
pub const SCHEMA: &[FillStep] = &[
    select("Host", Field::Host),
    FillStep::RichText {
        label: "About the event",
        field: Field::AboutHtml,
    },
    text("Event Name", Field::EventName),
    FillStep::Times {
        start: Field::StartTime,
        end: Field::EndTime,
    },
    text("Event Location", Field::Location),
    click("Is this a virtual event?", Field::IsVirtual),
    click(
        "Is this event being held on campus or off campus?",
        Field::OnOrOffCampus,
    ),
    FillStep::File {
        extension: ".jpg",
        field: Field::CoverImageFilePath,
    },
    FillStep::SelectEach {
        label: "Tags",
        field: ListField::Tags,
    },
    FillStep::RichText {
        label: "Event Notes",
        field: Field::EventNotesHtml,
    },
    exact("Budget", Field::Budget),
    exact("Cost", Field::Cost),
    exact("Attendance Goal", Field::AttendanceGoal),
    click(
        "Department/Office/Program or a Recognized Student Organization?",
        Field::EventCreatorSource,
    ),
    text("Contact Person", Field::ContactPerson),
    text("Contact Email", Field::ContactEmail),
    text("Primary Phone Number", Field::ContactPhone),
    text("RSVP Link", Field::RsvpLink),
    click(
        "Where will payment for expenses come from?",
        Field::PaymentExpensesSource,
    ),
    text("Agency Account Number", Field::AgencyAccountNumber),
    click("Will you be hiring/paying a speaker", Field::HiredSpeaker),
    click("Will your event be AFTER 2:00", Field::After2pmOrWeekend),
    click(
        "Will you need to access the space before your event?",
        Field::NeedAccessBeforehand,
    ),
    text(
        "What is the estimated attendance for your event?",
        Field::EstimatedAttendance,
    ),
    click(
        "Are you the person In charge of planning/managing this event for your organization?",
        Field::IsSubmitterInCharge,
    ),
    click(
        "Are you collaborating/partnering with other student organizations",
        Field::IsMultiOrgCollab,
    ),
    click(
        "Does the event have content that is religious",
        Field::IsReligious,
    ),
    click("Will money be exchanged", Field::IsMoneyExchanged),
    click(
        "students, faculty or staff, will your event guests, participants, vendors, etc. need to park on campus?",
        Field::IsParkingNeeded,
    ),
    click(
        "Do you plan to serve food at your event?",
        Field::IsServingFood,
    ),
    click(
        "Do you plan to have alcohol be served/consumed during this event?",
        Field::IsServingAlcohol,
    ),
    click(
        "Is this event being held inside or outside?",
        Field::InsideOrOutside,
    ),
    select(
        "What facility/space do you want to reserve",
        Field::FacilityOrSpace,
    ),
    select("What space/room are you requesting", Field::RequestedRoom),
    text(
        "If you don't see the room you want, write it in here.",
        Field::RoomIfUnlisted,
    ),
    select(
        "Please select the space setup needed for your event",
        Field::RequestedSetup,
    ),
    click(
        "Do you need any additional equipment available from Conference Services?",
        Field::NeedAdditionalEquipment,
    ),
    FillStep::AgreeAll,
];

/// A completed schema step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    /// Position in [`SCHEMA`]
    pub index: usize,
    /// Step description
    pub step: String,
    /// Widget interactions performed (selections or checkboxes for multi-target steps)
    pub actions: usize,
    /// Wall time spent on the step
    pub elapsed: Duration,
}

/// Outcome of a full fill
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    /// Completed steps, in order
    pub steps: Vec<StepRecord>,
}

impl FillReport {
    /// Number of completed steps
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True if no step ran
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Total wall time
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.steps.iter().map(|s| s.elapsed).sum()
    }

    /// Checkboxes ticked by the terms step, if it ran
    #[must_use]
    pub fn agreed(&self) -> Option<usize> {
        self.steps
            .iter()
            .zip(SCHEMA)
            .find(|(_, step)| matches!(step, FillStep::AgreeAll))
            .map(|(record, _)| record.actions)
    }
}

/// Runs [`SCHEMA`] against a page
#[derive(Debug, Clone, Copy, Default)]
pub struct FormFiller {
    config: FillConfig,
}

impl FormFiller {
    /// Create a form filler
    #[must_use]
    pub const fn new(config: FillConfig) -> Self {
        Self { config }
    }

    /// Timing configuration in use
    #[must_use]
    pub const fn config(&self) -> &FillConfig {
        &self.config
    }

    /// Fill every schema step in order.
    ///
    /// # Errors
    ///
    /// The first failing step aborts the fill with [`FormError::StepFailed`]
    /// wrapping its cause. Steps already performed are not undone.
    #[instrument(name = "fill_form", skip_all, fields(event = %record.event_name))]
    pub fn fill<P: Page>(&self, page: &P, record: &EventFormRecord) -> FormResult<FillReport> {
        let filler = FieldFiller::new(page, &self.config);
        let mut report = FillReport::default();
        for (index, step) in SCHEMA.iter().enumerate() {
            let started = Instant::now();
            let actions =
                run_step(&filler, step, record).map_err(|source| FormError::StepFailed {
                    index,
                    step: step.to_string(),
                    source: Box::new(source),
                })?;
            report.steps.push(StepRecord {
                index,
                step: step.to_string(),
                actions,
                elapsed: started.elapsed(),
            });
        }
        info!(target: "formfill::form", steps = report.len(), "Form filled");
        Ok(report)
    }
}

fn run_step<P: Page>(
    filler: &FieldFiller<'_, P>,
    step: &FillStep,
    record: &EventFormRecord,
) -> FormResult<usize> {
    match *step {
        FillStep::Text { label, field } => {
            filler.text(label.text, label.matching, record.text(field))?;
        }
        FillStep::RichText { label, field } => filler.rich_text(label, record.text(field))?,
        FillStep::Select { label, field } => filler.select(label, record.text(field))?,
        FillStep::SelectEach { label, field } => {
            let values = record.list(field);
            for value in values {
                filler.select(label, value)?;
            }
            return Ok(values.len());
        }
        FillStep::LabeledClick { label, field } => {
            filler.click_labeled(label, record.text(field))?;
        }
        FillStep::Times { start, end } => filler.times(record.text(start), record.text(end))?,
        FillStep::File { extension, field } => {
            filler.file(extension, Path::new(record.text(field)))?;
        }
        FillStep::AgreeAll => return filler.agree_all(),
    }
    Ok(1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::mock::{event_form, event_form_with, FormQuirks, Interaction};
    use crate::record::tests::SAMPLE;
    use crate::record::Overrides;

    fn sample() -> EventFormRecord {
        EventFormRecord::from_yaml_str(SAMPLE, &Overrides::new()).unwrap()
    }

    mod schema_tests {
        use super::*;

        #[test]
        fn test_starts_with_host_and_ends_with_terms() {
            assert_eq!(SCHEMA.len(), 38);
            assert_eq!(SCHEMA[0], select("Host", Field::Host));
            assert_eq!(SCHEMA.last(), Some(&FillStep::AgreeAll));
            assert_eq!(
                SCHEMA
                    .iter()
                    .filter(|s| matches!(s, FillStep::AgreeAll))
                    .count(),
                1
            );
        }

        #[test]
        fn test_money_labels_match_exactly() {
            let exact: Vec<&str> = SCHEMA
                .iter()
                .filter_map(|s| match s {
                    FillStep::Text { label, .. } if label.matching == TextMatch::Exact => {
                        Some(label.text)
                    }
                    _ => None,
                })
                .collect();
            assert_eq!(exact, ["Budget", "Cost", "Attendance Goal"]);
        }

        #[test]
        fn test_agency_account_is_not_filled() {
            let reads_agency_account = SCHEMA.iter().any(|s| {
                matches!(
                    s,
                    FillStep::Text { field: Field::AgencyAccount, .. }
                        | FillStep::LabeledClick { field: Field::AgencyAccount, .. }
                )
            });
            assert!(!reads_agency_account);
        }

        #[test]
        fn test_step_display() {
            assert_eq!(SCHEMA[0].to_string(), "select 'Host'");
            assert_eq!(SCHEMA[3].to_string(), "start/end times");
            assert_eq!(SCHEMA[7].to_string(), "file .jpg");
        }
    }

    mod fill_tests {
        use super::*;

        #[test]
        fn test_complete_form_fills_in_order() {
            let record = sample();
            let form = event_form(&record);
            let report = FormFiller::new(FillConfig::fast())
                .fill(&form.page, &record)
                .unwrap();

            assert_eq!(report.len(), SCHEMA.len());
            assert!(report.steps.iter().enumerate().all(|(n, s)| s.index == n));
            assert_eq!(report.agreed(), Some(2));
            assert_eq!(form.page.obscured_clicks(), 0);
            assert_eq!(form.unmet(), Vec::<String>::new());
        }

        #[test]
        fn test_literals_land_in_inputs() {
            let record = sample();
            let form = event_form(&record);
            FormFiller::new(FillConfig::fast())
                .fill(&form.page, &record)
                .unwrap();
            assert_eq!(
                form.value_of(Field::EventName).as_deref(),
                Some("Weekly Meetup")
            );
            assert_eq!(
                form.value_of(Field::AboutHtml).as_deref(),
                Some("<p>About</p>")
            );
            assert_eq!(form.value_of(Field::Budget).as_deref(), Some("0"));
            assert_eq!(
                form.value_of(Field::StartTime).as_deref(),
                Some("2026-10-17 15:45")
            );
            assert!(form.was_clicked(Field::IsVirtual));
            assert!(form.was_clicked(Field::OnOrOffCampus));
        }

        #[test]
        fn test_each_tag_selected_in_order() {
            let mut record = sample();
            record.tags = vec!["A".into(), "B".into(), "C".into()];
            let form = event_form(&record);
            let report = FormFiller::new(FillConfig::fast())
                .fill(&form.page, &record)
                .unwrap();

            let order: Vec<usize> = form
                .page
                .log()
                .into_iter()
                .filter_map(|i| match i {
                    Interaction::Click(id) => form.tag_rows.iter().position(|&row| row == id),
                    _ => None,
                })
                .collect();
            assert_eq!(order, [0, 1, 2]);
            assert_eq!(report.steps[8].actions, 3);
        }

        #[test]
        fn test_no_tags_selects_nothing() {
            let mut record = sample();
            record.tags.clear();
            let form = event_form(&record);
            let report = FormFiller::new(FillConfig::fast())
                .fill(&form.page, &record)
                .unwrap();
            assert_eq!(report.steps[8].actions, 0);
        }

        #[test]
        fn test_intercepted_clicks_recovered() {
            let record = sample();
            let form = event_form_with(&record, FormQuirks::default().with_obscured_options(1));
            FormFiller::new(FillConfig::fast())
                .fill(&form.page, &record)
                .unwrap();
            assert!(form.page.obscured_clicks() > 0);
            assert_eq!(form.unmet(), Vec::<String>::new());
        }

        #[test]
        fn test_late_reveal_is_waited_for() {
            let record = sample();
            let form = event_form_with(
                &record,
                FormQuirks::default().with_reveal_after(Duration::from_millis(30)),
            );
            FormFiller::new(FillConfig::fast())
                .fill(&form.page, &record)
                .unwrap();
            assert_eq!(form.unmet(), Vec::<String>::new());
        }

        #[test]
        fn test_refill_overwrites() {
            let record = sample();
            let form = event_form(&record);
            let filler = FormFiller::new(FillConfig::fast());
            filler.fill(&form.page, &record).unwrap();
            filler.fill(&form.page, &record).unwrap();
            assert_eq!(
                form.value_of(Field::EventName).as_deref(),
                Some("Weekly Meetup")
            );
            assert_eq!(
                form.value_of(Field::EventNotesHtml).as_deref(),
                Some("<p>Notes</p>")
            );
        }
    }

    mod failure_tests {
        use super::*;

        #[test]
        fn test_first_failure_aborts() {
            let record = sample();
            let form = event_form(&record);
            let mut other = record.clone();
            other.host = "Drama Club".into();

            let err = FormFiller::new(FillConfig::fast())
                .fill(&form.page, &other)
                .unwrap_err();
            match &err {
                FormError::StepFailed { index, step, source } => {
                    assert_eq!(*index, 0);
                    assert_eq!(step, "select 'Host'");
                    assert!(matches!(**source, FormError::NotReady { .. }));
                }
                other => panic!("unexpected error: {other}"),
            }
            assert!(matches!(err.root_cause(), FormError::NotReady { .. }));
            assert_eq!(form.value_of(Field::EventName).as_deref(), Some(""));
        }

        #[test]
        fn test_failure_index_points_at_step() {
            let record = sample();
            let form = event_form(&record);
            let mut other = record.clone();
            other.is_virtual = "Maybe".into();

            let err = FormFiller::new(FillConfig::fast())
                .fill(&form.page, &other)
                .unwrap_err();
            let FormError::StepFailed { index, .. } = err else {
                panic!("expected StepFailed");
            };
            assert_eq!(
                SCHEMA[index],
                click("Is this a virtual event?", Field::IsVirtual)
            );
            assert_eq!(
                form.value_of(Field::Location).as_deref(),
                Some("Student Center")
            );
        }
    }
}
