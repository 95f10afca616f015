//! Check command handler

use formfill::{FillConfig, Overrides, SCHEMA};
use std::io::Write;

use super::{load_record, load_timing};
use crate::commands::CheckArgs;
use crate::error::CliResult;

/// Validate the record (and timing file, when given) without filling anything
pub fn execute_check(args: &CheckArgs, out: &mut impl Write) -> CliResult<FillConfig> {
    let record = load_record(&args.data, Overrides::new())?;
    let timing = load_timing(args.timing.as_deref())?;
    writeln!(
        out,
        "{}: '{}' hosted by {} ({} steps, {} tags)",
        args.data.data.display(),
        record.event_name,
        record.host,
        SCHEMA.len(),
        record.tags.len()
    )?;
    Ok(timing)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::handlers::tests::data_args;
    use tempfile::TempDir;

    #[test]
    fn test_fixture_passes() {
        let args = CheckArgs {
            data: data_args(None),
            timing: None,
        };
        let mut out = Vec::new();
        let _ = execute_check(&args, &mut out).unwrap();
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("'Weekly Meetup' hosted by Chess Club"));
    }

    #[test]
    fn test_unknown_key_fails() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("event.yml");
        let mut source = std::fs::read_to_string(data_args(None).data).unwrap();
        source.push_str("mascot: Knight\n");
        std::fs::write(&data, source).unwrap();

        let mut args = CheckArgs {
            data: data_args(None),
            timing: None,
        };
        args.data.data = data;
        assert!(execute_check(&args, &mut Vec::new()).is_err());
    }

    #[test]
    fn test_bad_timing_fails() {
        let dir = TempDir::new().unwrap();
        let timing = dir.path().join("timing.yml");
        std::fs::write(&timing, "wait: [1, 2]\n").unwrap();
        let args = CheckArgs {
            data: data_args(None),
            timing: Some(timing),
        };
        assert!(execute_check(&args, &mut Vec::new()).is_err());
    }
}
