//! Terminal output: status lines and the fill spinner

use console::{Style, Term};
use formfill::FillReport;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Status reporter writing to stderr
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    spinner: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Reporter {
    /// Create a new reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            spinner: None,
            use_color,
            quiet,
        }
    }

    /// Spin while a long step runs
    pub fn start_spinner(&mut self, message: &str) {
        if self.quiet || !self.term.is_term() {
            return;
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(120));
        self.spinner = Some(spinner);
    }

    /// Stop the spinner, if any
    pub fn finish_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.line(self.prefix("✓", "OK", Style::new().green().bold()), message);
    }

    /// Print a failure message, even in quiet mode
    pub fn failure(&self, message: &str) {
        self.line(self.prefix("✗", "FAIL", Style::new().red().bold()), message);
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.line(
            self.prefix("⚠", "WARN", Style::new().yellow().bold()),
            message,
        );
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.line(
            self.prefix("ℹ", "INFO", Style::new().blue().bold()),
            message,
        );
    }

    /// Print a fill summary; per-step timings when `detailed`
    pub fn fill_summary(&self, report: &FillReport, detailed: bool) {
        if self.quiet {
            return;
        }
        if detailed {
            for step in &report.steps {
                let _ = self.term.write_line(&format!(
                    "  {:>2}. {:<60} {:>6.2}s",
                    step.index + 1,
                    step.step,
                    step.elapsed.as_secs_f64()
                ));
            }
        }
        let secs = report.elapsed().as_secs_f64();
        let message = match report.agreed() {
            Some(boxes) => format!(
                "Filled {} steps in {secs:.1}s ({boxes} terms boxes ticked)",
                report.len()
            ),
            None => format!("Filled {} steps in {secs:.1}s", report.len()),
        };
        self.success(&message);
    }

    fn prefix(&self, symbol: &str, plain: &str, color: Style) -> String {
        if self.use_color {
            color.apply_to(symbol).to_string()
        } else {
            plain.to_string()
        }
    }

    fn line(&self, prefix: String, message: &str) {
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use formfill::StepRecord;

    fn report() -> FillReport {
        FillReport {
            steps: vec![StepRecord {
                index: 0,
                step: "select 'Host'".into(),
                actions: 1,
                elapsed: Duration::from_millis(40),
            }],
        }
    }

    #[test]
    fn test_default_reporter() {
        let reporter = Reporter::default();
        assert!(reporter.use_color);
        assert!(!reporter.quiet);
    }

    #[test]
    fn test_messages_without_color() {
        let reporter = Reporter::new(false, false);
        reporter.success("filled");
        reporter.failure("failed");
        reporter.warning("slow");
        reporter.info("note");
        reporter.fill_summary(&report(), true);
    }

    #[test]
    fn test_prefixes() {
        let plain = Reporter::new(false, false);
        assert_eq!(plain.prefix("✓", "OK", Style::new()), "OK");
        let colored = Reporter::new(true, false);
        assert!(colored.prefix("✓", "OK", Style::new()).contains('✓'));
    }

    #[test]
    fn test_spinner_lifecycle() {
        let mut reporter = Reporter::new(false, false);
        reporter.start_spinner("Filling form");
        reporter.finish_spinner();
        assert!(reporter.spinner.is_none());
    }

    #[test]
    fn test_quiet_mode_suppresses_output() {
        let mut reporter = Reporter::new(false, true);
        reporter.start_spinner("hidden");
        assert!(reporter.spinner.is_none());
        reporter.success("hidden");
        reporter.failure("shown");
    }
}
