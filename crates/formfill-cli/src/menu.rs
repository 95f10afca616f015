//! Interactive prompts: confirmations and the submission menu.

use formfill::SubmitAction;
use std::io::{BufRead, Write};

use crate::error::CliResult;

/// Map a menu answer to an action; anything unrecognized skips
#[must_use]
pub fn parse_choice(line: &str) -> Option<SubmitAction> {
    match line.trim() {
        "1" => Some(SubmitAction::Submit),
        "2" => Some(SubmitAction::Preview),
        "3" => Some(SubmitAction::SaveDraft),
        _ => None,
    }
}

/// Line-oriented prompts over any reader and writer
#[derive(Debug)]
pub struct Prompter<R, W> {
    input: R,
    output: W,
    assume_yes: bool,
}

impl Prompter<std::io::StdinLock<'static>, std::io::Stdout> {
    /// Prompt on the terminal
    #[must_use]
    pub fn stdio(assume_yes: bool) -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout(), assume_yes)
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// Prompt over `input` and `output`
    pub const fn new(input: R, output: W, assume_yes: bool) -> Self {
        Self {
            input,
            output,
            assume_yes,
        }
    }

    /// Print a line to the prompt output
    pub fn show(&mut self, line: &str) -> CliResult<()> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    /// Yes/no question defaulting to yes. Always yes when auto-confirming.
    pub fn confirm(&mut self, question: &str) -> CliResult<bool> {
        if self.assume_yes {
            writeln!(self.output, "{question} [Y/n] y")?;
            return Ok(true);
        }
        write!(self.output, "{question} [Y/n] ")?;
        self.output.flush()?;
        let answer = self.read_line()?;
        let answer = answer.trim().to_lowercase();
        Ok(answer.is_empty() || answer == "y" || answer == "yes")
    }

    /// Show the submission menu and read a choice; blank skips
    pub fn choose_action(&mut self) -> CliResult<Option<SubmitAction>> {
        writeln!(self.output)?;
        writeln!(self.output, "Submission Actions:")?;
        writeln!(self.output)?;
        for (n, action) in SubmitAction::ALL.iter().enumerate() {
            writeln!(self.output, "{}. {}", n + 1, action.caption())?;
        }
        writeln!(self.output)?;
        write!(self.output, "Choice (leave blank to skip): ")?;
        self.output.flush()?;
        Ok(parse_choice(&self.read_line()?))
    }

    /// Wait for Enter, also when auto-confirming. End of input returns.
    pub fn pause(&mut self, message: &str) -> CliResult<()> {
        write!(self.output, "{message}")?;
        self.output.flush()?;
        let _ = self.read_line()?;
        Ok(())
    }

    /// Give back the reader and writer
    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }

    fn read_line(&mut self) -> CliResult<String> {
        let mut line = String::new();
        let _ = self.input.read_line(&mut line)?;
        Ok(line)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn prompter(input: &str) -> Prompter<&[u8], Vec<u8>> {
        Prompter::new(input.as_bytes(), Vec::new(), false)
    }

    mod choice_tests {
        use super::*;

        #[test]
        fn test_numbers_map_to_actions() {
            assert_eq!(parse_choice("1"), Some(SubmitAction::Submit));
            assert_eq!(parse_choice(" 2\n"), Some(SubmitAction::Preview));
            assert_eq!(parse_choice("3"), Some(SubmitAction::SaveDraft));
        }

        #[test]
        fn test_blank_or_other_skips() {
            assert_eq!(parse_choice(""), None);
            assert_eq!(parse_choice("\n"), None);
            assert_eq!(parse_choice("4"), None);
            assert_eq!(parse_choice("submit"), None);
        }

        #[test]
        fn test_menu_lists_actions_in_order() {
            let mut p = prompter("3\n");
            assert_eq!(p.choose_action().unwrap(), Some(SubmitAction::SaveDraft));
            let shown = String::from_utf8(p.output).unwrap();
            let submit = shown.find("1. Submit for approval").unwrap();
            let preview = shown.find("2. Preview Response").unwrap();
            let draft = shown.find("3. Save as Draft").unwrap();
            assert!(submit < preview && preview < draft);
        }
    }

    mod confirm_tests {
        use super::*;

        #[test]
        fn test_blank_means_yes() {
            assert!(prompter("\n").confirm("Good?").unwrap());
            assert!(prompter("Y\n").confirm("Good?").unwrap());
        }

        #[test]
        fn test_anything_else_means_no() {
            assert!(!prompter("n\n").confirm("Good?").unwrap());
            assert!(!prompter("nope\n").confirm("Good?").unwrap());
        }

        #[test]
        fn test_assume_yes_confirms_without_reading() {
            let mut p = Prompter::new("n\n".as_bytes(), Vec::new(), true);
            assert!(p.confirm("Update dates?").unwrap());
            let mut rest = String::new();
            let _ = p.input.read_line(&mut rest).unwrap();
            assert_eq!(rest, "n\n");
        }

        #[test]
        fn test_pause_waits_even_when_auto_confirming() {
            let mut p = Prompter::new("\nleft\n".as_bytes(), Vec::new(), true);
            p.pause("Press Enter to close the browser...").unwrap();
            let mut rest = String::new();
            let _ = p.input.read_line(&mut rest).unwrap();
            assert_eq!(rest, "left\n");
            let (_, shown) = p.into_parts();
            assert_eq!(
                String::from_utf8(shown).unwrap(),
                "Press Enter to close the browser..."
            );
        }

        #[test]
        fn test_show_writes_line() {
            let mut p = prompter("");
            p.show("exiting").unwrap();
            assert_eq!(String::from_utf8(p.output).unwrap(), "exiting\n");
        }

        #[test]
        fn test_end_of_input_is_yes() {
            assert!(prompter("").confirm("Good?").unwrap());
        }
    }
}
