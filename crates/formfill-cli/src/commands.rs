//! CLI command definitions using clap

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use formfill::SubmitAction;
use std::path::PathBuf;

use crate::ledger::DEFAULT_LEDGER;
use crate::schedule::parse_date;

/// Default form data file
pub const DEFAULT_DATA: &str = "config.yml";

/// Formfill: fill the event registration form for the next open Saturday
#[derive(Parser, Debug)]
#[command(name = "formfill")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fill the form for the next open slot and optionally submit it
    Run(RunArgs),

    /// Print the next open slot
    Slot(SlotArgs),

    /// Check that the form data loads
    Check(CheckArgs),
}

/// Where the form data comes from
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Form data (YAML mapping of record fields)
    #[arg(long, env = "FORMFILL_DATA", default_value = DEFAULT_DATA)]
    pub data: PathBuf,

    /// HTML file whose contents replace `about_html`
    #[arg(long, env = "FORMFILL_ABOUT")]
    pub about: Option<PathBuf>,
}

/// Ledger location
#[derive(Args, Debug, Clone)]
pub struct LedgerArgs {
    /// Submitted-dates file (JSON list)
    #[arg(long, env = "FORMFILL_LEDGER", default_value = DEFAULT_LEDGER)]
    pub ledger: PathBuf,

    /// Use this date instead of the next open Saturday (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
}

/// Arguments for the run command
#[derive(Args, Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub ledger: LedgerArgs,

    /// Form address
    #[arg(long, env = "FORM_URL")]
    pub form_url: Option<String>,

    /// Browser profile directory (keeps the login session)
    #[arg(long, env = "BROWSER_PROFILE_PATH")]
    pub profile: Option<PathBuf>,

    /// Chrome/Chromium binary
    #[arg(long, env = "BROWSER_BIN_PATH")]
    pub browser_bin: Option<PathBuf>,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Disable the Chrome sandbox
    #[arg(long)]
    pub no_sandbox: bool,

    /// Timing overrides (YAML: wait, retry, labeled)
    #[arg(long)]
    pub timing: Option<PathBuf>,

    /// How long to wait for the form to render, in milliseconds
    #[arg(long, default_value = "30000")]
    pub load_timeout: u64,

    /// Action after filling; prompts when unset
    #[arg(long, value_enum)]
    pub action: Option<ActionArg>,

    /// Answer yes to every confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Fill an in-memory replica of the form instead of a browser
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the slot command
#[derive(Args, Debug, Clone)]
pub struct SlotArgs {
    #[command(flatten)]
    pub ledger: LedgerArgs,

    /// Compute from this day instead of today (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub today: Option<NaiveDate>,
}

/// Arguments for the check command
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Also validate a timing file
    #[arg(long)]
    pub timing: Option<PathBuf>,
}

/// Post-fill action
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionArg {
    /// Submit for approval
    Submit,
    /// Preview the response
    Preview,
    /// Save as draft
    SaveDraft,
    /// Leave the form as filled
    Skip,
}

impl ActionArg {
    /// The action to dispatch, if any
    #[must_use]
    pub const fn action(self) -> Option<SubmitAction> {
        match self {
            Self::Submit => Some(SubmitAction::Submit),
            Self::Preview => Some(SubmitAction::Preview),
            Self::SaveDraft => Some(SubmitAction::SaveDraft),
            Self::Skip => None,
        }
    }
}

/// Color choice argument
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
