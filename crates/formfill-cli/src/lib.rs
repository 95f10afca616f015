//! Formfill CLI library
//!
//! Picks the next open Saturday, fills the event registration form for it,
//! then submits, previews or saves a draft. Handlers take their prompts and
//! today's date as arguments so whole runs can be scripted in tests.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod ledger;
pub mod logging;
pub mod menu;
mod output;
pub mod schedule;

pub use commands::{
    ActionArg, CheckArgs, Cli, ColorArg, Commands, DataArgs, LedgerArgs, RunArgs, SlotArgs,
    DEFAULT_DATA,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use handlers::{execute_check, execute_run, execute_slot, RunOutcome};
pub use ledger::{Ledger, DEFAULT_LEDGER};
pub use menu::{parse_choice, Prompter};
pub use output::Reporter;
pub use schedule::{next_open_slot, next_saturday, parse_date, Slot};
