//! Run command handler.
//!
//! Picks the slot, confirms it, fills the form (a live browser tab, or the
//! in-memory replica with `--dry-run`), dispatches the chosen action and, after
//! a confirmed submission, records the date in the ledger. A failing fill
//! aborts the run before the menu and leaves the ledger alone.

use chrono::NaiveDate;
use formfill::{
    dispatch, mock, wait_for_form, EventFormRecord, FillReport, FormFiller, Overrides, Page,
    SubmitAction, Waiter,
};
use std::io::{BufRead, Write};
use tracing::{info, warn};

use super::slot::pick_slot;
use super::{load_record, load_timing};
use crate::commands::{ActionArg, RunArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::ledger::Ledger;
use crate::menu::Prompter;
use crate::output::Reporter;
use crate::schedule::Slot;

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// The proposed slot was declined
    Declined,
    /// Filling was declined; the form was left as loaded
    NotFilled {
        /// Slot that was confirmed
        slot: Slot,
    },
    /// The form was filled
    Filled {
        /// Slot the form was filled for
        slot: Slot,
        /// Per-step timings
        report: FillReport,
        /// Action dispatched afterwards, if any
        action: Option<SubmitAction>,
        /// Whether the date went into the ledger
        recorded: bool,
    },
}

/// Everything a fill needs once the slot is settled
#[derive(Debug)]
struct Plan {
    slot: Slot,
    record: EventFormRecord,
    filler: FormFiller,
    load: Waiter,
    action: Option<ActionArg>,
    detailed: bool,
}

/// Overrides placing the record on `slot`
#[must_use]
pub fn slot_overrides(slot: &Slot) -> Overrides {
    Overrides::from([
        ("start_time".to_string(), slot.start_str()),
        ("end_time".to_string(), slot.end_str()),
    ])
}

/// Execute the run command
pub fn execute_run<R: BufRead, W: Write>(
    args: &RunArgs,
    config: &CliConfig,
    today: NaiveDate,
    prompter: &mut Prompter<R, W>,
    reporter: &mut Reporter,
) -> CliResult<RunOutcome> {
    let url = target(args)?;
    let mut ledger = Ledger::load(&args.ledger.ledger)?;
    let slot = pick_slot(&ledger, args.ledger.date, today);
    if ledger.contains(&slot.date_key()) {
        reporter.warning(&format!(
            "{} is already recorded in {}",
            slot.date_key(),
            ledger.path().display()
        ));
    }

    prompter.show(&format!("Start: {}", slot.start_str()))?;
    prompter.show(&format!("End:   {}", slot.end_str()))?;
    if !prompter.confirm("Good?")? {
        prompter.show("exiting")?;
        return Ok(RunOutcome::Declined);
    }

    let timing = load_timing(args.timing.as_deref())?;
    let plan = Plan {
        slot,
        record: load_record(&args.data, slot_overrides(&slot))?,
        filler: FormFiller::new(timing),
        load: Waiter::new(timing.wait.with_timeout(args.load_timeout)),
        action: args.action,
        detailed: config.verbosity.is_verbose(),
    };
    info!(slot = %plan.slot, event = %plan.record.event_name, "Slot confirmed");

    match url {
        None => dry_run(&plan, &mut ledger, prompter, reporter),
        Some(url) => live(args, url, &plan, &mut ledger, prompter, reporter),
    }
}

/// The form address for a live run; `None` for a dry run
fn target(args: &RunArgs) -> CliResult<Option<&str>> {
    if args.dry_run {
        return Ok(None);
    }
    if cfg!(not(feature = "browser")) {
        return Err(CliError::config(
            "built without browser support; rerun with --dry-run",
        ));
    }
    args.form_url
        .as_deref()
        .filter(|url| !url.trim().is_empty())
        .map(Some)
        .ok_or_else(|| CliError::config("no form address; set FORM_URL or pass --form-url"))
}

fn dry_run<R: BufRead, W: Write>(
    plan: &Plan,
    ledger: &mut Ledger,
    prompter: &mut Prompter<R, W>,
    reporter: &mut Reporter,
) -> CliResult<RunOutcome> {
    reporter.info("Dry run: filling an in-memory replica of the form");
    let form = mock::event_form(&plan.record);
    let outcome = drive(&form.page, plan, ledger, prompter, reporter)?;
    if matches!(outcome, RunOutcome::Filled { .. }) {
        let unmet = form.unmet();
        if !unmet.is_empty() {
            warn!(?unmet, "Replica fields left unfilled");
            reporter.warning(&format!("{} replica fields left unfilled", unmet.len()));
        }
    }
    Ok(outcome)
}

#[cfg(feature = "browser")]
fn live<R: BufRead, W: Write>(
    args: &RunArgs,
    url: &str,
    plan: &Plan,
    ledger: &mut Ledger,
    prompter: &mut Prompter<R, W>,
    reporter: &mut Reporter,
) -> CliResult<RunOutcome> {
    let (session, page) = super::session::open_form(args, url)?;
    let outcome = drive(&page, plan, ledger, prompter, reporter);
    if let Err(e) = &outcome {
        reporter.failure(&e.to_string());
    }
    let paused = prompter.pause("Press Enter to close the browser...");
    let closed = session.close();
    let outcome = outcome?;
    paused?;
    closed?;
    Ok(outcome)
}

#[cfg(not(feature = "browser"))]
fn live<R: BufRead, W: Write>(
    _args: &RunArgs,
    _url: &str,
    _plan: &Plan,
    _ledger: &mut Ledger,
    _prompter: &mut Prompter<R, W>,
    _reporter: &mut Reporter,
) -> CliResult<RunOutcome> {
    Err(CliError::config(
        "built without browser support; rerun with --dry-run",
    ))
}

fn drive<P: Page, R: BufRead, W: Write>(
    page: &P,
    plan: &Plan,
    ledger: &mut Ledger,
    prompter: &mut Prompter<R, W>,
    reporter: &mut Reporter,
) -> CliResult<RunOutcome> {
    if !prompter.confirm("Automate filling out form now (without submitting)?")? {
        return Ok(RunOutcome::NotFilled { slot: plan.slot });
    }

    reporter.start_spinner("Waiting for the form to load");
    let loaded = wait_for_form(page, &plan.load);
    reporter.finish_spinner();
    loaded?;

    reporter.start_spinner("Filling form");
    let filled = plan.filler.fill(page, &plan.record);
    reporter.finish_spinner();
    let report = filled?;
    reporter.fill_summary(&report, plan.detailed);

    let chosen = match plan.action {
        Some(arg) => arg.action(),
        None => prompter.choose_action()?,
    };
    let action = match chosen {
        Some(action) => {
            let done = dispatch(page, action)?;
            reporter.success(done.caption());
            Some(done)
        }
        None => {
            reporter.info("No submission action taken");
            None
        }
    };

    let recorded = action == Some(SubmitAction::Submit) && prompter.confirm("Update dates?")?;
    if recorded {
        ledger.record(&plan.slot.date_key())?;
        reporter.success(&format!(
            "Recorded {} in {}",
            plan.slot.date_key(),
            ledger.path().display()
        ));
    }

    Ok(RunOutcome::Filled {
        slot: plan.slot,
        report,
        action,
        recorded,
    })
}
