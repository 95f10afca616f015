//! Slot command handler

use chrono::NaiveDate;
use std::io::Write;

use crate::commands::SlotArgs;
use crate::error::CliResult;
use crate::ledger::Ledger;
use crate::schedule::{next_open_slot, Slot};

/// The slot a run would pick: `--date` when given, else the next open Saturday
pub fn pick_slot(ledger: &Ledger, date: Option<NaiveDate>, today: NaiveDate) -> Slot {
    date.map_or_else(|| next_open_slot(today, ledger.dates()), Slot::on)
}

/// Print the slot a run would pick
pub fn execute_slot(args: &SlotArgs, today: NaiveDate, out: &mut impl Write) -> CliResult<Slot> {
    let ledger = Ledger::load(&args.ledger.ledger)?;
    let slot = pick_slot(&ledger, args.ledger.date, args.today.unwrap_or(today));
    writeln!(out, "Start: {}", slot.start_str())?;
    writeln!(out, "End:   {}", slot.end_str())?;
    Ok(slot)
}
