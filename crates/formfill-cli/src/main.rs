//! Formfill CLI: fill the event registration form for the next open Saturday
//!
//! ## Usage
//!
//! ```bash
//! formfill slot                          # Show the next open slot
//! formfill check --data config.yml       # Validate form data
//! formfill run                           # Fill, then pick an action
//! formfill run --dry-run --yes           # Fill the in-memory replica
//! ```

use chrono::Local;
use clap::Parser;
use formfill_cli::{
    execute_check, execute_run, execute_slot, logging, Cli, CliConfig, CliResult, ColorChoice,
    Commands, Prompter, Reporter, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    logging::init(&config);
    let today = Local::now().date_naive();

    match cli.command {
        Commands::Run(args) => {
            let config = config.with_assume_yes(args.yes);
            let mut prompter = Prompter::stdio(config.assume_yes);
            let mut reporter =
                Reporter::new(config.color.should_color(), config.verbosity.is_quiet());
            let _ = execute_run(&args, &config, today, &mut prompter, &mut reporter)?;
            Ok(())
        }
        Commands::Slot(args) => {
            let _ = execute_slot(&args, today, &mut std::io::stdout())?;
            Ok(())
        }
        Commands::Check(args) => {
            let _ = execute_check(&args, &mut std::io::stdout())?;
            Ok(())
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
        .with_log_json(cli.log_json)
}
