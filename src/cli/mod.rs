//! The `harness` command-line interface.
//!
//! Maps arguments to a [`HarnessConfig`](crate::config::HarnessConfig), runs
//! the requested mode and turns the result into the process exit status:
//! 0 when every case (or the single addressed case) passed, 1 otherwise.

use std::process::ExitCode;

use clap::Parser;

use crate::cli::args::HarnessArgs;
use crate::harness::Harness;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() -> ExitCode {
    let args = match HarnessArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            // help and version are requests, not failures
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    run_with(&args)
}

pub fn run_with(args: &HarnessArgs) -> ExitCode {
    let harness = match Harness::new(args.config()) {
        Ok(harness) => harness,
        Err(e) => {
            output::print_fatal(e);
            return ExitCode::FAILURE;
        }
    };

    let mut reporter = output::stdout_reporter(args.color, args.verbose);
    let outcome = match args.case {
        Some(index) => harness.run_one(index, &mut reporter),
        None => harness
            .run_all(&mut reporter)
            .map(|stats| stats.all_passed()),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            output::print_fatal(e);
            ExitCode::FAILURE
        }
    }
}
