//! Terminal plumbing for the CLI: stream and color selection, fatal errors.

use miette::Report;
use termcolor::{ColorChoice, StandardStream};

use crate::cli::args::ColorMode;
use crate::errors::HarnessError;
use crate::report::Reporter;

/// Resolves `--color`; `auto` means color only when stdout is a terminal.
pub fn color_choice(mode: ColorMode) -> ColorChoice {
    match mode {
        ColorMode::Always => ColorChoice::Always,
        ColorMode::Never => ColorChoice::Never,
        ColorMode::Auto if atty::is(atty::Stream::Stdout) => ColorChoice::Auto,
        ColorMode::Auto => ColorChoice::Never,
    }
}

pub fn stdout_reporter(mode: ColorMode, verbose: bool) -> Reporter<StandardStream> {
    Reporter::new(StandardStream::stdout(color_choice(mode)), verbose)
}

/// Renders an error that ends the run on stderr.
pub fn print_fatal(err: HarnessError) {
    eprintln!("{:?}", Report::new(err));
}
