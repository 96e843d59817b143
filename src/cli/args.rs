//! Command-line arguments for the `harness` binary.
//!
//! Two positionals, the binary under test and an optional case number, plus
//! switches that fill in the rest of [`HarnessConfig`].

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::compare::ComparisonMode;
use crate::config::{HarnessConfig, DEFAULT_CASES_ROOT};

#[derive(Debug, Parser)]
#[command(
    name = "harness",
    version,
    about = "Runs a binary against golden stdout/stderr files.",
    after_help = "Without a test number every case is run and summarized.\n\
                  With a test number only that case is run and its output is shown side by side."
)]
pub struct HarnessArgs {
    /// Path to the binary under test.
    #[arg(value_name = "PATH-TO-BINARY")]
    pub binary: PathBuf,

    /// Run only this case (numbered as in the full run) and show detailed output.
    #[arg(value_name = "TEST-NUMBER")]
    pub case: Option<usize>,

    /// Directory containing one subdirectory per module.
    #[arg(long, value_name = "DIR", default_value = DEFAULT_CASES_ROOT)]
    pub cases: PathBuf,

    /// Milliseconds a case may run before it is treated as an infinite loop.
    #[arg(long, value_name = "MS", default_value_t = 2000)]
    pub timeout_ms: u64,

    /// Only check whether `syntax error` was reported on stderr when expected.
    #[arg(long)]
    pub syntax_only: bool,

    /// Print one line per case with its timing instead of progress markers.
    #[arg(short, long)]
    pub verbose: bool,

    /// Stop at the first failing case.
    #[arg(long)]
    pub exit_on_fail: bool,

    /// When to color the output.
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Color when stdout is a terminal.
    Auto,
    Always,
    Never,
}

impl HarnessArgs {
    pub fn config(&self) -> HarnessConfig {
        HarnessConfig {
            binary: self.binary.clone(),
            cases_root: self.cases.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
            mode: if self.syntax_only {
                ComparisonMode::SyntaxOnly
            } else {
                ComparisonMode::Exact
            },
            verbose: self.verbose,
            exit_on_fail: self.exit_on_fail,
        }
    }
}
