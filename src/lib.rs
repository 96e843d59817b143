//! Golden-file test harness.
//!
//! Runs an external binary against every case under a root directory and
//! compares its stdout and stderr with recorded `.outp` and `.error` files.
//!
//! ```rust,no_run
//! use golden_harness::{Harness, HarnessConfig, Reporter};
//! use termcolor::{ColorChoice, StandardStream};
//!
//! let harness = Harness::new(HarnessConfig::new("./parser")).unwrap();
//! let mut reporter = Reporter::new(StandardStream::stdout(ColorChoice::Auto), false);
//! let stats = harness.run_all(&mut reporter).unwrap();
//! if !stats.all_passed() {
//!     std::process::exit(1);
//! }
//! ```

pub mod cli;
pub mod compare;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod harness;
pub mod report;
pub mod runner;
pub mod stats;

pub use crate::compare::ComparisonMode;
pub use crate::config::HarnessConfig;
pub use crate::errors::{HarnessError, HarnessResult};
pub use crate::harness::{CaseRun, Harness};
pub use crate::report::Reporter;
pub use crate::runner::{execute, ExecutionResult, Outcome, TIMEOUT_MESSAGE};
pub use crate::stats::{RunStatistics, Verdict};
