//! Run configuration shared by the driver and the reporter.

use std::path::PathBuf;
use std::time::Duration;

use crate::compare::ComparisonMode;

/// Directory searched for modules when `--cases` is not given.
pub const DEFAULT_CASES_ROOT: &str = "cases";

/// How long a case may run before the watchdog kills it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Configuration for test execution and reporting.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub binary: PathBuf,
    pub cases_root: PathBuf,
    pub timeout: Duration,
    pub mode: ComparisonMode,
    /// One line per case with timings instead of progress markers.
    pub verbose: bool,
    /// Stop the run at the first failing case.
    pub exit_on_fail: bool,
}

impl HarnessConfig {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            ..Self::default()
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::new(),
            cases_root: PathBuf::from(DEFAULT_CASES_ROOT),
            timeout: DEFAULT_TIMEOUT,
            mode: ComparisonMode::Exact,
            verbose: false,
            exit_on_fail: false,
        }
    }
}
