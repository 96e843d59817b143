//! The driver: discovers the suite, then runs cases one at a time and feeds
//! each verdict to the statistics and the reporter.
//!
//! A run moves through `Discovering → Running(i) → … → Reporting → Done`.
//! [`Harness::new`] covers discovery, so no case can start before the whole
//! suite is known and its numbering fixed.

use std::fs;
use std::time::Duration;

use termcolor::WriteColor;
use tracing::warn;

use crate::compare::OutputPair;
use crate::config::HarnessConfig;
use crate::discovery::{discover, Suite, TestCase};
use crate::errors::{HarnessError, HarnessResult};
use crate::report::Reporter;
use crate::runner::{execute, ExecutionResult};
use crate::stats::{ModuleTally, RunStatistics, Verdict};

/// Everything known about one executed case.
#[derive(Debug)]
pub struct CaseRun {
    pub verdict: Verdict,
    /// `None` when the binary could not be launched.
    pub execution: Option<ExecutionResult>,
    pub expected_stdout: Vec<u8>,
    pub expected_stderr: Vec<u8>,
    /// Why the case failed without a comparison, if it did.
    pub error: Option<HarnessError>,
}

impl CaseRun {
    pub fn index(&self) -> usize {
        self.verdict.index
    }

    pub fn passed(&self) -> bool {
        self.verdict.passed
    }

    pub fn elapsed(&self) -> Duration {
        self.execution
            .as_ref()
            .map_or(Duration::ZERO, |result| result.elapsed)
    }
}

pub struct Harness {
    config: HarnessConfig,
    suite: Suite,
}

impl Harness {
    /// Discovers the suite under `config.cases_root`.
    pub fn new(config: HarnessConfig) -> HarnessResult<Self> {
        let suite = discover(&config.cases_root)?;
        Ok(Self { config, suite })
    }

    pub fn suite(&self) -> &Suite {
        &self.suite
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Runs and verifies a single case. Never fails: every problem becomes a
    /// failed verdict carrying the error.
    pub fn run_case(&self, index: usize, case: &TestCase) -> CaseRun {
        let expected = case
            .read_expected_stdout()
            .and_then(|stdout| Ok((stdout, case.read_expected_stderr()?)));
        let execution = execute(&self.config.binary, &case.input, self.config.timeout);

        let (expected_stdout, expected_stderr, expected_error) = match expected {
            Ok((stdout, stderr)) => (stdout, stderr, None),
            Err(err) => (Vec::new(), Vec::new(), Some(err)),
        };
        let (execution, error) = match execution {
            Ok(result) => (Some(result), expected_error),
            Err(err) => {
                warn!(case = %case.input.display(), error = %err, "case could not be executed");
                (None, Some(err))
            }
        };

        let passed = error.is_none()
            && execution.as_ref().is_some_and(|result| {
                self.config.mode.passes(&OutputPair {
                    actual_stdout: &result.stdout,
                    actual_stderr: &result.stderr,
                    expected_stdout: &expected_stdout,
                    expected_stderr: &expected_stderr,
                })
            });

        CaseRun {
            verdict: Verdict { index, passed },
            execution,
            expected_stdout,
            expected_stderr,
            error,
        }
    }

    /// Summary mode: every case in discovery order, then the scoreboard.
    pub fn run_all<W: WriteColor>(&self, reporter: &mut Reporter<W>) -> HarnessResult<RunStatistics> {
        let mut stats = RunStatistics::new();
        let mut index = 0;

        'modules: for module in &self.suite.modules {
            reporter.module_started(module)?;
            let mut tally = ModuleTally::default();
            for case in &module.cases {
                let run = self.run_case(index, case);
                index += 1;
                stats.record(run.verdict, run.elapsed());
                tally.record(run.verdict);
                reporter.case_finished(case, &run)?;
                if !run.passed() && reporter.is_verbose() {
                    reporter.failure_details(&run, &read_source(case))?;
                }
                if self.config.exit_on_fail && !run.passed() {
                    reporter.module_finished(&tally)?;
                    reporter.stopped_early()?;
                    break 'modules;
                }
            }
            reporter.module_finished(&tally)?;
        }

        reporter.scoreboard(&stats, &self.config.binary.display().to_string())?;
        Ok(stats)
    }

    /// Detailed mode for the case at `index`. Returns whether it passed.
    pub fn run_one<W: WriteColor>(
        &self,
        index: usize,
        reporter: &mut Reporter<W>,
    ) -> HarnessResult<bool> {
        let case = self.suite.case(index)?;
        let run = self.run_case(index, case);
        reporter.detailed(case, &read_source(case), &run)?;
        Ok(run.passed())
    }
}

/// The case input for display. An unreadable input is shown as empty.
fn read_source(case: &TestCase) -> Vec<u8> {
    fs::read(&case.input).unwrap_or_else(|err| {
        warn!(case = %case.input.display(), error = %err, "cannot read case input for display");
        Vec::new()
    })
}
