//! Aggregation of verdicts into run totals.

use std::collections::BTreeSet;
use std::time::Duration;

use tracing::warn;

/// Pass/fail outcome for the case at `index` (global discovery order).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub index: usize,
    pub passed: bool,
}

/// Running totals for a whole run. Only ever grows.
#[derive(Debug, Clone, Default)]
pub struct RunStatistics {
    total: usize,
    passed: usize,
    elapsed: Duration,
    failed: Vec<usize>,
    seen: BTreeSet<usize>,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one verdict. Returns `false` if the case was already recorded.
    pub fn record(&mut self, verdict: Verdict, elapsed: Duration) -> bool {
        if !self.seen.insert(verdict.index) {
            warn!(index = verdict.index, "case recorded twice; ignoring");
            return false;
        }
        self.total += 1;
        self.elapsed += elapsed;
        if verdict.passed {
            self.passed += 1;
        } else {
            self.failed.push(verdict.index);
        }
        true
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Failed case indices in the order they ran.
    pub fn failed(&self) -> &[usize] {
        &self.failed
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn all_passed(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn average(&self) -> Duration {
        match u32::try_from(self.total) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.elapsed / n,
            Err(_) => self.elapsed.div_f64(self.total as f64),
        }
    }

    /// Share of passing cases, 0 to 100. An empty run counts as fully passing.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.passed as f64 * 100.0 / self.total as f64
        }
    }
}

/// Per-module counts shown after each module's progress line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleTally {
    pub total: usize,
    pub passed: usize,
    pub failed: Vec<usize>,
}

impl ModuleTally {
    pub fn record(&mut self, verdict: Verdict) {
        self.total += 1;
        if verdict.passed {
            self.passed += 1;
        } else {
            self.failed.push(verdict.index);
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed.is_empty()
    }
}
