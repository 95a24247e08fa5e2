//! Run and case reports
//!
//! The runner produces a [`RunReport`]: one [`CaseReport`] per executed (or
//! deliberately skipped) case, outcome counts, timing, and any teardown
//! warnings raised while closing module/session scopes. The whole model is
//! `serde`-serializable so renderers and exporters work from the same data.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::case::OutcomeKind;
use crate::fixture::resolver::TeardownWarning;

/// Result of one case, as it appears in reports
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    /// Full case id: `module::name[param]`
    pub id: String,
    /// Module the case belongs to
    pub module: String,
    /// Display name within the module
    pub name: String,
    /// Terminal outcome kind
    pub outcome: OutcomeKind,
    /// Failure/error/skip detail, when the outcome carries one
    pub detail: Option<String>,
    /// Wall time spent on the case (fixtures + body + unit teardown)
    pub duration_ms: f64,
    /// Unit-scope teardowns that panicked after this case
    pub teardown_warnings: Vec<TeardownWarning>,
}

/// Outcome totals for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub skipped: usize,
    pub xfailed: usize,
    pub xpassed: usize,
}

impl OutcomeCounts {
    /// Tally one outcome
    pub fn record(&mut self, kind: OutcomeKind) {
        match kind {
            OutcomeKind::Passed => self.passed += 1,
            OutcomeKind::Failed => self.failed += 1,
            OutcomeKind::Errored => self.errored += 1,
            OutcomeKind::Skipped => self.skipped += 1,
            OutcomeKind::XFailed => self.xfailed += 1,
            OutcomeKind::XPassed => self.xpassed += 1,
        }
    }

    /// Total number of reported cases
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errored + self.skipped + self.xfailed + self.xpassed
    }
}

/// Everything one run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Suite name the run was built from
    pub suite: String,
    /// Wall-clock start of the run
    pub started_at: DateTime<Utc>,
    /// Total wall time of the run
    pub duration_ms: f64,
    /// Per-case results in execution order
    pub cases: Vec<CaseReport>,
    /// Outcome totals
    pub counts: OutcomeCounts,
    /// Cases collected but excluded by the selection
    pub deselected: usize,
    /// Module/session-scope teardowns that panicked
    pub teardown_warnings: Vec<TeardownWarning>,
}

impl RunReport {
    /// Whether the run is green: no failures and no errors
    ///
    /// Unexpected passes under a strict mark are already counted as
    /// failures by the runner; non-strict ones are reported but green.
    pub fn success(&self) -> bool {
        self.counts.failed == 0 && self.counts.errored == 0
    }

    /// The `n` slowest cases, slowest first
    ///
    /// Skipped cases are excluded: their near-zero durations say nothing
    /// about cost.
    pub fn slowest(&self, n: usize) -> Vec<&CaseReport> {
        let mut timed: Vec<&CaseReport> =
            self.cases.iter().filter(|c| c.outcome != OutcomeKind::Skipped).collect();
        timed.sort_by(|a, b| {
            b.duration_ms.partial_cmp(&a.duration_ms).unwrap_or(std::cmp::Ordering::Equal)
        });
        timed.truncate(n);
        timed
    }

    /// Cases with a problem outcome, in execution order
    pub fn problems(&self) -> Vec<&CaseReport> {
        self.cases.iter().filter(|c| c.outcome.is_problem()).collect()
    }
}
