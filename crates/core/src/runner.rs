//! Sequential case execution with scope lifecycle management
//!
//! The runner groups collected cases by module, resolves fixtures per case,
//! executes bodies under `catch_unwind`, and finalizes fixture scopes at the
//! right boundaries: unit caches right after each case, module caches when a
//! module's last case finishes, the session cache at end of run. Failures
//! and errors are isolated per case; one broken case never aborts its
//! siblings (unless `fail_fast` asks for exactly that).
//!
//! Ordering: cases run in registration order by default. With
//! `shuffle_seed`, module order and case order within each module are
//! shuffled deterministically, which is how suites exercise the invariant
//! that outcomes must not depend on execution order.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::case::{Failure, Outcome, TestContext};
use crate::fixture::resolver::{resolve_case, ScopeCache};
use crate::fixture::FixtureScope;
use crate::report::{CaseReport, OutcomeCounts, RunReport};
use crate::suite::{CollectedCase, Selection, Suite};

/// Knobs for one run
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Which collected cases to execute
    pub selection: Selection,
    /// Deterministic order randomization; `None` keeps registration order
    pub shuffle_seed: Option<u64>,
    /// Stop executing after the first problem outcome
    pub fail_fast: bool,
}

/// Executes suites and produces run reports
pub struct Runner;

impl Runner {
    /// Run every selected case of the suite
    pub fn run(suite: &Suite, config: &RunConfig) -> RunReport {
        let started_at = Utc::now();
        let run_timer = Instant::now();

        let collected = suite.collect();
        let total = collected.len();
        let selected: Vec<CollectedCase<'_>> =
            collected.into_iter().filter(|c| config.selection.matches(c)).collect();
        let deselected = total - selected.len();

        let mut groups = group_by_module(selected);
        if let Some(seed) = config.shuffle_seed {
            let mut rng = StdRng::seed_from_u64(seed);
            groups.shuffle(&mut rng);
            for group in &mut groups {
                group.cases.shuffle(&mut rng);
            }
            tracing::debug!(seed, "shuffled execution order");
        }

        tracing::info!(
            suite = %suite.name(),
            selected = groups.iter().map(|g| g.cases.len()).sum::<usize>(),
            deselected,
            "starting run"
        );

        let mut session = ScopeCache::new(FixtureScope::Session);
        let mut cases = Vec::new();
        let mut counts = OutcomeCounts::default();
        let mut teardown_warnings = Vec::new();
        let mut stopped = false;

        for group in groups {
            let mut module_cache = ScopeCache::new(FixtureScope::Module);
            for item in group.cases {
                let report = Self::run_case(suite, &item, &mut session, &mut module_cache);
                counts.record(report.outcome);
                let problem = report.outcome.is_problem();
                cases.push(report);
                if config.fail_fast && problem {
                    tracing::warn!("stopping after first problem (fail-fast)");
                    stopped = true;
                    break;
                }
            }
            teardown_warnings.extend(module_cache.finalize());
            if stopped {
                break;
            }
        }
        teardown_warnings.extend(session.finalize());

        RunReport {
            suite: suite.name().to_string(),
            started_at,
            duration_ms: run_timer.elapsed().as_secs_f64() * 1000.0,
            cases,
            counts,
            deselected,
            teardown_warnings,
        }
    }

    fn run_case(
        suite: &Suite,
        item: &CollectedCase<'_>,
        session: &mut ScopeCache,
        module_cache: &mut ScopeCache,
    ) -> CaseReport {
        let id = item.id();
        let case_timer = Instant::now();

        // Skip marks short-circuit before any fixture is acquired.
        if let Some(reason) = item.case.skip_reason() {
            tracing::debug!(case = %id, "skipped");
            return Self::case_report(item, Outcome::Skipped { reason: reason.map(str::to_string) }, case_timer, Vec::new());
        }

        let mut fixtures = resolve_case(suite.fixtures(), item.case, &id, session, module_cache);
        let outcome = match fixtures.error.take() {
            Some(error) => {
                tracing::debug!(case = %id, %error, "fixture acquisition failed");
                Outcome::Errored(error)
            }
            None => {
                let values = std::mem::take(&mut fixtures.values);
                let ctx = TestContext::new(&id, values, item.case.param_value().cloned());
                let body = item.case.body();
                let failure = match catch_unwind(AssertUnwindSafe(|| body(&ctx))) {
                    Ok(Ok(())) => None,
                    Ok(Err(failure)) => Some(failure),
                    Err(payload) => Some(Failure::from_panic(&payload)),
                };
                Self::judge(failure, item)
            }
        };

        // Unit-scope teardowns run here, whatever the body did.
        let warnings = fixtures.unit.finalize();
        tracing::debug!(case = %id, outcome = %outcome.kind(), "case finished");
        Self::case_report(item, outcome, case_timer, warnings)
    }

    /// Combine the body result with an expected-failure mark, if present
    ///
    /// A pass under a strict mark is a failure (the mark is stale and must
    /// go); under a non-strict mark it is reported as XPASS without
    /// breaking the run.
    fn judge(failure: Option<Failure>, item: &CollectedCase<'_>) -> Outcome {
        match (failure, item.case.expected_failure()) {
            (None, None) => Outcome::Passed,
            (None, Some((reason, true))) => Outcome::Failed(Failure::new(match reason {
                Some(reason) => format!("unexpectedly passed (strict expected failure: {reason})"),
                None => "unexpectedly passed (strict expected failure)".to_string(),
            })),
            (None, Some((reason, false))) => {
                Outcome::XPassed { reason: reason.map(str::to_string) }
            }
            (Some(failure), None) => Outcome::Failed(failure),
            (Some(_), Some((reason, _))) => {
                Outcome::XFailed { reason: reason.map(str::to_string) }
            }
        }
    }

    fn case_report(
        item: &CollectedCase<'_>,
        outcome: Outcome,
        case_timer: Instant,
        teardown_warnings: Vec<crate::fixture::resolver::TeardownWarning>,
    ) -> CaseReport {
        CaseReport {
            id: item.id(),
            module: item.module.to_string(),
            name: item.case.full_name(),
            detail: outcome.detail(),
            outcome: outcome.kind(),
            duration_ms: case_timer.elapsed().as_secs_f64() * 1000.0,
            teardown_warnings,
        }
    }
}

struct ModuleGroup<'a> {
    module: String,
    cases: Vec<CollectedCase<'a>>,
}

fn group_by_module(selected: Vec<CollectedCase<'_>>) -> Vec<ModuleGroup<'_>> {
    let mut groups: Vec<ModuleGroup<'_>> = Vec::new();
    for item in selected {
        match groups.iter_mut().find(|g| g.module == item.module) {
            Some(group) => group.cases.push(item),
            None => groups.push(ModuleGroup { module: item.module.to_string(), cases: vec![item] }),
        }
    }
    groups
}
