//! Fixture resolution and scope lifecycle
//!
//! For each case the resolver walks the declared fixture names depth-first,
//! resolving every fixture's own dependencies before running its setup, and
//! records each created instance in the cache matching its scope. Teardown
//! obligations accumulate per scope in creation order; [`ScopeCache::finalize`]
//! releases them in strict reverse order, catching panics so a broken
//! teardown can never mask the primary test outcome.
//!
//! Guarantees:
//! - a fixture instance is created at most once per scope per run
//! - teardown runs exactly once per created instance, even when the test
//!   body fails or panics
//! - a fixture whose setup failed never tears down (it never completed
//!   acquisition), and for module/session scopes the failure is cached so
//!   dependent cases error without re-running the broken setup

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;

use super::{Fixture, FixtureError, FixtureRegistry, FixtureScope, FixtureValue, TeardownFn};
use crate::case::{Failure, TestCase, TestContext};

/// A teardown that panicked, reported alongside the primary outcome
#[derive(Debug, Clone, Serialize)]
pub struct TeardownWarning {
    /// Fixture whose teardown panicked
    pub fixture: String,
    /// Captured panic message
    pub message: String,
}

#[derive(Clone)]
pub(crate) enum CacheEntry {
    Ready(FixtureValue),
    Failed(FixtureError),
}

struct PendingTeardown {
    fixture: String,
    teardown: Option<TeardownFn>,
    value: FixtureValue,
}

/// Created fixture instances and teardown obligations for one scope
///
/// The runner keeps one session cache for the whole run, one module cache
/// per module, and one unit cache per case.
pub struct ScopeCache {
    scope: FixtureScope,
    entries: HashMap<String, CacheEntry>,
    teardowns: Vec<PendingTeardown>,
}

impl ScopeCache {
    /// Create an empty cache for a scope
    pub fn new(scope: FixtureScope) -> Self {
        Self { scope, entries: HashMap::new(), teardowns: Vec::new() }
    }

    fn lookup(&self, name: &str) -> Option<CacheEntry> {
        self.entries.get(name).cloned()
    }

    fn insert_ready(&mut self, name: &str, value: FixtureValue, teardown: Option<TeardownFn>) {
        self.entries.insert(name.to_string(), CacheEntry::Ready(Arc::clone(&value)));
        self.teardowns.push(PendingTeardown { fixture: name.to_string(), teardown, value });
    }

    fn insert_failed(&mut self, name: &str, error: FixtureError) {
        self.entries.insert(name.to_string(), CacheEntry::Failed(error));
    }

    /// Number of live (successfully created) instances awaiting teardown
    pub fn live(&self) -> usize {
        self.teardowns.len()
    }

    /// Release every created instance, in reverse creation order
    ///
    /// Unconditional once acquisition succeeded: runs whether the cases that
    /// used the values passed, failed, or panicked. Teardown panics are
    /// caught and returned as warnings instead of propagating.
    pub fn finalize(&mut self) -> Vec<TeardownWarning> {
        let mut warnings = Vec::new();
        while let Some(pending) = self.teardowns.pop() {
            let Some(teardown) = pending.teardown else {
                continue;
            };
            tracing::debug!(fixture = %pending.fixture, scope = %self.scope, "tearing down fixture");
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| teardown(&pending.value))) {
                let message = Failure::from_panic(&payload).message().to_string();
                tracing::warn!(fixture = %pending.fixture, %message, "fixture teardown panicked");
                warnings.push(TeardownWarning { fixture: pending.fixture, message });
            }
        }
        self.entries.clear();
        warnings
    }
}

/// Everything fixture resolution produced for one case
pub struct CaseFixtures {
    /// Name-to-value map handed to the test body
    pub values: HashMap<String, FixtureValue>,
    /// Unit-scoped teardown obligations, finalized right after the body
    pub unit: ScopeCache,
    /// The first resolution error, when acquisition did not complete
    pub error: Option<FixtureError>,
}

/// Resolve the fixtures a case declared
///
/// On error, `values` and `unit` still hold whatever was created before the
/// failure; the caller must finalize the unit cache regardless so completed
/// acquisitions release.
pub fn resolve_case(
    registry: &FixtureRegistry,
    case: &TestCase,
    case_id: &str,
    session: &mut ScopeCache,
    module: &mut ScopeCache,
) -> CaseFixtures {
    let mut resolution = Resolution {
        registry,
        case_id,
        param: case.param_value().cloned(),
        session,
        module,
        unit: ScopeCache::new(FixtureScope::Unit),
        values: HashMap::new(),
        stack: Vec::new(),
    };

    let mut error = None;
    for name in case.fixture_names() {
        if let Err(err) = resolution.resolve(name) {
            error = Some(err);
            break;
        }
    }

    CaseFixtures { values: resolution.values, unit: resolution.unit, error }
}

struct Resolution<'a> {
    registry: &'a FixtureRegistry,
    case_id: &'a str,
    param: Option<serde_json::Value>,
    session: &'a mut ScopeCache,
    module: &'a mut ScopeCache,
    unit: ScopeCache,
    values: HashMap<String, FixtureValue>,
    stack: Vec<String>,
}

impl Resolution<'_> {
    fn cache(&mut self, scope: FixtureScope) -> &mut ScopeCache {
        match scope {
            FixtureScope::Session => &mut *self.session,
            FixtureScope::Module => &mut *self.module,
            FixtureScope::Unit => &mut self.unit,
        }
    }

    fn resolve(&mut self, name: &str) -> Result<(), FixtureError> {
        if self.values.contains_key(name) {
            return Ok(());
        }
        if self.stack.iter().any(|entry| entry == name) {
            let mut path = self.stack.clone();
            path.push(name.to_string());
            return Err(FixtureError::Cycle { path });
        }

        let def = self
            .registry
            .get(name)
            .ok_or_else(|| FixtureError::NotFound { name: name.to_string() })?
            .clone();
        let scope = def.lifecycle_scope();

        match self.cache(scope).lookup(name) {
            Some(CacheEntry::Ready(value)) => {
                self.values.insert(name.to_string(), value);
                return Ok(());
            }
            Some(CacheEntry::Failed(error)) => return Err(error),
            None => {}
        }

        self.stack.push(name.to_string());
        let deps_result = self.resolve_dependencies(&def, scope);
        self.stack.pop();
        deps_result?;

        let result = self.run_setup(&def);
        match result {
            Ok(value) => {
                self.cache(scope).insert_ready(name, Arc::clone(&value), def.teardown_fn());
                self.values.insert(name.to_string(), value);
                Ok(())
            }
            Err(error) => {
                // Unit caches die with the case; caching the failure there
                // would never be observed again.
                if scope != FixtureScope::Unit {
                    self.cache(scope).insert_failed(name, error.clone());
                }
                Err(error)
            }
        }
    }

    fn resolve_dependencies(
        &mut self,
        def: &Fixture,
        scope: FixtureScope,
    ) -> Result<(), FixtureError> {
        for dep in def.dependencies() {
            let dep_scope = self
                .registry
                .get(dep)
                .ok_or_else(|| FixtureError::NotFound { name: dep.clone() })?
                .lifecycle_scope();
            if dep_scope < scope {
                return Err(FixtureError::ScopeMismatch {
                    fixture: def.name().to_string(),
                    fixture_scope: scope,
                    dependency: dep.clone(),
                    dependency_scope: dep_scope,
                });
            }
            self.resolve(dep)?;
        }
        Ok(())
    }

    fn run_setup(&mut self, def: &Fixture) -> Result<FixtureValue, FixtureError> {
        let mut dep_values = HashMap::new();
        for dep in def.dependencies() {
            if let Some(value) = self.values.get(dep) {
                dep_values.insert(dep.clone(), Arc::clone(value));
            }
        }
        let ctx = TestContext::new(self.case_id, dep_values, self.param.clone());

        tracing::debug!(fixture = %def.name(), scope = %def.lifecycle_scope(), "setting up fixture");
        let setup = def.setup_fn();
        match catch_unwind(AssertUnwindSafe(|| setup(&ctx))) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(message)) => {
                Err(FixtureError::Setup { fixture: def.name().to_string(), message })
            }
            Err(payload) => Err(FixtureError::Setup {
                fixture: def.name().to_string(),
                message: Failure::from_panic(&payload).message().to_string(),
            }),
        }
    }
}
