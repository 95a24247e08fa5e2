//! Fixture definitions, registry, and lifecycle errors
//!
//! A fixture is a named provider of a value or resource: a setup closure, an
//! optional teardown closure, a scope controlling how long the value lives,
//! and the names of other fixtures it depends on. Test cases declare the
//! fixtures they use by name; the [`resolver`] walks the dependency graph,
//! runs setups in topological order, and guarantees teardown in reverse
//! order once a setup has succeeded.
//!
//! Values cross the fixture boundary as `Arc<dyn Any + Send + Sync>` and are
//! recovered with a typed downcast at the point of use, so the registry
//! stays homogeneous while user code stays typed.
//!
//! # Examples
//!
//! ```
//! use testrig_core::fixture::{Fixture, FixtureRegistry, FixtureScope};
//!
//! let mut registry = FixtureRegistry::new();
//! registry
//!     .register(
//!         Fixture::new("greeting", |_ctx| Ok::<_, String>(String::from("hello")))
//!             .scope(FixtureScope::Session),
//!     )
//!     .unwrap();
//! assert_eq!(registry.len(), 1);
//! ```

pub mod resolver;

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use testrig_common::error::{ErrorClassification, ErrorSeverity, HarnessError};
use thiserror::Error;

use crate::case::TestContext;

/// Type-erased fixture value shared between setup, test body, and teardown
pub type FixtureValue = Arc<dyn Any + Send + Sync>;

/// Type-erased setup closure stored in a [`Fixture`]
pub type SetupFn = Arc<dyn Fn(&TestContext) -> Result<FixtureValue, String> + Send + Sync>;

/// Type-erased teardown closure stored in a [`Fixture`]
pub type TeardownFn = Arc<dyn Fn(&FixtureValue) + Send + Sync>;

/// Lifecycle of a fixture value
///
/// The ordering is by lifetime: `Unit < Module < Session`. A fixture may
/// only depend on fixtures that live at least as long as itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum FixtureScope {
    /// Created and torn down for every test case (the default)
    #[default]
    Unit,
    /// Shared by every case in one module, torn down when the module ends
    Module,
    /// Shared by the whole run, torn down after the last case
    Session,
}

impl fmt::Display for FixtureScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => write!(f, "unit"),
            Self::Module => write!(f, "module"),
            Self::Session => write!(f, "session"),
        }
    }
}

/// Errors raised while resolving or acquiring fixtures
///
/// These surface as `Outcome::Errored` on the affected case: a broken
/// fixture is a setup *error*, never an assertion failure.
#[derive(Debug, Clone, Error)]
pub enum FixtureError {
    /// A case or fixture named a dependency that was never registered
    #[error("Fixture not found: '{name}'")]
    NotFound { name: String },

    /// The dependency graph contains a cycle
    #[error("Fixture dependency cycle: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },

    /// A fixture depends on another fixture with a shorter lifetime
    #[error(
        "Fixture '{fixture}' ({fixture_scope}) cannot depend on \
         narrower-scoped '{dependency}' ({dependency_scope})"
    )]
    ScopeMismatch {
        fixture: String,
        fixture_scope: FixtureScope,
        dependency: String,
        dependency_scope: FixtureScope,
    },

    /// The setup closure returned an error or panicked before yielding a value
    #[error("Fixture '{fixture}' setup failed: {message}")]
    Setup { fixture: String, message: String },

    /// A test body requested the fixture under a different type than the
    /// setup produced
    #[error("Fixture '{fixture}' does not hold a value of type {requested}")]
    TypeMismatch { fixture: String, requested: String },

    /// The case's parameter value could not be decoded into the requested type
    #[error("Parameter for '{case}' could not be decoded: {message}")]
    Param { case: String, message: String },
}

impl ErrorClassification for FixtureError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }

    fn is_usage(&self) -> bool {
        // Setup failures come from user setup code at run time; everything
        // else is a registration/declaration mistake.
        !matches!(self, Self::Setup { .. })
    }
}

/// A named setup/teardown provider
///
/// Built fluently and registered in a [`FixtureRegistry`]. The setup closure
/// receives a [`TestContext`] exposing the fixture's own resolved
/// dependencies.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
///
/// use testrig_core::fixture::{Fixture, FixtureScope};
///
/// let prices = Fixture::new("prices", |_ctx| {
///     let mut table: HashMap<String, u32> = HashMap::new();
///     table.insert("water".into(), 1);
///     Ok::<_, String>(table)
/// })
/// .scope(FixtureScope::Module);
/// assert_eq!(prices.name(), "prices");
/// ```
pub struct Fixture {
    name: String,
    scope: FixtureScope,
    depends_on: Vec<String>,
    setup: SetupFn,
    teardown: Option<TeardownFn>,
}

impl Fixture {
    /// Define a fixture from a fallible setup closure
    ///
    /// The closure's error converts to a setup-error outcome for every case
    /// that needs this fixture. Infallible setups return
    /// `Ok::<_, String>(value)`.
    pub fn new<T, E, F>(name: impl Into<String>, setup: F) -> Self
    where
        T: Send + Sync + 'static,
        E: fmt::Display,
        F: Fn(&TestContext) -> Result<T, E> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            scope: FixtureScope::default(),
            depends_on: Vec::new(),
            setup: Arc::new(move |ctx| {
                setup(ctx).map(|v| Arc::new(v) as FixtureValue).map_err(|e| e.to_string())
            }),
            teardown: None,
        }
    }

    /// Set the fixture scope
    #[must_use]
    pub fn scope(mut self, scope: FixtureScope) -> Self {
        self.scope = scope;
        self
    }

    /// Declare the fixtures this fixture's setup needs, by name
    #[must_use]
    pub fn depends_on<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = names.into_iter().map(Into::into).collect();
        self
    }

    /// Attach a teardown closure receiving the value produced by setup
    ///
    /// Runs exactly once per created instance, in reverse creation order,
    /// regardless of test outcome. `T` must match the setup's value type; a
    /// mismatch is logged and the teardown skipped rather than panicking
    /// inside scope finalization.
    #[must_use]
    pub fn teardown<T, F>(mut self, teardown: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&T) + Send + Sync + 'static,
    {
        let name = self.name.clone();
        self.teardown = Some(Arc::new(move |value: &FixtureValue| {
            if let Some(typed) = value.downcast_ref::<T>() {
                teardown(typed);
            } else {
                tracing::warn!(fixture = %name, "teardown type does not match setup value, skipping");
            }
        }));
        self
    }

    /// The fixture name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The fixture scope
    pub fn lifecycle_scope(&self) -> FixtureScope {
        self.scope
    }

    /// Names of the fixtures this one depends on
    pub fn dependencies(&self) -> &[String] {
        &self.depends_on
    }

    pub(crate) fn setup_fn(&self) -> SetupFn {
        Arc::clone(&self.setup)
    }

    pub(crate) fn teardown_fn(&self) -> Option<TeardownFn> {
        self.teardown.as_ref().map(Arc::clone)
    }
}

impl fmt::Debug for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fixture")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("depends_on", &self.depends_on)
            .field("has_teardown", &self.teardown.is_some())
            .finish()
    }
}

/// Name-keyed collection of fixture definitions owned by a suite
#[derive(Debug, Default)]
pub struct FixtureRegistry {
    defs: HashMap<String, Arc<Fixture>>,
}

impl FixtureRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fixture definition
    ///
    /// Duplicate names are a configuration error: silently replacing a
    /// provider would make case behavior depend on registration order.
    pub fn register(&mut self, fixture: Fixture) -> Result<(), HarnessError> {
        let name = fixture.name().to_string();
        if self.defs.contains_key(&name) {
            return Err(HarnessError::config_field(name, "fixture is already registered"));
        }
        tracing::debug!(fixture = %name, scope = %fixture.lifecycle_scope(), "registered fixture");
        self.defs.insert(name, Arc::new(fixture));
        Ok(())
    }

    /// Look up a definition by name
    pub fn get(&self, name: &str) -> Option<&Arc<Fixture>> {
        self.defs.get(name)
    }

    /// Number of registered fixtures
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
