//! Test cases, marks, outcomes, and the per-case context
//!
//! A [`TestCase`] is a named, independent check: a body closure plus the
//! names of the fixtures it uses and the marks that modify how the runner
//! treats it. Bodies receive a [`TestContext`] giving typed access to
//! resolved fixture values and the case's parameter, and report assertion
//! failures either by returning [`Failure`] (via the [`ensure`] /
//! [`ensure_eq`] helpers) or by panicking; the runner catches both.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::fixture::{FixtureError, FixtureValue};
use crate::params::ParamCase;

/// Result type returned by test bodies
pub type CaseResult = Result<(), Failure>;

/// Type-erased test body shared between parametrized invocations
pub type TestBody = Arc<dyn Fn(&TestContext) -> CaseResult + Send + Sync>;

/// An assertion failure with the literal values that disagreed
///
/// Carries an optional expected/actual pair so reports can show what was
/// compared, not just that a comparison failed.
#[derive(Debug, Clone)]
pub struct Failure {
    message: String,
    expected: Option<String>,
    actual: Option<String>,
}

impl Failure {
    /// Create a failure from a plain message
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), expected: None, actual: None }
    }

    /// Create a failure recording an expected/actual mismatch
    pub fn mismatch<E: fmt::Debug, A: fmt::Debug>(expected: &E, actual: &A) -> Self {
        Self {
            message: "values differ".to_string(),
            expected: Some(format!("{expected:?}")),
            actual: Some(format!("{actual:?}")),
        }
    }

    /// Attach or replace the message on a failure
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Build a failure from a caught panic payload
    pub fn from_panic(payload: &Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "test body panicked with a non-string payload".to_string()
        };
        Self { message: format!("panic: {message}"), expected: None, actual: None }
    }

    /// The diagnostic message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<FixtureError> for Failure {
    fn from(err: FixtureError) -> Self {
        Self::new(err.to_string())
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.expected, &self.actual) {
            (Some(expected), Some(actual)) => {
                write!(f, "{}: expected {expected}, got {actual}", self.message)
            }
            _ => write!(f, "{}", self.message),
        }
    }
}

/// Fail the case with `message` unless `condition` holds
///
/// # Examples
///
/// ```
/// use testrig_core::case::ensure;
///
/// assert!(ensure(1 + 1 == 2, "arithmetic is broken").is_ok());
/// assert!(ensure(false, "always fails").is_err());
/// ```
pub fn ensure(condition: bool, message: impl Into<String>) -> CaseResult {
    if condition {
        Ok(())
    } else {
        Err(Failure::new(message))
    }
}

/// Fail the case with an expected/actual diagnostic unless the values are equal
///
/// # Examples
///
/// ```
/// use testrig_core::case::ensure_eq;
///
/// assert!(ensure_eq(&2, &2).is_ok());
/// let failure = ensure_eq(&2, &3).unwrap_err();
/// assert!(failure.to_string().contains("expected 3"));
/// ```
pub fn ensure_eq<T: PartialEq + fmt::Debug>(actual: &T, expected: &T) -> CaseResult {
    if actual == expected {
        Ok(())
    } else {
        Err(Failure::mismatch(expected, actual))
    }
}

/// A label attached to a case for selection or behavior modification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mark {
    /// Exclude the case from execution, with an optional recorded reason
    Skip { reason: Option<String> },
    /// The case is known-broken: a failure is expected. With `strict` set,
    /// an unexpected pass fails the case so a stale mark cannot linger;
    /// otherwise it is reported as XPASS and the run stays green
    XFail { reason: Option<String>, strict: bool },
    /// Free-form selection label (e.g. "slow", "network")
    Label(String),
}

impl Mark {
    /// Unconditional skip without a reason
    pub fn skip() -> Self {
        Self::Skip { reason: None }
    }

    /// Skip with a recorded reason
    pub fn skip_because(reason: impl Into<String>) -> Self {
        Self::Skip { reason: Some(reason.into()) }
    }

    /// Conditional skip: skips only when `condition` is true
    pub fn skip_if(condition: bool, reason: impl Into<String>) -> Option<Self> {
        condition.then(|| Self::skip_because(reason))
    }

    /// Strict expected failure: an unexpected pass fails the case
    pub fn xfail(reason: impl Into<String>) -> Self {
        Self::XFail { reason: Some(reason.into()), strict: true }
    }

    /// Non-strict expected failure: an unexpected pass is only reported
    pub fn xfail_nonstrict(reason: impl Into<String>) -> Self {
        Self::XFail { reason: Some(reason.into()), strict: false }
    }

    /// Selection label
    pub fn label(name: impl Into<String>) -> Self {
        Self::Label(name.into())
    }
}

/// Terminal result of one executed (or deliberately not executed) case
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The body ran and reported no failure
    Passed,
    /// The body returned a failure or panicked
    Failed(Failure),
    /// Fixture acquisition failed before the body could run
    Errored(FixtureError),
    /// The case was excluded by a skip mark
    Skipped { reason: Option<String> },
    /// A known-broken case failed, as expected
    XFailed { reason: Option<String> },
    /// A non-strictly marked case passed; reported so the stale mark gets
    /// cleaned up, but not a problem (strict marks fail outright instead)
    XPassed { reason: Option<String> },
}

impl Outcome {
    /// Collapse to the reportable kind
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Passed => OutcomeKind::Passed,
            Self::Failed(_) => OutcomeKind::Failed,
            Self::Errored(_) => OutcomeKind::Errored,
            Self::Skipped { .. } => OutcomeKind::Skipped,
            Self::XFailed { .. } => OutcomeKind::XFailed,
            Self::XPassed { .. } => OutcomeKind::XPassed,
        }
    }

    /// Human-readable detail for reports, when the outcome carries one
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Passed => None,
            Self::Failed(failure) => Some(failure.to_string()),
            Self::Errored(err) => Some(err.to_string()),
            Self::Skipped { reason } | Self::XFailed { reason } | Self::XPassed { reason } => {
                reason.clone()
            }
        }
    }
}

/// Outcome kind without payload, used for counting and serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Passed,
    Failed,
    Errored,
    Skipped,
    XFailed,
    XPassed,
}

impl OutcomeKind {
    /// Whether this kind counts against run success
    ///
    /// An unexpected pass under a strict mark surfaces as `Failed` before
    /// it reaches a report, so `XPassed` itself is not a problem.
    pub fn is_problem(self) -> bool {
        matches!(self, Self::Failed | Self::Errored)
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "PASS"),
            Self::Failed => write!(f, "FAIL"),
            Self::Errored => write!(f, "ERROR"),
            Self::Skipped => write!(f, "SKIP"),
            Self::XFailed => write!(f, "XFAIL"),
            Self::XPassed => write!(f, "XPASS"),
        }
    }
}

/// Per-case view handed to setup closures and test bodies
///
/// Exposes the resolved fixture values (typed via downcast), the case's
/// parameter row (decoded via serde), and the case identity for diagnostics.
pub struct TestContext {
    case_id: String,
    fixtures: HashMap<String, FixtureValue>,
    param: Option<serde_json::Value>,
}

impl TestContext {
    /// Build a context directly, useful for unit-testing bodies outside a
    /// runner
    pub fn new(
        case_id: impl Into<String>,
        fixtures: HashMap<String, FixtureValue>,
        param: Option<serde_json::Value>,
    ) -> Self {
        Self { case_id: case_id.into(), fixtures, param }
    }

    /// The full case id ("module::name[param]")
    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    /// Typed access to a resolved fixture value
    ///
    /// Fails when the name was not declared in the case's `uses` list or the
    /// requested type differs from what the setup produced.
    pub fn fixture<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, FixtureError> {
        let value = self
            .fixtures
            .get(name)
            .ok_or_else(|| FixtureError::NotFound { name: name.to_string() })?;
        Arc::clone(value).downcast::<T>().map_err(|_| FixtureError::TypeMismatch {
            fixture: name.to_string(),
            requested: std::any::type_name::<T>().to_string(),
        })
    }

    /// Decode the case's parameter row into `T`
    pub fn param<T: DeserializeOwned>(&self) -> Result<T, FixtureError> {
        let value = self.param.clone().ok_or_else(|| FixtureError::Param {
            case: self.case_id.clone(),
            message: "case is not parametrized".to_string(),
        })?;
        serde_json::from_value(value).map_err(|e| FixtureError::Param {
            case: self.case_id.clone(),
            message: e.to_string(),
        })
    }
}

/// A named, independent check
///
/// # Examples
///
/// ```
/// use testrig_core::case::{ensure_eq, Mark, TestCase};
///
/// let case = TestCase::new("test_addition", |_ctx| ensure_eq(&(2 + 2), &4))
///     .mark(Mark::label("fast"));
/// assert_eq!(case.full_name(), "test_addition");
/// ```
pub struct TestCase {
    name: String,
    marks: Vec<Mark>,
    uses: Vec<String>,
    param: Option<ParamCase>,
    body: TestBody,
}

impl TestCase {
    /// Define a case from a name and body closure
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&TestContext) -> CaseResult + Send + Sync + 'static,
    {
        Self::from_shared(name, Arc::new(body))
    }

    pub(crate) fn from_shared(name: impl Into<String>, body: TestBody) -> Self {
        Self { name: name.into(), marks: Vec::new(), uses: Vec::new(), param: None, body }
    }

    /// Declare the fixtures the body uses, by name
    #[must_use]
    pub fn uses<I, S>(mut self, fixtures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.uses = fixtures.into_iter().map(Into::into).collect();
        self
    }

    /// Attach a mark
    #[must_use]
    pub fn mark(mut self, mark: Mark) -> Self {
        self.marks.push(mark);
        self
    }

    /// Attach a mark only when present (pairs with [`Mark::skip_if`])
    #[must_use]
    pub fn mark_if(mut self, mark: Option<Mark>) -> Self {
        if let Some(mark) = mark {
            self.marks.push(mark);
        }
        self
    }

    pub(crate) fn with_param(mut self, param: ParamCase) -> Self {
        self.param = Some(param);
        self
    }

    /// The declared name (without parameter suffix)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The display name, including the parameter id when parametrized
    pub fn full_name(&self) -> String {
        match &self.param {
            Some(param) => format!("{}[{}]", self.name, param.id),
            None => self.name.clone(),
        }
    }

    /// All marks on the case
    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    /// Whether a skip mark is present, and its reason
    pub fn skip_reason(&self) -> Option<Option<&str>> {
        self.marks.iter().find_map(|m| match m {
            Mark::Skip { reason } => Some(reason.as_deref()),
            _ => None,
        })
    }

    /// Whether an expected-failure mark is present, and its reason
    pub fn xfail_reason(&self) -> Option<Option<&str>> {
        self.expected_failure().map(|(reason, _)| reason)
    }

    /// The expected-failure mark, when present: its reason and strictness
    pub fn expected_failure(&self) -> Option<(Option<&str>, bool)> {
        self.marks.iter().find_map(|m| match m {
            Mark::XFail { reason, strict } => Some((reason.as_deref(), *strict)),
            _ => None,
        })
    }

    /// Selection labels attached to the case
    pub fn labels(&self) -> Vec<&str> {
        self.marks
            .iter()
            .filter_map(|m| match m {
                Mark::Label(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Fixture names the case declared
    pub fn fixture_names(&self) -> &[String] {
        &self.uses
    }

    pub(crate) fn param_value(&self) -> Option<&serde_json::Value> {
        self.param.as_ref().map(|p| &p.value)
    }

    pub(crate) fn body(&self) -> TestBody {
        Arc::clone(&self.body)
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.full_name())
            .field("marks", &self.marks)
            .field("uses", &self.uses)
            .finish()
    }
}
