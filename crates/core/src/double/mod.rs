//! Call-recording stand-ins for external dependencies
//!
//! A [`Double`] replaces a callable for the duration of a test: it answers
//! with configured behavior (a fixed value, a FIFO sequence, or a closure)
//! and records every invocation (arguments and returned value) into an
//! inspectable log. Assertions over the log (`verify_called_once_with`,
//! `verify_call_count`) fail with a diagnostic listing the actual calls
//! against the expectation.
//!
//! Doubles are cheap to clone (the log and behavior are shared), so the same
//! double can be handed to the code under test and kept by the test for
//! later verification.
//!
//! # Examples
//!
//! ```
//! use testrig_core::double::Double;
//!
//! let lookup: Double<String, Option<u32>> = Double::returning("price_lookup", Some(3));
//! assert_eq!(lookup.call("coffee".to_string()), Some(3));
//! lookup.verify_called_once_with(&"coffee".to_string()).unwrap();
//! assert!(lookup.verify_call_count(2).is_err());
//! ```

pub mod patch;

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::case::Failure;

/// One recorded invocation: the arguments passed and the value returned
#[derive(Debug, Clone)]
pub struct CallRecord<A, R> {
    pub args: A,
    pub returned: R,
}

/// A failed expectation over a double's call log
///
/// The message lists expected versus actual calls so the report shows what
/// really happened, not just that the expectation failed.
#[derive(Debug, Clone, Error)]
#[error("double '{double}': {message}")]
pub struct DoubleAssertion {
    /// Name of the double the expectation was checked against
    pub double: String,
    /// Diagnostic listing expected vs actual calls
    pub message: String,
}

impl From<DoubleAssertion> for Failure {
    fn from(assertion: DoubleAssertion) -> Self {
        Self::new(assertion.to_string())
    }
}

enum Behavior<A, R> {
    /// Always answer with a clone of the same value
    Fixed(R),
    /// Answer with the next value in the queue; exhausting it panics (which
    /// the runner reports as a test failure)
    Sequence(VecDeque<R>),
    /// Compute the answer from the arguments
    Compute(Arc<dyn Fn(&A) -> R + Send + Sync>),
}

/// A named, call-recording stand-in for a callable dependency
pub struct Double<A, R> {
    name: Arc<str>,
    behavior: Arc<Mutex<Behavior<A, R>>>,
    calls: Arc<Mutex<Vec<CallRecord<A, R>>>>,
}

impl<A, R> Clone for Double<A, R> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            behavior: Arc::clone(&self.behavior),
            calls: Arc::clone(&self.calls),
        }
    }
}

impl<A, R> fmt::Debug for Double<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Double")
            .field("name", &self.name)
            .field("calls", &self.calls.lock().len())
            .finish()
    }
}

impl<A, R> Double<A, R>
where
    A: Clone + PartialEq + fmt::Debug + Send + 'static,
    R: Clone + Send + 'static,
{
    fn with_behavior(name: impl Into<String>, behavior: Behavior<A, R>) -> Self {
        Self {
            name: Arc::from(name.into()),
            behavior: Arc::new(Mutex::new(behavior)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Stand-in answering every call with a clone of `value`
    pub fn returning(name: impl Into<String>, value: R) -> Self {
        Self::with_behavior(name, Behavior::Fixed(value))
    }

    /// Stand-in answering with a FIFO sequence of values
    ///
    /// Calling past the end of the sequence panics with a diagnostic naming
    /// the double; inside a test body the runner reports that as a failure.
    pub fn with_sequence(name: impl Into<String>, values: impl IntoIterator<Item = R>) -> Self {
        Self::with_behavior(name, Behavior::Sequence(values.into_iter().collect()))
    }

    /// Stand-in computing its answer from the arguments
    pub fn computing<F>(name: impl Into<String>, compute: F) -> Self
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        Self::with_behavior(name, Behavior::Compute(Arc::new(compute)))
    }

    /// Invoke the stand-in, recording arguments and the returned value
    pub fn call(&self, args: A) -> R {
        let returned = {
            let mut behavior = self.behavior.lock();
            match &mut *behavior {
                Behavior::Fixed(value) => value.clone(),
                Behavior::Sequence(queue) => match queue.pop_front() {
                    Some(value) => value,
                    None => panic!(
                        "double '{}' was called after its response sequence was exhausted",
                        self.name
                    ),
                },
                Behavior::Compute(compute) => compute(&args),
            }
        };
        tracing::debug!(double = %self.name, args = ?args, "double invoked");
        self.calls.lock().push(CallRecord { args, returned: returned.clone() });
        returned
    }

    /// The double's name, used in diagnostics
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of recorded invocations
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Snapshot of every recorded invocation, in order
    pub fn calls(&self) -> Vec<CallRecord<A, R>> {
        self.calls.lock().clone()
    }

    /// Whether the double was invoked at least once
    pub fn was_called(&self) -> bool {
        self.call_count() > 0
    }

    /// Whether any invocation used exactly these arguments
    pub fn was_called_with(&self, args: &A) -> bool {
        self.calls.lock().iter().any(|record| &record.args == args)
    }

    /// The most recent invocation, if any
    pub fn last_call(&self) -> Option<CallRecord<A, R>> {
        self.calls.lock().last().cloned()
    }

    /// Forget all recorded invocations (behavior is untouched)
    pub fn reset(&self) {
        self.calls.lock().clear();
    }

    /// Expect exactly `expected` invocations
    pub fn verify_call_count(&self, expected: usize) -> Result<(), DoubleAssertion> {
        let actual = self.call_count();
        if actual == expected {
            Ok(())
        } else {
            Err(self.assertion(format!(
                "expected exactly {expected} call(s), saw {actual}{}",
                self.render_log()
            )))
        }
    }

    /// Expect exactly one invocation, with exactly these arguments
    ///
    /// Passes iff the call count is 1 and the sole call's arguments equal
    /// `expected`. The diagnostic lists every actual call.
    pub fn verify_called_once_with(&self, expected: &A) -> Result<(), DoubleAssertion> {
        let calls = self.calls.lock();
        match calls.as_slice() {
            [only] if &only.args == expected => Ok(()),
            [only] => Err(self.assertion(format!(
                "expected one call with {expected:?}, sole call had {:?}",
                only.args
            ))),
            [] => Err(self.assertion(format!("expected one call with {expected:?}, saw none"))),
            many => Err(self.assertion(format!(
                "expected one call with {expected:?}, saw {} calls: {}",
                many.len(),
                render_args(many)
            ))),
        }
    }

    fn assertion(&self, message: String) -> DoubleAssertion {
        DoubleAssertion { double: self.name.to_string(), message }
    }

    fn render_log(&self) -> String {
        let calls = self.calls.lock();
        if calls.is_empty() {
            String::new()
        } else {
            format!("; calls: {}", render_args(&calls))
        }
    }
}

fn render_args<A: fmt::Debug, R>(calls: &[CallRecord<A, R>]) -> String {
    calls.iter().map(|record| format!("{:?}", record.args)).collect::<Vec<_>>().join(", ")
}
