//! Parametrization: many invocations from one definition
//!
//! A [`Parametrize`] builder turns one body closure and a table of value
//! rows into one [`TestCase`] per row, named `base[id]`. Rows are
//! `serde_json::Value`s (build them with `serde_json::json!`) and bodies
//! decode them through [`TestContext::param`](crate::case::TestContext::param).
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use testrig_core::case::ensure_eq;
//! use testrig_core::params::Parametrize;
//!
//! let cases = Parametrize::new("test_double")
//!     .case("two", json!([2, 4]))
//!     .case("five", json!([5, 10]))
//!     .build(|ctx| {
//!         let (input, expected): (i64, i64) = ctx.param()?;
//!         ensure_eq(&(input * 2), &expected)
//!     });
//!
//! assert_eq!(cases.len(), 2);
//! assert_eq!(cases[0].full_name(), "test_double[two]");
//! ```

use std::sync::Arc;

use crate::case::{CaseResult, Mark, TestCase, TestContext};

/// One row of a parameter table: a human-readable id plus the value
#[derive(Debug, Clone)]
pub struct ParamCase {
    /// Suffix appearing in the generated case name
    pub id: String,
    /// The row value, decoded by the body via serde
    pub value: serde_json::Value,
}

/// Builder generating one case per parameter row
#[derive(Debug, Default)]
pub struct Parametrize {
    name: String,
    uses: Vec<String>,
    marks: Vec<Mark>,
    cases: Vec<ParamCase>,
}

impl Parametrize {
    /// Start a parametrized definition with the base case name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Declare fixtures shared by every generated case
    #[must_use]
    pub fn uses<I, S>(mut self, fixtures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.uses = fixtures.into_iter().map(Into::into).collect();
        self
    }

    /// Attach a mark to every generated case
    #[must_use]
    pub fn mark(mut self, mark: Mark) -> Self {
        self.marks.push(mark);
        self
    }

    /// Add one parameter row
    #[must_use]
    pub fn case(mut self, id: impl Into<String>, value: serde_json::Value) -> Self {
        self.cases.push(ParamCase { id: id.into(), value });
        self
    }

    /// Produce the generated cases, one per row, sharing the body closure
    pub fn build<F>(self, body: F) -> Vec<TestCase>
    where
        F: Fn(&TestContext) -> CaseResult + Send + Sync + 'static,
    {
        let body: crate::case::TestBody = Arc::new(body);
        self.cases
            .into_iter()
            .map(|param| {
                let mut case = TestCase::from_shared(&self.name, Arc::clone(&body))
                    .uses(self.uses.iter().cloned())
                    .with_param(param);
                for mark in &self.marks {
                    case = case.mark(mark.clone());
                }
                case
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the parametrization builder.
    use serde_json::json;

    use super::*;
    use crate::case::ensure_eq;

    /// Validates generated names, shared fixtures, and shared marks.
    ///
    /// Assertions:
    /// - Confirms every case carries the row suffix, fixture list, and mark.
    #[test]
    fn test_parametrize_generates_cases() {
        let cases = Parametrize::new("test_total")
            .uses(["cart"])
            .mark(Mark::label("pricing"))
            .case("empty", json!([]))
            .case("one", json!(["water"]))
            .build(|_ctx| Ok(()));

        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].full_name(), "test_total[empty]");
        assert_eq!(cases[1].full_name(), "test_total[one]");
        for case in &cases {
            assert_eq!(case.fixture_names(), ["cart".to_string()]);
            assert_eq!(case.labels(), vec!["pricing"]);
        }
    }

    /// Validates each generated case sees its own row.
    ///
    /// Assertions:
    /// - Confirms bodies decode distinct values per case when run with a
    ///   hand-built context.
    #[test]
    fn test_rows_reach_bodies() {
        let cases = Parametrize::new("test_square")
            .case("three", json!([3, 9]))
            .case("four", json!([4, 16]))
            .build(|ctx| {
                let (input, expected): (i64, i64) = ctx.param()?;
                ensure_eq(&(input * input), &expected)
            });

        for case in &cases {
            let ctx = crate::case::TestContext::new(
                case.full_name(),
                std::collections::HashMap::new(),
                case.param_value().cloned(),
            );
            assert!(case.body()(&ctx).is_ok());
        }
    }

    /// Validates an empty table produces no cases rather than failing.
    #[test]
    fn test_empty_table() {
        let cases = Parametrize::new("test_none").build(|_ctx| Ok(()));
        assert!(cases.is_empty());
    }
}
