//! # Testrig Core
//!
//! Fixture, double, and execution model for the harness.
//!
//! This crate contains:
//! - Case definitions, marks, and the outcome taxonomy
//! - The fixture registry and scoped dependency resolution
//! - Call-recording doubles and scoped patching
//! - The sequential runner and the report model
//!
//! ## Architecture Principles
//! - Only depends on `testrig-common` (plus serialization and time)
//! - No terminal, filesystem, or CLI code; rendering lives upstream
//! - Every lifecycle guarantee (teardown-exactly-once, restoration on
//!   panic) is enforced here, not by caller discipline

#![forbid(unsafe_code)]

pub mod case;
pub mod double;
pub mod fixture;
pub mod params;
pub mod report;
pub mod runner;
pub mod suite;

// Re-export specific items to avoid ambiguity
pub use case::{ensure, ensure_eq, CaseResult, Failure, Mark, Outcome, OutcomeKind, TestCase, TestContext};
pub use double::patch::{PatchGuard, Patchable};
pub use double::{CallRecord, Double, DoubleAssertion};
pub use fixture::{Fixture, FixtureError, FixtureRegistry, FixtureScope};
pub use params::Parametrize;
pub use report::{CaseReport, OutcomeCounts, RunReport};
pub use runner::{RunConfig, Runner};
pub use suite::{CollectedCase, Selection, Suite};
