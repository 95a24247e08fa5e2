//! Shared infrastructure for the testrig harness crates.
//!
//! This crate carries the concerns every layer needs but none owns:
//! - [`error`]: the harness-level error taxonomy and severity
//!   classification used by the core and CLI crates
//! - [`observability`]: tracing subscriber installation helpers
//!
//! Domain logic (cases, fixtures, doubles, the runner) lives in
//! `testrig-core`; this crate must stay free of it.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod error;
pub mod observability;

// Re-export commonly used types for convenience
pub use error::{ErrorClassification, ErrorSeverity, HarnessError, HarnessResult};
pub use observability::{init_tracing, Verbosity};
