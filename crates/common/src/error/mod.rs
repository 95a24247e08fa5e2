//! Harness-level error types and classification
//!
//! This module provides the standardized error infrastructure shared by the
//! testrig crates. Test *outcomes* (assertion failures, setup errors, skips)
//! are not errors in this sense; they are results the runner reports. The
//! types here cover failures of the harness itself: bad configuration,
//! unwritable report files, malformed selection expressions, and internal
//! invariant violations.
//!
//! # Error Handling Architecture
//!
//! 1. **[`HarnessError`]**: the enum of harness failure patterns shared
//!    across crates (configuration, serialization, report I/O, selection,
//!    internal).
//!
//! 2. **[`ErrorClassification`] trait**: a standard interface for
//!    classifying errors by severity and by whether they are usage errors
//!    (caller/invocation mistakes) or harness defects.
//!
//! 3. **[`ErrorSeverity`] enum**: a unified severity scale for logging and
//!    exit-code decisions.
//!
//! Module-specific errors (e.g. fixture resolution errors in
//! `testrig-core`) compose with this taxonomy rather than duplicating it:
//! they define their own `thiserror` enum and implement
//! [`ErrorClassification`] so callers can treat everything uniformly.
//!
//! # Examples
//!
//! ```
//! use testrig_common::error::{ErrorClassification, ErrorSeverity, HarnessError};
//!
//! let err = HarnessError::selection("empty keyword filter");
//! assert!(err.is_usage());
//! assert_eq!(err.severity(), ErrorSeverity::Error);
//! ```

use std::fmt;

use thiserror::Error;

/// Standard result type using [`HarnessError`]
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Harness failure patterns shared across the testrig crates
///
/// These are failures of the harness machinery, never of the code under
/// test. Test bodies that fail produce outcomes, not `HarnessError`s.
#[derive(Debug, Clone, Error)]
pub enum HarnessError {
    /// Suite or fixture configuration is invalid (duplicate fixture name,
    /// malformed case definition, ...)
    #[error("Configuration error{}: {message}", field.as_ref().map(|f| format!(" in '{f}'")).unwrap_or_default())]
    Config {
        message: String,
        /// The offending field or entity name, when known
        field: Option<String>,
    },

    /// Serialization or deserialization of a report/parameter value failed
    #[error("Serialization error{}: {message}", format.as_ref().map(|f| format!(" ({f})")).unwrap_or_default())]
    Serialization { message: String, format: Option<String> },

    /// A report file could not be written
    #[error("Report error{}: {message}", path.as_ref().map(|p| format!(" for '{p}'")).unwrap_or_default())]
    Report { message: String, path: Option<String> },

    /// A selection filter expression was malformed
    #[error("Selection error: {message}")]
    Selection { message: String },

    /// Internal errors that indicate a harness bug
    #[error("Internal error{}: {message}", context.as_ref().map(|c| format!(" in '{c}'")).unwrap_or_default())]
    Internal { message: String, context: Option<String> },
}

impl HarnessError {
    /// Create a configuration error without a field
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into(), field: None }
    }

    /// Create a configuration error scoped to a field or entity
    pub fn config_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config { message: message.into(), field: Some(field.into()) }
    }

    /// Create a serialization error tagged with a format name
    pub fn serialization(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialization { message: message.into(), format: Some(format.into()) }
    }

    /// Create a report I/O error for a path
    pub fn report(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Report { message: message.into(), path: Some(path.into()) }
    }

    /// Create a selection filter error
    pub fn selection(message: impl Into<String>) -> Self {
        Self::Selection { message: message.into() }
    }
}

impl ErrorClassification for HarnessError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Config { .. } => ErrorSeverity::Error,
            Self::Serialization { .. } => ErrorSeverity::Error,
            Self::Report { .. } => ErrorSeverity::Error,
            Self::Selection { .. } => ErrorSeverity::Error,
            Self::Internal { .. } => ErrorSeverity::Critical,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    fn is_usage(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::Selection { .. })
    }
}

/// Standard interface for classifying errors across the harness
///
/// All harness error types should implement this so callers can make
/// uniform logging and exit-code decisions without matching on concrete
/// enums.
pub trait ErrorClassification {
    /// Get the error severity level
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error indicating a harness defect
    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    /// Check if this error was caused by how the harness was invoked or
    /// configured (as opposed to an internal defect)
    fn is_usage(&self) -> bool {
        false
    }
}

/// Unified severity scale for harness errors
///
/// | Level | Use case |
/// |-------|----------|
/// | `Info` | Expected conditions (nothing selected, empty suite) |
/// | `Warning` | Degraded but operational (teardown warning) |
/// | `Error` | Invocation or I/O failure requiring attention |
/// | `Critical` | Harness invariant violated |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the error taxonomy.
    use super::*;

    /// Validates `HarnessError::config_field` display formatting.
    ///
    /// Assertions:
    /// - Confirms the message names the offending field.
    #[test]
    fn test_config_error_display_includes_field() {
        let err = HarnessError::config_field("cart", "duplicate fixture");
        assert_eq!(err.to_string(), "Configuration error in 'cart': duplicate fixture");
    }

    /// Validates display formatting when no field is attached.
    ///
    /// Assertions:
    /// - Confirms the message omits the field clause.
    #[test]
    fn test_config_error_display_without_field() {
        let err = HarnessError::config("empty suite name");
        assert_eq!(err.to_string(), "Configuration error: empty suite name");
    }

    /// Validates the severity mapping for each variant.
    ///
    /// Assertions:
    /// - Confirms usage errors are `Error`, internal errors `Critical`.
    #[test]
    fn test_severity_classification() {
        assert_eq!(HarnessError::selection("bad").severity(), ErrorSeverity::Error);
        let bug = HarnessError::Internal { message: "bug".into(), context: None };
        assert_eq!(bug.severity(), ErrorSeverity::Critical);
        assert!(bug.is_critical());
        assert!(!bug.is_usage());
        assert!(HarnessError::config("x").is_usage());
    }

    /// Validates severity ordering for exit-code style comparisons.
    ///
    /// Assertions:
    /// - Ensures `Info < Warning < Error < Critical`.
    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Info < ErrorSeverity::Warning);
        assert!(ErrorSeverity::Warning < ErrorSeverity::Error);
        assert!(ErrorSeverity::Error < ErrorSeverity::Critical);
    }

    /// Validates the `Display` labels on `ErrorSeverity`.
    ///
    /// Assertions:
    /// - Confirms each level renders its uppercase label.
    #[test]
    fn test_severity_display() {
        assert_eq!(ErrorSeverity::Warning.to_string(), "WARNING");
        assert_eq!(ErrorSeverity::Critical.to_string(), "CRITICAL");
    }
}
