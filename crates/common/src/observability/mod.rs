//! Observability helpers for harness binaries and tests
//!
//! Installing a global tracing subscriber is a process-wide, once-only
//! operation, but the harness is embedded in user binaries and exercised by
//! many integration tests in the same process. [`init_tracing`] is therefore
//! idempotent: the first caller installs the subscriber, later callers are
//! no-ops.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::EnvFilter;

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Verbosity presets for [`init_tracing`]
///
/// The `TESTRIG_LOG` environment variable overrides the preset with a full
/// `EnvFilter` directive string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Warnings and errors only
    Quiet,
    /// Harness-level progress (default)
    #[default]
    Normal,
    /// Per-fixture and per-case detail
    Verbose,
}

impl Verbosity {
    fn default_directive(self) -> &'static str {
        match self {
            Self::Quiet => "warn",
            Self::Normal => "info",
            Self::Verbose => "debug",
        }
    }
}

/// Install the global tracing subscriber for harness output
///
/// Returns `true` if this call installed the subscriber, `false` if one was
/// already in place (ours or anyone else's). Never panics: losing the race
/// against another subscriber is fine, tracing events simply flow to the
/// winner.
///
/// # Examples
///
/// ```
/// use testrig_common::observability::{init_tracing, Verbosity};
///
/// init_tracing(Verbosity::Quiet);
/// // Safe to call again from another test in the same process.
/// assert!(!init_tracing(Verbosity::Quiet));
/// ```
pub fn init_tracing(verbosity: Verbosity) -> bool {
    if INSTALLED.swap(true, Ordering::SeqCst) {
        return false;
    }

    let filter = EnvFilter::try_from_env("TESTRIG_LOG")
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_directive()));

    // try_init so an embedding program's subscriber wins without panicking
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
