//! # Testrig CLI
//!
//! Invocation surface for suites built on `testrig-core`: clap argument
//! parsing, console rendering, JSON/HTML report export, and the shipped
//! shopping-cart demo suite.
//!
//! Embedding programs call [`run_cli`] from their own `main` with the suite
//! they registered; the demo binary does exactly that.

#![forbid(unsafe_code)]

pub mod args;
pub mod demo;
pub mod export;
pub mod render;

use testrig_common::{init_tracing, HarnessResult};
use testrig_core::{Runner, Suite};

pub use args::Args;
pub use render::RenderOptions;

/// Process exit status of a harness invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Every selected case passed (or xfailed/xpassed/skipped)
    Success,
    /// At least one failure, error, or unexpected pass
    Problems,
    /// The invocation itself was wrong (bad flags, unwritable report path)
    UsageError,
}

impl ExitStatus {
    /// The process exit code for this status
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Problems => 1,
            Self::UsageError => 2,
        }
    }
}

/// Run `suite` as the command line asked and print the results to stdout
///
/// Returns the exit status the process should report. Errors are reserved
/// for broken invocations (report files that cannot be written); test
/// failures are a normal return with [`ExitStatus::Problems`].
pub fn run_cli(suite: &Suite, args: &Args) -> HarnessResult<ExitStatus> {
    init_tracing(args.verbosity());

    if args.list {
        let selection = args.selection()?;
        let ids: Vec<String> = suite
            .collect()
            .into_iter()
            .filter(|c| selection.matches(c))
            .map(|c| c.id())
            .collect();
        print!("{}", render::render_list(&ids));
        return Ok(ExitStatus::Success);
    }

    let report = Runner::run(suite, &args.run_config()?);

    let options = RenderOptions { verbosity: args.verbosity(), durations: args.durations };
    print!("{}", render::render_run(&report, &options));

    if let Some(path) = &args.report_json {
        export::write_json(&report, path)?;
    }
    if let Some(path) = &args.report_html {
        export::write_html(&report, path)?;
    }

    Ok(if report.success() { ExitStatus::Success } else { ExitStatus::Problems })
}
