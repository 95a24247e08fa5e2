//! Command-line argument surface
//!
//! The flags mirror how suites are actually invoked day to day: a positional
//! target narrowing the run to a module or a single case, substring and
//! label filters, ordering and fail-fast knobs, and optional report files.
//! Parsing is plain `clap` derive; translation into a [`Selection`] and
//! [`RunConfig`] lives here so the rest of the crate never touches raw
//! flags.

use std::path::PathBuf;

use clap::Parser;
use testrig_common::{HarnessError, HarnessResult, Verbosity};
use testrig_core::{RunConfig, Selection};

/// Run a registered test suite
#[derive(Debug, Parser, Default)]
#[command(name = "testrig", version, about)]
pub struct Args {
    /// Narrow the run to a module (`test_cart`) or one case
    /// (`test_cart::test_overflow`)
    pub target: Option<String>,

    /// Keep only cases whose id contains this substring
    #[arg(short = 'k', long = "keyword", value_name = "EXPR")]
    pub keyword: Option<String>,

    /// Keep only cases carrying this mark label
    #[arg(short = 'm', long = "mark", value_name = "LABEL")]
    pub mark: Option<String>,

    /// After the run, list the N slowest cases
    #[arg(long, value_name = "N")]
    pub durations: Option<usize>,

    /// Shuffle execution order deterministically with this seed
    #[arg(long, value_name = "SEED")]
    pub shuffle_seed: Option<u64>,

    /// Stop at the first failing or erroring case
    #[arg(long)]
    pub fail_fast: bool,

    /// Write the full run report as JSON
    #[arg(long, value_name = "PATH")]
    pub report_json: Option<PathBuf>,

    /// Write the full run report as a self-contained HTML page
    #[arg(long, value_name = "PATH")]
    pub report_html: Option<PathBuf>,

    /// Only print problems and the summary line
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print per-case detail and debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Collect and list cases without running them
    #[arg(long)]
    pub list: bool,
}

impl Args {
    /// Translate the target and filter flags into a selection
    ///
    /// A target containing `::` selects one exact case; otherwise it names
    /// a module. Blank filter values are rejected as usage errors: an
    /// empty keyword would silently match everything.
    pub fn selection(&self) -> HarnessResult<Selection> {
        for (flag, value) in [
            ("target", &self.target),
            ("-k/--keyword", &self.keyword),
            ("-m/--mark", &self.mark),
        ] {
            if let Some(value) = value {
                if value.trim().is_empty() {
                    return Err(HarnessError::selection(format!("{flag} must not be blank")));
                }
            }
        }

        let (module, exact) = match &self.target {
            Some(target) if target.contains("::") => (None, Some(target.clone())),
            Some(target) => (Some(target.clone()), None),
            None => (None, None),
        };
        Ok(Selection { module, exact, keyword: self.keyword.clone(), label: self.mark.clone() })
    }

    /// Translate the execution flags into a run configuration
    pub fn run_config(&self) -> HarnessResult<RunConfig> {
        Ok(RunConfig {
            selection: self.selection()?,
            shuffle_seed: self.shuffle_seed,
            fail_fast: self.fail_fast,
        })
    }

    /// Logging and rendering verbosity from `-q`/`-v`
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }
}
