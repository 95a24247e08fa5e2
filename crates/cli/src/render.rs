//! Console rendering of run reports
//!
//! Renderers build plain strings; callers decide where they go. The layout
//! follows the usual harness conventions: one status line per case, a
//! problems section with the recorded detail, an optional slowest-N block,
//! and a one-line summary footer. No color codes, so the output is safe to
//! pipe and diff.

use testrig_common::Verbosity;
use testrig_core::{CaseReport, OutcomeKind, RunReport};

/// Rendering knobs derived from the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Console verbosity: quiet hides per-case lines for passing cases
    pub verbosity: Verbosity,
    /// When set, append the N slowest cases after the case lines
    pub durations: Option<usize>,
}

/// Render the full console view of a run
pub fn render_run(report: &RunReport, options: &RenderOptions) -> String {
    let mut out = String::new();

    for case in &report.cases {
        let show = match options.verbosity {
            Verbosity::Quiet => case.outcome.is_problem(),
            Verbosity::Normal | Verbosity::Verbose => true,
        };
        if show {
            out.push_str(&case_line(case, options.verbosity));
            out.push('\n');
        }
    }

    let problems = report.problems();
    if !problems.is_empty() {
        out.push_str("\nproblems:\n");
        for case in problems {
            out.push_str(&format!(
                "  {} {}: {}\n",
                case.outcome,
                case.id,
                case.detail.as_deref().unwrap_or("(no detail recorded)")
            ));
        }
    }

    let warnings: Vec<_> = report
        .cases
        .iter()
        .flat_map(|c| &c.teardown_warnings)
        .chain(&report.teardown_warnings)
        .collect();
    if !warnings.is_empty() {
        out.push_str("\nteardown warnings:\n");
        for warning in warnings {
            out.push_str(&format!("  fixture '{}': {}\n", warning.fixture, warning.message));
        }
    }

    if let Some(n) = options.durations {
        let slowest = report.slowest(n);
        if !slowest.is_empty() {
            out.push_str(&format!("\nslowest {} case(s):\n", slowest.len()));
            for case in slowest {
                out.push_str(&format!("  {:>9.2} ms  {}\n", case.duration_ms, case.id));
            }
        }
    }

    out.push('\n');
    out.push_str(&footer(report));
    out.push('\n');
    out
}

/// Render the collect-only listing
pub fn render_list(ids: &[String]) -> String {
    let mut out = String::new();
    for id in ids {
        out.push_str(id);
        out.push('\n');
    }
    out.push_str(&format!("{} case(s) collected\n", ids.len()));
    out
}

fn case_line(case: &CaseReport, verbosity: Verbosity) -> String {
    let mut line = format!("{:<5} {}", case.outcome.to_string(), case.id);
    if verbosity == Verbosity::Verbose {
        line.push_str(&format!(" ({:.2} ms)", case.duration_ms));
        if let Some(detail) = &case.detail {
            if case.outcome == OutcomeKind::Skipped || case.outcome == OutcomeKind::XFailed {
                line.push_str(&format!(" [{detail}]"));
            }
        }
    }
    line
}

/// The one-line summary: non-zero outcome buckets, deselection, wall time
fn footer(report: &RunReport) -> String {
    let counts = &report.counts;
    let mut parts = Vec::new();
    for (count, label) in [
        (counts.passed, "passed"),
        (counts.failed, "failed"),
        (counts.errored, "errored"),
        (counts.skipped, "skipped"),
        (counts.xfailed, "xfailed"),
        (counts.xpassed, "xpassed"),
    ] {
        if count > 0 {
            parts.push(format!("{count} {label}"));
        }
    }
    if report.deselected > 0 {
        parts.push(format!("{} deselected", report.deselected));
    }
    if parts.is_empty() {
        parts.push("no cases ran".to_string());
    }
    format!("{} in {:.2} ms", parts.join(", "), report.duration_ms)
}

#[cfg(test)]
mod tests {
    //! Unit tests for console rendering.
    use testrig_core::case::{ensure, Mark, TestCase};
    use testrig_core::{RunConfig, Runner, Suite};

    use super::*;

    fn sample_report() -> RunReport {
        let mut suite = Suite::new("render");
        suite.add("test_mod", TestCase::new("test_ok", |_ctx| Ok(())));
        suite.add("test_mod", TestCase::new("test_bad", |_ctx| ensure(false, "broke")));
        suite.add(
            "test_mod",
            TestCase::new("test_skipped", |_ctx| Ok(())).mark(Mark::skip_because("later")),
        );
        Runner::run(&suite, &RunConfig::default())
    }

    /// Validates the normal view: one line per case plus problems and
    /// footer.
    ///
    /// Assertions:
    /// - Confirms all outcomes appear, the failure detail is listed, and
    ///   the footer tallies each bucket.
    #[test]
    fn test_render_normal() {
        let rendered = render_run(&sample_report(), &RenderOptions::default());

        assert!(rendered.contains("PASS  test_mod::test_ok"));
        assert!(rendered.contains("FAIL  test_mod::test_bad"));
        assert!(rendered.contains("SKIP  test_mod::test_skipped"));
        assert!(rendered.contains("problems:"));
        assert!(rendered.contains("broke"));
        assert!(rendered.contains("1 passed, 1 failed, 1 skipped"));
    }

    /// Validates quiet mode hides passing lines but keeps problems.
    #[test]
    fn test_render_quiet() {
        let options = RenderOptions { verbosity: Verbosity::Quiet, ..RenderOptions::default() };
        let rendered = render_run(&sample_report(), &options);

        assert!(!rendered.contains("PASS  test_mod::test_ok"));
        assert!(rendered.contains("FAIL  test_mod::test_bad"));
        assert!(rendered.contains("1 passed, 1 failed, 1 skipped"));
    }

    /// Validates the slowest-N block renders ids with durations.
    #[test]
    fn test_render_durations() {
        let options = RenderOptions { durations: Some(2), ..RenderOptions::default() };
        let rendered = render_run(&sample_report(), &options);

        assert!(rendered.contains("slowest 2 case(s):"));
        assert!(rendered.contains("ms"));
    }

    /// Validates the collect-only listing and its count line.
    #[test]
    fn test_render_list() {
        let ids = vec!["test_mod::test_ok".to_string(), "test_mod::test_bad".to_string()];
        let rendered = render_list(&ids);
        assert!(rendered.starts_with("test_mod::test_ok\n"));
        assert!(rendered.ends_with("2 case(s) collected\n"));
    }
}
