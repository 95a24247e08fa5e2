//! Report exporters: JSON and a self-contained HTML page
//!
//! Both exporters consume the serializable [`RunReport`] the runner already
//! produced; there is no second bookkeeping pass. The HTML page embeds its
//! own stylesheet so the file can be archived or attached to a CI run as a
//! single artifact. All user-controlled text (case ids, failure details,
//! fixture names) goes through `html-escape` before it reaches the page.

use std::fmt::Write as _;
use std::path::Path;

use html_escape::encode_text;
use testrig_common::{HarnessError, HarnessResult};
use testrig_core::{OutcomeKind, RunReport};

/// Write the run report as pretty-printed JSON
pub fn write_json(report: &RunReport, path: &Path) -> HarnessResult<()> {
    let body = serde_json::to_string_pretty(report)
        .map_err(|e| HarnessError::serialization("json", e.to_string()))?;
    std::fs::write(path, body)
        .map_err(|e| HarnessError::report(path.display().to_string(), e.to_string()))?;
    tracing::info!(path = %path.display(), "wrote JSON report");
    Ok(())
}

/// Write the run report as a single HTML page
pub fn write_html(report: &RunReport, path: &Path) -> HarnessResult<()> {
    let body = render_html(report);
    std::fs::write(path, body)
        .map_err(|e| HarnessError::report(path.display().to_string(), e.to_string()))?;
    tracing::info!(path = %path.display(), "wrote HTML report");
    Ok(())
}

/// Build the HTML page in memory
pub fn render_html(report: &RunReport) -> String {
    let mut page = String::new();
    let _ = write!(
        page,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} run report</title>\n<style>\n{css}\n</style>\n</head>\n<body>\n",
        title = encode_text(&report.suite),
        css = STYLESHEET,
    );

    let verdict = if report.success() { "passed" } else { "failed" };
    let _ = write!(
        page,
        "<h1>{suite}</h1>\n<p class=\"meta\">started {started} &middot; \
         {duration:.2} ms &middot; run <span class=\"{verdict}\">{verdict}</span></p>\n",
        suite = encode_text(&report.suite),
        started = report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        duration = report.duration_ms,
    );

    let counts = &report.counts;
    let _ = write!(
        page,
        "<p class=\"meta\">{} passed, {} failed, {} errored, {} skipped, \
         {} xfailed, {} xpassed, {} deselected</p>\n",
        counts.passed,
        counts.failed,
        counts.errored,
        counts.skipped,
        counts.xfailed,
        counts.xpassed,
        report.deselected,
    );

    page.push_str("<table>\n<tr><th>case</th><th>outcome</th><th>duration</th><th>detail</th></tr>\n");
    for case in &report.cases {
        let _ = write!(
            page,
            "<tr class=\"{class}\"><td>{id}</td><td>{outcome}</td>\
             <td>{duration:.2} ms</td><td>{detail}</td></tr>\n",
            class = row_class(case.outcome),
            id = encode_text(&case.id),
            outcome = case.outcome,
            duration = case.duration_ms,
            detail = encode_text(case.detail.as_deref().unwrap_or("")),
        );
    }
    page.push_str("</table>\n");

    let warnings: Vec<_> = report
        .cases
        .iter()
        .flat_map(|c| &c.teardown_warnings)
        .chain(&report.teardown_warnings)
        .collect();
    if !warnings.is_empty() {
        page.push_str("<h2>Teardown warnings</h2>\n<ul>\n");
        for warning in warnings {
            let _ = write!(
                page,
                "<li><code>{fixture}</code>: {message}</li>\n",
                fixture = encode_text(&warning.fixture),
                message = encode_text(&warning.message),
            );
        }
        page.push_str("</ul>\n");
    }

    page.push_str("</body>\n</html>\n");
    page
}

fn row_class(outcome: OutcomeKind) -> &'static str {
    match outcome {
        OutcomeKind::Passed => "passed",
        OutcomeKind::Failed => "failed",
        OutcomeKind::Errored => "errored",
        OutcomeKind::Skipped => "skipped",
        OutcomeKind::XFailed => "xfailed",
        OutcomeKind::XPassed => "xpassed",
    }
}

const STYLESHEET: &str = "\
body { font-family: sans-serif; margin: 2em; }
.meta { color: #555; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #ccc; padding: 0.3em 0.6em; text-align: left; }
tr.passed td { background: #e8f5e9; }
tr.failed td, tr.errored td, tr.xpassed td { background: #ffebee; }
tr.skipped td, tr.xfailed td { background: #fffde7; }
span.passed { color: #2e7d32; }
span.failed { color: #c62828; }";
