//! Integration tests for the full CLI surface
//!
//! This test suite drives `run_cli` end to end with parsed argument
//! vectors, focusing on:
//! - Exit status for green, failing, and filtered runs
//! - Report files written where the flags pointed
//! - Collect-only listing and selection narrowing
//! - The shipped demo suite staying green through the CLI path

use clap::Parser;
use testrig_cli::{demo, run_cli, Args, ExitStatus};
use testrig_core::case::{ensure, Mark, TestCase};
use testrig_core::Suite;

// ============================================================================
// Test Setup Helpers
// ============================================================================

fn parse(argv: &[&str]) -> Args {
    Args::try_parse_from(std::iter::once("testrig").chain(argv.iter().copied()))
        .expect("test argv should parse")
}

/// Two modules with one deliberate failure, for exit-code and filter tests
fn failing_suite() -> Suite {
    let mut suite = Suite::new("cli-sample");
    suite.add("test_cart", TestCase::new("test_add", |_ctx| Ok(())));
    suite.add(
        "test_cart",
        TestCase::new("test_overflow", |_ctx| ensure(false, "sixth item accepted"))
            .mark(Mark::label("slow")),
    );
    suite.add("test_pricing", TestCase::new("test_total", |_ctx| Ok(())));
    suite
}

// ============================================================================
// Exit Status
// ============================================================================

/// Validates the three exit paths of a run.
///
/// # Test Steps
/// 1. Run the failing suite unfiltered, then filtered down to passing
///    cases, then with an unwritable report path.
///
/// Assertions:
/// - Confirms problems give status 1, a green selection gives 0, and the
///   broken invocation errors out.
#[test]
fn test_exit_status_paths() -> anyhow::Result<()> {
    let suite = failing_suite();

    let status = run_cli(&suite, &parse(&[]))?;
    assert_eq!(status, ExitStatus::Problems);

    let status = run_cli(&suite, &parse(&["test_pricing"]))?;
    assert_eq!(status, ExitStatus::Success);

    let err = run_cli(&suite, &parse(&["--report-json", "/nonexistent-dir/run.json"]));
    assert!(err.is_err());
    Ok(())
}

/// Validates a blank filter value aborts the invocation as a usage error.
///
/// Assertions:
/// - Confirms `run_cli` errors instead of silently matching every case,
///   and the error is classified so `main` exits with status 2.
#[test]
fn test_blank_filter_is_usage_error() {
    use testrig_common::ErrorClassification;

    let err = run_cli(&failing_suite(), &parse(&["-k", ""])).unwrap_err();
    assert!(err.to_string().contains("-k/--keyword"));
    assert!(err.is_usage());

    let err = run_cli(&failing_suite(), &parse(&["--list", "-m", "  "])).unwrap_err();
    assert!(err.to_string().contains("-m/--mark"));
}

/// Validates selecting one case by its `module::name` target.
#[test]
fn test_exact_target_selects_one_case() -> anyhow::Result<()> {
    let suite = failing_suite();
    let status = run_cli(&suite, &parse(&["test_cart::test_add"]))?;
    assert_eq!(status, ExitStatus::Success);
    Ok(())
}

/// Validates keyword and label filters through the flag surface.
///
/// Assertions:
/// - Confirms `-k` narrowing to the failing case keeps status 1 while the
///   label filter on a passing subset does not exist here, so `-m slow`
///   also reports the failure.
#[test]
fn test_keyword_and_label_filters() -> anyhow::Result<()> {
    let suite = failing_suite();

    let status = run_cli(&suite, &parse(&["-k", "overflow"]))?;
    assert_eq!(status, ExitStatus::Problems);

    let status = run_cli(&suite, &parse(&["-m", "slow"]))?;
    assert_eq!(status, ExitStatus::Problems);

    let status = run_cli(&suite, &parse(&["-k", "total"]))?;
    assert_eq!(status, ExitStatus::Success);
    Ok(())
}

// ============================================================================
// Reports
// ============================================================================

/// Validates the JSON report lands on disk with the run's content.
///
/// # Test Steps
/// 1. Run the failing suite with `--report-json` into a temp directory.
/// 2. Parse the file back.
///
/// Assertions:
/// - Confirms counts and the failing case's detail survive the export.
#[test]
fn test_json_report_written() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("run.json");
    let argv_path = path.to_string_lossy().to_string();

    let status = run_cli(&failing_suite(), &parse(&["--report-json", &argv_path]))?;
    assert_eq!(status, ExitStatus::Problems);

    let parsed: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(parsed["suite"], "cli-sample");
    assert_eq!(parsed["counts"]["passed"], 2);
    assert_eq!(parsed["counts"]["failed"], 1);
    let failing = parsed["cases"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["outcome"] == "failed")
        .unwrap();
    assert!(failing["detail"].as_str().unwrap().contains("sixth item accepted"));
    Ok(())
}

/// Validates the HTML report is a complete page with escaped content.
#[test]
fn test_html_report_written() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("run.html");
    let argv_path = path.to_string_lossy().to_string();

    run_cli(&failing_suite(), &parse(&["--report-html", &argv_path]))?;

    let page = std::fs::read_to_string(&path)?;
    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains("test_cart::test_overflow"));
    assert!(page.contains("sixth item accepted"));
    Ok(())
}

// ============================================================================
// Collect-Only and Demo
// ============================================================================

/// Validates `--list` runs nothing and always succeeds.
///
/// Assertions:
/// - Confirms the status is success even though the suite contains a
///   failing case, because nothing executed.
#[test]
fn test_list_mode_runs_nothing() -> anyhow::Result<()> {
    let status = run_cli(&failing_suite(), &parse(&["--list"]))?;
    assert_eq!(status, ExitStatus::Success);

    let status = run_cli(&failing_suite(), &parse(&["--list", "-k", "overflow"]))?;
    assert_eq!(status, ExitStatus::Success);
    Ok(())
}

/// Validates the shipped demo suite through the CLI path, shuffled.
///
/// Assertions:
/// - Confirms the demo stays green under an arbitrary seed with reports
///   enabled, exercising every surface in one invocation.
#[test]
fn test_demo_suite_through_cli() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let json = dir.path().join("demo.json").to_string_lossy().to_string();
    let html = dir.path().join("demo.html").to_string_lossy().to_string();

    let suite = demo::demo_suite()?;
    let status = run_cli(
        &suite,
        &parse(&[
            "--shuffle-seed",
            "42",
            "--durations",
            "3",
            "--report-json",
            &json,
            "--report-html",
            &html,
        ]),
    )?;

    assert_eq!(status, ExitStatus::Success);
    assert!(std::path::Path::new(&json).exists());
    assert!(std::path::Path::new(&html).exists());
    Ok(())
}
