//! Integration tests for doubles and patching inside real test runs
//!
//! This test suite drives doubles through the runner instead of poking them
//! directly, focusing on:
//! - Verification contracts surfacing as ordinary case failures
//! - The uninvoked-double distinction (zero calls vs one call)
//! - Patch restoration across case boundaries, including after panics
//! - A double delivered to cases through a fixture

use testrig_core::case::{ensure, ensure_eq, OutcomeKind, TestCase};
use testrig_core::double::patch::Patchable;
use testrig_core::double::Double;
use testrig_core::fixture::Fixture;
use testrig_core::runner::{RunConfig, Runner};
use testrig_core::suite::Suite;

fn outcome_of(report: &testrig_core::RunReport, id: &str) -> OutcomeKind {
    report
        .cases
        .iter()
        .find(|c| c.id == id)
        .unwrap_or_else(|| panic!("case '{id}' missing from report"))
        .outcome
}

/// Validates a failed double expectation fails the case with the call log.
///
/// # Test Steps
/// 1. Hand a fixed-return double to a case through a fixture.
/// 2. Call it twice, then verify "called exactly once with".
///
/// Assertions:
/// - Confirms the case failed (not errored) and the detail lists both
///   recorded calls.
#[test]
fn test_failed_expectation_fails_case_with_diagnostic() {
    let mut suite = Suite::new("expectation");
    suite
        .register_fixture(Fixture::new("lookup", |_ctx| {
            Ok::<_, String>(Double::<String, u32>::returning("price_lookup", 3))
        }))
        .unwrap();

    suite.add(
        "test_mod",
        TestCase::new("test_overcalled", |ctx| {
            let lookup = ctx.fixture::<Double<String, u32>>("lookup")?;
            lookup.call("coffee".to_string());
            lookup.call("milk".to_string());
            lookup.verify_called_once_with(&"coffee".to_string())?;
            Ok(())
        })
        .uses(["lookup"]),
    );

    let report = Runner::run(&suite, &RunConfig::default());

    assert_eq!(outcome_of(&report, "test_mod::test_overcalled"), OutcomeKind::Failed);
    let detail = report.cases[0].detail.clone().unwrap();
    assert!(detail.contains("price_lookup"));
    assert!(detail.contains("coffee"));
    assert!(detail.contains("milk"));
}

/// Validates the uninvoked-double distinction inside case bodies.
///
/// Assertions:
/// - Confirms asserting zero calls passes while asserting one call fails,
///   on the same untouched double.
#[test]
fn test_uninvoked_double_contract() {
    let mut suite = Suite::new("uninvoked");
    suite
        .register_fixture(Fixture::new("notifier", |_ctx| {
            Ok::<_, String>(Double::<String, ()>::returning("notifier", ()))
        }))
        .unwrap();

    suite.add(
        "test_mod",
        TestCase::new("test_never_notified", |ctx| {
            let notifier = ctx.fixture::<Double<String, ()>>("notifier")?;
            notifier.verify_call_count(0)?;
            ensure(!notifier.was_called(), "notifier should be untouched")
        })
        .uses(["notifier"]),
    );
    suite.add(
        "test_mod",
        TestCase::new("test_expected_one_call", |ctx| {
            let notifier = ctx.fixture::<Double<String, ()>>("notifier")?;
            notifier.verify_call_count(1)?;
            Ok(())
        })
        .uses(["notifier"]),
    );

    let report = Runner::run(&suite, &RunConfig::default());
    assert_eq!(outcome_of(&report, "test_mod::test_never_notified"), OutcomeKind::Passed);
    assert_eq!(outcome_of(&report, "test_mod::test_expected_one_call"), OutcomeKind::Failed);
}

/// Validates sequence exhaustion inside a body reports as a failure naming
/// the double.
#[test]
fn test_sequence_exhaustion_fails_case() {
    let mut suite = Suite::new("exhaustion");
    suite.add(
        "test_mod",
        TestCase::new("test_pages", |_ctx| {
            let pages: Double<(), &str> = Double::with_sequence("pager", ["first"]);
            ensure_eq(&pages.call(()), &"first")?;
            let _ = pages.call(());
            Ok(())
        }),
    );

    let report = Runner::run(&suite, &RunConfig::default());
    assert_eq!(outcome_of(&report, "test_mod::test_pages"), OutcomeKind::Failed);
    assert!(report.cases[0].detail.clone().unwrap().contains("pager"));
}

/// Validates patch restoration across case boundaries.
///
/// # Test Steps
/// 1. Share one `Patchable` endpoint with three cases.
/// 2. First case patches and passes; second patches and panics; third reads
///    the slot without patching.
/// 3. Run the cases in registration order.
///
/// Assertions:
/// - Confirms the third case observed the original value, so neither the
///   passing nor the panicking case leaked its stand-in.
#[test]
fn test_patch_never_leaks_between_cases() {
    let endpoint = Patchable::new("endpoint", String::from("https://real.example.com"));

    let mut suite = Suite::new("patching");
    let first = endpoint.clone();
    suite.add(
        "test_mod",
        TestCase::new("test_patched_pass", move |_ctx| {
            let _guard = first.patch(String::from("http://localhost:1"));
            ensure_eq(&*first.get(), &"http://localhost:1".to_string())
        }),
    );
    let second = endpoint.clone();
    suite.add(
        "test_mod",
        TestCase::new("test_patched_panic", move |_ctx| {
            let _guard = second.patch(String::from("http://localhost:2"));
            panic!("body exploded while patched");
        }),
    );
    let third = endpoint.clone();
    suite.add(
        "test_mod",
        TestCase::new("test_sees_original", move |_ctx| {
            ensure_eq(&*third.get(), &"https://real.example.com".to_string())
        }),
    );

    let report = Runner::run(&suite, &RunConfig::default());

    assert_eq!(outcome_of(&report, "test_mod::test_patched_pass"), OutcomeKind::Passed);
    assert_eq!(outcome_of(&report, "test_mod::test_patched_panic"), OutcomeKind::Failed);
    assert_eq!(outcome_of(&report, "test_mod::test_sees_original"), OutcomeKind::Passed);
}

/// Validates a computed double driving behavior that the body then verifies
/// end to end.
///
/// Assertions:
/// - Confirms the computed answers and the recorded argument order both
///   match what the body sent.
#[test]
fn test_computed_double_end_to_end() {
    let mut suite = Suite::new("computed");
    suite.add(
        "test_mod",
        TestCase::new("test_price_table", |_ctx| {
            let prices: Double<String, Option<u32>> =
                Double::computing("prices", |item: &String| match item.as_str() {
                    "water" => Some(1),
                    "coffee" => Some(3),
                    _ => None,
                });

            ensure_eq(&prices.call("water".to_string()), &Some(1))?;
            ensure_eq(&prices.call("tea".to_string()), &None)?;
            prices.verify_call_count(2)?;

            let recorded: Vec<String> =
                prices.calls().into_iter().map(|record| record.args).collect();
            ensure_eq(&recorded, &vec!["water".to_string(), "tea".to_string()])
        }),
    );

    let report = Runner::run(&suite, &RunConfig::default());
    assert!(report.success(), "{:?}", report.problems());
}

/// Validates a fixture-provided patch target restored by its teardown.
///
/// Assertions:
/// - Confirms the slot holds the stand-in during the case and the original
///   after the run.
#[test]
fn test_patch_guard_held_by_fixture_value() {
    let clock = Patchable::new("clock", 1_700_000_000_u64);

    let mut suite = Suite::new("fixture-patch");
    let for_setup = clock.clone();
    // the cached guard drops with the unit scope, which restores the slot
    suite
        .register_fixture(Fixture::new("frozen_clock", move |_ctx| {
            Ok::<_, String>(for_setup.patch(42))
        }))
        .unwrap();

    let in_body = clock.clone();
    suite.add(
        "test_mod",
        TestCase::new("test_frozen_time", move |_ctx| ensure_eq(&*in_body.get(), &42)).uses([
            "frozen_clock",
        ]),
    );

    let report = Runner::run(&suite, &RunConfig::default());
    assert!(report.success(), "{:?}", report.problems());
    assert_eq!(*clock.get(), 1_700_000_000);
}
