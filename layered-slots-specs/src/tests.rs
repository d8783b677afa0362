use crate::{
    format_failure, format_summary, load_all_fixtures, run_fixture, run_harness, MatchMode,
    SlotFixture,
};
use layered_clauses::{DiagnosticKind, SlotDecomposer};
use layered_slots::FlatSlot;
use std::path::{Path, PathBuf};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

fn load(name: &str) -> SlotFixture {
    crate::load_fixture(&fixtures_dir().join(name))
        .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

#[test]
fn test_every_fixture_passes() {
    let decomposer = SlotDecomposer::default();
    let mut report = String::new();
    for (name, fixture) in load_all_fixtures(&fixtures_dir()).unwrap() {
        let run = run_fixture(&fixture, &decomposer).unwrap();
        if !run.passed() {
            report.push_str(&format_failure(&name, &fixture, &run));
        }
    }
    assert!(report.is_empty(), "{}", report);
}

#[test]
fn test_harness_has_no_regressions() {
    let failures = Path::new(env!("CARGO_MANIFEST_DIR")).join("failures.toml");
    let result = run_harness(&fixtures_dir(), &failures, &SlotDecomposer::default()).unwrap();

    assert!(result.success(), "{:#?}", result.regression_details);
    assert_eq!(result.fixtures, 12);
    assert_eq!(result.passed, result.total);
    assert!(format_summary(&result).ends_with("0 expected failures, 0 regressions"));
}

#[test]
fn test_relative_object_fixture() {
    let fixture = load("relative-object.toml");

    assert_eq!(fixture.mode, MatchMode::Exact);
    assert_eq!(fixture.max_depth, None);
    assert_eq!(fixture.expected_leaves(), 6);
    let sub = fixture.expected["sub-o1"].as_nested().unwrap();
    assert_eq!(sub["S"], FlatSlot::Text("she".to_string()));
}

#[test]
fn test_depth_limit_fixture_reports_recursion() {
    let fixture = load("clause-chain-depth-limit.toml");
    let run = run_fixture(&fixture, &SlotDecomposer::default()).unwrap();

    assert!(run.passed(), "{:?}", run.mismatches);
    assert!(run
        .decomposition
        .has_diagnostic(&DiagnosticKind::RecursionLimitExceeded { max_depth: 1 }));
}

#[test]
fn test_fixture_depth_overrides_decomposer() {
    // The decomposer's own bound is ignored when the fixture sets one.
    let fixture = load("clause-chain-depth-limit.toml");
    let run = run_fixture(&fixture, &SlotDecomposer::default().with_max_depth(5)).unwrap();
    assert_eq!(run.decomposition.slots.nesting_depth(), 1);
}
