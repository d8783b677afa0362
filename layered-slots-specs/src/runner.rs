//! Runs fixtures through the decomposer and compares the flattened output.

use crate::{load_all_fixtures, ExpectedFailures, HarnessResult, MatchMode, SlotFixture, SpecResult};
use layered_clauses::{Decomposition, Diagnostic, DiagnosticKind, SlotDecomposer};
use layered_slots::FlatSlot;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// One difference between expected and actual output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotMismatch {
    /// Flattened key path (`sub-o1.S`), or `diagnostics`
    pub path: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

impl fmt::Display for SlotMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "<absent>".to_string());
        write!(
            f,
            "{}: expected {}, got {}",
            self.path,
            show(&self.expected),
            show(&self.actual)
        )
    }
}

/// Result of running a fixture through the decomposer.
#[derive(Debug, Clone)]
pub struct FixtureRun {
    pub decomposition: Decomposition,
    pub mismatches: Vec<SlotMismatch>,
}

impl FixtureRun {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// `kind@path` label used by fixtures to name a diagnostic.
pub fn diagnostic_label(diagnostic: &Diagnostic) -> String {
    let kind = match diagnostic.kind {
        DiagnosticKind::RecursionLimitExceeded { .. } => "recursion_limit_exceeded",
        DiagnosticKind::NoPatternMatched => "no_pattern_matched",
        DiagnosticKind::EmptyCandidateSet => "empty_candidate_set",
    };
    format!("{}@{}", kind, diagnostic.path_label())
}

fn render(value: &FlatSlot) -> String {
    match value {
        FlatSlot::Text(text) => format!("{:?}", text),
        FlatSlot::Nested(_) => value.to_json().to_string(),
    }
}

fn compare(
    expected: &BTreeMap<String, FlatSlot>,
    actual: &BTreeMap<String, FlatSlot>,
    prefix: &str,
    mode: MatchMode,
    mismatches: &mut Vec<SlotMismatch>,
) {
    for (key, want) in expected {
        let path = format!("{}{}", prefix, key);
        match (want, actual.get(key)) {
            (FlatSlot::Text(want_text), Some(FlatSlot::Text(got))) if want_text == got => {}
            (FlatSlot::Nested(want_sub), Some(FlatSlot::Nested(got_sub))) => {
                compare(want_sub, got_sub, &format!("{}.", path), mode, mismatches);
            }
            (_, got) => mismatches.push(SlotMismatch {
                path,
                expected: Some(render(want)),
                actual: got.map(render),
            }),
        }
    }

    if mode == MatchMode::Exact {
        for (key, got) in actual {
            if !expected.contains_key(key) {
                mismatches.push(SlotMismatch {
                    path: format!("{}{}", prefix, key),
                    expected: None,
                    actual: Some(render(got)),
                });
            }
        }
    }
}

/// Decompose a fixture and compare it with its expectations.
pub fn run_fixture(fixture: &SlotFixture, decomposer: &SlotDecomposer) -> SpecResult<FixtureRun> {
    let sentence = fixture.sentence()?;
    let decomposition = match fixture.max_depth {
        Some(max_depth) => decomposer
            .clone()
            .with_max_depth(max_depth)
            .decompose(&sentence)?,
        None => decomposer.decompose(&sentence)?,
    };

    let mut mismatches = Vec::new();
    compare(
        &fixture.expected,
        &decomposition.flatten(),
        "",
        fixture.mode,
        &mut mismatches,
    );

    let labels: Vec<String> = decomposition.diagnostics.iter().map(diagnostic_label).collect();
    if labels != fixture.expect_diagnostics {
        mismatches.push(SlotMismatch {
            path: "diagnostics".to_string(),
            expected: Some(format!("{:?}", fixture.expect_diagnostics)),
            actual: Some(format!("{:?}", labels)),
        });
    }

    Ok(FixtureRun {
        decomposition,
        mismatches,
    })
}

/// Run every fixture under `dir`, classifying failures against the
/// expected-failures file at `failures`.
pub fn run_harness(
    dir: &Path,
    failures: &Path,
    decomposer: &SlotDecomposer,
) -> SpecResult<HarnessResult> {
    let expected = ExpectedFailures::load(failures)?;
    let mut result = HarnessResult::new();

    for (name, fixture) in load_all_fixtures(dir)? {
        let run = run_fixture(&fixture, decomposer)?;
        result.fixtures += 1;
        // leaves plus the diagnostics check
        let checks = fixture.expected_leaves() + 1;
        result.record_passes(checks.saturating_sub(run.mismatches.len()));
        for mismatch in run.mismatches {
            let state = expected.is_expected(&name, &mismatch.path);
            result.record_failure(state, format!("{}: {}", name, mismatch));
        }
    }

    Ok(result)
}

/// Multi-line report for a failed fixture.
pub fn format_failure(name: &str, fixture: &SlotFixture, run: &FixtureRun) -> String {
    let mut output = format!("FAIL: {}", name);
    if let Some(title) = &fixture.title {
        output.push_str(&format!(" ({})", title));
    }
    output.push('\n');
    for mismatch in &run.mismatches {
        output.push_str(&format!("  \u{2717} {}\n", mismatch));
    }
    output.push_str(&format!("  actual: {}\n", run.decomposition.to_json()));
    output
}

/// One-line summary of a harness run.
pub fn format_summary(result: &HarnessResult) -> String {
    format!(
        "{} fixtures, {} checks: {} passed, {} expected failures, {} regressions",
        result.fixtures, result.total, result.passed, result.expected_failures, result.regressions
    )
}
