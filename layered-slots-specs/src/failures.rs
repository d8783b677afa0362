//! Expected failures tracking via TOML file.
//!
//! ```toml
//! [[known]]
//! fixture = "aux-chain.toml"
//! slot = "Aux"
//! reason = "only the auxiliary run next to the verb is grouped"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::SpecError;

/// Loaded expected failures configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpectedFailures {
    /// Known failures (won't fix soon).
    #[serde(default)]
    pub known: Vec<FailureEntry>,
    /// Pending failures (awaiting fix).
    #[serde(default)]
    pub pending: Vec<FailureEntry>,
}

/// A single expected failure entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureEntry {
    /// Fixture file name, relative to the fixture directory.
    pub fixture: String,
    /// Flattened slot path (`sub-o1.S`), or `diagnostics`.
    pub slot: String,
    #[serde(default)]
    pub reason: Option<String>,
    /// Date added (YYYY-MM-DD).
    #[serde(default)]
    pub added: Option<String>,
}

/// Failure lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureState {
    /// Known limitation, won't fix soon.
    Known,
    /// Awaiting fix, not blocking.
    Pending,
    /// Expected to pass - failure is a regression.
    Regression,
}

impl ExpectedFailures {
    /// Load from a TOML file. A missing file means no expected failures.
    pub fn load(path: &Path) -> Result<Self, SpecError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| SpecError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| SpecError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Check if a failure is expected.
    pub fn is_expected(&self, fixture: &str, slot: &str) -> FailureState {
        if self.known.iter().any(|entry| entry.matches(fixture, slot)) {
            return FailureState::Known;
        }
        if self.pending.iter().any(|entry| entry.matches(fixture, slot)) {
            return FailureState::Pending;
        }
        FailureState::Regression
    }

    /// Count total expected failures.
    pub fn count(&self) -> usize {
        self.known.len() + self.pending.len()
    }
}

impl FailureEntry {
    fn matches(&self, fixture: &str, slot: &str) -> bool {
        self.fixture == fixture && self.slot == slot
    }
}

/// Result of running the harness.
#[derive(Debug, Clone, Default)]
pub struct HarnessResult {
    /// Fixtures run.
    pub fixtures: usize,
    /// Slot checks made.
    pub total: usize,
    pub passed: usize,
    /// Expected failures (known + pending).
    pub expected_failures: usize,
    /// Regressions (unexpected failures).
    pub regressions: usize,
    /// One line per regression, `fixture: slot: message`.
    pub regression_details: Vec<String>,
}

impl HarnessResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all tests passed (no regressions).
    pub fn success(&self) -> bool {
        self.regressions == 0
    }

    pub fn record_passes(&mut self, count: usize) {
        self.total += count;
        self.passed += count;
    }

    /// Record a failed check with its state.
    pub fn record_failure(&mut self, state: FailureState, detail: impl Into<String>) {
        self.total += 1;
        match state {
            FailureState::Known | FailureState::Pending => {
                self.expected_failures += 1;
            }
            FailureState::Regression => {
                self.regressions += 1;
                self.regression_details.push(detail.into());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn entry(fixture: &str, slot: &str) -> FailureEntry {
        FailureEntry {
            fixture: fixture.to_string(),
            slot: slot.to_string(),
            reason: None,
            added: None,
        }
    }

    #[test]
    fn test_is_expected() {
        let failures = ExpectedFailures {
            known: vec![entry("a.toml", "Aux")],
            pending: vec![entry("b.toml", "sub-o1.S")],
        };
        assert_eq!(failures.is_expected("a.toml", "Aux"), FailureState::Known);
        assert_eq!(failures.is_expected("b.toml", "sub-o1.S"), FailureState::Pending);
        assert_eq!(failures.is_expected("b.toml", "S"), FailureState::Regression);
    }

    #[test]
    fn test_harness_result_record() {
        let mut result = HarnessResult::new();

        result.record_passes(2);
        assert_eq!(result.total, 2);
        assert_eq!(result.passed, 2);

        result.record_failure(FailureState::Known, "a.toml: Aux");
        assert_eq!(result.expected_failures, 1);
        assert!(result.success());

        result.record_failure(FailureState::Regression, "b.toml: S");
        assert_eq!(result.total, 4);
        assert_eq!(result.regressions, 1);
        assert_eq!(result.regression_details, vec!["b.toml: S".to_string()]);
        assert!(!result.success());
    }

    #[test]
    fn test_load_from_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[[pending]]
fixture = "relative.toml"
slot = "sub-o1.O1"
reason = "Awaiting implementation"
added = "2026-01-06"

[[known]]
fixture = "aux.toml"
slot = "Aux"
"#
        )
        .unwrap();

        let failures = ExpectedFailures::load(file.path()).unwrap();
        assert_eq!(failures.count(), 2);
        assert_eq!(
            failures.is_expected("relative.toml", "sub-o1.O1"),
            FailureState::Pending
        );
    }

    #[test]
    fn test_load_nonexistent_returns_empty() {
        let failures = ExpectedFailures::load(Path::new("/nonexistent/path.toml")).unwrap();
        assert_eq!(failures.count(), 0);
    }
}
