//! Core types for `.toml` slot fixtures.
//!
//! ```toml
//! title = "Relative clause object"
//! conll = """
//! 1 I I PRON 2 nsubj
//! 2 read read VERB 0 ROOT
//! ...
//! """
//! mode = "subset"
//! expect_diagnostics = ["recursion_limit_exceeded@sub-o1.O1"]
//!
//! [expected]
//! S = "I"
//! O1 = ""
//!
//! [expected.sub-o1]
//! S = "she"
//! ```

use layered_slots::{FlatSlot, ParsedSentence};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::SpecResult;

/// How the expected slot map is compared with the decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Every key must match, and no extra keys may appear.
    Exact,
    /// Only the listed keys are checked.
    Subset,
}

impl Default for MatchMode {
    fn default() -> Self {
        MatchMode::Exact
    }
}

/// A parsed slot fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotFixture {
    /// Optional human-readable title
    #[serde(default)]
    pub title: Option<String>,
    /// The sentence, already parsed, as CoNLL lines
    pub conll: String,
    /// Overrides the recursion bound for this fixture
    #[serde(default)]
    pub max_depth: Option<usize>,
    #[serde(default)]
    pub mode: MatchMode,
    /// Expected flattened output
    #[serde(default)]
    pub expected: BTreeMap<String, FlatSlot>,
    /// Expected diagnostics as `kind@path` labels, in emission order
    #[serde(default)]
    pub expect_diagnostics: Vec<String>,
}

impl SlotFixture {
    /// Validate the fixture's CoNLL block.
    pub fn sentence(&self) -> SpecResult<ParsedSentence> {
        Ok(ParsedSentence::from_conll(&self.conll)?)
    }

    /// Number of leaf expectations, nested maps included.
    pub fn expected_leaves(&self) -> usize {
        fn count(map: &BTreeMap<String, FlatSlot>) -> usize {
            map.values()
                .map(|value| match value {
                    FlatSlot::Text(_) => 1,
                    FlatSlot::Nested(sub) => count(sub),
                })
                .sum()
        }
        count(&self.expected)
    }
}
