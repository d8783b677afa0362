//! Recoverable conditions reported next to a decomposition.

use layered_slots::{SlotKey, SpanRef};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    /// A slot needed nesting at the depth bound and was left as a leaf.
    RecursionLimitExceeded { max_depth: usize },
    /// The clause matched no pattern; fallback rules still ran.
    NoPatternMatched,
    /// No rule proposed anything for the clause.
    EmptyCandidateSet,
}

impl DiagnosticKind {
    pub fn description(&self) -> &'static str {
        match self {
            DiagnosticKind::RecursionLimitExceeded { .. } => "recursion limit exceeded",
            DiagnosticKind::NoPatternMatched => "no clause pattern matched",
            DiagnosticKind::EmptyCandidateSet => "no slot candidates",
        }
    }
}

/// A diagnostic with the slot path that leads to it from the top-level
/// clause. An empty path is the top-level clause itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub path: Vec<SlotKey>,
    pub span: SpanRef,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, path: Vec<SlotKey>, span: SpanRef) -> Self {
        Self { kind, path, span }
    }

    /// The path as flattened output keys: `sub-o1.sub-m3.S` style, with the
    /// last element as a plain slot label.
    pub fn path_label(&self) -> String {
        match self.path.split_last() {
            None => String::from("<clause>"),
            Some((last, parents)) => parents
                .iter()
                .map(SlotKey::sub_label)
                .chain(std::iter::once(last.label()))
                .collect::<Vec<_>>()
                .join("."),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {} ({})", self.kind.description(), self.path_label(), self.span)?;
        if let DiagnosticKind::RecursionLimitExceeded { max_depth } = self.kind {
            write!(f, ", max depth {}", max_depth)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_slot_path() {
        let diagnostic = Diagnostic::new(
            DiagnosticKind::RecursionLimitExceeded { max_depth: 1 },
            vec![SlotKey::O1, SlotKey::O1],
            SpanRef::new(5, 10),
        );
        assert_eq!(
            diagnostic.to_string(),
            "recursion limit exceeded at sub-o1.O1 (5..=10), max depth 1"
        );

        let top = Diagnostic::new(DiagnosticKind::NoPatternMatched, Vec::new(), SpanRef::new(0, 2));
        assert_eq!(top.to_string(), "no clause pattern matched at <clause> (0..=2)");
    }
}
