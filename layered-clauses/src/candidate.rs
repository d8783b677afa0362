//! Proposed slot fillers.

use crate::ModifierCategory;
use layered_slots::{Relation, SlotKey, Span};
use serde::Serialize;

/// Which family of rules proposed a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CandidateSource {
    /// A core argument from the clause pattern mapping
    Pattern { relation: Relation },
    /// One half of an indirect + direct object pair
    DitransitivePair,
    /// The auxiliary group before the predicate
    Auxiliary,
    Modifier { category: ModifierCategory },
    /// Generic assignment of material no core rule claimed
    Fallback,
}

impl CandidateSource {
    pub fn description(&self) -> &'static str {
        match self {
            CandidateSource::Pattern { .. } => "clause pattern argument",
            CandidateSource::DitransitivePair => "ditransitive object pair",
            CandidateSource::Auxiliary => "auxiliary group",
            CandidateSource::Modifier { category } => category.description(),
            CandidateSource::Fallback => "fallback",
        }
    }
}

/// A not-yet-final slot filler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub slot: SlotKey,
    pub span: Span,
    /// Root token of the filler
    pub root: usize,
    pub priority: u32,
    /// In `[0, 1]`
    pub confidence: f64,
    pub rule_id: String,
    /// Whether the span covers more than one token
    pub is_phrase: bool,
    pub source: CandidateSource,
    /// Normalized text, when it differs from the span text
    pub surface: Option<String>,
    /// Modifier slots to fall back on, in order, when this candidate keeps
    /// its tokens but loses its slot
    pub alternates: Vec<SlotKey>,
}

impl Candidate {
    pub fn new(
        slot: SlotKey,
        span: Span,
        root: usize,
        priority: u32,
        rule_id: impl Into<String>,
        source: CandidateSource,
    ) -> Self {
        let is_phrase = span.len() > 1;
        Self {
            slot,
            span,
            root,
            priority,
            confidence: 1.0,
            rule_id: rule_id.into(),
            is_phrase,
            source,
            surface: None,
            alternates: Vec::new(),
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_surface(mut self, surface: impl Into<String>) -> Self {
        let surface = surface.into();
        self.surface = if surface == self.span.text {
            None
        } else {
            Some(surface)
        };
        self
    }

    pub fn with_alternates(mut self, alternates: impl IntoIterator<Item = SlotKey>) -> Self {
        self.alternates = alternates.into_iter().collect();
        self
    }

    /// The text the slot will carry.
    pub fn text(&self) -> &str {
        self.surface.as_deref().unwrap_or(&self.span.text)
    }

    pub fn is_ditransitive_pair(&self) -> bool {
        self.source == CandidateSource::DitransitivePair
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layered_slots::SpanRef;

    fn span(start: usize, end: usize, text: &str) -> Span {
        Span {
            range: SpanRef::new(start, end),
            text: text.to_string(),
        }
    }

    #[test]
    fn confidence_is_clamped() {
        let candidate = Candidate::new(SlotKey::V, span(1, 1, "ran"), 1, 100, "core.root", CandidateSource::Fallback)
            .with_confidence(1.7);
        assert_eq!(candidate.confidence, 1.0);
        let candidate = candidate.with_confidence(-0.2);
        assert_eq!(candidate.confidence, 0.0);
    }

    #[test]
    fn surface_overrides_span_text() {
        let candidate = Candidate::new(SlotKey::Aux, span(1, 2, "ca n't"), 1, 100, "aux.group", CandidateSource::Auxiliary);
        assert!(candidate.is_phrase);
        assert_eq!(candidate.text(), "ca n't");

        let normalized = candidate.clone().with_surface("can not");
        assert_eq!(normalized.text(), "can not");

        let unchanged = candidate.with_surface("ca n't");
        assert_eq!(unchanged.surface, None);
    }
}
