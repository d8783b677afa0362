//! When a slot filler is complex enough to be decomposed again.

use layered_slots::{ParsedSentence, Pos, SpanRef};
use serde::{Deserialize, Serialize};

/// Thresholds for [`needs_nesting`] and the recursion bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NestingPolicy {
    /// Longest span, in tokens, that always stays flat
    pub max_flat_tokens: usize,
    /// Most modifier-class relations a flat span may carry
    pub max_modifiers: usize,
    /// Deepest nesting level that is still decomposed
    pub max_depth: usize,
}

impl NestingPolicy {
    pub const DEFAULT_MAX_DEPTH: usize = 8;

    pub fn new() -> Self {
        Self {
            max_flat_tokens: 1,
            max_modifiers: 1,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_flat_tokens(mut self, max_flat_tokens: usize) -> Self {
        self.max_flat_tokens = max_flat_tokens;
        self
    }

    pub fn with_max_modifiers(mut self, max_modifiers: usize) -> Self {
        self.max_modifiers = max_modifiers;
        self
    }
}

impl Default for NestingPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the filler covering `range` should be decomposed recursively.
///
/// True when any of:
/// - the span is longer than `max_flat_tokens`
/// - a token in it introduces a clause (`relcl`, `acl`, `advcl`, `xcomp`,
///   `ccomp`, `csubj`, `csubjpass`)
/// - it carries more than `max_modifiers` modifier-class relations
pub fn needs_nesting(sentence: &ParsedSentence, range: SpanRef, policy: &NestingPolicy) -> bool {
    if range.len() > policy.max_flat_tokens {
        return true;
    }
    let tokens = sentence.tokens_in(range);
    if tokens.iter().any(|token| token.relation.is_clausal()) {
        return true;
    }
    let modifiers = tokens
        .iter()
        .filter(|token| token.relation.is_modifier_class())
        .count();
    modifiers > policy.max_modifiers
}

/// Whether a span holds something a nested clause could be built around.
///
/// Used to decide if stopping at the depth bound loses a clause.
pub fn contains_predicate(sentence: &ParsedSentence, range: SpanRef) -> bool {
    sentence
        .tokens_in(range)
        .iter()
        .any(|token| token.pos == Pos::Verb || token.relation.is_clausal())
}
