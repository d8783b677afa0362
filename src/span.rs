//! Token ranges and subtree boundary resolution.

use crate::{ClauseContext, ParsedSentence, Relation, SlotError, SlotResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A reference to a token range within a sentence.
///
/// Both indices are inclusive and refer to token positions (not character positions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpanRef {
    /// Inclusive start token index
    pub start_idx: usize,
    /// Inclusive end token index
    pub end_idx: usize,
}

impl SpanRef {
    /// Create a new span reference. The bounds are swapped if given out of order.
    pub fn new(start_idx: usize, end_idx: usize) -> Self {
        if start_idx <= end_idx {
            Self { start_idx, end_idx }
        } else {
            Self {
                start_idx: end_idx,
                end_idx: start_idx,
            }
        }
    }

    pub fn single(idx: usize) -> Self {
        Self::new(idx, idx)
    }

    pub fn len(&self) -> usize {
        self.end_idx - self.start_idx + 1
    }

    /// A span always covers at least one token.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, idx: usize) -> bool {
        self.start_idx <= idx && idx <= self.end_idx
    }

    pub fn contains_span(&self, other: &SpanRef) -> bool {
        self.start_idx <= other.start_idx && other.end_idx <= self.end_idx
    }

    pub fn overlaps(&self, other: &SpanRef) -> bool {
        self.start_idx <= other.end_idx && other.start_idx <= self.end_idx
    }

    /// Smallest span covering both.
    pub fn hull(&self, other: &SpanRef) -> SpanRef {
        SpanRef::new(
            self.start_idx.min(other.start_idx),
            self.end_idx.max(other.end_idx),
        )
    }

    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        self.start_idx..=self.end_idx
    }
}

impl fmt::Display for SpanRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start_idx, self.end_idx)
    }
}

/// A token range together with its rendered surface text.
///
/// The text is always the whitespace-joined token texts of the range, in
/// position order; use [`Span::of`] to build one from a sentence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub range: SpanRef,
    pub text: String,
}

impl Span {
    pub fn of(sentence: &ParsedSentence, range: SpanRef) -> Self {
        Self {
            range,
            text: sentence.render(range),
        }
    }

    pub fn start(&self) -> usize {
        self.range.start_idx
    }

    pub fn end(&self) -> usize {
        self.range.end_idx
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.range.overlaps(&other.range)
    }
}

/// Computes the token boundaries of syntactic subtrees.
///
/// A naive "whole subtree" span over-captures trailing clauses that belong
/// to a sibling slot, so every call can name relations whose branches are
/// left out of the span.
#[derive(Debug, Clone, Copy)]
pub struct SpanResolver<'a> {
    sentence: &'a ParsedSentence,
}

impl<'a> SpanResolver<'a> {
    pub fn new(sentence: &'a ParsedSentence) -> Self {
        Self { sentence }
    }

    /// Minimal contiguous span covering `root` and its transitive
    /// dependents, without descending into a child whose relation is in
    /// `exclude`. Dependents outside the context range, or consumed by an
    /// enclosing pass, are not collected.
    pub fn resolve_span(
        &self,
        ctx: &ClauseContext,
        root: usize,
        exclude: &[Relation],
    ) -> SlotResult<Span> {
        let collected = self.subtree(ctx, root, exclude)?;
        // subtree() always contains the root
        let start = collected.iter().next().copied().unwrap_or(root);
        let end = collected.iter().next_back().copied().unwrap_or(root);
        let span = Span::of(self.sentence, SpanRef::new(start, end));
        tracing::trace!(root, span = %span.range, text = %span.text, "resolved span");
        Ok(span)
    }

    /// Span of a phrase head: `root` plus the full subtrees of its
    /// phrase-internal dependents (determiners, modifiers, relative
    /// clauses). Clause-level dependents of `root` are left out.
    pub fn resolve_phrase(&self, ctx: &ClauseContext, root: usize) -> SlotResult<Span> {
        if !ctx.range().contains(root) || root >= self.sentence.len() {
            return Err(SlotError::TokenOutOfScope {
                index: root,
                range: ctx.range(),
            });
        }
        let mut collected = BTreeSet::new();
        collected.insert(root);
        for &child in self.sentence.children(root) {
            if !ctx.is_available(child)
                || !self.sentence.tokens()[child].relation.is_phrase_internal()
            {
                continue;
            }
            collected.extend(self.subtree(ctx, child, &[])?);
        }
        let start = collected.iter().next().copied().unwrap_or(root);
        let end = collected.iter().next_back().copied().unwrap_or(root);
        Ok(Span::of(self.sentence, SpanRef::new(start, end)))
    }

    /// The token indices collected by [`resolve_span`](Self::resolve_span),
    /// root included.
    pub fn subtree(
        &self,
        ctx: &ClauseContext,
        root: usize,
        exclude: &[Relation],
    ) -> SlotResult<BTreeSet<usize>> {
        if !ctx.range().contains(root) || root >= self.sentence.len() {
            return Err(SlotError::TokenOutOfScope {
                index: root,
                range: ctx.range(),
            });
        }

        let mut collected = BTreeSet::new();
        collected.insert(root);
        let mut stack = vec![root];

        while let Some(current) = stack.pop() {
            for &child in self.sentence.children(current) {
                if collected.contains(&child) || !ctx.is_available(child) {
                    continue;
                }
                let relation = &self.sentence.tokens()[child].relation;
                if exclude.contains(relation) {
                    continue;
                }
                collected.insert(child);
                stack.push(child);
            }
        }

        Ok(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // He left early because he was tired .
    const LEFT_EARLY: &str = "
        1 He he PRON 2 nsubj
        2 left leave VERB 0 ROOT
        3 early early ADV 2 advmod
        4 because because SCONJ 7 mark
        5 he he PRON 7 nsubj
        6 was be AUX 7 cop
        7 tired tired ADJ 3 advcl
        8 . . PUNCT 2 punct
    ";

    #[test]
    fn span_ref_equality_and_hashing() {
        use std::collections::HashSet;

        let span1 = SpanRef::new(0, 5);
        let span2 = SpanRef::new(0, 5);
        let span3 = SpanRef::new(1, 5);

        assert_eq!(span1, span2);
        assert_ne!(span1, span3);

        let mut set = HashSet::new();
        set.insert(span1);
        assert!(set.contains(&span2));
        assert!(!set.contains(&span3));
    }

    #[test]
    fn span_ref_geometry() {
        let a = SpanRef::new(2, 4);
        assert_eq!(SpanRef::new(4, 2), a);
        assert_eq!(a.len(), 3);
        assert!(a.overlaps(&SpanRef::new(4, 9)));
        assert!(!a.overlaps(&SpanRef::new(5, 9)));
        assert!(a.contains_span(&SpanRef::single(3)));
        assert_eq!(a.hull(&SpanRef::new(7, 8)), SpanRef::new(2, 8));
        assert_eq!(a.to_string(), "2..=4");
    }

    #[test]
    fn whole_subtree_by_default() {
        let sentence = ParsedSentence::from_conll(LEFT_EARLY).unwrap();
        let ctx = ClauseContext::sentence_level(&sentence);
        let span = SpanResolver::new(&sentence)
            .resolve_span(&ctx, 2, &[])
            .unwrap();
        assert_eq!(span.range, SpanRef::new(2, 6));
        assert_eq!(span.text, "early because he was tired");
    }

    #[test]
    fn excluded_branch_is_left_out() {
        let sentence = ParsedSentence::from_conll(LEFT_EARLY).unwrap();
        let ctx = ClauseContext::sentence_level(&sentence);
        let span = SpanResolver::new(&sentence)
            .resolve_span(&ctx, 2, &[Relation::Advcl])
            .unwrap();
        assert_eq!(span.range, SpanRef::single(2));
        assert_eq!(span.text, "early");
    }

    #[test]
    fn leaf_degenerates_to_single_token() {
        let sentence = ParsedSentence::from_conll(LEFT_EARLY).unwrap();
        let ctx = ClauseContext::sentence_level(&sentence);
        let span = SpanResolver::new(&sentence)
            .resolve_span(&ctx, 0, &[])
            .unwrap();
        assert_eq!(span.range, SpanRef::single(0));
    }

    #[test]
    fn phrase_keeps_only_phrase_internal_dependents() {
        // She is the author of the book today .
        let sentence = ParsedSentence::from_conll(
            "1 She she PRON 4 nsubj
             2 is be AUX 4 cop
             3 the the DET 4 det
             4 author author NOUN 0 ROOT
             5 of of ADP 4 nmod
             6 the the DET 7 det
             7 book book NOUN 5 pobj
             8 today today NOUN 4 npadvmod",
        )
        .unwrap();
        let ctx = ClauseContext::sentence_level(&sentence);
        let span = SpanResolver::new(&sentence).resolve_phrase(&ctx, 3).unwrap();
        assert_eq!(span.text, "the author of the book");
    }

    #[test]
    fn out_of_scope_root_fails() {
        let sentence = ParsedSentence::from_conll(LEFT_EARLY).unwrap();
        let ctx = ClauseContext::sentence_level(&sentence).nested(SpanRef::new(3, 6), 6, []);
        let err = SpanResolver::new(&sentence)
            .resolve_span(&ctx, 1, &[])
            .unwrap_err();
        assert_eq!(
            err,
            SlotError::TokenOutOfScope {
                index: 1,
                range: SpanRef::new(3, 6)
            }
        );
    }

    #[test]
    fn consumed_tokens_are_skipped() {
        let sentence = ParsedSentence::from_conll(LEFT_EARLY).unwrap();
        let ctx = ClauseContext::sentence_level(&sentence).nested(SpanRef::new(2, 6), 6, [3]);
        let span = SpanResolver::new(&sentence)
            .resolve_span(&ctx, 6, &[])
            .unwrap();
        assert_eq!(span.range, SpanRef::new(4, 6));
        assert_eq!(span.text, "he was tired");
    }
}
