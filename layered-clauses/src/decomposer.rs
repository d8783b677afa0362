//! Recursive slot decomposition.
//!
//! A clause is classified, its candidates are generated and resolved, and
//! every recursible filler that is complex enough is decomposed again as a
//! clause of its own. Each level runs through the same states:
//!
//! `entered -> classified -> resolved -> (nesting check per slot)* -> done`
//!
//! and reports them as `tracing` debug events.

use crate::{
    classify, contains_predicate, needs_nesting, Candidate, CandidateGenerator, ClausePattern,
    ConflictResolver, Diagnostic, DiagnosticKind, RelativeClause, RelativeClauseDetector,
    RuleBook,
};
use layered_slots::{
    ClauseContext, DependencyParser, FilledSlot, FlatSlot, ParsedSentence, Relation,
    SlotAssignment, SlotError, SlotKey, SlotResult, Span,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Slots an antecedent may fill when it cannot be joined to its pronoun.
const ANTECEDENT_GAPS: [SlotKey; 3] = [SlotKey::S, SlotKey::O1, SlotKey::M1];

/// Slots for the part of an antecedent that follows the clause.
const TRAILING_GAPS: [SlotKey; 3] = [SlotKey::M3, SlotKey::M2, SlotKey::M1];

/// The result of decomposing one clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decomposition {
    pub slots: SlotAssignment,
    pub pattern: ClausePattern,
    /// Recoverable conditions met at this level or below
    pub diagnostics: Vec<Diagnostic>,
}

impl Decomposition {
    fn empty(pattern: ClausePattern) -> Self {
        Self {
            slots: SlotAssignment::new(),
            pattern,
            diagnostics: Vec::new(),
        }
    }

    pub fn flatten(&self) -> BTreeMap<String, FlatSlot> {
        self.slots.flatten()
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.slots.to_json()
    }

    pub fn has_diagnostic(&self, kind: &DiagnosticKind) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| &diagnostic.kind == kind)
    }
}

/// Decomposes sentences with an immutable [`RuleBook`].
///
/// ```ignore
/// let decomposer = SlotDecomposer::default();
/// let sentence = ParsedSentence::from_conll(conll)?;
/// let decomposition = decomposer.decompose(&sentence)?;
/// println!("{}", decomposition.to_json());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SlotDecomposer {
    rules: RuleBook,
}

impl SlotDecomposer {
    pub fn new(rules: RuleBook) -> Self {
        Self { rules }
    }

    /// Override the recursion bound of the rule book.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        let nesting = self.rules.nesting().with_max_depth(max_depth);
        self.rules = self.rules.with_nesting(nesting);
        self
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    /// Decompose a whole sentence, starting from its root.
    pub fn decompose(&self, sentence: &ParsedSentence) -> SlotResult<Decomposition> {
        self.decompose_clause(sentence, &ClauseContext::sentence_level(sentence))
    }

    /// Parse `text` with `parser`, then decompose it.
    pub fn decompose_text<P: DependencyParser>(
        &self,
        parser: &P,
        text: &str,
    ) -> SlotResult<Decomposition> {
        let sentence = ParsedSentence::new(parser.parse(text)?)?;
        self.decompose(&sentence)
    }

    /// Decompose the clause described by `ctx`.
    pub fn decompose_clause(
        &self,
        sentence: &ParsedSentence,
        ctx: &ClauseContext,
    ) -> SlotResult<Decomposition> {
        self.clause(sentence, ctx, &[])
    }

    fn clause(
        &self,
        sentence: &ParsedSentence,
        ctx: &ClauseContext,
        path: &[SlotKey],
    ) -> SlotResult<Decomposition> {
        let head = ctx.head();
        let span = tracing::debug_span!("clause", depth = ctx.depth(), range = %ctx.range(), head);
        let _entered = span.enter();
        tracing::debug!("entered");

        let head_pos = match sentence.token(head) {
            Some(token) if ctx.range().contains(head) => token.pos,
            _ => {
                return Err(SlotError::TokenOutOfScope {
                    index: head,
                    range: ctx.range(),
                })
            }
        };

        let relations: BTreeSet<Relation> = ctx
            .core_children(sentence)
            .into_iter()
            .map(|child| sentence.tokens()[child].relation.clone())
            .collect();
        let classified = classify(&relations, head_pos);
        tracing::debug!(pattern = %classified.pattern, "classified");

        let mut decomposition = Decomposition::empty(classified.pattern);
        if classified.pattern == ClausePattern::Unknown {
            decomposition.diagnostics.push(Diagnostic::new(
                DiagnosticKind::NoPatternMatched,
                path.to_vec(),
                ctx.range(),
            ));
        }

        let candidates = CandidateGenerator::new(sentence, &self.rules).generate(ctx, &classified)?;
        if candidates.is_empty() {
            decomposition.diagnostics.push(Diagnostic::new(
                DiagnosticKind::EmptyCandidateSet,
                path.to_vec(),
                ctx.range(),
            ));
            tracing::debug!("done: no candidates");
            return Ok(decomposition);
        }

        let winners = ConflictResolver::new().resolve_candidates(&candidates);
        tracing::debug!(slots = winners.len(), "resolved");

        for winner in winners.iter() {
            let filled = if winner.slot.is_recursible()
                && needs_nesting(sentence, winner.span.range, self.rules.nesting())
            {
                self.nest(sentence, ctx, winner, path, &mut decomposition.diagnostics)?
            } else {
                Self::leaf(winner)
            };
            decomposition.slots.insert(winner.slot, filled);
        }

        tracing::debug!(
            slots = decomposition.slots.len(),
            diagnostics = decomposition.diagnostics.len(),
            "done"
        );
        Ok(decomposition)
    }

    fn leaf(winner: &Candidate) -> FilledSlot {
        FilledSlot::leaf(winner.text(), winner.span.range, winner.rule_id.clone())
    }

    /// Try to decompose a winner as a clause of its own; falls back to a leaf.
    fn nest(
        &self,
        sentence: &ParsedSentence,
        ctx: &ClauseContext,
        winner: &Candidate,
        path: &[SlotKey],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> SlotResult<FilledSlot> {
        let mut slot_path = path.to_vec();
        slot_path.push(winner.slot);
        let max_depth = self.rules.nesting().max_depth;

        if ctx.depth() >= max_depth {
            if contains_predicate(sentence, winner.span.range) {
                let diagnostic = Diagnostic::new(
                    DiagnosticKind::RecursionLimitExceeded { max_depth },
                    slot_path,
                    winner.span.range,
                );
                tracing::warn!(%diagnostic, "slot left flat");
                diagnostics.push(diagnostic);
            }
            return Ok(Self::leaf(winner));
        }

        let relative = RelativeClauseDetector::new(sentence).detect(ctx, winner.root)?;
        let nested_ctx = match &relative {
            Some(clause) => ctx.nested(
                clause.clause_range,
                clause.clause_root,
                clause.antecedent_tokens.iter().copied(),
            ),
            None => ctx.nested(winner.span.range, winner.root, std::iter::empty()),
        };

        // The nested range may equal the slot span (a ccomp object), but must
        // shrink against the enclosing range.
        let range = nested_ctx.range();
        if !winner.span.range.contains_span(&range)
            || range.len() >= ctx.range().len()
            || !nested_ctx.is_available(nested_ctx.head())
        {
            tracing::trace!(slot = %winner.slot, %range, "nested range makes no progress");
            return Ok(Self::leaf(winner));
        }

        let mut nested = self.clause(sentence, &nested_ctx, &slot_path)?;
        if !nested.slots.contains(SlotKey::V) {
            tracing::trace!(slot = %winner.slot, "nested result has no verb, kept flat");
            return Ok(Self::leaf(winner));
        }

        if let Some(clause) = relative {
            let placed = clause
                .antecedent_parts()
                .all(|part| winner.span.range.contains_span(&part.range))
                && splice_antecedent(&mut nested.slots, &clause);
            if !placed {
                tracing::trace!(slot = %winner.slot, "antecedent has no place, kept flat");
                return Ok(Self::leaf(winner));
            }
        }
        diagnostics.append(&mut nested.diagnostics);

        Ok(FilledSlot::nested(
            winner.span.range,
            winner.rule_id.clone(),
            nested.slots,
        ))
    }
}

/// Give the antecedent of a relative clause back to the nested slots.
///
/// The part before the clause is joined to the slot holding the relative
/// pronoun when the two touch, otherwise it takes the first free gap slot.
/// A trailing part takes a free modifier slot. Returns `false` when some
/// part found no place.
fn splice_antecedent(slots: &mut SlotAssignment, clause: &RelativeClause) -> bool {
    if clause.antecedent_parts().any(|part| {
        slots
            .iter()
            .any(|(_, slot)| slot.span().overlaps(&part.range))
    }) {
        tracing::trace!(text = %clause.antecedent.text, "antecedent overlaps nested slots");
        return false;
    }

    let antecedent = &clause.antecedent;
    let joined = match clause.pronoun_idx.and_then(|idx| slots.slot_containing(idx)) {
        Some(pronoun_slot) => slots.get_mut(pronoun_slot).map_or(false, |slot| {
            let touches = antecedent.end() + 1 == slot.span().start_idx;
            let joined = touches && slot.prefix_antecedent(antecedent);
            if joined {
                tracing::trace!(slot = %pronoun_slot, text = %slot.text(), "antecedent joined");
            }
            joined
        }),
        None => false,
    };
    if !joined && !fill_gap(slots, &ANTECEDENT_GAPS, antecedent, "antecedent") {
        return false;
    }

    match &clause.trailing {
        Some(trailing) => fill_gap(slots, &TRAILING_GAPS, trailing, "antecedent.trailing"),
        None => true,
    }
}

fn fill_gap(slots: &mut SlotAssignment, gaps: &[SlotKey], part: &Span, rule_id: &str) -> bool {
    match gaps.iter().copied().find(|key| !slots.contains(*key)) {
        Some(gap) => {
            tracing::trace!(slot = %gap, text = %part.text, "antecedent fills gap");
            slots.insert(gap, FilledSlot::leaf(part.text.clone(), part.range, rule_id));
            true
        }
        None => {
            tracing::trace!(text = %part.text, "no free slot for antecedent");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layered_slots::SpanRef;

    fn sentence(conll: &str) -> ParsedSentence {
        ParsedSentence::from_conll(conll).unwrap()
    }

    #[test]
    fn simple_clause_stays_flat() {
        let decomposition = SlotDecomposer::default()
            .decompose(&sentence(
                "1 Birds bird NOUN 2 nsubj
                 2 sing sing VERB 0 ROOT",
            ))
            .unwrap();
        assert_eq!(decomposition.pattern, ClausePattern::Sv);
        assert_eq!(decomposition.slots.nesting_depth(), 0);
        assert!(decomposition.diagnostics.is_empty());
    }

    #[test]
    fn zero_relative_antecedent_fills_gap() {
        // I saw a man sitting there
        let decomposition = SlotDecomposer::default()
            .decompose(&sentence(
                "1 I I PRON 2 nsubj
                 2 saw see VERB 0 ROOT
                 3 a a DET 4 det
                 4 man man NOUN 2 dobj
                 5 sitting sit VERB 4 acl
                 6 there there ADV 5 advmod",
            ))
            .unwrap();

        let object = decomposition.slots.get(SlotKey::O1).unwrap();
        assert_eq!(object.text(), "");
        let sub = object.sub_slots().unwrap();
        assert_eq!(sub.text(SlotKey::S), Some("a man"));
        assert_eq!(sub.get(SlotKey::S).unwrap().rule_id(), "antecedent");
        assert_eq!(sub.text(SlotKey::V), Some("sitting"));
        assert_eq!(sub.text(SlotKey::M3), Some("there"));
    }

    #[test]
    fn trailing_antecedent_takes_a_modifier_slot() {
        // I know the man that you met with the hat
        let decomposition = SlotDecomposer::default()
            .decompose(&sentence(
                "1 I I PRON 2 nsubj
                 2 know know VERB 0 ROOT
                 3 the the DET 4 det
                 4 man man NOUN 2 dobj
                 5 that that PRON 7 dobj
                 6 you you PRON 7 nsubj
                 7 met meet VERB 4 relcl
                 8 with with ADP 4 prep
                 9 the the DET 10 det
                 10 hat hat NOUN 8 pobj",
            ))
            .unwrap();

        let sub = decomposition.slots.get(SlotKey::O1).unwrap().sub_slots().unwrap();
        assert_eq!(sub.text(SlotKey::O1), Some("the man that"));
        assert_eq!(sub.get(SlotKey::O1).unwrap().span(), SpanRef::new(2, 4));
        assert_eq!(sub.text(SlotKey::M3), Some("with the hat"));
        assert_eq!(sub.get(SlotKey::M3).unwrap().rule_id(), "antecedent.trailing");
        assert!(decomposition.diagnostics.is_empty());
    }

    #[test]
    fn antecedent_without_room_keeps_slot_flat() {
        // The clause fills M1, M2 and M3 itself, so "with the hat" has nowhere to go.
        let decomposition = SlotDecomposer::default()
            .decompose(&sentence(
                "1 I I PRON 2 nsubj
                 2 know know VERB 0 ROOT
                 3 the the DET 4 det
                 4 man man NOUN 2 dobj
                 5 that that PRON 7 dobj
                 6 you you PRON 7 nsubj
                 7 met meet VERB 4 relcl
                 8 yesterday yesterday NOUN 7 npadvmod
                 9 quietly quietly ADV 7 advmod
                 10 at at ADP 7 prep
                 11 home home NOUN 10 pobj
                 12 with with ADP 4 prep
                 13 the the DET 14 det
                 14 hat hat NOUN 12 pobj",
            ))
            .unwrap();

        let object = decomposition.slots.get(SlotKey::O1).unwrap();
        assert!(!object.is_nested());
        assert_eq!(
            object.text(),
            "the man that you met yesterday quietly at home with the hat"
        );
    }

    #[test]
    fn verbless_phrase_stays_flat_without_diagnostics() {
        // She bought the old house near the river
        let decomposition = SlotDecomposer::default()
            .decompose(&sentence(
                "1 She she PRON 2 nsubj
                 2 bought buy VERB 0 ROOT
                 3 the the DET 5 det
                 4 old old ADJ 5 amod
                 5 house house NOUN 2 dobj
                 6 near near ADP 5 prep
                 7 the the DET 8 det
                 8 river river NOUN 6 pobj",
            ))
            .unwrap();

        assert_eq!(
            decomposition.slots.text(SlotKey::O1),
            Some("the old house near the river")
        );
        assert!(!decomposition.slots.get(SlotKey::O1).unwrap().is_nested());
        assert!(decomposition.diagnostics.is_empty());
    }

    #[test]
    fn complement_clause_nests_over_its_whole_slot_span() {
        let decomposition = SlotDecomposer::default()
            .decompose(&sentence(
                "1 She she PRON 2 nsubj
                 2 said say VERB 0 ROOT
                 3 that that SCONJ 5 mark
                 4 he he PRON 5 nsubj
                 5 left leave VERB 2 ccomp",
            ))
            .unwrap();
        let object = decomposition.slots.get(SlotKey::O1).unwrap();
        assert_eq!(object.span(), SpanRef::new(2, 4));
        let nested = object.sub_slots().unwrap();
        assert_eq!(nested.text(SlotKey::S), Some("he"));
        assert_eq!(nested.text(SlotKey::V), Some("left"));
    }

    #[test]
    fn depth_zero_flags_only_predicates() {
        let decomposer = SlotDecomposer::default().with_max_depth(0);
        // She said that he left
        let decomposition = decomposer
            .decompose(&sentence(
                "1 She she PRON 2 nsubj
                 2 said say VERB 0 ROOT
                 3 that that SCONJ 5 mark
                 4 he he PRON 5 nsubj
                 5 left leave VERB 2 ccomp",
            ))
            .unwrap();
        assert_eq!(decomposition.slots.text(SlotKey::O1), Some("that he left"));
        assert_eq!(
            decomposition.diagnostics,
            vec![Diagnostic::new(
                DiagnosticKind::RecursionLimitExceeded { max_depth: 0 },
                vec![SlotKey::O1],
                SpanRef::new(2, 4),
            )]
        );

        // "the old book" needs nesting but holds no predicate
        let flat = decomposer
            .decompose(&sentence(
                "1 She she PRON 2 nsubj
                 2 read read VERB 0 ROOT
                 3 the the DET 5 det
                 4 old old ADJ 5 amod
                 5 book book NOUN 2 dobj",
            ))
            .unwrap();
        assert!(flat.diagnostics.is_empty());
    }

    #[test]
    fn empty_candidate_set_is_reported() {
        let decomposition = SlotDecomposer::default()
            .decompose(&sentence("1 Hello hello INTJ 0 ROOT"))
            .unwrap();
        assert!(decomposition.slots.is_empty());
        assert!(decomposition.has_diagnostic(&DiagnosticKind::NoPatternMatched));
        assert!(decomposition.has_diagnostic(&DiagnosticKind::EmptyCandidateSet));
    }

    #[test]
    fn head_outside_range_is_fatal() {
        let parsed = sentence(
            "1 Birds bird NOUN 2 nsubj
             2 sing sing VERB 0 ROOT",
        );
        let ctx = ClauseContext::sentence_level(&parsed).nested(SpanRef::single(0), 1, []);
        assert_eq!(
            SlotDecomposer::default().decompose_clause(&parsed, &ctx),
            Err(SlotError::TokenOutOfScope {
                index: 1,
                range: SpanRef::single(0),
            })
        );
    }

    #[test]
    fn decompose_text_reads_through_the_parser() {
        let decomposition = SlotDecomposer::default()
            .decompose_text(
                &layered_slots::ConllReader,
                "1 Birds bird NOUN 2 nsubj\n2 sing sing VERB 0 ROOT",
            )
            .unwrap();
        assert_eq!(
            decomposition.to_json(),
            serde_json::json!({"S": "Birds", "V": "sing"})
        );
    }
}
