//! Relative clause detection inside slot fillers.
//!
//! A filler such as "the book that she wrote" is a noun phrase whose head
//! carries a relative clause. The clause is decomposed on its own while the
//! antecedent ("the book") is resolved by the enclosing pass.
//!
//! Example: "the tenant who fails to pay rent"
//! - Antecedent: "the tenant"
//! - Relative clause: "who fails to pay rent"
//! - Relative pronoun: "who"
//!
//! Dependents of the head noun that follow the clause ("the man that you
//! met with the hat") are kept apart as the trailing antecedent.

use layered_slots::{
    ClauseContext, ParsedSentence, Pos, Relation, SlotResult, Span, SpanRef, SpanResolver,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Types of relative pronouns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelativePronoun {
    /// "who" - typically for persons
    Who,
    /// "whom" - objective case for persons
    Whom,
    /// "whose" - possessive
    Whose,
    /// "which" - for things/concepts
    Which,
    /// "that" - for persons or things (restrictive)
    That,
    /// "where" - for places
    Where,
    /// "when" - for times
    When,
    /// Zero relative, contact clause or participle - "the man [that] I saw"
    Zero,
}

impl RelativePronoun {
    /// Parse a token as a relative pronoun
    pub fn from_token(token: &str) -> Option<Self> {
        let lower = token.to_lowercase();
        match lower.as_str() {
            "who" => Some(Self::Who),
            "whom" => Some(Self::Whom),
            "whose" => Some(Self::Whose),
            "which" => Some(Self::Which),
            "that" => Some(Self::That),
            "where" => Some(Self::Where),
            "when" => Some(Self::When),
            _ => None,
        }
    }
}

/// A relative or participial clause found under a slot filler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeClause {
    /// The part of the filler before the clause
    pub antecedent: Span,
    /// The part of the filler after the clause, if any
    pub trailing: Option<Span>,
    /// Tokens of the antecedent, both parts; consumed for the nested pass
    pub antecedent_tokens: BTreeSet<usize>,
    /// Head of the embedded clause
    pub clause_root: usize,
    pub clause_range: SpanRef,
    pub pronoun: RelativePronoun,
    /// Position of the relative pronoun, absent for [`RelativePronoun::Zero`]
    pub pronoun_idx: Option<usize>,
}

impl RelativeClause {
    /// The antecedent parts in sentence order.
    pub fn antecedent_parts(&self) -> impl Iterator<Item = &Span> {
        std::iter::once(&self.antecedent).chain(self.trailing.as_ref())
    }
}

const CLAUSE_MODIFIERS: [Relation; 2] = [Relation::Relcl, Relation::Acl];

/// Finds relative clauses hanging off a filler's nominal head.
#[derive(Debug, Clone, Copy)]
pub struct RelativeClauseDetector<'a> {
    sentence: &'a ParsedSentence,
}

impl<'a> RelativeClauseDetector<'a> {
    pub fn new(sentence: &'a ParsedSentence) -> Self {
        Self { sentence }
    }

    /// The nominal that may carry the clause: the filler root itself, or
    /// the object of a prepositional filler.
    fn nominal_head(&self, ctx: &ClauseContext, filler_root: usize) -> Option<usize> {
        let token = self.sentence.token(filler_root)?;
        if token.pos.is_nominal() {
            return Some(filler_root);
        }
        if token.pos == Pos::Adp || token.relation == Relation::Prep {
            return self
                .sentence
                .children(filler_root)
                .iter()
                .copied()
                .find(|&child| {
                    ctx.is_available(child) && self.sentence.tokens()[child].relation == Relation::Pobj
                });
        }
        None
    }

    /// A span over `tokens`, whose text is those tokens only.
    fn part(&self, tokens: &[usize]) -> Option<Span> {
        let (&start, &end) = (tokens.first()?, tokens.last()?);
        let text = tokens
            .iter()
            .map(|&idx| self.sentence.tokens()[idx].text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Some(Span {
            range: SpanRef::new(start, end),
            text,
        })
    }

    /// The relative word: a direct dependent of the clause root, or the
    /// possessor or prepositional object under one ("whose car", "in which").
    fn pronoun_position(&self, clause_root: usize, clause_tokens: &BTreeSet<usize>) -> Option<usize> {
        let tokens = self.sentence.tokens();
        let mut candidates = BTreeSet::new();
        for &child in self.sentence.children(clause_root) {
            if !clause_tokens.contains(&child) {
                continue;
            }
            candidates.insert(child);
            candidates.extend(self.sentence.children(child).iter().copied().filter(|grandchild| {
                clause_tokens.contains(grandchild)
                    && matches!(tokens[*grandchild].relation, Relation::Poss | Relation::Pobj)
            }));
        }
        candidates
            .into_iter()
            .find(|&idx| RelativePronoun::from_token(&tokens[idx].text).is_some())
    }

    pub fn detect(
        &self,
        ctx: &ClauseContext,
        filler_root: usize,
    ) -> SlotResult<Option<RelativeClause>> {
        let nominal = match self.nominal_head(ctx, filler_root) {
            Some(nominal) => nominal,
            None => return Ok(None),
        };
        let clause_root = match self.sentence.children(nominal).iter().copied().find(|&child| {
            ctx.is_available(child)
                && CLAUSE_MODIFIERS.contains(&self.sentence.tokens()[child].relation)
        }) {
            Some(clause_root) => clause_root,
            None => return Ok(None),
        };

        let resolver = SpanResolver::new(self.sentence);
        let antecedent_tokens = resolver.subtree(ctx, filler_root, &CLAUSE_MODIFIERS)?;
        let clause_tokens = resolver.subtree(ctx, clause_root, &[])?;
        let clause_range = resolver.resolve_span(ctx, clause_root, &[])?.range;

        if antecedent_tokens.iter().any(|&idx| clause_range.contains(idx)) {
            tracing::trace!(clause = %clause_range, "antecedent interleaves the clause");
            return Ok(None);
        }
        let before: Vec<usize> = antecedent_tokens
            .iter()
            .copied()
            .filter(|&idx| idx < clause_range.start_idx)
            .collect();
        let after: Vec<usize> = antecedent_tokens
            .iter()
            .copied()
            .filter(|&idx| idx > clause_range.end_idx)
            .collect();
        let (antecedent, trailing) = match (self.part(&before), self.part(&after)) {
            (Some(antecedent), trailing) => (antecedent, trailing),
            (None, Some(antecedent)) => (antecedent, None),
            (None, None) => return Ok(None),
        };

        let pronoun_idx = self.pronoun_position(clause_root, &clause_tokens);
        let pronoun = pronoun_idx
            .and_then(|idx| RelativePronoun::from_token(&self.sentence.tokens()[idx].text))
            .unwrap_or(RelativePronoun::Zero);

        tracing::trace!(
            antecedent = %antecedent.text,
            clause = %clause_range,
            ?pronoun,
            "relative clause"
        );

        Ok(Some(RelativeClause {
            antecedent,
            trailing,
            antecedent_tokens,
            clause_root,
            clause_range,
            pronoun,
            pronoun_idx,
        }))
    }
}
