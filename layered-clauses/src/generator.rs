//! Candidate generation for one clause.
//!
//! Walks the clause core (the head and its direct dependents inside the
//! clause range) and proposes slot fillers in four steps: core arguments
//! from the pattern mapping, the auxiliary group, generic fallback for
//! slots no core rule claimed, and modifier rules from the rule book.

use crate::auxiliary::normalize_surface;
use crate::conflict::covered_tokens;
use crate::{
    Candidate, CandidateSource, ClassifiedPattern, ClausePattern, CompiledRule, LemmaScope,
    RuleBook, RuleMatcher, SlotTarget,
};
use layered_slots::{
    ClauseContext, ParsedSentence, Pos, Relation, SlotKey, SlotResult, Span, SpanRef,
    SpanResolver, Token,
};
use std::collections::{BTreeMap, BTreeSet};

/// Negation that belongs to the verb group rather than to a modifier slot.
fn is_negation(token: &Token) -> bool {
    match token.relation {
        Relation::Neg => true,
        Relation::Advmod => matches!(token.lemma_lower().as_str(), "not" | "n't"),
        _ => false,
    }
}

/// Relations that never head a modifier filler.
fn is_structural(relation: &Relation) -> bool {
    matches!(
        relation,
        Relation::Cop
            | Relation::Punct
            | Relation::Cc
            | Relation::Conj
            | Relation::Det
            | Relation::Case
    ) || relation.is_auxiliary()
}

/// A modifier rule that matched a dependent.
struct ModifierMatch<'r> {
    rule: &'r CompiledRule,
    root: usize,
    span: Span,
}

pub struct CandidateGenerator<'a> {
    sentence: &'a ParsedSentence,
    rules: &'a RuleBook,
    resolver: SpanResolver<'a>,
}

impl<'a> CandidateGenerator<'a> {
    pub fn new(sentence: &'a ParsedSentence, rules: &'a RuleBook) -> Self {
        Self {
            sentence,
            rules,
            resolver: SpanResolver::new(sentence),
        }
    }

    fn token(&self, index: usize) -> &'a Token {
        &self.sentence.tokens()[index]
    }

    pub fn generate(
        &self,
        ctx: &ClauseContext,
        classified: &ClassifiedPattern,
    ) -> SlotResult<Vec<Candidate>> {
        let children = ctx.core_children(self.sentence);
        let predicate = self.predicate(classified, ctx.head(), &children);

        let mut candidates = self.core_arguments(ctx, classified, &children, predicate)?;
        if let Some(aux) = self.auxiliary_group(ctx, &children, predicate) {
            candidates.push(aux);
        }
        let core_len = candidates.len();

        let fallback = self.fallback(ctx, classified, &children, predicate, &candidates)?;
        candidates.extend(fallback);

        let modifiers = self.modifiers(ctx, &children, predicate, &candidates[..core_len])?;
        candidates.extend(modifiers);

        for candidate in candidates.iter() {
            tracing::trace!(
                slot = %candidate.slot,
                rule = %candidate.rule_id,
                priority = candidate.priority,
                span = %candidate.span.range,
                text = %candidate.text(),
                "candidate"
            );
        }

        Ok(candidates)
    }

    /// The token that fills `V` under the pattern: the head, or its copula.
    fn predicate(
        &self,
        classified: &ClassifiedPattern,
        head: usize,
        children: &[usize],
    ) -> Option<usize> {
        if classified.head_slot() == Some(SlotKey::V) {
            return Some(head);
        }
        if classified.slot_for(&Relation::Cop) == Some(SlotKey::V) {
            return children
                .iter()
                .copied()
                .find(|&child| self.token(child).relation == Relation::Cop);
        }
        None
    }

    /// Predicate span, absorbing an immediately following negation.
    fn predicate_span(&self, ctx: &ClauseContext, predicate: usize) -> (Span, String) {
        let next = predicate + 1;
        let absorbs_negation = ctx.is_available(next)
            && self.sentence.token(next).map_or(false, |token| {
                is_negation(token)
                    && (token.head_index == predicate || token.head_index == ctx.head())
            });
        let end = if absorbs_negation { next } else { predicate };
        let span = Span::of(self.sentence, SpanRef::new(predicate, end));
        let surface = normalize_surface(
            self.sentence
                .tokens_in(span.range)
                .iter()
                .map(|token| token.text.as_str()),
            self.rules.contractions(),
        );
        (span, surface)
    }

    fn core_arguments(
        &self,
        ctx: &ClauseContext,
        classified: &ClassifiedPattern,
        children: &[usize],
        predicate: Option<usize>,
    ) -> SlotResult<Vec<Candidate>> {
        let tiers = self.rules.tiers();
        let head = ctx.head();
        let mut candidates = Vec::new();

        match classified.head_slot() {
            Some(SlotKey::V) => {
                let (span, surface) = self.predicate_span(ctx, head);
                candidates.push(
                    Candidate::new(
                        SlotKey::V,
                        span,
                        head,
                        tiers.core,
                        "core.root",
                        CandidateSource::Pattern {
                            relation: Relation::Root,
                        },
                    )
                    .with_surface(surface),
                );
            }
            Some(slot) => {
                let span = self.resolver.resolve_phrase(ctx, head)?;
                candidates.push(Candidate::new(
                    slot,
                    span,
                    head,
                    tiers.core,
                    "core.root",
                    CandidateSource::Pattern {
                        relation: Relation::Root,
                    },
                ));
            }
            None => {}
        }

        for &child in children {
            let relation = &self.token(child).relation;
            let slot = match classified.slot_for(relation) {
                Some(slot) => slot,
                None => continue,
            };

            if *relation == Relation::Cop {
                if predicate != Some(child) {
                    continue;
                }
                let (span, surface) = self.predicate_span(ctx, child);
                candidates.push(
                    Candidate::new(
                        slot,
                        span,
                        child,
                        tiers.core,
                        "core.cop",
                        CandidateSource::Pattern {
                            relation: relation.clone(),
                        },
                    )
                    .with_surface(surface),
                );
                continue;
            }

            let span = self.resolver.resolve_span(ctx, child, &[])?;
            let paired = classified.pattern == ClausePattern::Svoo
                && matches!(relation, Relation::Iobj | Relation::Dobj);
            let candidate = if paired {
                Candidate::new(
                    slot,
                    span,
                    child,
                    tiers.ditransitive,
                    format!("ditransitive.{}", relation.label()),
                    CandidateSource::DitransitivePair,
                )
            } else {
                Candidate::new(
                    slot,
                    span,
                    child,
                    tiers.core,
                    format!("core.{}", relation.label()),
                    CandidateSource::Pattern {
                        relation: relation.clone(),
                    },
                )
            };
            candidates.push(candidate);
        }

        Ok(candidates)
    }

    /// The contiguous run of auxiliaries and negations closest to the
    /// predicate.
    fn auxiliary_group(
        &self,
        ctx: &ClauseContext,
        children: &[usize],
        predicate: Option<usize>,
    ) -> Option<Candidate> {
        let anchor = predicate.unwrap_or_else(|| ctx.head());
        let members: Vec<usize> = children
            .iter()
            .copied()
            .filter(|&child| {
                let token = self.token(child);
                child < anchor && (token.relation.is_auxiliary() || is_negation(token))
            })
            .collect();

        let last = *members.last()?;
        let mut first = last;
        for &member in members.iter().rev().skip(1) {
            if member + 1 != first {
                break;
            }
            first = member;
        }

        let span = Span::of(self.sentence, SpanRef::new(first, last));
        let surface = normalize_surface(
            self.sentence
                .tokens_in(span.range)
                .iter()
                .map(|token| token.text.as_str()),
            self.rules.contractions(),
        );
        Some(
            Candidate::new(
                SlotKey::Aux,
                span,
                last,
                self.rules.tiers().core,
                "aux.group",
                CandidateSource::Auxiliary,
            )
            .with_surface(surface),
        )
    }

    fn fallback(
        &self,
        ctx: &ClauseContext,
        classified: &ClassifiedPattern,
        children: &[usize],
        predicate: Option<usize>,
        core: &[Candidate],
    ) -> SlotResult<Vec<Candidate>> {
        let claimed: BTreeSet<SlotKey> = core.iter().map(|candidate| candidate.slot).collect();
        let covered = covered_tokens(core);
        let head = ctx.head();
        let anchor = predicate.unwrap_or(head);
        let free: Vec<usize> = children
            .iter()
            .copied()
            .filter(|child| !covered.contains(child))
            .collect();

        let mut slots = vec![SlotKey::V, SlotKey::O1, SlotKey::Aux, SlotKey::C1];
        if classified.pattern == ClausePattern::Unknown {
            slots.push(SlotKey::S);
        }

        let argument_like = |token: &Token| {
            !token.relation.is_subject()
                && !token.relation.is_modifier_class()
                && !token.relation.is_phrase_internal()
                && !is_structural(&token.relation)
        };

        let mut picks: Vec<(SlotKey, usize)> = Vec::new();
        for slot in slots {
            if claimed.contains(&slot) {
                continue;
            }
            match slot {
                SlotKey::V => {
                    let verb = std::iter::once(head)
                        .chain(free.iter().copied())
                        .find(|&idx| !covered.contains(&idx) && self.token(idx).pos == Pos::Verb);
                    if let Some(verb) = verb {
                        picks.push((slot, verb));
                    }
                }
                SlotKey::Aux => {
                    if let Some(aux) = free
                        .iter()
                        .copied()
                        .find(|&idx| idx < anchor && self.token(idx).pos == Pos::Aux)
                    {
                        picks.push((slot, aux));
                    }
                }
                SlotKey::O1 => {
                    if let Some(object) = free.iter().copied().find(|&idx| {
                        let token = self.token(idx);
                        idx > head && token.pos.is_nominal() && argument_like(token)
                    }) {
                        picks.push((slot, object));
                    }
                }
                SlotKey::C1 => {
                    if let Some(complement) = free.iter().copied().find(|&idx| {
                        let token = self.token(idx);
                        idx > head && token.pos == Pos::Adj && argument_like(token)
                    }) {
                        picks.push((slot, complement));
                    }
                }
                SlotKey::S => {
                    if let Some(subject) = free.iter().copied().find(|&idx| {
                        let token = self.token(idx);
                        idx < head && token.pos.is_nominal() && !token.relation.is_phrase_internal()
                    }) {
                        picks.push((slot, subject));
                    }
                }
                _ => {}
            }
        }

        // Leftover adverbs: after the verb the last one is M3, the rest M2.
        let adverbs: Vec<usize> = free
            .iter()
            .copied()
            .filter(|&idx| {
                let token = self.token(idx);
                token.pos == Pos::Adv && !is_negation(token) && !token.relation.is_phrase_internal()
            })
            .collect();
        let last_post_verbal = adverbs.iter().copied().filter(|&idx| idx > anchor).max();
        for idx in adverbs {
            let slot = if Some(idx) == last_post_verbal {
                SlotKey::M3
            } else {
                SlotKey::M2
            };
            if !claimed.contains(&slot) {
                picks.push((slot, idx));
            }
        }

        let mut candidates = Vec::new();
        for (slot, root) in picks {
            let span = if slot.is_terminal() {
                Span::of(self.sentence, SpanRef::single(root))
            } else {
                self.resolver.resolve_span(ctx, root, &[Relation::Advcl])?
            };
            candidates.push(
                Candidate::new(
                    slot,
                    span,
                    root,
                    self.rules.tiers().fallback,
                    format!("fallback.{}", slot.label().to_lowercase()),
                    CandidateSource::Fallback,
                )
                .with_confidence(0.5),
            );
        }
        Ok(candidates)
    }

    /// Dependents modifier rules may claim: free direct dependents, plus
    /// adverbial clauses hanging off them.
    fn modifier_roots(
        &self,
        ctx: &ClauseContext,
        children: &[usize],
        covered: &BTreeSet<usize>,
    ) -> Vec<usize> {
        let mut roots = BTreeSet::new();
        for &child in children {
            let token = self.token(child);
            if covered.contains(&child) || is_negation(token) || is_structural(&token.relation) {
                continue;
            }
            roots.insert(child);
            for &grandchild in self.sentence.children(child) {
                if ctx.is_available(grandchild)
                    && !covered.contains(&grandchild)
                    && self.token(grandchild).relation == Relation::Advcl
                {
                    roots.insert(grandchild);
                }
            }
        }
        roots.into_iter().collect()
    }

    fn lemma_in(lemmas: &[String], lemma: &str) -> bool {
        lemmas.iter().any(|candidate| candidate.eq_ignore_ascii_case(lemma))
    }

    fn matches(
        &self,
        ctx: &ClauseContext,
        rule: &CompiledRule,
        root: usize,
        span: &Span,
    ) -> SlotResult<bool> {
        let token = self.token(root);
        let accepts = |relations: &[Relation]| relations.is_empty() || relations.contains(&token.relation);

        Ok(match &rule.spec().matcher {
            RuleMatcher::Relations(relations) => relations.contains(&token.relation),
            RuleMatcher::Lemmas {
                lemmas,
                scope,
                relations,
            } => {
                accepts(relations)
                    && match scope {
                        LemmaScope::Head => Self::lemma_in(lemmas, &token.lemma_lower()),
                        LemmaScope::Subtree => self
                            .resolver
                            .subtree(ctx, root, &rule.spec().exclude)?
                            .into_iter()
                            .any(|idx| Self::lemma_in(lemmas, &self.token(idx).lemma_lower())),
                    }
            }
            RuleMatcher::Prepositions(prepositions) => match token.relation {
                Relation::Prep => Self::lemma_in(prepositions, &token.lemma_lower()),
                Relation::Obl | Relation::Nmod => {
                    self.sentence.children(root).iter().any(|&child| {
                        let case = self.token(child);
                        case.relation == Relation::Case
                            && Self::lemma_in(prepositions, &case.lemma_lower())
                    })
                }
                _ => false,
            },
            RuleMatcher::Surface { relations, .. } => {
                accepts(relations)
                    && rule
                        .surface()
                        .map_or(false, |regex| regex.is_match(&span.text))
            }
            RuleMatcher::Particle => false,
        })
    }

    /// Distance after the verb, if `root` is a particle of it.
    fn particle_distance(&self, root: usize, verb: usize) -> Option<usize> {
        let token = self.token(root);
        if root <= verb || !self.rules.is_particle(&token.lemma_lower()) {
            return None;
        }
        let is_particle = match token.relation {
            Relation::Prt => true,
            Relation::Advmod | Relation::Prep => self.sentence.children(root).is_empty(),
            _ => false,
        };
        let distance = root - verb;
        (is_particle && distance <= self.rules.particle_distance()).then(|| distance)
    }

    fn modifiers(
        &self,
        ctx: &ClauseContext,
        children: &[usize],
        predicate: Option<usize>,
        core: &[Candidate],
    ) -> SlotResult<Vec<Candidate>> {
        let covered = covered_tokens(core);
        let roots = self.modifier_roots(ctx, children, &covered);
        let verb = predicate.unwrap_or_else(|| ctx.head());
        let verbal_head = predicate == Some(ctx.head()) && self.token(ctx.head()).pos.is_verbal();
        let subject_start = core
            .iter()
            .filter(|candidate| candidate.slot == SlotKey::S)
            .map(|candidate| candidate.span.start())
            .min();

        let mut candidates = Vec::new();
        let mut positional: Vec<ModifierMatch> = Vec::new();
        let mut fixed_best: BTreeMap<usize, u32> = BTreeMap::new();

        for rule in self.rules.rules() {
            let spec = rule.spec();
            let category = spec.category;
            for &root in roots.iter() {
                if let RuleMatcher::Particle = spec.matcher {
                    if !verbal_head {
                        continue;
                    }
                    let distance = match self.particle_distance(root, verb) {
                        Some(distance) => distance,
                        None => continue,
                    };
                    if distance == 1 {
                        let span = Span::of(self.sentence, SpanRef::new(verb, root));
                        candidates.push(
                            Candidate::new(
                                SlotKey::V,
                                span,
                                verb,
                                self.rules.tiers().particle_verb,
                                format!("{}.verb", spec.id),
                                CandidateSource::Modifier { category },
                            )
                            .with_confidence(spec.confidence),
                        );
                    } else {
                        let slot = match spec.target {
                            SlotTarget::Fixed(slot) => slot,
                            SlotTarget::Positional => SlotKey::M2,
                        };
                        let span = Span::of(self.sentence, SpanRef::single(root));
                        candidates.push(
                            Candidate::new(
                                slot,
                                span,
                                root,
                                spec.priority,
                                spec.id.clone(),
                                CandidateSource::Modifier { category },
                            )
                            .with_confidence(spec.confidence),
                        );
                    }
                    continue;
                }

                let span = self.resolver.resolve_span(ctx, root, &spec.exclude)?;
                if !self.matches(ctx, rule, root, &span)? {
                    continue;
                }
                match spec.target {
                    SlotTarget::Fixed(slot) => {
                        let best = fixed_best.entry(root).or_insert(spec.priority);
                        *best = (*best).max(spec.priority);
                        candidates.push(
                            Candidate::new(
                                slot,
                                span,
                                root,
                                spec.priority,
                                spec.id.clone(),
                                CandidateSource::Modifier { category },
                            )
                            .with_confidence(spec.confidence),
                        );
                    }
                    SlotTarget::Positional => positional.push(ModifierMatch { rule, root, span }),
                }
            }
        }

        // A root goes to whichever family matched it most strongly; ties go
        // to the fixed-slot rule.
        let positional_best = |root: usize| {
            positional
                .iter()
                .filter(|found| found.root == root)
                .map(|found| found.rule.spec().priority)
                .max()
        };
        let claimed: BTreeSet<usize> = fixed_best
            .iter()
            .filter(|&(&root, &priority)| positional_best(root).map_or(true, |best| priority >= best))
            .map(|(&root, _)| root)
            .collect();
        positional.retain(|found| !claimed.contains(&found.root));

        let last_post_verbal = positional
            .iter()
            .filter(|found| found.span.start() > verb)
            .map(|found| found.root)
            .max();
        let anchor = subject_start.map_or(verb, |start| start.min(verb));
        let order = |span: &Span| -> [SlotKey; 3] {
            if span.end() < anchor {
                [SlotKey::M1, SlotKey::M2, SlotKey::M3]
            } else if span.start() > verb {
                [SlotKey::M3, SlotKey::M2, SlotKey::M1]
            } else {
                [SlotKey::M2, SlotKey::M1, SlotKey::M3]
            }
        };

        for candidate in candidates.iter_mut() {
            if candidate.slot.is_modifier() {
                let alternates = order(&candidate.span);
                candidate.alternates = alternates
                    .iter()
                    .copied()
                    .filter(|&slot| slot != candidate.slot)
                    .collect();
            }
        }

        for found in positional {
            let alternates = order(&found.span);
            let slot = if alternates[0] == SlotKey::M3 && Some(found.root) != last_post_verbal {
                SlotKey::M2
            } else {
                alternates[0]
            };
            let spec = found.rule.spec();
            candidates.push(
                Candidate::new(
                    slot,
                    found.span,
                    found.root,
                    spec.priority,
                    spec.id.clone(),
                    CandidateSource::Modifier {
                        category: spec.category,
                    },
                )
                .with_confidence(spec.confidence)
                .with_alternates(alternates.iter().copied().filter(|&other| other != slot)),
            );
        }

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{classify, ConflictResolver};
    use layered_slots::SlotAssignment;

    fn decompose_flat(conll: &str) -> (Vec<Candidate>, SlotAssignment) {
        let sentence = ParsedSentence::from_conll(conll).unwrap();
        let ctx = ClauseContext::sentence_level(&sentence);
        let relations: BTreeSet<Relation> = ctx
            .core_children(&sentence)
            .into_iter()
            .map(|child| sentence.tokens()[child].relation.clone())
            .collect();
        let classified = classify(&relations, sentence.tokens()[ctx.head()].pos);
        let rules = RuleBook::standard();
        let candidates = CandidateGenerator::new(&sentence, &rules)
            .generate(&ctx, &classified)
            .unwrap();
        let assignment = ConflictResolver::new().resolve(&candidates);
        (candidates, assignment)
    }

    #[test]
    fn core_arguments_of_transitive_clause() {
        let (candidates, slots) = decompose_flat(
            "1 She she PRON 2 nsubj
             2 wrote write VERB 0 ROOT
             3 books book NOUN 2 dobj",
        );
        assert_eq!(candidates.len(), 3);
        assert_eq!(slots.text(SlotKey::S), Some("She"));
        assert_eq!(slots.text(SlotKey::V), Some("wrote"));
        assert_eq!(slots.text(SlotKey::O1), Some("books"));
    }

    #[test]
    fn auxiliary_group_merges_contractions() {
        let (_, slots) = decompose_flat(
            "1 She she PRON 4 nsubj
             2 ca can AUX 4 aux
             3 n't not PART 4 neg
             4 swim swim VERB 0 ROOT",
        );
        assert_eq!(slots.text(SlotKey::Aux), Some("can not"));
        assert_eq!(slots.get(SlotKey::Aux).unwrap().span(), SpanRef::new(1, 2));
        assert_eq!(slots.text(SlotKey::V), Some("swim"));
    }

    #[test]
    fn copular_predicate_absorbs_negation() {
        let (_, slots) = decompose_flat(
            "1 He he PRON 4 nsubj
             2 is be AUX 4 cop
             3 n't not PART 4 neg
             4 ready ready ADJ 0 ROOT",
        );
        assert_eq!(slots.text(SlotKey::V), Some("isn't"));
        assert_eq!(slots.text(SlotKey::C1), Some("ready"));
        assert!(!slots.contains(SlotKey::Aux));
    }

    #[test]
    fn positional_modifiers() {
        // Yesterday she quietly met him in the park after lunch
        let (_, slots) = decompose_flat(
            "1 Yesterday yesterday NOUN 4 npadvmod
             2 she she PRON 4 nsubj
             3 quietly quietly ADV 4 advmod
             4 met meet VERB 0 ROOT
             5 him he PRON 4 dobj
             6 in in ADP 4 prep
             7 the the DET 8 det
             8 park park NOUN 6 pobj
             9 after after ADP 4 prep
             10 lunch lunch NOUN 9 pobj",
        );
        assert_eq!(slots.text(SlotKey::M1), Some("Yesterday"));
        assert_eq!(slots.text(SlotKey::M2), Some("quietly"));
        assert_eq!(slots.text(SlotKey::M3), Some("after lunch"));
        assert_eq!(slots.get(SlotKey::M3).unwrap().rule_id(), "generic");
        assert_eq!(slots.text(SlotKey::O1), Some("him"));
    }

    #[test]
    fn adjacent_particle_joins_the_verb() {
        let (_, slots) = decompose_flat(
            "1 She she PRON 2 nsubj
             2 looked look VERB 0 ROOT
             3 up up ADP 2 prt
             4 the the DET 5 det
             5 word word NOUN 2 dobj",
        );
        assert_eq!(slots.text(SlotKey::V), Some("looked up"));
        assert_eq!(slots.get(SlotKey::V).unwrap().rule_id(), "particle.verb");
        assert_eq!(slots.text(SlotKey::O1), Some("the word"));
    }

    #[test]
    fn separated_particle_is_mid_modifier() {
        let (_, slots) = decompose_flat(
            "1 Turn turn VERB 0 ROOT
             2 the the DET 3 det
             3 lights light NOUN 1 dobj
             4 off off ADP 1 prt",
        );
        assert_eq!(slots.text(SlotKey::V), Some("Turn"));
        assert_eq!(slots.text(SlotKey::O1), Some("the lights"));
        assert_eq!(slots.text(SlotKey::M2), Some("off"));
    }

    #[test]
    fn ditransitive_objects_are_paired() {
        let (candidates, slots) = decompose_flat(
            "1 She she PRON 2 nsubj
             2 gave give VERB 0 ROOT
             3 him he PRON 2 dative
             4 a a DET 5 det
             5 book book NOUN 2 dobj",
        );
        assert_eq!(
            candidates
                .iter()
                .filter(|candidate| candidate.is_ditransitive_pair())
                .count(),
            2
        );
        assert_eq!(slots.text(SlotKey::O1), Some("him"));
        assert_eq!(slots.text(SlotKey::O2), Some("a book"));
    }

    #[test]
    fn fallback_fills_unknown_clause() {
        // Fragment: "Cats everywhere"
        let (candidates, slots) = decompose_flat(
            "1 Cats cat NOUN 0 ROOT
             2 everywhere everywhere ADV 1 dep",
        );
        assert!(candidates
            .iter()
            .all(|candidate| candidate.source == CandidateSource::Fallback));
        assert_eq!(slots.text(SlotKey::M3), Some("everywhere"));
        assert!(!slots.contains(SlotKey::V));
    }
}
