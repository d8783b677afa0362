//! Selection of final slot fillers from competing candidates.
//!
//! Candidates are ranked by priority, highest first, with ties broken by
//! their position in the input list. Selection then runs in three passes:
//!
//! 1. Position level: a candidate is accepted only if none of its tokens
//!    has been taken by an earlier-ranked accepted candidate.
//! 2. Slot level: among accepted candidates, the first-ranked one per slot
//!    wins. A loser that names alternate slots moves to the first of them
//!    still free, so its tokens are not lost.
//! 3. Ditransitive pair: when an indirect + direct object pair was proposed,
//!    the pair owns `O1`/`O2`, displacing any other winner there or
//!    overlapping it.

use crate::Candidate;
use layered_slots::{FilledSlot, SlotAssignment, SlotKey};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashSet};

#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictResolver;

impl ConflictResolver {
    pub fn new() -> Self {
        Self
    }

    /// Input indices in rank order.
    fn rank(candidates: &[Candidate]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        // stable: equal priorities keep declaration order
        order.sort_by(|&a, &b| candidates[b].priority.cmp(&candidates[a].priority));
        order
    }

    /// The winning candidates, one per slot, in slot order.
    pub fn resolve_candidates(&self, candidates: &[Candidate]) -> Vec<Candidate> {
        let ranked = Self::rank(candidates);

        let mut consumed = HashSet::new();
        let mut accepted = Vec::new();
        for &idx in ranked.iter() {
            let candidate = &candidates[idx];
            if candidate
                .span
                .range
                .indices()
                .any(|token| consumed.contains(&token))
            {
                tracing::trace!(
                    slot = %candidate.slot,
                    rule = %candidate.rule_id,
                    span = %candidate.span.range,
                    "candidate rejected: tokens already taken"
                );
                continue;
            }
            consumed.extend(candidate.span.range.indices());
            accepted.push(idx);
        }

        let mut winners: BTreeMap<SlotKey, usize> = BTreeMap::new();
        let mut displaced = Vec::new();
        for idx in accepted {
            match winners.entry(candidates[idx].slot) {
                Entry::Vacant(entry) => {
                    entry.insert(idx);
                }
                Entry::Occupied(_) => displaced.push(idx),
            }
        }
        for idx in displaced {
            let candidate = &candidates[idx];
            match candidate
                .alternates
                .iter()
                .copied()
                .find(|slot| !winners.contains_key(slot))
            {
                Some(slot) => {
                    tracing::trace!(
                        from = %candidate.slot,
                        to = %slot,
                        rule = %candidate.rule_id,
                        "candidate moved to free slot"
                    );
                    winners.insert(slot, idx);
                }
                None => tracing::trace!(
                    slot = %candidate.slot,
                    rule = %candidate.rule_id,
                    "candidate lost its slot"
                ),
            }
        }

        let pair_o1 = ranked.iter().copied().find(|&idx| {
            candidates[idx].slot == SlotKey::O1 && candidates[idx].is_ditransitive_pair()
        });
        let pair_o2 = ranked.iter().copied().find(|&idx| {
            candidates[idx].slot == SlotKey::O2 && candidates[idx].is_ditransitive_pair()
        });
        if let (Some(o1), Some(o2)) = (pair_o1, pair_o2) {
            let pair = [o1, o2];
            winners.retain(|slot, &mut idx| {
                let keep = pair.contains(&idx)
                    || (!matches!(slot, SlotKey::O1 | SlotKey::O2)
                        && !pair
                            .iter()
                            .any(|&p| candidates[p].span.overlaps(&candidates[idx].span)));
                if !keep {
                    tracing::trace!(
                        slot = %slot,
                        rule = %candidates[idx].rule_id,
                        "winner displaced by ditransitive pair"
                    );
                }
                keep
            });
            winners.insert(SlotKey::O1, o1);
            winners.insert(SlotKey::O2, o2);
        }

        let resolved: Vec<Candidate> = winners
            .iter()
            .map(|(&slot, &idx)| {
                let mut winner = candidates[idx].clone();
                winner.slot = slot;
                winner
            })
            .collect();

        tracing::debug!(
            candidates = candidates.len(),
            winners = resolved.len(),
            "resolved candidates"
        );
        resolved
    }

    /// The winners as leaf slots.
    pub fn resolve(&self, candidates: &[Candidate]) -> SlotAssignment {
        let mut assignment = SlotAssignment::new();
        for candidate in self.resolve_candidates(candidates) {
            assignment.insert(
                candidate.slot,
                FilledSlot::leaf(candidate.text(), candidate.span.range, candidate.rule_id.clone()),
            );
        }
        assignment
    }
}

/// Tokens covered by a set of winners; each is counted once.
pub fn covered_tokens(winners: &[Candidate]) -> BTreeSet<usize> {
    winners
        .iter()
        .flat_map(|candidate| candidate.span.range.indices())
        .collect()
}
