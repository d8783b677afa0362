//! Clause pattern classification.
//!
//! Maps the set of relations carried by a clause's direct dependents, plus
//! the part of speech of the clause head, to an argument-structure pattern
//! and the relation→slot mapping that goes with it.

use layered_slots::{Pos, Relation, SlotKey};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Argument structure of a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClausePattern {
    /// Subject + verb: "Birds sing"
    Sv,
    /// Subject + verb + object: "She wrote books"
    Svo,
    /// Subject + verb + complement: "He is tired"
    Svc,
    /// Subject + verb + indirect object + direct object: "She gave him a book"
    Svoo,
    /// Subject + verb + object + object complement: "They elected her president"
    Svoc,
    /// "The book was written"
    Passive,
    /// No subject, verbal head: "Sit down"
    Imperative,
    Unknown,
}

impl ClausePattern {
    pub fn label(&self) -> &'static str {
        match self {
            ClausePattern::Sv => "SV",
            ClausePattern::Svo => "SVO",
            ClausePattern::Svc => "SVC",
            ClausePattern::Svoo => "SVOO",
            ClausePattern::Svoc => "SVOC",
            ClausePattern::Passive => "Passive",
            ClausePattern::Imperative => "Imperative",
            ClausePattern::Unknown => "Unknown",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ClausePattern::Sv => "intransitive clause",
            ClausePattern::Svo => "transitive clause",
            ClausePattern::Svc => "copular or linking clause",
            ClausePattern::Svoo => "ditransitive clause",
            ClausePattern::Svoc => "complex-transitive clause",
            ClausePattern::Passive => "passive clause",
            ClausePattern::Imperative => "subjectless clause with a verbal head",
            ClausePattern::Unknown => "no argument structure recognized",
        }
    }
}

impl fmt::Display for ClausePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A pattern together with its relation→slot mapping.
///
/// The clause head itself is keyed under [`Relation::Root`], whatever
/// relation it carries towards its own head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedPattern {
    pub pattern: ClausePattern,
    pub mapping: BTreeMap<Relation, SlotKey>,
}

impl ClassifiedPattern {
    pub fn slot_for(&self, relation: &Relation) -> Option<SlotKey> {
        self.mapping.get(relation).copied()
    }

    /// Slot of the clause head, if the pattern maps it.
    pub fn head_slot(&self) -> Option<SlotKey> {
        self.slot_for(&Relation::Root)
    }
}

const SUBJECTS: [Relation; 5] = [
    Relation::Nsubj,
    Relation::NsubjPass,
    Relation::Csubj,
    Relation::CsubjPass,
    Relation::Expl,
];

const OBJECT_COMPLEMENTS: [Relation; 4] = [
    Relation::Oprd,
    Relation::Xcomp,
    Relation::Acomp,
    Relation::Attr,
];

const SUBJECT_COMPLEMENTS: [Relation; 3] = [Relation::Attr, Relation::Acomp, Relation::Oprd];

/// Classify a clause from the relations of its direct dependents.
///
/// Rules are checked most-specific first; the first match wins. The
/// function is pure, so classifying the same input twice gives the same
/// answer.
pub fn classify(relations: &BTreeSet<Relation>, root_pos: Pos) -> ClassifiedPattern {
    let has = |relation: &Relation| relations.contains(relation);
    let has_any = |set: &[Relation]| set.iter().any(|relation| relations.contains(relation));
    let has_subject = relations.iter().any(Relation::is_subject);

    let pattern = if has(&Relation::NsubjPass) && has(&Relation::AuxPass) {
        ClausePattern::Passive
    } else if has(&Relation::Iobj) && has(&Relation::Dobj) {
        ClausePattern::Svoo
    } else if has(&Relation::Dobj) && has_any(&OBJECT_COMPLEMENTS) {
        ClausePattern::Svoc
    } else if has(&Relation::Dobj) || has(&Relation::Ccomp) || has(&Relation::Xcomp) {
        ClausePattern::Svo
    } else if has(&Relation::Cop) || has_any(&SUBJECT_COMPLEMENTS) {
        ClausePattern::Svc
    } else if has_subject {
        ClausePattern::Sv
    } else if root_pos.is_verbal() {
        ClausePattern::Imperative
    } else {
        ClausePattern::Unknown
    };

    let mut mapping = BTreeMap::new();
    if !matches!(pattern, ClausePattern::Imperative | ClausePattern::Unknown) {
        for subject in SUBJECTS {
            mapping.insert(subject, SlotKey::S);
        }
    }

    match pattern {
        ClausePattern::Passive => {
            mapping.insert(Relation::Root, SlotKey::V);
            mapping.insert(Relation::Dobj, SlotKey::O1);
            for complement in OBJECT_COMPLEMENTS {
                mapping.insert(complement, SlotKey::C1);
            }
        }
        ClausePattern::Svoo => {
            mapping.insert(Relation::Root, SlotKey::V);
            mapping.insert(Relation::Iobj, SlotKey::O1);
            mapping.insert(Relation::Dobj, SlotKey::O2);
            for complement in OBJECT_COMPLEMENTS {
                mapping.insert(complement, SlotKey::C2);
            }
        }
        ClausePattern::Svoc => {
            mapping.insert(Relation::Root, SlotKey::V);
            mapping.insert(Relation::Dobj, SlotKey::O1);
            for complement in OBJECT_COMPLEMENTS {
                mapping.insert(complement, SlotKey::C2);
            }
        }
        ClausePattern::Svo => {
            mapping.insert(Relation::Root, SlotKey::V);
            mapping.insert(Relation::Dobj, SlotKey::O1);
            let clausal_object = if has(&Relation::Dobj) {
                SlotKey::O2
            } else {
                SlotKey::O1
            };
            mapping.insert(Relation::Ccomp, clausal_object);
            mapping.insert(Relation::Xcomp, clausal_object);
        }
        ClausePattern::Svc if has(&Relation::Cop) => {
            mapping.insert(Relation::Cop, SlotKey::V);
            mapping.insert(Relation::Root, SlotKey::C1);
        }
        ClausePattern::Svc => {
            mapping.insert(Relation::Root, SlotKey::V);
            for complement in SUBJECT_COMPLEMENTS {
                mapping.insert(complement, SlotKey::C1);
            }
        }
        ClausePattern::Sv | ClausePattern::Imperative => {
            mapping.insert(Relation::Root, SlotKey::V);
        }
        ClausePattern::Unknown => {
            if root_pos.is_verbal() {
                mapping.insert(Relation::Root, SlotKey::V);
            }
        }
    }

    ClassifiedPattern { pattern, mapping }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relations(list: &[Relation]) -> BTreeSet<Relation> {
        list.iter().cloned().collect()
    }

    #[test]
    fn subject_and_object_is_svo() {
        let classified = classify(&relations(&[Relation::Nsubj, Relation::Dobj]), Pos::Verb);
        assert_eq!(classified.pattern, ClausePattern::Svo);
        assert_eq!(classified.slot_for(&Relation::Nsubj), Some(SlotKey::S));
        assert_eq!(classified.head_slot(), Some(SlotKey::V));
        assert_eq!(classified.slot_for(&Relation::Dobj), Some(SlotKey::O1));
    }

    #[test]
    fn most_specific_rule_wins() {
        let passive = relations(&[Relation::NsubjPass, Relation::AuxPass, Relation::Dobj, Relation::Iobj]);
        assert_eq!(classify(&passive, Pos::Verb).pattern, ClausePattern::Passive);

        let ditransitive = relations(&[Relation::Nsubj, Relation::Iobj, Relation::Dobj, Relation::Oprd]);
        let classified = classify(&ditransitive, Pos::Verb);
        assert_eq!(classified.pattern, ClausePattern::Svoo);
        assert_eq!(classified.slot_for(&Relation::Iobj), Some(SlotKey::O1));
        assert_eq!(classified.slot_for(&Relation::Dobj), Some(SlotKey::O2));
        assert_eq!(classified.slot_for(&Relation::Oprd), Some(SlotKey::C2));

        let complex = relations(&[Relation::Nsubj, Relation::Dobj, Relation::Oprd]);
        assert_eq!(classify(&complex, Pos::Verb).pattern, ClausePattern::Svoc);
    }

    #[test]
    fn clausal_object_moves_to_o2_next_to_direct_object() {
        let alone = classify(&relations(&[Relation::Nsubj, Relation::Ccomp]), Pos::Verb);
        assert_eq!(alone.pattern, ClausePattern::Svo);
        assert_eq!(alone.slot_for(&Relation::Ccomp), Some(SlotKey::O1));

        let with_object = classify(
            &relations(&[Relation::Nsubj, Relation::Dobj, Relation::Ccomp]),
            Pos::Verb,
        );
        assert_eq!(with_object.slot_for(&Relation::Ccomp), Some(SlotKey::O2));
    }

    #[test]
    fn copula_maps_head_to_complement() {
        let classified = classify(&relations(&[Relation::Nsubj, Relation::Cop]), Pos::Adj);
        assert_eq!(classified.pattern, ClausePattern::Svc);
        assert_eq!(classified.slot_for(&Relation::Cop), Some(SlotKey::V));
        assert_eq!(classified.head_slot(), Some(SlotKey::C1));

        let linking = classify(&relations(&[Relation::Nsubj, Relation::Acomp]), Pos::Verb);
        assert_eq!(linking.head_slot(), Some(SlotKey::V));
        assert_eq!(linking.slot_for(&Relation::Acomp), Some(SlotKey::C1));
    }

    #[test]
    fn subjectless_clauses() {
        let imperative = classify(&relations(&[Relation::Advmod]), Pos::Verb);
        assert_eq!(imperative.pattern, ClausePattern::Imperative);
        assert_eq!(imperative.slot_for(&Relation::Nsubj), None);
        assert_eq!(imperative.head_slot(), Some(SlotKey::V));

        let fragment = classify(&relations(&[Relation::Det, Relation::Amod]), Pos::Noun);
        assert_eq!(fragment.pattern, ClausePattern::Unknown);
        assert!(fragment.mapping.is_empty());

        let bare = classify(&BTreeSet::new(), Pos::Verb);
        assert_eq!(bare.pattern, ClausePattern::Imperative);
    }

    #[test]
    fn classification_is_idempotent() {
        let input = relations(&[Relation::Nsubj, Relation::Xcomp, Relation::Advmod]);
        assert_eq!(classify(&input, Pos::Verb), classify(&input, Pos::Verb));
    }
}
