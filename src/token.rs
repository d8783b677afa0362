//! Token model consumed from an external dependency parser.
//!
//! Tokens are produced once by the parser and only ever read by the
//! decomposition pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse part-of-speech, following the Universal POS tag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pos {
    Noun,
    Propn,
    Pron,
    Verb,
    Aux,
    Adj,
    Adv,
    Adp,
    Part,
    Det,
    Num,
    Cconj,
    Sconj,
    Punct,
    Intj,
    Sym,
    X,
}

impl Pos {
    /// Parse a UPOS tag. Unknown tags become [`Pos::X`].
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_uppercase().as_str() {
            "NOUN" => Pos::Noun,
            "PROPN" => Pos::Propn,
            "PRON" => Pos::Pron,
            "VERB" => Pos::Verb,
            "AUX" => Pos::Aux,
            "ADJ" => Pos::Adj,
            "ADV" => Pos::Adv,
            "ADP" => Pos::Adp,
            "PART" => Pos::Part,
            "DET" => Pos::Det,
            "NUM" => Pos::Num,
            "CCONJ" | "CONJ" => Pos::Cconj,
            "SCONJ" => Pos::Sconj,
            "PUNCT" => Pos::Punct,
            "INTJ" => Pos::Intj,
            "SYM" => Pos::Sym,
            _ => Pos::X,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Pos::Noun => "NOUN",
            Pos::Propn => "PROPN",
            Pos::Pron => "PRON",
            Pos::Verb => "VERB",
            Pos::Aux => "AUX",
            Pos::Adj => "ADJ",
            Pos::Adv => "ADV",
            Pos::Adp => "ADP",
            Pos::Part => "PART",
            Pos::Det => "DET",
            Pos::Num => "NUM",
            Pos::Cconj => "CCONJ",
            Pos::Sconj => "SCONJ",
            Pos::Punct => "PUNCT",
            Pos::Intj => "INTJ",
            Pos::Sym => "SYM",
            Pos::X => "X",
        }
    }

    /// Nouns, proper nouns, pronouns and numerals.
    pub fn is_nominal(&self) -> bool {
        matches!(self, Pos::Noun | Pos::Propn | Pos::Pron | Pos::Num)
    }

    pub fn is_verbal(&self) -> bool {
        matches!(self, Pos::Verb | Pos::Aux)
    }
}

/// Grammatical relation between a token and its head.
///
/// Labels follow the spaCy English scheme; the common Universal
/// Dependencies spellings are accepted as aliases by [`Relation::from_label`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Relation {
    Root,
    /// Nominal subject
    Nsubj,
    /// Passive nominal subject
    NsubjPass,
    /// Clausal subject
    Csubj,
    CsubjPass,
    /// Expletive ("there is ...")
    Expl,
    /// Direct object
    Dobj,
    /// Indirect object (spaCy "dative")
    Iobj,
    /// Attribute of a copular verb
    Attr,
    /// Adjectival complement
    Acomp,
    /// Object predicate
    Oprd,
    /// Open clausal complement
    Xcomp,
    /// Closed clausal complement
    Ccomp,
    /// Adverbial clause modifier
    Advcl,
    /// Relative clause modifier
    Relcl,
    /// Clausal modifier of a noun (participial phrase)
    Acl,
    Aux,
    AuxPass,
    Cop,
    Neg,
    /// Clause marker ("that", "because", "if")
    Mark,
    Det,
    Amod,
    Advmod,
    /// Noun phrase used adverbially ("last week")
    Npadvmod,
    Prep,
    Pobj,
    Pcomp,
    /// Passive agent ("by X")
    Agent,
    /// Phrasal verb particle
    Prt,
    Compound,
    Poss,
    Nummod,
    Case,
    Appos,
    Nmod,
    Obl,
    Conj,
    Cc,
    Punct,
    Dep,
    Other(String),
}

impl Relation {
    pub fn from_label(label: &str) -> Self {
        match label {
            "ROOT" | "root" => Relation::Root,
            "nsubj" => Relation::Nsubj,
            "nsubjpass" | "nsubj:pass" => Relation::NsubjPass,
            "csubj" => Relation::Csubj,
            "csubjpass" | "csubj:pass" => Relation::CsubjPass,
            "expl" => Relation::Expl,
            "dobj" | "obj" => Relation::Dobj,
            "iobj" | "dative" => Relation::Iobj,
            "attr" => Relation::Attr,
            "acomp" => Relation::Acomp,
            "oprd" => Relation::Oprd,
            "xcomp" => Relation::Xcomp,
            "ccomp" => Relation::Ccomp,
            "advcl" => Relation::Advcl,
            "relcl" | "acl:relcl" => Relation::Relcl,
            "acl" => Relation::Acl,
            "aux" => Relation::Aux,
            "auxpass" | "aux:pass" => Relation::AuxPass,
            "cop" => Relation::Cop,
            "neg" => Relation::Neg,
            "mark" => Relation::Mark,
            "det" => Relation::Det,
            "amod" => Relation::Amod,
            "advmod" => Relation::Advmod,
            "npadvmod" | "npmod" | "tmod" | "obl:npmod" | "obl:tmod" => Relation::Npadvmod,
            "prep" => Relation::Prep,
            "pobj" => Relation::Pobj,
            "pcomp" => Relation::Pcomp,
            "agent" | "obl:agent" => Relation::Agent,
            "prt" | "compound:prt" => Relation::Prt,
            "compound" => Relation::Compound,
            "poss" | "nmod:poss" => Relation::Poss,
            "nummod" => Relation::Nummod,
            "case" => Relation::Case,
            "appos" => Relation::Appos,
            "nmod" => Relation::Nmod,
            "obl" => Relation::Obl,
            "conj" => Relation::Conj,
            "cc" => Relation::Cc,
            "punct" => Relation::Punct,
            "dep" => Relation::Dep,
            other => Relation::Other(other.to_string()),
        }
    }

    /// Canonical label for this relation.
    pub fn label(&self) -> &str {
        match self {
            Relation::Root => "ROOT",
            Relation::Nsubj => "nsubj",
            Relation::NsubjPass => "nsubjpass",
            Relation::Csubj => "csubj",
            Relation::CsubjPass => "csubjpass",
            Relation::Expl => "expl",
            Relation::Dobj => "dobj",
            Relation::Iobj => "iobj",
            Relation::Attr => "attr",
            Relation::Acomp => "acomp",
            Relation::Oprd => "oprd",
            Relation::Xcomp => "xcomp",
            Relation::Ccomp => "ccomp",
            Relation::Advcl => "advcl",
            Relation::Relcl => "relcl",
            Relation::Acl => "acl",
            Relation::Aux => "aux",
            Relation::AuxPass => "auxpass",
            Relation::Cop => "cop",
            Relation::Neg => "neg",
            Relation::Mark => "mark",
            Relation::Det => "det",
            Relation::Amod => "amod",
            Relation::Advmod => "advmod",
            Relation::Npadvmod => "npadvmod",
            Relation::Prep => "prep",
            Relation::Pobj => "pobj",
            Relation::Pcomp => "pcomp",
            Relation::Agent => "agent",
            Relation::Prt => "prt",
            Relation::Compound => "compound",
            Relation::Poss => "poss",
            Relation::Nummod => "nummod",
            Relation::Case => "case",
            Relation::Appos => "appos",
            Relation::Nmod => "nmod",
            Relation::Obl => "obl",
            Relation::Conj => "conj",
            Relation::Cc => "cc",
            Relation::Punct => "punct",
            Relation::Dep => "dep",
            Relation::Other(label) => label,
        }
    }

    pub fn is_subject(&self) -> bool {
        matches!(
            self,
            Relation::Nsubj
                | Relation::NsubjPass
                | Relation::Csubj
                | Relation::CsubjPass
                | Relation::Expl
        )
    }

    pub fn is_auxiliary(&self) -> bool {
        matches!(self, Relation::Aux | Relation::AuxPass)
    }

    /// Relations that introduce an embedded clause.
    pub fn is_clausal(&self) -> bool {
        matches!(
            self,
            Relation::Relcl
                | Relation::Acl
                | Relation::Advcl
                | Relation::Xcomp
                | Relation::Ccomp
                | Relation::Csubj
                | Relation::CsubjPass
        )
    }

    /// Relations that modify rather than complete their head.
    pub fn is_modifier_class(&self) -> bool {
        matches!(
            self,
            Relation::Amod
                | Relation::Advmod
                | Relation::Npadvmod
                | Relation::Prep
                | Relation::Nmod
                | Relation::Obl
                | Relation::Agent
        )
    }

    /// Relations that stay inside a nominal or adjectival phrase when the
    /// phrase head is itself a slot filler (e.g. the complement of a copula).
    pub fn is_phrase_internal(&self) -> bool {
        matches!(
            self,
            Relation::Det
                | Relation::Amod
                | Relation::Compound
                | Relation::Poss
                | Relation::Nummod
                | Relation::Case
                | Relation::Nmod
                | Relation::Pobj
                | Relation::Pcomp
                | Relation::Relcl
                | Relation::Acl
                | Relation::Appos
        )
    }
}

impl From<String> for Relation {
    fn from(label: String) -> Self {
        Relation::from_label(&label)
    }
}

impl From<Relation> for String {
    fn from(relation: Relation) -> Self {
        relation.label().to_string()
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One parsed word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// 0-based position in the sentence
    pub index: usize,
    pub text: String,
    pub lemma: String,
    pub pos: Pos,
    pub relation: Relation,
    /// Index of the syntactic head; equal to `index` for the clause root
    pub head_index: usize,
}

impl Token {
    pub fn new(
        index: usize,
        text: impl Into<String>,
        lemma: impl Into<String>,
        pos: Pos,
        relation: Relation,
        head_index: usize,
    ) -> Self {
        Self {
            index,
            text: text.into(),
            lemma: lemma.into(),
            pos,
            relation,
            head_index,
        }
    }

    pub fn is_root(&self) -> bool {
        self.head_index == self.index || self.relation == Relation::Root
    }

    /// Lowercased lemma, falling back to the surface text when the parser
    /// left the lemma empty.
    pub fn lemma_lower(&self) -> String {
        if self.lemma.is_empty() || self.lemma == "_" {
            self.text.to_lowercase()
        } else {
            self.lemma.to_lowercase()
        }
    }
}
