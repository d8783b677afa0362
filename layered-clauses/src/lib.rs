#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]
//! Clause pattern classification and recursive slot decomposition.
//!
//! [`SlotDecomposer`] drives the pipeline for a [`ParsedSentence`]: the
//! clause is classified ([`classify`]), candidates are proposed
//! ([`CandidateGenerator`]) and resolved ([`ConflictResolver`]), and complex
//! fillers are decomposed again into the same slot vocabulary.
//!
//! [`ParsedSentence`]: layered_slots::ParsedSentence

mod auxiliary;
mod candidate;
mod conflict;
mod decomposer;
mod diagnostics;
mod errors;
mod generator;
mod nesting;
mod pattern;
mod relative_clause;
mod rules;

pub use auxiliary::{expand_contraction, join_clitics, normalize_surface};
pub use candidate::{Candidate, CandidateSource};
pub use conflict::{covered_tokens, ConflictResolver};
pub use decomposer::{Decomposition, SlotDecomposer};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use errors::{ConfigError, ConfigResult};
pub use generator::CandidateGenerator;
pub use nesting::{contains_predicate, needs_nesting, NestingPolicy};
pub use pattern::{classify, ClassifiedPattern, ClausePattern};
pub use relative_clause::{RelativeClause, RelativeClauseDetector, RelativePronoun};
pub use rules::{
    CompiledRule, LemmaScope, ModifierCategory, ModifierRuleSpec, PriorityTiers, RuleBook,
    RuleConfig, RuleMatcher, SlotTarget, RULE_CONFIG_VERSION,
};

#[cfg(test)]
mod tests {
    mod properties;
    mod scenarios;
    mod snapshots;
}
