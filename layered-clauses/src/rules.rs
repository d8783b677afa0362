//! Rule configuration: priority tiers, modifier rules, particles,
//! contractions and the nesting policy.
//!
//! A [`RuleConfig`] is plain serde data that can be written by hand in
//! RON. Compiling it into a [`RuleBook`] validates it once; the book is
//! immutable afterwards and is passed into every decomposition call.

use crate::{ConfigError, ConfigResult, NestingPolicy};
use layered_slots::{Relation, SlotKey};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Version of the configuration format understood by this crate.
pub const RULE_CONFIG_VERSION: u32 = 1;

/// Priorities assigned by each family of rules. Higher wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityTiers {
    /// Indirect + direct object pair
    pub ditransitive: u32,
    /// Verb + adjacent particle ("look up")
    pub particle_verb: u32,
    /// Arguments from the clause pattern and the auxiliary group
    pub core: u32,
    /// Strong modifier evidence (closed temporal vocabulary)
    pub high: u32,
    pub modifier: u32,
    /// Generic adverbs and prepositional phrases
    pub low: u32,
    pub fallback: u32,
}

impl Default for PriorityTiers {
    fn default() -> Self {
        Self {
            ditransitive: 110,
            particle_verb: 105,
            core: 100,
            high: 80,
            modifier: 60,
            low: 40,
            fallback: 10,
        }
    }
}

/// What kind of modifier a rule recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModifierCategory {
    Temporal,
    Locative,
    /// Direction or purpose ("to the store", "for her mother")
    Directional,
    /// Origin ("from Paris")
    Source,
    Manner,
    /// Phrasal verb particle
    Particle,
    /// Passive agent ("by the committee")
    Agent,
    AdverbialClause,
    /// Subordinator or complementizer ("because", "that")
    ClauseMarker,
    Generic,
}

impl ModifierCategory {
    pub fn description(&self) -> &'static str {
        match self {
            ModifierCategory::Temporal => "time expression",
            ModifierCategory::Locative => "place expression",
            ModifierCategory::Directional => "direction or purpose phrase",
            ModifierCategory::Source => "origin phrase",
            ModifierCategory::Manner => "manner adverb",
            ModifierCategory::Particle => "phrasal verb particle",
            ModifierCategory::Agent => "passive agent",
            ModifierCategory::AdverbialClause => "adverbial clause",
            ModifierCategory::ClauseMarker => "clause marker",
            ModifierCategory::Generic => "adverb or prepositional phrase",
        }
    }
}

/// Where a lemma rule looks for its lemmas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LemmaScope {
    /// The dependent itself
    Head,
    /// Any token of the dependent's subtree
    Subtree,
}

/// How a modifier rule recognizes a dependent of the clause head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RuleMatcher {
    /// The dependent carries one of these relations.
    Relations(Vec<Relation>),
    /// A lemma from the set appears in the given scope. An empty relation
    /// list accepts every relation.
    Lemmas {
        lemmas: Vec<String>,
        scope: LemmaScope,
        #[serde(default)]
        relations: Vec<Relation>,
    },
    /// A prepositional phrase headed (or case-marked) by one of these lemmas.
    Prepositions(Vec<String>),
    /// The dependent's span text matches a regular expression.
    Surface {
        pattern: String,
        #[serde(default)]
        relations: Vec<Relation>,
    },
    /// A particle from [`RuleConfig::particles`] shortly after the verb.
    Particle,
}

/// The slot a modifier rule proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotTarget {
    Fixed(SlotKey),
    /// `M1` before the subject and verb, `M2` between them, and after the
    /// verb `M3` for the last modifier and `M2` for earlier ones.
    Positional,
}

fn default_confidence() -> f64 {
    1.0
}

fn default_exclude() -> Vec<Relation> {
    vec![Relation::Advcl]
}

/// One modifier rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierRuleSpec {
    pub id: String,
    pub category: ModifierCategory,
    pub matcher: RuleMatcher,
    pub target: SlotTarget,
    pub priority: u32,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    /// Relations whose branches are left out of the matched span
    #[serde(default = "default_exclude")]
    pub exclude: Vec<Relation>,
}

impl ModifierRuleSpec {
    pub fn new(
        id: impl Into<String>,
        category: ModifierCategory,
        matcher: RuleMatcher,
        target: SlotTarget,
        priority: u32,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            matcher,
            target,
            priority,
            confidence: default_confidence(),
            exclude: default_exclude(),
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_exclude(mut self, exclude: Vec<Relation>) -> Self {
        self.exclude = exclude;
        self
    }
}

const TEMPORAL_LEMMAS: &[&str] = &[
    "yesterday", "today", "tomorrow", "tonight", "now", "then", "soon", "later", "early", "recently",
    "already", "still", "yet", "ago", "always", "often", "sometimes", "usually", "morning",
    "afternoon", "evening", "night", "day", "week", "weekend", "month", "year", "hour", "minute",
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "spring",
    "summer", "autumn", "fall", "winter",
];

const TIME_PATTERN: &str =
    r"(?i)\b(1[0-9]{3}|20[0-9]{2})\b|\b[0-9]{1,2}(:[0-9]{2})?\s*(am|pm|a\.m\.|p\.m\.|o'clock)";

const LOCATIVE_PREPOSITIONS: &[&str] = &[
    "in", "at", "on", "near", "under", "above", "below", "behind", "beside", "inside",
    "outside", "between", "among", "around", "over", "within", "beneath",
];

const DIRECTIONAL_PREPOSITIONS: &[&str] = &[
    "to", "toward", "towards", "into", "onto", "for", "through", "across",
];

const PARTICLES: &[&str] = &[
    "up", "down", "out", "off", "in", "on", "over", "away", "back", "around", "along", "about",
    "through",
];

const CONTRACTIONS: &[(&str, &str)] = &[
    ("can't", "can not"),
    ("cannot", "can not"),
    ("won't", "will not"),
    ("shan't", "shall not"),
];

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|item| item.to_string()).collect()
}

fn standard_modifiers(tiers: &PriorityTiers) -> Vec<ModifierRuleSpec> {
    let adverbial = vec![
        Relation::Advmod,
        Relation::Npadvmod,
        Relation::Prep,
        Relation::Obl,
        Relation::Nmod,
    ];

    vec![
        ModifierRuleSpec::new(
            "temporal.lemma",
            ModifierCategory::Temporal,
            RuleMatcher::Lemmas {
                lemmas: strings(TEMPORAL_LEMMAS),
                scope: LemmaScope::Subtree,
                relations: adverbial.clone(),
            },
            SlotTarget::Positional,
            tiers.high,
        )
        .with_confidence(0.9),
        ModifierRuleSpec::new(
            "temporal.surface",
            ModifierCategory::Temporal,
            RuleMatcher::Surface {
                pattern: TIME_PATTERN.to_string(),
                relations: adverbial.clone(),
            },
            SlotTarget::Positional,
            tiers.high,
        )
        .with_confidence(0.85),
        ModifierRuleSpec::new(
            "manner.ly",
            ModifierCategory::Manner,
            RuleMatcher::Surface {
                pattern: r"(?i)\b[a-z]+ly$".to_string(),
                relations: vec![Relation::Advmod],
            },
            SlotTarget::Fixed(SlotKey::M2),
            tiers.modifier,
        )
        .with_confidence(0.8),
        ModifierRuleSpec::new(
            "particle",
            ModifierCategory::Particle,
            RuleMatcher::Particle,
            SlotTarget::Fixed(SlotKey::M2),
            tiers.modifier,
        )
        .with_confidence(0.9),
        ModifierRuleSpec::new(
            "agent",
            ModifierCategory::Agent,
            RuleMatcher::Relations(vec![Relation::Agent]),
            SlotTarget::Positional,
            tiers.modifier,
        )
        .with_confidence(0.95),
        ModifierRuleSpec::new(
            "locative.pp",
            ModifierCategory::Locative,
            RuleMatcher::Prepositions(strings(LOCATIVE_PREPOSITIONS)),
            SlotTarget::Positional,
            tiers.modifier,
        )
        .with_confidence(0.8),
        ModifierRuleSpec::new(
            "directional.pp",
            ModifierCategory::Directional,
            RuleMatcher::Prepositions(strings(DIRECTIONAL_PREPOSITIONS)),
            SlotTarget::Positional,
            tiers.modifier,
        )
        .with_confidence(0.8),
        ModifierRuleSpec::new(
            "source.pp",
            ModifierCategory::Source,
            RuleMatcher::Prepositions(strings(&["from"])),
            SlotTarget::Positional,
            tiers.modifier,
        )
        .with_confidence(0.8),
        ModifierRuleSpec::new(
            "adverbial_clause",
            ModifierCategory::AdverbialClause,
            RuleMatcher::Relations(vec![Relation::Advcl]),
            SlotTarget::Positional,
            tiers.modifier,
        )
        .with_confidence(0.85)
        .with_exclude(Vec::new()),
        ModifierRuleSpec::new(
            "clause_marker",
            ModifierCategory::ClauseMarker,
            RuleMatcher::Relations(vec![Relation::Mark]),
            SlotTarget::Positional,
            tiers.modifier,
        )
        .with_confidence(0.9)
        .with_exclude(Vec::new()),
        ModifierRuleSpec::new(
            "generic",
            ModifierCategory::Generic,
            RuleMatcher::Relations(adverbial),
            SlotTarget::Positional,
            tiers.low,
        )
        .with_confidence(0.6),
    ]
}

/// Serializable rule configuration.
///
/// Every field has a default, so a RON document only needs to name what
/// it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    pub version: u32,
    pub tiers: PriorityTiers,
    pub modifiers: Vec<ModifierRuleSpec>,
    /// Closed list of phrasal verb particles
    pub particles: Vec<String>,
    /// How far after the verb a particle may stand
    pub particle_distance: usize,
    /// Lowercase contraction → expansion
    pub contractions: BTreeMap<String, String>,
    pub nesting: NestingPolicy,
}

impl RuleConfig {
    pub fn new() -> Self {
        let tiers = PriorityTiers::default();
        Self {
            version: RULE_CONFIG_VERSION,
            modifiers: standard_modifiers(&tiers),
            tiers,
            particles: strings(PARTICLES),
            particle_distance: 3,
            contractions: CONTRACTIONS
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            nesting: NestingPolicy::default(),
        }
    }
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A modifier rule with its surface pattern compiled.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    spec: ModifierRuleSpec,
    surface: Option<Regex>,
}

impl CompiledRule {
    pub fn spec(&self) -> &ModifierRuleSpec {
        &self.spec
    }

    pub fn id(&self) -> &str {
        &self.spec.id
    }

    pub fn surface(&self) -> Option<&Regex> {
        self.surface.as_ref()
    }
}

static STANDARD: Lazy<RuleBook> = Lazy::new(|| {
    RuleBook::compile(RuleConfig::default()).expect("standard rule configuration compiles")
});

/// Validated, immutable rule tables.
#[derive(Debug, Clone)]
pub struct RuleBook {
    config: RuleConfig,
    rules: Vec<CompiledRule>,
    particles: BTreeSet<String>,
}

impl RuleBook {
    pub fn compile(config: RuleConfig) -> ConfigResult<Self> {
        if config.version != RULE_CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                expected: RULE_CONFIG_VERSION,
            });
        }

        let mut seen = BTreeSet::new();
        let mut rules = Vec::with_capacity(config.modifiers.len());
        for spec in config.modifiers.iter() {
            if !seen.insert(spec.id.clone()) {
                return Err(ConfigError::DuplicateRule(spec.id.clone()));
            }
            let surface = match &spec.matcher {
                RuleMatcher::Surface { pattern, .. } => Some(Regex::new(pattern).map_err(
                    |source| ConfigError::InvalidPattern {
                        rule_id: spec.id.clone(),
                        source,
                    },
                )?),
                _ => None,
            };
            let mut spec = spec.clone();
            spec.confidence = spec.confidence.clamp(0.0, 1.0);
            rules.push(CompiledRule { spec, surface });
        }

        let particles = config
            .particles
            .iter()
            .map(|particle| particle.to_lowercase())
            .collect();

        tracing::debug!(rules = rules.len(), version = config.version, "compiled rule book");

        Ok(Self {
            config,
            rules,
            particles,
        })
    }

    pub fn from_ron(text: &str) -> ConfigResult<Self> {
        let config: RuleConfig = ron::from_str(text)?;
        Self::compile(config)
    }

    pub fn to_ron(&self) -> ConfigResult<String> {
        Ok(ron::ser::to_string_pretty(
            &self.config,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// The standard tables, shared process-wide.
    pub fn shared() -> &'static RuleBook {
        &STANDARD
    }

    /// An owned copy of the standard tables.
    pub fn standard() -> Self {
        Self::shared().clone()
    }

    pub fn with_nesting(mut self, nesting: NestingPolicy) -> Self {
        self.config.nesting = nesting;
        self
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn tiers(&self) -> &PriorityTiers {
        &self.config.tiers
    }

    pub fn nesting(&self) -> &NestingPolicy {
        &self.config.nesting
    }

    pub fn is_particle(&self, lemma: &str) -> bool {
        self.particles.contains(lemma)
    }

    pub fn particle_distance(&self) -> usize {
        self.config.particle_distance
    }

    pub fn contractions(&self) -> &BTreeMap<String, String> {
        &self.config.contractions
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_book_compiles() {
        let book = RuleBook::standard();
        assert_eq!(book.tiers().core, 100);
        assert!(book.tiers().particle_verb > book.tiers().core);
        assert!(book.is_particle("up"));
        assert_eq!(book.nesting().max_depth, 8);
        assert!(book.rules().iter().any(|rule| rule.id() == "temporal.lemma"));
        assert!(book
            .rules()
            .iter()
            .find(|rule| rule.id() == "manner.ly")
            .and_then(CompiledRule::surface)
            .is_some());
    }

    #[test]
    fn partial_ron_keeps_defaults() {
        let book = RuleBook::from_ron(
            r#"(
                version: 1,
                nesting: (max_depth: 2),
                modifiers: [
                    (
                        id: "weekday",
                        category: Temporal,
                        matcher: Lemmas(lemmas: ["monday"], scope: Head),
                        target: Fixed(M1),
                        priority: 90,
                    ),
                ],
            )"#,
        )
        .unwrap();

        assert_eq!(book.nesting().max_depth, 2);
        assert_eq!(book.nesting().max_flat_tokens, 1);
        assert_eq!(book.rules().len(), 1);
        assert_eq!(book.rules()[0].spec().exclude, vec![Relation::Advcl]);
        assert_eq!(book.rules()[0].spec().confidence, 1.0);
        assert_eq!(book.contractions().get("won't").map(String::as_str), Some("will not"));
    }

    #[test]
    fn rejects_bad_configs() {
        let err = RuleBook::from_ron("(version: 7)").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnsupportedVersion { found: 7, expected: 1 }
        ));

        let err = RuleBook::from_ron("(version: 1, tiers: (core: \"high\"))").unwrap_err();
        assert!(matches!(err, ConfigError::Ron(_)));

        let mut config = RuleConfig::default();
        let first = config.modifiers[0].clone();
        config.modifiers.push(first);
        let err = RuleBook::compile(config).unwrap_err();
        assert_eq!(err.to_string(), "duplicate rule id `temporal.lemma`");

        let mut config = RuleConfig::default();
        config.modifiers = vec![ModifierRuleSpec::new(
            "broken",
            ModifierCategory::Generic,
            RuleMatcher::Surface {
                pattern: "(unclosed".to_string(),
                relations: Vec::new(),
            },
            SlotTarget::Positional,
            40,
        )];
        let err = RuleBook::compile(config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { ref rule_id, .. } if rule_id == "broken"));
    }

    #[test]
    fn standard_config_survives_ron() {
        let text = RuleBook::standard().to_ron().unwrap();
        let reloaded = RuleBook::from_ron(&text).unwrap();
        assert_eq!(reloaded.config(), RuleBook::standard().config());
    }
}
