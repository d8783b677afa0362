//! Error types for rule configuration.

use thiserror::Error;

/// Errors raised while building a [`RuleBook`](crate::RuleBook).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The RON text could not be parsed.
    #[error("failed to parse rule configuration: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// The configuration could not be written as RON.
    #[error("failed to serialize rule configuration: {0}")]
    Serialize(#[from] ron::Error),

    #[error("unsupported rule configuration version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// Two modifier rules share an identifier.
    #[error("duplicate rule id `{0}`")]
    DuplicateRule(String),

    /// A surface rule carries a pattern that does not compile.
    #[error("rule `{rule_id}` has an invalid surface pattern: {source}")]
    InvalidPattern {
        rule_id: String,
        #[source]
        source: regex::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
