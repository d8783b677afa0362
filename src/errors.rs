//! Error types for sentence intake and span resolution.

use crate::SpanRef;
use thiserror::Error;

/// Errors that abort a decomposition call.
///
/// Recoverable conditions (depth truncation, unmatched patterns, empty
/// candidate sets) are not errors; they are reported as diagnostics next
/// to the result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    /// A span was requested for a token outside the clause being analyzed.
    #[error("token {index} is outside the clause range {range}")]
    TokenOutOfScope { index: usize, range: SpanRef },

    #[error("sentence has no tokens")]
    EmptySentence,

    /// A token points at a head that does not exist.
    #[error("token {index} has head {head}, which is out of range")]
    InvalidHead { index: usize, head: usize },

    /// A token's stored index does not match its position.
    #[error("token at position {position} claims index {index}")]
    MisnumberedToken { position: usize, index: usize },

    #[error("sentence has no root token")]
    MissingRoot,

    /// Parser output that could not be read.
    #[error("malformed parser output at line {line}: {message}")]
    MalformedInput { line: usize, message: String },
}

pub type SlotResult<T> = Result<T, SlotError>;
