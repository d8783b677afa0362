//! Error types for the spec system.

use layered_slots::SlotError;
use thiserror::Error;

/// Errors that can occur while loading or running fixtures.
#[derive(Debug, Error)]
pub enum SpecError {
    /// The fixture is not valid TOML, or does not have the fixture shape.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Error loading a fixture file.
    #[error("failed to load fixture: {path}: {message}")]
    Load { path: String, message: String },

    /// The fixture's CoNLL block is not a valid parse.
    #[error("invalid fixture input: {0}")]
    Input(#[from] SlotError),
}

/// Result type for spec operations.
pub type SpecResult<T> = Result<T, SpecError>;
