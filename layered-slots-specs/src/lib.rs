#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Fixture-driven conformance tests for slot decompositions.
//!
//! Each `.toml` fixture holds a dependency parse in CoNLL form and the
//! flattened slot output it should decompose into.
//!
//! ## Modules
//!
//! - [`fixture`] - Fixture types and match modes
//! - [`loader`] - Fixture file loading
//! - [`runner`] - Runs fixtures and compares flattened output
//! - [`errors`] - Error types for the spec system
//! - [`failures`] - Expected failures tracking via TOML

pub mod errors;
pub mod failures;
pub mod fixture;
pub mod loader;
pub mod runner;

pub use errors::{SpecError, SpecResult};
pub use failures::{ExpectedFailures, FailureEntry, FailureState, HarnessResult};
pub use fixture::{MatchMode, SlotFixture};
pub use loader::{load_all_fixtures, load_fixture, parse_fixture};
pub use runner::{
    diagnostic_label, format_failure, format_summary, run_fixture, run_harness, FixtureRun,
    SlotMismatch,
};

#[cfg(test)]
mod tests;
