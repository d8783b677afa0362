#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]
//! Core data model for grammatical slot decomposition.
//!
//! A [`ParsedSentence`] holds dependency-annotated [`Token`]s produced by an
//! external [`DependencyParser`]. The [`SpanResolver`] turns subtrees into
//! token ranges, and a [`SlotAssignment`] maps the ten [`SlotKey`]s to
//! their fillers. The decomposition algorithm itself lives in
//! `layered-clauses`.

mod context;
mod display;
mod errors;
mod sentence;
mod slot;
mod span;
mod token;

pub use context::ClauseContext;
pub use display::SlotLineDisplay;
pub use errors::{SlotError, SlotResult};
pub use sentence::{ConllReader, DependencyParser, ParsedSentence};
pub use slot::{FilledSlot, FlatSlot, SlotAssignment, SlotKey};
pub use span::{Span, SpanRef, SpanResolver};
pub use token::{Pos, Relation, Token};
