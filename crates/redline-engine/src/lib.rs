//! Suggestion-tracking engine for block-structured rich text.
//!
//! Edits arrive as batches of position-addressed steps. When tracking is on,
//! the engine rewrites each batch so deletions stay visible under a
//! `pending-delete` mark and insertions are tagged `pending-insert`; a
//! resolver later accepts or rejects the pending spans. Hosts drive
//! everything through [`SuggestionEngine`].

pub mod doc;
pub mod engine;
pub mod error;
pub mod suggest;
pub mod transform;

pub use doc::{Block, BlockKind, Doc, Mark, MarkId, MarkKind, Slice, SuggestionAttrs, TextRun};
pub use engine::{Applied, NoHooks, SuggestionEngine, ViewHooks};
pub use error::TransformError;
pub use suggest::{
    Batch, Resolution, Rewrite, Session, SuggestionSpan, find_suggestion_spans, intercept_batch,
    resolve_all, resolve_range,
};
pub use transform::{Assoc, Mapping, Step, StepMap, Transform};
