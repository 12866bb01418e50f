use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity of one suggestion span.
///
/// Minted once when the mark is created and never derived from the mark's
/// attributes. Two mark occurrences belong to the same logical suggestion
/// iff their ids are equal; attribute equality is never used as a merge key,
/// so cloning a document or round-tripping it through serialization keeps
/// adjacency detection working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarkId(Uuid);

impl MarkId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MarkId {
    fn default() -> Self {
        Self::new()
    }
}

/// The two annotation kinds tracked by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkKind {
    /// Content that was typed but not yet confirmed.
    PendingInsert,
    /// Content that was deleted but is kept in place until confirmed.
    PendingDelete,
}

/// Attribution carried by every suggestion mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionAttrs {
    pub author: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// A suggestion annotation over a span of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    pub id: MarkId,
    pub kind: MarkKind,
    pub attrs: SuggestionAttrs,
}

impl Mark {
    /// Create a new mark instance with a fresh id.
    pub fn new(
        kind: MarkKind,
        author: impl Into<String>,
        metadata: BTreeMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            id: MarkId::new(),
            kind,
            attrs: SuggestionAttrs {
                author: author.into(),
                metadata,
            },
        }
    }

    /// Identity comparison: same logical suggestion, not merely equal attrs.
    pub fn is_same(&self, other: &Mark) -> bool {
        self.id == other.id
    }
}
