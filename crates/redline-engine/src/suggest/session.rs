use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-editor tracking configuration.
///
/// Created when the engine attaches to a host, replaced wholesale on
/// reconfiguration, and consulted once per batch. Every mark minted while a
/// session is active carries its author and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// When false, batches pass through the transformer unchanged.
    pub enabled: bool,
    pub author: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Session {
    pub fn new(author: impl Into<String>) -> Self {
        Session {
            enabled: true,
            author: author.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn disabled(author: impl Into<String>) -> Self {
        Session {
            enabled: false,
            author: author.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: BTreeMap<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }
}
