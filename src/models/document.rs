use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata attached to a document, iterated in key order
pub type MetadataMap = BTreeMap<String, Value>;

/// An immutable unit of content plus metadata flowing through a pipeline.
///
/// Documents are never modified in place. Modules derive new documents with
/// [`Document::clone_with`], which keeps the identity and content of the
/// source and overlays additional metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier (UUID), preserved across clones
    #[serde(default = "new_document_id")]
    id: String,
    /// Primary content, opaque to metadata modules
    #[serde(default)]
    content: String,
    /// Key/value annotations
    #[serde(default)]
    metadata: MetadataMap,
}

fn new_document_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl Document {
    /// Create a document with the given content and no metadata
    pub fn new(content: impl Into<String>) -> Self {
        Self::with_metadata(content, MetadataMap::new())
    }

    /// Create a fresh document with no content and no metadata
    pub fn empty() -> Self {
        Self::new(String::new())
    }

    /// Create a document with content and initial metadata
    pub fn with_metadata(content: impl Into<String>, metadata: MetadataMap) -> Self {
        Self {
            id: new_document_id(),
            content: content.into(),
            metadata,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn metadata(&self) -> &MetadataMap {
        &self.metadata
    }

    /// Look up a single metadata value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Return a new document whose metadata is this document's metadata
    /// overlaid by `additions`. Later entries win on key collisions.
    pub fn clone_with<I>(&self, additions: I) -> Document
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut metadata = self.metadata.clone();
        metadata.extend(additions);
        Document {
            id: self.id.clone(),
            content: self.content.clone(),
            metadata,
        }
    }
}
