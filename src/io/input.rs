use std::path::Path;

use anyhow::{Context, Result};

use crate::models::Document;

/// Read a JSON array of documents from a file
pub fn read_documents(path: &Path) -> Result<Vec<Document>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    parse_documents_json(&content)
}

/// Parse a JSON array of documents
///
/// Each entry may carry `id`, `content` and `metadata`; missing fields get a
/// fresh id, empty content and no metadata.
pub fn parse_documents_json(json: &str) -> Result<Vec<Document>> {
    serde_json::from_str(json).context("Failed to parse documents JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_documents_json() {
        let json = r#"[
            {"id": "intro", "content": "Hello world", "metadata": {"lang": "en"}},
            {"content": "Second"},
            {}
        ]"#;

        let documents = parse_documents_json(json).unwrap();

        assert_eq!(documents.len(), 3);
        assert_eq!(documents[0].id(), "intro");
        assert_eq!(documents[0].get("lang"), Some(&json!("en")));
        assert_eq!(documents[1].content(), "Second");
        assert!(documents[2].content().is_empty());
        assert_ne!(documents[1].id(), documents[2].id());
    }

    #[test]
    fn test_rejects_non_array() {
        assert!(parse_documents_json(r#"{"content": "x"}"#).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_documents(&dir.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
