use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::Document;

/// Write documents as a pretty-printed JSON array
pub fn write_documents(path: &Path, documents: &[Document]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, documents).context("Failed to write JSON")?;
    Ok(())
}

/// Human-readable listing of documents and their metadata
pub struct DocumentSummary<'a> {
    documents: &'a [Document],
}

impl<'a> DocumentSummary<'a> {
    pub fn new(documents: &'a [Document]) -> Self {
        Self { documents }
    }

    /// Format one block per document: its id, content size, then `key = value` lines
    pub fn format(&self) -> String {
        let mut output = String::new();

        for document in self.documents {
            output.push_str(&format!(
                "[{}] {}, {}\n",
                document.id(),
                count(document.content().len(), "byte", "bytes"),
                count(document.metadata().len(), "metadata entry", "metadata entries")
            ));
            for (key, value) in document.metadata() {
                output.push_str(&format!("  {} = {}\n", key, value));
            }
            output.push('\n');
        }

        output
    }

    /// Write to a text file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

/// Format `n` with the singular or plural noun
fn count(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{} {}", n, singular)
    } else {
        format!("{} {}", n, plural)
    }
}
