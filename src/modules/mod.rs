pub mod metadata;
pub mod value;

pub use metadata::*;
pub use value::*;

use crate::engine::ExecutionContext;
use crate::error::Result;
use crate::models::Document;

/// A pipeline step transforming one document sequence into another
pub trait Module: Send + Sync {
    /// Human-readable name of this module (for logging)
    fn name(&self) -> &str;

    /// Process the input documents and produce the output documents.
    ///
    /// `context` runs nested module sequences on behalf of this module.
    fn execute(
        &self,
        inputs: &[Document],
        context: &dyn ExecutionContext,
    ) -> Result<Vec<Document>>;
}
