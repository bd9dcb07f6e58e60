use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::models::Document;
use crate::modules::Module;

/// Runs nested module sequences on behalf of a module
pub trait ExecutionContext {
    /// Run `modules` in order and return the documents produced by the last one.
    ///
    /// With `inputs` of `None` or an empty slice the run starts from a single
    /// fresh empty document (an isolated run).
    fn execute(
        &self,
        modules: &[Arc<dyn Module>],
        inputs: Option<&[Document]>,
    ) -> Result<Vec<Document>>;
}

/// Sequential pipeline engine.
///
/// Each module receives the previous module's output, and the engine itself
/// is passed as the context so nested modules recurse through it. The first
/// failing module aborts the run.
#[derive(Debug, Default, Clone)]
pub struct Engine;

impl Engine {
    pub fn new() -> Self {
        Self
    }

    /// Run a top-level pipeline over `documents`.
    ///
    /// An empty `documents` list starts from one fresh empty document, the
    /// same as an isolated run.
    pub fn run(
        &self,
        modules: &[Arc<dyn Module>],
        documents: Vec<Document>,
    ) -> Result<Vec<Document>> {
        self.execute(modules, Some(&documents))
    }
}

impl ExecutionContext for Engine {
    fn execute(
        &self,
        modules: &[Arc<dyn Module>],
        inputs: Option<&[Document]>,
    ) -> Result<Vec<Document>> {
        let mut documents = match inputs {
            Some(docs) if !docs.is_empty() => docs.to_vec(),
            _ => vec![Document::empty()],
        };

        for (index, module) in modules.iter().enumerate() {
            debug!(
                "Executing module {} ({}) with {} documents",
                index,
                module.name(),
                documents.len()
            );
            documents = module.execute(&documents, self)?;
        }

        Ok(documents)
    }
}
