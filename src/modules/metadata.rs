use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::engine::ExecutionContext;
use crate::error::{FolioError, Result};
use crate::models::{Document, MetadataMap};

use super::{Module, ValueProvider};

/// How a [`Metadata`] stage produces the metadata it attaches
#[derive(Clone)]
pub enum MetadataMode {
    /// Attach one key, valued per document by a provider
    PerValue { key: String, provider: ValueProvider },
    /// Run nested modules and copy the metadata of their results
    SubPipeline {
        modules: Vec<Arc<dyn Module>>,
        for_each_document: bool,
    },
}

impl fmt::Debug for MetadataMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataMode::PerValue { key, provider } => f
                .debug_struct("PerValue")
                .field("key", key)
                .field("provider", provider)
                .finish(),
            MetadataMode::SubPipeline {
                modules,
                for_each_document,
            } => f
                .debug_struct("SubPipeline")
                .field("modules", &modules.iter().map(|m| m.name()).collect::<Vec<_>>())
                .field("for_each_document", for_each_document)
                .finish(),
        }
    }
}

/// Attaches metadata to every document passing through it.
///
/// In per-value mode each output is the input plus `{key: provider(input)}`.
///
/// In sub-pipeline mode the nested modules are run and the metadata of every
/// resulting document is merged (in result order, last write wins) onto the
/// inputs:
/// - by default the nested modules run once, against a single fresh empty
///   document, and the same merged metadata is copied onto every input. This
///   avoids repeating expensive nested work, at the price of ignoring the
///   content of each input.
/// - with [`Metadata::for_each_document`] the nested modules run once per
///   input, with that input as their only document.
#[derive(Debug, Clone)]
pub struct Metadata {
    mode: MetadataMode,
}

impl Metadata {
    /// Per-value stage. A missing provider attaches `null`.
    pub fn new(key: impl Into<String>, provider: Option<ValueProvider>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(FolioError::InvalidArgument {
                name: "key",
                reason: "a metadata key is required".to_string(),
            });
        }

        Ok(Self {
            mode: MetadataMode::PerValue {
                key,
                provider: provider.unwrap_or_default(),
            },
        })
    }

    /// Per-value stage attaching the same value to every document
    pub fn constant(key: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        Self::new(key, Some(ValueProvider::constant(value)))
    }

    /// Per-value stage attaching a value computed from each document
    pub fn computed<F>(key: impl Into<String>, f: F) -> Result<Self>
    where
        F: Fn(&Document) -> Result<Value> + Send + Sync + 'static,
    {
        Self::new(key, Some(ValueProvider::computed(f)))
    }

    /// Sub-pipeline stage. An empty module list attaches nothing.
    pub fn from_modules(modules: Vec<Arc<dyn Module>>) -> Self {
        Self {
            mode: MetadataMode::SubPipeline {
                modules,
                for_each_document: false,
            },
        }
    }

    /// Run the nested modules once per input document instead of once overall.
    /// Has no effect on a per-value stage.
    pub fn for_each_document(self) -> Self {
        match self.mode {
            MetadataMode::SubPipeline { modules, .. } => Self {
                mode: MetadataMode::SubPipeline {
                    modules,
                    for_each_document: true,
                },
            },
            mode @ MetadataMode::PerValue { .. } => Self { mode },
        }
    }

    /// The mode fixed at construction
    pub fn mode(&self) -> &MetadataMode {
        &self.mode
    }
}

impl Module for Metadata {
    fn name(&self) -> &str {
        "Metadata"
    }

    fn execute(
        &self,
        inputs: &[Document],
        context: &dyn ExecutionContext,
    ) -> Result<Vec<Document>> {
        match &self.mode {
            MetadataMode::PerValue { key, provider } => {
                debug!("Attaching `{}` to {} documents", key, inputs.len());
                inputs
                    .iter()
                    .map(|input| -> Result<Document> {
                        let value = provider.value_for(input)?;
                        Ok(input.clone_with([(key.clone(), value)]))
                    })
                    .collect()
            }
            MetadataMode::SubPipeline {
                modules,
                for_each_document: true,
            } => {
                debug!(
                    "Running {} nested modules for each of {} documents",
                    modules.len(),
                    inputs.len()
                );
                inputs
                    .iter()
                    .map(|input| -> Result<Document> {
                        let results =
                            context.execute(modules, Some(std::slice::from_ref(input)))?;
                        Ok(input.clone_with(merge_metadata(&results)))
                    })
                    .collect()
            }
            MetadataMode::SubPipeline {
                modules,
                for_each_document: false,
            } => {
                let results = context.execute(modules, None)?;
                let metadata = merge_metadata(&results);
                debug!(
                    "Isolated run of {} nested modules produced {} keys for {} documents",
                    modules.len(),
                    metadata.len(),
                    inputs.len()
                );
                Ok(inputs
                    .iter()
                    .map(|input| input.clone_with(metadata.clone()))
                    .collect())
            }
        }
    }
}

/// Fold the metadata of all results into one map, later writes winning
fn merge_metadata(results: &[Document]) -> MetadataMap {
    let mut merged = MetadataMap::new();
    for result in results {
        for (key, value) in result.metadata() {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}
