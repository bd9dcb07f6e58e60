pub mod config;
pub mod engine;
pub mod error;
pub mod io;
pub mod models;
pub mod modules;

pub use config::{Computation, MetadataSpec, ModuleSpec, PipelineConfig};
pub use engine::{Engine, ExecutionContext};
pub use error::{FolioError, Result};
pub use io::{parse_documents_json, read_documents, write_documents, DocumentSummary};
pub use models::{Document, MetadataMap};
pub use modules::{Metadata, MetadataMode, Module, ValueProvider};
