use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::models::Document;

type ComputeFn = dyn Fn(&Document) -> Result<Value> + Send + Sync;

/// Produces the value a per-value metadata stage attaches to each document
#[derive(Clone)]
pub enum ValueProvider {
    /// The same value for every document
    Constant(Value),
    /// A value derived from the document being annotated
    Computed(Arc<ComputeFn>),
}

impl ValueProvider {
    pub fn constant(value: impl Into<Value>) -> Self {
        ValueProvider::Constant(value.into())
    }

    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Document) -> Result<Value> + Send + Sync + 'static,
    {
        ValueProvider::Computed(Arc::new(f))
    }

    /// Evaluate the provider for one document
    pub fn value_for(&self, document: &Document) -> Result<Value> {
        match self {
            ValueProvider::Constant(value) => Ok(value.clone()),
            ValueProvider::Computed(f) => f(document),
        }
    }
}

impl Default for ValueProvider {
    fn default() -> Self {
        ValueProvider::Constant(Value::Null)
    }
}

impl fmt::Debug for ValueProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueProvider::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            ValueProvider::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}
