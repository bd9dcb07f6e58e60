use thiserror::Error;

/// Errors raised by pipeline modules and their configuration
#[derive(Debug, Error)]
pub enum FolioError {
    /// A constructor received an argument it cannot accept
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// The pipeline definition is well-formed JSON but not a valid pipeline
    #[error("invalid pipeline configuration: {0}")]
    Config(String),

    /// A module or computed value failed while executing
    #[error("module `{module}` failed: {message}")]
    Module { module: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FolioError>;
