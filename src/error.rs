use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, saving or decoding a flow document.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid flow JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown node type '{0}'")]
    UnknownNodeType(String),

    #[error("Node '{id}' has invalid data: {message}")]
    InvalidNodeData { id: String, message: String },

    #[error("Invalid flow name '{0}'")]
    InvalidName(String),
}

impl FlowError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FlowError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;
