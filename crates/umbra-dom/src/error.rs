//! Error types for the in-memory document.

use std::path::PathBuf;

use thiserror::Error;
use umbra_engine::HostError;

/// Errors from [`MemoryDocument`](crate::MemoryDocument) tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("no node {0}")]
    UnknownNode(String),

    #[error("node {0} is not an element")]
    NotAnElement(String),

    #[error("cannot append {child} to {parent}: {reason}")]
    Append {
        parent: String,
        child: String,
        reason: String,
    },
}

impl From<DomError> for HostError {
    fn from(err: DomError) -> Self {
        match err {
            DomError::UnknownNode(id) | DomError::NotAnElement(id) => HostError::UnknownElement(id),
            other => HostError::Other(other.to_string()),
        }
    }
}

/// Errors loading a page fixture.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML fixture: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON fixture: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported fixture format: {0}")]
    UnknownFormat(PathBuf),

    #[error(transparent)]
    Dom(#[from] DomError),
}
