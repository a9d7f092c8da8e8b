//! Error types for the engine crate.

use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by a host document.
///
/// The engine never lets one of these abort a rewriting pass: per-element
/// failures are logged and counted. They only surface to callers when they
/// prevent a lifecycle transition (the marker class or the insertion watcher
/// could not be installed).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The handle does not name a node the host knows about.
    #[error("unknown element: {0}")]
    UnknownElement(String),

    /// The stylesheet handle is not one the host created.
    #[error("unknown stylesheet: {0}")]
    UnknownStylesheet(String),

    /// The watcher handle is not one the host created, or it was disconnected.
    #[error("unknown watcher: {0}")]
    UnknownWatcher(String),

    /// The host does not provide adopted stylesheets.
    #[error("adopted stylesheets are not supported by this document")]
    StylesheetsUnsupported,

    /// Anything else the host wants to report.
    #[error("{0}")]
    Other(String),
}

/// Errors loading or validating an [`EngineConfig`](crate::EngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// The file extension is not `.yaml`, `.yml` or `.json`.
    #[error("unsupported config format: {0}")]
    UnknownFormat(PathBuf),

    /// A value is outside its allowed range.
    #[error("config field `{field}` is out of range: {reason}")]
    OutOfRange { field: &'static str, reason: String },

    /// A name that ends up in markup or CSS is empty.
    #[error("config field `{0}` must not be empty")]
    EmptyName(&'static str),
}

/// Errors from a bootstrap cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to access cache file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache file {path} is not a JSON object: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors returned by the lifecycle controller.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The document has no body to carry the activation class or the watcher.
    #[error("document has no body element")]
    NoBody,

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Result type for host document operations.
pub type HostResult<T> = std::result::Result<T, HostError>;
