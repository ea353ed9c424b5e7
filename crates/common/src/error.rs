//! Error types for Foris

use thiserror::Error;

/// Result type alias using Foris Error
pub type Result<T> = std::result::Result<T, Error>;

/// Foris error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration path: {0}")]
    InvalidPath(String),

    #[error("Duplicate {kind} name: {name}")]
    Duplicate { kind: String, name: String },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Configuration store error: {0}")]
    Store(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("Commit callback failed: {0}")]
    Callback(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the failure originated outside this process (store or remote call)
    pub fn is_external(&self) -> bool {
        matches!(self, Error::Store(_) | Error::Remote(_) | Error::Io(_))
    }
}
