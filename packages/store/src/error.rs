//! Errors raised by document store operations.

use thiserror::Error;

/// Any create/update/delete/subscribe failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("permission denied")]
    PermissionDenied,

    #[error("document {0} not found")]
    NotFound(String),

    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("unknown collection: {0}")]
    UnknownCollection(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Malformed(e.to_string())
    }
}
