//! Error types shared by the store, the controller and the browser glue.
//!
//! None of these reach the user as a fault: the controller turns
//! [`ScanError`] into a transcript entry and the store logs [`StorageError`].

use thiserror::Error;

/// Failure of one prediction request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// The service answered with a non-2xx status.
    #[error("Request failed with status code {status}")]
    Http { status: u16 },

    /// The request never produced a response (DNS, CORS, connection reset...).
    #[error("{0}")]
    Network(String),

    /// A browser API needed to build or read the request failed.
    #[error("Browser error: {0}")]
    Browser(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage backend is not available")]
    Unavailable,

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("failed to serialize sessions: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown scan model '{0}'")]
pub struct UnknownModel(pub String);
