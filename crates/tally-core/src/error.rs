//! Error taxonomy for the synchronization engine.

use thiserror::Error;

use tally_domain::FieldTypeError;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Main error type for synchronization operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The remote store could not be reached. Row mutations continue in
    /// offline mode; bulk submit fails hard with this.
    #[error("remote store unreachable: {0}")]
    Connectivity(String),

    /// The remote store responded with a failure or the request broke in
    /// transit. Drives the per-operation rollback policy.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A mutation referenced a row outside the current collection. Aborts the
    /// operation without mutating; there is nothing to roll back.
    #[error("row {index} is out of bounds ({len} rows)")]
    Index { index: usize, len: usize },

    /// Durable cache mirror failure on an explicit read.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Field/value kind mismatch rejected at the store boundary.
    #[error(transparent)]
    Field(#[from] FieldTypeError),
}

/// Remote request failures.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request failed with status {status}")]
    Status { status: u16 },

    #[error("malformed payload: {0}")]
    Decode(String),

    /// The dataset has no per-row routes (snapshot datasets).
    #[error("{0} is not supported for this dataset")]
    Unsupported(&'static str),
}

/// Durable cache mirror failures.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache storage error: {0}")]
    Storage(String),

    #[error("cache serialization error: {0}")]
    Serialization(String),
}

impl From<rusqlite::Error> for CacheError {
    fn from(err: rusqlite::Error) -> Self {
        CacheError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

/// Local, synchronous edit-draft validation failure. Blocks commit of the
/// edit session until resolved or cancelled; never reaches the remote store.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("amount must be a number")]
    NotANumber,

    #[error("amount must not be negative")]
    Negative,
}

/// Configuration loading failure.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
