use thiserror::Error;

/// Error type shared by the primary and legacy store adapters.
///
/// The vault only branches on the category; the message is for logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backing engine could not be opened or used at all.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The write was rejected because it would exceed the backend's capacity.
    #[error("storage capacity exceeded: {needed} bytes needed, {limit} bytes allowed")]
    CapacityExceeded { needed: usize, limit: usize },

    /// A write transaction aborted for a reason other than capacity.
    #[error("storage transaction failed: {0}")]
    TransactionFailed(String),

    /// A record could not be serialized for storage.
    #[error("storage serialization error: {0}")]
    Serde(String),

    /// An in-process lock guarding the store was poisoned.
    #[error("store lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

impl StoreError {
    /// True for the write-rejected-due-to-size category.
    pub fn is_capacity(&self) -> bool {
        matches!(self, StoreError::CapacityExceeded { .. })
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref failure, _)
                if failure.code == rusqlite::ErrorCode::DiskFull =>
            {
                StoreError::CapacityExceeded {
                    needed: 0,
                    limit: 0,
                }
            }
            rusqlite::Error::SqliteFailure(ref failure, _)
                if matches!(
                    failure.code,
                    rusqlite::ErrorCode::CannotOpen
                        | rusqlite::ErrorCode::NotADatabase
                        | rusqlite::ErrorCode::PermissionDenied
                        | rusqlite::ErrorCode::ReadOnly
                ) =>
            {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::TransactionFailed(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err.to_string())
    }
}

/// Error raised while parsing an import file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("file is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("file contains no recognizable archive layout")]
    UnrecognizedLayout,
}

/// Error raised while loading a [`VaultConfig`](crate::VaultConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
