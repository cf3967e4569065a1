use std::fmt;

use crate::error::StoreError;

/// Which backend is authoritative for writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageMode {
    Primary,
    Legacy,
}

impl StorageMode {
    /// Mode of a vault that has not been initialized yet.
    pub const UNDETERMINED_BEHAVES_AS: StorageMode = StorageMode::Primary;

    /// Resolve an optional mode the way operations see it.
    pub fn effective(mode: Option<StorageMode>) -> StorageMode {
        mode.unwrap_or(Self::UNDETERMINED_BEHAVES_AS)
    }

    /// Whether a primary-store failure of this kind allows switching to the
    /// legacy backend. Lock poisoning and serialization failures would fail
    /// the same way on either backend.
    pub fn permits_fallback(err: &StoreError) -> bool {
        matches!(
            err,
            StoreError::Unavailable(_)
                | StoreError::TransactionFailed(_)
                | StoreError::CapacityExceeded { .. }
        )
    }

    /// The mode to move to after the primary store failed with `err`, or
    /// `None` if this failure does not justify a switch.
    pub fn after_primary_failure(self, err: &StoreError) -> Option<StorageMode> {
        match self {
            StorageMode::Primary if Self::permits_fallback(err) => Some(StorageMode::Legacy),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StorageMode::Primary => "primary",
            StorageMode::Legacy => "legacy",
        }
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
