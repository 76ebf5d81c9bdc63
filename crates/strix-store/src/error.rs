//! Run Store errors.

use strix_core::ids::FindingId;

/// Failures raised by run-store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying filesystem operation failed.
    #[error("run store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An artifact could not be (de)serialized.
    #[error("run store serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// [`finalize_finding`](crate::RunStore::finalize_finding) was called on
    /// a finding that is still `pending` — it has no `verified`/`rejected`
    /// destination to move to.
    #[error("finding {0} has not been adjudicated yet")]
    NotAdjudicated(FindingId),
}

/// Result alias for fallible run-store operations.
pub type StoreResult<T> = Result<T, StoreError>;
