use catmirror_source::SourceError;
use catmirror_storage::StorageError;
use thiserror::Error;

/// Failures that prevent a sync job from starting.
///
/// Errors inside a running stage never surface as `SyncError`; they are
/// folded into the stage's [`crate::SyncReport`].
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("source client: {0}")]
    Source(#[from] SourceError),

    #[error("storage client: {0}")]
    Storage(#[from] StorageError),
}

impl SyncError {
    /// True when the job could not start because configuration is missing or
    /// invalid, before anything was sent.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        match self {
            SyncError::Source(e) => e.is_configuration(),
            SyncError::Storage(StorageError::InvalidKey) => true,
            SyncError::Storage(_) => false,
        }
    }
}
