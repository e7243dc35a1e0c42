//! Media operation errors.

use std::fmt;

use crate::error::CoreError;

/// Which batch operation produced a [`MediaError::BatchPartialFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Move,
    Delete,
}

impl fmt::Display for BatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchKind::Move => f.write_str(
                "Error when moving files. Maybe they already exist on the target folder?",
            ),
            BatchKind::Delete => {
                f.write_str("Error when deleting files. Maybe they were already removed?")
            }
        }
    }
}

/// Outcome of a rejected media operation.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// A coarse or folder-scoped permission is missing.
    #[error("unauthorized")]
    Unauthorized,

    /// The operation is not allowed on this path.
    #[error("{0}")]
    Forbidden(String),

    /// The path does not exist, or the store refused the operation.
    #[error("not found")]
    NotFound,

    /// The request itself is malformed.
    #[error("{0}")]
    BadRequest(String),

    /// Some items of a batch failed. `failed` keeps input order.
    #[error("{kind} Files on error: {}", .failed.join(", "))]
    BatchPartialFailure { kind: BatchKind, failed: Vec<String> },

    /// The store failed unexpectedly.
    #[error(transparent)]
    Store(#[from] CoreError),
}

pub type MediaResult<T> = Result<T, MediaError>;
