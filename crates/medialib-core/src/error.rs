//! Error types for `medialib-core`.
//!
//! File store operations return [`CoreResult<T>`], an alias for
//! `Result<T, CoreError>`. Media operations wrap these in
//! [`crate::media::MediaError`].

/// Unified error type for file store operations.
///
/// Paths are store paths (slash-separated, root = `""`), not physical paths.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The target path does not exist.
    #[error("path not found: {0}")]
    NotFound(String),

    /// An entry already exists at the target path.
    #[error("an entry already exists at: {0}")]
    AlreadyExists(String),

    /// A directory was expected but the path points to a file.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// A file was expected but the path points to a directory.
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// A file or directory name is invalid (empty, contains path separators, etc.).
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// The path cannot be mapped into the store.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout `medialib-core`.
pub type CoreResult<T> = Result<T, CoreError>;
