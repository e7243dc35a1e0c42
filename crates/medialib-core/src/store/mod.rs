//! Hierarchical file store abstraction.
//!
//! [`FileStore`] is the only way the media layer touches stored bytes.
//! Two backends ship with the crate: [`local::LocalFileStore`] maps store
//! paths onto a directory on disk, [`memory::MemoryFileStore`] keeps the
//! tree in memory.

pub mod local;
pub mod memory;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::error::CoreResult;
use crate::fs::entry::FileEntry;
use crate::fs::path;

pub use local::LocalFileStore;
pub use memory::MemoryFileStore;

/// Byte source handed to [`FileStore::create_file_from_stream`].
pub type ByteStream<'a> = &'a mut (dyn AsyncRead + Send + Unpin);

/// Hierarchical storage with directory semantics.
///
/// All paths are store paths (see [`crate::fs::path`]). A path holds at
/// most one entry, either a file or a directory.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Returns the directory at `path`, or `None` if no directory exists there.
    async fn get_directory_info(&self, path: &str) -> CoreResult<Option<FileEntry>>;

    /// Returns the file at `path`, or `None` if no file exists there.
    async fn get_file_info(&self, path: &str) -> CoreResult<Option<FileEntry>>;

    /// Lists the direct children (files and directories) of `path`.
    async fn get_directory_content(&self, path: &str) -> CoreResult<Vec<FileEntry>>;

    /// Creates the directory at `path` and any missing parents.
    ///
    /// Returns `false` if the directory already exists.
    ///
    /// # Errors
    ///
    /// - [`crate::CoreError::AlreadyExists`] if a file occupies the path.
    async fn try_create_directory(&self, path: &str) -> CoreResult<bool>;

    /// Deletes the directory at `path` with all of its content.
    ///
    /// Returns `false` if no directory exists there.
    ///
    /// # Errors
    ///
    /// - [`crate::CoreError::NotADirectory`] if a file occupies the path.
    async fn try_delete_directory(&self, path: &str) -> CoreResult<bool>;

    /// Deletes the file at `path`. Returns `false` if no file exists there.
    ///
    /// # Errors
    ///
    /// - [`crate::CoreError::IsADirectory`] if a directory occupies the path.
    async fn try_delete_file(&self, path: &str) -> CoreResult<bool>;

    /// Moves the file at `old_path` to `new_path`. Never overwrites.
    ///
    /// # Errors
    ///
    /// - [`crate::CoreError::NotFound`] if the source file or the destination
    ///   directory is missing.
    /// - [`crate::CoreError::AlreadyExists`] if an entry exists at `new_path`.
    async fn move_file(&self, old_path: &str, new_path: &str) -> CoreResult<()>;

    /// Writes a new file at `path` from `stream`, creating missing parents.
    ///
    /// # Errors
    ///
    /// - [`crate::CoreError::AlreadyExists`] if an entry exists at `path`.
    /// - [`crate::CoreError::Io`] if reading the stream or writing fails.
    async fn create_file_from_stream(&self, path: &str, stream: ByteStream<'_>) -> CoreResult<()>;

    /// Joins two store paths.
    fn combine(&self, base: &str, child: &str) -> String {
        path::combine(base, child)
    }

    /// Maps a store path to the URL it is publicly served at.
    fn map_path_to_public_url(&self, path: &str) -> String;
}

/// Builds a public URL from a base and a store path, percent-encoding each
/// segment.
pub(crate) fn public_url(base: &str, store_path: &str) -> String {
    let encoded: Vec<String> = path::normalize(store_path)
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| urlencoding::encode(s).into_owned())
        .collect();
    format!("{}/{}", base.trim_end_matches('/'), encoded.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_joins_base_and_path() {
        assert_eq!(public_url("/media", "photos/a.jpg"), "/media/photos/a.jpg");
        assert_eq!(public_url("/media/", "a.jpg"), "/media/a.jpg");
    }

    #[test]
    fn public_url_encodes_segments() {
        assert_eq!(
            public_url("/media", "my photos/a b.jpg"),
            "/media/my%20photos/a%20b.jpg"
        );
    }

    #[test]
    fn public_url_absolute_base() {
        assert_eq!(
            public_url("https://cdn.example.com/media", "a.jpg"),
            "https://cdn.example.com/media/a.jpg"
        );
    }
}
