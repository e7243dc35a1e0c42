//! File store backed by a directory on the local file system.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::FileEntry;
use crate::fs::path;
use crate::store::{public_url, ByteStream, FileStore};

/// Maps store paths onto files under a root directory.
///
/// Store paths are normalized before they are joined to the root, so no
/// request can address anything outside it. Symbolic links are reported
/// by their own metadata and never followed when deleting.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
    public_base: String,
}

impl LocalFileStore {
    /// Creates a store rooted at `root`, serving files under `public_base`.
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
        }
    }

    fn physical(&self, store_path: &str) -> PathBuf {
        let normalized = path::normalize(store_path);
        let mut physical = self.root.clone();
        for segment in normalized.split('/').filter(|s| !s.is_empty()) {
            physical.push(segment);
        }
        physical
    }

    async fn metadata(&self, store_path: &str) -> CoreResult<Option<std::fs::Metadata>> {
        match tokio::fs::symlink_metadata(self.physical(store_path)).await {
            Ok(meta) => Ok(Some(meta)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::Io(e)),
        }
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn get_directory_info(&self, path: &str) -> CoreResult<Option<FileEntry>> {
        let path = path::normalize(path);
        Ok(self
            .metadata(&path)
            .await?
            .filter(|m| m.is_dir())
            .map(|m| FileEntry::new(&path, &m)))
    }

    async fn get_file_info(&self, path: &str) -> CoreResult<Option<FileEntry>> {
        let path = path::normalize(path);
        Ok(self
            .metadata(&path)
            .await?
            .filter(|m| !m.is_dir())
            .map(|m| FileEntry::new(&path, &m)))
    }

    async fn get_directory_content(&self, path: &str) -> CoreResult<Vec<FileEntry>> {
        let path = path::normalize(path);
        let mut read_dir = match tokio::fs::read_dir(self.physical(&path)).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(CoreError::NotFound(path)),
            Err(e) => return Err(CoreError::Io(e)),
        };

        let mut entries = Vec::new();
        while let Some(dir_entry) = read_dir.next_entry().await? {
            let metadata = match dir_entry.metadata().await {
                Ok(m) => m,
                Err(_) => continue,
            };
            let name = dir_entry.file_name().to_string_lossy().into_owned();
            entries.push(FileEntry::new(&path::combine(&path, &name), &metadata));
        }

        Ok(entries)
    }

    async fn try_create_directory(&self, path: &str) -> CoreResult<bool> {
        let path = path::normalize(path);
        match self.metadata(&path).await? {
            Some(m) if m.is_dir() => Ok(false),
            Some(_) => Err(CoreError::AlreadyExists(path)),
            None => {
                tokio::fs::create_dir_all(self.physical(&path)).await?;
                Ok(true)
            }
        }
    }

    async fn try_delete_directory(&self, path: &str) -> CoreResult<bool> {
        let path = path::normalize(path);
        match self.metadata(&path).await? {
            None => Ok(false),
            Some(m) if m.is_dir() => {
                tokio::fs::remove_dir_all(self.physical(&path)).await?;
                Ok(true)
            }
            Some(_) => Err(CoreError::NotADirectory(path)),
        }
    }

    async fn try_delete_file(&self, path: &str) -> CoreResult<bool> {
        let path = path::normalize(path);
        match self.metadata(&path).await? {
            None => Ok(false),
            Some(m) if m.is_dir() => Err(CoreError::IsADirectory(path)),
            Some(_) => {
                // Removes symlinks themselves, not their targets
                tokio::fs::remove_file(self.physical(&path)).await?;
                Ok(true)
            }
        }
    }

    async fn move_file(&self, old_path: &str, new_path: &str) -> CoreResult<()> {
        let old_path = path::normalize(old_path);
        let new_path = path::normalize(new_path);

        match self.metadata(&old_path).await? {
            Some(m) if !m.is_dir() => {}
            _ => return Err(CoreError::NotFound(old_path)),
        }
        if self.metadata(&new_path).await?.is_some() {
            return Err(CoreError::AlreadyExists(new_path));
        }
        let parent = path::parent(&new_path);
        if !self.metadata(parent).await?.is_some_and(|m| m.is_dir()) {
            return Err(CoreError::NotFound(parent.to_string()));
        }

        tokio::fs::rename(self.physical(&old_path), self.physical(&new_path)).await?;
        Ok(())
    }

    async fn create_file_from_stream(&self, path: &str, stream: ByteStream<'_>) -> CoreResult<()> {
        let path = path::normalize(path);
        if path.is_empty() {
            return Err(CoreError::InvalidPath(path));
        }

        let physical = self.physical(&path);
        if let Some(parent) = physical.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&physical)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => CoreError::AlreadyExists(path.clone()),
                _ => CoreError::Io(e),
            })?;

        if let Err(e) = tokio::io::copy(stream, &mut file).await {
            drop(file);
            let _ = tokio::fs::remove_file(&physical).await;
            return Err(CoreError::Io(e));
        }
        file.flush().await?;

        Ok(())
    }

    fn map_path_to_public_url(&self, path: &str) -> String {
        public_url(&self.public_base, path)
    }
}
