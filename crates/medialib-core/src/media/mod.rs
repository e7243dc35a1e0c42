//! Authorization-scoped media operations.
//!
//! [`MediaLibrary`] is the media admin surface: every operation passes the
//! same two-step gate before it touches the [`FileStore`].
//!
//! 1. The coarse gate, [`Permission::ManageOwnMedia`], independent of path.
//! 2. The scoped gate, [`Permission::ManageMediaFolder`], once per target
//!    path. Listings instead apply it to each returned entry and silently
//!    drop the ones that fail.
//!
//! Authorization failures are always reported before any store mutation.
//! Batch operations run their items sequentially in input order.

pub mod error;
pub mod result;

use std::sync::Arc;

use crate::auth::{Authorizer, Permission, Principal};
use crate::error::CoreError;
use crate::fs::entry::FileEntry;
use crate::fs::path;
use crate::store::FileStore;

pub use error::{BatchKind, MediaError, MediaResult};
pub use result::{guess_mime, MediaFileResult, UploadOutcome, UploadedFile};

/// Folder argument of [`MediaLibrary::move_many`] that stands for the root.
pub const ROOT_SENTINEL: &str = "root";

const CANNOT_DELETE_ROOT: &str = "Cannot delete root media folder";
const NOT_A_DIRECTORY: &str = "Cannot delete path because it is not a directory";
const FOLDER_EXISTS: &str = "Cannot create folder because a folder already exists with the same name";
const FILE_EXISTS: &str = "Cannot create folder because a file already exists with the same name";
const MOVE_TARGET_EXISTS: &str =
    "Cannot move media because a file already exists with the same name";

/// Media admin operations over an injected store and authorizer.
#[derive(Clone)]
pub struct MediaLibrary {
    store: Arc<dyn FileStore>,
    authorizer: Arc<dyn Authorizer>,
}

impl MediaLibrary {
    pub fn new(store: Arc<dyn FileStore>, authorizer: Arc<dyn Authorizer>) -> Self {
        Self { store, authorizer }
    }

    /// Runs the coarse gate, then the scoped gate on every path in `scoped`.
    ///
    /// Stops at the first missing permission.
    pub async fn authorize(&self, principal: &Principal, scoped: &[&str]) -> MediaResult<()> {
        if !self
            .authorizer
            .authorize(principal, Permission::ManageOwnMedia, None)
            .await
        {
            tracing::warn!(user = principal.name(), "media access denied");
            return Err(MediaError::Unauthorized);
        }

        for folder in scoped {
            if !self.can_manage_folder(principal, folder).await {
                tracing::warn!(user = principal.name(), path = *folder, "folder access denied");
                return Err(MediaError::Unauthorized);
            }
        }

        Ok(())
    }

    async fn can_manage_folder(&self, principal: &Principal, folder: &str) -> bool {
        self.authorizer
            .authorize(principal, Permission::ManageMediaFolder, Some(folder))
            .await
    }

    /// Keeps the entries `principal` may manage, preserving store order.
    async fn filter_visible(&self, principal: &Principal, entries: Vec<FileEntry>) -> Vec<FileEntry> {
        let mut visible = Vec::with_capacity(entries.len());
        for entry in entries {
            if self.can_manage_folder(principal, entry.path()).await {
                visible.push(entry);
            }
        }
        visible
    }

    /// Checks that `principal` may open the media library at all.
    pub async fn index(&self, principal: &Principal) -> MediaResult<()> {
        self.authorize(principal, &[]).await
    }

    /// Lists the subfolders of `folder` that `principal` may manage.
    ///
    /// An empty `folder` is the root.
    ///
    /// # Errors
    ///
    /// - [`MediaError::Unauthorized`] without the coarse permission.
    /// - [`MediaError::NotFound`] if `folder` is not an existing directory.
    pub async fn list_folders(
        &self,
        principal: &Principal,
        folder: &str,
    ) -> MediaResult<Vec<FileEntry>> {
        self.authorize(principal, &[]).await?;

        let folder = path::normalize(folder);
        if self.store.get_directory_info(&folder).await?.is_none() {
            return Err(MediaError::NotFound);
        }

        let folders: Vec<FileEntry> = self
            .store
            .get_directory_content(&folder)
            .await?
            .into_iter()
            .filter(FileEntry::is_dir)
            .collect();

        Ok(self.filter_visible(principal, folders).await)
    }

    /// Lists the files directly inside `folder`.
    ///
    /// Unlike [`Self::list_folders`], the folder itself must pass the scoped
    /// gate; the returned files are filtered per entry as well.
    pub async fn list_files(
        &self,
        principal: &Principal,
        folder: &str,
    ) -> MediaResult<Vec<MediaFileResult>> {
        let folder = path::normalize(folder);
        self.authorize(principal, &[&folder]).await?;

        if self.store.get_directory_info(&folder).await?.is_none() {
            return Err(MediaError::NotFound);
        }

        let files: Vec<FileEntry> = self
            .store
            .get_directory_content(&folder)
            .await?
            .into_iter()
            .filter(|e| !e.is_dir())
            .collect();

        Ok(self
            .filter_visible(principal, files)
            .await
            .iter()
            .map(|e| self.file_result(e))
            .collect())
    }

    /// Resolves one known file.
    ///
    /// Only the coarse gate applies here, so editors without folder rights
    /// can still resolve references they already hold.
    pub async fn get_file(&self, principal: &Principal, file: &str) -> MediaResult<MediaFileResult> {
        self.authorize(principal, &[]).await?;

        let file = path::normalize(file);
        if file.is_empty() {
            return Err(MediaError::NotFound);
        }

        match self.store.get_file_info(&file).await? {
            Some(entry) => Ok(self.file_result(&entry)),
            None => Err(MediaError::NotFound),
        }
    }

    /// Stores each of `files` inside `folder`.
    ///
    /// The destination folder must pass the scoped gate. After that, every
    /// file is handled independently: a store fault is logged and reported
    /// as [`UploadOutcome::Failed`] while the remaining files continue.
    pub async fn upload(
        &self,
        principal: &Principal,
        folder: &str,
        files: Vec<UploadedFile>,
    ) -> MediaResult<Vec<UploadOutcome>> {
        let folder = path::normalize(folder);
        self.authorize(principal, &[&folder]).await?;

        let mut outcomes = Vec::with_capacity(files.len());
        for file in files {
            match self.upload_one(&folder, &file).await {
                Ok(result) => outcomes.push(UploadOutcome::Uploaded(result)),
                Err(e) => {
                    tracing::error!(name = %file.name, folder = %folder, "upload failed: {e}");
                    outcomes.push(UploadOutcome::Failed {
                        name: file.name.clone(),
                        size: file.size(),
                        folder: folder.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(outcomes)
    }

    async fn upload_one(&self, folder: &str, file: &UploadedFile) -> MediaResult<MediaFileResult> {
        if !path::is_valid_name(&file.name) {
            return Err(CoreError::InvalidName(file.name.clone()).into());
        }

        let target = self.store.combine(folder, &file.name);
        let mut content = file.content.as_slice();
        self.store.create_file_from_stream(&target, &mut content).await?;

        match self.store.get_file_info(&target).await? {
            Some(entry) => {
                tracing::debug!(path = %target, size = entry.length(), "file uploaded");
                Ok(self.file_result(&entry))
            }
            None => Err(MediaError::Store(CoreError::NotFound(target))),
        }
    }

    /// Creates the folder `name` inside `parent` and returns its entry.
    ///
    /// # Errors
    ///
    /// - [`MediaError::BadRequest`] if `name` is not a single path segment.
    /// - [`MediaError::Forbidden`] if a folder or a file already occupies the
    ///   path; the folder collision is reported first.
    pub async fn create_folder(
        &self,
        principal: &Principal,
        parent: &str,
        name: &str,
    ) -> MediaResult<FileEntry> {
        let new_folder = self.store.combine(&path::normalize(parent), name);
        self.authorize(principal, &[&new_folder]).await?;

        if !path::is_valid_name(name) {
            return Err(MediaError::BadRequest(format!("invalid folder name: {name}")));
        }
        if self.store.get_directory_info(&new_folder).await?.is_some() {
            return Err(MediaError::Forbidden(FOLDER_EXISTS.to_string()));
        }
        if self.store.get_file_info(&new_folder).await?.is_some() {
            return Err(MediaError::Forbidden(FILE_EXISTS.to_string()));
        }

        self.store.try_create_directory(&new_folder).await?;
        tracing::debug!(path = %new_folder, "folder created");

        self.store
            .get_directory_info(&new_folder)
            .await?
            .ok_or(MediaError::NotFound)
    }

    /// Deletes `folder` and everything in it. The root can never be deleted.
    pub async fn delete_folder(&self, principal: &Principal, folder: &str) -> MediaResult<()> {
        let folder = path::normalize(folder);
        if folder.is_empty() {
            return Err(MediaError::Forbidden(CANNOT_DELETE_ROOT.to_string()));
        }
        self.authorize(principal, &[&folder]).await?;

        if self.store.get_file_info(&folder).await?.is_some() {
            return Err(MediaError::Forbidden(NOT_A_DIRECTORY.to_string()));
        }

        match self.store.try_delete_directory(&folder).await {
            Ok(true) => {
                tracing::debug!(path = %folder, "folder deleted");
                Ok(())
            }
            Ok(false) => Err(MediaError::NotFound),
            Err(e) => {
                tracing::debug!(path = %folder, "folder delete refused: {e}");
                Err(MediaError::NotFound)
            }
        }
    }

    /// Deletes one file.
    pub async fn delete_file(&self, principal: &Principal, file: &str) -> MediaResult<()> {
        let file = path::normalize(file);
        self.authorize(principal, &[&file]).await?;

        if file.is_empty() {
            return Err(MediaError::NotFound);
        }

        if self.try_delete_file(&file).await {
            Ok(())
        } else {
            Err(MediaError::NotFound)
        }
    }

    async fn try_delete_file(&self, file: &str) -> bool {
        match self.store.try_delete_file(file).await {
            Ok(deleted) => {
                if deleted {
                    tracing::debug!(path = %file, "file deleted");
                }
                deleted
            }
            Err(e) => {
                tracing::debug!(path = %file, "file delete refused: {e}");
                false
            }
        }
    }

    /// Moves one file. Never overwrites an existing entry at `new_path`.
    pub async fn move_file(
        &self,
        principal: &Principal,
        old_path: &str,
        new_path: &str,
    ) -> MediaResult<()> {
        let old_path = path::normalize(old_path);
        let new_path = path::normalize(new_path);
        self.authorize(principal, &[&old_path, &new_path]).await?;

        if old_path.is_empty() || new_path.is_empty() {
            return Err(MediaError::NotFound);
        }
        if self.store.get_file_info(&old_path).await?.is_none() {
            return Err(MediaError::NotFound);
        }
        if self.store.get_file_info(&new_path).await?.is_some()
            || self.store.get_directory_info(&new_path).await?.is_some()
        {
            return Err(MediaError::Forbidden(MOVE_TARGET_EXISTS.to_string()));
        }

        self.store.move_file(&old_path, &new_path).await.map_err(|e| {
            tracing::debug!(from = %old_path, to = %new_path, "move refused: {e}");
            MediaError::NotFound
        })?;
        tracing::debug!(from = %old_path, to = %new_path, "file moved");
        Ok(())
    }

    /// Deletes every file in `files`.
    ///
    /// Every path must pass the scoped gate before anything is deleted.
    /// Deletion failures are collected and reported together as
    /// [`MediaError::BatchPartialFailure`]; the other files are still deleted.
    pub async fn delete_many(
        &self,
        principal: &Principal,
        files: Option<&[String]>,
    ) -> MediaResult<()> {
        let files: Option<Vec<String>> =
            files.map(|files| files.iter().map(|f| path::normalize(f)).collect());
        let scoped: Vec<&str> = files.iter().flatten().map(String::as_str).collect();
        self.authorize(principal, &scoped).await?;

        let Some(files) = files else {
            return Err(MediaError::NotFound);
        };

        let mut failed = Vec::new();
        for file in &files {
            if file.is_empty() || !self.try_delete_file(file).await {
                failed.push(file.clone());
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(MediaError::BatchPartialFailure {
                kind: BatchKind::Delete,
                failed,
            })
        }
    }

    /// Moves each file named in `names` from `source` to `target`.
    ///
    /// Either folder may be given as [`ROOT_SENTINEL`]. Each name must be a
    /// single path segment, so every move stays directly inside the two
    /// authorized folders. Invalid names and store failures are collected
    /// per name and reported together as [`MediaError::BatchPartialFailure`];
    /// the other files are still moved.
    pub async fn move_many(
        &self,
        principal: &Principal,
        names: Option<&[String]>,
        source: &str,
        target: &str,
    ) -> MediaResult<()> {
        let source_folder = normalize_folder_arg(source);
        let target_folder = normalize_folder_arg(target);
        self.authorize(principal, &[&source_folder, &target_folder])
            .await?;

        let names = names.unwrap_or_default();
        if names.is_empty() || source.is_empty() || target.is_empty() {
            return Err(MediaError::NotFound);
        }

        let mut failed = Vec::new();
        for name in names {
            if !path::is_valid_name(name) {
                tracing::warn!(user = principal.name(), name = %name, "move refused: invalid name");
                failed.push(if source_folder.is_empty() {
                    name.clone()
                } else {
                    format!("{source_folder}/{name}")
                });
                continue;
            }

            let source_path = self.store.combine(&source_folder, name);
            let target_path = self.store.combine(&target_folder, name);
            match self.store.move_file(&source_path, &target_path).await {
                Ok(()) => {
                    tracing::debug!(from = %source_path, to = %target_path, "file moved");
                }
                Err(e) => {
                    tracing::debug!(from = %source_path, to = %target_path, "move refused: {e}");
                    failed.push(source_path);
                }
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(MediaError::BatchPartialFailure {
                kind: BatchKind::Move,
                failed,
            })
        }
    }

    /// Maps a store entry to its public presentation record.
    pub fn file_result(&self, entry: &FileEntry) -> MediaFileResult {
        MediaFileResult {
            name: entry.name().to_string(),
            size: entry.length(),
            folder: entry.directory_path().to_string(),
            url: self.store.map_path_to_public_url(entry.path()),
            media_path: entry.path().to_string(),
            mime: guess_mime(entry.name()),
        }
    }
}

fn normalize_folder_arg(folder: &str) -> String {
    if folder == ROOT_SENTINEL {
        String::new()
    } else {
        path::normalize(folder)
    }
}
