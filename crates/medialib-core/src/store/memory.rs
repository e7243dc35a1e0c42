//! In-memory file store.

use std::collections::BTreeMap;
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::sync::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::FileEntry;
use crate::fs::path;
use crate::store::{public_url, ByteStream, FileStore};

#[derive(Debug, Clone)]
enum Node {
    Directory { modified: SystemTime },
    File { data: Vec<u8>, modified: SystemTime },
}

impl Node {
    fn to_entry(&self, store_path: &str) -> FileEntry {
        match self {
            Node::Directory { modified } => FileEntry::directory(store_path, Some(*modified)),
            Node::File { data, modified } => {
                FileEntry::file(store_path, data.len() as u64, Some(*modified))
            }
        }
    }
}

/// A file store that keeps every entry in memory.
///
/// Entries are keyed by normalized store path. The root directory always
/// exists. Content is lost when the store is dropped.
#[derive(Debug)]
pub struct MemoryFileStore {
    nodes: RwLock<BTreeMap<String, Node>>,
    public_base: String,
}

impl MemoryFileStore {
    /// Creates an empty store serving files under `public_base`.
    pub fn new(public_base: impl Into<String>) -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            String::new(),
            Node::Directory {
                modified: SystemTime::now(),
            },
        );
        Self {
            nodes: RwLock::new(nodes),
            public_base: public_base.into(),
        }
    }

    /// Returns a copy of the file content at `path`, if a file exists there.
    pub async fn read(&self, path: &str) -> Option<Vec<u8>> {
        match self.nodes.read().await.get(&path::normalize(path)) {
            Some(Node::File { data, .. }) => Some(data.clone()),
            _ => None,
        }
    }

    fn insert_parents(nodes: &mut BTreeMap<String, Node>, store_path: &str) -> CoreResult<()> {
        let mut current = String::new();
        for segment in path::parent(store_path).split('/').filter(|s| !s.is_empty()) {
            current = path::combine(&current, segment);
            match nodes.get(&current) {
                Some(Node::Directory { .. }) => {}
                Some(Node::File { .. }) => return Err(CoreError::NotADirectory(current)),
                None => {
                    nodes.insert(
                        current.clone(),
                        Node::Directory {
                            modified: SystemTime::now(),
                        },
                    );
                }
            }
        }
        Ok(())
    }
}

impl Default for MemoryFileStore {
    fn default() -> Self {
        Self::new("/media")
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn get_directory_info(&self, path: &str) -> CoreResult<Option<FileEntry>> {
        let path = path::normalize(path);
        Ok(match self.nodes.read().await.get(&path) {
            Some(node @ Node::Directory { .. }) => Some(node.to_entry(&path)),
            _ => None,
        })
    }

    async fn get_file_info(&self, path: &str) -> CoreResult<Option<FileEntry>> {
        let path = path::normalize(path);
        Ok(match self.nodes.read().await.get(&path) {
            Some(node @ Node::File { .. }) => Some(node.to_entry(&path)),
            _ => None,
        })
    }

    async fn get_directory_content(&self, path: &str) -> CoreResult<Vec<FileEntry>> {
        let path = path::normalize(path);
        let nodes = self.nodes.read().await;
        if !matches!(nodes.get(&path), Some(Node::Directory { .. })) {
            return Err(CoreError::NotFound(path));
        }

        Ok(nodes
            .iter()
            .filter(|(key, _)| !key.is_empty() && path::parent(key) == path)
            .map(|(key, node)| node.to_entry(key))
            .collect())
    }

    async fn try_create_directory(&self, path: &str) -> CoreResult<bool> {
        let path = path::normalize(path);
        let mut nodes = self.nodes.write().await;
        match nodes.get(&path) {
            Some(Node::Directory { .. }) => Ok(false),
            Some(Node::File { .. }) => Err(CoreError::AlreadyExists(path)),
            None => {
                Self::insert_parents(&mut nodes, &path)?;
                nodes.insert(
                    path,
                    Node::Directory {
                        modified: SystemTime::now(),
                    },
                );
                Ok(true)
            }
        }
    }

    async fn try_delete_directory(&self, path: &str) -> CoreResult<bool> {
        let path = path::normalize(path);
        let mut nodes = self.nodes.write().await;
        match nodes.get(&path) {
            None => Ok(false),
            Some(Node::File { .. }) => Err(CoreError::NotADirectory(path)),
            Some(Node::Directory { .. }) => {
                if path.is_empty() {
                    // The root itself is kept; only its content goes
                    nodes.retain(|key, _| key.is_empty());
                } else {
                    nodes.retain(|key, _| !path::is_within(key, &path));
                }
                Ok(true)
            }
        }
    }

    async fn try_delete_file(&self, path: &str) -> CoreResult<bool> {
        let path = path::normalize(path);
        let mut nodes = self.nodes.write().await;
        match nodes.get(&path) {
            None => Ok(false),
            Some(Node::Directory { .. }) => Err(CoreError::IsADirectory(path)),
            Some(Node::File { .. }) => {
                nodes.remove(&path);
                Ok(true)
            }
        }
    }

    async fn move_file(&self, old_path: &str, new_path: &str) -> CoreResult<()> {
        let old_path = path::normalize(old_path);
        let new_path = path::normalize(new_path);
        let mut nodes = self.nodes.write().await;

        if !matches!(nodes.get(&old_path), Some(Node::File { .. })) {
            return Err(CoreError::NotFound(old_path));
        }
        if nodes.contains_key(&new_path) {
            return Err(CoreError::AlreadyExists(new_path));
        }
        let parent = path::parent(&new_path);
        if !matches!(nodes.get(parent), Some(Node::Directory { .. })) {
            return Err(CoreError::NotFound(parent.to_string()));
        }

        if let Some(node) = nodes.remove(&old_path) {
            nodes.insert(new_path, node);
        }
        Ok(())
    }

    async fn create_file_from_stream(&self, path: &str, stream: ByteStream<'_>) -> CoreResult<()> {
        let path = path::normalize(path);
        if path.is_empty() {
            return Err(CoreError::InvalidPath(path));
        }

        // Read outside the lock so a slow stream never blocks other requests
        let mut data = Vec::new();
        stream.read_to_end(&mut data).await?;

        let mut nodes = self.nodes.write().await;
        if nodes.contains_key(&path) {
            return Err(CoreError::AlreadyExists(path));
        }
        Self::insert_parents(&mut nodes, &path)?;
        nodes.insert(
            path,
            Node::File {
                data,
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    fn map_path_to_public_url(&self, path: &str) -> String {
        public_url(&self.public_base, path)
    }
}
