//! Store entry representation.

use std::time::SystemTime;

use unicode_normalization::UnicodeNormalization;

use crate::fs::path;

/// A single file or directory in the media store.
///
/// `FileEntry` is an immutable read model built fresh from each store
/// query. Directory lengths are reported as `0`.
///
/// # Examples
///
/// ```
/// use medialib_core::FileEntry;
///
/// let entry = FileEntry::file("photos/cat.jpg", 2048, None);
/// assert_eq!(entry.name(), "cat.jpg");
/// assert_eq!(entry.directory_path(), "photos");
/// assert!(!entry.is_dir());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    path: String,
    name: String,
    directory_path: String,
    length: u64,
    modified: Option<SystemTime>,
    is_dir: bool,
}

impl FileEntry {
    /// Creates a `FileEntry` for a store path from physical file metadata.
    ///
    /// Only the display name is re-composed to NFC; `path` keeps the exact
    /// bytes found on disk so it always resolves back to the same file.
    pub fn new(store_path: &str, metadata: &std::fs::Metadata) -> Self {
        let mut entry = Self::build(
            store_path.to_string(),
            if metadata.is_dir() { 0 } else { metadata.len() },
            metadata.modified().ok(),
            metadata.is_dir(),
        );
        entry.name = entry.name.nfc().collect();
        entry
    }

    /// Creates a file entry.
    pub fn file(store_path: &str, length: u64, modified: Option<SystemTime>) -> Self {
        Self::build(path::normalize(store_path), length, modified, false)
    }

    /// Creates a directory entry. Directory lengths are always `0`.
    pub fn directory(store_path: &str, modified: Option<SystemTime>) -> Self {
        Self::build(path::normalize(store_path), 0, modified, true)
    }

    fn build(path: String, length: u64, modified: Option<SystemTime>, is_dir: bool) -> Self {
        let name = path::file_name(&path).to_string();
        let directory_path = path::parent(&path).to_string();
        Self {
            path,
            name,
            directory_path,
            length,
            modified,
            is_dir,
        }
    }

    /// Returns the store path of this entry.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the file or directory name (last segment of the path).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the path of the containing directory.
    pub fn directory_path(&self) -> &str {
        &self.directory_path
    }

    /// Returns the file size in bytes. Always `0` for directories.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Returns the last-modified time, if available.
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    /// Returns `true` if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn file_entry_from_regular_file() {
        let tmp = TempDir::new().unwrap();
        let file_path = tmp.path().join("test.txt");
        fs::write(&file_path, "hello").unwrap();

        let metadata = fs::metadata(&file_path).unwrap();
        let entry = FileEntry::new("docs/test.txt", &metadata);

        assert_eq!(entry.name(), "test.txt");
        assert_eq!(entry.path(), "docs/test.txt");
        assert_eq!(entry.directory_path(), "docs");
        assert_eq!(entry.length(), 5);
        assert!(!entry.is_dir());
        assert!(entry.modified().is_some());
    }

    #[test]
    fn file_entry_from_directory() {
        let tmp = TempDir::new().unwrap();
        let dir_path = tmp.path().join("subdir");
        fs::create_dir(&dir_path).unwrap();
        fs::write(dir_path.join("a.txt"), "data").unwrap();

        let metadata = fs::metadata(&dir_path).unwrap();
        let entry = FileEntry::new("subdir", &metadata);

        assert_eq!(entry.name(), "subdir");
        assert_eq!(entry.directory_path(), "");
        assert_eq!(entry.length(), 0);
        assert!(entry.is_dir());
    }

    #[test]
    fn file_entry_nfc_name() {
        let tmp = TempDir::new().unwrap();
        let file_path = tmp.path().join("x");
        fs::write(&file_path, "").unwrap();
        let metadata = fs::metadata(&file_path).unwrap();

        // "한" in decomposed (NFD) form
        let decomposed = "\u{1112}\u{1161}\u{11AB}.txt";
        let entry = FileEntry::new(decomposed, &metadata);

        assert_eq!(entry.name(), "한.txt");
        assert_eq!(entry.path(), decomposed);
    }

    #[test]
    fn directory_has_zero_length() {
        let entry = FileEntry::directory("photos/2024", None);
        assert!(entry.is_dir());
        assert_eq!(entry.length(), 0);
        assert_eq!(entry.name(), "2024");
        assert_eq!(entry.directory_path(), "photos");
    }

    #[test]
    fn root_directory_entry() {
        let entry = FileEntry::directory("", None);
        assert_eq!(entry.path(), "");
        assert_eq!(entry.name(), "");
        assert_eq!(entry.directory_path(), "");
    }

    #[test]
    fn constructors_normalize_paths() {
        let entry = FileEntry::file("/photos//cat.jpg", 3, None);
        assert_eq!(entry.path(), "photos/cat.jpg");
    }

    #[test]
    fn file_entry_clone_and_eq() {
        let entry1 = FileEntry::file("a.jpg", 3, None);
        let entry2 = entry1.clone();
        assert_eq!(entry1, entry2);
    }
}
