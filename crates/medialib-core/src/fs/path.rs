//! Store path helpers.
//!
//! Store paths are slash-separated and relative to the library root, which
//! is the empty string. They never start or end with `/`.

/// Normalizes a store path.
///
/// Backslashes become `/`, empty and `.` segments are dropped and `..`
/// pops the previous segment. A `..` at the root is dropped, so the result
/// never escapes the library root.
///
/// # Examples
///
/// ```
/// use medialib_core::fs::path::normalize;
///
/// assert_eq!(normalize("/photos//2024/"), "photos/2024");
/// assert_eq!(normalize("photos/../docs"), "docs");
/// assert_eq!(normalize("../../etc"), "etc");
/// ```
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Joins two store paths and normalizes the result.
pub fn combine(base: &str, child: &str) -> String {
    normalize(&format!("{base}/{child}"))
}

/// Returns the parent path of `path` (`""` for top-level entries and root).
pub fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Returns the final segment of `path`.
pub fn file_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Returns `true` if `name` is usable as a single path segment.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}

/// Returns `true` if `path` equals `folder` or lies beneath it.
///
/// The root folder (`""`) contains every path.
pub fn is_within(path: &str, folder: &str) -> bool {
    folder.is_empty()
        || path == folder
        || (path.len() > folder.len()
            && path.starts_with(folder)
            && path.as_bytes()[folder.len()] == b'/')
}
