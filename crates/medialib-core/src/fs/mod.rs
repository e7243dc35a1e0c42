//! Store entry types and path helpers.
//!
//! [`entry::FileEntry`] is the read model returned by every
//! [`crate::store::FileStore`] query; [`path`] holds the pure string
//! helpers used to compose and normalize store paths.

pub mod entry;
pub mod path;
