//! Media library core: authorization-scoped media operations.
//!
//! `medialib-core` holds everything that does not depend on HTTP: the
//! store abstraction, the authorization seam and the media admin
//! operations built on both. The `medialib-web` crate is a thin axum
//! adapter over [`MediaLibrary`].
//!
//! # Modules
//!
//! - [`fs`]: [`FileEntry`] and store path helpers.
//! - [`store`]: the [`FileStore`] trait with local-disk and in-memory backends.
//! - [`auth`]: [`Principal`], [`Permission`], the [`Authorizer`] trait and
//!   the folder-grant implementation.
//! - [`media`]: [`MediaLibrary`], its error taxonomy and presentation records.
//! - [`error`]: store error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod auth;
pub mod error;
pub mod fs;
pub mod media;
pub mod store;

pub use auth::{Authorizer, GrantAuthorizer, Permission, Principal, UserGrant};
pub use error::{CoreError, CoreResult};
pub use fs::entry::FileEntry;
pub use media::{
    BatchKind, MediaError, MediaFileResult, MediaLibrary, MediaResult, UploadOutcome,
    UploadedFile,
};
pub use store::{FileStore, LocalFileStore, MemoryFileStore};
