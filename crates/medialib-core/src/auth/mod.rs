//! Authorization types consumed by the media layer.
//!
//! The media layer never decides access itself. It asks an [`Authorizer`]
//! whether a [`Principal`] holds a [`Permission`], optionally scoped to a
//! store path.

pub mod grants;

use async_trait::async_trait;

pub use grants::{GrantAuthorizer, UserGrant};

/// The caller a request is executed for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Principal {
    name: String,
}

impl Principal {
    pub const ANONYMOUS: &'static str = "anonymous";

    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn anonymous() -> Self {
        Self::new(Self::ANONYMOUS)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Media permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Path-independent right to use the media library at all.
    ManageOwnMedia,
    /// Right to manage one folder path. Always evaluated with a resource.
    ManageMediaFolder,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ManageOwnMedia => "manage_own_media",
            Self::ManageMediaFolder => "manage_media_folder",
        }
    }
}

/// Policy decision point for media permissions.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Returns `true` if `principal` holds `permission` on `resource`.
    ///
    /// `resource` is a normalized store path for
    /// [`Permission::ManageMediaFolder`] and `None` otherwise.
    async fn authorize(
        &self,
        principal: &Principal,
        permission: Permission,
        resource: Option<&str>,
    ) -> bool;
}
