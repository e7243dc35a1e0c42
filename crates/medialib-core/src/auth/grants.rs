//! Static folder grants.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::auth::{Authorizer, Permission, Principal};
use crate::fs::path;

/// What one user may do in the library.
///
/// A folder grant covers the folder and everything beneath it. The root
/// folder is written as `"/"` (or `""`) and covers the whole library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserGrant {
    pub manage_media: bool,
    folders: Vec<String>,
}

impl UserGrant {
    pub fn new<I, S>(manage_media: bool, folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            manage_media,
            folders: folders
                .into_iter()
                .map(|f| path::normalize(f.as_ref()))
                .collect(),
        }
    }

    /// Grants media management on the whole library.
    pub fn full() -> Self {
        Self::new(true, ["/"])
    }

    /// Returns the normalized granted folders.
    pub fn folders(&self) -> &[String] {
        &self.folders
    }

    pub fn covers(&self, store_path: &str) -> bool {
        let store_path = path::normalize(store_path);
        self.folders
            .iter()
            .any(|folder| path::is_within(&store_path, folder))
    }
}

/// An [`Authorizer`] backed by a fixed table of [`UserGrant`]s.
///
/// Principals without an entry fall back to `fallback`, or are denied
/// everything when there is none.
#[derive(Debug, Clone, Default)]
pub struct GrantAuthorizer {
    grants: HashMap<String, UserGrant>,
    fallback: Option<UserGrant>,
}

impl GrantAuthorizer {
    pub fn new(grants: HashMap<String, UserGrant>) -> Self {
        Self {
            grants,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: UserGrant) -> Self {
        self.fallback = Some(fallback);
        self
    }

    fn grant_for(&self, principal: &Principal) -> Option<&UserGrant> {
        self.grants
            .get(principal.name())
            .or(self.fallback.as_ref())
    }
}

#[async_trait]
impl Authorizer for GrantAuthorizer {
    async fn authorize(
        &self,
        principal: &Principal,
        permission: Permission,
        resource: Option<&str>,
    ) -> bool {
        let Some(grant) = self.grant_for(principal) else {
            return false;
        };

        match (permission, resource) {
            (Permission::ManageOwnMedia, _) => grant.manage_media,
            (Permission::ManageMediaFolder, Some(folder)) => {
                grant.manage_media && grant.covers(folder)
            }
            (Permission::ManageMediaFolder, None) => false,
        }
    }
}
