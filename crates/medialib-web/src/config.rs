use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

use medialib_core::UserGrant;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    pub username: String,
    pub password_hash: String,
    #[serde(default = "default_true")]
    pub manage_media: bool,
    /// Folders this user may manage. `"/"` is the whole library.
    #[serde(default = "default_folders")]
    pub folders: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub tls: TlsConfig,
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_public_url")]
    pub public_url: String,
    #[serde(default = "default_max_upload_size_mb")]
    pub max_upload_size_mb: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_jwt_ttl_hours")]
    pub jwt_ttl_hours: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_login_rpm")]
    pub login_requests_per_minute: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_ttl_hours: default_jwt_ttl_hours(),
        }
    }
}

fn default_true() -> bool { true }
fn default_folders() -> Vec<String> { vec!["/".to_string()] }
fn default_jwt_ttl_hours() -> u64 { 24 }
fn default_login_rpm() -> u32 { 5 }

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { login_requests_per_minute: default_login_rpm() }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TlsConfig {
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 9090))
}

fn default_backend() -> StorageBackend { StorageBackend::Local }
fn default_root() -> PathBuf { PathBuf::from("media") }
fn default_public_url() -> String { "/media".to_string() }
fn default_max_upload_size_mb() -> usize { 100 }

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            root: default_root(),
            public_url: default_public_url(),
            max_upload_size_mb: default_max_upload_size_mb(),
        }
    }
}

impl StorageConfig {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            storage: StorageConfig::default(),
            auth: AuthConfig::default(),
            rate_limit: RateLimitConfig::default(),
            tls: TlsConfig::default(),
            users: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn find_user(&self, username: &str) -> Option<&UserConfig> {
        self.users.iter().find(|u| u.username == username)
    }

    /// Returns `true` if any form of authentication is configured.
    pub fn has_auth(&self) -> bool {
        !self.users.is_empty()
    }

    /// Builds the folder grant table for the authorizer.
    pub fn grants(&self) -> HashMap<String, UserGrant> {
        self.users
            .iter()
            .map(|u| {
                (
                    u.username.clone(),
                    UserGrant::new(u.manage_media, &u.folders),
                )
            })
            .collect()
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::var("MEDIALIB_CONFIG")
            .map(PathBuf::from)
            .ok();

        let mut config = if let Some(path) = config_path {
            let contents = std::fs::read_to_string(&path)?;
            Self::from_toml(&contents)?
        } else {
            ServerConfig::default()
        };

        if let Ok(secret) = std::env::var("MEDIALIB_JWT_SECRET") {
            config.auth.jwt_secret = secret;
        }
        if config.auth.jwt_secret.is_empty() {
            config.auth.jwt_secret = uuid::Uuid::new_v4().to_string();
            tracing::warn!(
                "No JWT secret configured. Generated random secret (will change on restart)."
            );
        }

        if let Ok(root) = std::env::var("MEDIALIB_ROOT") {
            config.storage.root = PathBuf::from(root);
        }

        if let Ok(backend) = std::env::var("MEDIALIB_STORAGE") {
            config.storage.backend = match backend.as_str() {
                "local" => StorageBackend::Local,
                "memory" => StorageBackend::Memory,
                other => anyhow::bail!("Unknown storage backend: {other} (expected local|memory)"),
            };
        }

        if let Ok(url) = std::env::var("MEDIALIB_PUBLIC_URL") {
            config.storage.public_url = url;
        }

        if let Ok(val) = std::env::var("MEDIALIB_MAX_UPLOAD_SIZE_MB") {
            if let Ok(mb) = val.parse::<usize>() {
                config.storage.max_upload_size_mb = mb;
            }
        }

        if let Ok(addr) = std::env::var("MEDIALIB_BIND_ADDR") {
            config.bind_addr = addr.parse()?;
        }

        if let Ok(cert) = std::env::var("MEDIALIB_TLS_CERT") {
            config.tls.cert_path = Some(cert);
        }
        if let Ok(key) = std::env::var("MEDIALIB_TLS_KEY") {
            config.tls.key_path = Some(key);
        }

        config.validate(std::env::var("MEDIALIB_INSECURE").is_ok())?;

        Ok(config)
    }

    /// Rejects unsafe combinations and narrows the bind address when no
    /// authentication is configured.
    pub fn validate(&mut self, insecure: bool) -> anyhow::Result<()> {
        if self.has_auth() {
            const WEAK_SECRETS: &[&str] = &[
                "change-me-to-a-random-secret",
                "secret",
                "password",
                "jwt-secret",
            ];
            if WEAK_SECRETS.iter().any(|&w| self.auth.jwt_secret == w) {
                anyhow::bail!(
                    "JWT secret matches a known weak/placeholder value. \
                     Set a strong random secret via MEDIALIB_JWT_SECRET environment variable."
                );
            }
            if self.auth.jwt_secret.len() < 32 {
                tracing::warn!(
                    "JWT secret is shorter than 32 characters. \
                     Consider using a stronger secret via MEDIALIB_JWT_SECRET."
                );
            }
        }

        // Without users every caller is anonymous with full access
        if !self.has_auth() && self.bind_addr.ip().is_unspecified() {
            if insecure {
                tracing::warn!(
                    "Running WITHOUT authentication on all interfaces ({}). \
                     Anyone on the network can modify the media library!",
                    self.bind_addr
                );
            } else {
                let safe_addr: SocketAddr = ([127, 0, 0, 1], self.bind_addr.port()).into();
                tracing::warn!(
                    "No authentication configured. Binding to {} instead of {} for safety. \
                     Set MEDIALIB_INSECURE=1 to override (NOT RECOMMENDED).",
                    safe_addr, self.bind_addr
                );
                self.bind_addr = safe_addr;
            }
        }

        Ok(())
    }
}
