//! Configuration module
//!
//! Typed configuration for the API, the storage layer and the admin guard,
//! loaded from environment variables (and a `.env` file when present).

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use crate::constants::{
    ADMIN_BLOCK_DURATION_SECS, ADMIN_MAX_ATTEMPTS, DEFAULT_ADMIN_URL, PLACEHOLDER_REMOTE_KEY,
    PLACEHOLDER_REMOTE_URL,
};
use crate::storage_types::StoragePriority;

const SERVER_PORT: u16 = 3000;
const REMOTE_STORAGE_TIMEOUT_SECS: u64 = 30;
const MAX_UPLOAD_SIZE_BYTES: usize = 10 * 1024 * 1024;
const TRUSTED_PROXY_COUNT: usize = 1;

/// Process-level settings.
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    /// Development mode: relaxes the admin IP allow-list.
    pub debug: bool,
}

/// Settings for the admin access guard.
#[derive(Clone, Debug)]
pub struct AdminGuardConfig {
    /// Admin path segment without a leading slash, always ending in `/`.
    pub admin_url: String,
    /// Bearer token required on admin API calls.
    pub admin_api_token: Option<String>,
    /// Extra allowed source IP (the deployment host).
    pub deployment_ip: Option<String>,
    pub max_attempts: u32,
    pub block_duration_secs: u64,
    pub attempt_window_secs: u64,
    pub trusted_proxy_count: usize,
    pub debug: bool,
}

impl AdminGuardConfig {
    /// Path prefix the guard protects, e.g. `/khs-secure-admin-2024/`.
    pub fn path_prefix(&self) -> String {
        format!("/{}", self.admin_url)
    }

    pub fn block_duration(&self) -> Duration {
        Duration::from_secs(self.block_duration_secs)
    }

    pub fn attempt_window(&self) -> Duration {
        Duration::from_secs(self.attempt_window_secs)
    }
}

/// Credentials for the remote object store.
#[derive(Clone, Debug)]
pub struct RemoteStorageConfig {
    pub url: Option<String>,
    pub key: Option<String>,
    pub timeout_secs: u64,
}

impl RemoteStorageConfig {
    /// Remote credentials alone, for tools that do not run the API.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let var = |key: &str| env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self::from_vars(var)
    }

    fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            url: var("SUPABASE_URL").map(|u| u.trim_end_matches('/').to_string()),
            key: var("SUPABASE_KEY"),
            timeout_secs: var("REMOTE_STORAGE_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(REMOTE_STORAGE_TIMEOUT_SECS),
        }
    }

    /// True when both credentials are present and not the sample placeholders.
    pub fn is_configured(&self) -> bool {
        match (self.url.as_deref(), self.key.as_deref()) {
            (Some(url), Some(key)) => {
                !url.is_empty()
                    && !key.is_empty()
                    && url != PLACEHOLDER_REMOTE_URL
                    && key != PLACEHOLDER_REMOTE_KEY
            }
            _ => false,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Local media root and resolution settings.
#[derive(Clone, Debug)]
pub struct MediaStorageConfig {
    pub media_root: String,
    pub media_url: String,
    pub storage_priority: StoragePriority,
    pub max_upload_size_bytes: usize,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub admin: AdminGuardConfig,
    pub remote: RemoteStorageConfig,
    pub media: MediaStorageConfig,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from a fixed set of variables.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let flag = |key: &str, default: bool| {
            var(key)
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(default)
        };

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());
        let debug = flag("DEBUG", false);

        let storage_priority = match var("STORAGE_PRIORITY") {
            Some(value) => value.parse()?,
            None => StoragePriority::default(),
        };

        let base = BaseConfig {
            server_port: var("SERVER_PORT")
                .or_else(|| var("PORT"))
                .and_then(|s| s.parse().ok())
                .unwrap_or(SERVER_PORT),
            environment,
            debug,
        };

        let admin = AdminGuardConfig {
            admin_url: normalize_admin_url(
                &var("ADMIN_URL").unwrap_or_else(|| DEFAULT_ADMIN_URL.to_string()),
            ),
            admin_api_token: var("ADMIN_API_TOKEN"),
            deployment_ip: var("VPS_SERVER_IP"),
            max_attempts: var("ADMIN_MAX_ATTEMPTS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(ADMIN_MAX_ATTEMPTS),
            block_duration_secs: var("ADMIN_BLOCK_DURATION_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(ADMIN_BLOCK_DURATION_SECS),
            attempt_window_secs: var("ADMIN_ATTEMPT_WINDOW_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(ADMIN_BLOCK_DURATION_SECS),
            trusted_proxy_count: var("TRUSTED_PROXY_COUNT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(TRUSTED_PROXY_COUNT),
            debug,
        };

        let remote = RemoteStorageConfig::from_vars(&var);

        let media = MediaStorageConfig {
            media_root: var("MEDIA_ROOT").unwrap_or_else(|| "./media".to_string()),
            media_url: var("MEDIA_URL").unwrap_or_else(|| "/media/".to_string()),
            storage_priority,
            max_upload_size_bytes: var("MAX_UPLOAD_SIZE_BYTES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_UPLOAD_SIZE_BYTES),
        };

        let config = Config {
            base,
            admin,
            remote,
            media,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.admin.admin_url == "/" {
            return Err(anyhow::anyhow!("ADMIN_URL must not be empty"));
        }

        if self.admin.max_attempts == 0 {
            return Err(anyhow::anyhow!("ADMIN_MAX_ATTEMPTS must be at least 1"));
        }

        if !self.base.debug && self.admin.admin_api_token.is_none() {
            return Err(anyhow::anyhow!(
                "ADMIN_API_TOKEN must be set when DEBUG is off"
            ));
        }

        if self.remote.timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "REMOTE_STORAGE_TIMEOUT_SECS must be greater than zero"
            ));
        }

        Ok(())
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn storage_priority(&self) -> StoragePriority {
        self.media.storage_priority
    }
}

/// Strip leading slashes and guarantee a trailing one.
fn normalize_admin_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_start_matches('/');
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    }
}
