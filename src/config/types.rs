//! Configuration types

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const DEFAULT_PREFIX: &str = "modelkit-assets";
pub const DEFAULT_TIMEOUT_S: u64 = 300;
pub const DEFAULT_VERSIONING: &str = "major_minor";

/// Cache directory used when nothing else is configured
pub fn default_assets_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("assetkit")
}

/// Top-level configuration
///
/// Without a `[remote]` section assets are read from `assets_dir` as-is
/// (`<assets_dir>/<category>/<name>/<version>`). With one, `assets_dir` is the
/// root of the local cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub assets_dir: PathBuf,
    pub versioning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            assets_dir: default_assets_dir(),
            versioning: DEFAULT_VERSIONING.to_string(),
            remote: None,
        }
    }
}

impl AssetsConfig {
    /// Local-only configuration rooted at `assets_dir`
    pub fn local(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_remote(mut self, remote: RemoteConfig) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn with_versioning(mut self, versioning: impl Into<String>) -> Self {
        self.versioning = versioning.into();
        self
    }

    /// Resolve relative paths against the directory of the file they came from
    pub(crate) fn resolve_relative_to(&mut self, base: &Path) {
        if self.assets_dir.is_relative() {
            self.assets_dir = base.join(&self.assets_dir);
        }
        if let Some(remote) = &mut self.remote {
            match &mut remote.storage {
                StorageConfig::Local { bucket } if bucket.is_relative() => {
                    *bucket = base.join(&*bucket);
                }
                StorageConfig::Local { .. } => {}
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub storage: StorageConfig,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Seconds to wait for another process populating the same cache entry
    #[serde(default = "default_timeout_s")]
    pub timeout_s: u64,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl RemoteConfig {
    pub fn new(storage: StorageConfig) -> Self {
        Self {
            storage,
            prefix: default_prefix(),
            timeout_s: DEFAULT_TIMEOUT_S,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_timeout_s() -> u64 {
    DEFAULT_TIMEOUT_S
}

/// Object store backend, selected by `provider`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum StorageConfig {
    /// A directory acting as the bucket
    Local { bucket: PathBuf },
}

impl StorageConfig {
    pub fn provider(&self) -> &'static str {
        match self {
            StorageConfig::Local { .. } => "local",
        }
    }
}

/// Backoff for storage reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub min_wait_ms: u64,
    pub max_wait_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            min_wait_ms: 250,
            max_wait_ms: 10_000,
        }
    }
}
