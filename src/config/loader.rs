//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::types::{AssetsConfig, RemoteConfig, StorageConfig};

/// File name looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = "assetkit.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid value '{value}' for {var}: {reason}")]
    InvalidEnv {
        var: String,
        value: String,
        reason: String,
    },

    #[error("unknown storage provider '{provider}' (known: local)")]
    UnknownProvider { provider: String },

    #[error("storage provider '{provider}' needs a bucket (set ASSETKIT_STORAGE_BUCKET)")]
    MissingBucket { provider: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown config key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

/// Load a config file and collect non-fatal warnings (unknown keys).
///
/// Relative paths inside the file are resolved against its directory.
pub fn load_with_warnings(path: &Path) -> Result<(AssetsConfig, Vec<ConfigWarning>), ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);
    let mut config: AssetsConfig = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if let Some(base) = path.parent() {
        config.resolve_relative_to(base);
    }

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
                key,
                file: path.to_path_buf(),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Resolve configuration from the process environment and standard locations
pub fn load_or_default(
    explicit: Option<&Path>,
) -> Result<(AssetsConfig, Vec<ConfigWarning>), ConfigError> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let user_dir = dirs::config_dir().map(|d| d.join("assetkit"));
    load_from(explicit, &cwd, user_dir.as_deref(), |var| {
        std::env::var(var).ok()
    })
}

/// [`load_or_default`] with injectable locations and environment
pub fn load_from(
    explicit: Option<&Path>,
    cwd: &Path,
    user_config_dir: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<(AssetsConfig, Vec<ConfigWarning>), ConfigError> {
    let candidate = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => [
            Some(cwd.join(PROJECT_CONFIG_FILE)),
            user_config_dir.map(|d| d.join("config.toml")),
        ]
        .into_iter()
        .flatten()
        .find(|p| p.is_file()),
    };

    let (config, warnings) = match candidate {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration");
            load_with_warnings(&path)?
        }
        None => (AssetsConfig::default(), Vec::new()),
    };

    let config = apply_env_overrides(config, env)?;
    validate(&config)?;
    Ok((config, warnings))
}

/// Apply ASSETKIT_* overrides through `env`
pub fn apply_env_overrides(
    mut config: AssetsConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<AssetsConfig, ConfigError> {
    if let Some(dir) = env("ASSETKIT_ASSETS_DIR") {
        config.assets_dir = PathBuf::from(dir);
    }

    if let Some(versioning) = env("ASSETKIT_VERSIONING") {
        config.versioning = versioning;
    }

    let provider = env("ASSETKIT_STORAGE_PROVIDER");
    let bucket = env("ASSETKIT_STORAGE_BUCKET");
    if provider.is_some() || bucket.is_some() {
        let provider = provider
            .or_else(|| config.remote.as_ref().map(|r| r.storage.provider().to_string()))
            .unwrap_or_else(|| "local".to_string());
        let bucket = bucket.map(PathBuf::from).or_else(|| match &config.remote {
            Some(RemoteConfig {
                storage: StorageConfig::Local { bucket },
                ..
            }) => Some(bucket.clone()),
            None => None,
        });

        let storage = match provider.to_lowercase().as_str() {
            "local" => StorageConfig::Local {
                bucket: bucket.ok_or(ConfigError::MissingBucket {
                    provider: provider.clone(),
                })?,
            },
            _ => return Err(ConfigError::UnknownProvider { provider }),
        };
        match &mut config.remote {
            Some(remote) => remote.storage = storage,
            None => config.remote = Some(RemoteConfig::new(storage)),
        }
    }

    if let Some(remote) = &mut config.remote {
        if let Some(prefix) = env("ASSETKIT_STORAGE_PREFIX") {
            remote.prefix = prefix;
        }
        if let Some(value) = env("ASSETKIT_TIMEOUT_S") {
            remote.timeout_s = value.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidEnv {
                    var: "ASSETKIT_TIMEOUT_S".to_string(),
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
    }

    Ok(config)
}

fn validate(config: &AssetsConfig) -> Result<(), ConfigError> {
    if config.versioning.trim().is_empty() {
        return Err(ConfigError::Invalid("versioning must not be empty".into()));
    }
    if let Some(remote) = &config.remote {
        if remote.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "remote.retry.max_attempts must be at least 1".into(),
            ));
        }
        if remote.retry.min_wait_ms > remote.retry.max_wait_ms {
            return Err(ConfigError::Invalid(
                "remote.retry.min_wait_ms exceeds max_wait_ms".into(),
            ));
        }
        if remote.prefix.starts_with('/') {
            return Err(ConfigError::Invalid(
                "remote.prefix must be relative".into(),
            ));
        }
    }
    Ok(())
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "assets_dir",
        "versioning",
        "remote",
        "storage",
        "provider",
        "bucket",
        "prefix",
        "timeout_s",
        "retry",
        "max_attempts",
        "min_wait_ms",
        "max_wait_ms",
    ];

    CANDIDATES
        .iter()
        .map(|candidate| (candidate, levenshtein(unknown, candidate)))
        .min_by_key(|(_, dist)| *dist)
        .filter(|(_, dist)| *dist <= 2)
        .map(|(candidate, _)| candidate.to_string())
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = usize::from(ac != bc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
