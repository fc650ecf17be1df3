//! Error types for assetkit
//!
//! Uses `thiserror` for library errors. Backend failures keep their
//! `StorageError` as the source and gain the asset name as context.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::ports::StorageError;
use crate::domain::versioning::VersionError;

/// Result type alias for asset operations
pub type AssetResult<T> = Result<T, AssetError>;

/// Main error type for asset operations
#[derive(Error, Debug)]
pub enum AssetError {
    /// The specification string does not follow `name(:version)?([subpath])?`
    #[error("malformed asset specification '{spec}': {reason} (at '{offending}')")]
    MalformedSpecification {
        spec: String,
        offending: String,
        reason: String,
    },

    /// A version token was rejected by the active versioning system
    #[error(transparent)]
    InvalidVersion(#[from] VersionError),

    #[error("asset '{name}' does not exist - use `assetkit new` to create it")]
    AssetDoesNotExist { name: String },

    #[error("asset '{name}' already exists - use `assetkit update` to push a new version")]
    AssetAlreadyExists { name: String },

    #[error("version '{version}' of asset '{name}' does not exist")]
    AssetVersionDoesNotExist { name: String, version: String },

    #[error("major version '{major}' of asset '{name}' does not exist")]
    AssetMajorVersionDoesNotExist { name: String, major: String },

    /// Remote objects are immutable: a version is never pushed twice
    #[error("version '{version}' of asset '{name}' already exists and cannot be overwritten")]
    AssetVersionAlreadyExists { name: String, version: String },

    #[error(
        "asset '{name}' has no local version matching '{query}' (available: {})",
        display_versions(.available)
    )]
    AssetNotFoundLocally {
        name: String,
        query: String,
        available: Vec<String>,
    },

    #[error("timed out after {timeout:?} waiting for the download lock of '{name}' version '{version}'")]
    AssetLockTimeout {
        name: String,
        version: String,
        timeout: Duration,
    },

    #[error("sub-path '{subpath}' not found in asset '{name}' ({})", .path.display())]
    AssetSubpathNotFound {
        name: String,
        subpath: String,
        path: PathBuf,
    },

    /// Downloaded content differs from what the remote meta announced
    #[error("downloaded '{name}' version '{version}' does not match its metadata: expected {expected}, got {actual}")]
    AssetIntegrity {
        name: String,
        version: String,
        expected: String,
        actual: String,
    },

    #[error("corrupted metadata object '{key}': {message}")]
    CorruptedMetadata { key: String, message: String },

    #[error("storage error for asset '{name}': {source}")]
    Storage {
        name: String,
        #[source]
        source: StorageError,
    },

    #[error("failed to lock {}: {source}", .path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown versioning system '{name}' (known: {})", .known.join(", "))]
    UnknownVersioningSystem { name: String, known: Vec<String> },

    #[error("no remote storage configured")]
    RemoteNotConfigured,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn display_versions(versions: &[String]) -> String {
    if versions.is_empty() {
        "none".to_string()
    } else {
        versions.join(", ")
    }
}

impl AssetError {
    /// Wrap a backend error with the asset it was raised for
    pub fn storage(name: impl Into<String>) -> impl FnOnce(StorageError) -> AssetError {
        let name = name.into();
        move |source| AssetError::Storage { name, source }
    }
}
