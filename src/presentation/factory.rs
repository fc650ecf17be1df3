//! Use Case Factory
//!
//! Creates stores and managers with infrastructure dependencies wired up.
//! This is the dependency injection point for the application.

use std::sync::Arc;
use std::time::Duration;

use crate::application::{AssetsManager, RemoteAssetsStore};
use crate::config::{AssetsConfig, RemoteConfig, StorageConfig};
use crate::domain::ports::StorageDriver;
use crate::domain::versioning::{VersioningRegistry, VersioningSystem};
use crate::error::{AssetError, AssetResult};
use crate::infrastructure::{LocalStorageDriver, RetryPolicy, RetryingDriver};

/// Look up the configured versioning system
pub fn create_versioning(
    name: &str,
    registry: &VersioningRegistry,
) -> AssetResult<Arc<dyn VersioningSystem>> {
    registry
        .get(name)
        .ok_or_else(|| AssetError::UnknownVersioningSystem {
            name: name.to_string(),
            known: registry.names(),
        })
}

/// Storage driver for `remote`, wrapped with read retries
pub fn create_storage_driver(remote: &RemoteConfig) -> Arc<dyn StorageDriver> {
    let policy = RetryPolicy::from(&remote.retry);
    match &remote.storage {
        StorageConfig::Local { bucket } => Arc::new(RetryingDriver::new(
            LocalStorageDriver::new(bucket.clone()),
            policy,
        )),
    }
}

/// Remote store with the built-in versioning systems
pub fn create_remote_store(config: &AssetsConfig) -> AssetResult<RemoteAssetsStore> {
    create_remote_store_with_registry(config, &VersioningRegistry::with_builtins())
}

pub fn create_remote_store_with_registry(
    config: &AssetsConfig,
    registry: &VersioningRegistry,
) -> AssetResult<RemoteAssetsStore> {
    let remote = config.remote.as_ref().ok_or(AssetError::RemoteNotConfigured)?;
    let versioning = create_versioning(&config.versioning, registry)?;
    Ok(RemoteAssetsStore::new(
        create_storage_driver(remote),
        remote.prefix.clone(),
        versioning,
    ))
}

/// Assets manager for `config`: cache-backed when a remote is configured,
/// local-only otherwise
pub fn create_assets_manager(config: &AssetsConfig) -> AssetResult<AssetsManager> {
    create_assets_manager_with_registry(config, &VersioningRegistry::with_builtins())
}

pub fn create_assets_manager_with_registry(
    config: &AssetsConfig,
    registry: &VersioningRegistry,
) -> AssetResult<AssetsManager> {
    match &config.remote {
        Some(remote) => {
            let store = create_remote_store_with_registry(config, registry)?;
            Ok(AssetsManager::with_remote(
                config.assets_dir.clone(),
                store,
                Duration::from_secs(remote.timeout_s),
            ))
        }
        None => Ok(AssetsManager::local(
            config.assets_dir.clone(),
            create_versioning(&config.versioning, registry)?,
        )),
    }
}
