//! assetkit - versioned assets in object stores with a local cache
//!
//! Assets are immutable files or directories pushed to an object store under
//! a logical name. Every push creates a new version; a small versions index
//! per name lets callers ask for "latest" or "latest within major 2" without
//! listing the bucket. Fetching an asset mirrors it into a local cache
//! directory that can be shared by many processes.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-exports for convenience
pub use application::{
    AssetsManager, FetchOptions, FetchedAsset, PushOptions, RemoteAssetsStore, RemoteObjects,
};
pub use config::{AssetsConfig, RemoteConfig, RetryConfig, StorageConfig};
pub use domain::entities::{AssetContents, AssetMeta, VersionsIndex};
pub use domain::ports::{StorageDriver, StorageError};
pub use domain::value_objects::{AssetSpecification, ContentHash, Version, VersionQuery};
pub use domain::versioning::{
    MajorMinorVersioning, SimpleDateVersioning, VersionError, VersioningRegistry,
    VersioningSystem,
};
pub use error::{AssetError, AssetResult};
pub use infrastructure::storage::{LocalStorageDriver, MemoryStorageDriver, RetryingDriver};
