//! Application Layer
//!
//! Use cases built on the domain and infrastructure layers:
//! - `RemoteAssetsStore` - publish and resolve versions in an object store
//! - `AssetsManager` - fetch assets into the local cache, or read them from
//!   a local assets directory when no remote is configured

mod manager;
mod remote_store;

pub use manager::{AssetsManager, FetchOptions, FetchedAsset};
pub use remote_store::{PushOptions, RemoteAssetsStore, RemoteObjects};
