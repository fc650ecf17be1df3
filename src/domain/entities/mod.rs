//! Domain Entities
//!
//! Documents stored next to asset objects in the remote store.
//! - `AssetMeta` - push date and integrity data of one version
//! - `VersionsIndex` - every published version of one asset, latest first

mod meta;
mod versions_index;

pub use meta::{AssetContents, AssetMeta};
pub use versions_index::VersionsIndex;
