//! Domain Layer
//!
//! Pure asset-versioning logic. Nothing here touches the network or the
//! local cache directly.
//!
//! ## Structure
//!
//! - `entities/` - Remote metadata documents (AssetMeta, VersionsIndex)
//! - `value_objects/` - Immutable value types (Version, AssetSpecification, ContentHash)
//! - `versioning/` - Pluggable version generation and matching strategies
//! - `ports/` - Interface definitions for infrastructure (StorageDriver)

pub mod entities;
pub mod ports;
pub mod value_objects;
pub mod versioning;
