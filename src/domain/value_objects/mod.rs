//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod hash;
mod spec;
mod version;

pub use hash::{ContentHash, ContentHasher};
pub use spec::AssetSpecification;
pub use version::{Version, VersionQuery};
