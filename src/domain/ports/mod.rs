//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod storage_driver;

pub use storage_driver::{ObjectKeys, ObjectReader, StorageDriver, StorageError, StorageResult};
