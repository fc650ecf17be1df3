//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `storage/` - StorageDriver implementations (Local, Memory, Retrying)
//! - `fs/` - Atomic writes, archives and cross-process locks
//! - `cache` - On-disk layout of the local asset cache

pub mod cache;
pub mod fs;
pub mod storage;

pub use cache::LocalCache;
pub use storage::{LocalStorageDriver, MemoryStorageDriver, RetryPolicy, RetryingDriver};
