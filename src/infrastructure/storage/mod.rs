//! Storage driver implementations

mod local;
mod memory;
mod retry;

pub use local::LocalStorageDriver;
pub use memory::MemoryStorageDriver;
pub use retry::{RetryPolicy, RetryingDriver};

use crate::domain::ports::{StorageError, StorageResult};

/// Reject keys that could escape a bucket rooted on disk
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && !key.contains('\\')
        && key
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..");
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey {
            key: key.to_string(),
        })
    }
}
