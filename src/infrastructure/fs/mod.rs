//! File System Helpers
//!
//! Local disk primitives used by the cache and the local storage driver.

mod archive;
mod local;
mod lock;

pub use archive::{list_files, pack_directory, unpack_archive};
pub use local::{atomic_write, copy_hashed, path_size, remove_path};
pub use lock::{FileLock, LockError};
