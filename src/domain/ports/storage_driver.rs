//! StorageDriver port - abstraction over the remote object store
//!
//! A driver exposes a flat keyspace of immutable-by-convention objects in one
//! bucket. The asset layer builds every key itself; drivers never interpret
//! them beyond mapping `/` to whatever hierarchy the backend has.
//!
//! Implementations:
//! - `LocalStorageDriver` - a directory on disk acting as the bucket
//! - `MemoryStorageDriver` - in-process map, for tests
//! - `RetryingDriver` - wraps another driver and retries transient read failures

use std::io::{self, Read};

use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Streamed object content
pub type ObjectReader = Box<dyn Read + Send>;

/// Lazily listed object keys
pub type ObjectKeys<'a> = Box<dyn Iterator<Item = StorageResult<String>> + 'a>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object '{key}' not found in bucket '{bucket}'")]
    ObjectNotFound { bucket: String, key: String },

    #[error("bucket '{bucket}' does not exist")]
    BucketNotFound { bucket: String },

    #[error("failed to write object '{key}' to bucket '{bucket}'")]
    Write {
        bucket: String,
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to read object '{key}' from bucket '{bucket}'")]
    Read {
        bucket: String,
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid object key '{key}'")]
    InvalidKey { key: String },

    #[error("transient storage failure on '{key}': {message}")]
    Transient { key: String, message: String },
}

impl StorageError {
    /// Whether repeating the same call may succeed
    pub fn is_retriable(&self) -> bool {
        match self {
            StorageError::Transient { .. } => true,
            StorageError::Read { source, .. } => matches!(
                source.kind(),
                io::ErrorKind::Interrupted
                    | io::ErrorKind::TimedOut
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::WouldBlock
                    | io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::ObjectNotFound { .. })
    }
}

/// Abstract object store
///
/// Writes are not retried by callers: a failed `put` surfaces immediately.
pub trait StorageDriver: Send + Sync {
    /// URI scheme of the backend (`file`, `memory`, ...)
    fn provider(&self) -> &str;

    fn bucket(&self) -> &str;

    fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Open an object for streaming
    fn get(&self, key: &str) -> StorageResult<ObjectReader>;

    /// Store an object, replacing any previous content under `key`
    fn put(&self, key: &str, content: &mut dyn Read) -> StorageResult<()>;

    /// Keys starting with `prefix`, in no particular order
    fn list(&self, prefix: &str) -> StorageResult<ObjectKeys<'_>>;

    /// Human-readable location of an object
    fn object_uri(&self, key: &str) -> String {
        format!("{}://{}/{}", self.provider(), self.bucket(), key)
    }

    /// Open an object and hand the stream to `consume`.
    ///
    /// Errors returned by `consume` are reported as read failures of `key`. A
    /// retrying driver may call `consume` again on a fresh stream, so it must
    /// discard whatever a previous call produced.
    fn get_with(
        &self,
        key: &str,
        consume: &mut dyn FnMut(&mut dyn Read) -> io::Result<()>,
    ) -> StorageResult<()> {
        let mut reader = self.get(key)?;
        consume(&mut reader).map_err(|source| StorageError::Read {
            bucket: self.bucket().to_string(),
            key: key.to_string(),
            source,
        })
    }

    /// Read a whole object into memory
    fn get_bytes(&self, key: &str) -> StorageResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.get_with(key, &mut |reader: &mut dyn Read| {
            buf.clear();
            reader.read_to_end(&mut buf).map(drop)
        })?;
        Ok(buf)
    }

    fn put_bytes(&self, key: &str, content: &[u8]) -> StorageResult<()> {
        let mut reader = content;
        self.put(key, &mut reader)
    }
}
