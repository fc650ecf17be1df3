//! Retry wrapper for storage reads
//!
//! `exists`, `get`, `get_with` and `list` are retried on retriable errors with
//! a randomized exponential wait. `get_with` reopens the object and reruns the
//! consumer, so a stream broken halfway is read again from the start. `put` is
//! passed through untouched: retrying a write that may have partially
//! succeeded is left to the caller.

use std::io::{self, Read};
use std::thread;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::config::RetryConfig;
use crate::domain::ports::{ObjectKeys, ObjectReader, StorageDriver, StorageResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub min_wait: Duration,
    pub max_wait: Duration,
}

impl RetryPolicy {
    /// Random wait before attempt `attempt + 1`, `attempt` counting from 1
    pub fn backoff(&self, attempt: u32) -> Duration {
        let min = self.min_wait.as_millis() as u64;
        let max = self.max_wait.as_millis() as u64;
        let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
        let ceiling = min.saturating_mul(factor).min(max).max(min);
        Duration::from_millis(rand::thread_rng().gen_range(min..=ceiling))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            min_wait: Duration::from_millis(config.min_wait_ms),
            max_wait: Duration::from_millis(config.max_wait_ms),
        }
    }
}

#[derive(Debug)]
pub struct RetryingDriver<D> {
    inner: D,
    policy: RetryPolicy,
}

impl<D: StorageDriver> RetryingDriver<D> {
    pub fn new(inner: D, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    fn with_retry<T>(
        &self,
        operation: &str,
        key: &str,
        mut call: impl FnMut() -> StorageResult<T>,
    ) -> StorageResult<T> {
        let mut attempt = 1;
        loop {
            match call() {
                Err(err) if err.is_retriable() && attempt < self.policy.max_attempts => {
                    let wait = self.policy.backoff(attempt);
                    warn!(
                        operation,
                        key,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        wait_ms = wait.as_millis() as u64,
                        error = %err,
                        "storage call failed, retrying"
                    );
                    thread::sleep(wait);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

impl<D: StorageDriver> StorageDriver for RetryingDriver<D> {
    fn provider(&self) -> &str {
        self.inner.provider()
    }

    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    fn exists(&self, key: &str) -> StorageResult<bool> {
        self.with_retry("exists", key, || self.inner.exists(key))
    }

    fn get(&self, key: &str) -> StorageResult<ObjectReader> {
        self.with_retry("get", key, || self.inner.get(key))
    }

    fn get_with(
        &self,
        key: &str,
        consume: &mut dyn FnMut(&mut dyn Read) -> io::Result<()>,
    ) -> StorageResult<()> {
        self.with_retry("get", key, || self.inner.get_with(key, &mut *consume))
    }

    fn put(&self, key: &str, content: &mut dyn Read) -> StorageResult<()> {
        self.inner.put(key, content)
    }

    fn list(&self, prefix: &str) -> StorageResult<ObjectKeys<'_>> {
        self.with_retry("list", prefix, || self.inner.list(prefix))
    }

    fn object_uri(&self, key: &str) -> String {
        self.inner.object_uri(key)
    }
}
