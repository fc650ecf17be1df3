//! In-process storage driver, mostly for tests

use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::sync::{PoisonError, RwLock};

use crate::domain::ports::{ObjectKeys, ObjectReader, StorageDriver, StorageError, StorageResult};

use super::validate_key;

#[derive(Debug, Default)]
pub struct MemoryStorageDriver {
    bucket: String,
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStorageDriver {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: RwLock::new(BTreeMap::new()),
        }
    }
}

impl StorageDriver for MemoryStorageDriver {
    fn provider(&self) -> &str {
        "memory"
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn exists(&self, key: &str) -> StorageResult<bool> {
        validate_key(key)?;
        let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        Ok(objects.contains_key(key))
    }

    fn get(&self, key: &str) -> StorageResult<ObjectReader> {
        validate_key(key)?;
        let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        let bytes = objects
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::ObjectNotFound {
                bucket: self.bucket.clone(),
                key: key.to_string(),
            })?;
        Ok(Box::new(Cursor::new(bytes)))
    }

    fn put(&self, key: &str, content: &mut dyn Read) -> StorageResult<()> {
        validate_key(key)?;
        let mut bytes = Vec::new();
        content
            .read_to_end(&mut bytes)
            .map_err(|source| StorageError::Write {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                source,
            })?;
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), bytes);
        Ok(())
    }

    fn list(&self, prefix: &str) -> StorageResult<ObjectKeys<'_>> {
        // Snapshot so callers can write while iterating
        let keys: Vec<String> = self
            .objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .range(prefix.to_string()..)
            .map(|(k, _)| k)
            .take_while(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        Ok(Box::new(keys.into_iter().map(Ok)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_and_listing() {
        let driver = MemoryStorageDriver::new("test");
        driver.put_bytes("p/a/0.0", b"x").unwrap();
        driver.put_bytes("p/a.versions", b"{}").unwrap();
        driver.put_bytes("q/b", b"y").unwrap();

        assert_eq!(driver.get_bytes("p/a/0.0").unwrap(), b"x");
        assert!(driver.exists("q/b").unwrap());
        assert_eq!(driver.list("").unwrap().count(), 3);

        let listed: Vec<String> = driver
            .list("p/")
            .unwrap()
            .collect::<StorageResult<_>>()
            .unwrap();
        assert_eq!(listed, vec!["p/a.versions", "p/a/0.0"]);
        assert_eq!(driver.object_uri("q/b"), "memory://test/q/b");
    }

    #[test]
    fn missing_object() {
        let driver = MemoryStorageDriver::new("test");
        assert!(matches!(driver.get("nope"), Err(e) if e.is_not_found()));
        assert!(!driver.exists("nope").unwrap());
    }
}
