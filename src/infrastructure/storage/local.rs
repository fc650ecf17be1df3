//! Directory-backed storage driver
//!
//! The bucket is a directory; an object key `a/b/c` is the file `<root>/a/b/c`.
//! Writes land in a temporary sibling first and are renamed into place, so a
//! reader never observes a partially written object.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tempfile::Builder;
use tracing::debug;
use walkdir::WalkDir;

use crate::domain::ports::{ObjectKeys, ObjectReader, StorageDriver, StorageError, StorageResult};

use super::validate_key;

const TEMP_PREFIX: &str = ".assetkit-put";

#[derive(Debug, Clone)]
pub struct LocalStorageDriver {
    root: PathBuf,
    bucket: String,
}

impl LocalStorageDriver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let bucket = root.display().to_string();
        Self { root, bucket }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        if !self.root.is_dir() {
            return Err(StorageError::BucketNotFound {
                bucket: self.bucket.clone(),
            });
        }
        Ok(key.split('/').fold(self.root.clone(), |p, s| p.join(s)))
    }

    fn read_err(&self, key: &str, source: io::Error) -> StorageError {
        if source.kind() == io::ErrorKind::NotFound {
            StorageError::ObjectNotFound {
                bucket: self.bucket.clone(),
                key: key.to_string(),
            }
        } else {
            StorageError::Read {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                source,
            }
        }
    }

    fn write_err(&self, key: &str, source: io::Error) -> StorageError {
        StorageError::Write {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            source,
        }
    }
}

impl StorageDriver for LocalStorageDriver {
    fn provider(&self) -> &str {
        "file"
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.object_path(key)?.is_file())
    }

    fn get(&self, key: &str) -> StorageResult<ObjectReader> {
        let path = self.object_path(key)?;
        if path.is_dir() {
            return Err(StorageError::ObjectNotFound {
                bucket: self.bucket.clone(),
                key: key.to_string(),
            });
        }
        let file = File::open(&path).map_err(|e| self.read_err(key, e))?;
        debug!(key, "opened object");
        Ok(Box::new(file))
    }

    fn put(&self, key: &str, content: &mut dyn Read) -> StorageResult<()> {
        let path = self.object_path(key)?;
        let parent = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(parent).map_err(|e| self.write_err(key, e))?;

        let mut tmp = Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(parent)
            .map_err(|e| self.write_err(key, e))?;
        let size = io::copy(content, tmp.as_file_mut()).map_err(|e| self.write_err(key, e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| self.write_err(key, e))?;
        tmp.persist(&path)
            .map_err(|e| self.write_err(key, e.error))?;
        debug!(key, size_bytes = size, "stored object");
        Ok(())
    }

    fn list(&self, prefix: &str) -> StorageResult<ObjectKeys<'_>> {
        if !self.root.is_dir() {
            return Err(StorageError::BucketNotFound {
                bucket: self.bucket.clone(),
            });
        }

        // Start the walk at the deepest directory the prefix names
        let walk_root = match prefix.rfind('/') {
            Some(idx) => prefix[..idx]
                .split('/')
                .filter(|s| !s.is_empty())
                .fold(self.root.clone(), |p, s| p.join(s)),
            None => self.root.clone(),
        };
        if !walk_root.is_dir() {
            return Ok(Box::new(std::iter::empty()));
        }

        let root = self.root.clone();
        let bucket = self.bucket.clone();
        let prefix = prefix.to_string();
        let keys = WalkDir::new(walk_root)
            .into_iter()
            .filter_entry(|e| {
                !e.file_name()
                    .to_str()
                    .is_some_and(|n| n.starts_with(TEMP_PREFIX))
            })
            .filter_map(move |entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        let key = err
                            .path()
                            .map(|p| p.display().to_string())
                            .unwrap_or_default();
                        return Some(Err(StorageError::Read {
                            bucket: bucket.clone(),
                            key,
                            source: err.into(),
                        }));
                    }
                };
                if !entry.file_type().is_file() {
                    return None;
                }
                let key = key_of(&root, entry.path())?;
                key.starts_with(&prefix).then_some(Ok(key))
            });
        Ok(Box::new(keys))
    }

    fn object_uri(&self, key: &str) -> String {
        let path = key.split('/').fold(self.root.clone(), |p, s| p.join(s));
        format!("file://{}", path.display())
    }
}

fn key_of(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Option<Vec<&str>> = rel.components().map(|c| c.as_os_str().to_str()).collect();
    Some(parts?.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn keys(driver: &LocalStorageDriver, prefix: &str) -> Vec<String> {
        let mut keys: Vec<String> = driver
            .list(prefix)
            .unwrap()
            .collect::<StorageResult<_>>()
            .unwrap();
        keys.sort();
        keys
    }

    #[test]
    fn put_get_exists() {
        let dir = tempdir().unwrap();
        let driver = LocalStorageDriver::new(dir.path());

        assert!(!driver.exists("p/docs/vocab/0.0").unwrap());
        driver.put_bytes("p/docs/vocab/0.0", b"a\nb\n").unwrap();
        assert!(driver.exists("p/docs/vocab/0.0").unwrap());
        assert_eq!(driver.get_bytes("p/docs/vocab/0.0").unwrap(), b"a\nb\n");
        assert!(dir.path().join("p/docs/vocab/0.0").is_file());
    }

    #[test]
    fn put_replaces_content_atomically() {
        let dir = tempdir().unwrap();
        let driver = LocalStorageDriver::new(dir.path());
        driver.put_bytes("k", b"one").unwrap();
        driver.put_bytes("k", b"two").unwrap();
        assert_eq!(driver.get_bytes("k").unwrap(), b"two");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_object_and_bucket() {
        let dir = tempdir().unwrap();
        let driver = LocalStorageDriver::new(dir.path());
        assert!(matches!(driver.get("nope"), Err(e) if e.is_not_found()));

        let gone = LocalStorageDriver::new(dir.path().join("missing"));
        assert!(matches!(
            gone.exists("a").unwrap_err(),
            StorageError::BucketNotFound { .. }
        ));
        assert!(matches!(
            gone.list("").err(),
            Some(StorageError::BucketNotFound { .. })
        ));
    }

    #[test]
    fn directory_is_not_an_object() {
        let dir = tempdir().unwrap();
        let driver = LocalStorageDriver::new(dir.path());
        driver.put_bytes("a/b", b"x").unwrap();
        assert!(!driver.exists("a").unwrap());
        assert!(matches!(driver.get("a"), Err(e) if e.is_not_found()));
    }

    #[test]
    fn rejects_escaping_keys() {
        let dir = tempdir().unwrap();
        let driver = LocalStorageDriver::new(dir.path());
        assert!(matches!(
            driver.put_bytes("../escape", b"x").unwrap_err(),
            StorageError::InvalidKey { .. }
        ));
    }

    #[test]
    fn list_filters_by_prefix() {
        let dir = tempdir().unwrap();
        let driver = LocalStorageDriver::new(dir.path());
        for key in [
            "p/docs/vocab.versions",
            "p/docs/vocab/0.0",
            "p/docs/vocab/0.0.meta",
            "p/models/bert.versions",
            "other/x",
        ] {
            driver.put_bytes(key, b"").unwrap();
        }

        assert_eq!(
            keys(&driver, "p/"),
            vec![
                "p/docs/vocab.versions",
                "p/docs/vocab/0.0",
                "p/docs/vocab/0.0.meta",
                "p/models/bert.versions",
            ]
        );
        assert_eq!(keys(&driver, "p/docs/vocab.").len(), 1);
        assert_eq!(keys(&driver, "").len(), 5);
        assert!(keys(&driver, "nothing/here/").is_empty());
    }

    #[test]
    fn object_uri_points_at_file() {
        let driver = LocalStorageDriver::new("/srv/bucket");
        assert_eq!(driver.object_uri("p/a/0.0"), "file:///srv/bucket/p/a/0.0");
    }
}
