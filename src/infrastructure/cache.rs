//! Local asset cache
//!
//! Layout under `<cache_root>/<prefix>`:
//!
//! ```text
//! docs/vocab-0.1                  materialized file asset
//! docs/.vocab-0.1.SUCCESS         completion marker of a file asset
//! models/bert-1.0/                materialized directory asset
//! models/bert-1.0/.SUCCESS        completion marker of a directory asset
//! .cache/docs/vocab/0.1.meta      meta the entry was populated from
//! .cache/docs/vocab/0.1.tmp       download target while populating
//! .cache/docs/vocab/0.1.lock      population lock
//! ```
//!
//! An entry is valid only when its marker exists, the entry exists and the
//! recorded meta describes the same contents as the remote one. The marker is
//! written last when populating and removed first when replacing, so a crash
//! at any point leaves either a valid entry or an invalid one, never a valid
//! looking partial one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::entities::AssetMeta;
use crate::domain::value_objects::Version;

use super::fs::{atomic_write, remove_path};

const MARKER: &str = ".SUCCESS";
const INTERNAL_DIR: &str = ".cache";

#[derive(Debug, Clone)]
pub struct LocalCache {
    root: PathBuf,
}

impl LocalCache {
    /// Cache for objects stored under `prefix`
    pub fn new(cache_root: &Path, prefix: &str) -> Self {
        let root = segments(prefix).fold(cache_root.to_path_buf(), |p, s| p.join(s));
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the asset is materialized: `<category>/<leaf>-<version>`
    pub fn entry_path(&self, name: &str, version: &Version) -> PathBuf {
        let (category, leaf) = split_name(name);
        category
            .fold(self.root.clone(), |p, s| p.join(s))
            .join(format!("{}-{}", leaf, version))
    }

    pub fn marker_path(&self, name: &str, version: &Version, is_directory: bool) -> PathBuf {
        if is_directory {
            self.entry_path(name, version).join(MARKER)
        } else {
            let (category, leaf) = split_name(name);
            category
                .fold(self.root.clone(), |p, s| p.join(s))
                .join(format!(".{}-{}{}", leaf, version, MARKER))
        }
    }

    fn internal_path(&self, name: &str, version: &Version, extension: &str) -> PathBuf {
        segments(name)
            .fold(self.root.join(INTERNAL_DIR), |p, s| p.join(s))
            .join(format!("{}.{}", version, extension))
    }

    pub fn meta_path(&self, name: &str, version: &Version) -> PathBuf {
        self.internal_path(name, version, "meta")
    }

    pub fn tmp_path(&self, name: &str, version: &Version) -> PathBuf {
        self.internal_path(name, version, "tmp")
    }

    pub fn lock_path(&self, name: &str, version: &Version) -> PathBuf {
        self.internal_path(name, version, "lock")
    }

    /// Meta recorded when the entry was populated, if readable
    pub fn local_meta(&self, name: &str, version: &Version) -> Option<AssetMeta> {
        let path = self.meta_path(name, version);
        let bytes = fs::read(&path).ok()?;
        match AssetMeta::from_json(&bytes) {
            Ok(meta) => Some(meta),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring unreadable cached meta");
                None
            }
        }
    }

    /// Whether the entry can be served as-is for `remote`
    pub fn is_valid(&self, name: &str, version: &Version, remote: &AssetMeta) -> bool {
        let is_directory = remote.is_directory();
        if !self.marker_path(name, version, is_directory).is_file() {
            return false;
        }
        let entry = self.entry_path(name, version);
        let entry_ok = if is_directory {
            entry.is_dir()
        } else {
            entry.is_file()
        };
        if !entry_ok {
            return false;
        }
        match self.local_meta(name, version) {
            Some(local) if local.contents == remote.contents => true,
            Some(_) => {
                warn!(name, version = %version, "cached asset differs from remote metadata");
                false
            }
            None => false,
        }
    }

    /// Clear leftovers of an interrupted population and return the download target
    pub fn prepare_download(&self, name: &str, version: &Version) -> io::Result<PathBuf> {
        let tmp = self.tmp_path(name, version);
        remove_path(&tmp)?;
        if let Some(parent) = tmp.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(tmp)
    }

    /// Move a fully downloaded target into place and mark it complete
    pub fn promote(&self, name: &str, version: &Version, meta: &AssetMeta) -> io::Result<PathBuf> {
        let entry = self.entry_path(name, version);
        // A file entry has no directory marker beneath it
        if entry.is_dir() {
            remove_path(&self.marker_path(name, version, true))?;
        }
        remove_path(&self.marker_path(name, version, false))?;
        remove_path(&entry)?;
        if let Some(parent) = entry.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::rename(self.tmp_path(name, version), &entry)?;

        let meta_json = meta.to_json().map_err(io::Error::other)?;
        atomic_write(&self.meta_path(name, version), &meta_json)?;
        fs::write(self.marker_path(name, version, meta.is_directory()), b"")?;
        debug!(name, version = %version, path = %entry.display(), "cache entry promoted");
        Ok(entry)
    }

    /// Best-effort removal of the download target after a failure
    pub fn discard_download(&self, name: &str, version: &Version) {
        let tmp = self.tmp_path(name, version);
        if let Err(err) = remove_path(&tmp) {
            warn!(path = %tmp.display(), error = %err, "failed to remove partial download");
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn split_name(name: &str) -> (impl Iterator<Item = &str>, &str) {
    match name.rsplit_once('/') {
        Some((category, leaf)) => (segments(category), leaf),
        None => (segments(""), name),
    }
}
