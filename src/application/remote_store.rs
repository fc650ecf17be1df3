//! Remote assets store
//!
//! Object naming convention inside the bucket:
//!
//! ```text
//! <prefix>/<name>/<version>        data object (file, or tar+gzip of a directory)
//! <prefix>/<name>/<version>.meta   AssetMeta JSON
//! <prefix>/<name>.versions         VersionsIndex JSON, latest first
//! ```
//!
//! Data and meta objects are written once and never modified. The versions
//! index is rewritten on every push with a read-modify-write that is not
//! atomic: two concurrent `update` calls for the same name can lose one of
//! the index entries (both data objects survive). Pushes for one asset must
//! be serialized by the caller.
//!
//! A push that fails after the data and meta objects were written but before
//! the index was rewritten leaves those objects unreferenced. Retrying the
//! same `update` computes the same version and is refused with
//! `AssetVersionAlreadyExists` until the orphans are removed from the bucket
//! by hand, or a different base (`bump_major`, `major`) is chosen.

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, info_span};

use crate::domain::entities::{AssetContents, AssetMeta, VersionsIndex};
use crate::domain::ports::StorageDriver;
use crate::domain::value_objects::{AssetSpecification, ContentHash, Version, VersionQuery};
use crate::domain::versioning::{VersionError, VersioningSystem};
use crate::error::{AssetError, AssetResult};
use crate::infrastructure::fs::{
    copy_hashed, list_files, pack_directory, remove_path, unpack_archive,
};

/// Knobs for `create_with` and `update_with`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushOptions {
    /// Validate, hash and pack the asset and compute its version, but write
    /// nothing to the bucket
    pub dry_run: bool,
}

/// Remote locations of one asset version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteObjects {
    pub object_name: String,
    pub meta_object_name: String,
    pub versions_object_name: String,
    pub object_uri: String,
}

pub struct RemoteAssetsStore {
    driver: Arc<dyn StorageDriver>,
    prefix: String,
    versioning: Arc<dyn VersioningSystem>,
}

impl std::fmt::Debug for RemoteAssetsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteAssetsStore")
            .field("provider", &self.driver.provider())
            .field("bucket", &self.driver.bucket())
            .field("prefix", &self.prefix)
            .field("versioning", &self.versioning.name())
            .finish()
    }
}

impl RemoteAssetsStore {
    pub fn new(
        driver: Arc<dyn StorageDriver>,
        prefix: impl Into<String>,
        versioning: Arc<dyn VersioningSystem>,
    ) -> Self {
        let prefix = prefix.into().trim_matches('/').to_string();
        Self {
            driver,
            prefix,
            versioning,
        }
    }

    pub fn driver(&self) -> &Arc<dyn StorageDriver> {
        &self.driver
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn versioning(&self) -> &Arc<dyn VersioningSystem> {
        &self.versioning
    }

    fn key(&self, rest: &str) -> String {
        if self.prefix.is_empty() {
            rest.to_string()
        } else {
            format!("{}/{}", self.prefix, rest)
        }
    }

    pub fn object_name(&self, name: &str, version: &Version) -> String {
        self.key(&format!("{}/{}", name, version))
    }

    pub fn meta_object_name(&self, name: &str, version: &Version) -> String {
        format!("{}.meta", self.object_name(name, version))
    }

    pub fn versions_object_name(&self, name: &str) -> String {
        self.key(&format!("{}.versions", name))
    }

    pub fn remote_objects(&self, name: &str, version: &Version) -> RemoteObjects {
        let object_name = self.object_name(name, version);
        RemoteObjects {
            object_uri: self.driver.object_uri(&object_name),
            meta_object_name: self.meta_object_name(name, version),
            versions_object_name: self.versions_object_name(name),
            object_name,
        }
    }

    /// Versions index of `name`, `None` when the asset was never created
    fn read_index(&self, name: &str) -> AssetResult<Option<VersionsIndex>> {
        let key = self.versions_object_name(name);
        let bytes = match self.driver.get_bytes(&key) {
            Ok(bytes) => bytes,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(AssetError::storage(name)(err)),
        };
        let index = VersionsIndex::from_json(&bytes).map_err(|e| AssetError::CorruptedMetadata {
            key,
            message: e.to_string(),
        })?;
        Ok(Some(index))
    }

    fn write_index(&self, name: &str, index: &VersionsIndex) -> AssetResult<()> {
        let key = self.versions_object_name(name);
        let bytes = index.to_json().map_err(|e| AssetError::CorruptedMetadata {
            key: key.clone(),
            message: e.to_string(),
        })?;
        debug!(name, key = %key, versions = index.versions().len(), "writing versions index");
        self.driver
            .put_bytes(&key, &bytes)
            .map_err(AssetError::storage(name))
    }

    /// Published versions of `name`, latest first
    pub fn versions(&self, name: &str) -> AssetResult<Vec<Version>> {
        let index = self
            .read_index(name)?
            .ok_or_else(|| AssetError::AssetDoesNotExist {
                name: name.to_string(),
            })?;
        let mut versions = index.into_versions();
        self.versioning.sort_versions(&mut versions);
        Ok(versions)
    }

    /// Pick the version `query` designates among the published ones
    pub fn resolve(&self, name: &str, query: &VersionQuery) -> AssetResult<Version> {
        let versions = self.versions(name)?;
        self.versioning
            .latest_matching(&versions, query)
            .ok_or_else(|| match query {
                VersionQuery::Partial(major) => AssetError::AssetMajorVersionDoesNotExist {
                    name: name.to_string(),
                    major: major.clone(),
                },
                VersionQuery::Exact(version) => AssetError::AssetVersionDoesNotExist {
                    name: name.to_string(),
                    version: version.to_string(),
                },
                VersionQuery::Unspecified => AssetError::AssetDoesNotExist {
                    name: name.to_string(),
                },
            })
    }

    pub fn fetch_meta(&self, name: &str, version: &Version) -> AssetResult<AssetMeta> {
        let key = self.meta_object_name(name, version);
        let bytes = self.driver.get_bytes(&key).map_err(|err| {
            if err.is_not_found() {
                AssetError::AssetVersionDoesNotExist {
                    name: name.to_string(),
                    version: version.to_string(),
                }
            } else {
                AssetError::storage(name)(err)
            }
        })?;
        AssetMeta::from_json(&bytes).map_err(|e| AssetError::CorruptedMetadata {
            key,
            message: e.to_string(),
        })
    }

    /// Stream the data object to `destination`, verifying it against `meta`.
    ///
    /// File assets become the file `destination`; directory assets are
    /// unpacked into the directory `destination`. A download interrupted by a
    /// retriable error starts over on a fresh stream when the driver retries.
    /// Returns the number of bytes transferred.
    pub fn fetch_blob(
        &self,
        name: &str,
        version: &Version,
        meta: &AssetMeta,
        destination: &Path,
    ) -> AssetResult<u64> {
        let key = self.object_name(name, version);
        let mut received = None;
        self.driver
            .get_with(&key, &mut |reader: &mut dyn Read| {
                received = Some(match &meta.contents {
                    AssetContents::File { .. } => {
                        let mut file = File::create(destination)?;
                        let (hash, size) = copy_hashed(reader, &mut file)?;
                        file.sync_all()?;
                        (Some(hash), size)
                    }
                    AssetContents::Directory { .. } => {
                        remove_path(destination)?;
                        let mut counted = CountingReader::new(reader);
                        unpack_archive(&mut counted, destination)?;
                        (None, counted.count)
                    }
                });
                Ok(())
            })
            .map_err(AssetError::storage(name))?;
        let (actual_hash, size) = received.ok_or_else(|| AssetError::CorruptedMetadata {
            key,
            message: "driver returned without reading the object".to_string(),
        })?;

        match &meta.contents {
            AssetContents::File { hash } => {
                if let Some(actual) = actual_hash.filter(|actual| actual != hash) {
                    return Err(AssetError::AssetIntegrity {
                        name: name.to_string(),
                        version: version.to_string(),
                        expected: hash.to_string(),
                        actual: actual.to_string(),
                    });
                }
            }
            AssetContents::Directory { contents } => {
                let actual = list_files(destination)?;
                if &actual != contents {
                    return Err(AssetError::AssetIntegrity {
                        name: name.to_string(),
                        version: version.to_string(),
                        expected: format!("{} files", contents.len()),
                        actual: format!("{} files", actual.len()),
                    });
                }
            }
        }
        Ok(size)
    }

    /// Publish the first version of a new asset
    pub fn create(&self, asset_path: &Path, name: &str) -> AssetResult<Version> {
        self.create_with(asset_path, name, &PushOptions::default())
    }

    pub fn create_with(
        &self,
        asset_path: &Path,
        name: &str,
        options: &PushOptions,
    ) -> AssetResult<Version> {
        self.check_name(name)?;
        let _span = info_span!("create", name, dry_run = options.dry_run).entered();

        let versions_key = self.versions_object_name(name);
        if self
            .driver
            .exists(&versions_key)
            .map_err(AssetError::storage(name))?
        {
            return Err(AssetError::AssetAlreadyExists {
                name: name.to_string(),
            });
        }

        let version = self.versioning.initial_version();
        info!(version = %version, path = %asset_path.display(), "pushing new asset");
        self.push(asset_path, name, &version, options)?;
        if !options.dry_run {
            self.write_index(name, &VersionsIndex::new(version.clone()))?;
        }
        Ok(version)
    }

    /// Publish a new version of an existing asset.
    ///
    /// The new version follows the latest one, or the latest within `major`
    /// when given. `bump_major` starts a new major after the overall latest.
    pub fn update(
        &self,
        asset_path: &Path,
        name: &str,
        bump_major: bool,
        major: Option<&str>,
    ) -> AssetResult<Version> {
        self.update_with(asset_path, name, bump_major, major, &PushOptions::default())
    }

    pub fn update_with(
        &self,
        asset_path: &Path,
        name: &str,
        bump_major: bool,
        major: Option<&str>,
        options: &PushOptions,
    ) -> AssetResult<Version> {
        self.check_name(name)?;
        let _span = info_span!("update", name, dry_run = options.dry_run).entered();

        let mut index = self
            .read_index(name)?
            .ok_or_else(|| AssetError::AssetDoesNotExist {
                name: name.to_string(),
            })?;

        let query = match major {
            Some(major) if !bump_major => match self.versioning.parse_query(Some(major))? {
                partial @ VersionQuery::Partial(_) => partial,
                _ => {
                    return Err(VersionError::invalid(
                        self.versioning.name(),
                        major,
                        "expected a major version",
                    )
                    .into())
                }
            },
            _ => VersionQuery::Unspecified,
        };
        let base = self
            .versioning
            .latest_matching(index.versions(), &query)
            .ok_or_else(|| match &query {
                VersionQuery::Partial(major) => AssetError::AssetMajorVersionDoesNotExist {
                    name: name.to_string(),
                    major: major.clone(),
                },
                _ => AssetError::AssetDoesNotExist {
                    name: name.to_string(),
                },
            })?;
        let version = self.versioning.next_version(&base, bump_major)?;
        info!(from = %base, version = %version, bump_major, "pushing asset update");

        self.push(asset_path, name, &version, options)?;
        if !options.dry_run {
            index.insert(version.clone(), self.versioning.as_ref());
            self.write_index(name, &index)?;
        }
        Ok(version)
    }

    /// Upload data then meta for one version; the data object must not exist
    fn push(
        &self,
        asset_path: &Path,
        name: &str,
        version: &Version,
        options: &PushOptions,
    ) -> AssetResult<AssetMeta> {
        let object_name = self.object_name(name, version);
        if self
            .driver
            .exists(&object_name)
            .map_err(AssetError::storage(name))?
        {
            return Err(AssetError::AssetVersionAlreadyExists {
                name: name.to_string(),
                version: version.to_string(),
            });
        }

        let metadata = fs::metadata(asset_path)?;
        let (meta, mut content) = if metadata.is_dir() {
            let mut archive = tempfile::tempfile()?;
            let files = pack_directory(asset_path, &mut archive)?;
            debug!(object_name = %object_name, n_parts = files.len(), "packed directory archive");
            (AssetMeta::directory(files), archive)
        } else {
            let mut file = File::open(asset_path)?;
            let hash = ContentHash::from_reader(&mut file)?;
            debug!(object_name = %object_name, size_bytes = metadata.len(), "hashed file");
            (AssetMeta::file(hash), file)
        };

        let meta_key = self.meta_object_name(name, version);
        let meta_json = meta.to_json().map_err(|e| AssetError::CorruptedMetadata {
            key: meta_key.clone(),
            message: e.to_string(),
        })?;

        if options.dry_run {
            info!(
                version = %version,
                object_uri = %self.driver.object_uri(&object_name),
                "dry run, nothing uploaded"
            );
            return Ok(meta);
        }

        content.seek(SeekFrom::Start(0))?;
        self.driver
            .put(&object_name, &mut content)
            .map_err(AssetError::storage(name))?;
        self.driver
            .put_bytes(&meta_key, &meta_json)
            .map_err(AssetError::storage(name))?;
        info!(version = %version, object_uri = %self.driver.object_uri(&object_name), "pushed asset");
        Ok(meta)
    }

    /// Every asset under the prefix with its versions, sorted by name.
    ///
    /// Names are collected from the `.versions` objects first; versions are
    /// then read lazily, one index per item.
    pub fn list(&self) -> AssetResult<impl Iterator<Item = AssetResult<(String, Vec<Version>)>> + '_> {
        let list_prefix = if self.prefix.is_empty() {
            String::new()
        } else {
            format!("{}/", self.prefix)
        };
        let mut names = Vec::new();
        for key in self
            .driver
            .list(&list_prefix)
            .map_err(AssetError::storage(&self.prefix))?
        {
            let key = key.map_err(AssetError::storage(&self.prefix))?;
            if let Some(name) = key
                .strip_prefix(&list_prefix)
                .and_then(|rest| rest.strip_suffix(".versions"))
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        names.dedup();

        Ok(names.into_iter().map(move |name| {
            let versions = self.versions(&name)?;
            Ok((name, versions))
        }))
    }

    /// Reject names that are not plain `category/name` references
    fn check_name(&self, name: &str) -> AssetResult<()> {
        let spec = AssetSpecification::parse(name, self.versioning.as_ref())?;
        if !spec.version_query().is_unspecified() || spec.subpath().is_some() {
            return Err(AssetError::MalformedSpecification {
                spec: name.to_string(),
                offending: name.to_string(),
                reason: "expected an asset name without version or sub-path".to_string(),
            });
        }
        Ok(())
    }
}

/// Counts bytes pulled through a reader
struct CountingReader<R> {
    inner: R,
    count: u64,
}

impl<R> CountingReader<R> {
    fn new(inner: R) -> Self {
        Self { inner, count: 0 }
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}
