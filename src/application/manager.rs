//! Assets manager
//!
//! Turns an asset specification into a local path. With a remote store the
//! asset is mirrored into the local cache (see `infrastructure::cache` for the
//! layout); without one it is looked up in the assets directory:
//!
//! ```text
//! <assets_dir>/<category>/<name>/<version>
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, info_span};

use crate::domain::entities::AssetMeta;
use crate::domain::value_objects::{AssetSpecification, Version};
use crate::domain::versioning::VersioningSystem;
use crate::error::{AssetError, AssetResult};
use crate::infrastructure::cache::LocalCache;
use crate::infrastructure::fs::{path_size, FileLock, LockError};

use super::remote_store::{RemoteAssetsStore, RemoteObjects};

/// Everything known about a fetched asset
#[derive(Debug, Clone, Serialize)]
pub struct FetchedAsset {
    /// Requested path: the asset itself, or the sub-path inside it
    pub path: PathBuf,
    /// Asset root, equal to `path` when no sub-path was requested
    pub base_asset_path: PathBuf,
    pub name: String,
    /// `None` for unversioned local assets
    pub version: Option<Version>,
    /// Served without downloading
    pub from_cache: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<AssetMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteObjects>,
}

/// Knobs for `fetch_asset_with`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Download again even when the cache entry is valid
    pub force_download: bool,
}

#[derive(Debug)]
struct RemoteBackend {
    store: RemoteAssetsStore,
    cache: LocalCache,
    timeout: Duration,
}

#[derive(Debug)]
pub struct AssetsManager {
    assets_dir: PathBuf,
    versioning: Arc<dyn VersioningSystem>,
    remote: Option<RemoteBackend>,
}

impl AssetsManager {
    /// Manager reading assets from `assets_dir` only
    pub fn local(assets_dir: impl Into<PathBuf>, versioning: Arc<dyn VersioningSystem>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            versioning,
            remote: None,
        }
    }

    /// Manager mirroring `store` into a cache rooted at `cache_dir`.
    ///
    /// `timeout` bounds the wait for another process populating the same entry.
    pub fn with_remote(
        cache_dir: impl Into<PathBuf>,
        store: RemoteAssetsStore,
        timeout: Duration,
    ) -> Self {
        let assets_dir = cache_dir.into();
        let cache = LocalCache::new(&assets_dir, store.prefix());
        Self {
            versioning: store.versioning().clone(),
            assets_dir,
            remote: Some(RemoteBackend {
                store,
                cache,
                timeout,
            }),
        }
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    pub fn versioning(&self) -> &Arc<dyn VersioningSystem> {
        &self.versioning
    }

    pub fn remote_store(&self) -> Option<&RemoteAssetsStore> {
        self.remote.as_ref().map(|r| &r.store)
    }

    pub fn parse(&self, spec: &str) -> AssetResult<AssetSpecification> {
        AssetSpecification::parse(spec, self.versioning.as_ref())
    }

    /// Local path of the asset `spec` designates, fetching it if needed
    pub fn fetch_asset(&self, spec: &str) -> AssetResult<PathBuf> {
        Ok(self.fetch_asset_info(spec)?.path)
    }

    /// Like [`fetch_asset`](Self::fetch_asset), with version, meta and origin
    pub fn fetch_asset_info(&self, spec: &str) -> AssetResult<FetchedAsset> {
        self.fetch_asset_with(spec, &FetchOptions::default())
    }

    /// Fetch with explicit options, e.g. forcing a fresh download
    pub fn fetch_asset_with(
        &self,
        spec: &str,
        options: &FetchOptions,
    ) -> AssetResult<FetchedAsset> {
        let spec = self.parse(spec)?;
        self.fetch(&spec, options)
    }

    pub fn fetch(
        &self,
        spec: &AssetSpecification,
        options: &FetchOptions,
    ) -> AssetResult<FetchedAsset> {
        let name = spec.asset_name();
        let _span = info_span!("fetch", name = %name, query = %spec.version_query()).entered();

        let fetched = match &self.remote {
            Some(remote) => self.fetch_remote(remote, &name, spec, options)?,
            None => {
                if options.force_download {
                    debug!("no remote store, forced download ignored");
                }
                self.fetch_local(&name, spec)?
            }
        };
        with_subpath(fetched, spec)
    }

    fn fetch_local(&self, name: &str, spec: &AssetSpecification) -> AssetResult<FetchedAsset> {
        let base = name
            .split('/')
            .fold(self.assets_dir.clone(), |p, s| p.join(s));

        let mut available: Vec<Version> = match fs::read_dir(&base) {
            Ok(entries) => entries
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
                .filter_map(|e| e.file_name().to_str().map(str::to_string))
                .filter(|token| self.versioning.is_valid(token))
                .map(Version::new)
                .collect(),
            Err(_) => Vec::new(),
        };
        self.versioning.sort_versions(&mut available);

        if let Some(version) = self
            .versioning
            .latest_matching(&available, spec.version_query())
        {
            let path = base.join(version.as_str());
            debug!(path = %path.display(), version = %version, "using local asset version");
            return Ok(FetchedAsset {
                base_asset_path: path.clone(),
                path,
                name: name.to_string(),
                version: Some(version),
                from_cache: true,
                meta: None,
                remote: None,
            });
        }

        if available.is_empty() && spec.version_query().is_unspecified() && base.exists() {
            debug!(path = %base.display(), "using unversioned local asset");
            return Ok(FetchedAsset {
                base_asset_path: base.clone(),
                path: base,
                name: name.to_string(),
                version: None,
                from_cache: true,
                meta: None,
                remote: None,
            });
        }

        Err(AssetError::AssetNotFoundLocally {
            name: name.to_string(),
            query: spec.version_query().to_string(),
            available: available.iter().map(Version::to_string).collect(),
        })
    }

    fn fetch_remote(
        &self,
        remote: &RemoteBackend,
        name: &str,
        spec: &AssetSpecification,
        options: &FetchOptions,
    ) -> AssetResult<FetchedAsset> {
        let RemoteBackend {
            store,
            cache,
            timeout,
        } = remote;

        let version = store.resolve(name, spec.version_query())?;
        let meta = store.fetch_meta(name, &version)?;

        let force = options.force_download;
        let from_cache = if !force && cache.is_valid(name, &version, &meta) {
            debug!(version = %version, "cache hit");
            true
        } else {
            let lock_path = cache.lock_path(name, &version);
            let _lock = FileLock::acquire(&lock_path, *timeout).map_err(|err| match err {
                LockError::Timeout { timeout, .. } => AssetError::AssetLockTimeout {
                    name: name.to_string(),
                    version: version.to_string(),
                    timeout,
                },
                LockError::Io { path, source } => AssetError::Lock { path, source },
            })?;

            // Someone else may have populated the entry while we waited
            if !force && cache.is_valid(name, &version, &meta) {
                debug!(version = %version, "cache populated by another fetch");
                true
            } else {
                self.populate(store, cache, name, &version, &meta)?;
                false
            }
        };

        Ok(FetchedAsset {
            path: cache.entry_path(name, &version),
            base_asset_path: cache.entry_path(name, &version),
            name: name.to_string(),
            remote: Some(store.remote_objects(name, &version)),
            version: Some(version),
            from_cache,
            meta: Some(meta),
        })
    }

    /// Download into the temporary target, then promote it. Caller holds the lock.
    fn populate(
        &self,
        store: &RemoteAssetsStore,
        cache: &LocalCache,
        name: &str,
        version: &Version,
        meta: &AssetMeta,
    ) -> AssetResult<()> {
        info!(version = %version, is_directory = meta.is_directory(), "downloading asset");
        let started = Instant::now();

        let tmp = cache.prepare_download(name, version)?;
        let result = store
            .fetch_blob(name, version, meta, &tmp)
            .and_then(|transferred| {
                let entry = cache.promote(name, version, meta)?;
                Ok((transferred, entry))
            });

        match result {
            Ok((transferred, entry)) => {
                info!(
                    version = %version,
                    size_bytes = path_size(&entry).unwrap_or(transferred),
                    transferred_bytes = transferred,
                    time_seconds = started.elapsed().as_secs_f64(),
                    "downloaded asset"
                );
                Ok(())
            }
            Err(err) => {
                cache.discard_download(name, version);
                Err(err)
            }
        }
    }
}

fn with_subpath(mut fetched: FetchedAsset, spec: &AssetSpecification) -> AssetResult<FetchedAsset> {
    let Some(subpath) = spec.subpath() else {
        return Ok(fetched);
    };
    let path = spec
        .subpath_segments()
        .into_iter()
        .fold(fetched.base_asset_path.clone(), |p, s| p.join(s));
    if !path.exists() {
        return Err(AssetError::AssetSubpathNotFound {
            name: fetched.name,
            subpath: subpath.to_string(),
            path,
        });
    }
    fetched.path = path;
    Ok(fetched)
}
