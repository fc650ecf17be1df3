//! Test environment builder for isolated assetkit testing.
//!
//! `TestEnv` owns a bucket directory (the remote), a cache directory (the
//! local mirror) and a work directory for files to push.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use assetkit::domain::ports::{ObjectKeys, ObjectReader, StorageDriver, StorageResult};
use assetkit::{AssetsManager, LocalStorageDriver, MajorMinorVersioning, RemoteAssetsStore};

pub const PREFIX: &str = "assets";

/// Result of running the assetkit binary
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Local bucket driver that counts data object downloads
#[derive(Debug)]
pub struct CountingDriver {
    inner: LocalStorageDriver,
    data_gets: AtomicUsize,
}

impl CountingDriver {
    pub fn new(root: &Path) -> Self {
        Self {
            inner: LocalStorageDriver::new(root),
            data_gets: AtomicUsize::new(0),
        }
    }

    /// Downloads of data objects, index and meta reads excluded
    pub fn data_gets(&self) -> usize {
        self.data_gets.load(Ordering::SeqCst)
    }
}

impl StorageDriver for CountingDriver {
    fn provider(&self) -> &str {
        self.inner.provider()
    }

    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key)
    }

    fn get(&self, key: &str) -> StorageResult<ObjectReader> {
        if !key.ends_with(".meta") && !key.ends_with(".versions") {
            self.data_gets.fetch_add(1, Ordering::SeqCst);
        }
        self.inner.get(key)
    }

    fn put(&self, key: &str, reader: &mut dyn std::io::Read) -> StorageResult<()> {
        self.inner.put(key, reader)
    }

    fn list(&self, prefix: &str) -> StorageResult<ObjectKeys<'_>> {
        self.inner.list(prefix)
    }

    fn object_uri(&self, key: &str) -> String {
        self.inner.object_uri(key)
    }
}

/// Isolated environment with a local bucket and cache
pub struct TestEnv {
    pub bucket: TempDir,
    pub cache: TempDir,
    pub work: TempDir,
    driver: Arc<CountingDriver>,
}

impl TestEnv {
    pub fn new() -> Self {
        let bucket = TempDir::new().unwrap();
        let driver = Arc::new(CountingDriver::new(bucket.path()));
        Self {
            bucket,
            cache: TempDir::new().unwrap(),
            work: TempDir::new().unwrap(),
            driver,
        }
    }

    pub fn driver(&self) -> &Arc<CountingDriver> {
        &self.driver
    }

    pub fn store(&self) -> RemoteAssetsStore {
        RemoteAssetsStore::new(
            self.driver.clone(),
            PREFIX,
            Arc::new(MajorMinorVersioning),
        )
    }

    pub fn manager(&self) -> AssetsManager {
        self.manager_with_timeout(Duration::from_secs(30))
    }

    pub fn manager_with_timeout(&self, timeout: Duration) -> AssetsManager {
        AssetsManager::with_remote(self.cache.path(), self.store(), timeout)
    }

    /// Write a file under the work directory and return its path
    pub fn write_file(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.work.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    /// Write a directory tree under the work directory and return its root
    pub fn write_tree(&self, relative: &str, files: &[(&str, &str)]) -> PathBuf {
        for (path, contents) in files {
            self.write_file(&format!("{}/{}", relative, path), contents);
        }
        self.work.path().join(relative)
    }

    pub fn bucket_path(&self, key: &str) -> PathBuf {
        self.bucket.path().join(key)
    }

    /// Run the assetkit binary against this bucket and cache
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let cache = self.cache.path().display().to_string();
        let bucket = self.bucket.path().display().to_string();
        let mut vars = vec![
            ("ASSETKIT_ASSETS_DIR", cache.as_str()),
            ("ASSETKIT_STORAGE_PROVIDER", "local"),
            ("ASSETKIT_STORAGE_BUCKET", bucket.as_str()),
            ("ASSETKIT_STORAGE_PREFIX", PREFIX),
        ];
        vars.extend_from_slice(env_vars);
        self.run_raw(args, &vars)
    }

    /// Run without the bucket overrides, so only config files apply
    pub fn run_raw(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_assetkit"));
        cmd.current_dir(self.work.path())
            .args(args)
            .env_remove("ASSETKIT_LOG")
            .env_remove("ASSETKIT_ASSETS_DIR")
            .env_remove("ASSETKIT_VERSIONING")
            .env_remove("ASSETKIT_STORAGE_PROVIDER")
            .env_remove("ASSETKIT_STORAGE_BUCKET")
            .env_remove("ASSETKIT_STORAGE_PREFIX")
            .env_remove("ASSETKIT_TIMEOUT_S")
            .env("XDG_CONFIG_HOME", self.work.path().join(".config"))
            .env("HOME", self.work.path());

        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute assetkit");
        output_to_result(output)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

fn output_to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}
