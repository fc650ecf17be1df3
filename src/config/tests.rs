//! Tests for the config module

use super::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn test_config_default() {
    let config = AssetsConfig::default();

    assert!(config.assets_dir.ends_with("assetkit"));
    assert_eq!(config.versioning, "major_minor");
    assert!(config.remote.is_none());
}

#[test]
fn test_retry_defaults() {
    let retry = RetryConfig::default();
    assert_eq!(retry.max_attempts, 5);
    assert_eq!(retry.min_wait_ms, 250);
    assert_eq!(retry.max_wait_ms, 10_000);
}

#[test]
fn test_config_parse_toml() {
    let toml = r#"
assets_dir = "/var/cache/assets"
versioning = "simple_date"

[remote]
prefix = "team-assets"
timeout_s = 60

[remote.storage]
provider = "local"
bucket = "/srv/bucket"

[remote.retry]
max_attempts = 2
"#;

    let config: AssetsConfig = toml::from_str(toml).unwrap();

    assert_eq!(config.assets_dir, PathBuf::from("/var/cache/assets"));
    assert_eq!(config.versioning, "simple_date");
    let remote = config.remote.unwrap();
    assert_eq!(remote.prefix, "team-assets");
    assert_eq!(remote.timeout_s, 60);
    assert_eq!(
        remote.storage,
        StorageConfig::Local {
            bucket: PathBuf::from("/srv/bucket")
        }
    );
    assert_eq!(remote.retry.max_attempts, 2);
    assert_eq!(remote.retry.min_wait_ms, 250);
}

#[test]
fn test_remote_defaults_when_omitted() {
    let toml = r#"
[remote.storage]
provider = "local"
bucket = "/srv/bucket"
"#;
    let config: AssetsConfig = toml::from_str(toml).unwrap();
    let remote = config.remote.unwrap();
    assert_eq!(remote.prefix, DEFAULT_PREFIX);
    assert_eq!(remote.timeout_s, DEFAULT_TIMEOUT_S);
}

#[test]
fn test_unknown_provider_is_a_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("assetkit.toml");
    fs::write(
        &path,
        "[remote.storage]\nprovider = \"ftp\"\nbucket = \"x\"\n",
    )
    .unwrap();

    let err = load_with_warnings(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "{err:?}");
}

#[test]
fn test_unknown_keys_become_warnings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("assetkit.toml");
    fs::write(&path, "versionng = \"major_minor\"\nassets_dir = \"/a\"\n").unwrap();

    let (config, warnings) = load_with_warnings(&path).unwrap();

    assert_eq!(config.assets_dir, PathBuf::from("/a"));
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].key, "versionng");
    assert_eq!(warnings[0].line, Some(1));
    assert_eq!(warnings[0].suggestion.as_deref(), Some("versioning"));
    assert!(warnings[0].to_string().contains("did you mean 'versioning'"));
}

#[test]
fn test_relative_paths_resolve_against_config_dir() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("assetkit.toml");
    fs::write(
        &path,
        "assets_dir = \"cache\"\n[remote.storage]\nprovider = \"local\"\nbucket = \"bucket\"\n",
    )
    .unwrap();

    let (config, _) = load_with_warnings(&path).unwrap();

    assert_eq!(config.assets_dir, dir.path().join("cache"));
    assert_eq!(
        config.remote.unwrap().storage,
        StorageConfig::Local {
            bucket: dir.path().join("bucket")
        }
    );
}

#[test]
fn test_load_from_prefers_project_file() {
    let project = tempdir().unwrap();
    let user = tempdir().unwrap();
    fs::write(project.path().join(PROJECT_CONFIG_FILE), "versioning = \"simple_date\"\n").unwrap();
    fs::write(user.path().join("config.toml"), "versioning = \"major_minor\"\n").unwrap();

    let (config, _) = load_from(None, project.path(), Some(user.path()), no_env).unwrap();
    assert_eq!(config.versioning, "simple_date");
}

#[test]
fn test_load_from_falls_back_to_user_then_default() {
    let project = tempdir().unwrap();
    let user = tempdir().unwrap();
    fs::write(user.path().join("config.toml"), "assets_dir = \"/u\"\n").unwrap();

    let (config, _) = load_from(None, project.path(), Some(user.path()), no_env).unwrap();
    assert_eq!(config.assets_dir, PathBuf::from("/u"));

    let (config, _) = load_from(None, project.path(), None, no_env).unwrap();
    assert_eq!(config, AssetsConfig::default());
}

#[test]
fn test_explicit_missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let err = load_from(Some(&missing), dir.path(), None, no_env).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_env_overrides_create_remote() {
    let env = env_from(&[
        ("ASSETKIT_ASSETS_DIR", "/tmp/cache"),
        ("ASSETKIT_STORAGE_PROVIDER", "local"),
        ("ASSETKIT_STORAGE_BUCKET", "/tmp/bucket"),
        ("ASSETKIT_STORAGE_PREFIX", "p"),
        ("ASSETKIT_TIMEOUT_S", "12"),
        ("ASSETKIT_VERSIONING", "simple_date"),
    ]);

    let config = apply_env_overrides(AssetsConfig::default(), env).unwrap();

    assert_eq!(config.assets_dir, Path::new("/tmp/cache"));
    assert_eq!(config.versioning, "simple_date");
    let remote = config.remote.unwrap();
    assert_eq!(remote.prefix, "p");
    assert_eq!(remote.timeout_s, 12);
    assert_eq!(
        remote.storage,
        StorageConfig::Local {
            bucket: PathBuf::from("/tmp/bucket")
        }
    );
}

#[test]
fn test_env_bucket_keeps_file_settings() {
    let file_config = AssetsConfig::local("/a").with_remote(
        RemoteConfig::new(StorageConfig::Local {
            bucket: PathBuf::from("/old"),
        })
        .with_prefix("from-file"),
    );

    let config =
        apply_env_overrides(file_config, env_from(&[("ASSETKIT_STORAGE_BUCKET", "/new")])).unwrap();

    let remote = config.remote.unwrap();
    assert_eq!(remote.prefix, "from-file");
    assert_eq!(
        remote.storage,
        StorageConfig::Local {
            bucket: PathBuf::from("/new")
        }
    );
}

#[test]
fn test_env_errors() {
    let err = apply_env_overrides(
        AssetsConfig::default(),
        env_from(&[("ASSETKIT_STORAGE_PROVIDER", "local")]),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::MissingBucket { .. }));

    let err = apply_env_overrides(
        AssetsConfig::default(),
        env_from(&[
            ("ASSETKIT_STORAGE_PROVIDER", "gcs"),
            ("ASSETKIT_STORAGE_BUCKET", "b"),
        ]),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::UnknownProvider { .. }));

    let err = apply_env_overrides(
        AssetsConfig::default(),
        env_from(&[
            ("ASSETKIT_STORAGE_BUCKET", "/b"),
            ("ASSETKIT_TIMEOUT_S", "soon"),
        ]),
    )
    .unwrap_err();
    assert!(err.to_string().contains("ASSETKIT_TIMEOUT_S"));
}

#[test]
fn test_validation_rejects_bad_retry() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("c.toml");
    fs::write(
        &path,
        "[remote.storage]\nprovider = \"local\"\nbucket = \"/b\"\n[remote.retry]\nmax_attempts = 0\n",
    )
    .unwrap();
    let err = load_from(Some(&path), dir.path(), None, no_env).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}
