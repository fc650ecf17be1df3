//! Configuration module for assetkit
//!
//! Resolution order:
//! 1. Environment variables (ASSETKIT_*)
//! 2. Explicit `--config` file, else `./assetkit.toml`, else
//!    `<user config dir>/assetkit/config.toml`
//! 3. Built-in defaults
//!
//! There is no global configuration: the resolved [`AssetsConfig`] is handed
//! to the constructors that need it.

mod loader;
#[cfg(test)]
mod tests;
mod types;

pub use loader::{
    apply_env_overrides, load_from, load_or_default, load_with_warnings, ConfigError,
    ConfigWarning, PROJECT_CONFIG_FILE,
};
pub use types::{
    default_assets_dir, AssetsConfig, RemoteConfig, RetryConfig, StorageConfig,
    DEFAULT_PREFIX, DEFAULT_TIMEOUT_S, DEFAULT_VERSIONING,
};
