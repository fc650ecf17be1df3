//! Command handlers for the assetkit binary

mod fetch;
mod list;
mod push;

use std::path::Path;

use anyhow::{Context as _, Result};
use tracing::warn;

use assetkit::config::{self, AssetsConfig};
use assetkit::presentation::output::OutputFormat;

pub use fetch::cmd_fetch;
pub use list::cmd_list;
pub use push::{cmd_new, cmd_update};

/// Resolved configuration plus output settings shared by every command
pub struct Context {
    pub config: AssetsConfig,
    pub format: OutputFormat,
}

impl Context {
    pub fn load(explicit: Option<&Path>, json: bool) -> Result<Self> {
        let (config, warnings) =
            config::load_or_default(explicit).context("failed to load configuration")?;
        for warning in &warnings {
            warn!("{}", warning);
        }
        Ok(Self {
            config,
            format: OutputFormat::from_json_flag(json),
        })
    }
}
