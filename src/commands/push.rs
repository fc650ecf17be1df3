//! `new` and `update` command handlers

use std::path::Path;

use anyhow::{Context as _, Result};

use assetkit::presentation::factory::create_remote_store;
use assetkit::presentation::output::render_pushed;
use assetkit::PushOptions;

use super::Context;

/// Execute the new command
pub fn cmd_new(ctx: &Context, path: &Path, name: &str, dry_run: bool) -> Result<()> {
    let store = create_remote_store(&ctx.config)?;
    let version = store
        .create_with(path, name, &PushOptions { dry_run })
        .with_context(|| format!("failed to create asset '{}'", name))?;
    println!(
        "{}",
        render_pushed(
            ctx.format,
            name,
            &version,
            &store.remote_objects(name, &version),
            dry_run
        )
    );
    Ok(())
}

/// Execute the update command
pub fn cmd_update(
    ctx: &Context,
    path: &Path,
    name: &str,
    bump_major: bool,
    major: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let store = create_remote_store(&ctx.config)?;
    let version = store
        .update_with(path, name, bump_major, major, &PushOptions { dry_run })
        .with_context(|| format!("failed to update asset '{}'", name))?;
    println!(
        "{}",
        render_pushed(
            ctx.format,
            name,
            &version,
            &store.remote_objects(name, &version),
            dry_run
        )
    );
    Ok(())
}
