//! `fetch` command handler

use anyhow::Result;

use assetkit::presentation::factory::create_assets_manager;
use assetkit::presentation::output::render_fetch;
use assetkit::FetchOptions;

use super::Context;

/// Execute the fetch command
///
/// Prints the local path so the command composes with shell substitution.
pub fn cmd_fetch(ctx: &Context, spec: &str, info: bool, download: bool) -> Result<()> {
    let manager = create_assets_manager(&ctx.config)?;
    let options = FetchOptions {
        force_download: download,
    };
    let fetched = manager.fetch_asset_with(spec, &options)?;
    println!("{}", render_fetch(ctx.format, &fetched, info));
    Ok(())
}
