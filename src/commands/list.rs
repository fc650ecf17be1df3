//! `list` command handler

use anyhow::Result;

use assetkit::presentation::factory::create_remote_store;
use assetkit::presentation::output::render_list;
use assetkit::AssetResult;

use super::Context;

pub fn cmd_list(ctx: &Context) -> Result<()> {
    let store = create_remote_store(&ctx.config)?;
    let assets = store.list()?.collect::<AssetResult<Vec<_>>>()?;
    println!("{}", render_list(ctx.format, &assets));
    Ok(())
}
