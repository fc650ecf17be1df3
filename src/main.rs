//! assetkit CLI - versioned assets in object stores with a local cache
//!
//! Usage: assetkit <COMMAND>
//!
//! Commands:
//!   new     Push the first version of a new asset
//!   update  Push a new version of an existing asset
//!   list    List remote assets and their versions
//!   fetch   Fetch an asset and print its local path

mod commands;

use anyhow::Result;
use clap::Parser;

use assetkit::presentation::{logging, Cli, Commands};
use commands::{cmd_fetch, cmd_list, cmd_new, cmd_update, Context};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json);

    let ctx = Context::load(cli.config.as_deref(), cli.json)?;

    match cli.command {
        Commands::New {
            path,
            name,
            dry_run,
        } => cmd_new(&ctx, &path, &name, dry_run),
        Commands::Update {
            path,
            name,
            bump_major,
            major,
            dry_run,
        } => cmd_update(&ctx, &path, &name, bump_major, major.as_deref(), dry_run),
        Commands::List => cmd_list(&ctx),
        Commands::Fetch {
            spec,
            info,
            download,
        } => cmd_fetch(&ctx, &spec, info, download),
    }
}
