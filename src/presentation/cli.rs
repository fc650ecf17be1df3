//! CLI Argument Parsing
//!
//! This module defines the CLI interface using clap.
//!
//! ## Design Notes
//!
//! - Global flags (--config, --json, --verbose) are inherited by all subcommands
//! - `new` and `update` push to the configured remote; `fetch` works with or
//!   without one

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// assetkit - versioned assets in object stores with a local cache
#[derive(Parser, Debug)]
#[command(name = "assetkit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./assetkit.toml, then the user config)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format for CI
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Push the first version of a new asset
    New {
        /// File or directory to push
        path: PathBuf,

        /// Asset name, e.g. `category/name`
        name: String,

        /// Compute the version and validate the asset without uploading
        #[arg(long)]
        dry_run: bool,
    },

    /// Push a new version of an existing asset
    Update {
        /// File or directory to push
        path: PathBuf,

        /// Asset name, e.g. `category/name`
        name: String,

        /// Start a new major version
        #[arg(long, conflicts_with = "major")]
        bump_major: bool,

        /// Bump the minor version within this major
        #[arg(long, value_name = "MAJOR")]
        major: Option<String>,

        /// Compute the version and validate the asset without uploading
        #[arg(long)]
        dry_run: bool,
    },

    /// List remote assets and their versions
    List,

    /// Fetch an asset and print its local path
    Fetch {
        /// Asset specification, e.g. `docs/vocab:1[part.txt]`
        spec: String,

        /// Print version, origin and remote objects too
        #[arg(long)]
        info: bool,

        /// Download again even if the cached copy is valid
        #[arg(long)]
        download: bool,
    },
}
