//! Presentation Layer
//!
//! This layer handles:
//! - CLI argument parsing (via clap)
//! - Creating use cases with infrastructure dependencies
//! - Logging setup and output formatting (text/JSON)
//!
//! ## Structure
//!
//! - `cli` - Command-line definition
//! - `factory` - Builds stores and managers from an `AssetsConfig`
//! - `logging` - tracing subscriber setup
//! - `output` - Rendering of fetch and list results
//!
//! ## Usage
//!
//! ```ignore
//! use assetkit::presentation::factory;
//!
//! let manager = factory::create_assets_manager(&config)?;
//! let path = manager.fetch_asset("docs/vocab:1")?;
//! ```

pub mod cli;
pub mod factory;
pub mod logging;
pub mod output;

pub use cli::{Cli, Commands};
pub use factory::{create_assets_manager, create_remote_store};
