//! tracing subscriber setup for the binary
//!
//! `ASSETKIT_LOG` takes an `EnvFilter` directive and wins over `-v`.
//! Logs go to stderr so stdout stays parseable.

use std::io;

use is_terminal::IsTerminal;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "ASSETKIT_LOG";

/// Filter for `-v` counts: warn, info, debug, trace
pub fn filter_for(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(level_for(verbose)))
}

fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber; later calls are no-ops
pub fn init(verbose: u8, json: bool) {
    let filter = filter_for(verbose);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.with_ansi(io::stderr().is_terminal()).try_init()
    };
    if let Err(err) = result {
        tracing::debug!(error = %err, "tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(level_for(0), "warn");
        assert_eq!(level_for(1), "info");
        assert_eq!(level_for(2), "debug");
        assert_eq!(level_for(9), "trace");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(0, false);
        init(2, true);
    }
}
