// src/logging.rs

//! Logging setup for `taskgraph` using `tracing` + `tracing-subscriber`.
//!
//! The filter comes from, in order:
//! 1. `--log-level` CLI flag
//! 2. `TASKGRAPH_LOG`, which takes a bare level (`debug`) or full
//!    `EnvFilter` directives (`taskgraph::engine=trace,info`)
//! 3. `info`
//!
//! Logs go to STDERR. Stdout carries progress lines, DOT and dry-run output.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "TASKGRAPH_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(lvl) => EnvFilter::new(directive_for(lvl)),
        None => filter_from_value(std::env::var(LOG_ENV).ok().as_deref()),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))?;

    Ok(())
}

fn directive_for(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

/// Build a filter from a `TASKGRAPH_LOG` value. Unset, blank or unparsable
/// values fall back to `info`.
pub fn filter_from_value(value: Option<&str>) -> EnvFilter {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

#[cfg(test)]
mod tests {
    use tracing::level_filters::LevelFilter;

    use super::*;

    #[test]
    fn bare_level_and_directives_are_accepted() {
        assert_eq!(
            filter_from_value(Some("debug")).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(
            filter_from_value(Some("taskgraph::engine=trace,warn")).max_level_hint(),
            Some(LevelFilter::TRACE)
        );
    }

    #[test]
    fn missing_or_blank_value_defaults_to_info() {
        assert_eq!(filter_from_value(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(
            filter_from_value(Some("   ")).max_level_hint(),
            Some(LevelFilter::INFO)
        );
    }

    #[test]
    fn cli_levels_map_to_lowercase_directives() {
        assert_eq!(directive_for(LogLevel::Warn), "warn");
        assert_eq!(directive_for(LogLevel::Trace), "trace");
    }
}
