//! Tracing setup for the client library.
//!
//! Structured, async-aware logging built on `tracing` and
//! `tracing-subscriber`. The collector task logs framing-desync context at
//! error level before it exits, dropped frames at warn, and lifecycle events
//! at debug, so the log alone is enough to reconstruct why an acquisition
//! session ended.
//!
//! The library itself only emits events; installing a subscriber is the
//! embedding application's call. [`init`] is a convenience for binaries and
//! examples that want the configured defaults.
//!
//! # Example
//! ```no_run
//! use teraflash::logging::{self, LogConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! logging::init(&LogConfig::default())?;
//! tracing::info!("client starting");
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Output format for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed format with colors (for development)
    Pretty,
    /// Compact format without colors (for production)
    Compact,
    /// JSON format for structured logging (for log aggregation)
    Json,
}

/// Logging section of the client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level directive (trace, debug, info, warn, error). Full
    /// `EnvFilter` syntax is accepted, e.g. `info,teraflash=debug`.
    #[serde(default = "default_level")]
    pub level: String,
    /// Output format.
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> OutputFormat {
    OutputFormat::Compact
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

/// Install a global subscriber from the given configuration.
///
/// The `TERAFLASH_LOG_LEVEL` environment variable overrides the configured level
/// directive, using the same syntax.
///
/// # Errors
/// Returns an error if the level directive cannot be parsed or a global
/// subscriber is already installed.
pub fn init(config: &LogConfig) -> anyhow::Result<()> {
    let filter = match std::env::var("TERAFLASH_LOG_LEVEL") {
        Ok(directive) => EnvFilter::try_new(directive)?,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };

    let fmt_layer = match config.format {
        OutputFormat::Pretty => tracing_subscriber::fmt::layer().pretty().boxed(),
        OutputFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_ansi(false)
            .boxed(),
        OutputFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_log_config_is_compact_info() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, OutputFormat::Compact);
    }

    #[test]
    #[serial]
    fn rejects_garbage_level_directive() {
        std::env::remove_var("TERAFLASH_LOG_LEVEL");
        let config = LogConfig {
            level: "not-a-level=".to_string(),
            format: OutputFormat::Compact,
        };
        assert!(init(&config).is_err());
    }
}
