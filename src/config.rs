//! Configuration loading for the TeraFlash client.
//!
//! Strongly-typed configuration layered from two sources:
//! 1. `teraflash.toml` file (base configuration)
//! 2. Environment variables (prefixed with `TERAFLASH_`)
//!
//! Every field has a default, so an absent file yields a usable configuration
//! for the reference deployment (instrument software on localhost).
//!
//! # Example
//! ```no_run
//! use teraflash::config::Config;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! println!("Acquisition endpoint: {}", config.acquisition_addr());
//! # Ok(())
//! # }
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::logging::LogConfig;

/// Which acquisition stream the client subscribes to.
///
/// Each mode is bound to a distinct fixed TCP port on the instrument:
/// synchronous transfer on 6007, asynchronous on 6006.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcquisitionMode {
    /// Pulses delivered in lockstep with the averaging cycle (port 6007).
    Synchronous,
    /// Pulses delivered as they are acquired (port 6006).
    Asynchronous,
}

/// Top-level client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Instrument host. The reference deployment is localhost-only.
    #[serde(default = "default_host")]
    pub host: String,
    /// Which acquisition stream to subscribe to.
    #[serde(default = "default_mode")]
    pub acquisition_mode: AcquisitionMode,
    /// Command-and-control channel port.
    #[serde(default = "default_control_port")]
    pub control_port: u16,
    /// Acquisition port for [`AcquisitionMode::Synchronous`].
    #[serde(default = "default_sync_port")]
    pub sync_port: u16,
    /// Acquisition port for [`AcquisitionMode::Asynchronous`].
    #[serde(default = "default_async_port")]
    pub async_port: u16,
    /// Capacity of the collector hand-off queue. When full, the newest frame
    /// is discarded with a warning.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Per-pulse timeout for [`crate::client::AcquisitionClient::read`].
    #[serde(default = "default_read_timeout", with = "humantime_serde")]
    pub read_timeout: Duration,
    /// Timeout for one command/response exchange on the control channel.
    #[serde(default = "default_command_timeout", with = "humantime_serde")]
    pub command_timeout: Duration,
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

// Default value functions
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_mode() -> AcquisitionMode {
    AcquisitionMode::Synchronous
}

fn default_control_port() -> u16 {
    6000
}

fn default_sync_port() -> u16 {
    6007
}

fn default_async_port() -> u16 {
    6006
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_read_timeout() -> Duration {
    Duration::from_secs(20)
}

fn default_command_timeout() -> Duration {
    Duration::from_secs(5)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            acquisition_mode: default_mode(),
            control_port: default_control_port(),
            sync_port: default_sync_port(),
            async_port: default_async_port(),
            queue_capacity: default_queue_capacity(),
            read_timeout: default_read_timeout(),
            command_timeout: default_command_timeout(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `teraflash.toml` and environment variables.
    ///
    /// Environment variables override top-level fields with prefix
    /// `TERAFLASH_`. Example: `TERAFLASH_ACQUISITION_MODE=asynchronous`.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed, or an
    /// override has the wrong type.
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from("teraflash.toml")
    }

    /// Load configuration from a specific file path plus the environment.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed, or an
    /// override has the wrong type.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("TERAFLASH_"))
            .extract()
    }

    /// Acquisition port selected by the configured mode.
    #[must_use]
    pub fn acquisition_port(&self) -> u16 {
        match self.acquisition_mode {
            AcquisitionMode::Synchronous => self.sync_port,
            AcquisitionMode::Asynchronous => self.async_port,
        }
    }

    /// `host:port` address of the acquisition stream.
    #[must_use]
    pub fn acquisition_addr(&self) -> String {
        format!("{}:{}", self.host, self.acquisition_port())
    }

    /// `host:port` address of the command-and-control channel.
    #[must_use]
    pub fn control_addr(&self) -> String {
        format!("{}:{}", self.host, self.control_port)
    }
}
