//! # TeraFlash Pro Client Library
//!
//! Client for the Toptica TeraFlash Pro terahertz pulse measurement system.
//! The instrument speaks two independent protocols over TCP, and this crate
//! covers both:
//!
//! - a **streaming acquisition channel** emitting length-framed pulse
//!   records, consumed through a background collector and a batched,
//!   timeout-bounded read API;
//! - a **command-and-control channel** whose vocabulary is a fixed set of
//!   ASCII command strings with embedded, bounds-checked numeric parameters.
//!
//! How an application schedules measurements or persists pulse records is
//! out of scope; [`data::PulseData`] is plain serializable data precisely so
//! callers can do that however they like.
//!
//! ## Crate Structure
//!
//! - **`client`**: [`client::AcquisitionClient`], the batch-read front end of
//!   the acquisition channel (start / read / stop).
//! - **`collector`**: the background task that owns the acquisition socket,
//!   decodes frames and feeds the hand-off queue.
//! - **`frame`**: the frame codec — length-prefix framing and the pulse
//!   payload decoder. Pure apart from the socket read.
//! - **`command`**: the control vocabulary — [`command::Command`], validated
//!   input types, serialization and reply classification.
//! - **`grammar`**: free-text parser for the command vocabulary.
//! - **`state`**: client-side instrument state model and the pure command
//!   transition function [`state::apply`].
//! - **`control`**: [`control::ControlClient`], one-command-at-a-time
//!   request/response over the control socket.
//! - **`oem`**: the OEM firmware's parallel `RC-`/`RD-` vocabulary.
//! - **`config`**: figment-based configuration (TOML file plus `TERAFLASH_`
//!   environment overrides).
//! - **`logging`**: tracing subscriber setup.
//! - **`error`**: the crate-wide [`error::TeraflashError`] taxonomy.
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//! use teraflash::client::AcquisitionClient;
//! use teraflash::command::{Command, CommandInput};
//! use teraflash::config::Config;
//! use teraflash::control::ControlClient;
//! use teraflash::state::{self, SystemState};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!
//!     // Drive the instrument over the control channel, mirroring its state.
//!     let mut control = ControlClient::connect(&config).await?;
//!     let state = SystemState::default();
//!     let transition = state::apply(&state, Command::AcquisitionStart, &CommandInput::None)?;
//!     control.send_expect_ok(Command::AcquisitionStart, &CommandInput::None).await?;
//!     let state = transition.state;
//!
//!     // Collect fresh pulses from the acquisition channel.
//!     let mut client = AcquisitionClient::start(&config).await?;
//!     let pulses = client.read_with_timeout(100, Duration::from_secs(5)).await?;
//!     println!("collected {} pulses, laser state {:?}", pulses.len(), state.laser.status);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod collector;
pub mod command;
pub mod config;
pub mod control;
pub mod data;
pub mod error;
pub mod frame;
pub mod grammar;
pub mod logging;
pub mod oem;
pub mod state;

pub use client::AcquisitionClient;
pub use command::{Command, CommandInput};
pub use config::{AcquisitionMode, Config};
pub use data::PulseData;
pub use error::{Result, TeraflashError};
