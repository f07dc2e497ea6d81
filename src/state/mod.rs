//! Client-side model of the instrument state.
//!
//! [`SystemState`] is a plain value: created once per session with
//! [`SystemState::default`], transformed copy-on-write by
//! [`machine::apply`] on every command, and discarded at session end. Field
//! values only ever enter through validated command inputs, so the bounds
//! documented on the fields hold by construction.

pub mod laser;
pub mod machine;

pub use laser::{
    AcquisitionState, AcquisitionStatus, LaserState, LaserStatus, TiaStatus, TransferStatus,
};
pub use machine::{apply, CommandResult, StatusReport, Transition};

use serde::{Deserialize, Serialize};

/// Whether the measurement system as a whole is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemStatus {
    /// Shut down (laser off, shaker stopped).
    Off,
    /// Running.
    On,
}

/// Snapshot of everything the client tracks about the instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemState {
    /// Overall system status.
    pub status: SystemStatus,
    /// Laser subsystem state.
    pub laser: LaserState,
    /// Pulse acquisition (shaker) state.
    pub acquisition: AcquisitionState,
}

impl Default for SystemState {
    fn default() -> Self {
        Self {
            status: SystemStatus::On,
            laser: LaserState::default(),
            acquisition: AcquisitionState::default(),
        }
    }
}
