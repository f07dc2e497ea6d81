//! Laser and acquisition substates.

use serde::{Deserialize, Serialize};

/// Laser emission status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaserStatus {
    /// Emission off.
    Off,
    /// Emission on.
    On,
}

/// Pulse data transfer mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferStatus {
    /// Continuous transfer while averaging.
    Sliding,
    /// Transfer only after complete averaging.
    Block,
}

/// Trans-impedance amplifier sensitivity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TiaStatus {
    /// Full sensitivity.
    Full,
    /// Medium sensitivity.
    Atn1,
    /// Smallest sensitivity.
    Atn2,
}

/// Shaker status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcquisitionStatus {
    /// Shaker stopped.
    Off,
    /// Shaker running.
    On,
}

/// Laser subsystem state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaserState {
    /// Emission status.
    pub status: LaserStatus,
    /// Pump current in percent, 0..=100.
    pub pump_current: f64,
    /// Pulse transfer mode.
    pub transfer_status: TransferStatus,
    /// TIA sensitivity level.
    pub tia_status: TiaStatus,
}

impl Default for LaserState {
    fn default() -> Self {
        Self {
            status: LaserStatus::Off,
            pump_current: 50.0,
            transfer_status: TransferStatus::Block,
            tia_status: TiaStatus::Atn1,
        }
    }
}

/// Pulse acquisition (shaker) state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionState {
    /// Shaker status.
    pub status: AcquisitionStatus,
    /// Start position of pulse acquisition in ps, 0..=3000 on the 0.1 grid.
    pub start_position: f64,
    /// Measuring range in ps, 20..=200.
    pub measuring_range: i64,
    /// Number of averages, 1..=30000.
    pub num_averages: i64,
}

impl Default for AcquisitionState {
    fn default() -> Self {
        Self {
            status: AcquisitionStatus::Off,
            start_position: 0.0,
            measuring_range: 100,
            num_averages: 1,
        }
    }
}
