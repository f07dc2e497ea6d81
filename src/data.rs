//! Pulse records produced by the acquisition channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One acquisition record: device-reported header metadata plus a
/// time/magnitude sample pair sequence.
///
/// Produced once per decoded frame by
/// [`crate::frame::decode_pulse`] and immutable thereafter. `time` and
/// `magnitude` always have the same length; the trailing empty line of the
/// wire payload is never counted as a sample.
///
/// Derives `Serialize`/`Deserialize` so the embedding application can write
/// records in whatever format it chooses; this crate does not pick one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulseData {
    /// Arrival time of the frame, stamped by the collector (UTC, monotonic
    /// with respect to read order).
    pub timestamp: DateTime<Utc>,
    /// Comma-separated metadata fields from the first payload line.
    pub header: Vec<String>,
    /// Delay position of each sample, in ps.
    pub time: Vec<f64>,
    /// Signal magnitude of each sample.
    pub magnitude: Vec<f64>,
}

impl PulseData {
    /// Number of samples in this pulse.
    #[must_use]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether the pulse carries no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}
