//! Custom error types for the client library.
//!
//! This module defines the primary error type, `TeraflashError`, for the
//! entire crate. Using the `thiserror` crate, it provides a centralized and
//! consistent way to handle the failure modes of both instrument channels:
//!
//! - **Acquisition channel**: `ConnectionLost`, `MalformedFrame`,
//!   `ReadTimeout` and `CollectorDead`. The first two are fatal to the
//!   background collector that observed them; the collector is not restarted
//!   internally and the owning client must be torn down and recreated. The
//!   latter two are what the caller of [`crate::client::AcquisitionClient`]
//!   actually sees: `ReadTimeout` is recoverable (retry the read),
//!   `CollectorDead` signals that a new client is needed.
//! - **Command channel**: `UnparseableCommand` and `InvalidParameter` reject
//!   command text before any state change is attempted, `InputMismatch`
//!   rejects a `(command, input)` pairing of the wrong shape, and `Response`
//!   carries an error reply from the instrument.
//! - **Ambient**: `Config` wraps figment loading failures, `Io` wraps
//!   `std::io::Error` for socket setup.

use thiserror::Error;

/// Convenience alias for results using the crate error type.
pub type Result<T> = std::result::Result<T, TeraflashError>;

/// All failure modes of the TeraFlash client.
#[derive(Error, Debug)]
pub enum TeraflashError {
    /// The acquisition connection closed cleanly at a frame boundary.
    #[error("Acquisition connection lost")]
    ConnectionLost,

    /// A frame on the acquisition stream could not be decoded.
    ///
    /// The detail string carries the last length token and byte counts so a
    /// framing desync can be diagnosed from the log alone.
    #[error("Malformed frame: {detail}")]
    MalformedFrame {
        /// Diagnostic context (offending token, expected/actual byte counts).
        detail: String,
    },

    /// A single pulse did not arrive within its timeout window.
    #[error("Timed out waiting for a pulse")]
    ReadTimeout,

    /// The background collector has terminated; the client must be recreated.
    #[error("Background collector is no longer running")]
    CollectorDead,

    /// No command grammar alternative matched anywhere in the input text.
    #[error("Input string cannot be parsed to a command: {text:?}")]
    UnparseableCommand {
        /// The rejected input text.
        text: String,
    },

    /// A numeric command parameter was rejected by its validation gate.
    #[error("Invalid command parameter: {reason}")]
    InvalidParameter {
        /// Which bound or step rule was violated.
        reason: String,
    },

    /// The supplied input shape does not belong to the command.
    #[error("Input does not match command {command}")]
    InputMismatch {
        /// Wire template of the command that rejected the input.
        command: &'static str,
    },

    /// The instrument answered a command with an error reply.
    #[error("Instrument replied with an error: {0}")]
    Response(String),

    /// Configuration file or environment could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    /// Socket or stream I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TeraflashError {
    /// Whether the caller can retry the failed operation on the same client.
    ///
    /// Everything else requires either corrected input or a fresh client.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, TeraflashError::ReadTimeout)
    }
}
