//! Batched, timeout-bounded access to the acquisition stream.
//!
//! [`AcquisitionClient`] owns the hand-off queue fed by the background
//! collector and exposes the read API the rest of an application consumes.
//! Every read starts by discarding whatever is already queued — the caller
//! only ever receives pulses that arrived after the read began — then pulls
//! exactly the requested number of pulses, each bounded by its own timeout
//! window.
//!
//! # Example
//! ```no_run
//! use std::time::Duration;
//! use teraflash::client::AcquisitionClient;
//! use teraflash::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let mut client = AcquisitionClient::start(&config).await?;
//!
//!     let pulses = client.read_with_timeout(10, Duration::from_secs(5)).await?;
//!     println!("collected {} pulses", pulses.len());
//!
//!     client.stop();
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::debug;

use crate::collector::{self, CollectorHandle, RawFrame};
use crate::config::Config;
use crate::data::PulseData;
use crate::error::{Result, TeraflashError};
use crate::frame;

/// Client for the pulse acquisition channel.
///
/// Not safe for concurrent readers by design: `read` takes `&mut self`, so
/// exactly one read is in flight at a time and the drain-then-pull sequence
/// cannot interleave with a second caller.
pub struct AcquisitionClient {
    queue: mpsc::Receiver<RawFrame>,
    collector: CollectorHandle,
    read_timeout: Duration,
}

impl AcquisitionClient {
    /// Connect to the configured acquisition endpoint and launch the
    /// background collector.
    ///
    /// # Errors
    /// [`TeraflashError::Io`] if the connection cannot be established.
    pub async fn start(config: &Config) -> Result<Self> {
        let addr = config.acquisition_addr();
        let stream = TcpStream::connect(&addr).await?;
        debug!(%addr, mode = ?config.acquisition_mode, "acquisition client connected");

        let (tx, queue) = mpsc::channel(config.queue_capacity);
        let collector = collector::spawn(stream, tx);

        Ok(Self {
            queue,
            collector,
            read_timeout: config.read_timeout,
        })
    }

    /// Read `num_pulses` fresh pulses with the configured per-pulse timeout.
    ///
    /// # Errors
    /// See [`read_with_timeout`](Self::read_with_timeout).
    pub async fn read(&mut self, num_pulses: usize) -> Result<Vec<PulseData>> {
        self.read_with_timeout(num_pulses, self.read_timeout).await
    }

    /// Read `num_pulses` fresh pulses, each bounded by `timeout`.
    ///
    /// Anything queued before the call is drained and discarded first, so
    /// the returned pulses all arrived after this read began. The timeout is
    /// per pulse, not cumulative: every pull gets its own window. Pulses are
    /// returned in arrival order.
    ///
    /// # Errors
    /// - [`TeraflashError::ReadTimeout`] if any single pulse fails to arrive
    ///   within `timeout`; the caller may retry on the same client.
    /// - [`TeraflashError::CollectorDead`] if the background collector has
    ///   terminated; the client must be recreated.
    /// - [`TeraflashError::MalformedFrame`] if a payload does not decode.
    pub async fn read_with_timeout(
        &mut self,
        num_pulses: usize,
        timeout: Duration,
    ) -> Result<Vec<PulseData>> {
        self.drain_stale();

        let mut pulses = Vec::with_capacity(num_pulses);
        for _ in 0..num_pulses {
            let raw = match tokio::time::timeout(timeout, self.queue.recv()).await {
                Ok(Some(raw)) => raw,
                Ok(None) => return Err(TeraflashError::CollectorDead),
                Err(_) => return Err(TeraflashError::ReadTimeout),
            };
            let (header, time, magnitude) = frame::decode_pulse(&raw.payload)?;
            pulses.push(PulseData {
                timestamp: raw.timestamp,
                header,
                time,
                magnitude,
            });
        }
        Ok(pulses)
    }

    /// Discard everything currently queued.
    fn drain_stale(&mut self) {
        let mut discarded = 0usize;
        while self.queue.try_recv().is_ok() {
            discarded += 1;
        }
        if discarded > 0 {
            debug!(discarded, "discarded stale pulses before read");
        }
    }

    /// Terminate the background collector.
    ///
    /// Idempotent; does not wait for the in-flight socket read. Also runs on
    /// drop.
    pub fn stop(&mut self) {
        self.collector.stop();
    }
}

impl Drop for AcquisitionClient {
    fn drop(&mut self) {
        self.stop();
    }
}
