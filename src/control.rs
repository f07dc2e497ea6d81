//! Command-and-control channel client.
//!
//! One synchronous request/response exchange at a time over one TCP
//! connection: serialize a validated command, write the line, read one
//! reply line bounded by the command timeout, classify it. `send` takes
//! `&mut self`, so a second in-flight command on the same connection is
//! unrepresentable.
//!
//! The transport is type-erased behind [`ControlIO`] so tests can drive the
//! client over an in-memory duplex stream instead of a socket.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

use crate::command::{self, Command, CommandInput, CommandResponse, ResponseStatus};
use crate::config::Config;
use crate::error::{Result, TeraflashError};

/// Trait alias for the control-channel transport.
///
/// Implemented by `tokio::net::TcpStream` (real instrument) and
/// `tokio::io::DuplexStream` (tests).
pub trait ControlIO: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> ControlIO for T {}

/// Client for the command channel.
pub struct ControlClient {
    stream: BufReader<Box<dyn ControlIO>>,
    timeout: Duration,
}

impl ControlClient {
    /// Connect to the configured control endpoint.
    ///
    /// # Errors
    /// [`TeraflashError::Io`] if the connection cannot be established.
    pub async fn connect(config: &Config) -> Result<Self> {
        let addr = config.control_addr();
        let stream = TcpStream::connect(&addr).await?;
        debug!(%addr, "control client connected");
        Ok(Self::from_stream(Box::new(stream), config.command_timeout))
    }

    /// Build a client over an already-open transport.
    #[must_use]
    pub fn from_stream(stream: Box<dyn ControlIO>, timeout: Duration) -> Self {
        Self {
            stream: BufReader::new(stream),
            timeout,
        }
    }

    /// Send one command and classify the instrument's reply.
    ///
    /// # Errors
    /// - [`TeraflashError::InputMismatch`] if the input shape does not
    ///   belong to the command (nothing is written in that case).
    /// - [`TeraflashError::ReadTimeout`] if no reply line arrives in time.
    /// - [`TeraflashError::ConnectionLost`] if the instrument closed the
    ///   connection.
    pub async fn send(
        &mut self,
        command: Command,
        input: &CommandInput,
    ) -> Result<CommandResponse> {
        let wire = command::serialize(command, input)?;
        debug!(command = %wire, "sending control command");

        self.stream
            .get_mut()
            .write_all(format!("{wire}\r\n").as_bytes())
            .await?;

        let mut line = String::new();
        let read = tokio::time::timeout(self.timeout, self.stream.read_line(&mut line))
            .await
            .map_err(|_| TeraflashError::ReadTimeout)??;
        if read == 0 {
            return Err(TeraflashError::ConnectionLost);
        }

        let response = CommandResponse::classify(&line);
        debug!(status = ?response.status, payload = %response.payload, "control reply");
        Ok(response)
    }

    /// Send one command and require an accepting reply.
    ///
    /// # Errors
    /// As [`send`](Self::send), plus [`TeraflashError::Response`] when the
    /// instrument answers `ERROR`.
    pub async fn send_expect_ok(
        &mut self,
        command: Command,
        input: &CommandInput,
    ) -> Result<CommandResponse> {
        let response = self.send(command, input).await?;
        if response.status == ResponseStatus::Error {
            return Err(TeraflashError::Response(response.payload));
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::LaserSetInput;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    const TIMEOUT: Duration = Duration::from_millis(200);

    #[tokio::test]
    async fn writes_wire_text_and_classifies_ok_reply() {
        let (mut instrument, transport) = tokio::io::duplex(256);
        let mut client = ControlClient::from_stream(Box::new(transport), TIMEOUT);

        let instrument_task = tokio::spawn(async move {
            let mut buf = [0u8; 64];
            let n = instrument.read(&mut buf).await.unwrap();
            instrument.write_all(b"OK\r\n").await.unwrap();
            (instrument, String::from_utf8_lossy(&buf[..n]).to_string())
        });

        let input = CommandInput::LaserSet(LaserSetInput::new(45.5).unwrap());
        let response = client.send(Command::LaserSet, &input).await.unwrap();
        assert_eq!(response.status, ResponseStatus::Ok);

        let (_instrument, written) = instrument_task.await.unwrap();
        assert_eq!(written, "LASER : SET 45.5\r\n");
    }

    #[tokio::test]
    async fn error_reply_becomes_typed_failure_on_expect_ok() {
        let (mut instrument, transport) = tokio::io::duplex(256);
        let mut client = ControlClient::from_stream(Box::new(transport), TIMEOUT);

        let instrument_task = tokio::spawn(async move {
            let mut buf = [0u8; 64];
            let _ = instrument.read(&mut buf).await.unwrap();
            instrument.write_all(b"ERROR shaker running\r\n").await.unwrap();
            instrument
        });

        let err = client
            .send_expect_ok(Command::AcquisitionStop, &CommandInput::None)
            .await
            .unwrap_err();
        match err {
            TeraflashError::Response(payload) => assert_eq!(payload, "shaker running"),
            other => panic!("unexpected error: {other:?}"),
        }
        let _ = instrument_task.await.unwrap();
    }

    #[tokio::test]
    async fn silent_instrument_times_out() {
        let (_instrument, transport) = tokio::io::duplex(256);
        let mut client = ControlClient::from_stream(Box::new(transport), Duration::from_millis(20));

        let err = client
            .send(Command::SystemTellStatus, &CommandInput::None)
            .await
            .unwrap_err();
        assert!(matches!(err, TeraflashError::ReadTimeout));
    }

    #[tokio::test]
    async fn closed_connection_is_connection_lost() {
        let (mut instrument, transport) = tokio::io::duplex(256);
        let mut client = ControlClient::from_stream(Box::new(transport), TIMEOUT);

        // The instrument reads the command, then closes without replying.
        let instrument_task = tokio::spawn(async move {
            let mut buf = [0u8; 64];
            let _ = instrument.read(&mut buf).await.unwrap();
            drop(instrument);
        });

        let err = client
            .send(Command::SystemStop, &CommandInput::None)
            .await
            .unwrap_err();
        assert!(matches!(err, TeraflashError::ConnectionLost));
        instrument_task.await.unwrap();
    }

    #[tokio::test]
    async fn mismatched_input_writes_nothing() {
        let (mut instrument, transport) = tokio::io::duplex(256);
        let mut client = ControlClient::from_stream(Box::new(transport), TIMEOUT);

        let input = CommandInput::LaserSet(LaserSetInput::new(1.0).unwrap());
        let err = client.send(Command::SystemStop, &input).await.unwrap_err();
        assert!(matches!(err, TeraflashError::InputMismatch { .. }));

        // Nothing was written to the transport.
        let mut buf = [0u8; 8];
        let pending = tokio::time::timeout(Duration::from_millis(20), instrument.read(&mut buf));
        assert!(pending.await.is_err());
    }
}
