//! Background frame collection.
//!
//! One collector task owns one live acquisition socket. It decodes
//! length-framed payloads continuously, stamps each with its arrival time
//! and pushes the result onto a bounded hand-off queue shared with
//! [`crate::client::AcquisitionClient`]. Running as its own task keeps the
//! socket read from ever blocking command issuance on the control channel.
//!
//! Failure policy: any I/O or framing error is fatal to this collector
//! instance. The error is logged with framing-desync context (the decoder
//! embeds the last length token and byte counts), the connection is dropped,
//! and the task exits without retrying. The dropped queue sender closes the
//! channel, which is how the owning client observes the death. Restart means
//! tearing the client down and creating a new one.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::frame;

/// One collected frame: raw payload plus arrival timestamp.
///
/// Ephemeral; exists only between the socket read and
/// [`crate::frame::decode_pulse`] in the consumer.
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Undecoded pulse payload.
    pub payload: Bytes,
    /// Arrival time, stamped right after the frame was read (UTC, monotonic
    /// with respect to read order).
    pub timestamp: DateTime<Utc>,
}

/// Handle to a running collector task.
pub struct CollectorHandle {
    task: JoinHandle<()>,
    cancel: watch::Sender<bool>,
}

impl CollectorHandle {
    /// Terminate the collector.
    ///
    /// Idempotent. Abrupt with respect to an in-flight socket read: the
    /// cancellation signal is observed between frames, and the task is
    /// aborted as a backstop rather than waited for.
    pub fn stop(&self) {
        let _ = self.cancel.send(true);
        self.task.abort();
    }

    /// Whether the collector task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn a collector over an already-connected acquisition socket.
///
/// Frames are pushed with `try_send`: when the queue is full the incoming
/// frame is discarded with a warning. The consumer drains stale entries
/// before every read, so a persistently full queue means an absent consumer,
/// not a burst.
pub fn spawn(stream: TcpStream, queue: mpsc::Sender<RawFrame>) -> CollectorHandle {
    let (cancel, cancelled) = watch::channel(false);
    let task = tokio::spawn(run(stream, queue, cancelled));
    CollectorHandle { task, cancel }
}

async fn run(stream: TcpStream, queue: mpsc::Sender<RawFrame>, mut cancelled: watch::Receiver<bool>) {
    let peer = stream.peer_addr().ok();
    let mut reader = BufReader::new(stream);
    let mut dropped: u64 = 0;
    debug!(?peer, "collector started");

    loop {
        let result = tokio::select! {
            _ = cancelled.changed() => {
                debug!(?peer, "collector cancelled");
                return;
            }
            result = frame::read_frame(&mut reader) => result,
        };

        let payload = match result {
            Ok(payload) => payload,
            Err(err) => {
                // Fatal for this collector instance; no retry, no reconnect.
                error!(?peer, %err, "acquisition stream failed, collector exiting");
                return;
            }
        };

        let raw = RawFrame {
            payload,
            timestamp: Utc::now(),
        };
        match queue.try_send(raw) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                dropped += 1;
                warn!(?peer, dropped, "hand-off queue full, discarding frame");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(?peer, "consumer gone, collector exiting");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::encode_frame;
    use tokio::io::AsyncWriteExt;
    use tokio::net::{TcpListener, TcpStream};

    /// Bind a throwaway local listener and connect a client socket to it.
    async fn socket_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).await.unwrap();
        let (server, _) = listener.accept().await.unwrap();
        (server, client)
    }

    #[tokio::test]
    async fn collects_and_stamps_frames_in_order() {
        let (mut server, client) = socket_pair().await;
        let (tx, mut rx) = mpsc::channel(8);
        let handle = spawn(client, tx);

        server.write_all(&encode_frame(b"A\r\n0.0,1.0\r\n")).await.unwrap();
        server.write_all(&encode_frame(b"B\r\n0.1,2.0\r\n")).await.unwrap();

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(&first.payload[..2], b"A\r");
        assert_eq!(&second.payload[..2], b"B\r");
        assert!(second.timestamp >= first.timestamp);

        handle.stop();
    }

    #[tokio::test]
    async fn server_close_ends_collector_and_closes_queue() {
        let (server, client) = socket_pair().await;
        let (tx, mut rx) = mpsc::channel(8);
        let _handle = spawn(client, tx);

        drop(server);

        // Channel closes once the task drops its sender.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn malformed_prefix_is_fatal() {
        let (mut server, client) = socket_pair().await;
        let (tx, mut rx) = mpsc::channel(8);
        let _handle = spawn(client, tx);

        server.write_all(b"xxxxxx").await.unwrap();

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn full_queue_drops_newest_frame_and_keeps_running() {
        let (mut server, client) = socket_pair().await;
        let (tx, mut rx) = mpsc::channel(1);
        let handle = spawn(client, tx);

        server.write_all(&encode_frame(b"A\r\n")).await.unwrap();
        server.write_all(&encode_frame(b"B\r\n")).await.unwrap();
        server.write_all(&encode_frame(b"C\r\n")).await.unwrap();

        // Give the collector time to read all three against the capacity-1
        // queue; at least the first survives, and the task stays alive.
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        let first = rx.recv().await.unwrap();
        assert_eq!(&first.payload[..], b"A\r\n");
        assert!(!handle.is_finished());

        handle.stop();
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let (_server, client) = socket_pair().await;
        let (tx, _rx) = mpsc::channel(8);
        let handle = spawn(client, tx);

        handle.stop();
        handle.stop();

        // Abort takes effect asynchronously.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(handle.is_finished());
    }
}
