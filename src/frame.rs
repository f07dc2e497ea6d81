//! Frame codec for the acquisition stream.
//!
//! Wire format, per TCP connection:
//!
//! ```text
//! frame   = 6 ASCII decimal digits (payload length, zero-padded) || payload
//! payload = header_line CRLF (data_line CRLF)*
//! ```
//!
//! The header line is comma-separated metadata; each data line is
//! `"<time>,<magnitude>"`. Splitting the payload on CRLF leaves one empty
//! trailing element from the final terminator, which is dropped, so the
//! sample count is `lines - header - 1`.
//!
//! [`read_frame`] does the I/O half (length prefix plus exact-length body);
//! [`decode_pulse`] is a pure function over the payload bytes. Keeping them
//! separate lets the collector stamp arrival times between the two steps and
//! lets tests drive the decoder without a socket.

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{Result, TeraflashError};

/// Byte length of the ASCII frame-length prefix.
pub const LENGTH_PREFIX_LEN: usize = 6;

/// Read one length-framed payload from the acquisition stream.
///
/// Returns the raw payload bytes of exactly the declared length.
///
/// # Errors
/// - [`TeraflashError::ConnectionLost`] if the stream ends cleanly at a
///   frame boundary (zero bytes of the next prefix).
/// - [`TeraflashError::MalformedFrame`] if the prefix is not 6 ASCII digits,
///   or the connection closes before the declared payload arrives. The
///   detail string carries the offending token and byte counts.
/// - [`TeraflashError::Io`] for transport failures.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Bytes> {
    let mut prefix = [0u8; LENGTH_PREFIX_LEN];
    match reader.read_exact(&mut prefix).await {
        Ok(_) => {}
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(TeraflashError::ConnectionLost);
        }
        Err(err) => return Err(err.into()),
    }

    let length = decode_length(&prefix)?;

    let mut payload = vec![0u8; length];
    match reader.read_exact(&mut payload).await {
        Ok(_) => {}
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(TeraflashError::MalformedFrame {
                detail: format!(
                    "connection closed inside a frame body: declared {length} bytes \
                     (prefix {:?})",
                    String::from_utf8_lossy(&prefix)
                ),
            });
        }
        Err(err) => return Err(err.into()),
    }

    Ok(Bytes::from(payload))
}

/// Decode the 6-ASCII-digit length prefix.
fn decode_length(prefix: &[u8; LENGTH_PREFIX_LEN]) -> Result<usize> {
    if !prefix.iter().all(u8::is_ascii_digit) {
        return Err(TeraflashError::MalformedFrame {
            detail: format!(
                "length prefix {:?} is not {LENGTH_PREFIX_LEN} ASCII digits",
                String::from_utf8_lossy(prefix)
            ),
        });
    }
    // 6 digits cannot overflow usize; parse via str for clarity.
    let text = std::str::from_utf8(prefix).map_err(|_| TeraflashError::MalformedFrame {
        detail: "length prefix is not UTF-8".to_string(),
    })?;
    text.parse::<usize>().map_err(|_| TeraflashError::MalformedFrame {
        detail: format!("length prefix {text:?} is not a number"),
    })
}

/// Decode one pulse payload into `(header, time, magnitude)`.
///
/// Pure and synchronous; safe to call from any thread.
///
/// # Errors
/// [`TeraflashError::MalformedFrame`] if the payload is not UTF-8 or a data
/// line does not split into exactly two numeric fields.
pub fn decode_pulse(payload: &[u8]) -> Result<(Vec<String>, Vec<f64>, Vec<f64>)> {
    let text = std::str::from_utf8(payload).map_err(|err| TeraflashError::MalformedFrame {
        detail: format!("payload is not UTF-8: {err}"),
    })?;

    let lines: Vec<&str> = text.split("\r\n").collect();
    let header: Vec<String> = lines[0].split(',').map(str::to_string).collect();

    // The payload ends in CRLF, so the split leaves one empty trailing
    // element that is not a sample.
    let data_lines = if lines.len() > 1 {
        &lines[1..lines.len() - 1]
    } else {
        &[]
    };

    let mut time = Vec::with_capacity(data_lines.len());
    let mut magnitude = Vec::with_capacity(data_lines.len());
    for line in data_lines {
        let (t, m) = decode_sample(line)?;
        time.push(t);
        magnitude.push(m);
    }

    Ok((header, time, magnitude))
}

/// Split one `"<time>,<magnitude>"` data line.
fn decode_sample(line: &str) -> Result<(f64, f64)> {
    let mut fields = line.split(',');
    let (Some(t), Some(m), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(TeraflashError::MalformedFrame {
            detail: format!("data line {line:?} does not have exactly two fields"),
        });
    };
    let t: f64 = t.parse().map_err(|_| TeraflashError::MalformedFrame {
        detail: format!("time field {t:?} is not a number"),
    })?;
    let m: f64 = m.parse().map_err(|_| TeraflashError::MalformedFrame {
        detail: format!("magnitude field {m:?} is not a number"),
    })?;
    Ok((t, m))
}

/// Encode a payload into a wire frame (length prefix plus body).
///
/// The inverse of [`read_frame`]; used by tests and simulators. The payload
/// length must fit the 6-digit prefix (under 1,000,000 bytes).
#[must_use]
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let mut frame = format!("{:06}", payload.len()).into_bytes();
    frame.extend_from_slice(payload);
    frame
}
