use bytes::{BufMut, Bytes, BytesMut};

use crate::crc8;
use crate::error::{FrameError, Result};

/// Frame start marker: ENQ.
pub const START_BYTE: u8 = 0x05;

/// Wire version of the inner payload layout.
pub const FRAME_VERSION: u8 = 0x01;

/// Frame header: start (1) + version (1) + frame_length (2).
pub const FRAME_HEADER_SIZE: usize = 4;

/// Payload header: req_id (1) + command (1) + data_length (2).
pub const PAYLOAD_HEADER_SIZE: usize = 4;

/// Frame overhead around the payload: start + version + length, plus the
/// trailing CRC.
pub const FRAME_OVERHEAD: usize = 5;

/// Largest `data` the 16-bit frame length field can carry.
pub const MAX_DATA_SIZE: usize = 0xFFFF - PAYLOAD_HEADER_SIZE;

/// A decoded version-1 payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Correlation token chosen by the client, echoed by the broker.
    pub req_id: u8,
    /// Command byte, see [`crate::command`].
    pub command: u8,
    /// Command-specific data.
    pub data: Bytes,
}

impl Payload {
    pub fn new(req_id: u8, command: u8, data: impl Into<Bytes>) -> Self {
        Self {
            req_id,
            command,
            data: data.into(),
        }
    }
}

/// Encode a complete wire frame for the triple.
///
/// Wire format:
/// ```text
/// ┌───────────┬─────────────┬────────────────┬──────────────────┬──────────┐
/// │ ENQ (1B)  │ Version (1B)│ Length (2B BE) │ Payload           │ CRC (1B) │
/// │ 0x05      │ 0x01        │ len(payload)   │ req_id, command,  │ MAXIM    │
/// │           │             │                │ data_len, data    │          │
/// └───────────┴─────────────┴────────────────┴──────────────────┴──────────┘
/// ```
///
/// The CRC covers exactly the payload bytes.
pub fn encode_message(req_id: u8, command: u8, data: &[u8]) -> Result<BytesMut> {
    if data.len() > MAX_DATA_SIZE {
        return Err(FrameError::MessageTooLarge {
            size: data.len(),
            max: MAX_DATA_SIZE,
        });
    }

    let payload_len = PAYLOAD_HEADER_SIZE + data.len();
    let mut buf = BytesMut::with_capacity(FRAME_OVERHEAD + payload_len);
    buf.put_u8(START_BYTE);
    buf.put_u8(FRAME_VERSION);
    buf.put_u16(payload_len as u16);
    buf.put_u8(req_id);
    buf.put_u8(command);
    buf.put_u16(data.len() as u16);
    buf.put_slice(data);

    let crc = crc8::checksum(&buf[FRAME_HEADER_SIZE..]);
    buf.put_u8(crc);

    Ok(buf)
}

/// Decode a version-1 payload as emitted by the stream parser.
pub fn decode_payload(payload: &[u8]) -> Result<Payload> {
    if payload.len() < PAYLOAD_HEADER_SIZE {
        return Err(FrameError::MalformedPayload(format!(
            "payload too short ({} bytes, need at least {PAYLOAD_HEADER_SIZE})",
            payload.len()
        )));
    }

    let declared = u16::from_be_bytes([payload[2], payload[3]]) as usize;
    let actual = payload.len() - PAYLOAD_HEADER_SIZE;
    if declared != actual {
        return Err(FrameError::MalformedPayload(format!(
            "data length mismatch (declared {declared}, got {actual})"
        )));
    }

    Ok(Payload {
        req_id: payload[0],
        command: payload[1],
        data: Bytes::copy_from_slice(&payload[PAYLOAD_HEADER_SIZE..]),
    })
}
