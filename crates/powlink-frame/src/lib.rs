//! ENQ-framed message codec and stream parser for the powlink protocol.
//!
//! Every message on the wire is framed as:
//! - ENQ start byte (`0x05`) and a version byte (`0x01`)
//! - A 2-byte big-endian payload length
//! - The version-1 payload (req_id, command, data length, data)
//! - A trailing CRC-8/MAXIM checksum over the payload
//!
//! The same [`FrameParser`] resynchronizes both broker and client streams;
//! partial reads and garbage between frames are handled here so callers only
//! ever see whole payloads.

pub mod codec;
pub mod command;
pub mod crc8;
pub mod error;
pub mod parser;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_payload, encode_message, Payload, FRAME_HEADER_SIZE, FRAME_VERSION, MAX_DATA_SIZE,
    PAYLOAD_HEADER_SIZE, START_BYTE,
};
pub use error::{FrameError, Result};
pub use parser::{FrameParser, ParseEvent, ParseState};
pub use reader::MessageReader;
pub use writer::MessageWriter;
