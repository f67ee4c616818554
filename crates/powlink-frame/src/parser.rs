use bytes::{Bytes, BytesMut};

use crate::codec::{FRAME_VERSION, START_BYTE};
use crate::crc8;

/// Parser phase between two calls to [`FrameParser::feed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Scanning for the ENQ start byte.
    SearchStart,
    /// Expecting the frame version byte.
    SearchVersion,
    /// Accumulating the two frame length octets.
    SearchLength,
    /// Accumulating `frame_length` payload bytes.
    SearchData,
    /// Expecting the trailing checksum byte.
    SearchCrc,
}

/// Outcome emitted while feeding bytes through the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEvent {
    /// A complete payload whose checksum matched.
    Payload(Bytes),
    /// A complete frame whose checksum did not match. The parser has already
    /// resynchronized to start-search.
    ChecksumMismatch { computed: u8, received: u8 },
}

/// Resumable push-driven parser over an unframed byte stream.
///
/// Feed arbitrary chunks; complete frames are emitted as events, partial
/// state is retained across calls. Garbage between frames is skipped while
/// scanning for the next ENQ byte. A stray ENQ inside the payload region is
/// plain data.
#[derive(Debug)]
pub struct FrameParser {
    state: ParseState,
    /// None until the first length octet arrives, then the high octet until
    /// the low octet completes it.
    frame_length: Option<u16>,
    payload: BytesMut,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::SearchStart,
            frame_length: None,
            payload: BytesMut::new(),
        }
    }

    /// Current phase, for diagnostics and tests.
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Push a chunk through the state machine, collecting every event it
    /// completes. The whole chunk is always consumed; multiple frames in one
    /// chunk yield multiple events.
    pub fn feed(&mut self, input: &[u8]) -> Vec<ParseEvent> {
        let mut events = Vec::new();
        let mut idx = 0;

        while idx < input.len() {
            match self.state {
                ParseState::SearchStart => {
                    if input[idx] == START_BYTE {
                        self.frame_length = None;
                        self.payload.clear();
                        self.state = ParseState::SearchVersion;
                    }
                    idx += 1;
                }

                ParseState::SearchVersion => {
                    // A non-matching byte is consumed, not re-examined.
                    self.state = if input[idx] == FRAME_VERSION {
                        ParseState::SearchLength
                    } else {
                        ParseState::SearchStart
                    };
                    idx += 1;
                }

                ParseState::SearchLength => {
                    match self.frame_length {
                        None => self.frame_length = Some(u16::from(input[idx]) << 8),
                        Some(high) => {
                            self.frame_length = Some(high | u16::from(input[idx]));
                            self.state = ParseState::SearchData;
                        }
                    }
                    idx += 1;
                }

                ParseState::SearchData => {
                    let frame_length = usize::from(self.frame_length.unwrap_or(0));
                    let missing = frame_length - self.payload.len();
                    let available = input.len() - idx;
                    if available >= missing {
                        self.payload.extend_from_slice(&input[idx..idx + missing]);
                        idx += missing;
                        self.state = ParseState::SearchCrc;
                    } else {
                        self.payload.extend_from_slice(&input[idx..]);
                        idx = input.len();
                    }
                }

                ParseState::SearchCrc => {
                    let computed = crc8::checksum(&self.payload);
                    let received = input[idx];
                    idx += 1;
                    if computed == received {
                        events.push(ParseEvent::Payload(
                            std::mem::take(&mut self.payload).freeze(),
                        ));
                    } else {
                        events.push(ParseEvent::ChecksumMismatch { computed, received });
                    }
                    self.frame_length = None;
                    self.state = ParseState::SearchStart;
                }
            }
        }

        events
    }
}
