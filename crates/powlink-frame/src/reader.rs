use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use bytes::Bytes;

use crate::error::{FrameError, Result};
use crate::parser::{FrameParser, ParseEvent};

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete parser events from any `Read` stream.
///
/// Handles partial reads internally; callers observe whole frames (or
/// checksum mismatches) in arrival order.
pub struct MessageReader<T> {
    inner: T,
    parser: FrameParser,
    pending: VecDeque<ParseEvent>,
}

impl<T: Read> MessageReader<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            parser: FrameParser::new(),
            pending: VecDeque::new(),
        }
    }

    /// Next parser event (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn next_event(&mut self) -> Result<ParseEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(event);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.pending.extend(self.parser.feed(&chunk[..read]));
        }
    }

    /// Next complete payload (blocking), surfacing a checksum mismatch as an
    /// error. The parser has already resynchronized when that error returns.
    pub fn read_payload(&mut self) -> Result<Bytes> {
        match self.next_event()? {
            ParseEvent::Payload(payload) => Ok(payload),
            ParseEvent::ChecksumMismatch { computed, received } => {
                Err(FrameError::ChecksumMismatch { computed, received })
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}
