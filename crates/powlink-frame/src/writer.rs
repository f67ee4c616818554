use std::io::{ErrorKind, Write};

use crate::codec::encode_message;
use crate::error::{FrameError, Result};

/// Writes complete framed messages to any `Write` stream.
pub struct MessageWriter<T> {
    inner: T,
}

impl<T: Write> MessageWriter<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Encode and send one message (blocking).
    pub fn send(&mut self, req_id: u8, command: u8, data: &[u8]) -> Result<()> {
        let wire = encode_message(req_id, command, data)?;

        let mut offset = 0usize;
        while offset < wire.len() {
            match self.inner.write(&wire[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
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

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::codec::MAX_DATA_SIZE;
    use crate::command;
    use crate::parser::{FrameParser, ParseEvent};

    #[test]
    fn written_bytes_parse_back() {
        let mut writer = MessageWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.send(0x11, command::RESPONSE, b"pong").unwrap();

        let wire = writer.into_inner().into_inner();
        let events = FrameParser::new().feed(&wire);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], ParseEvent::Payload(p) if &p[4..] == b"pong"));
    }

    #[test]
    fn oversized_message_is_refused_before_any_write() {
        let mut writer = MessageWriter::new(Cursor::new(Vec::<u8>::new()));
        let data = vec![0u8; MAX_DATA_SIZE + 1];
        let err = writer.send(1, command::DO_WORK, &data).unwrap_err();
        assert!(matches!(err, FrameError::MessageTooLarge { .. }));
        assert!(writer.into_inner().into_inner().is_empty());
    }

    #[test]
    fn zero_length_write_is_connection_closed() {
        struct ZeroWriter;
        impl Write for ZeroWriter {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Ok(0)
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut writer = MessageWriter::new(ZeroWriter);
        let err = writer.send(1, command::RESPONSE, b"x").unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn interrupted_write_retries() {
        struct InterruptedOnce {
            interrupted: bool,
            data: Vec<u8>,
        }
        impl Write for InterruptedOnce {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                if !self.interrupted {
                    self.interrupted = true;
                    return Err(std::io::Error::from(ErrorKind::Interrupted));
                }
                self.data.extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut writer = MessageWriter::new(InterruptedOnce {
            interrupted: false,
            data: Vec::new(),
        });
        writer.send(2, command::RESPONSE, b"retry").unwrap();
        assert!(!writer.into_inner().data.is_empty());
    }
}
