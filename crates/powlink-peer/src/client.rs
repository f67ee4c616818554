use std::io::{ErrorKind, Read};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};

use bytes::Bytes;
use powlink_engine::{Trytes, MAX_DIFFICULTY};
use powlink_frame::{command, decode_payload, FrameError, FrameParser, MessageWriter, ParseEvent};
use powlink_transport::IpcStream;
use tracing::debug;

use crate::error::{ClientError, Result};

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Everything `pow_info` aggregates about a broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowInfo {
    pub server_version: String,
    pub engine_type: String,
    pub engine_version: String,
}

/// Client for a local broker endpoint.
///
/// Each request opens a fresh connection, writes one framed command, and
/// drives the shared stream parser until the correlated reply arrives or
/// the read deadline elapses. The request id wraps at `0xFF`.
#[derive(Debug)]
pub struct PowClient {
    endpoint: PathBuf,
    write_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
    next_req_id: AtomicU8,
}

impl PowClient {
    pub fn new(endpoint: impl Into<PathBuf>) -> Self {
        Self {
            endpoint: endpoint.into(),
            write_timeout: None,
            read_timeout: None,
            next_req_id: AtomicU8::new(0),
        }
    }

    /// Set the write deadline; `None` disables it.
    pub fn with_write_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set the read deadline; `None` disables it.
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// The broker endpoint this client talks to.
    pub fn endpoint(&self) -> &PathBuf {
        &self.endpoint
    }

    /// Query the broker's version string.
    pub fn server_version(&self) -> Result<String> {
        self.call_text(command::GET_SERVER_VERSION)
    }

    /// Query the configured engine's type identifier.
    pub fn engine_type(&self) -> Result<String> {
        self.call_text(command::GET_ENGINE_TYPE)
    }

    /// Query the configured engine's version string.
    pub fn engine_version(&self) -> Result<String> {
        self.call_text(command::GET_ENGINE_VERSION)
    }

    /// Query all three metadata strings in sequence.
    pub fn pow_info(&self) -> Result<PowInfo> {
        Ok(PowInfo {
            server_version: self.server_version()?,
            engine_type: self.engine_type()?,
            engine_version: self.engine_version()?,
        })
    }

    /// Run one proof-of-work job through the broker.
    ///
    /// Out-of-range difficulty fails locally, before any socket is opened.
    pub fn do_work(&self, input: &Trytes, difficulty: u8) -> Result<Trytes> {
        if difficulty > MAX_DIFFICULTY {
            return Err(ClientError::InvalidDifficulty(difficulty));
        }

        let mut data = Vec::with_capacity(1 + input.len());
        data.push(difficulty);
        data.extend_from_slice(input.as_bytes());

        let response = self.call(command::DO_WORK, &data)?;
        Trytes::from_bytes(&response)
            .map_err(|err| ClientError::InvalidResponse(err.to_string()))
    }

    fn call_text(&self, cmd: u8) -> Result<String> {
        let response = self.call(cmd, &[])?;
        Ok(String::from_utf8_lossy(&response).into_owned())
    }

    /// One request/response exchange over a fresh connection.
    fn call(&self, cmd: u8, data: &[u8]) -> Result<Bytes> {
        let req_id = self.next_req_id.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        debug!(req_id, command = command::command_name(cmd), "sending request");

        let stream = powlink_transport::connect(&self.endpoint)?;
        stream.set_write_timeout(self.write_timeout)?;
        stream.set_read_timeout(self.read_timeout)?;
        let reader_stream = stream.try_clone()?;

        let mut writer = MessageWriter::new(stream);
        writer.send(req_id, cmd, data)?;

        self.receive(reader_stream, req_id)
    }

    /// Drive the stream parser until one payload is emitted or the read
    /// deadline elapses.
    fn receive(&self, mut stream: IpcStream, req_id: u8) -> Result<Bytes> {
        let deadline = self.read_timeout.map(|timeout| Instant::now() + timeout);
        let mut parser = FrameParser::new();
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        loop {
            if let Some(deadline) = deadline {
                let now = Instant::now();
                if now >= deadline {
                    return Err(ClientError::ReceiveTimeout);
                }
                stream.set_read_timeout(Some(deadline - now))?;
            }

            let read = match stream.read(&mut chunk) {
                Ok(0) => return Err(ClientError::Frame(FrameError::ConnectionClosed)),
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    return Err(ClientError::ReceiveTimeout);
                }
                Err(err) => return Err(ClientError::Frame(FrameError::Io(err))),
            };

            for event in parser.feed(&chunk[..read]) {
                match event {
                    ParseEvent::Payload(payload) => return finish(&payload, req_id),
                    ParseEvent::ChecksumMismatch { computed, received } => {
                        return Err(ClientError::Frame(FrameError::ChecksumMismatch {
                            computed,
                            received,
                        }));
                    }
                }
            }
        }
    }
}

/// Correlate and classify one reply payload.
fn finish(payload: &[u8], req_id: u8) -> Result<Bytes> {
    let payload = decode_payload(payload)?;

    if payload.req_id != req_id {
        return Err(ClientError::CorrelationMismatch {
            expected: req_id,
            actual: payload.req_id,
        });
    }

    match payload.command {
        command::RESPONSE => Ok(payload.data),
        command::ERROR => Err(ClientError::Remote(
            String::from_utf8_lossy(&payload.data).into_owned(),
        )),
        other => Err(ClientError::UnexpectedCommand(other)),
    }
}
