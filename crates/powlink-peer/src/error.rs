use std::path::PathBuf;

use powlink_frame::FrameError;
use powlink_transport::TransportError;

/// Errors returned by the client codec. The client never retries; callers
/// decide what to do with each variant.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Difficulty outside the protocol range, caught before any socket is
    /// opened.
    #[error("difficulty out of range [0-243]: {0}")]
    InvalidDifficulty(u8),

    /// The reply's correlation token did not match the request.
    #[error("wrong req id: got 0x{actual:02X}, expected 0x{expected:02X}")]
    CorrelationMismatch { expected: u8, actual: u8 },

    /// The reply carried a command other than Response or Error.
    #[error("unexpected command in reply: 0x{0:02X}")]
    UnexpectedCommand(u8),

    /// The broker answered with an in-band Error frame.
    #[error("broker error: {0}")]
    Remote(String),

    /// The read deadline elapsed before a complete reply arrived.
    #[error("receive timeout")]
    ReceiveTimeout,

    /// The reply decoded but its contents were not usable.
    #[error("invalid response payload: {0}")]
    InvalidResponse(String),

    /// The endpoint classifies as remote and no remote adapter is installed.
    #[error("remote endpoint {0} requires a remote adapter")]
    RemoteUnsupported(String),

    /// Frame-level failure (encode, decode, checksum, stream I/O).
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Transport-level failure (connect, socket I/O).
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Errors from loading or validating the broker configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
