/// Errors that can occur during message encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload exceeds the 16-bit frame length field.
    #[error("message too large ({size} bytes of data, max {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// The inner payload does not match its declared layout.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The frame checksum did not match the payload.
    #[error("wrong checksum (computed 0x{computed:02X}, received 0x{received:02X})")]
    ChecksumMismatch { computed: u8, received: u8 },

    /// An I/O error occurred while reading or writing messages.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete message was received.
    #[error("connection closed (incomplete message)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
