//! Command bytes of the version-1 payload.
//!
//! The numeric values are part of the wire contract and must not change.

/// S → C: free-text message to the client.
pub const NOTIFICATION: u8 = 0x01;

/// S → C: successful reply, data carries the result bytes.
pub const RESPONSE: u8 = 0x02;

/// S → C: failure reply, data carries a UTF-8 message.
pub const ERROR: u8 = 0x03;

/// C → S: query the broker's version string.
pub const GET_SERVER_VERSION: u8 = 0x04;

/// C → S: query the configured engine's type identifier.
pub const GET_ENGINE_TYPE: u8 = 0x05;

/// C → S: query the configured engine's version string.
pub const GET_ENGINE_VERSION: u8 = 0x06;

/// C → S: run the proof-of-work engine. `data[0]` is the difficulty,
/// `data[1..]` the work input.
pub const DO_WORK: u8 = 0x07;

/// Returns a human-readable name for a command byte.
pub fn command_name(command: u8) -> &'static str {
    match command {
        NOTIFICATION => "NOTIFICATION",
        RESPONSE => "RESPONSE",
        ERROR => "ERROR",
        GET_SERVER_VERSION => "GET_SERVER_VERSION",
        GET_ENGINE_TYPE => "GET_ENGINE_TYPE",
        GET_ENGINE_VERSION => "GET_ENGINE_VERSION",
        DO_WORK => "DO_WORK",
        _ => "UNKNOWN",
    }
}

/// Returns true for the server-to-client half of the command set.
pub fn is_server_to_client(command: u8) -> bool {
    matches!(command, NOTIFICATION | RESPONSE | ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_are_stable() {
        assert_eq!(NOTIFICATION, 0x01);
        assert_eq!(RESPONSE, 0x02);
        assert_eq!(ERROR, 0x03);
        assert_eq!(GET_SERVER_VERSION, 0x04);
        assert_eq!(GET_ENGINE_TYPE, 0x05);
        assert_eq!(GET_ENGINE_VERSION, 0x06);
        assert_eq!(DO_WORK, 0x07);
    }

    #[test]
    fn direction_split() {
        assert!(is_server_to_client(RESPONSE));
        assert!(!is_server_to_client(DO_WORK));
        assert!(!is_server_to_client(0x7F));
    }
}
