//! Local byte-stream transport for powlink.
//!
//! Brokers bind an [`EndpointListener`] on a filesystem path; clients
//! [`connect`] to it. Stale socket files from a crashed broker are cleaned
//! up before binding.

pub mod error;
pub mod stream;
pub mod uds;

pub use error::{Result, TransportError};
pub use stream::IpcStream;
pub use uds::{connect, EndpointListener};
