//! Broker sessions and client codec for the powlink protocol.
//!
//! The broker side accepts connections on a local endpoint, parses framed
//! requests, and funnels work requests through the engine gateway; the
//! client side builds requests, correlates replies, and picks between the
//! local socket path and a remote adapter.

pub mod client;
pub mod config;
pub mod error;
pub mod remote;
pub mod selector;
pub mod server;
pub mod session;

pub use client::{PowClient, PowInfo};
pub use config::{BrokerConfig, DEFAULT_ENDPOINT_PATH, DEFAULT_MAX_DIFFICULTY};
pub use error::{ClientError, ConfigError};
pub use remote::{PowDriver, RemoteAdapter};
pub use selector::{classify, Endpoint};
pub use server::Broker;
pub use session::BrokerContext;
