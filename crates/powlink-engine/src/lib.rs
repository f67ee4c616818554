//! Proof-of-work engines for powlink.
//!
//! Defines the ternary tryte alphabet, the Curl sponge and its software
//! nonce search, the [`PowEngine`] capability every engine variant
//! implements, and the [`EngineGateway`] that serializes all engine access
//! behind one mutex.

pub mod curl;
pub mod error;
pub mod gateway;
pub mod metrics;
pub mod pow;
pub mod registry;
pub mod trytes;

pub use curl::{Curl, HASH_TRITS, STATE_TRITS};
pub use error::{EngineError, Result};
pub use gateway::{EngineDescriptor, EngineGateway, PowEngine};
pub use metrics::{EngineMetrics, MetricsSnapshot};
pub use pow::{
    CurlPow, MAX_DIFFICULTY, NONCE_TRITS, NONCE_TRYTES, TRANSACTION_TRITS, TRANSACTION_TRYTES,
};
pub use registry::{create_engine, EngineOptions};
pub use trytes::{Trytes, TRITS_PER_TRYTE, TRYTE_ALPHABET};
