/// Errors that can occur in engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine slot was never set.
    #[error("pow engine not initialized")]
    Unavailable,

    /// The work input is not valid for the ternary alphabet.
    #[error("invalid work input: {0}")]
    InvalidInput(String),

    /// No engine implementation is registered under the configured name.
    #[error("unknown engine type {0:?}")]
    UnknownEngineType(String),

    /// The engine rejected or failed the job; message propagated verbatim.
    #[error("{0}")]
    Failure(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
