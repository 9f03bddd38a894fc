use tasty_common::{EngineError, MissingMessage};
use tasty_core::{CurveError, PaillierError};

/// Errors that can occur when running OT protocols.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum OtError {
    #[error(transparent)]
    MissingMessage(#[from] MissingMessage),
    #[error("unexpected message: expected {0}")]
    UnexpectedMessage(&'static str),
    #[error("count mismatch: expected {expected}, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
    #[error("value of {actual} bits exceeds the message length of {bits} bits")]
    ValueTooLarge { bits: usize, actual: u64 },
    #[error("invalid state: expected {0}")]
    InvalidState(&'static str),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("{requested} OTs requested but only {available} are precomputed")]
    PoolExhausted { requested: usize, available: usize },
    #[error(transparent)]
    Curve(#[from] CurveError),
    #[error(transparent)]
    Paillier(#[from] PaillierError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}
