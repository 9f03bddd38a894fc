use crate::{InstanceId, Role};

/// Errors that can occur when executing protocols.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum EngineError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),
    #[error("peer is out of sync: local run counters {local:?}, peer run counters {peer:?}")]
    Desync { local: (u64, u64), peer: (u64, u64) },
    #[error("protocol tag mismatch: expected {expected:?}, got {actual:?}")]
    TagMismatch { expected: String, actual: String },
    #[error("missing protocol tag: expected {0:?}")]
    MissingTag(String),
    #[error("{protocol} is played as {actual} but the engine runs as {expected}")]
    RoleMismatch {
        protocol: &'static str,
        expected: Role,
        actual: Role,
    },
    #[error("{0} has no rounds to run")]
    EmptySchedule(&'static str),
    #[error("{protocol} {id}: {reason}")]
    RoundContract {
        protocol: &'static str,
        id: InstanceId,
        reason: &'static str,
    },
    #[error("{protocol} {id} failed: {source}")]
    Protocol {
        protocol: &'static str,
        id: InstanceId,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("result of {protocol} {id} is not available")]
    ResultUnavailable {
        protocol: &'static str,
        id: InstanceId,
    },
}
