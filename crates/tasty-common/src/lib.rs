//! Execution engine for round-based two-party protocols.
//!
//! Protocols are expressed as sans-IO state machines implementing [`Protocol`]. An [`Engine`]
//! drives every registered instance of a [`Phase`] in lockstep: each tick runs one round of
//! every pending instance and shares a single exchange with the peer between all of them.

#![deny(
    unsafe_code,
    missing_docs,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all
)]

pub mod channel;
mod config;
mod engine;
mod error;
mod id;
mod incoming;
mod party;
mod protocol;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use channel::{Channel, FramedChannel};
pub use config::{EngineConfig, EngineConfigBuilder, EngineConfigBuilderError};
pub use engine::{Engine, Pending, PhaseStats};
pub use error::EngineError;
pub use id::InstanceId;
pub use incoming::{Incoming, MissingMessage};
pub use party::Party;
pub use protocol::{equalize, Protocol, Slot, Step};

use serde::{Deserialize, Serialize};

/// The role of a party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// The client.
    Client,
    /// The server.
    Server,
}

impl Role {
    /// Returns the role of the other party.
    pub fn peer(self) -> Self {
        match self {
            Role::Client => Role::Server,
            Role::Server => Role::Client,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Client => write!(f, "client"),
            Role::Server => write!(f, "server"),
        }
    }
}

/// Execution phase of a protocol instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Input independent preprocessing.
    Precompute,
    /// Input dependent execution.
    Online,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Precompute => write!(f, "precompute"),
            Phase::Online => write!(f, "online"),
        }
    }
}
