//! Messages for the Naor-Pinkas protocol.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::OtError;

/// A Naor-Pinkas protocol message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Message {
    SenderSetup(SenderSetup),
    ReceiverPayload(ReceiverPayload),
    SenderPayload(SenderPayload),
}

impl Message {
    pub(crate) fn try_into_sender_setup(self) -> Result<SenderSetup, OtError> {
        match self {
            Message::SenderSetup(msg) => Ok(msg),
            _ => Err(OtError::UnexpectedMessage("SenderSetup")),
        }
    }

    pub(crate) fn try_into_receiver_payload(self) -> Result<ReceiverPayload, OtError> {
        match self {
            Message::ReceiverPayload(msg) => Ok(msg),
            _ => Err(OtError::UnexpectedMessage("ReceiverPayload")),
        }
    }

    pub(crate) fn try_into_sender_payload(self) -> Result<SenderPayload, OtError> {
        match self {
            Message::SenderPayload(msg) => Ok(msg),
            _ => Err(OtError::UnexpectedMessage("SenderPayload")),
        }
    }
}

/// Sender setup message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderSetup {
    /// The encoded point `C = kG`.
    pub c: Vec<u8>,
    /// The encoded point `R = rG`.
    pub r: Vec<u8>,
}

/// Receiver payload message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverPayload {
    /// The receiver's encoded public keys, one per OT.
    pub keys: Vec<Vec<u8>>,
}

/// Sender payload message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderPayload {
    /// Both masked values of every OT.
    pub ciphertexts: Vec<[BigUint; 2]>,
}
