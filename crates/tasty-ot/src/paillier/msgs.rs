//! Messages for the Paillier OT protocol.

use serde::{Deserialize, Serialize};
use tasty_core::{Ciphertext, EncryptionKey};

use crate::OtError;

/// A Paillier OT protocol message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Message {
    ReceiverSetup(ReceiverSetup),
    SenderPayload(SenderPayload),
}

impl Message {
    pub(crate) fn try_into_receiver_setup(self) -> Result<ReceiverSetup, OtError> {
        match self {
            Message::ReceiverSetup(msg) => Ok(msg),
            _ => Err(OtError::UnexpectedMessage("ReceiverSetup")),
        }
    }

    pub(crate) fn try_into_sender_payload(self) -> Result<SenderPayload, OtError> {
        match self {
            Message::SenderPayload(msg) => Ok(msg),
            _ => Err(OtError::UnexpectedMessage("SenderPayload")),
        }
    }
}

/// Receiver setup message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverSetup {
    /// The receiver's fresh public key.
    pub key: EncryptionKey,
    /// Encryptions of the choice bits.
    pub choices: Vec<Ciphertext>,
}

/// Sender payload message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderPayload {
    /// Encryptions of the chosen values.
    pub ciphertexts: Vec<Ciphertext>,
}
