//! Messages for the IKNP protocol.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::{msgs::MaskedPairs, BaseOtMsg, OtError};

/// The receiver's correction columns `u^j = G(s0_j) ^ G(s1_j) ^ r`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extend {
    /// One `m`-bit column per base OT.
    pub us: Vec<BigUint>,
}

/// An IKNP protocol message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Message {
    BaseMsg(BaseOtMsg),
    Extend(Extend),
    MaskedPairs(MaskedPairs),
}

impl Message {
    pub(crate) fn try_into_base_msg(self) -> Result<BaseOtMsg, Self> {
        match self {
            Message::BaseMsg(msg) => Ok(msg),
            other => Err(other),
        }
    }

    pub(crate) fn try_into_extend(self) -> Result<Extend, OtError> {
        match self {
            Message::Extend(msg) => Ok(msg),
            _ => Err(OtError::UnexpectedMessage("Extend")),
        }
    }

    pub(crate) fn try_into_masked_pairs(self) -> Result<MaskedPairs, OtError> {
        match self {
            Message::MaskedPairs(msg) => Ok(msg),
            _ => Err(OtError::UnexpectedMessage("MaskedPairs")),
        }
    }
}
