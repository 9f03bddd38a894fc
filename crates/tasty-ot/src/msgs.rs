//! General OT message types

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// A message sent by the receiver which a sender can use to perform
/// Beaver derandomization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Derandomize {
    /// Correction bits, packed least significant bit first.
    pub flip: Vec<u8>,
}

/// Both values of every OT, each masked with a key only one of which the receiver knows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedPairs {
    /// Masked value pairs.
    pub pairs: Vec<[BigUint; 2]>,
}
