//! Oblivious transfer protocols for the TASTY engine.
//!
//! Every protocol is a [`Protocol`](tasty_common::Protocol) registered with an
//! [`Engine`](tasty_common::Engine). The sender always plays [`Role::Server`] and the receiver
//! [`Role::Client`]. Values are integers of a fixed bit length.
//!
//! Higher level protocols should only use [`TastyOt`], which precomputes random OTs with
//! [`Iknp`] and spends them online through [`BeaverOt`].
//!
//! # ⚠️ Warning ⚠️
//!
//! These protocols are secure against semi-honest adversaries only and none of the arithmetic
//! is constant time.

#![deny(missing_docs, unreachable_pub, unused_must_use)]
#![deny(unsafe_code)]
#![deny(clippy::all)]

mod base;
mod beaver;
mod dummy;
mod error;
pub mod iknp;
pub mod msgs;
pub mod naor_pinkas;
pub mod paillier;
mod tasty;

pub use base::{BaseOt, BaseOtKind, BaseOtMsg, BaseOtRound};
pub use beaver::{BeaverMsg, BeaverOt, BeaverRound};
pub use dummy::{DummyMsg, DummyOt, DummyRound};
pub use error::OtError;
pub use iknp::Iknp;
pub use naor_pinkas::NaorPinkas;
pub use paillier::PaillierOt;
pub use tasty::{
    TastyOt, TastyOtConfig, TastyOtConfigBuilder, TastyOtConfigBuilderError, DEFAULT_MSG_BITS,
};

use num_bigint::BigUint;
use tasty_common::Role;
use tasty_core::bits::fits;

/// Input of one side of a batch of OTs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtInput {
    /// The sender's value pairs.
    Pairs(Vec<[BigUint; 2]>),
    /// The receiver's choice bits.
    Choices(Vec<bool>),
}

impl OtInput {
    /// Returns the role playing this input.
    pub fn role(&self) -> Role {
        match self {
            OtInput::Pairs(_) => Role::Server,
            OtInput::Choices(_) => Role::Client,
        }
    }

    /// Returns the number of OTs.
    pub fn len(&self) -> usize {
        match self {
            OtInput::Pairs(pairs) => pairs.len(),
            OtInput::Choices(choices) => choices.len(),
        }
    }

    /// Returns `true` if there are no OTs.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks that every value fits into `msg_bits` bits.
    pub(crate) fn validate(&self, msg_bits: usize) -> Result<(), OtError> {
        match self {
            OtInput::Pairs(pairs) => check_values(pairs, msg_bits),
            OtInput::Choices(_) => check_values(&[], msg_bits),
        }
    }
}

impl From<Vec<[BigUint; 2]>> for OtInput {
    fn from(pairs: Vec<[BigUint; 2]>) -> Self {
        OtInput::Pairs(pairs)
    }
}

impl From<Vec<bool>> for OtInput {
    fn from(choices: Vec<bool>) -> Self {
        OtInput::Choices(choices)
    }
}

/// Checks that every value of `pairs` fits into `msg_bits` bits.
pub(crate) fn check_values(pairs: &[[BigUint; 2]], msg_bits: usize) -> Result<(), OtError> {
    if msg_bits == 0 {
        return Err(OtError::InvalidConfig("message length must be positive".into()));
    }

    for value in pairs.iter().flatten() {
        if !fits(value, msg_bits) {
            return Err(OtError::ValueTooLarge {
                bits: msg_bits,
                actual: value.bits(),
            });
        }
    }

    Ok(())
}

/// Checks that the peer sent `actual` items where `expected` were due.
pub(crate) fn check_count(expected: usize, actual: usize) -> Result<(), OtError> {
    if expected != actual {
        return Err(OtError::CountMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha12Rng;
    use tasty_common::{channel::MemoryChannel, test_utils::test_party_pair, Party};
    use tasty_core::bits::random_bits;

    pub(crate) fn init_tracing() {
        _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    pub(crate) fn parties() -> (Party<MemoryChannel>, Party<MemoryChannel>) {
        init_tracing();
        test_party_pair(1 << 20)
    }

    pub(crate) fn pairs(values: &[(u64, u64)]) -> Vec<[BigUint; 2]> {
        values
            .iter()
            .map(|(a, b)| [BigUint::from(*a), BigUint::from(*b)])
            .collect()
    }

    pub(crate) fn random_pairs(count: usize, msg_bits: usize, seed: u64) -> Vec<[BigUint; 2]> {
        let mut rng = ChaCha12Rng::seed_from_u64(seed);
        (0..count)
            .map(|_| [random_bits(&mut rng, msg_bits), random_bits(&mut rng, msg_bits)])
            .collect()
    }

    pub(crate) fn random_choices(count: usize, seed: u64) -> Vec<bool> {
        let mut rng = ChaCha12Rng::seed_from_u64(seed);
        (0..count).map(|_| rng.gen()).collect()
    }

    pub(crate) fn expected(pairs: &[[BigUint; 2]], choices: &[bool]) -> Vec<BigUint> {
        pairs
            .iter()
            .zip(choices)
            .map(|(pair, choice)| pair[*choice as usize].clone())
            .collect()
    }
}
