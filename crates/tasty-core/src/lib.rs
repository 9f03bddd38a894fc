//! Arithmetic collaborators for the TASTY protocol suite: prime-order elliptic curves,
//! Paillier encryption, hashes used as random oracles and bit packing helpers.
//!
//! The NIST curves come from the RustCrypto crates and Paillier from `kzen-paillier`.
//! secp160r1 is implemented here and is not constant time. It is meant for semi-honest
//! protocol research, not for production key material.

#![deny(missing_docs, unreachable_pub, unused_must_use)]
#![deny(unsafe_code)]
#![deny(clippy::all)]

pub mod bits;
pub mod curve;
pub mod hash;
pub mod paillier;
pub mod secp160r1;

pub use curve::{CurveError, CurveId, EcGroup, Sec1Curve, P192, P224, P256};
pub use paillier::{Ciphertext, DecryptionKey, EncryptionKey, PaillierError};
pub use secp160r1::{Secp160r1, Secp160r1Point};
