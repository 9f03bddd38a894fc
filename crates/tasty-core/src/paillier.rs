//! Paillier additively homomorphic encryption, backed by `kzen-paillier`.
//!
//! Keys and ciphertexts are exposed over [`BigUint`] so they serialize the same way as every
//! other value in the suite.

use curv::arithmetic::{BigInt, Converter};
use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use kzen_paillier::{
    Add, Decrypt, EncryptWithChosenRandomness, KeyGeneration, Mul, Paillier, Randomness,
    RawCiphertext, RawPlaintext,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Smallest modulus size accepted for key generation.
pub const MIN_KEY_BITS: usize = 64;

/// Errors that can occur when using Paillier encryption.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum PaillierError {
    #[error("message of {bits} bits does not fit a {modulus_bits}-bit modulus")]
    MessageTooLarge { bits: u64, modulus_bits: u64 },
    #[error("key size must be at least {MIN_KEY_BITS} bits, got {0}")]
    KeyTooSmall(usize),
    #[error("invalid public key")]
    InvalidKey,
    #[error("ciphertext is not an element of Z_n^2")]
    InvalidCiphertext,
}

fn to_bigint(value: &BigUint) -> BigInt {
    BigInt::from_bytes(&value.to_bytes_be())
}

fn to_biguint(value: &BigInt) -> BigUint {
    BigUint::from_bytes_be(&value.to_bytes())
}

/// A Paillier public key.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "BigUint", into = "BigUint")]
pub struct EncryptionKey {
    n: BigUint,
    nn: BigUint,
    inner: kzen_paillier::EncryptionKey,
}

impl EncryptionKey {
    fn from_modulus(n: BigUint) -> Self {
        let inner = kzen_paillier::EncryptionKey {
            n: to_bigint(&n),
            nn: to_bigint(&(&n * &n)),
        };

        Self {
            nn: &n * &n,
            n,
            inner,
        }
    }

    /// Returns the modulus `n`.
    pub fn n(&self) -> &BigUint {
        &self.n
    }

    /// Returns the size of the modulus in bits.
    pub fn bits(&self) -> u64 {
        self.n.bits()
    }

    /// Encrypts `m`, which must be smaller than `n`.
    ///
    /// The encryption randomness is drawn from `rng`.
    pub fn encrypt<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        m: &BigUint,
    ) -> Result<Ciphertext, PaillierError> {
        if m >= &self.n {
            return Err(PaillierError::MessageTooLarge {
                bits: m.bits(),
                modulus_bits: self.bits(),
            });
        }

        let r = loop {
            let r = rng.gen_biguint_range(&BigUint::one(), &self.n);
            if r.gcd(&self.n).is_one() {
                break r;
            }
        };

        let c: RawCiphertext = Paillier::encrypt_with_chosen_randomness(
            &self.inner,
            RawPlaintext::from(to_bigint(m)),
            &Randomness::from(to_bigint(&r)),
        );

        Ok(Ciphertext(to_biguint(&c.0)))
    }

    /// Checks that `c` is an element of `Z_n^2`.
    pub fn validate(&self, c: &Ciphertext) -> Result<(), PaillierError> {
        if c.0.is_zero() || c.0 >= self.nn {
            return Err(PaillierError::InvalidCiphertext);
        }
        Ok(())
    }

    /// Returns an encryption of the sum of the plaintexts.
    pub fn add(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> Ciphertext {
        let sum: RawCiphertext = Paillier::add(
            &self.inner,
            RawCiphertext::from(to_bigint(&lhs.0)),
            RawCiphertext::from(to_bigint(&rhs.0)),
        );
        Ciphertext(to_biguint(&sum.0))
    }

    /// Returns an encryption of the plaintext multiplied by `k`.
    pub fn mul(&self, c: &Ciphertext, k: &BigUint) -> Ciphertext {
        let product: RawCiphertext = Paillier::mul(
            &self.inner,
            RawCiphertext::from(to_bigint(&c.0)),
            RawPlaintext::from(to_bigint(k)),
        );
        Ciphertext(to_biguint(&product.0))
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey").field("n", &self.n).finish()
    }
}

impl PartialEq for EncryptionKey {
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n
    }
}

impl Eq for EncryptionKey {}

impl TryFrom<BigUint> for EncryptionKey {
    type Error = PaillierError;

    fn try_from(n: BigUint) -> Result<Self, Self::Error> {
        if n.bits() < MIN_KEY_BITS as u64 || n.is_even() {
            return Err(PaillierError::InvalidKey);
        }

        Ok(Self::from_modulus(n))
    }
}

impl From<EncryptionKey> for BigUint {
    fn from(key: EncryptionKey) -> Self {
        key.n
    }
}

/// A Paillier ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ciphertext(BigUint);

/// A Paillier private key.
#[derive(Clone)]
pub struct DecryptionKey {
    ek: EncryptionKey,
    inner: kzen_paillier::DecryptionKey,
}

opaque_debug::implement!(DecryptionKey);

impl DecryptionKey {
    /// Generates a fresh key pair from OS randomness.
    ///
    /// Both primes have their top bit set, so the modulus has `bits` or `bits - 1` bits.
    pub fn generate(bits: usize) -> Result<Self, PaillierError> {
        if bits < MIN_KEY_BITS {
            return Err(PaillierError::KeyTooSmall(bits));
        }

        loop {
            let (ek, dk) = Paillier::keypair_with_modulus_size(bits).keys();
            if dk.p == dk.q {
                continue;
            }

            return Ok(Self {
                ek: EncryptionKey::from_modulus(to_biguint(&ek.n)),
                inner: dk,
            });
        }
    }

    /// Returns the public key.
    pub fn encryption_key(&self) -> &EncryptionKey {
        &self.ek
    }

    /// Decrypts a ciphertext.
    pub fn decrypt(&self, c: &Ciphertext) -> Result<BigUint, PaillierError> {
        self.ek.validate(c)?;

        let c = RawCiphertext::from(to_bigint(&c.0));
        let m: RawPlaintext = Paillier::decrypt(&self.inner, c);
        Ok(to_biguint(&BigInt::from(m)))
    }
}
