use std::fmt;

use num_bigint::BigUint;
use rand_chacha::ChaCha20Rng;
use tasty_core::{hash::point_kdf, EcGroup};

use crate::{
    check_count,
    naor_pinkas::{
        msgs::{ReceiverPayload, SenderPayload, SenderSetup},
        NaorPinkasConfig,
    },
    OtError,
};

#[cfg(feature = "rayon")]
use rayon::prelude::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

/// Naor-Pinkas sender.
pub(crate) struct Sender<G: EcGroup> {
    config: NaorPinkasConfig,
    msg_bits: usize,
    inputs: Vec<[BigUint; 2]>,
    /// `C = kG`. The discrete log is discarded.
    c: G::Point,
    /// Ephemeral secret `r`.
    r: G::Scalar,
}

impl<G: EcGroup> fmt::Debug for Sender<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sender")
            .field("curve", &G::ID)
            .field("count", &self.inputs.len())
            .finish_non_exhaustive()
    }
}

impl<G: EcGroup> Sender<G> {
    pub(crate) fn new(
        config: NaorPinkasConfig,
        msg_bits: usize,
        inputs: Vec<[BigUint; 2]>,
        rng: &mut ChaCha20Rng,
    ) -> Self {
        let c = G::mul_generator(&G::random_scalar(rng));
        let r = G::random_scalar(rng);

        Self {
            config,
            msg_bits,
            inputs,
            c,
            r,
        }
    }

    /// Returns the setup message publishing `C` and `R = rG`.
    pub(crate) fn setup(&self) -> SenderSetup {
        let compress = self.config.compress();

        SenderSetup {
            c: G::encode(&self.c, compress),
            r: G::encode(&G::mul_generator(&self.r), compress),
        }
    }

    /// Masks both values of every pair under the keys derived from the receiver's public keys.
    pub(crate) fn send(&self, payload: ReceiverPayload) -> Result<SenderPayload, OtError> {
        let ReceiverPayload { keys } = payload;

        check_count(self.inputs.len(), keys.len())?;

        let keys = keys
            .iter()
            .map(|key| G::decode(key))
            .collect::<Result<Vec<_>, _>>()?;

        let (c, r, msg_bits) = (&self.c, &self.r, self.msg_bits);

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let iter = keys.par_iter().zip(self.inputs.par_iter());
            } else {
                let iter = keys.iter().zip(self.inputs.iter());
            }
        }

        let ciphertexts = iter
            .map(|(pk, [m0, m1])| {
                let k0 = G::mul(pk, r);
                let k1 = G::mul(&G::sub(c, pk), r);

                [
                    m0 ^ point_kdf(&G::encode(&k0, false), 0, msg_bits),
                    m1 ^ point_kdf(&G::encode(&k1, false), 1, msg_bits),
                ]
            })
            .collect();

        Ok(SenderPayload { ciphertexts })
    }
}
