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

/// Naor-Pinkas receiver.
pub(crate) struct Receiver<G: EcGroup> {
    config: NaorPinkasConfig,
    msg_bits: usize,
    choices: Vec<bool>,
    /// One secret scalar per choice.
    secrets: Vec<G::Scalar>,
    /// Keys `s * R` of the chosen values, known after choosing.
    keys: Option<Vec<G::Point>>,
}

impl<G: EcGroup> fmt::Debug for Receiver<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver")
            .field("curve", &G::ID)
            .field("count", &self.choices.len())
            .finish_non_exhaustive()
    }
}

impl<G: EcGroup> Receiver<G> {
    pub(crate) fn new(
        config: NaorPinkasConfig,
        msg_bits: usize,
        choices: Vec<bool>,
        rng: &mut ChaCha20Rng,
    ) -> Self {
        let secrets = choices.iter().map(|_| G::random_scalar(rng)).collect();

        Self {
            config,
            msg_bits,
            choices,
            secrets,
            keys: None,
        }
    }

    /// Computes a public key per choice: `sG` to choose the first value, `C - sG` to choose
    /// the second.
    pub(crate) fn choose(&mut self, setup: SenderSetup) -> Result<ReceiverPayload, OtError> {
        let compress = self.config.compress();
        let c = G::decode(&setup.c)?;
        let r = G::decode(&setup.r)?;

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let iter = self.secrets.par_iter().zip(self.choices.par_iter());
            } else {
                let iter = self.secrets.iter().zip(self.choices.iter());
            }
        }

        let (public_keys, keys): (Vec<_>, Vec<_>) = iter
            .map(|(s, choice)| {
                let s_g = G::mul_generator(s);
                let pk = if *choice { G::sub(&c, &s_g) } else { s_g };

                (G::encode(&pk, compress), G::mul(&r, s))
            })
            .unzip();

        self.keys = Some(keys);

        Ok(ReceiverPayload { keys: public_keys })
    }

    /// Unmasks the chosen values.
    pub(crate) fn receive(&mut self, payload: SenderPayload) -> Result<Vec<BigUint>, OtError> {
        let keys = self
            .keys
            .take()
            .ok_or(OtError::InvalidState("receiver keys to be computed"))?;
        let SenderPayload { ciphertexts } = payload;

        check_count(self.choices.len(), ciphertexts.len())?;

        Ok(ciphertexts
            .into_iter()
            .zip(keys.iter().zip(&self.choices))
            .map(|(ciphertext, (key, choice))| {
                let [c0, c1] = ciphertext;
                let (masked, side) = if *choice { (c1, 1) } else { (c0, 0) };
                masked ^ point_kdf(&G::encode(key, false), side, self.msg_bits)
            })
            .collect())
    }
}
