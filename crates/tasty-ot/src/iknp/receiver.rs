use num_bigint::BigUint;
use rand::Rng;
use tasty_core::{
    bits::{pack, random_bits, transpose},
    hash::cr_hash,
};

use crate::{check_count, iknp::msgs::Extend, msgs::MaskedPairs, OtError};

use super::{expand_seed, SEED_BITS};

#[cfg(feature = "rayon")]
use rayon::prelude::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

/// IKNP receiver, the sender of the base OT.
pub(crate) struct Receiver {
    msg_bits: usize,
    choices: Vec<bool>,
    /// Seed pairs `(s0_j, s1_j)` transferred by the base OT.
    seeds: Vec<[BigUint; 2]>,
    /// Columns `t^j = G(s0_j)`.
    columns: Vec<BigUint>,
    packed: BigUint,
}

opaque_debug::implement!(Receiver);

impl Receiver {
    /// Creates a new receiver sampling `k` seed pairs.
    pub(crate) fn new<R: Rng>(
        k: usize,
        msg_bits: usize,
        choices: Vec<bool>,
        rng: &mut R,
    ) -> Self {
        let seeds: Vec<[BigUint; 2]> = (0..k)
            .map(|_| [random_bits(rng, SEED_BITS), random_bits(rng, SEED_BITS)])
            .collect();
        let columns = seeds
            .iter()
            .map(|[s0, _]| expand_seed(s0, choices.len()))
            .collect();
        let packed = pack(&choices);

        Self {
            msg_bits,
            choices,
            seeds,
            columns,
            packed,
        }
    }

    /// Returns the seed pairs for the base OT.
    pub(crate) fn base_pairs(&self) -> Vec<[BigUint; 2]> {
        self.seeds.clone()
    }

    /// Returns the columns `u^j = t^j ^ G(s1_j) ^ r`.
    pub(crate) fn extend(&self) -> Extend {
        let us = self
            .seeds
            .iter()
            .zip(&self.columns)
            .map(|([_, s1], t)| t ^ expand_seed(s1, self.choices.len()) ^ &self.packed)
            .collect();

        Extend { us }
    }

    /// Unmasks the chosen values with the rows of `T`.
    pub(crate) fn receive(&self, payload: MaskedPairs) -> Result<Vec<BigUint>, OtError> {
        let MaskedPairs { pairs } = payload;
        check_count(self.choices.len(), pairs.len())?;

        let rows = transpose(&self.columns, self.choices.len());

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let iter = pairs.par_iter().zip(self.choices.par_iter()).zip(rows.par_iter());
            } else {
                let iter = pairs.iter().zip(self.choices.iter()).zip(rows.iter());
            }
        }

        Ok(iter
            .enumerate()
            .map(|(i, ((pair, choice), t))| {
                &pair[*choice as usize] ^ cr_hash(i as u64, t, self.msg_bits)
            })
            .collect())
    }
}
