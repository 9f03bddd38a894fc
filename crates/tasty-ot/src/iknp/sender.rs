use num_bigint::BigUint;
use rand::Rng;
use tasty_core::{
    bits::{fits, pack, transpose},
    hash::cr_hash,
};

use crate::{check_count, iknp::msgs::Extend, msgs::MaskedPairs, OtError};

use super::expand_seed;

#[cfg(feature = "rayon")]
use rayon::prelude::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

/// IKNP sender, the receiver of the base OT.
pub(crate) struct Sender {
    msg_bits: usize,
    inputs: Vec<[BigUint; 2]>,
    /// The secret `s` as base OT choices.
    choices: Vec<bool>,
    delta: BigUint,
}

opaque_debug::implement!(Sender);

impl Sender {
    /// Creates a new sender with `k` secret bits.
    pub(crate) fn new<R: Rng>(
        k: usize,
        msg_bits: usize,
        inputs: Vec<[BigUint; 2]>,
        rng: &mut R,
    ) -> Self {
        let choices: Vec<bool> = (0..k).map(|_| rng.gen()).collect();
        let delta = pack(&choices);

        Self {
            msg_bits,
            inputs,
            choices,
            delta,
        }
    }

    /// Returns the choices for the base OT.
    pub(crate) fn base_choices(&self) -> Vec<bool> {
        self.choices.clone()
    }

    /// Expands the seeds chosen in the base OT into the columns
    /// `q^j = G(s_j) ^ (s_j * u^j)` and masks the inputs with their rows.
    pub(crate) fn send(&self, seeds: Vec<BigUint>, extend: Extend) -> Result<MaskedPairs, OtError> {
        let Extend { us } = extend;
        let count = self.inputs.len();

        check_count(self.choices.len(), seeds.len())?;
        check_count(self.choices.len(), us.len())?;

        if let Some(u) = us.iter().find(|u| !fits(u, count)) {
            return Err(OtError::ValueTooLarge {
                bits: count,
                actual: u.bits(),
            });
        }

        let columns: Vec<BigUint> = seeds
            .iter()
            .zip(us)
            .zip(&self.choices)
            .map(|((seed, u), choice)| {
                let column = expand_seed(seed, count);
                if *choice {
                    column ^ u
                } else {
                    column
                }
            })
            .collect();

        let rows = transpose(&columns, count);

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let iter = self.inputs.par_iter().zip(rows.par_iter()).enumerate();
            } else {
                let iter = self.inputs.iter().zip(rows.iter()).enumerate();
            }
        }

        let pairs = iter
            .map(|(i, ([x0, x1], q))| {
                let i = i as u64;
                [
                    x0 ^ cr_hash(i, q, self.msg_bits),
                    x1 ^ cr_hash(i, &(q ^ &self.delta), self.msg_bits),
                ]
            })
            .collect();

        Ok(MaskedPairs { pairs })
    }
}
