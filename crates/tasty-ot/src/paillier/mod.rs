//! OT from additively homomorphic Paillier encryption.
//!
//! The receiver sends a fresh public key and an encryption `c` of every choice bit. The sender
//! answers with `Enc(m0) * c^(m1 - m0)`, an encryption of the chosen value, which the receiver
//! decrypts.

mod config;
pub mod msgs;

pub use config::{
    PaillierOtConfig, PaillierOtConfigBuilder, PaillierOtConfigBuilderError, DEFAULT_KEY_BITS,
};

use num_bigint::BigUint;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tasty_common::{Incoming, Protocol, Role, Step};
use tasty_core::{Ciphertext, DecryptionKey, EncryptionKey, PaillierError};
use tracing::debug;

use crate::{check_count, OtError, OtInput};
use msgs::{Message, ReceiverSetup, SenderPayload};

#[cfg(feature = "rayon")]
use rayon::prelude::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

/// Rounds of [`PaillierOt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaillierRound {
    /// Receiver generates a key and encrypts its choices.
    Encrypt,
    /// Sender waits for the receiver.
    Wait,
    /// Sender evaluates the encrypted selection.
    Transfer,
    /// Sender completes.
    Finish,
    /// Receiver decrypts.
    Decrypt,
}

/// Paillier OT.
pub struct PaillierOt {
    config: PaillierOtConfig,
    msg_bits: usize,
    input: OtInput,
    rng: ChaCha20Rng,
    key: Option<DecryptionKey>,
}

opaque_debug::implement!(PaillierOt);

impl PaillierOt {
    /// Creates a new instance for `msg_bits`-bit values.
    ///
    /// `msg_bits` must be at least two bits smaller than the configured key size, as generated
    /// moduli may be one bit short of it.
    pub fn new(config: PaillierOtConfig, msg_bits: usize, input: OtInput) -> Result<Self, OtError> {
        Self::new_with_seed(config, msg_bits, input, rand::random())
    }

    /// Creates a new instance with the provided RNG seed.
    pub fn new_with_seed(
        config: PaillierOtConfig,
        msg_bits: usize,
        input: OtInput,
        seed: [u8; 32],
    ) -> Result<Self, OtError> {
        input.validate(msg_bits)?;

        if msg_bits + 1 >= config.key_bits() {
            return Err(PaillierError::MessageTooLarge {
                bits: msg_bits as u64,
                modulus_bits: config.key_bits() as u64,
            }
            .into());
        }

        Ok(Self {
            config,
            msg_bits,
            input,
            rng: ChaCha20Rng::from_seed(seed),
            key: None,
        })
    }

    fn encrypt_choices(&mut self, choices: &[bool]) -> Result<ReceiverSetup, OtError> {
        let key = DecryptionKey::generate(self.config.key_bits())?;
        debug!(bits = key.encryption_key().bits(), "generated paillier key");

        let ek = key.encryption_key();
        let choices = choices
            .iter()
            .map(|choice| ek.encrypt(&mut self.rng, &BigUint::from(*choice as u8)))
            .collect::<Result<Vec<_>, _>>()?;

        let setup = ReceiverSetup {
            key: ek.clone(),
            choices,
        };
        self.key = Some(key);

        Ok(setup)
    }

    fn transfer(&mut self, setup: ReceiverSetup) -> Result<SenderPayload, OtError> {
        let OtInput::Pairs(pairs) = &self.input else {
            return Err(OtError::InvalidState("sender input"));
        };
        let ReceiverSetup { key, choices } = setup;

        check_count(pairs.len(), choices.len())?;

        // Values must stay below the receiver's modulus.
        if self.msg_bits as u64 >= key.bits() {
            return Err(PaillierError::MessageTooLarge {
                bits: self.msg_bits as u64,
                modulus_bits: key.bits(),
            }
            .into());
        }

        for choice in &choices {
            key.validate(choice)?;
        }

        let seeds: Vec<[u8; 32]> = (0..pairs.len()).map(|_| self.rng.gen()).collect();

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let iter = pairs.par_iter().zip(choices.par_iter()).zip(seeds.par_iter());
            } else {
                let iter = pairs.iter().zip(choices.iter()).zip(seeds.iter());
            }
        }

        let ciphertexts = iter
            .map(|(([m0, m1], choice), seed)| select(&key, m0, m1, choice, *seed))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SenderPayload { ciphertexts })
    }

    fn decrypt(&mut self, payload: SenderPayload) -> Result<Vec<BigUint>, OtError> {
        let key = self
            .key
            .take()
            .ok_or(OtError::InvalidState("receiver key to be generated"))?;

        check_count(self.input.len(), payload.ciphertexts.len())?;

        payload
            .ciphertexts
            .iter()
            .map(|c| Ok(key.decrypt(c)?))
            .collect()
    }
}

/// Computes `Enc(m0) * c^(m1 - m0 mod n)`.
fn select(
    key: &EncryptionKey,
    m0: &BigUint,
    m1: &BigUint,
    choice: &Ciphertext,
    seed: [u8; 32],
) -> Result<Ciphertext, PaillierError> {
    let mut rng = ChaCha20Rng::from_seed(seed);
    let n = key.n();
    let diff = (m1 + n - m0) % n;

    Ok(key.add(&key.encrypt(&mut rng, m0)?, &key.mul(choice, &diff)))
}

impl Protocol for PaillierOt {
    type Msg = Message;
    type Round = PaillierRound;
    type Output = Vec<BigUint>;
    type Error = OtError;

    fn name(&self) -> &'static str {
        "PaillierOt"
    }

    fn role(&self) -> Role {
        self.input.role()
    }

    fn rounds(&self, role: Role) -> Vec<PaillierRound> {
        match role {
            Role::Server => vec![
                PaillierRound::Wait,
                PaillierRound::Transfer,
                PaillierRound::Finish,
            ],
            Role::Client => vec![PaillierRound::Encrypt, PaillierRound::Decrypt],
        }
    }

    fn run_round(
        &mut self,
        round: PaillierRound,
        incoming: &mut Incoming<Message>,
    ) -> Result<Step<Message, Vec<BigUint>>, OtError> {
        match (round, self.input.role()) {
            (PaillierRound::Wait, Role::Server) => Ok(Step::empty()),
            (PaillierRound::Transfer, Role::Server) => {
                let setup = incoming.expect_next()?.try_into_receiver_setup()?;
                Ok(Step::Send(vec![Message::SenderPayload(
                    self.transfer(setup)?,
                )]))
            }
            (PaillierRound::Finish, Role::Server) => Ok(Step::Done(Vec::new())),
            (PaillierRound::Encrypt, Role::Client) => {
                let OtInput::Choices(choices) = self.input.clone() else {
                    return Err(OtError::InvalidState("receiver input"));
                };
                Ok(Step::Send(vec![Message::ReceiverSetup(
                    self.encrypt_choices(&choices)?,
                )]))
            }
            (PaillierRound::Decrypt, Role::Client) => {
                let payload = incoming.expect_next()?.try_into_sender_payload()?;
                Ok(Step::Done(self.decrypt(payload)?))
            }
            _ => Err(OtError::InvalidState("a round of the own role")),
        }
    }
}
