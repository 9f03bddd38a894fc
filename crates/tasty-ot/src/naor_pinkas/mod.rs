//! Naor-Pinkas base OT over a prime-order elliptic curve.
//!
//! The sender publishes `C = kG` and `R = rG`. For choice bit `b` the receiver samples `s` and
//! publishes `PK = sG` if `b = 0`, or `PK = C - sG` otherwise. The sender masks the two values
//! with keys hashed from `r * PK` and `r * (C - PK)`, of which the receiver can compute exactly
//! one as `s * R`.

mod config;
pub mod msgs;
mod receiver;
mod sender;

pub use config::{NaorPinkasConfig, NaorPinkasConfigBuilder, NaorPinkasConfigBuilderError};

use num_bigint::BigUint;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tasty_common::{Incoming, Protocol, Role, Step};
use tasty_core::{CurveId, EcGroup, Secp160r1, P192, P224, P256};

use crate::{OtError, OtInput};
use msgs::Message;
use receiver::Receiver;
use sender::Sender;

/// Rounds of [`NaorPinkas`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NaorPinkasRound {
    /// Sender publishes `C` and `R`.
    Setup,
    /// Either party waits for the peer.
    Wait,
    /// Receiver publishes its keys.
    Choose,
    /// Sender masks its values.
    Transfer,
    /// Sender completes.
    Finish,
    /// Receiver unmasks the chosen values.
    Decrypt,
}

#[derive(Debug)]
enum Side<G: EcGroup> {
    Sender(Sender<G>),
    Receiver(Receiver<G>),
}

impl<G: EcGroup> Side<G> {
    fn new(config: NaorPinkasConfig, msg_bits: usize, input: OtInput, seed: [u8; 32]) -> Self {
        let mut rng = ChaCha20Rng::from_seed(seed);
        match input {
            OtInput::Pairs(pairs) => Side::Sender(Sender::new(config, msg_bits, pairs, &mut rng)),
            OtInput::Choices(choices) => {
                Side::Receiver(Receiver::new(config, msg_bits, choices, &mut rng))
            }
        }
    }

    fn role(&self) -> Role {
        match self {
            Side::Sender(_) => Role::Server,
            Side::Receiver(_) => Role::Client,
        }
    }

    fn run_round(
        &mut self,
        round: NaorPinkasRound,
        incoming: &mut Incoming<Message>,
    ) -> Result<Step<Message, Vec<BigUint>>, OtError> {
        match (round, self) {
            (NaorPinkasRound::Wait, _) => Ok(Step::empty()),
            (NaorPinkasRound::Setup, Side::Sender(sender)) => {
                Ok(Step::Send(vec![Message::SenderSetup(sender.setup())]))
            }
            (NaorPinkasRound::Transfer, Side::Sender(sender)) => {
                let payload = incoming.expect_next()?.try_into_receiver_payload()?;
                Ok(Step::Send(vec![Message::SenderPayload(
                    sender.send(payload)?,
                )]))
            }
            (NaorPinkasRound::Finish, Side::Sender(_)) => Ok(Step::Done(Vec::new())),
            (NaorPinkasRound::Choose, Side::Receiver(receiver)) => {
                let setup = incoming.expect_next()?.try_into_sender_setup()?;
                Ok(Step::Send(vec![Message::ReceiverPayload(
                    receiver.choose(setup)?,
                )]))
            }
            (NaorPinkasRound::Decrypt, Side::Receiver(receiver)) => {
                let payload = incoming.expect_next()?.try_into_sender_payload()?;
                Ok(Step::Done(receiver.receive(payload)?))
            }
            _ => Err(OtError::InvalidState("a round of the own role")),
        }
    }
}

/// A party bound to the configured curve.
#[derive(Debug)]
enum Inner {
    Secp160r1(Side<Secp160r1>),
    Secp192r1(Side<P192>),
    Secp224r1(Side<P224>),
    Secp256r1(Side<P256>),
}

macro_rules! dispatch {
    ($inner:expr, $side:ident => $body:expr) => {
        match $inner {
            Inner::Secp160r1($side) => $body,
            Inner::Secp192r1($side) => $body,
            Inner::Secp224r1($side) => $body,
            Inner::Secp256r1($side) => $body,
        }
    };
}

/// Naor-Pinkas OT.
#[derive(Debug)]
pub struct NaorPinkas {
    inner: Inner,
}

impl NaorPinkas {
    /// Creates a new instance for `msg_bits`-bit values.
    pub fn new(config: NaorPinkasConfig, msg_bits: usize, input: OtInput) -> Result<Self, OtError> {
        Self::new_with_seed(config, msg_bits, input, rand::random())
    }

    /// Creates a new instance with the provided RNG seed.
    pub fn new_with_seed(
        config: NaorPinkasConfig,
        msg_bits: usize,
        input: OtInput,
        seed: [u8; 32],
    ) -> Result<Self, OtError> {
        input.validate(msg_bits)?;

        let inner = match config.curve() {
            CurveId::Secp160r1 => Inner::Secp160r1(Side::new(config, msg_bits, input, seed)),
            CurveId::Secp192r1 => Inner::Secp192r1(Side::new(config, msg_bits, input, seed)),
            CurveId::Secp224r1 => Inner::Secp224r1(Side::new(config, msg_bits, input, seed)),
            CurveId::Secp256r1 => Inner::Secp256r1(Side::new(config, msg_bits, input, seed)),
        };

        Ok(Self { inner })
    }
}

impl Protocol for NaorPinkas {
    type Msg = Message;
    type Round = NaorPinkasRound;
    type Output = Vec<BigUint>;
    type Error = OtError;

    fn name(&self) -> &'static str {
        "NaorPinkas"
    }

    fn role(&self) -> Role {
        dispatch!(&self.inner, side => side.role())
    }

    fn rounds(&self, role: Role) -> Vec<NaorPinkasRound> {
        use NaorPinkasRound::*;

        match role {
            Role::Server => vec![Setup, Wait, Transfer, Finish],
            Role::Client => vec![Wait, Choose, Decrypt],
        }
    }

    fn run_round(
        &mut self,
        round: NaorPinkasRound,
        incoming: &mut Incoming<Message>,
    ) -> Result<Step<Message, Vec<BigUint>>, OtError> {
        dispatch!(&mut self.inner, side => side.run_round(round, incoming))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use tasty_common::{channel::MemoryChannel, Party, Phase};

    async fn transfer(
        client: &mut Party<MemoryChannel>,
        server: &mut Party<MemoryChannel>,
        config: NaorPinkasConfig,
        msg_bits: usize,
        pairs: Vec<[BigUint; 2]>,
        choices: Vec<bool>,
    ) -> Vec<BigUint> {
        let sender = NaorPinkas::new(config.clone(), msg_bits, pairs.into()).unwrap();
        let receiver = NaorPinkas::new(config, msg_bits, choices.into()).unwrap();

        let sender = server.register(sender, Phase::Online).unwrap();
        let receiver = client.register(receiver, Phase::Online).unwrap();

        let (sent, received) = tokio::join!(sender.resolve(server), receiver.resolve(client));
        assert!(sent.unwrap().is_empty());
        received.unwrap()
    }

    #[tokio::test]
    async fn test_naor_pinkas_p256() {
        let (mut client, mut server) = parties();

        let received = transfer(
            &mut client,
            &mut server,
            NaorPinkasConfig::default(),
            4,
            pairs(&[(5, 7), (9, 10)]),
            vec![false, true],
        )
        .await;

        assert_eq!(received, vec![BigUint::from(5u32), BigUint::from(10u32)]);
    }

    #[tokio::test]
    async fn test_naor_pinkas_single_bit() {
        let (mut client, mut server) = parties();
        let pairs = pairs(&[(0, 1), (1, 0), (1, 1), (0, 0)]);
        let choices = vec![false, true, true, false];

        let received = transfer(
            &mut client,
            &mut server,
            NaorPinkasConfig::default(),
            1,
            pairs.clone(),
            choices.clone(),
        )
        .await;

        assert_eq!(received, expected(&pairs, &choices));
    }

    #[rstest]
    #[case::secp160r1(CurveId::Secp160r1, false)]
    #[case::p192(CurveId::P192, true)]
    #[case::secp224r1(CurveId::Secp224r1, true)]
    #[case::secp224r1_uncompressed(CurveId::Secp224r1, false)]
    #[case::secp256r1(CurveId::Secp256r1, true)]
    #[tokio::test]
    async fn test_naor_pinkas_curves(#[case] curve: CurveId, #[case] compress: bool) {
        let (mut client, mut server) = parties();

        let mut builder = NaorPinkasConfig::builder();
        builder.curve(curve);
        if compress {
            builder.compress();
        }
        let config = builder.build().unwrap();

        for msg_bits in [1, 7, 128, 256] {
            let pairs = random_pairs(8, msg_bits, msg_bits as u64);
            let choices = random_choices(8, msg_bits as u64 + 1);

            let received = transfer(
                &mut client,
                &mut server,
                config.clone(),
                msg_bits,
                pairs.clone(),
                choices.clone(),
            )
            .await;

            assert_eq!(received, expected(&pairs, &choices));
        }
    }

    #[test]
    fn test_naor_pinkas_schedule() {
        let receiver =
            NaorPinkas::new(NaorPinkasConfig::default(), 8, vec![true].into()).unwrap();

        // The receiver idles while the sender masks its values.
        assert_eq!(
            receiver.schedule(),
            vec![
                tasty_common::Slot::Run(NaorPinkasRound::Wait),
                tasty_common::Slot::Run(NaorPinkasRound::Choose),
                tasty_common::Slot::Noop,
                tasty_common::Slot::Run(NaorPinkasRound::Decrypt),
            ]
        );
    }

    #[test]
    fn test_naor_pinkas_count_mismatch() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let config = NaorPinkasConfig::default();
        let sender = Sender::<P256>::new(config.clone(), 8, random_pairs(2, 8, 0), &mut rng);
        let mut receiver = Receiver::<P256>::new(config, 8, vec![true; 3], &mut rng);

        let payload = receiver.choose(sender.setup()).unwrap();

        assert!(matches!(
            sender.send(payload),
            Err(OtError::CountMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }
}
