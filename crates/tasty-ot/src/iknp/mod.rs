//! An implementation of the [`IKNP03`](https://www.iacr.org/archive/crypto2003/27290145/27290145.pdf)
//! semi-honest OT extension protocol.
//!
//! `k` base OTs run with swapped roles and transfer 128-bit seed pairs `(s0_j, s1_j)`, which
//! both parties stretch with a ChaCha20 PRG `G` into `m`-bit columns. The receiver's matrix `T`
//! has columns `t^j = G(s0_j)` and it sends `u^j = t^j ^ G(s1_j) ^ r` for its packed choices
//! `r`. The sender, holding `G(s_j)` for its secret bits `s`, computes `q^j = G(s_j) ^ s_j * u^j`
//! and transposes the result into rows `q_i = t_i ^ (r_i * s)`, which mask its pairs through
//! the correlation-robust hash.
//!
//! Batches no larger than the configured threshold skip the extension and run the base OT
//! directly.

mod config;
pub mod msgs;
mod receiver;
mod sender;

pub use config::{
    IknpConfig, IknpConfigBuilder, IknpConfigBuilderError, DEFAULT_SECURITY_PARAMETER,
};

use num_bigint::BigUint;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tasty_common::{Incoming, Protocol, Role, Slot, Step};
use tasty_core::bits::random_bits;
use tracing::{debug, warn};

use crate::{BaseOt, BaseOtMsg, BaseOtRound, OtError, OtInput};
use msgs::Message;
use receiver::Receiver;
use sender::Sender;

/// Length of the seeds transferred by the base OTs.
pub const SEED_BITS: usize = 128;

/// Stretches a base OT seed into `bits` pseudorandom bits.
fn expand_seed(seed: &BigUint, bits: usize) -> BigUint {
    let mut rng_seed = <ChaCha20Rng as SeedableRng>::Seed::default();
    rng_seed
        .iter_mut()
        .zip(seed.to_bytes_le().into_iter().cycle())
        .for_each(|(s, c)| *s = c);

    random_bits(&mut ChaCha20Rng::from_seed(rng_seed), bits)
}

/// Rounds of [`Iknp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IknpRound {
    /// A round of the base OT run in place of the extension.
    Direct(BaseOtRound),
    /// The slot of the base OT schedule at this index.
    Base(usize),
    /// Receiver unmasks the chosen values.
    Unmask,
    /// Sender completes.
    Finish,
}

#[derive(Debug)]
enum Side {
    Sender(Sender),
    Receiver(Receiver),
}

#[derive(Debug)]
enum Mode {
    Direct,
    Extended {
        side: Side,
        schedule: Vec<Slot<BaseOtRound>>,
    },
}

/// IKNP OT extension.
#[derive(Debug)]
pub struct Iknp {
    role: Role,
    base: BaseOt,
    base_incoming: Incoming<BaseOtMsg>,
    mode: Mode,
}

impl Iknp {
    /// Creates a new instance for `msg_bits`-bit values.
    pub fn new(config: IknpConfig, msg_bits: usize, input: OtInput) -> Result<Self, OtError> {
        Self::new_with_seed(config, msg_bits, input, rand::random())
    }

    /// Creates a new instance with the provided RNG seed.
    pub fn new_with_seed(
        config: IknpConfig,
        msg_bits: usize,
        input: OtInput,
        seed: [u8; 32],
    ) -> Result<Self, OtError> {
        input.validate(msg_bits)?;

        let k = config.security_parameter();
        if k == 0 {
            return Err(OtError::InvalidConfig(
                "security parameter must be positive".into(),
            ));
        }

        let role = input.role();
        let count = input.len();
        let mut rng = ChaCha20Rng::from_seed(seed);
        let base_seed: [u8; 32] = rng.gen();

        if count <= config.threshold() {
            debug!(count, threshold = config.threshold(), "running base OT directly");

            return Ok(Self {
                role,
                base: BaseOt::new_with_seed(config.base(), msg_bits, input, base_seed)?,
                base_incoming: Incoming::new(),
                mode: Mode::Direct,
            });
        }

        if count <= k {
            warn!(count, k, "extending fewer OTs than base OTs");
        }

        let (side, base_input) = match input {
            OtInput::Pairs(pairs) => {
                let sender = Sender::new(k, msg_bits, pairs, &mut rng);
                let choices = sender.base_choices();
                (Side::Sender(sender), OtInput::Choices(choices))
            }
            OtInput::Choices(choices) => {
                let receiver = Receiver::new(k, msg_bits, choices, &mut rng);
                let pairs = receiver.base_pairs();
                (Side::Receiver(receiver), OtInput::Pairs(pairs))
            }
        };

        let base = BaseOt::new_with_seed(config.base(), SEED_BITS, base_input, base_seed)?;
        let schedule = base.schedule();

        Ok(Self {
            role,
            base,
            base_incoming: Incoming::new(),
            mode: Mode::Extended { side, schedule },
        })
    }

    /// Returns `true` if the batch is extended rather than run on the base OT.
    pub fn is_extended(&self) -> bool {
        matches!(self.mode, Mode::Extended { .. })
    }

    fn run_base(
        &mut self,
        round: BaseOtRound,
        incoming: &mut Incoming<Message>,
    ) -> Result<Step<BaseOtMsg, Vec<BigUint>>, OtError> {
        incoming.forward(&mut self.base_incoming, Message::try_into_base_msg);
        self.base.run_round(round, &mut self.base_incoming)
    }
}

impl Protocol for Iknp {
    type Msg = Message;
    type Round = IknpRound;
    type Output = Vec<BigUint>;
    type Error = OtError;

    fn name(&self) -> &'static str {
        "Iknp"
    }

    fn role(&self) -> Role {
        self.role
    }

    fn rounds(&self, role: Role) -> Vec<IknpRound> {
        match &self.mode {
            Mode::Direct => self
                .base
                .rounds(role)
                .into_iter()
                .map(IknpRound::Direct)
                .collect(),
            Mode::Extended { schedule, .. } => {
                let last = match role {
                    Role::Server => IknpRound::Finish,
                    Role::Client => IknpRound::Unmask,
                };
                (0..schedule.len())
                    .map(IknpRound::Base)
                    .chain([last])
                    .collect()
            }
        }
    }

    fn run_round(
        &mut self,
        round: IknpRound,
        incoming: &mut Incoming<Message>,
    ) -> Result<Step<Message, Vec<BigUint>>, OtError> {
        match round {
            IknpRound::Direct(round) => {
                Ok(self.run_base(round, incoming)?.map_msgs(Message::BaseMsg))
            }
            IknpRound::Base(index) => {
                let Mode::Extended { side, schedule } = &self.mode else {
                    return Err(OtError::InvalidState("an extended batch"));
                };
                let Some(slot) = schedule.get(index).copied() else {
                    return Err(OtError::InvalidState("a slot of the base schedule"));
                };

                // The correction columns travel with the first base round, idle or not.
                let mut msgs = Vec::new();
                if let (0, Side::Receiver(receiver)) = (index, side) {
                    msgs.push(Message::Extend(receiver.extend()));
                }

                let Slot::Run(round) = slot else {
                    return Ok(Step::Send(msgs));
                };

                match self.run_base(round, incoming)? {
                    Step::Send(base_msgs) => {
                        msgs.extend(base_msgs.into_iter().map(Message::BaseMsg));
                    }
                    Step::Done(seeds) => {
                        if !self.base_incoming.is_empty() {
                            warn!(
                                count = self.base_incoming.len(),
                                "base OT completed with unconsumed messages"
                            );
                        }

                        // The masked pairs go out in the tick the base OT completes.
                        if let Mode::Extended {
                            side: Side::Sender(sender),
                            ..
                        } = &self.mode
                        {
                            let extend = incoming.expect_next()?.try_into_extend()?;
                            msgs.push(Message::MaskedPairs(sender.send(seeds, extend)?));
                        }
                    }
                }

                Ok(Step::Send(msgs))
            }
            IknpRound::Unmask => match &self.mode {
                Mode::Extended {
                    side: Side::Receiver(receiver),
                    ..
                } => {
                    let payload = incoming.expect_next()?.try_into_masked_pairs()?;
                    Ok(Step::Done(receiver.receive(payload)?))
                }
                _ => Err(OtError::InvalidState("an extending receiver")),
            },
            IknpRound::Finish => match &self.mode {
                Mode::Extended {
                    side: Side::Sender(_),
                    ..
                } => Ok(Step::Done(Vec::new())),
                _ => Err(OtError::InvalidState("an extending sender")),
            },
        }
    }
}
