//! Beaver derandomization of precomputed random OTs.
//!
//! A random OT leaves the sender with a pair `(r0, r1)` and the receiver with a random bit `c`
//! and `r_c`. Online, the receiver sends `e = b ^ c` for its real choice `b`, the sender replies
//! with `(x0 ^ r_e, x1 ^ r_{1 ^ e})` and the receiver unmasks `x_b` with `r_c`.

use itybity::{FromBitIterator, ToBits};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use tasty_common::{Incoming, Protocol, Role, Step};

use crate::{
    check_count, check_values,
    msgs::{Derandomize, MaskedPairs},
    OtError,
};

/// A Beaver OT message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum BeaverMsg {
    Derandomize(Derandomize),
    MaskedPairs(MaskedPairs),
}

/// Rounds of [`BeaverOt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeaverRound {
    /// Receiver sends its correction bits.
    Correct,
    /// Sender waits for the corrections.
    Wait,
    /// Sender masks its values with the corrected random pairs.
    Transfer,
    /// Sender completes.
    Finish,
    /// Receiver unmasks the chosen values.
    Decrypt,
}

enum State {
    Sender {
        random: Vec<[BigUint; 2]>,
        pairs: Vec<[BigUint; 2]>,
    },
    Receiver {
        random_choices: Vec<bool>,
        random_values: Vec<BigUint>,
        choices: Vec<bool>,
    },
}

/// Online OT consuming precomputed random OTs.
pub struct BeaverOt {
    state: State,
}

opaque_debug::implement!(BeaverOt);

impl BeaverOt {
    /// Creates the sender from the random pairs of as many precomputed OTs as it has `pairs`.
    pub fn new_sender(
        msg_bits: usize,
        random: Vec<[BigUint; 2]>,
        pairs: Vec<[BigUint; 2]>,
    ) -> Result<Self, OtError> {
        check_values(&pairs, msg_bits)?;
        check_count(pairs.len(), random.len())?;

        Ok(Self {
            state: State::Sender { random, pairs },
        })
    }

    /// Creates the receiver from the random choices and values of as many precomputed OTs as
    /// it has `choices`.
    pub fn new_receiver(
        random_choices: Vec<bool>,
        random_values: Vec<BigUint>,
        choices: Vec<bool>,
    ) -> Result<Self, OtError> {
        check_count(choices.len(), random_choices.len())?;
        check_count(choices.len(), random_values.len())?;

        Ok(Self {
            state: State::Receiver {
                random_choices,
                random_values,
                choices,
            },
        })
    }
}

impl Protocol for BeaverOt {
    type Msg = BeaverMsg;
    type Round = BeaverRound;
    type Output = Vec<BigUint>;
    type Error = OtError;

    fn name(&self) -> &'static str {
        "BeaverOt"
    }

    fn role(&self) -> Role {
        match self.state {
            State::Sender { .. } => Role::Server,
            State::Receiver { .. } => Role::Client,
        }
    }

    fn rounds(&self, role: Role) -> Vec<BeaverRound> {
        match role {
            Role::Server => vec![BeaverRound::Wait, BeaverRound::Transfer, BeaverRound::Finish],
            Role::Client => vec![BeaverRound::Correct, BeaverRound::Decrypt],
        }
    }

    fn run_round(
        &mut self,
        round: BeaverRound,
        incoming: &mut Incoming<BeaverMsg>,
    ) -> Result<Step<BeaverMsg, Vec<BigUint>>, OtError> {
        match (round, &self.state) {
            (BeaverRound::Wait, State::Sender { .. }) => Ok(Step::empty()),
            (BeaverRound::Transfer, State::Sender { random, pairs }) => {
                let BeaverMsg::Derandomize(Derandomize { flip }) = incoming.expect_next()? else {
                    return Err(OtError::UnexpectedMessage("Derandomize"));
                };
                check_count((pairs.len() + 7) / 8, flip.len())?;

                let pairs = random
                    .iter()
                    .zip(pairs)
                    .zip(flip.iter_lsb0())
                    .map(|(([r0, r1], [x0, x1]), flip)| {
                        if flip {
                            [x0 ^ r1, x1 ^ r0]
                        } else {
                            [x0 ^ r0, x1 ^ r1]
                        }
                    })
                    .collect();

                Ok(Step::Send(vec![BeaverMsg::MaskedPairs(MaskedPairs {
                    pairs,
                })]))
            }
            (BeaverRound::Finish, State::Sender { .. }) => Ok(Step::Done(Vec::new())),
            (
                BeaverRound::Correct,
                State::Receiver {
                    random_choices,
                    choices,
                    ..
                },
            ) => {
                let flip = Vec::<u8>::from_lsb0_iter(
                    choices
                        .iter()
                        .zip(random_choices)
                        .map(|(choice, random)| choice ^ random),
                );

                Ok(Step::Send(vec![BeaverMsg::Derandomize(Derandomize {
                    flip,
                })]))
            }
            (
                BeaverRound::Decrypt,
                State::Receiver {
                    random_values,
                    choices,
                    ..
                },
            ) => {
                let BeaverMsg::MaskedPairs(MaskedPairs { pairs }) = incoming.expect_next()? else {
                    return Err(OtError::UnexpectedMessage("MaskedPairs"));
                };
                check_count(choices.len(), pairs.len())?;

                // `y_b = x_b ^ r_{b ^ e}` and `b ^ e = c`.
                Ok(Step::Done(
                    pairs
                        .iter()
                        .zip(choices)
                        .zip(random_values)
                        .map(|((pair, choice), r)| &pair[*choice as usize] ^ r)
                        .collect(),
                ))
            }
            _ => Err(OtError::InvalidState("a round of the own role")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use tasty_common::Phase;

    /// Random OTs as a precomputation would leave them.
    fn random_ots(count: usize, msg_bits: usize) -> (Vec<[BigUint; 2]>, Vec<bool>, Vec<BigUint>) {
        let random = random_pairs(count, msg_bits, 42);
        let choices = random_choices(count, 43);
        let values = expected(&random, &choices);
        (random, choices, values)
    }

    #[rstest]
    #[case::small(4, pairs(&[(5, 7), (9, 10)]), vec![false, true])]
    #[case::unaligned(81, random_pairs(13, 81, 1), random_choices(13, 2))]
    #[case::empty(8, vec![], vec![])]
    #[tokio::test]
    async fn test_beaver_ot(
        #[case] msg_bits: usize,
        #[case] pairs: Vec<[BigUint; 2]>,
        #[case] choices: Vec<bool>,
    ) {
        let (mut client, mut server) = parties();
        let (random, random_choices, random_values) = random_ots(pairs.len(), msg_bits);
        let expected = expected(&pairs, &choices);

        let sender = BeaverOt::new_sender(msg_bits, random, pairs).unwrap();
        let receiver = BeaverOt::new_receiver(random_choices, random_values, choices).unwrap();

        let sender = server.register(sender, Phase::Online).unwrap();
        let receiver = client.register(receiver, Phase::Online).unwrap();

        let (sent, received) =
            tokio::join!(sender.resolve(&mut server), receiver.resolve(&mut client));

        assert!(sent.unwrap().is_empty());
        assert_eq!(received.unwrap(), expected);
    }

    #[test]
    fn test_beaver_ot_count_mismatch() {
        let (random, random_choices, random_values) = random_ots(3, 8);

        assert!(matches!(
            BeaverOt::new_sender(8, random, random_pairs(2, 8, 0)),
            Err(OtError::CountMismatch {
                expected: 2,
                actual: 3
            })
        ));
        assert!(matches!(
            BeaverOt::new_receiver(random_choices, random_values, vec![true; 4]),
            Err(OtError::CountMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_beaver_ot_rejects_short_flip() {
        let (random, _, _) = random_ots(9, 8);
        let mut sender = BeaverOt::new_sender(8, random, random_pairs(9, 8, 0)).unwrap();

        let mut incoming = Incoming::new();
        incoming.push(BeaverMsg::Derandomize(Derandomize { flip: vec![0] }));

        assert!(matches!(
            sender.run_round(BeaverRound::Transfer, &mut incoming),
            Err(OtError::CountMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }
}
