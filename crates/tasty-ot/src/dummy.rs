//! An insecure OT in which the sender reveals both values.
//!
//! Useful as a reference in tests and as a fast stand-in for a base OT.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use tasty_common::{Incoming, Protocol, Role, Step};

use crate::{check_count, OtError, OtInput};

/// The sender's values in the clear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DummyMsg {
    /// Both values of every pair.
    pub pairs: Vec<[BigUint; 2]>,
}

/// Rounds of [`DummyOt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DummyRound {
    /// Sender ships the pairs.
    Transfer,
    /// Sender completes.
    Finish,
    /// Receiver picks its values.
    Select,
}

/// Insecure OT.
#[derive(Debug)]
pub struct DummyOt {
    input: OtInput,
}

impl DummyOt {
    /// Creates a new instance for `msg_bits`-bit values.
    pub fn new(msg_bits: usize, input: OtInput) -> Result<Self, OtError> {
        input.validate(msg_bits)?;
        Ok(Self { input })
    }
}

impl Protocol for DummyOt {
    type Msg = DummyMsg;
    type Round = DummyRound;
    type Output = Vec<BigUint>;
    type Error = OtError;

    fn name(&self) -> &'static str {
        "DummyOt"
    }

    fn role(&self) -> Role {
        self.input.role()
    }

    fn rounds(&self, role: Role) -> Vec<DummyRound> {
        match role {
            Role::Server => vec![DummyRound::Transfer, DummyRound::Finish],
            Role::Client => vec![DummyRound::Select],
        }
    }

    fn run_round(
        &mut self,
        round: DummyRound,
        incoming: &mut Incoming<DummyMsg>,
    ) -> Result<Step<DummyMsg, Vec<BigUint>>, OtError> {
        match (round, &self.input) {
            (DummyRound::Transfer, OtInput::Pairs(pairs)) => Ok(Step::Send(vec![DummyMsg {
                pairs: pairs.clone(),
            }])),
            (DummyRound::Finish, OtInput::Pairs(_)) => Ok(Step::Done(Vec::new())),
            (DummyRound::Select, OtInput::Choices(choices)) => {
                let DummyMsg { pairs } = incoming.expect_next()?;
                check_count(choices.len(), pairs.len())?;

                Ok(Step::Done(
                    pairs
                        .into_iter()
                        .zip(choices)
                        .map(|([v0, v1], choice)| if *choice { v1 } else { v0 })
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
    use tasty_common::Phase;

    #[tokio::test]
    async fn test_dummy_ot() {
        let (mut client, mut server) = parties();

        let sender = DummyOt::new(4, pairs(&[(5, 7), (9, 10)]).into()).unwrap();
        let receiver = DummyOt::new(4, vec![false, true].into()).unwrap();

        let sender = server.register(sender, Phase::Online).unwrap();
        let receiver = client.register(receiver, Phase::Online).unwrap();

        let (sent, received) =
            tokio::join!(sender.resolve(&mut server), receiver.resolve(&mut client));

        assert!(sent.unwrap().is_empty());
        assert_eq!(
            received.unwrap(),
            vec![BigUint::from(5u32), BigUint::from(10u32)]
        );
    }

    #[test]
    fn test_dummy_ot_rejects_large_values() {
        assert!(matches!(
            DummyOt::new(3, pairs(&[(5, 9)]).into()),
            Err(OtError::ValueTooLarge { bits: 3, actual: 4 })
        ));
    }
}
