//! Selection of the base OT used by [`Iknp`](crate::Iknp).

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use tasty_common::{Incoming, Protocol, Role, Step};
use tracing::warn;

use crate::{
    dummy::{DummyMsg, DummyOt, DummyRound},
    naor_pinkas::{self, NaorPinkas, NaorPinkasConfig, NaorPinkasRound},
    paillier::{self, PaillierOt, PaillierOtConfig, PaillierRound},
    OtError, OtInput,
};

/// The available base OTs.
#[derive(Debug, Clone)]
pub enum BaseOtKind {
    /// Insecure OT revealing both values.
    Dummy,
    /// Naor-Pinkas OT.
    NaorPinkas(NaorPinkasConfig),
    /// Paillier OT.
    Paillier(PaillierOtConfig),
}

impl Default for BaseOtKind {
    fn default() -> Self {
        BaseOtKind::NaorPinkas(NaorPinkasConfig::default())
    }
}

/// A message of any base OT.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum BaseOtMsg {
    Dummy(DummyMsg),
    NaorPinkas(naor_pinkas::msgs::Message),
    Paillier(paillier::msgs::Message),
}

/// A round of any base OT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum BaseOtRound {
    Dummy(DummyRound),
    NaorPinkas(NaorPinkasRound),
    Paillier(PaillierRound),
}

#[derive(Debug)]
enum Inner {
    Dummy(DummyOt, Incoming<DummyMsg>),
    NaorPinkas(NaorPinkas, Incoming<naor_pinkas::msgs::Message>),
    Paillier(PaillierOt, Incoming<paillier::msgs::Message>),
}

/// One of the base OTs, selected at runtime.
#[derive(Debug)]
pub struct BaseOt {
    inner: Inner,
}

impl BaseOt {
    /// Creates a new instance of `kind` for `msg_bits`-bit values.
    pub fn new(kind: &BaseOtKind, msg_bits: usize, input: OtInput) -> Result<Self, OtError> {
        Self::new_with_seed(kind, msg_bits, input, rand::random())
    }

    /// Creates a new instance with the provided RNG seed.
    pub fn new_with_seed(
        kind: &BaseOtKind,
        msg_bits: usize,
        input: OtInput,
        seed: [u8; 32],
    ) -> Result<Self, OtError> {
        let inner = match kind {
            BaseOtKind::Dummy => Inner::Dummy(DummyOt::new(msg_bits, input)?, Incoming::new()),
            BaseOtKind::NaorPinkas(config) => Inner::NaorPinkas(
                NaorPinkas::new_with_seed(config.clone(), msg_bits, input, seed)?,
                Incoming::new(),
            ),
            BaseOtKind::Paillier(config) => Inner::Paillier(
                PaillierOt::new_with_seed(config.clone(), msg_bits, input, seed)?,
                Incoming::new(),
            ),
        };

        Ok(Self { inner })
    }
}

/// Runs a round of a wrapped protocol on the messages addressed to it.
fn drive<P>(
    protocol: &mut P,
    buffer: &mut Incoming<P::Msg>,
    round: P::Round,
    incoming: &mut Incoming<BaseOtMsg>,
    unwrap: impl FnMut(BaseOtMsg) -> Result<P::Msg, BaseOtMsg>,
    wrap: impl FnMut(P::Msg) -> BaseOtMsg,
) -> Result<Step<BaseOtMsg, Vec<BigUint>>, OtError>
where
    P: Protocol<Output = Vec<BigUint>, Error = OtError>,
{
    incoming.forward(buffer, unwrap);

    let step = protocol.run_round(round, buffer)?;
    if matches!(step, Step::Done(_)) && !buffer.is_empty() {
        warn!(
            protocol = protocol.name(),
            count = buffer.len(),
            "base OT completed with unconsumed messages"
        );
    }

    Ok(step.map_msgs(wrap))
}

impl Protocol for BaseOt {
    type Msg = BaseOtMsg;
    type Round = BaseOtRound;
    type Output = Vec<BigUint>;
    type Error = OtError;

    fn name(&self) -> &'static str {
        match &self.inner {
            Inner::Dummy(ot, _) => ot.name(),
            Inner::NaorPinkas(ot, _) => ot.name(),
            Inner::Paillier(ot, _) => ot.name(),
        }
    }

    fn role(&self) -> Role {
        match &self.inner {
            Inner::Dummy(ot, _) => ot.role(),
            Inner::NaorPinkas(ot, _) => ot.role(),
            Inner::Paillier(ot, _) => ot.role(),
        }
    }

    fn rounds(&self, role: Role) -> Vec<BaseOtRound> {
        match &self.inner {
            Inner::Dummy(ot, _) => ot
                .rounds(role)
                .into_iter()
                .map(BaseOtRound::Dummy)
                .collect(),
            Inner::NaorPinkas(ot, _) => ot
                .rounds(role)
                .into_iter()
                .map(BaseOtRound::NaorPinkas)
                .collect(),
            Inner::Paillier(ot, _) => ot
                .rounds(role)
                .into_iter()
                .map(BaseOtRound::Paillier)
                .collect(),
        }
    }

    fn run_round(
        &mut self,
        round: BaseOtRound,
        incoming: &mut Incoming<BaseOtMsg>,
    ) -> Result<Step<BaseOtMsg, Vec<BigUint>>, OtError> {
        match (&mut self.inner, round) {
            (Inner::Dummy(ot, buffer), BaseOtRound::Dummy(round)) => drive(
                ot,
                buffer,
                round,
                incoming,
                |msg| match msg {
                    BaseOtMsg::Dummy(msg) => Ok(msg),
                    other => Err(other),
                },
                BaseOtMsg::Dummy,
            ),
            (Inner::NaorPinkas(ot, buffer), BaseOtRound::NaorPinkas(round)) => drive(
                ot,
                buffer,
                round,
                incoming,
                |msg| match msg {
                    BaseOtMsg::NaorPinkas(msg) => Ok(msg),
                    other => Err(other),
                },
                BaseOtMsg::NaorPinkas,
            ),
            (Inner::Paillier(ot, buffer), BaseOtRound::Paillier(round)) => drive(
                ot,
                buffer,
                round,
                incoming,
                |msg| match msg {
                    BaseOtMsg::Paillier(msg) => Ok(msg),
                    other => Err(other),
                },
                BaseOtMsg::Paillier,
            ),
            _ => Err(OtError::InvalidState("a round of the selected base OT")),
        }
    }
}
