use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};

use crate::{Incoming, Role};

/// The result of running a single round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<M, O> {
    /// Messages to send to the peer. More rounds follow.
    Send(Vec<M>),
    /// The protocol completed with the given output.
    Done(O),
}

impl<M, O> Step<M, O> {
    /// A round which sends nothing.
    pub fn empty() -> Self {
        Step::Send(Vec::new())
    }

    /// Maps the outgoing messages.
    pub fn map_msgs<N>(self, f: impl FnMut(M) -> N) -> Step<N, O> {
        match self {
            Step::Send(msgs) => Step::Send(msgs.into_iter().map(f).collect()),
            Step::Done(output) => Step::Done(output),
        }
    }

    /// Maps the output.
    pub fn map_output<U>(self, f: impl FnOnce(O) -> U) -> Step<M, U> {
        match self {
            Step::Send(msgs) => Step::Send(msgs),
            Step::Done(output) => Step::Done(f(output)),
        }
    }
}

/// An entry of an equalized round schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<R> {
    /// Runs the round.
    Run(R),
    /// Padding. Nothing is computed and nothing is sent.
    Noop,
}

/// Pads `rounds` with [`Slot::Noop`] up to `peer_len` entries.
///
/// Padding is inserted before the last round, which stays terminal. Schedules that are
/// already at least as long as the peer's are left as they are.
///
/// An empty schedule stays empty.
pub fn equalize<R>(mut rounds: Vec<R>, peer_len: usize) -> Vec<Slot<R>> {
    if rounds.is_empty() {
        return Vec::new();
    }

    let padding = peer_len.saturating_sub(rounds.len());
    let last = rounds.pop();

    let mut slots: Vec<_> = rounds.into_iter().map(Slot::Run).collect();
    slots.extend((0..padding).map(|_| Slot::Noop));
    slots.extend(last.map(Slot::Run));
    slots
}

/// A two-party protocol expressed as a sequence of rounds.
///
/// Each party executes the rounds of its own role in order. Messages returned by a round are
/// delivered to the peer before its next round. The final round of a role must return
/// [`Step::Done`] and every earlier round must return [`Step::Send`].
pub trait Protocol: Send + 'static {
    /// Messages exchanged by the protocol.
    type Msg: Serialize + DeserializeOwned + Send + 'static;
    /// Round identifiers.
    type Round: Copy + Debug + Send + 'static;
    /// Output of the protocol.
    type Output: Send + 'static;
    /// Error returned by rounds.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Name of the protocol, used to tag transmissions.
    fn name(&self) -> &'static str;

    /// Role this instance plays.
    fn role(&self) -> Role;

    /// Rounds executed by `role`.
    fn rounds(&self, role: Role) -> Vec<Self::Round>;

    /// Runs a round.
    ///
    /// `incoming` holds the messages received from the peer which were not consumed by
    /// earlier rounds.
    fn run_round(
        &mut self,
        round: Self::Round,
        incoming: &mut Incoming<Self::Msg>,
    ) -> Result<Step<Self::Msg, Self::Output>, Self::Error>;

    /// Returns the rounds of this instance equalized against the peer's.
    fn schedule(&self) -> Vec<Slot<Self::Round>> {
        let peer_len = self.rounds(self.role().peer()).len();
        equalize(self.rounds(self.role()), peer_len)
    }
}
