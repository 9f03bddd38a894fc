use crate::{Channel, Engine, EngineConfig, EngineError, Pending, Phase, Protocol, Role};

/// One side of a two-party session: an [`Engine`] and the channel to the peer.
#[derive(Debug)]
pub struct Party<C> {
    engine: Engine,
    channel: C,
}

impl<C: Channel> Party<C> {
    /// Creates a new party.
    pub fn new(role: Role, config: EngineConfig, channel: C) -> Self {
        Self {
            engine: Engine::new(role, config),
            channel,
        }
    }

    /// Returns the role of this party.
    pub fn role(&self) -> Role {
        self.engine.role()
    }

    /// Returns the engine.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Returns the channel.
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Registers a protocol instance to run in `phase`.
    pub fn register<P: Protocol>(
        &mut self,
        protocol: P,
        phase: Phase,
    ) -> Result<Pending<P::Output>, EngineError> {
        self.engine.register(protocol, phase)
    }

    /// Runs every instance registered in `phase` to completion.
    pub async fn run_phase(&mut self, phase: Phase) -> Result<(), EngineError> {
        self.engine.run_phase(phase, &mut self.channel).await
    }

    /// Exchanges run counters with the peer, failing if they differ.
    pub async fn sync(&mut self) -> Result<(), EngineError> {
        self.engine.sync(&mut self.channel).await
    }

    /// Returns the engine and the channel.
    pub fn into_parts(self) -> (Engine, C) {
        (self.engine, self.channel)
    }
}
