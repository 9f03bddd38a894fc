use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use futures::channel::oneshot;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, instrument, trace, warn};

use crate::{
    channel::{read_frame, recv, send, write_frame, HEADER_LEN},
    Channel, EngineConfig, EngineError, Incoming, InstanceId, Party, Phase, Protocol, Role, Slot,
    Step,
};

/// Execution statistics of a phase, accumulated over all of its runs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PhaseStats {
    /// Number of times the phase was run.
    pub runs: u64,
    /// Number of lockstep ticks.
    pub ticks: u64,
    /// Number of rounds executed, summed over all instances.
    pub rounds: u64,
    /// Frames written, including tags and sentinels.
    pub frames_sent: u64,
    /// Frames read, including tags and sentinels.
    pub frames_received: u64,
    /// Bytes written, including frame headers.
    pub bytes_sent: u64,
    /// Bytes read, including frame headers.
    pub bytes_received: u64,
    /// Wall time spent running the phase.
    pub duration: Duration,
}

/// Outcome of running a single slot.
enum Tick {
    /// Encoded messages to send.
    Send(Vec<Vec<u8>>),
    /// The instance completed.
    Done,
}

/// A registered protocol instance with its type erased.
trait Runnable: Send {
    fn id(&self) -> InstanceId;

    fn name(&self) -> &'static str;

    fn tick(&mut self) -> Result<Tick, EngineError>;

    fn receive(&mut self, frames: Vec<Vec<u8>>) -> Result<(), EngineError>;

    fn tag(&self) -> String {
        format!("{} {}", self.name(), self.id())
    }
}

struct Instance<P: Protocol> {
    id: InstanceId,
    protocol: P,
    slots: VecDeque<Slot<P::Round>>,
    incoming: Incoming<P::Msg>,
    output: Option<oneshot::Sender<P::Output>>,
}

impl<P: Protocol> Instance<P> {
    fn contract(&self, reason: &'static str) -> EngineError {
        EngineError::RoundContract {
            protocol: self.protocol.name(),
            id: self.id,
            reason,
        }
    }
}

impl<P: Protocol> Runnable for Instance<P> {
    fn id(&self) -> InstanceId {
        self.id
    }

    fn name(&self) -> &'static str {
        self.protocol.name()
    }

    fn tick(&mut self) -> Result<Tick, EngineError> {
        let slot = self
            .slots
            .pop_front()
            .ok_or_else(|| self.contract("no rounds left"))?;
        let terminal = self.slots.is_empty();

        let round = match slot {
            Slot::Run(round) => round,
            Slot::Noop if terminal => return Err(self.contract("terminal slot is padding")),
            Slot::Noop => return Ok(Tick::Send(Vec::new())),
        };

        trace!(protocol = self.name(), id = %self.id, ?round, "running round");

        let step = self
            .protocol
            .run_round(round, &mut self.incoming)
            .map_err(|err| EngineError::Protocol {
                protocol: self.protocol.name(),
                id: self.id,
                source: Box::new(err),
            })?;

        match step {
            Step::Send(msgs) if !terminal => Ok(Tick::Send(
                msgs.iter()
                    .map(bincode::serialize)
                    .collect::<Result<_, _>>()?,
            )),
            Step::Send(_) => Err(self.contract("terminal round did not complete")),
            Step::Done(output) if terminal => {
                if !self.incoming.is_empty() {
                    warn!(
                        protocol = self.name(),
                        id = %self.id,
                        unconsumed = self.incoming.len(),
                        "protocol completed with unconsumed messages"
                    );
                }
                if let Some(sender) = self.output.take() {
                    // The caller may have dropped its handle.
                    _ = sender.send(output);
                }
                Ok(Tick::Done)
            }
            Step::Done(_) => Err(self.contract("completed before its terminal round")),
        }
    }

    fn receive(&mut self, frames: Vec<Vec<u8>>) -> Result<(), EngineError> {
        for frame in frames {
            self.incoming.push(bincode::deserialize(&frame)?);
        }
        Ok(())
    }
}

/// A handle to the output of a registered protocol instance.
///
/// The output becomes available once the phase the instance was registered in has run.
#[derive(Debug)]
#[must_use]
pub struct Pending<T> {
    id: InstanceId,
    name: &'static str,
    phase: Phase,
    registered_at: u64,
    rx: oneshot::Receiver<T>,
}

impl<T> Pending<T> {
    /// Returns the id of the instance.
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Returns the name of the protocol.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the phase the instance was registered in.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns `true` if the phase has run since the instance was registered.
    pub fn is_ready(&self, engine: &Engine) -> bool {
        engine.completed(self.phase) > self.registered_at
    }

    /// Returns the output, running the phase first if it has not run since the instance was
    /// registered.
    pub async fn resolve<C: Channel>(self, party: &mut Party<C>) -> Result<T, EngineError> {
        if !self.is_ready(party.engine()) {
            party.run_phase(self.phase).await?;
        }
        self.take()
    }

    /// Returns the output without running anything.
    pub fn take(mut self) -> Result<T, EngineError> {
        match self.rx.try_recv() {
            Ok(Some(output)) => Ok(output),
            _ => Err(EngineError::ResultUnavailable {
                protocol: self.name,
                id: self.id,
            }),
        }
    }
}

/// Logs the instances discarded when a phase run fails, their handles reporting
/// [`EngineError::ResultUnavailable`] afterwards.
fn log_dropped<'a>(err: &EngineError, instances: impl Iterator<Item = &'a Box<dyn Runnable>>) {
    let dropped: Vec<String> = instances.map(|instance| instance.tag()).collect();
    if !dropped.is_empty() {
        warn!(%err, ?dropped, "phase aborted, dropping pending instances");
    }
}

/// Drives registered protocol instances in lockstep with the peer.
pub struct Engine {
    role: Role,
    config: EngineConfig,
    next_id: u64,
    phase: Phase,
    precompute: Vec<Box<dyn Runnable>>,
    online: Vec<Box<dyn Runnable>>,
    completed_precompute: u64,
    completed_online: u64,
    precompute_stats: PhaseStats,
    online_stats: PhaseStats,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("role", &self.role)
            .field("phase", &self.phase)
            .field("pending_precompute", &self.precompute.len())
            .field("pending_online", &self.online.len())
            .field("completed_precompute", &self.completed_precompute)
            .field("completed_online", &self.completed_online)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Creates a new engine.
    pub fn new(role: Role, config: EngineConfig) -> Self {
        Self {
            role,
            config,
            next_id: 0,
            phase: Phase::Precompute,
            precompute: Vec::new(),
            online: Vec::new(),
            completed_precompute: 0,
            completed_online: 0,
            precompute_stats: PhaseStats::default(),
            online_stats: PhaseStats::default(),
        }
    }

    /// Returns the role of this party.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the current phase. Switches to [`Phase::Online`] when the online phase first
    /// runs and never switches back.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns how many times `phase` has run.
    pub fn completed(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Precompute => self.completed_precompute,
            Phase::Online => self.completed_online,
        }
    }

    /// Returns the number of instances waiting for `phase` to run.
    pub fn pending(&self, phase: Phase) -> usize {
        match phase {
            Phase::Precompute => self.precompute.len(),
            Phase::Online => self.online.len(),
        }
    }

    /// Returns the statistics of `phase`.
    pub fn stats(&self, phase: Phase) -> &PhaseStats {
        match phase {
            Phase::Precompute => &self.precompute_stats,
            Phase::Online => &self.online_stats,
        }
    }

    /// Registers a protocol instance to run in `phase`.
    ///
    /// The peer must register the matching instance at the same position.
    pub fn register<P: Protocol>(
        &mut self,
        protocol: P,
        phase: Phase,
    ) -> Result<Pending<P::Output>, EngineError> {
        if protocol.role() != self.role {
            return Err(EngineError::RoleMismatch {
                protocol: protocol.name(),
                expected: self.role,
                actual: protocol.role(),
            });
        }

        let slots: VecDeque<_> = protocol.schedule().into();
        if slots.is_empty() {
            return Err(EngineError::EmptySchedule(protocol.name()));
        }

        let id = InstanceId::new(self.next_id);
        self.next_id += 1;

        let name = protocol.name();
        let (tx, rx) = oneshot::channel();

        debug!(protocol = name, %id, %phase, rounds = slots.len(), "registered");

        let instance = Instance {
            id,
            protocol,
            slots,
            incoming: Incoming::new(),
            output: Some(tx),
        };
        self.registry_mut(phase).push(Box::new(instance));

        Ok(Pending {
            id,
            name,
            phase,
            registered_at: self.completed(phase),
            rx,
        })
    }

    /// Runs every instance registered in `phase` to completion.
    ///
    /// Each tick runs one round of every pending instance, then exchanges the messages of all
    /// instances which are still running with the peer.
    #[instrument(level = "debug", skip_all, fields(role = %self.role, %phase), err)]
    pub async fn run_phase<C: Channel>(
        &mut self,
        phase: Phase,
        channel: &mut C,
    ) -> Result<(), EngineError> {
        if phase == Phase::Online {
            self.phase = Phase::Online;
        }

        let start = Instant::now();
        let checks = self.config.consistency_checks();
        let max_frame_len = self.config.max_frame_len();
        let mut stats = PhaseStats {
            runs: 1,
            ..Default::default()
        };

        let mut registry = std::mem::take(self.registry_mut(phase));
        while !registry.is_empty() {
            stats.ticks += 1;
            stats.rounds += registry.len() as u64;

            let mut outgoing = Vec::with_capacity(registry.len());
            let mut running = Vec::with_capacity(registry.len());
            let mut instances = registry.into_iter();
            while let Some(mut instance) = instances.next() {
                match instance.tick() {
                    Ok(Tick::Send(frames)) => {
                        outgoing.push((instance.tag(), frames));
                        running.push(instance);
                    }
                    Ok(Tick::Done) => {
                        debug!(protocol = instance.name(), id = %instance.id(), "completed")
                    }
                    Err(err) => {
                        log_dropped(&err, running.iter().chain(instances.as_slice()));
                        return Err(err);
                    }
                }
            }
            registry = running;

            if registry.is_empty() {
                break;
            }

            let expected: Vec<_> = registry.iter().map(|instance| instance.tag()).collect();
            let (reader, writer) = channel.split_mut();
            let exchanged = futures::try_join!(
                write_round(
                    writer,
                    &outgoing,
                    checks,
                    &mut stats.frames_sent,
                    &mut stats.bytes_sent
                ),
                read_round(reader, &expected, checks, max_frame_len),
            );
            let received = match exchanged {
                Ok((_, received)) => received,
                Err(err) => {
                    log_dropped(&err, registry.iter());
                    return Err(err);
                }
            };

            for (index, (frames, bytes)) in received.into_iter().enumerate() {
                stats.frames_received += frames.len() as u64 + 1 + u64::from(checks);
                stats.bytes_received += bytes;
                if let Err(err) = registry[index].receive(frames) {
                    log_dropped(&err, registry.iter());
                    return Err(err);
                }
            }
        }

        match phase {
            Phase::Precompute => self.completed_precompute += 1,
            Phase::Online => self.completed_online += 1,
        }

        stats.duration = start.elapsed();
        debug!(
            ticks = stats.ticks,
            rounds = stats.rounds,
            elapsed = ?stats.duration,
            "phase complete"
        );
        self.stats_mut(phase).accumulate(&stats);

        if self.config.sync_phases() {
            self.sync(channel).await?;
        }

        Ok(())
    }

    /// Exchanges run counters with the peer, failing if they differ.
    #[instrument(level = "debug", skip_all, err)]
    pub async fn sync<C: Channel>(&mut self, channel: &mut C) -> Result<(), EngineError> {
        let local = (self.completed_precompute, self.completed_online);
        let (reader, writer) = channel.split_mut();

        let (_, peer): (_, (u64, u64)) = futures::try_join!(
            send(writer, &local),
            recv(reader, self.config.max_frame_len()),
        )?;

        if peer != local {
            return Err(EngineError::Desync { local, peer });
        }

        Ok(())
    }

    fn registry_mut(&mut self, phase: Phase) -> &mut Vec<Box<dyn Runnable>> {
        match phase {
            Phase::Precompute => &mut self.precompute,
            Phase::Online => &mut self.online,
        }
    }

    fn stats_mut(&mut self, phase: Phase) -> &mut PhaseStats {
        match phase {
            Phase::Precompute => &mut self.precompute_stats,
            Phase::Online => &mut self.online_stats,
        }
    }
}

impl PhaseStats {
    fn accumulate(&mut self, other: &PhaseStats) {
        self.runs += other.runs;
        self.ticks += other.ticks;
        self.rounds += other.rounds;
        self.frames_sent += other.frames_sent;
        self.frames_received += other.frames_received;
        self.bytes_sent += other.bytes_sent;
        self.bytes_received += other.bytes_received;
        self.duration += other.duration;
    }
}

/// Writes the transmissions of one tick: per instance an optional tag, its messages and the
/// sentinel.
async fn write_round<W: AsyncWrite + Unpin>(
    writer: &mut W,
    outgoing: &[(String, Vec<Vec<u8>>)],
    checks: bool,
    frames_sent: &mut u64,
    bytes_sent: &mut u64,
) -> Result<(), EngineError> {
    let mut writer = BufWriter::new(writer);
    for (tag, frames) in outgoing {
        if checks {
            let tag = bincode::serialize(tag)?;
            *bytes_sent += write_frame(&mut writer, Some(&tag)).await? as u64;
            *frames_sent += 1;
        }
        for frame in frames {
            *bytes_sent += write_frame(&mut writer, Some(frame)).await? as u64;
            *frames_sent += 1;
        }
        *bytes_sent += write_frame(&mut writer, None).await? as u64;
        *frames_sent += 1;
    }
    writer.flush().await?;
    Ok(())
}

/// Reads the transmissions of one tick, returning the messages of every instance and the
/// number of bytes read for it.
async fn read_round<R: AsyncRead + Unpin>(
    reader: &mut R,
    expected: &[String],
    checks: bool,
    max_frame_len: usize,
) -> Result<Vec<(Vec<Vec<u8>>, u64)>, EngineError> {
    let mut received = Vec::with_capacity(expected.len());
    for expected in expected {
        let mut bytes = 0;
        if checks {
            let Some(tag) = read_frame(reader, max_frame_len).await? else {
                return Err(EngineError::MissingTag(expected.clone()));
            };
            bytes += (HEADER_LEN + tag.len()) as u64;

            let actual: String = bincode::deserialize(&tag)?;
            if &actual != expected {
                return Err(EngineError::TagMismatch {
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        let mut frames = Vec::new();
        while let Some(frame) = read_frame(reader, max_frame_len).await? {
            bytes += (HEADER_LEN + frame.len()) as u64;
            frames.push(frame);
        }
        bytes += HEADER_LEN as u64;

        received.push((frames, bytes));
    }
    Ok(received)
}
