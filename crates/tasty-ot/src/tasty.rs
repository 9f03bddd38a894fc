//! Precomputed OT pool spent through Beaver derandomization.

use std::collections::VecDeque;

use derive_builder::Builder;
use num_bigint::BigUint;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tasty_common::{Channel, Party, Pending, Phase, Role};
use tasty_core::bits::random_bits;
use tracing::{debug, instrument};

use crate::{
    iknp::{IknpConfig, DEFAULT_SECURITY_PARAMETER},
    check_count, BaseOt, BaseOtKind, BeaverOt, Iknp, OtError, OtInput,
};

/// Default message length.
pub const DEFAULT_MSG_BITS: usize = 81;

/// TASTY OT configuration, shared by both roles.
#[derive(Debug, Clone, Builder)]
pub struct TastyOtConfig {
    /// The base OT.
    #[builder(default)]
    base: BaseOtKind,
    /// Whether precomputation extends the base OT.
    #[builder(default = "true")]
    extension: bool,
    /// Number of base OTs of the extension.
    #[builder(default = "DEFAULT_SECURITY_PARAMETER")]
    security_parameter: usize,
    /// Batches of at most this many OTs are not extended.
    #[builder(setter(strip_option), default)]
    threshold: Option<usize>,
    /// Bit length of the transferred values.
    #[builder(default = "DEFAULT_MSG_BITS")]
    msg_bits: usize,
}

impl Default for TastyOtConfig {
    fn default() -> Self {
        Self {
            base: BaseOtKind::default(),
            extension: true,
            security_parameter: DEFAULT_SECURITY_PARAMETER,
            threshold: None,
            msg_bits: DEFAULT_MSG_BITS,
        }
    }
}

impl TastyOtConfig {
    /// Creates a new builder for TastyOtConfig.
    pub fn builder() -> TastyOtConfigBuilder {
        TastyOtConfigBuilder::default()
    }

    /// The base OT.
    pub fn base(&self) -> &BaseOtKind {
        &self.base
    }

    /// Whether precomputation extends the base OT.
    pub fn extension(&self) -> bool {
        self.extension
    }

    /// Number of base OTs of the extension.
    pub fn security_parameter(&self) -> usize {
        self.security_parameter
    }

    /// Bit length of the transferred values.
    pub fn msg_bits(&self) -> usize {
        self.msg_bits
    }

    fn iknp(&self) -> Result<IknpConfig, OtError> {
        let mut builder = IknpConfig::builder();
        builder
            .base(self.base.clone())
            .security_parameter(self.security_parameter);
        if let Some(threshold) = self.threshold {
            builder.threshold(threshold);
        }

        builder
            .build()
            .map_err(|err| OtError::InvalidConfig(err.to_string()))
    }
}

enum Pool {
    Sender(VecDeque<[BigUint; 2]>),
    Receiver {
        choices: VecDeque<bool>,
        values: VecDeque<BigUint>,
    },
}

/// OT façade for higher level protocols.
///
/// Random OTs are generated in the precompute phase and consumed in order by
/// [`next_ots`](Self::next_ots), each batch costing one Beaver round trip online. Both parties
/// must precompute and consume the same counts in the same order.
pub struct TastyOt {
    config: TastyOtConfig,
    role: Role,
    rng: ChaCha20Rng,
    pool: Pool,
}

opaque_debug::implement!(TastyOt);

impl TastyOt {
    /// Creates an empty pool for `role`.
    pub fn new(role: Role, config: TastyOtConfig) -> Self {
        Self::new_with_seed(role, config, rand::random())
    }

    /// Creates an empty pool with the provided RNG seed.
    pub fn new_with_seed(role: Role, config: TastyOtConfig, seed: [u8; 32]) -> Self {
        let pool = match role {
            Role::Server => Pool::Sender(VecDeque::new()),
            Role::Client => Pool::Receiver {
                choices: VecDeque::new(),
                values: VecDeque::new(),
            },
        };

        Self {
            config,
            role,
            rng: ChaCha20Rng::from_seed(seed),
            pool,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TastyOtConfig {
        &self.config
    }

    /// Returns the role of this pool.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the number of precomputed OTs not yet consumed.
    pub fn remaining(&self) -> usize {
        match &self.pool {
            Pool::Sender(pairs) => pairs.len(),
            Pool::Receiver { choices, .. } => choices.len(),
        }
    }

    /// Precomputes `count` random OTs with the peer, running the precompute phase.
    #[instrument(level = "debug", skip_all, fields(role = %self.role, count = count), err)]
    pub async fn precompute<C: Channel>(
        &mut self,
        party: &mut Party<C>,
        count: usize,
    ) -> Result<(), OtError> {
        self.check_role(party.role())?;

        let msg_bits = self.config.msg_bits;
        let input = match self.role {
            Role::Server => OtInput::Pairs(
                (0..count)
                    .map(|_| {
                        [
                            random_bits(&mut self.rng, msg_bits),
                            random_bits(&mut self.rng, msg_bits),
                        ]
                    })
                    .collect(),
            ),
            Role::Client => OtInput::Choices((0..count).map(|_| self.rng.gen()).collect()),
        };

        let seed: [u8; 32] = self.rng.gen();
        let pending: Pending<Vec<BigUint>> = if self.config.extension {
            let iknp = Iknp::new_with_seed(self.config.iknp()?, msg_bits, input.clone(), seed)?;
            party.register(iknp, Phase::Precompute)?
        } else {
            let base = BaseOt::new_with_seed(&self.config.base, msg_bits, input.clone(), seed)?;
            party.register(base, Phase::Precompute)?
        };

        let values = pending.resolve(party).await?;

        match (&mut self.pool, input) {
            (Pool::Sender(pool), OtInput::Pairs(pairs)) => pool.extend(pairs),
            (Pool::Receiver { choices, values: pool }, OtInput::Choices(chosen)) => {
                check_count(chosen.len(), values.len())?;
                choices.extend(chosen);
                pool.extend(values);
            }
            _ => return Err(OtError::InvalidState("input of the own role")),
        }

        debug!(remaining = self.remaining(), "precomputed OTs");

        Ok(())
    }

    /// Registers an online OT of `input`, consuming as many precomputed OTs.
    ///
    /// The receiver's [`Pending`] resolves to the chosen values in request order, the sender's
    /// to an empty vector.
    pub fn next_ots<C: Channel>(
        &mut self,
        party: &mut Party<C>,
        input: OtInput,
    ) -> Result<Pending<Vec<BigUint>>, OtError> {
        self.check_role(party.role())?;
        self.check_role(input.role())?;
        input.validate(self.config.msg_bits)?;

        let requested = input.len();
        let available = self.remaining();
        if requested > available {
            return Err(OtError::PoolExhausted {
                requested,
                available,
            });
        }

        let beaver = match (&mut self.pool, input) {
            (Pool::Sender(pool), OtInput::Pairs(pairs)) => {
                let random = pool.drain(..requested).collect();
                BeaverOt::new_sender(self.config.msg_bits, random, pairs)?
            }
            (Pool::Receiver { choices, values }, OtInput::Choices(chosen)) => {
                let random_choices = choices.drain(..requested).collect();
                let random_values = values.drain(..requested).collect();
                BeaverOt::new_receiver(random_choices, random_values, chosen)?
            }
            _ => return Err(OtError::InvalidState("input of the own role")),
        };

        Ok(party.register(beaver, Phase::Online)?)
    }

    fn check_role(&self, role: Role) -> Result<(), OtError> {
        if role != self.role {
            return Err(OtError::InvalidState("the role of the pool"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = TastyOtConfig::builder().build().unwrap();

        assert!(config.extension());
        assert_eq!(config.security_parameter(), 80);
        assert_eq!(config.msg_bits(), 81);
        assert_eq!(config.iknp().unwrap().threshold(), 80);
    }

    #[test]
    fn test_config_threshold() {
        let config = TastyOtConfig::builder()
            .security_parameter(128)
            .threshold(16)
            .build()
            .unwrap();

        let iknp = config.iknp().unwrap();
        assert_eq!(iknp.security_parameter(), 128);
        assert_eq!(iknp.threshold(), 16);
    }

    #[test]
    fn test_empty_pool() {
        let ot = TastyOt::new(Role::Client, TastyOtConfig::default());

        assert_eq!(ot.role(), Role::Client);
        assert_eq!(ot.remaining(), 0);
    }
}
