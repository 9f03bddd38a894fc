use derive_builder::Builder;

/// Default upper bound on the size of a received frame.
pub(crate) const DEFAULT_MAX_FRAME_LEN: usize = 1 << 28;

/// Engine configuration.
#[derive(Debug, Clone, Builder)]
pub struct EngineConfig {
    /// Whether every transmission is prefixed with a `"<name> <id>"` tag checked by the peer.
    #[builder(default = "true")]
    consistency_checks: bool,
    /// Whether run counters are exchanged with the peer after every phase run.
    #[builder(default = "true")]
    sync_phases: bool,
    /// Largest frame accepted from the peer.
    #[builder(default = "DEFAULT_MAX_FRAME_LEN")]
    max_frame_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            consistency_checks: true,
            sync_phases: true,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

impl EngineConfig {
    /// Creates a new builder for EngineConfig.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Whether transmissions are tagged and checked.
    pub fn consistency_checks(&self) -> bool {
        self.consistency_checks
    }

    /// Whether run counters are synchronized after every phase run.
    pub fn sync_phases(&self) -> bool {
        self.sync_phases
    }

    /// Largest frame accepted from the peer.
    pub fn max_frame_len(&self) -> usize {
        self.max_frame_len
    }
}
