use derive_builder::Builder;

use crate::BaseOtKind;

/// Default symmetric security parameter.
pub const DEFAULT_SECURITY_PARAMETER: usize = 80;

/// IKNP configuration, shared by both roles.
#[derive(Debug, Clone, Builder)]
pub struct IknpConfig {
    /// The base OT.
    #[builder(default)]
    base: BaseOtKind,
    /// Number of base OTs, `k`.
    #[builder(default = "DEFAULT_SECURITY_PARAMETER")]
    security_parameter: usize,
    /// Batches of at most this many OTs run the base OT directly.
    ///
    /// Defaults to the security parameter.
    #[builder(setter(strip_option), default)]
    threshold: Option<usize>,
}

impl Default for IknpConfig {
    fn default() -> Self {
        Self {
            base: BaseOtKind::default(),
            security_parameter: DEFAULT_SECURITY_PARAMETER,
            threshold: None,
        }
    }
}

impl IknpConfig {
    /// Creates a new builder for IknpConfig.
    pub fn builder() -> IknpConfigBuilder {
        IknpConfigBuilder::default()
    }

    /// The base OT.
    pub fn base(&self) -> &BaseOtKind {
        &self.base
    }

    /// Number of base OTs, `k`.
    pub fn security_parameter(&self) -> usize {
        self.security_parameter
    }

    /// Batches of at most this many OTs run the base OT directly.
    pub fn threshold(&self) -> usize {
        self.threshold.unwrap_or(self.security_parameter)
    }
}
