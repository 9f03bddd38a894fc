use derive_builder::Builder;
use tasty_core::CurveId;

/// Naor-Pinkas OT configuration, shared by both roles.
#[derive(Debug, Default, Clone, Builder)]
pub struct NaorPinkasConfig {
    /// The curve to run over.
    #[builder(default)]
    curve: CurveId,
    /// Whether points are sent compressed.
    #[builder(setter(custom), default = "false")]
    compress: bool,
}

impl NaorPinkasConfigBuilder {
    /// Sends points in compressed form.
    pub fn compress(&mut self) -> &mut Self {
        self.compress = Some(true);
        self
    }
}

impl NaorPinkasConfig {
    /// Creates a new builder for NaorPinkasConfig.
    pub fn builder() -> NaorPinkasConfigBuilder {
        NaorPinkasConfigBuilder::default()
    }

    /// The curve to run over.
    pub fn curve(&self) -> CurveId {
        self.curve
    }

    /// Whether points are sent compressed.
    pub fn compress(&self) -> bool {
        self.compress
    }
}
