use derive_builder::Builder;

/// Default modulus size.
pub const DEFAULT_KEY_BITS: usize = 2048;

/// Paillier OT configuration, shared by both roles.
#[derive(Debug, Clone, Builder)]
pub struct PaillierOtConfig {
    /// Size of the receiver's modulus in bits.
    #[builder(default = "DEFAULT_KEY_BITS")]
    key_bits: usize,
}

impl Default for PaillierOtConfig {
    fn default() -> Self {
        Self {
            key_bits: DEFAULT_KEY_BITS,
        }
    }
}

impl PaillierOtConfig {
    /// Creates a new builder for PaillierOtConfig.
    pub fn builder() -> PaillierOtConfigBuilder {
        PaillierOtConfigBuilder::default()
    }

    /// Size of the receiver's modulus in bits.
    pub fn key_bits(&self) -> usize {
        self.key_bits
    }
}
