use serde::{Deserialize, Serialize};

/// Identifier of a protocol instance, assigned by an [`Engine`](crate::Engine) in
/// registration order.
///
/// Both parties must register the same instances in the same order, so ids agree across
/// the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(u64);

impl InstanceId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the id as an integer.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
