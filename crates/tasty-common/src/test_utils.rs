//! Test utilities.

use crate::{
    channel::{memory_pair, MemoryChannel},
    EngineConfig, Party, Role,
};

/// Returns a connected `(client, server)` pair communicating in memory.
pub fn test_party_pair(io_buffer: usize) -> (Party<MemoryChannel>, Party<MemoryChannel>) {
    test_party_pair_with_config(io_buffer, EngineConfig::default())
}

/// Returns a connected `(client, server)` pair using `config` on both sides.
pub fn test_party_pair_with_config(
    io_buffer: usize,
    config: EngineConfig,
) -> (Party<MemoryChannel>, Party<MemoryChannel>) {
    let (client, server) = memory_pair(io_buffer);

    (
        Party::new(Role::Client, config.clone(), client),
        Party::new(Role::Server, config, server),
    )
}
