//! Hashes used as random oracles by the OT protocols.

use num_bigint::BigUint;
use sha2::{Digest, Sha256};

use crate::bits::mask;

/// Context string for the correlation-robust hash.
const CR_HASH_CONTEXT: &str = "tasty-ot 2023-01-01 correlation robust hash";

/// Derives `bits` bits of key material from an encoded curve point.
///
/// The output is the concatenation of `SHA-256(point || tag || block)` for consecutive
/// 32-bit block counters, truncated to `bits`. `tag` separates the two keys derived for
/// one transfer.
pub fn point_kdf(point: &[u8], tag: u8, bits: usize) -> BigUint {
    let blocks = (bits + 255) / 256;

    let mut bytes = Vec::with_capacity(blocks * 32);
    for block in 0..blocks as u32 {
        let digest = Sha256::new()
            .chain_update(point)
            .chain_update([tag])
            .chain_update(block.to_be_bytes())
            .finalize();
        bytes.extend_from_slice(&digest);
    }

    BigUint::from_bytes_be(&bytes) & mask(bits)
}

/// Correlation-robust hash `H(index, value)` truncated to `bits` bits.
///
/// Both parties must call this with the same `index` for the same transfer.
pub fn cr_hash(index: u64, value: &BigUint, bits: usize) -> BigUint {
    let mut hasher = blake3::Hasher::new_derive_key(CR_HASH_CONTEXT);
    hasher.update(&index.to_be_bytes());
    hasher.update(&value.to_bytes_be());

    let mut out = vec![0u8; (bits + 7) / 8];
    hasher.finalize_xof().fill(&mut out);

    BigUint::from_bytes_be(&out) & mask(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::fits;

    #[test]
    fn test_point_kdf() {
        let point = [4u8; 65];

        for bits in [1, 80, 256, 257, 1000] {
            let key = point_kdf(&point, 0, bits);
            assert!(fits(&key, bits));
            assert_eq!(key, point_kdf(&point, 0, bits));
        }

        assert_ne!(point_kdf(&point, 0, 256), point_kdf(&point, 1, 256));
        // Longer outputs extend shorter ones block-wise.
        assert_eq!(
            point_kdf(&point, 0, 512) >> 256u32,
            point_kdf(&point, 0, 256)
        );
    }

    #[test]
    fn test_cr_hash() {
        let value = BigUint::from(0xdead_beefu64);

        assert_eq!(cr_hash(3, &value, 128), cr_hash(3, &value, 128));
        assert_ne!(cr_hash(3, &value, 128), cr_hash(4, &value, 128));
        assert_ne!(
            cr_hash(3, &value, 128),
            cr_hash(3, &(&value + 1u32), 128)
        );
        assert!(fits(&cr_hash(0, &value, 13), 13));
    }
}
