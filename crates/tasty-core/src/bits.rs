//! Helpers for values carried as bit-packed integers.

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::Rng;

/// Returns `2^bits - 1`.
pub fn mask(bits: usize) -> BigUint {
    (BigUint::one() << bits) - 1u32
}

/// Returns `true` if `value` fits into `bits` bits.
pub fn fits(value: &BigUint, bits: usize) -> bool {
    value.bits() <= bits as u64
}

/// Packs `bits` into an integer so that bit `i` of the result holds `bits[i]`.
pub fn pack(bits: &[bool]) -> BigUint {
    let mut value = BigUint::zero();
    for (i, bit) in bits.iter().enumerate() {
        if *bit {
            value.set_bit(i as u64, true);
        }
    }
    value
}

/// Inverse of [`pack`], returning the lowest `len` bits of `value`.
pub fn unpack(value: &BigUint, len: usize) -> Vec<bool> {
    (0..len as u64).map(|i| value.bit(i)).collect()
}

/// Samples a uniformly random integer of at most `bits` bits.
pub fn random_bits<R: Rng + ?Sized>(rng: &mut R, bits: usize) -> BigUint {
    rng.gen_biguint(bits as u64)
}

/// Big-endian encoding of `value`, left padded with zeros to `len` bytes.
///
/// Returns `None` if `value` does not fit.
pub fn to_fixed_bytes(value: &BigUint, len: usize) -> Option<Vec<u8>> {
    let bytes = value.to_bytes_be();
    if value.is_zero() {
        return Some(vec![0u8; len]);
    }
    if bytes.len() > len {
        return None;
    }

    let mut out = vec![0u8; len - bytes.len()];
    out.extend_from_slice(&bytes);
    Some(out)
}

/// Transposes a bit matrix stored as packed columns.
///
/// Each of the `columns` holds `rows` bits. The result holds `rows` integers of
/// `columns.len()` bits each, bit `j` of row `i` being bit `i` of column `j`.
pub fn transpose(columns: &[BigUint], rows: usize) -> Vec<BigUint> {
    let digits: Vec<Vec<u32>> = columns.iter().map(|c| c.to_u32_digits()).collect();
    let row_digits = (columns.len() + 31) / 32;

    (0..rows)
        .map(|i| {
            let (word, offset) = (i / 32, i % 32);
            let mut row = vec![0u32; row_digits];
            for (j, column) in digits.iter().enumerate() {
                let bit = column.get(word).map_or(0, |w| (w >> offset) & 1);
                row[j / 32] |= bit << (j % 32);
            }
            BigUint::new(row)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;
    use rstest::*;

    #[test]
    fn test_pack_unpack() {
        let bits = vec![true, false, true, true, false, false, false, true, true];
        let packed = pack(&bits);

        assert_eq!(packed, BigUint::from(0b1_1000_1101u32));
        assert_eq!(unpack(&packed, bits.len()), bits);
    }

    #[test]
    fn test_fixed_bytes() {
        assert_eq!(to_fixed_bytes(&BigUint::from(0x0102u32), 4), Some(vec![0, 0, 1, 2]));
        assert_eq!(to_fixed_bytes(&BigUint::zero(), 2), Some(vec![0, 0]));
        assert_eq!(to_fixed_bytes(&BigUint::from(0x010203u32), 2), None);
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask(0), BigUint::zero());
        assert_eq!(mask(8), BigUint::from(255u32));
        assert!(fits(&mask(130), 130));
        assert!(!fits(&(mask(130) + 1u32), 130));
    }

    #[rstest]
    #[case::narrow(3, 5)]
    #[case::word_boundary(64, 32)]
    #[case::wide(80, 300)]
    fn test_transpose(#[case] width: usize, #[case] rows: usize) {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let columns: Vec<_> = (0..width).map(|_| random_bits(&mut rng, rows)).collect();

        let transposed = transpose(&columns, rows);

        assert_eq!(transposed.len(), rows);
        for (i, row) in transposed.iter().enumerate() {
            assert!(fits(row, width));
            for (j, column) in columns.iter().enumerate() {
                assert_eq!(row.bit(j as u64), column.bit(i as u64));
            }
        }
        assert_eq!(transpose(&transposed, width), columns);
    }
}
