use crate::error::{ensure, Error};
use crate::types::Z;
use crate::Q;

/// `ByteEncode_d(F)`, §4.2.
/// Encodes an array of d-bit integers into a byte array, for 1 ≤ d ≤ 12.
///
/// `BitsToBytes` (spec.md Algorithm 2) is folded directly into the bit-packing
/// loop below rather than materialized as an intermediate bit array.
///
/// Input: integer array `F ∈ Z^256_m`, where `m = 2^d` if `d < 12` else `m = q` <br>
/// Output: byte array `B ∈ B^{32d}`
pub(crate) fn byte_encode(d: u32, integers_f: &[Z; 256], bytes_b: &mut [u8]) {
    debug_assert_eq!(bytes_b.len(), 32 * d as usize);
    let mut temp = 0u64;
    let mut bit_index = 0usize;
    let mut byte_index = 0usize;
    let mask = (1u64 << d) - 1;
    for coeff in integers_f {
        let coeff = u64::from(coeff.get_u16()) & mask;
        temp |= coeff << bit_index;
        bit_index += d as usize;
        while bit_index >= 8 {
            bytes_b[byte_index] = temp as u8;
            temp >>= 8;
            byte_index += 1;
            bit_index -= 8;
        }
    }
}

/// `ByteDecode_d(B)`, §4.2.
/// Decodes a byte array into an array of d-bit integers, for 1 ≤ d ≤ 12.
///
/// `BytesToBits` (spec.md Algorithm 3) is folded into the unpacking loop.
/// For d=12 the raw 12-bit value is accepted as-is and then range-checked
/// against q; FIPS 203 tolerates 12-bit encodings of non-canonical
/// representatives and leaves canonicalization to the caller where it
/// matters (e.g. the modulus check in `ml_kem_encaps`).
///
/// Input: byte array `B ∈ B^{32d}` <br>
/// Output: integer array `F ∈ Z^256_m`, where `m = 2^d` if `d < 12` else `m = q`
pub(crate) fn byte_decode(d: u32, bytes_b: &[u8]) -> Result<[Z; 256], Error> {
    ensure!(bytes_b.len() == 32 * d as usize, Error::InvalidLength);
    let mut integers_f = [Z::default(); 256];
    let mut temp = 0u64;
    let mut int_index = 0usize;
    let mut bit_index = 0usize;
    let mask = (1u64 << d) - 1;
    for byte in bytes_b {
        temp |= u64::from(*byte) << bit_index;
        bit_index += 8;
        while bit_index >= d as usize {
            let value = temp & mask;
            integers_f[int_index].set_u16(value as u16);
            bit_index -= d as usize;
            temp >>= d;
            int_index += 1;
        }
    }
    let max = if d < 12 { 1u16 << d } else { Q as u16 };
    ensure!(integers_f.iter().all(|e| e.get_u16() < max), Error::InvalidParameter);
    Ok(integers_f)
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use alloc::vec;
    use alloc::vec::Vec;

    use rand::{Rng, SeedableRng};

    use super::{byte_decode, byte_encode};
    use crate::types::Z;

    #[test]
    fn test_decode_then_encode_round_trips() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
        for _ in 0..100 {
            for d in [4u32, 5, 10, 11] {
                let num_bytes = 32 * d as usize;
                let bytes1: Vec<u8> = (0..num_bytes).map(|_| rng.gen()).collect();
                let mut bytes2 = vec![0u8; num_bytes];
                let integers = byte_decode(d, &bytes1).unwrap();
                byte_encode(d, &integers, &mut bytes2);
                assert_eq!(bytes1, bytes2);
            }
        }
    }

    #[test]
    fn test_encode_then_decode_round_trips_for_d12() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);
        let mut integers = [Z::default(); 256];
        for z in &mut integers {
            z.set_u16(rng.gen_range(0..3329));
        }
        let mut bytes = [0u8; 384];
        byte_encode(12, &integers, &mut bytes);
        let decoded = byte_decode(12, &bytes).unwrap();
        for i in 0..256 {
            assert_eq!(integers[i].get_u16(), decoded[i].get_u16());
        }
    }

    #[test]
    fn test_byte_decode_rejects_wrong_length() {
        let bytes = [0u8; 31];
        assert!(byte_decode(12, &bytes).is_err());
    }
}
