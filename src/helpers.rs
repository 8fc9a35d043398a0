use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::{Digest, Sha3_256, Sha3_512, Shake128, Shake256};

use crate::ntt::multiply_ntts;
use crate::types::Z;
use crate::Q;

/// Vector addition; `z_hat = u_hat + v_hat`, §4.8 step 6 / step 19.
#[must_use]
pub(crate) fn add_vecs<const K: usize>(
    vec_a: &[[Z; 256]; K], vec_b: &[[Z; 256]; K],
) -> [[Z; 256]; K] {
    core::array::from_fn(|k| core::array::from_fn(|n| vec_a[k][n].add(vec_b[k][n])))
}

/// Matrix-by-vector multiplication in `T_q`; `w_hat = A_hat . u_hat`, §4.8 step 18.
#[must_use]
pub(crate) fn mul_mat_vec<const K: usize>(
    a_hat: &[[[Z; 256]; K]; K], u_hat: &[[Z; 256]; K],
) -> [[Z; 256]; K] {
    let mut w_hat = [[Z::default(); 256]; K];
    for i in 0..K {
        for j in 0..K {
            let tmp = multiply_ntts(&a_hat[i][j], &u_hat[j]);
            w_hat[i] = add_vecs(&[w_hat[i]], &[tmp])[0];
        }
    }
    w_hat
}

/// Transposed matrix-by-vector multiplication; `y_hat = A_hat^T . u_hat`, §4.8 step 19.
///
/// Per the spec.md §9 design note, this reads `a_hat[j][i]` (not `[i][j]`) —
/// the matrix itself is never stored transposed, only accessed that way.
#[must_use]
pub(crate) fn mul_mat_t_vec<const K: usize>(
    a_hat: &[[[Z; 256]; K]; K], u_hat: &[[Z; 256]; K],
) -> [[Z; 256]; K] {
    let mut y_hat = [[Z::default(); 256]; K];
    for i in 0..K {
        for j in 0..K {
            let tmp = multiply_ntts(&a_hat[j][i], &u_hat[j]);
            y_hat[i] = add_vecs(&[y_hat[i]], &[tmp])[0];
        }
    }
    y_hat
}

/// Vector dot product in `T_q`; `z_hat = u_hat^T . v_hat`, §4.8 steps 21/6.
#[must_use]
pub(crate) fn dot_t_prod<const K: usize>(u_hat: &[[Z; 256]; K], v_hat: &[[Z; 256]; K]) -> [Z; 256] {
    let mut result = [Z::default(); 256];
    for j in 0..K {
        let tmp = multiply_ntts(&u_hat[j], &v_hat[j]);
        result = add_vecs(&[result], &[tmp])[0];
    }
    result
}

/// `PRF(η, s, b)`, §4.4: SHAKE256(s ‖ b) truncated to `64η` bytes.
#[must_use]
pub(crate) fn prf<const ETA_64: usize>(s: &[u8; 32], b: u8) -> [u8; ETA_64] {
    let mut hasher = Shake256::default();
    hasher.update(s);
    hasher.update(&[b]);
    let mut reader = hasher.finalize_xof();
    let mut result = [0u8; ETA_64];
    reader.read(&mut result);
    result
}

/// `XOF`, §4.4: a resumable SHAKE128 sponge absorbing `rho ‖ i ‖ j`.
/// Successive `SampleNTT` squeezes continue this same stream.
#[must_use]
pub(crate) fn xof(rho: &[u8; 32], i: u8, j: u8) -> impl XofReader {
    let mut hasher = Shake128::default();
    hasher.update(rho);
    hasher.update(&[i]);
    hasher.update(&[j]);
    hasher.finalize_xof()
}

/// `G`, §4.4: SHA3-512, split into two 32-byte halves `(rho/K, sigma/r)`.
pub(crate) fn g(bytes: &[&[u8]]) -> ([u8; 32], [u8; 32]) {
    let mut hasher = Sha3_512::new();
    bytes.iter().for_each(|b| Digest::update(&mut hasher, b));
    let digest = hasher.finalize();
    let a = digest[0..32].try_into().expect("sha3-512 output is 64 bytes");
    let b = digest[32..64].try_into().expect("sha3-512 output is 64 bytes");
    (a, b)
}

/// `H`, §4.4: SHA3-256.
#[must_use]
pub(crate) fn h(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    Digest::update(&mut hasher, bytes);
    hasher.finalize().into()
}

/// `J`, §4.4: SHAKE256 of the concatenated inputs, truncated to 32 bytes.
///
/// Per spec.md §9's open question: one historical revision squeezed 256
/// bytes here; the authoritative definition (and the one consistent with
/// FIPS 203 and the KEM flow) truncates to 32 bytes, which is what is
/// implemented below. Takes multiple slices (as `G` does) so the KEM's
/// `J(z ‖ c)` and a single-input test vector share one implementation.
#[must_use]
pub(crate) fn j(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Shake256::default();
    parts.iter().for_each(|p| hasher.update(p));
    let mut reader = hasher.finalize_xof();
    let mut result = [0u8; 32];
    reader.read(&mut result);
    result
}

/// `Compress_d`, §4.3: `x -> round((2^d / q) * x) mod 2^d`.
///
/// Uses a fixed-point multiplier to avoid floating point; valid for all
/// odd `q` in the range this crate cares about.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn compress_vector(d: u32, inout: &mut [Z]) {
    const M: u32 = (((1u64 << 36) + Q as u64 - 1) / Q as u64) as u32;
    for x_ref in &mut *inout {
        let y = (x_ref.get_u32() << d) + (Q >> 1);
        let result = (u64::from(y) * u64::from(M)) >> 36;
        x_ref.set_u16(result as u16);
    }
}

/// `Decompress_d`, §4.3: `y -> round((q / 2^d) * y)`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn decompress_vector(d: u32, inout: &mut [Z]) {
    for y_ref in &mut *inout {
        let qy = Q * y_ref.get_u32() + (1 << d) - 1;
        y_ref.set_u16((qy >> d) as u16);
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::{compress_vector, decompress_vector, g, h, j, prf};
    use crate::types::Z;

    const SEED: &[u8; 32] = b"qjdhfyritoprlkdjfkrjfbdnzyhdjrtr";

    #[test]
    fn test_prf_vector_from_spec() {
        // spec.md §8 item 2: PRF(2, SEED, b"a") begins eedb2631fdc3c674...
        let out = prf::<128>(SEED, b"a"[0]);
        assert_eq!(&out[..8], hex!("eedb2631fdc3c674"));
    }

    #[test]
    fn test_h_vector_from_spec() {
        // spec.md §8 item 3, full 32-byte digest
        let out = h(SEED);
        assert_eq!(out, hex!("af791f788a6048e5f16b9ee9ef12add7a3fcdf2d615f79960c588bdc9824178f"));
    }

    #[test]
    fn test_j_vector_from_spec() {
        // spec.md §8 item 4: J applied to a single 32-byte input, full digest
        let out = j(&[SEED]);
        assert_eq!(out, hex!("1ffbe9a12ca007f5e869838bd0ba33284554800575b87b1023bbfe41a7332b7a"));
    }

    #[test]
    fn test_g_vector_from_spec() {
        // spec.md §8 item 5: G(SEED) = (rho/K, sigma/r); only the prefixes
        // of each half are given in the source, so only those are checked.
        let (a, b) = g(&[SEED]);
        assert_eq!(&a[..4], hex!("132f6750"));
        assert_eq!(&b[..4], hex!("73fe4185"));
    }

    #[test]
    fn test_compress_decompress_vectors_from_spec() {
        // spec.md §8 item 1
        let mut x = Z::default();
        x.set_u16(1933);
        let mut v = [x];
        compress_vector(11, &mut v);
        assert_eq!(v[0].get_u16(), 1189);
        decompress_vector(11, &mut v);
        assert_eq!(v[0].get_u16(), 1933);

        let mut y = Z::default();
        y.set_u16(2001);
        let mut v2 = [y];
        decompress_vector(11, &mut v2);
        assert_eq!(v2[0].get_u16(), 3253);
    }

    #[test]
    fn test_compress_decompress_bounded_error() {
        for d in 1u32..=11 {
            let bound = (3329u32).div_ceil(1 << (d + 1));
            for x in 0..3329u16 {
                let mut z = Z::default();
                z.set_u16(x);
                let mut v = [z];
                compress_vector(d, &mut v);
                decompress_vector(d, &mut v);
                let got = v[0].get_u16() as i32;
                let diff = (got - x as i32).abs();
                let wrapped = 3329 - diff;
                assert!(diff <= bound as i32 || wrapped <= bound as i32);
            }
        }
    }
}
