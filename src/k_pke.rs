use crate::byte_fns::{byte_decode, byte_encode};
use crate::error::Error;
use crate::helpers::{
    add_vecs, compress_vector, decompress_vector, dot_t_prod, g, mul_mat_t_vec, mul_mat_vec, prf,
    xof,
};
use crate::ntt::{ntt, ntt_inv};
use crate::sampling::{sample_ntt, sample_poly_cbd};
use crate::types::Z;

/// `K-PKE.KeyGen(d)`, §4.8.
/// Uses 32 bytes of randomness to generate a PKE encryption key and a
/// corresponding decryption key.
///
/// * Input: randomness `d ∈ B^{32}`
/// * Output: encryption key `ek_PKE ∈ B^{384k+32}` written into `ek_pke`
/// * Output: decryption key `dk_PKE ∈ B^{384k}` written into `dk_pke`
pub(crate) fn k_pke_key_gen<const K: usize, const ETA1_64: usize>(
    d: [u8; 32], ek_pke: &mut [u8], dk_pke: &mut [u8],
) {
    debug_assert_eq!(ek_pke.len(), 384 * K + 32);
    debug_assert_eq!(dk_pke.len(), 384 * K);

    // (rho, sigma) <- G(d || k)
    let mut seed = [0u8; 33];
    seed[0..32].copy_from_slice(&d);
    seed[32] = K.to_le_bytes()[0];
    let (rho, sigma) = g(&[&seed]);

    let mut n = 0u8;
    let a_hat = gen_a_hat(&rho);

    let s: [[Z; 256]; K] = core::array::from_fn(|_| {
        let x = sample_poly_cbd(&prf::<ETA1_64>(&sigma, n));
        n += 1;
        x
    });
    let e: [[Z; 256]; K] = core::array::from_fn(|_| {
        let x = sample_poly_cbd(&prf::<ETA1_64>(&sigma, n));
        n += 1;
        x
    });

    let s_hat: [[Z; 256]; K] = core::array::from_fn(|i| ntt(&s[i]));
    let e_hat: [[Z; 256]; K] = core::array::from_fn(|i| ntt(&e[i]));

    // t_hat <- A_hat . s_hat + e_hat
    let as_hat = mul_mat_vec(&a_hat, &s_hat);
    let t_hat = add_vecs(&as_hat, &e_hat);

    for (i, chunk) in ek_pke.chunks_mut(384).enumerate().take(K) {
        byte_encode(12, &t_hat[i], chunk);
    }
    ek_pke[K * 384..].copy_from_slice(&rho);

    for (i, chunk) in dk_pke.chunks_mut(384).enumerate() {
        byte_encode(12, &s_hat[i], chunk);
    }
}

/// Regenerates the public matrix `A_hat` from `rho`. Shared between
/// `k_pke_key_gen` and `k_pke_encrypt`; never persisted (§3 invariants:
/// the matrix is regenerated on demand rather than stored).
fn gen_a_hat<const K: usize>(rho: &[u8; 32]) -> [[[Z; 256]; K]; K] {
    core::array::from_fn(|i| {
        core::array::from_fn(|j| sample_ntt(xof(rho, j.to_le_bytes()[0], i.to_le_bytes()[0])))
    })
}

/// `K-PKE.Encrypt(ek_PKE, m, r)`, §4.8.
/// Encrypts a 32-byte message `m` using randomness `r`, writing the
/// ciphertext into `ct`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn k_pke_encrypt<const K: usize, const ETA1_64: usize, const ETA2_64: usize>(
    du: u32, dv: u32, ek_pke: &[u8], m: &[u8; 32], r: &[u8; 32], ct: &mut [u8],
) -> Result<(), Error> {
    crate::error::ensure!(ek_pke.len() == 384 * K + 32, Error::InvalidLength);

    let mut n = 0u8;

    let mut t_hat = [[Z::default(); 256]; K];
    for (i, chunk) in ek_pke.chunks(384).enumerate().take(K) {
        t_hat[i] = byte_decode(12, chunk)?;
    }
    let rho: &[u8; 32] = &ek_pke[384 * K..384 * K + 32].try_into().expect("32-byte slice");

    let a_hat = gen_a_hat(rho);

    let y: [[Z; 256]; K] = core::array::from_fn(|_| {
        let x = sample_poly_cbd(&prf::<ETA1_64>(r, n));
        n += 1;
        x
    });
    let e1: [[Z; 256]; K] = core::array::from_fn(|_| {
        let x = sample_poly_cbd(&prf::<ETA2_64>(r, n));
        n += 1;
        x
    });
    let e2 = sample_poly_cbd(&prf::<ETA2_64>(r, n));

    let y_hat: [[Z; 256]; K] = core::array::from_fn(|i| ntt(&y[i]));

    // u <- NTT^{-1}(A_hat^T . y_hat) + e1     (note: transposed access, not A_hat from KeyGen)
    let mut u = mul_mat_t_vec(&a_hat, &y_hat);
    for u_i in &mut u {
        *u_i = ntt_inv(u_i);
    }
    u = add_vecs(&u, &e1);

    // mu <- Decompress_1(ByteDecode_1(m))
    let mut mu = byte_decode(1, m)?;
    decompress_vector(1, &mut mu);

    // v <- NTT^{-1}(t_hat^T . y_hat) + e2 + mu
    let mut v = ntt_inv(&dot_t_prod(&t_hat, &y_hat));
    v = add_vecs(&add_vecs(&[v], &[e2]), &[mu])[0];

    let step = 32 * du as usize;
    for (i, chunk) in ct.chunks_mut(step).enumerate().take(K) {
        compress_vector(du, &mut u[i]);
        byte_encode(du, &u[i], chunk);
    }
    compress_vector(dv, &mut v);
    byte_encode(dv, &v, &mut ct[K * step..]);

    Ok(())
}

/// `K-PKE.Decrypt(dk_PKE, c)`, §4.8.
/// Recovers the 32-byte message encoded in ciphertext `ct`.
///
/// Per spec.md §9: `c2` is always decompressed with `d_v`, never `d_u` — a
/// historical revision of this algorithm swapped them, which this
/// implementation does not reproduce.
pub(crate) fn k_pke_decrypt<const K: usize>(
    du: u32, dv: u32, dk_pke: &[u8], ct: &[u8],
) -> Result<[u8; 32], Error> {
    debug_assert_eq!(dk_pke.len(), 384 * K);
    debug_assert_eq!(ct.len(), 32 * (du as usize * K + dv as usize));

    let split = 32 * du as usize * K;
    let c1 = &ct[0..split];
    let c2 = &ct[split..32 * (du as usize * K + dv as usize)];

    let mut u = [[Z::default(); 256]; K];
    for (i, chunk) in c1.chunks(32 * du as usize).enumerate().take(K) {
        u[i] = byte_decode(du, chunk)?;
        decompress_vector(du, &mut u[i]);
    }

    let mut v = byte_decode(dv, c2)?;
    decompress_vector(dv, &mut v);

    let mut s_hat = [[Z::default(); 256]; K];
    for (i, chunk) in dk_pke.chunks(384).enumerate() {
        s_hat[i] = byte_decode(12, chunk)?;
    }

    // w <- v - NTT^{-1}(s_hat^T . NTT(u))
    let ntt_u: [[Z; 256]; K] = core::array::from_fn(|i| ntt(&u[i]));
    let st_ntt_u = dot_t_prod(&s_hat, &ntt_u);
    let yy = ntt_inv(&st_ntt_u);
    let mut w = [Z::default(); 256];
    for i in 0..256 {
        w[i] = v[i].sub(yy[i]);
    }

    compress_vector(1, &mut w);
    let mut m = [0u8; 32];
    byte_encode(1, &w, &mut m);
    Ok(m)
}

#[cfg(test)]
mod tests {
    use rand_core::{RngCore, SeedableRng};

    use super::{k_pke_decrypt, k_pke_encrypt, k_pke_key_gen};

    const ETA1: u32 = 3;
    const ETA2: u32 = 2;
    const DU: u32 = 10;
    const DV: u32 = 4;
    const K: usize = 2;
    const ETA1_64: usize = ETA1 as usize * 64;
    const ETA2_64: usize = ETA2 as usize * 64;
    const EK_LEN: usize = 800;
    const DK_LEN: usize = 384 * K;
    const CT_LEN: usize = 768;

    #[test]
    fn test_key_gen_encrypt_decrypt_round_trip() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
        let mut ek = [0u8; EK_LEN];
        let mut dk = [0u8; DK_LEN];
        let mut ct = [0u8; CT_LEN];
        let m = [7u8; 32];
        let r = [9u8; 32];

        let mut d = [0u8; 32];
        rng.try_fill_bytes(&mut d).unwrap();
        k_pke_key_gen::<K, ETA1_64>(d, &mut ek, &mut dk);

        k_pke_encrypt::<K, ETA1_64, ETA2_64>(DU, DV, &ek, &m, &r, &mut ct).unwrap();
        let recovered = k_pke_decrypt::<K>(DU, DV, &dk, &ct).unwrap();
        assert_eq!(m, recovered);
    }

    #[test]
    fn test_k_pke_768_vector_from_spec() {
        // spec.md §8 item 7: only the ciphertext prefix is given, so only
        // that is checked, plus that decryption recovers the message.
        use hex_literal::hex;

        const K768: usize = 3;
        const ETA1_64_768: usize = 2 * 64;
        const ETA2_64_768: usize = 2 * 64;
        const EK_LEN_768: usize = 1184;
        const DK_LEN_768: usize = 384 * K768;
        const CT_LEN_768: usize = 1088;

        let seed = *b"Salut de la part de moi meme lee";
        let m = *b"Ce message est tres confidentiel";
        let r = seed;

        let mut ek = [0u8; EK_LEN_768];
        let mut dk = [0u8; DK_LEN_768];
        k_pke_key_gen::<K768, ETA1_64_768>(seed, &mut ek, &mut dk);

        let mut ct = [0u8; CT_LEN_768];
        k_pke_encrypt::<K768, ETA1_64_768, ETA2_64_768>(10, 4, &ek, &m, &r, &mut ct).unwrap();
        assert_eq!(&ct[..8], hex!("012ac1758bc94772"));

        let recovered = k_pke_decrypt::<K768>(10, 4, &dk, &ct).unwrap();
        assert_eq!(m, recovered);
    }

    #[test]
    fn test_encrypt_rejects_bad_ek_length() {
        let short_ek = [0u8; EK_LEN - 1];
        let m = [0u8; 32];
        let r = [0u8; 32];
        let mut ct = [0u8; CT_LEN];
        let res = k_pke_encrypt::<K, ETA1_64, ETA2_64>(DU, DV, &short_ek, &m, &r, &mut ct);
        assert!(res.is_err());
    }
}
