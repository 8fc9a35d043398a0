use rand_core::CryptoRngCore;
use subtle::{ConditionallySelectable, ConstantTimeEq};

use crate::byte_fns::{byte_decode, byte_encode};
use crate::error::Error;
use crate::helpers::{g, h, j};
use crate::k_pke::{k_pke_decrypt, k_pke_encrypt, k_pke_key_gen};
use crate::SharedSecretKey;

/// `ML-KEM.KeyGen_internal(d, z)`, §4.9.
/// Deterministic key generation from two 32-byte seeds.
pub(crate) fn ml_kem_key_gen_internal<const K: usize, const ETA1_64: usize>(
    d: [u8; 32], z: [u8; 32], ek: &mut [u8], dk: &mut [u8],
) {
    debug_assert_eq!(ek.len(), 384 * K + 32);
    debug_assert_eq!(dk.len(), 768 * K + 96);

    let p1 = 384 * K;
    k_pke_key_gen::<K, ETA1_64>(d, ek, &mut dk[..p1]);

    // dk <- dk_PKE || ek_PKE || H(ek_PKE) || z
    let h_ek = h(ek);
    let p2 = p1 + ek.len();
    let p3 = p2 + h_ek.len();
    dk[p1..p2].copy_from_slice(ek);
    dk[p2..p3].copy_from_slice(&h_ek);
    dk[p3..].copy_from_slice(&z);
}

/// `ML-KEM.Encaps_internal(ek, m)`, §4.9.
/// Deterministic encapsulation from a 32-byte message `m`.
fn ml_kem_encaps_internal<const K: usize, const ETA1_64: usize, const ETA2_64: usize>(
    du: u32, dv: u32, m: &[u8; 32], ek: &[u8], ct: &mut [u8],
) -> Result<SharedSecretKey, Error> {
    // (K, r) <- G(m || H(ek))
    let h_ek = h(ek);
    let (k, r) = g(&[m, &h_ek]);

    k_pke_encrypt::<K, ETA1_64, ETA2_64>(du, dv, ek, m, &r, ct)?;

    Ok(SharedSecretKey(k))
}

/// `ML-KEM.Decaps_internal(dk, c)`, §4.9.
/// Recovers the shared secret from `ct` using `dk`, with implicit rejection.
///
/// The ciphertext comparison and the `K'`/`K_bar` selection are both
/// constant-time: `ct_ne` XOR-accumulates across the whole buffer (no
/// early exit on the first differing byte) and `conditional_assign` is a
/// byte-wise mask, never a data-dependent branch. See spec.md §5 and §7.
fn ml_kem_decaps_internal<
    const K: usize,
    const ETA1_64: usize,
    const ETA2_64: usize,
    const CT_LEN: usize,
>(
    du: u32, dv: u32, dk: &[u8], ct: &[u8; CT_LEN],
) -> Result<SharedSecretKey, Error> {
    debug_assert_eq!(dk.len(), 768 * K + 96);

    let dk_pke = &dk[0..384 * K];
    let ek_pke = &dk[384 * K..768 * K + 32];
    let h_stored = &dk[768 * K + 32..768 * K + 64];
    let z: &[u8; 32] = &dk[768 * K + 64..768 * K + 96].try_into().expect("32-byte slice");

    // m' <- K-PKE.Decrypt(dk_PKE, c)
    let m_prime = k_pke_decrypt::<K>(du, dv, dk_pke, ct)?;

    // (K', r') <- G(m' || h)   — `h` is the hash stored in dk at KeyGen
    // time, per the §3 invariant that decapsulation must use the stored
    // hash rather than recomputing H(ek_pke) here (they coincide; using
    // the stored value is the spec requirement, not an optimization).
    let (mut k_prime, r_prime) = g(&[&m_prime, h_stored]);

    // K_bar <- J(z || c)
    let k_bar = j(&[z, ct]);

    // c' <- K-PKE.Encrypt(ek_PKE, m', r')
    let mut c_prime = [0u8; CT_LEN];
    k_pke_encrypt::<K, ETA1_64, ETA2_64>(du, dv, ek_pke, &m_prime, &r_prime, &mut c_prime)?;

    // if c != c' then K' <- K_bar    (constant-time select, no branch on the comparison)
    k_prime.conditional_assign(&k_bar, ct.ct_ne(&c_prime));

    Ok(SharedSecretKey(k_prime))
}

/// `ML-KEM.KeyGen()`, §4.9.
/// Draws fresh `d` and `z` from `rng` and runs `ml_kem_key_gen_internal`.
pub(crate) fn ml_kem_key_gen<const K: usize, const ETA1_64: usize>(
    rng: &mut impl CryptoRngCore, ek: &mut [u8], dk: &mut [u8],
) -> Result<(), Error> {
    debug_assert_eq!(ek.len(), 384 * K + 32);
    debug_assert_eq!(dk.len(), 768 * K + 96);

    let mut d = [0u8; 32];
    rng.try_fill_bytes(&mut d).map_err(|_| Error::InternalConsistency)?;
    let mut z = [0u8; 32];
    rng.try_fill_bytes(&mut z).map_err(|_| Error::InternalConsistency)?;

    ml_kem_key_gen_internal::<K, ETA1_64>(d, z, ek, dk);
    Ok(())
}

/// `ML-KEM.Encaps(ek)`, §4.9.
/// Draws a fresh 32-byte message from `rng` and runs
/// `ml_kem_encaps_internal`. Revalidates the modulus check on `ek` (§3
/// invariant 2): an externally supplied `ek` can only arrive through
/// `SerDes::try_from_bytes`, which already performs this check, so this
/// is a debug-only guardrail rather than a hot-path cost.
pub(crate) fn ml_kem_encaps<const K: usize, const ETA1_64: usize, const ETA2_64: usize>(
    rng: &mut impl CryptoRngCore, du: u32, dv: u32, ek: &[u8], ct: &mut [u8],
) -> Result<SharedSecretKey, Error> {
    debug_assert_eq!(ek.len(), 384 * K + 32);
    debug_assert_eq!(ct.len(), 32 * (du as usize * K + dv as usize));

    debug_assert!(
        {
            let mut pass = true;
            for i in 0..K {
                let mut ek_tilde = [0u8; 384];
                let ek_hat = byte_decode(12, &ek[384 * i..384 * (i + 1)]).expect("length is 384");
                byte_encode(12, &ek_hat, &mut ek_tilde);
                pass &= ek_tilde == ek[384 * i..384 * (i + 1)];
            }
            pass
        },
        "ek fails modulus check"
    );

    let mut m = [0u8; 32];
    rng.try_fill_bytes(&mut m).map_err(|_| Error::InternalConsistency)?;

    ml_kem_encaps_internal::<K, ETA1_64, ETA2_64>(du, dv, &m, ek, ct)
}

/// `ML-KEM.Decaps(dk, c)`, §4.9. Deterministic given its inputs.
pub(crate) fn ml_kem_decaps<
    const K: usize,
    const ETA1_64: usize,
    const ETA2_64: usize,
    const CT_LEN: usize,
>(
    du: u32, dv: u32, dk: &[u8], ct: &[u8; CT_LEN],
) -> Result<SharedSecretKey, Error> {
    debug_assert_eq!(ct.len(), 32 * (du as usize * K + dv as usize));
    debug_assert_eq!(dk.len(), 768 * K + 96);

    ml_kem_decaps_internal::<K, ETA1_64, ETA2_64, CT_LEN>(du, dv, dk, ct)
}
