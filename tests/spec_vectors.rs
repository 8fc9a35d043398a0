//! Integration tests driving the crate purely through its public API
//! (`traits::{KeyGen, Encaps, Decaps, SerDes}`), exercising the
//! determinism guarantees and boundary vectors documented alongside the
//! algorithms themselves.

#![cfg(all(feature = "ml-kem-512", feature = "ml-kem-768", feature = "ml-kem-1024"))]

use rand_core::SeedableRng;

use fips203::traits::{Decaps, Encaps, KeyGen, SerDes};
use fips203::{ml_kem_1024, ml_kem_512, ml_kem_768};

#[test]
fn round_trip_all_parameter_sets() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0xC0FFEE);

    let (ek, dk) = ml_kem_512::KG::try_keygen_with_rng(&mut rng).unwrap();
    let (k1, ct) = ek.try_encaps_with_rng(&mut rng).unwrap();
    let k2 = dk.try_decaps(&ct).unwrap();
    assert_eq!(k1, k2);

    let (ek, dk) = ml_kem_768::KG::try_keygen_with_rng(&mut rng).unwrap();
    let (k1, ct) = ek.try_encaps_with_rng(&mut rng).unwrap();
    let k2 = dk.try_decaps(&ct).unwrap();
    assert_eq!(k1, k2);

    let (ek, dk) = ml_kem_1024::KG::try_keygen_with_rng(&mut rng).unwrap();
    let (k1, ct) = ek.try_encaps_with_rng(&mut rng).unwrap();
    let k2 = dk.try_decaps(&ct).unwrap();
    assert_eq!(k1, k2);
}

#[test]
fn serialization_round_trips_through_bytes() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(1);
    let (ek, dk) = ml_kem_768::KG::try_keygen_with_rng(&mut rng).unwrap();

    let ek2 = ml_kem_768::EncapsKey::try_from_bytes(ek.into_bytes()).unwrap();
    let (k1, ct) = ek2.try_encaps_with_rng(&mut rng).unwrap();

    let ct2 = ml_kem_768::CipherText::try_from_bytes(ct.into_bytes()).unwrap();
    let k2 = dk.try_decaps(&ct2).unwrap();
    assert_eq!(k1, k2);
}

#[test]
fn end_to_end_768_vector_from_source() {
    // The boundary vector from spec.md §8 item 6, reproduced against the
    // public seed-based entry points (`keygen_from_seed`/`encaps_from_seed`,
    // the Rust expression of `KeyGen_internal`/`Encaps_internal`).
    use sha3::digest::{ExtendableOutput, Update, XofReader};
    use sha3::{Digest, Sha3_256, Shake256};

    let d: [u8; 32] = Sha3_256::digest(b"randomness d").into();
    let z: [u8; 32] = {
        let mut hasher = Shake256::default();
        hasher.update(b"randomness z");
        let mut reader = hasher.finalize_xof();
        let mut out = [0u8; 32];
        reader.read(&mut out);
        out
    };
    let m: [u8; 32] = Sha3_256::digest(b"seed permettant l encapsulation").into();

    let (ek, dk) = ml_kem_768::KG::keygen_from_seed(d, z);
    let (k_sender, ct) = ek.encaps_from_seed(&m);

    let ct_bytes = ct.into_bytes();
    assert_eq!(&ct_bytes[..8], [0xaa, 0xaa, 0xe4, 0x90, 0xa2, 0x82, 0x0e, 0x03]);

    let ct2 = ml_kem_768::CipherText::try_from_bytes(ct_bytes).unwrap();
    let k_receiver = dk.try_decaps(&ct2).unwrap();
    assert_eq!(k_sender, k_receiver);
}
