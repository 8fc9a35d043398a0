#![no_std]
#![deny(clippy::pedantic)]
#![deny(warnings)]
#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

//! Implements FIPS 203, the Module-Lattice-Based Key-Encapsulation Mechanism
//! Standard. See <https://nvlpubs.nist.gov/nistpubs/FIPS/NIST.FIPS.203.pdf>.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::Error;
use crate::traits::SerDes;

// Functionality map per FIPS 203
//
// Algorithm 2  BitsToBytes(b)                     --> folded into byte_fns.rs
// Algorithm 3  BytesToBits(B)                     --> folded into byte_fns.rs
// Algorithm 4  ByteEncode_d(F)                     --> byte_fns.rs
// Algorithm 5  ByteDecode_d(B)                     --> byte_fns.rs
// Algorithm 6  SampleNTT(B)                        --> sampling.rs
// Algorithm 7  SamplePolyCBD_eta(B)                --> sampling.rs
// Algorithm 8  NTT(f)                              --> ntt.rs
// Algorithm 9  NTT^-1(f_hat)                       --> ntt.rs
// Algorithm 10 MultiplyNTTs(f_hat, g_hat)          --> ntt.rs
// Algorithm 11 BaseCaseMultiply(a0,a1,b0,b1,gamma) --> ntt.rs
// Algorithm 12 K-PKE.KeyGen(d)                     --> k_pke.rs
// Algorithm 13 K-PKE.Encrypt(ek_PKE, m, r)         --> k_pke.rs
// Algorithm 14 K-PKE.Decrypt(dk_PKE, c)            --> k_pke.rs
// Algorithm 15-17 ML-KEM.KeyGen/Encaps/Decaps      --> ml_kem.rs
// PRF and XOF                                      --> helpers.rs
// G, H, J                                          --> helpers.rs
// Compress and Decompress                          --> helpers.rs
//
// The three parameter sets are modules below with injected macro code that
// connects them into the internals in ml_kem.rs. The macro-generated key and
// ciphertext types are thin aliases over the const-generic newtypes in
// types.rs; only the trait impls differ per parameter set.

mod byte_fns;
/// The error taxonomy returned by this crate's fallible operations.
pub mod error;
mod helpers;
mod k_pke;
mod ml_kem;
mod ntt;
mod sampling;
pub mod types;

/// All functionality is covered by traits, so consumers can use trait
/// objects (`dyn KeyGen`, etc.) where that suits their architecture.
pub mod traits;

// Shared across all parameter sets
const _N: u32 = 256;
const Q: u32 = 3329;
const ZETA: u32 = 17;

/// Shared secret key length for all ML-KEM variants, in bytes.
pub const SSK_LEN: usize = 32;

/// The (opaque) shared secret agreed by both parties after encapsulation
/// and decapsulation complete.
#[derive(Clone, Debug, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecretKey([u8; SSK_LEN]);

impl SerDes for SharedSecretKey {
    type ByteArray = [u8; SSK_LEN];

    fn into_bytes(self) -> Self::ByteArray { self.0 }

    fn try_from_bytes(ssk: Self::ByteArray) -> Result<Self, Error> {
        // No validation is possible on an opaque 32-byte secret; a Result
        // is kept for symmetry with the other SerDes impls.
        Ok(SharedSecretKey(ssk))
    }
}

impl PartialEq for SharedSecretKey {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for SharedSecretKey {}

// Injected into each parameter-set module below; binds the per-variant
// constants (K, ETA1, ETA2, DU, DV, EK_LEN, DK_LEN, CT_LEN) to the shared
// internals in ml_kem.rs and to trait impls on the const-generic newtypes
// from types.rs.
macro_rules! functionality {
    () => {
        const ETA1_64: usize = ETA1 as usize * 64;
        const ETA2_64: usize = ETA2 as usize * 64;

        use rand_core::CryptoRngCore;

        use crate::byte_fns::byte_decode;
        use crate::helpers::h;
        use crate::ml_kem::{ml_kem_decaps, ml_kem_encaps, ml_kem_key_gen};
        use crate::traits::{Decaps, Encaps, KeyGen, SerDes};
        use crate::types;
        use crate::SharedSecretKey;

        /// Correctly sized encapsulation key for this parameter set.
        pub type EncapsKey = types::EncapsKey<EK_LEN>;
        /// Correctly sized decapsulation key for this parameter set.
        pub type DecapsKey = types::DecapsKey<DK_LEN>;
        /// Correctly sized ciphertext for this parameter set.
        pub type CipherText = types::CipherText<CT_LEN>;

        /// Per FIPS 203, `ML-KEM.KeyGen` accepts no input, draws
        /// randomness, and produces an encapsulation key and a
        /// decapsulation key. The encapsulation key may be made public; the
        /// decapsulation key must remain private. `KG` is a zero-sized
        /// handle carrying only the [`KeyGen`] impl for this parameter set.
        pub struct KG;

        impl KeyGen for KG {
            type DecapsByteArray = [u8; DK_LEN];
            type DecapsKey = DecapsKey;
            type EncapsByteArray = [u8; EK_LEN];
            type EncapsKey = EncapsKey;

            fn try_keygen_with_rng(
                rng: &mut impl CryptoRngCore,
            ) -> Result<(EncapsKey, DecapsKey), crate::error::Error> {
                let (mut ek, mut dk) = ([0u8; EK_LEN], [0u8; DK_LEN]);
                ml_kem_key_gen::<K, ETA1_64>(rng, &mut ek, &mut dk)?;
                Ok((types::EncapsKey(ek), types::DecapsKey(dk)))
            }

            fn validate_keypair_vartime(ek: &[u8; EK_LEN], dk: &[u8; DK_LEN]) -> bool {
                let len_dk_pke = 384 * K;
                let len_ek_pke = 384 * K + 32;
                let same_ek = *ek == dk[len_dk_pke..len_dk_pke + len_ek_pke];
                let same_h = h(ek) == dk[len_dk_pke + len_ek_pke..len_dk_pke + len_ek_pke + 32];
                same_ek && same_h
            }
        }

        impl Encaps for EncapsKey {
            type CipherText = CipherText;
            type SharedSecretKey = SharedSecretKey;

            fn try_encaps_with_rng(
                &self, rng: &mut impl CryptoRngCore,
            ) -> Result<(SharedSecretKey, CipherText), crate::error::Error> {
                let mut ct = [0u8; CT_LEN];
                let ssk = ml_kem_encaps::<K, ETA1_64, ETA2_64>(rng, DU, DV, &self.0, &mut ct)?;
                Ok((ssk, types::CipherText(ct)))
            }
        }

        impl Decaps for DecapsKey {
            type CipherText = CipherText;
            type SharedSecretKey = SharedSecretKey;

            fn try_decaps(&self, ct: &CipherText) -> Result<SharedSecretKey, crate::error::Error> {
                ml_kem_decaps::<K, ETA1_64, ETA2_64, CT_LEN>(DU, DV, &self.0, &ct.0)
            }
        }

        impl SerDes for EncapsKey {
            type ByteArray = [u8; EK_LEN];

            fn into_bytes(self) -> Self::ByteArray { self.0 }

            fn try_from_bytes(ek: Self::ByteArray) -> Result<Self, crate::error::Error> {
                // "the byte array containing the encapsulation key correctly
                // decodes to an array of integers modulo q without any
                // modular reductions" — checked per §3, one 384-byte chunk
                // per row of the k x 256 matrix.
                for i in 0..K {
                    byte_decode(12, &ek[384 * i..384 * (i + 1)])?;
                }
                Ok(types::EncapsKey(ek))
            }
        }

        impl SerDes for DecapsKey {
            type ByteArray = [u8; DK_LEN];

            fn into_bytes(self) -> Self::ByteArray { self.0 }

            fn try_from_bytes(dk: Self::ByteArray) -> Result<Self, crate::error::Error> {
                // Fixed-size input already guarantees the length checks FIPS
                // 203 calls for; kept as a Result for symmetry and to leave
                // room for future validation.
                Ok(types::DecapsKey(dk))
            }
        }

        impl SerDes for CipherText {
            type ByteArray = [u8; CT_LEN];

            fn into_bytes(self) -> Self::ByteArray { self.0 }

            fn try_from_bytes(ct: Self::ByteArray) -> Result<Self, crate::error::Error> {
                Ok(types::CipherText(ct))
            }
        }
    };
}

/// Functionality for the ML-KEM-512 parameter set (NIST security category 1).
#[cfg(feature = "ml-kem-512")]
pub mod ml_kem_512 {
    //! Typical usage:
    //! 1. The originator runs `KG::try_keygen()` for an `EncapsKey`/`DecapsKey` pair.
    //! 2. The originator sends `encaps_key.into_bytes()` to the remote party.
    //! 3. The remote party runs `EncapsKey::try_from_bytes(..)` then `try_encaps()` for a
    //!    shared secret and a `CipherText`.
    //! 4. The remote party sends `cipher_text.into_bytes()` back to the originator.
    //! 5. The originator runs `CipherText::try_from_bytes(..)` then `decaps_key.try_decaps(..)`.
    //! 6. Both sides now hold the same shared secret.

    const K: usize = 2;
    const ETA1: u32 = 3;
    const ETA2: u32 = 2;
    const DU: u32 = 10;
    const DV: u32 = 4;

    /// Serialized encapsulation key length, in bytes.
    pub const EK_LEN: usize = 800;
    /// Serialized decapsulation key length, in bytes.
    pub const DK_LEN: usize = 1632;
    /// Serialized ciphertext length, in bytes.
    pub const CT_LEN: usize = 768;

    functionality!();
}

/// Functionality for the ML-KEM-768 parameter set (NIST security category 3).
#[cfg(feature = "ml-kem-768")]
pub mod ml_kem_768 {
    //! See [`ml_kem_512`](super::ml_kem_512) for the usage flow; identical,
    //! just with this module's key and ciphertext types.

    const K: usize = 3;
    const ETA1: u32 = 2;
    const ETA2: u32 = 2;
    const DU: u32 = 10;
    const DV: u32 = 4;

    /// Serialized encapsulation key length, in bytes.
    pub const EK_LEN: usize = 1184;
    /// Serialized decapsulation key length, in bytes.
    pub const DK_LEN: usize = 2400;
    /// Serialized ciphertext length, in bytes.
    pub const CT_LEN: usize = 1088;

    functionality!();
}

/// Functionality for the ML-KEM-1024 parameter set (NIST security category 5).
#[cfg(feature = "ml-kem-1024")]
pub mod ml_kem_1024 {
    //! See [`ml_kem_512`](super::ml_kem_512) for the usage flow; identical,
    //! just with this module's key and ciphertext types.

    const K: usize = 4;
    const ETA1: u32 = 2;
    const ETA2: u32 = 2;
    const DU: u32 = 11;
    const DV: u32 = 5;

    /// Serialized encapsulation key length, in bytes.
    pub const EK_LEN: usize = 1568;
    /// Serialized decapsulation key length, in bytes.
    pub const DK_LEN: usize = 3168;
    /// Serialized ciphertext length, in bytes.
    pub const CT_LEN: usize = 1568;

    functionality!();
}
