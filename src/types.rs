use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::Q;

// While Z is nice, simple and correct, the performance is suboptimal.
// This will be addressed (particularly in matrix operations etc) 'soon',
// potentially as a 256-entry row.

/// Stored as u16, but arithmetic as u32/u64 (so we can multiply/reduce/etc)
#[derive(Clone, Copy, Default)]
pub(crate) struct Z(u16);


#[allow(clippy::inline_always)]
impl Z {
    const M: u64 = 2u64.pow(32) / (Self::Q64);
    #[allow(clippy::cast_possible_truncation)]
    const Q16: u16 = Q as u16;
    const Q64: u64 = Q as u64;

    /// Zero element, usable in `const` contexts (e.g. table initializers).
    pub(crate) const ZERO: Self = Self(0);

    /// Builds a `Z` from an already-reduced `u16`, usable in `const` contexts.
    pub(crate) const fn from_u16(x: u16) -> Self { Self(x) }

    pub(crate) fn get_u16(self) -> u16 { self.0 }

    pub(crate) fn get_u32(self) -> u32 { u32::from(self.0) }

    pub(crate) fn set_u16(&mut self, a: u16) { self.0 = a }

    #[inline(always)]
    pub(crate) fn add(self, other: Self) -> Self {
        let sum = self.0.wrapping_add(other.0);
        let (trial, borrow) = sum.overflowing_sub(Self::Q16);
        let result = if borrow { sum } else { trial };
        Self(result)
    }

    #[inline(always)]
    pub(crate) fn sub(self, other: Self) -> Self {
        let (diff, borrow) = self.0.overflowing_sub(other.0);
        let trial = diff.wrapping_add(Self::Q16);
        let result = if borrow { trial } else { diff };
        Self(result)
    }

    #[inline(always)]
    pub(crate) fn mul(self, other: Self) -> Self {
        let prod = u64::from(self.0) * u64::from(other.0);
        let quot = prod * Self::M;
        let quot = quot >> 32;
        let rem = prod - quot * Self::Q64;
        let (diff, borrow) = rem.overflowing_sub(Self::Q64);
        let result = if borrow { rem } else { diff };
        Self(u16::try_from(result).expect("reduced value fits u16"))
    }
}


/// Correctly sized encapsulation key, generic over the byte length of the
/// target parameter set.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncapsKey<const EK_LEN: usize>(pub(crate) [u8; EK_LEN]);

/// Correctly sized decapsulation key, generic over the byte length of the
/// target parameter set.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DecapsKey<const DK_LEN: usize>(pub(crate) [u8; DK_LEN]);

/// Correctly sized ciphertext, generic over the byte length of the target
/// parameter set.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CipherText<const CT_LEN: usize>(pub(crate) [u8; CT_LEN]);
