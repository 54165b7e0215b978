//! Quorum Membership Bitmaps
//!
//! A registry stores one membership word per operator where bit `i` is set if the operator is
//! registered in quorum `i`. This module provides the fixed-width [`QuorumBitmap`] type and the
//! checked conversions between that word and an explicit list of quorum numbers.

use std::fmt;

use alloy_primitives::U256;
use arbitrary::Arbitrary;
use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a quorum. Quorums are numbered densely from zero.
pub type QuorumNumber = u8;

/// Number of quorums a [`QuorumBitmap`] can represent.
pub const MAX_QUORUM_COUNT: usize = 192;

/// Number of 64-bit limbs backing a [`QuorumBitmap`].
const LIMBS: usize = MAX_QUORUM_COUNT / 64;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum BitmapError {
    /// A quorum number does not fit in the bitmap width.
    #[error("quorum number {quorum} exceeds bitmap width of {MAX_QUORUM_COUNT} bits")]
    QuorumOutOfRange { quorum: usize },

    /// A raw membership word has bits set above the bitmap width.
    #[error("membership word has bit {highest_bit} set, bitmap width is {MAX_QUORUM_COUNT} bits")]
    WordTooWide { highest_bit: usize },
}

/// Fixed-width (192-bit) quorum membership bitmap.
///
/// Bit `i` is set iff the operator belongs to quorum `i`. The width is enforced at every
/// conversion boundary, so a value of this type never carries bits the registry could not have
/// produced.
#[derive(Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "U256", into = "U256")]
pub struct QuorumBitmap {
    /// Little-endian limbs; bit `i` lives in `limbs[i / 64]` at position `i % 64`.
    limbs: [u64; LIMBS],
}

impl QuorumBitmap {
    /// Bitmap with no quorums set.
    pub const EMPTY: Self = Self { limbs: [0; LIMBS] };

    /// Bitmap with every representable quorum set.
    pub const FULL: Self = Self {
        limbs: [u64::MAX; LIMBS],
    };

    /// Builds a bitmap from an explicit list of quorum numbers.
    ///
    /// Duplicates are harmless. Any quorum number at or above [`MAX_QUORUM_COUNT`] is rejected.
    pub fn from_quorum_numbers(
        quorums: impl IntoIterator<Item = QuorumNumber>,
    ) -> Result<Self, BitmapError> {
        let mut bitmap = Self::EMPTY;
        for quorum in quorums {
            bitmap.try_insert(quorum)?;
        }
        Ok(bitmap)
    }

    /// Builds a bitmap containing quorums `0..count`.
    pub fn first_n(count: usize) -> Result<Self, BitmapError> {
        if count > MAX_QUORUM_COUNT {
            return Err(BitmapError::QuorumOutOfRange { quorum: count - 1 });
        }
        let mut bitmap = Self::EMPTY;
        bitmap.limbs.view_bits_mut::<Lsb0>()[..count].fill(true);
        Ok(bitmap)
    }

    /// Marks the operator as a member of `quorum`.
    pub fn try_insert(&mut self, quorum: QuorumNumber) -> Result<(), BitmapError> {
        let idx = quorum as usize;
        if idx >= MAX_QUORUM_COUNT {
            return Err(BitmapError::QuorumOutOfRange { quorum: idx });
        }
        self.limbs.view_bits_mut::<Lsb0>().set(idx, true);
        Ok(())
    }

    /// Returns whether `quorum` is set. Out-of-range quorums are never set.
    pub fn contains(&self, quorum: QuorumNumber) -> bool {
        self.bits()
            .get(quorum as usize)
            .map(|b| *b)
            .unwrap_or(false)
    }

    /// Returns an iterator over the set quorum numbers in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = QuorumNumber> + '_ {
        // Positions are bounded by the bitmap width, which fits in a `u8`.
        self.bits().iter_ones().map(|i| i as QuorumNumber)
    }

    /// Decodes the bitmap into the ascending list of quorum numbers it contains.
    pub fn quorum_numbers(&self) -> Vec<QuorumNumber> {
        self.iter().collect()
    }

    /// Returns the number of quorums set.
    pub fn count(&self) -> usize {
        self.bits().count_ones()
    }

    /// Returns `true` if no quorum is set.
    pub fn is_empty(&self) -> bool {
        self.bits().not_any()
    }

    /// Returns the raw membership word.
    pub fn to_u256(&self) -> U256 {
        let [a, b, c] = self.limbs;
        U256::from_limbs([a, b, c, 0])
    }

    fn bits(&self) -> &BitSlice<u64, Lsb0> {
        self.limbs.view_bits::<Lsb0>()
    }
}

impl TryFrom<U256> for QuorumBitmap {
    type Error = BitmapError;

    fn try_from(word: U256) -> Result<Self, Self::Error> {
        let [a, b, c, top] = *word.as_limbs();
        if top != 0 {
            return Err(BitmapError::WordTooWide {
                highest_bit: word.bit_len() - 1,
            });
        }
        Ok(Self { limbs: [a, b, c] })
    }
}

impl From<QuorumBitmap> for U256 {
    fn from(bitmap: QuorumBitmap) -> Self {
        bitmap.to_u256()
    }
}

impl fmt::Debug for QuorumBitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a> Arbitrary<'a> for QuorumBitmap {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let limbs: [u64; LIMBS] = u.arbitrary()?;
        Ok(Self { limbs })
    }
}
