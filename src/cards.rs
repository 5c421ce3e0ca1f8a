//! Suit holding bitmask
//!
//! A holding is the set of ranks one hand holds in one suit, stored as a
//! 13-bit mask: bit 0 = the two, bit 12 = the ace. Callers outside the
//! solver use the shifted layout where rank `r` sits at bit `r`.

use super::types::*;

/// Cards of one suit held by one hand
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Holding {
    bits: u16,
}

impl Holding {
    /// Create empty holding
    #[inline]
    pub const fn new() -> Self {
        Holding { bits: 0 }
    }

    /// Create from the internal 13-bit layout; stray high bits are dropped
    #[inline]
    pub const fn from_bits(bits: u16) -> Self {
        Holding {
            bits: bits & FULL_SUIT,
        }
    }

    /// Create from the external layout (rank r at bit r)
    #[inline]
    pub const fn from_external(bits: u32) -> Self {
        Holding::from_bits((bits >> 2) as u16)
    }

    /// Raw 13-bit mask
    #[inline]
    pub fn bits(&self) -> u16 {
        self.bits
    }

    /// Mask in the external layout (rank r at bit r)
    #[inline]
    pub fn to_external(&self) -> u32 {
        (self.bits as u32) << 2
    }

    /// Count number of cards
    #[inline]
    pub fn size(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Check if empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Check if a rank is present
    #[inline]
    pub fn have(&self, rank: Rank) -> bool {
        self.bits & bit_map_rank(rank) != 0
    }

    /// Highest rank held, or 0 when void
    #[inline]
    pub fn top(&self) -> Rank {
        if self.bits == 0 {
            0
        } else {
            15 - self.bits.leading_zeros() as usize + TWO
        }
    }

    /// Lowest rank held, or 0 when void
    #[inline]
    pub fn bottom(&self) -> Rank {
        if self.bits == 0 {
            0
        } else {
            self.bits.trailing_zeros() as usize + TWO
        }
    }

    /// Union of two holdings
    #[inline]
    pub fn union(&self, other: Holding) -> Holding {
        Holding::from_bits(self.bits | other.bits)
    }

    /// Intersection of two holdings
    #[inline]
    pub fn intersect(&self, other: Holding) -> Holding {
        Holding::from_bits(self.bits & other.bits)
    }

    /// Ranks in self but not in other
    #[inline]
    pub fn different(&self, other: Holding) -> Holding {
        Holding::from_bits(self.bits & !other.bits)
    }

    /// Add a single rank
    #[inline]
    pub fn add(&mut self, rank: Rank) -> &mut Self {
        self.bits |= bit_map_rank(rank);
        self
    }

    /// Remove a single rank
    #[inline]
    pub fn remove(&mut self, rank: Rank) -> &mut Self {
        self.bits &= !bit_map_rank(rank);
        self
    }

    /// High card points
    pub fn points(&self) -> usize {
        self.iter()
            .filter(|&rank| rank > TEN)
            .map(|rank| rank - TEN)
            .sum()
    }

    /// Iterate over ranks, highest first
    pub fn iter(&self) -> HoldingIterator {
        HoldingIterator { bits: self.bits }
    }

    /// Parse ranks such as "AKT4"; "-" and "" denote a void
    pub fn parse(s: &str) -> Option<Holding> {
        let mut holding = Holding::new();
        for c in s.chars() {
            if c == '-' {
                continue;
            }
            let rank = char_to_rank(c)?;
            if holding.have(rank) {
                return None;
            }
            holding.add(rank);
        }
        Some(holding)
    }
}

impl std::fmt::Debug for Holding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Holding({})", self)
    }
}

impl std::fmt::Display for Holding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for rank in self.iter() {
            write!(f, "{}", rank_name(rank))?;
        }
        Ok(())
    }
}

/// Iterator over the ranks of a holding, highest first
pub struct HoldingIterator {
    bits: u16,
}

impl Iterator for HoldingIterator {
    type Item = Rank;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            None
        } else {
            let index = 15 - self.bits.leading_zeros() as usize;
            self.bits &= !(1 << index);
            Some(index + TWO)
        }
    }
}

impl IntoIterator for Holding {
    type Item = Rank;
    type IntoIter = HoldingIterator;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
