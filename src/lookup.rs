//! Precomputed tables over every 13-bit suit holding
//!
//! Built once on first use and shared read-only by every solve slot.

use once_cell::sync::Lazy;

use super::types::*;

/// Number of distinct suit holdings
pub const HOLDINGS: usize = 1 << NUM_RANKS;

/// Most runs a 13-card suit can split into (alternating ranks)
pub const MAX_GROUPS: usize = 7;

/// Run-length decomposition of a holding, lowest run first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GroupData {
    /// Number of runs
    pub len: usize,
    /// Top rank of each run
    pub rank: [Rank; MAX_GROUPS],
    /// The run without its top card
    pub sequence: [u16; MAX_GROUPS],
    /// The whole run
    pub fullseq: [u16; MAX_GROUPS],
    /// Ranks between this run and the next lower run
    pub gap: [u16; MAX_GROUPS],
}

/// All per-holding tables
pub struct LookupTables {
    highest_rank: Vec<u8>,
    lowest_rank: Vec<u8>,
    count: Vec<u8>,
    rel_rank: Vec<[u8; 15]>,
    win_ranks: Vec<[u16; NUM_RANKS + 1]>,
    groups: Vec<GroupData>,
}

static TABLES: Lazy<LookupTables> = Lazy::new(LookupTables::build);

/// Shared lookup tables, built on first call
#[inline]
pub fn tables() -> &'static LookupTables {
    &TABLES
}

impl LookupTables {
    fn build() -> Self {
        let mut highest_rank = vec![0u8; HOLDINGS];
        let mut lowest_rank = vec![0u8; HOLDINGS];
        let mut count = vec![0u8; HOLDINGS];
        let mut rel_rank = vec![[0u8; 15]; HOLDINGS];
        let mut win_ranks = vec![[0u16; NUM_RANKS + 1]; HOLDINGS];
        let mut groups = vec![GroupData::default(); HOLDINGS];

        for holding in 0..HOLDINGS {
            let bits = holding as u16;
            count[holding] = bits.count_ones() as u8;
            if bits != 0 {
                highest_rank[holding] = (15 - bits.leading_zeros() as usize + TWO) as u8;
                lowest_rank[holding] = (bits.trailing_zeros() as usize + TWO) as u8;
            }

            let mut order = 0u8;
            let mut top = 0u16;
            for rank in (TWO..=ACE).rev() {
                if bits & bit_map_rank(rank) != 0 {
                    order += 1;
                    rel_rank[holding][rank] = order;
                    top |= bit_map_rank(rank);
                    win_ranks[holding][order as usize] = top;
                }
            }
            for n in (order as usize + 1)..=NUM_RANKS {
                win_ranks[holding][n] = top;
            }

            groups[holding] = decompose(bits);
        }

        LookupTables {
            highest_rank,
            lowest_rank,
            count,
            rel_rank,
            win_ranks,
            groups,
        }
    }

    /// Highest rank in the holding, 0 when void
    #[inline]
    pub fn highest_rank(&self, holding: u16) -> Rank {
        self.highest_rank[holding as usize] as Rank
    }

    /// Lowest rank in the holding, 0 when void
    #[inline]
    pub fn lowest_rank(&self, holding: u16) -> Rank {
        self.lowest_rank[holding as usize] as Rank
    }

    /// Number of cards in the holding
    #[inline]
    pub fn count(&self, holding: u16) -> usize {
        self.count[holding as usize] as usize
    }

    /// Position of `rank` among the cards of `holding`, 1 = highest, 0 = absent
    #[inline]
    pub fn rel_rank(&self, holding: u16, rank: Rank) -> usize {
        self.rel_rank[holding as usize][rank] as usize
    }

    /// The top `n` cards of the holding (all of it when shorter)
    #[inline]
    pub fn win_ranks(&self, holding: u16, n: usize) -> u16 {
        self.win_ranks[holding as usize][n.min(NUM_RANKS)]
    }

    /// Run decomposition of the holding
    #[inline]
    pub fn groups(&self, holding: u16) -> &GroupData {
        &self.groups[holding as usize]
    }
}

/// Split a holding into maximal runs of adjacent ranks, lowest run first
fn decompose(bits: u16) -> GroupData {
    let mut data = GroupData::default();
    let mut prev_held = false;
    for rank in TWO..=ACE {
        let bit = bit_map_rank(rank);
        if bits & bit == 0 {
            prev_held = false;
            continue;
        }
        if prev_held {
            let g = data.len - 1;
            data.sequence[g] |= bit_map_rank(data.rank[g]);
            data.fullseq[g] |= bit;
            data.rank[g] = rank;
        } else {
            let g = data.len;
            data.rank[g] = rank;
            data.sequence[g] = 0;
            data.fullseq[g] = bit;
            data.gap[g] = if g == 0 {
                0
            } else {
                // Ranks strictly between the lower run's top and this rank
                (bit - 1) & !((bit_map_rank(data.rank[g - 1]) << 1) - 1)
            };
            data.len += 1;
        }
        prev_held = true;
    }
    data
}
