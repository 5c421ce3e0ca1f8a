//! Transposition table interface shared by both backends
//!
//! Entries are stored for positions at the start of a trick. A position is
//! identified by the trick, the hand on lead, the suit lengths of all four
//! hands and, per suit, which hand owns each of the top cards that mattered
//! to the result. Bounds count North-South tricks from the stored trick on,
//! so they stay valid when a later solve of a similar deal reaches the same
//! pattern with a different side to move.

use super::config::TtKind;
use super::lookup::tables;
use super::position::HandLookup;
use super::tt_large::TransTableL;
use super::tt_small::TransTableS;
use super::types::*;

/// Trick slots that can hold entries (trick 0 is never stored)
pub const TT_TRICKS: usize = 13;

/// Bounds and hints for one stored position
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeCards {
    /// Most NS tricks from this trick on
    pub ubound: u8,
    /// Fewest NS tricks from this trick on
    pub lbound: u8,
    pub best_move_suit: u8,
    /// 0 when no best move is known
    pub best_move_rank: u8,
    /// Per suit, how many top cards the result depends on
    pub least_win: [u8; NUM_SUITS],
}

/// Why a table was wiped
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetReason {
    Unknown,
    TooManyNodes,
    NewDeal,
    NewTrump,
    MemoryExhausted,
    FreeMemory,
}

impl ResetReason {
    pub const COUNT: usize = 6;

    pub fn index(self) -> usize {
        match self {
            ResetReason::Unknown => 0,
            ResetReason::TooManyNodes => 1,
            ResetReason::NewDeal => 2,
            ResetReason::NewTrump => 3,
            ResetReason::MemoryExhausted => 4,
            ResetReason::FreeMemory => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ResetReason::Unknown => "unknown",
            ResetReason::TooManyNodes => "too many nodes",
            ResetReason::NewDeal => "new deal",
            ResetReason::NewTrump => "new trump",
            ResetReason::MemoryExhausted => "memory exhausted",
            ResetReason::FreeMemory => "free memory",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TtStats {
    pub lookups: u64,
    pub hits: u64,
    pub adds: u64,
    /// Entries currently stored
    pub entries: u64,
    /// Blocks reclaimed from stale entries instead of by a reset
    pub harvested: u64,
    pub resets: [u64; ResetReason::COUNT],
}

impl TtStats {
    pub fn resets_for(&self, reason: ResetReason) -> u64 {
        self.resets[reason.index()]
    }

    pub fn total_resets(&self) -> u64 {
        self.resets.iter().sum()
    }
}

/// Result of a table lookup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TtLookup {
    /// Stored bounds decide the query; `lower_flag` is set when the lower
    /// bound did
    Hit { node: NodeCards, lower_flag: bool },
    /// A matching entry that does not decide the query; its best move is
    /// still a good first try
    BestMove { suit: Suit, rank: Rank },
    Miss,
}

/// Does a stored node decide a query with the given NS limit?
#[inline]
pub fn decide(node: &NodeCards, limit: i32) -> Option<bool> {
    if node.lbound as i32 > limit {
        Some(true)
    } else if (node.ubound as i32) <= limit {
        Some(false)
    } else {
        None
    }
}

/// Merge new bounds into a stored node, only ever narrowing them
pub fn tighten(stored: &mut NodeCards, new: &NodeCards, keep_best_move: bool) {
    let lbound = stored.lbound.max(new.lbound);
    let ubound = stored.ubound.min(new.ubound);
    if lbound > ubound {
        // Conflicting records: trust the newer one
        stored.lbound = new.lbound;
        stored.ubound = new.ubound;
    } else {
        stored.lbound = lbound;
        stored.ubound = ubound;
    }
    stored.least_win = new.least_win;
    if keep_best_move {
        stored.best_move_suit = new.best_move_suit;
        stored.best_move_rank = new.best_move_rank;
    }
}

/// Pack the suit lengths of all hands into one key
#[inline]
pub fn suit_lengths(hand_dist: &[u32; NUM_SEATS]) -> u64 {
    ((hand_dist[0] as u64) << 36)
        | ((hand_dist[1] as u64) << 24)
        | ((hand_dist[2] as u64) << 12)
        | hand_dist[3] as u64
}

/// Per-deal owner patterns for every subset of each suit.
///
/// For a set of remaining ranks, `aggr_ranks` lists the owners of its
/// cards from the top down, two bits per card with the top card at bits
/// 24-25. `win_mask` has `11` in the same places.
pub struct OrderTables {
    aggr_ranks: Vec<u32>,
    win_mask: Vec<u32>,
}

const SUBSETS: usize = 1 << NUM_RANKS;

impl Default for OrderTables {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderTables {
    pub fn new() -> Self {
        OrderTables {
            aggr_ranks: vec![0; NUM_SUITS * SUBSETS],
            win_mask: vec![0; NUM_SUITS * SUBSETS],
        }
    }

    /// Rebuild from the owners of the deal's cards
    pub fn init(&mut self, hand_lookup: &HandLookup) {
        let t = tables();
        for suit in 0..NUM_SUITS {
            let base = suit * SUBSETS;
            self.aggr_ranks[base] = 0;
            self.win_mask[base] = 0;
            for ind in 1..SUBSETS {
                let top = t.highest_rank(ind as u16);
                let rest = ind ^ bit_map_rank(top) as usize;
                let owner = (hand_lookup[suit][top] & 3) as u32;
                self.aggr_ranks[base + ind] = (self.aggr_ranks[base + rest] >> 2) | (owner << 24);
                self.win_mask[base + ind] = (self.win_mask[base + rest] >> 2) | (3 << 24);
            }
        }
    }

    /// Owner pattern of the current position, per suit
    pub fn query(&self, aggr: &[u16; NUM_SUITS]) -> [u32; NUM_SUITS] {
        let mut set = [0u32; NUM_SUITS];
        for suit in 0..NUM_SUITS {
            set[suit] = self.aggr_ranks[suit * SUBSETS + (aggr[suit] & FULL_SUIT) as usize];
        }
        set
    }

    /// Stored pattern for a result depending on `win_ranks`: the owners of
    /// every remaining card at or above the lowest relevant rank
    pub fn pattern(&self, aggr: &[u16; NUM_SUITS], win_ranks: &[u16; NUM_SUITS]) -> Pattern {
        let mut pattern = Pattern::default();
        for suit in 0..NUM_SUITS {
            let w = win_ranks[suit] & win_ranks[suit].wrapping_neg();
            let temp = (aggr[suit] & w.wrapping_neg() & FULL_SUIT) as usize;
            pattern.win_mask[suit] = self.win_mask[suit * SUBSETS + temp];
            pattern.order_set[suit] = self.aggr_ranks[suit * SUBSETS + temp];
            pattern.least_win[suit] = temp.count_ones() as u8;
        }
        pattern
    }
}

/// What an entry remembers about the cards
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pattern {
    pub win_mask: [u32; NUM_SUITS],
    pub order_set: [u32; NUM_SUITS],
    pub least_win: [u8; NUM_SUITS],
}

impl Pattern {
    /// Whether a position with owner pattern `query` matches in every suit
    #[inline]
    pub fn matches(&self, query: &[u32; NUM_SUITS]) -> bool {
        (0..NUM_SUITS).all(|s| query[s] & self.win_mask[s] == self.order_set[s])
    }
}

/// A memory-budgeted cache of solved positions
pub trait TransTable: Send {
    /// Set the card owners of the deal about to be searched
    fn init(&mut self, hand_lookup: &HandLookup);

    fn set_memory_default(&mut self, megabytes: usize);

    fn set_memory_maximum(&mut self, megabytes: usize);

    /// Allocate the initial storage
    fn make_tt(&mut self);

    /// Drop all entries
    fn reset_memory(&mut self, reason: ResetReason);

    /// Drop all entries and give back all storage
    fn return_all_memory(&mut self);

    /// Storage in use, in kB
    fn memory_in_use(&self) -> usize;

    /// Look up the position; `limit` is compared with NS tricks
    fn lookup(
        &mut self,
        trick: usize,
        seat: Seat,
        aggr: &[u16; NUM_SUITS],
        hand_dist: &[u32; NUM_SEATS],
        limit: i32,
    ) -> TtLookup;

    /// Store or tighten an entry for the position
    #[allow(clippy::too_many_arguments)]
    fn add(
        &mut self,
        trick: usize,
        seat: Seat,
        aggr: &[u16; NUM_SUITS],
        win_ranks: &[u16; NUM_SUITS],
        hand_dist: &[u32; NUM_SEATS],
        node: NodeCards,
        keep_best_move: bool,
    );

    fn stats(&self) -> TtStats;
}

/// Build a table of the given kind with its memory budgets
pub fn new_trans_table(kind: TtKind, default_mb: usize, max_mb: usize) -> Box<dyn TransTable> {
    let mut tt: Box<dyn TransTable> = match kind {
        TtKind::Small => Box::new(TransTableS::new()),
        TtKind::Large => Box::new(TransTableL::new()),
    };
    tt.set_memory_default(default_mb);
    tt.set_memory_maximum(max_mb);
    tt.make_tt();
    tt
}
