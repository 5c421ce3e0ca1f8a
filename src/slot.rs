//! Per-worker solve context
//!
//! A slot owns a searcher and its transposition table and remembers the
//! last deal and trump it solved, so that consecutive solves of the same or
//! a similar deal keep the table.

use tracing::debug;

use super::config::SolverConfig;
use super::deal::{DdTable, Deal};
use super::error::SolveError;
use super::hands::Hands;
use super::search::{SearchStats, Searcher};
use super::trans_table::{ResetReason, TtStats};
use super::types::*;

/// Search nodes after which the table is dropped before the next solve
pub const NODES_BEFORE_RESET: u64 = 700_000;

/// A deal counts as similar when the remaining cards outweigh the changed
/// cards by more than this factor
const SIMILARITY_FACTOR: u64 = 5;

/// Counters collected over the lifetime of a slot
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlotStats {
    pub solves: u64,
    pub search: SearchStats,
    pub tt: TtStats,
}

pub struct SolveSlot {
    pub(crate) searcher: Searcher,
    prev_holdings: [[u16; NUM_SUITS]; NUM_SEATS],
    prev_trump: Option<usize>,
    nodes_since_reset: u64,
    solves: u64,
    totals: SearchStats,
}

impl SolveSlot {
    pub fn new(config: &SolverConfig) -> Self {
        SolveSlot {
            searcher: Searcher::new(config),
            prev_holdings: [[0; NUM_SUITS]; NUM_SEATS],
            prev_trump: None,
            nodes_since_reset: 0,
            solves: 0,
            totals: SearchStats::default(),
        }
    }

    pub fn stats(&self) -> SlotStats {
        SlotStats {
            solves: self.solves,
            search: self.totals,
            tt: self.searcher.tt().stats(),
        }
    }

    /// Table memory in use, in kB
    pub fn memory_in_use(&self) -> usize {
        self.searcher.tt().memory_in_use()
    }

    /// Drop the table and forget the last deal
    pub fn reset(&mut self, reason: ResetReason) {
        self.searcher.tt_mut().reset_memory(reason);
        self.prev_trump = None;
        self.nodes_since_reset = 0;
    }

    /// Give all table memory back
    pub fn free_memory(&mut self) {
        self.searcher.tt_mut().return_all_memory();
        self.prev_trump = None;
        self.nodes_since_reset = 0;
    }

    /// Decide whether the table survives into a solve of `holdings`
    pub(crate) fn prepare_table(
        &mut self,
        holdings: &[[u16; NUM_SUITS]; NUM_SEATS],
        trump: usize,
        mode: i32,
    ) {
        let mut diff = 0u64;
        let mut agg = 0u64;
        for seat in 0..NUM_SEATS {
            for suit in 0..NUM_SUITS {
                let c = holdings[seat][suit];
                agg += c as u64;
                diff += (c ^ self.prev_holdings[seat][suit]) as u64;
            }
        }
        let new_deal = diff != 0;
        let similar = diff == 0 || agg / diff > SIMILARITY_FACTOR;
        let new_trump = self.prev_trump != Some(trump);

        if mode != 2 {
            let reason = if self.nodes_since_reset > NODES_BEFORE_RESET {
                Some(ResetReason::TooManyNodes)
            } else if new_deal && !similar {
                Some(ResetReason::NewDeal)
            } else if new_trump {
                Some(ResetReason::NewTrump)
            } else {
                None
            };
            if let Some(reason) = reason {
                self.searcher.tt_mut().reset_memory(reason);
                self.nodes_since_reset = 0;
            } else if new_deal {
                debug!(diff, agg, "similar deal, keeping table");
            }
        }
        self.prev_holdings = *holdings;
        self.prev_trump = Some(trump);
    }

    /// Fold the counters of the solve just finished into the totals
    pub(crate) fn finish_solve(&mut self) {
        let stats = self.searcher.stats;
        self.nodes_since_reset += stats.nodes;
        self.totals.add(&stats);
        self.solves += 1;
    }

    /// Tricks for every declarer in every strain. Each strain is solved on
    /// this slot with one table shared by the four leaders.
    pub fn calc_dd_table(&mut self, hands: &Hands) -> Result<DdTable, SolveError> {
        let tricks = hands.num_tricks() as i32;
        let mut table = DdTable::default();
        for strain in 0..NUM_STRAINS {
            for (i, declarer) in [NORTH, EAST, SOUTH, WEST].into_iter().enumerate() {
                let deal = Deal::new(hands, strain, left_hand_opp(declarer));
                let mode = if i == 0 { 1 } else { 2 };
                let fut = self.solve_board(&deal, -1, 1, mode)?;
                table.res_table[strain][declarer] = tricks - fut.score[0];
            }
        }
        debug!(ddt = %table.to_ddt_string(), "table done");
        Ok(table)
    }
}
