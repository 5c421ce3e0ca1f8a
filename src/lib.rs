//! Bridge double-dummy solver
//!
//! Answers, for a position with every hand visible, how many tricks the side
//! to play takes with best play by both sides, and which cards achieve it.
//!
//! The search is a boolean alpha-beta ("can this side take `n` tricks?")
//! driven by a binary search over `n`. It is pruned by:
//! - quick tricks and later trump tricks counted at every trick start
//! - a transposition table keyed on which hand holds the relevant cards
//!   rather than on the cards themselves, so that results carry over to
//!   positions differing only in irrelevant spot cards
//! - skipping moves equivalent to a move that already failed
//!
//! Each [`SolveSlot`] owns its own search state and table. Batches run one
//! slot per worker with nothing shared.
//!
//! # Example
//!
//! ```
//! use bridge_dds::{Deal, SolveSlot, SolverConfig, NORTH, NOTRUMP};
//!
//! // North's ace-queen sits under East's king
//! let deal = Deal::from_pbn("N:AQ... KJ... 32... .43..", NOTRUMP, NORTH).unwrap();
//! let mut slot = SolveSlot::new(&SolverConfig::default());
//! let fut = slot.solve_board(&deal, -1, 1, 1).unwrap();
//! assert_eq!(fut.score[0], 1);
//! ```

mod arena;
mod batch;
pub mod cards;
mod config;
mod convert;
mod deal;
mod error;
mod hands;
mod heuristic;
mod later_tricks;
mod lookup;
mod moves;
mod position;
mod quick_tricks;
mod search;
mod slot;
mod solver;
mod trans_table;
mod tt_large;
mod tt_small;
pub mod types;

pub use batch::{
    calc_all_tables, runner_for, solve_all_boards, BoardRunner, RayonRunner, SequentialRunner,
    SolverPool,
};
pub use cards::Holding;
pub use config::{ConfigError, SearchOptions, SolverConfig, ThreadBackend, TtKind};
pub use convert::{direction_to_seat, seat_to_direction};
pub use deal::{Board, DdTable, Deal, FutureTricks, ScoredCard, TABLE_DECLARERS, TABLE_STRAINS};
pub use error::{SolveError, RETURN_NO_FAULT};
pub use hands::Hands;
pub use search::SearchStats;
pub use slot::{SlotStats, SolveSlot};
pub use trans_table::{ResetReason, TtStats};
pub use types::{Rank, Seat, Suit, NOTRUMP, NUM_RANKS, NUM_SEATS, NUM_SUITS, TOTAL_CARDS, TOTAL_TRICKS};
pub use types::{CLUB, DIAMOND, HEART, SPADE};
pub use types::{EAST, NORTH, SOUTH, WEST};

#[cfg(test)]
mod tests;
