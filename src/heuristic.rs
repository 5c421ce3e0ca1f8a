//! Move ordering weights
//!
//! Higher weights are tried first. The weights only affect how quickly
//! cutoffs are found; every legal representative move is still generated.

use super::moves::{Move, TrickTrack};
use super::position::Position;
use super::types::*;

/// Bonus for the move that caused a cutoff at the same depth before
pub const KILLER_BONUS: i32 = 100;
/// Bonus for the best move remembered by the transposition table
pub const TABLE_BONUS: i32 = 90;

/// Weight of a lead
pub fn lead_weight(pos: &Position, seat: Seat, mv: &Move, trump: usize) -> i32 {
    let suit = mv.suit;
    let pard = partner(seat);
    let lho = left_hand_opp(seat);
    let rho = right_hand_opp(seat);
    let rank = mv.rank as i32;
    let is_trump_game = trump != NOTRUMP;

    let opp_can_ruff = |opp: Seat| {
        is_trump_game
            && suit != trump
            && pos.length[opp][suit] == 0
            && pos.length[opp][trump] > 0
    };

    let mut weight = 0;
    let top = pos.winner[suit];

    if top.rank == mv.rank {
        // Cashing a master card
        weight += 40;
        if pos.length[lho][suit] > 0 || pos.length[rho][suit] > 0 {
            weight += 5;
        }
    } else if top.seat == pard {
        // Put partner in with a low card
        weight += 30 - rank;
    } else {
        weight -= rank;
        if pos.second_best[suit].seat == seat || pos.second_best[suit].seat == pard {
            weight += 5;
        }
    }

    if opp_can_ruff(lho) || opp_can_ruff(rho) {
        weight -= 50;
    }

    if is_trump_game
        && suit != trump
        && pos.length[pard][suit] == 0
        && pos.length[pard][trump] > 0
        && !opp_can_ruff(lho)
    {
        // Partner ruffs
        weight += 25 - rank;
    }

    if is_trump_game && suit == trump && (top.seat == seat || top.seat == pard) {
        weight += 10;
    }

    weight
}

/// Weight of a card played by the second, third or fourth hand
pub fn follow_weight(
    pos: &Position,
    seat: Seat,
    rel: usize,
    track: &TrickTrack,
    mv: &Move,
    trump: usize,
) -> i32 {
    let best = track.winning[rel - 1];
    let best_seat = hand_id(track.lead_seat, track.high[rel - 1]);
    let partner_winning = best_seat == partner(seat);
    let rank = mv.rank as i32;

    if mv.suit == track.lead_suit {
        let beats = best.suit == mv.suit && mv.rank > best.rank;
        if partner_winning || !beats {
            return -rank;
        }
        if rel == 3 {
            // Win as cheaply as possible
            return 60 - rank;
        }
        if pos.winner[mv.suit].rank == mv.rank {
            return 50;
        }
        return 25 - rank;
    }

    if trump != NOTRUMP && mv.suit == trump {
        if partner_winning {
            return -40 - rank;
        }
        if best.suit == trump && best.rank > mv.rank {
            // Underruff
            return -30 - rank;
        }
        return 50 - rank;
    }

    // Discard: keep winners, shed from long suits
    let mut weight = 10 - rank + 2 * pos.length[seat][mv.suit] as i32;
    if pos.winner[mv.suit].rank == mv.rank {
        weight -= 30;
    }
    weight
}
