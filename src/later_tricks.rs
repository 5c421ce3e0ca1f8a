//! Tricks one side is bound to win later
//!
//! Both checks run at a trick start and look at who holds the top cards.
//! `later_tricks_min` runs when the maximizing side is on lead and can only
//! prove that the target is out of reach. `later_tricks_max` is its mirror
//! for a minimizing leader. In no trump, or once trumps are gone, a side
//! holding the top card of a suit the other side cannot cash around gets a
//! trick. In a trump game the rules look at the top three trumps.

use super::lookup::tables;
use super::position::{HighCard, Position};
use super::types::*;

/// Where the trumps that decide a position sit
struct TrumpTops {
    top: HighCard,
    second: Option<HighCard>,
    third: Option<HighCard>,
}

/// Maximizing side on lead: prove it falls short of the target.
pub fn later_tricks_min(
    pos: &mut Position,
    leader: Seat,
    depth: usize,
    target: i32,
    trump: usize,
    max_is_ns: bool,
) -> Option<bool> {
    let verdict = if no_trumps_left(pos, trump) {
        sure_loser_in_notrump(pos, depth, target, max_is_ns)
    } else {
        trump_trick_for_min(pos, leader, depth, target, trump, max_is_ns)
    };
    if verdict.is_some() {
        return verdict;
    }

    // The defenders' unbroken top trumps
    let (side_is_ns, tricks, wr) = top_trump_tricks(pos, trump)?;
    let remaining = ((depth >> 2) + 1) as i32;
    if side_is_ns != max_is_ns && pos.tricks_max + remaining - tricks < target {
        set_trump_ranks(pos, depth, trump, wr);
        Some(false)
    } else {
        None
    }
}

/// Minimizing side on lead: prove the maximizing side reaches the target.
pub fn later_tricks_max(
    pos: &mut Position,
    leader: Seat,
    depth: usize,
    target: i32,
    trump: usize,
    max_is_ns: bool,
) -> Option<bool> {
    let verdict = if no_trumps_left(pos, trump) {
        sure_winner_in_notrump(pos, depth, target, max_is_ns)
    } else {
        trump_trick_for_max(pos, leader, depth, target, trump, max_is_ns)
    };
    if verdict.is_some() {
        return verdict;
    }

    let (side_is_ns, tricks, wr) = top_trump_tricks(pos, trump)?;
    if side_is_ns == max_is_ns && pos.tricks_max + tricks >= target {
        set_trump_ranks(pos, depth, trump, wr);
        Some(true)
    } else {
        None
    }
}

fn no_trumps_left(pos: &Position, trump: usize) -> bool {
    trump >= NUM_SUITS || pos.winner[trump].is_none()
}

/// Summed lengths of the suits whose top card `side_is_ns` holds, counting
/// the longer hand of the pair in each.
fn cashing_length(pos: &Position, side_is_ns: bool) -> i32 {
    (0..NUM_SUITS)
        .filter(|&s| !pos.winner[s].is_none() && is_ns(pos.winner[s].seat) == side_is_ns)
        .map(|s| {
            let hh = pos.winner[s].seat;
            pos.length[hh][s].max(pos.length[partner(hh)][s]) as i32
        })
        .sum()
}

/// Pin the top card of every suit `side_is_ns` tops while other hands still
/// follow to it.
fn pin_top_cards(pos: &mut Position, depth: usize, side_is_ns: bool) {
    let mut wr = [0u16; NUM_SUITS];
    for (s, w) in wr.iter_mut().enumerate() {
        let top = pos.winner[s];
        if top.is_none() || is_ns(top.seat) != side_is_ns {
            continue;
        }
        let others = pos.aggr[s] & !pos.rank_in_suit[top.seat][s];
        if others != 0 {
            *w = bit_map_rank(top.rank);
        }
    }
    pos.win_ranks[depth] = wr;
}

fn set_trump_ranks(pos: &mut Position, depth: usize, trump: usize, wr: u16) {
    pos.win_ranks[depth] = [0; NUM_SUITS];
    pos.win_ranks[depth][trump] = wr;
}

/// The leader's side cannot cash around a suit topped by the defenders,
/// so it loses at least one trick.
fn sure_loser_in_notrump(pos: &mut Position, depth: usize, target: i32, max_is_ns: bool) -> Option<bool> {
    let sum = cashing_length(pos, max_is_ns);
    if sum == 0 || pos.tricks_max + sum >= target {
        return None;
    }
    if pos.tricks_max + (depth >> 2) as i32 >= target {
        return None;
    }
    pin_top_cards(pos, depth, !max_is_ns);
    Some(false)
}

fn sure_winner_in_notrump(pos: &mut Position, depth: usize, target: i32, max_is_ns: bool) -> Option<bool> {
    let sum = cashing_length(pos, !max_is_ns);
    if sum == 0 || pos.tricks_max + (depth >> 2) as i32 + 1 - sum < target {
        return None;
    }
    if pos.tricks_max + 1 < target {
        return None;
    }
    pin_top_cards(pos, depth, max_is_ns);
    Some(true)
}

fn trump_tops(pos: &Position, trump: usize) -> Option<TrumpTops> {
    let top = pos.winner[trump];
    if top.is_none() {
        return None;
    }
    let sb = pos.second_best[trump];
    let second = (!sb.is_none()).then_some(sb);

    let t = tables();
    let rest = pos.aggr[trump] & !bit_map_rank(top.rank) & !second.map_or(0, |c| bit_map_rank(c.rank));
    let third = if second.is_some() && rest != 0 {
        let rank = t.highest_rank(rest);
        pos.owner(trump, rank).map(|seat| HighCard { seat, rank })
    } else {
        None
    };
    Some(TrumpTops { top, second, third })
}

fn trump_trick_for_min(
    pos: &mut Position,
    leader: Seat,
    depth: usize,
    target: i32,
    trump: usize,
    max_is_ns: bool,
) -> Option<bool> {
    let tops = trump_tops(pos, trump)?;
    let is_max = |seat: Seat| is_ns(seat) == max_is_ns;
    let all_but_one = pos.tricks_max + (depth >> 2) as i32;

    if !is_max(tops.top.seat) {
        if pos.length[leader][trump] == 0 && pos.length[partner(leader)][trump] == 0 {
            // Every defending trump is a trick
            let longest = pos.length[left_hand_opp(leader)][trump].max(pos.length[right_hand_opp(leader)][trump]);
            if all_but_one + 1 - (longest as i32) < target {
                pos.win_ranks[depth] = [0; NUM_SUITS];
                return Some(false);
            }
            return None;
        }
        if all_but_one < target {
            set_trump_ranks(pos, depth, trump, bit_map_rank(tops.top.rank));
            return Some(false);
        }
        if all_but_one == target {
            // Top two trumps with the defenders, not bound to fall together
            let second = tops.second?;
            let hh = second.seat;
            if !is_max(hh) && (pos.length[hh][trump] > 1 || pos.length[partner(hh)][trump] > 1) {
                set_trump_ranks(pos, depth, trump, bit_map_rank(second.rank));
                return Some(false);
            }
        }
        return None;
    }

    // Declarer's side holds the top trump: a guarded second trump behind it,
    // or the second and third both with the defenders, still scores
    let second = tops.second?;
    let hh = second.seat;
    if is_max(hh) || pos.length[hh][trump] <= 1 {
        return None;
    }
    if tops.top.seat == right_hand_opp(hh) {
        if all_but_one < target {
            set_trump_ranks(pos, depth, trump, bit_map_rank(second.rank));
            return Some(false);
        }
        return None;
    }
    let third = tops.third?;
    if !is_max(third.seat) && all_but_one < target {
        set_trump_ranks(pos, depth, trump, bit_map_rank(third.rank));
        return Some(false);
    }
    None
}

fn trump_trick_for_max(
    pos: &mut Position,
    leader: Seat,
    depth: usize,
    target: i32,
    trump: usize,
    max_is_ns: bool,
) -> Option<bool> {
    let tops = trump_tops(pos, trump)?;
    let is_max = |seat: Seat| is_ns(seat) == max_is_ns;

    if is_max(tops.top.seat) {
        if pos.length[leader][trump] == 0 && pos.length[partner(leader)][trump] == 0 {
            let longest = pos.length[left_hand_opp(leader)][trump].max(pos.length[right_hand_opp(leader)][trump]);
            if pos.tricks_max + longest as i32 >= target {
                pos.win_ranks[depth] = [0; NUM_SUITS];
                return Some(true);
            }
            return None;
        }
        if pos.tricks_max + 1 >= target {
            set_trump_ranks(pos, depth, trump, bit_map_rank(tops.top.rank));
            return Some(true);
        }
        let second = tops.second?;
        let hh = second.seat;
        if is_max(hh)
            && (pos.length[hh][trump] > 1 || pos.length[partner(hh)][trump] > 1)
            && pos.tricks_max + 2 >= target
        {
            set_trump_ranks(pos, depth, trump, bit_map_rank(second.rank));
            return Some(true);
        }
        return None;
    }

    let second = tops.second?;
    let hh = second.seat;
    if !is_max(hh) || pos.length[hh][trump] <= 1 || pos.tricks_max + 1 < target {
        return None;
    }
    if tops.top.seat == right_hand_opp(hh) {
        set_trump_ranks(pos, depth, trump, bit_map_rank(second.rank));
        return Some(true);
    }
    let third = tops.third?;
    if is_max(third.seat) {
        set_trump_ranks(pos, depth, trump, bit_map_rank(third.rank));
        return Some(true);
    }
    None
}

/// Side holding the top trump (true = NS), the tricks its top-trump run
/// guarantees and the ranks of that run.
fn top_trump_tricks(pos: &Position, trump: usize) -> Option<(bool, i32, u16)> {
    if trump >= NUM_SUITS {
        return None;
    }
    let t = tables();
    let aggr = pos.aggr[trump];
    if aggr == 0 {
        return None;
    }

    let top = pos.winner[trump];
    if top.seat >= NUM_SEATS || top.rank == 0 {
        return None;
    }
    let side = [top.seat, partner(top.seat)];
    let side_cards = pos.rank_in_suit[side[0]][trump] | pos.rank_in_suit[side[1]][trump];

    let mut run_mask = 0u16;
    let mut rest = aggr;
    while rest != 0 {
        let bit = bit_map_rank(t.highest_rank(rest));
        if side_cards & bit == 0 {
            break;
        }
        run_mask |= bit;
        rest &= !bit;
    }

    let tricks = side
        .iter()
        .map(|&seat| t.count(pos.rank_in_suit[seat][trump] & run_mask) as i32)
        .max()
        .unwrap_or(0);
    if tricks == 0 {
        return None;
    }
    Some((is_ns(top.seat), tricks, run_mask))
}
