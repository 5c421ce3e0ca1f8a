//! Tricks the side on lead can cash at once
//!
//! Counts the top cards the leader can run without giving up the lead and
//! compares the total with the target. Only sure tricks are counted, so a
//! verdict is never wrong; a `None` just means the check could not decide.

use super::lookup::tables;
use super::position::Position;
use super::types::*;

/// Decide the node from the leader's cashable winners.
///
/// `leader_is_max` tells which side the leader is on. On a verdict the
/// ranks it relied on are written to `pos.win_ranks[depth]`.
pub fn quick_tricks(
    pos: &mut Position,
    leader: Seat,
    depth: usize,
    target: i32,
    trump: usize,
    leader_is_max: bool,
) -> Option<bool> {
    if leader >= NUM_SEATS {
        return None;
    }
    let remaining = ((depth >> 2) + 1) as i32;
    let (tricks, wr) = count_quick_tricks(pos, leader, trump);
    if tricks == 0 {
        return None;
    }

    let verdict = if leader_is_max {
        (pos.tricks_max + tricks >= target).then_some(true)
    } else {
        (pos.tricks_max + remaining - tricks < target).then_some(false)
    };
    if verdict.is_some() {
        pos.win_ranks[depth] = wr;
    }
    verdict
}

/// Sure tricks for the leader's side and the ranks they depend on
pub fn count_quick_tricks(pos: &Position, leader: Seat, trump: usize) -> (i32, [u16; NUM_SUITS]) {
    let t = tables();
    let pard = partner(leader);
    let opps = [left_hand_opp(leader), right_hand_opp(leader)];
    let trump_game = trump < NUM_SUITS;
    let opp_trumps = trump_game && opps.iter().any(|&o| pos.length[o][trump] > 0);

    let mut wr = [0u16; NUM_SUITS];
    let mut side_tricks = 0i32;
    let mut trump_tricks = 0i32;

    for suit in 0..NUM_SUITS {
        let len = pos.length[leader][suit] as i32;
        if len == 0 {
            continue;
        }

        // Top cards of the suit held by the leader
        let aggr = pos.aggr[suit];
        let own = pos.rank_in_suit[leader][suit];
        let mut run = 0i32;
        let mut rest = aggr;
        while rest != 0 {
            let top = bit_map_rank(t.highest_rank(rest));
            if own & top == 0 {
                break;
            }
            run += 1;
            rest &= !top;
        }
        if run == 0 {
            continue;
        }

        let ruffable = trump_game && suit != trump && opp_trumps;
        let mut sure = run;
        if ruffable {
            // Stop before an opponent with trumps runs out of the suit
            for &o in &opps {
                if pos.length[o][trump] > 0 {
                    sure = sure.min(pos.length[o][suit] as i32);
                }
            }
        } else {
            let longest_opp = opps.iter().map(|&o| pos.length[o][suit] as i32).max().unwrap_or(0);
            if run >= longest_opp && run >= pos.length[pard][suit] as i32 {
                // Nobody else is left in the suit
                sure = len;
            }
        }

        if sure > 0 {
            wr[suit] = t.win_ranks(aggr, run as usize);
            if trump_game && suit == trump {
                trump_tricks += sure;
            } else {
                side_tricks += sure;
            }
        }
    }

    if trump_game && pos.length[pard][trump] > 0 {
        // Partner is only forced to ruff once out of other cards
        let pard_others: i32 = (0..NUM_SUITS)
            .filter(|&s| s != trump)
            .map(|s| pos.length[pard][s] as i32)
            .sum();
        side_tricks = side_tricks.min(pard_others);
    }

    (side_tricks + trump_tricks, wr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(ranks: &[Rank]) -> u16 {
        ranks.iter().fold(0, |acc, &r| acc | bit_map_rank(r))
    }

    #[test]
    fn test_notrump_long_suit_runs() {
        let mut holdings = [[0u16; NUM_SUITS]; NUM_SEATS];
        holdings[NORTH][SPADE] = mask(&[ACE, KING, FIVE, FOUR]);
        holdings[EAST][HEART] = mask(&[ACE, KING, QUEEN, JACK]);
        holdings[SOUTH][CLUB] = mask(&[ACE, KING, QUEEN, JACK]);
        holdings[WEST][SPADE] = mask(&[QUEEN, TWO]);
        holdings[WEST][DIAMOND] = mask(&[THREE, TWO]);
        let pos = Position::new(&holdings, NORTH);

        let (tricks, wr) = count_quick_tricks(&pos, NORTH, NOTRUMP);
        assert_eq!(tricks, 4);
        assert_eq!(wr[SPADE], mask(&[ACE, KING]));
    }

    #[test]
    fn test_trump_cap_by_ruffing_opponent() {
        let mut holdings = [[0u16; NUM_SUITS]; NUM_SEATS];
        holdings[NORTH][SPADE] = mask(&[ACE, KING, QUEEN]);
        holdings[EAST][SPADE] = mask(&[TWO]);
        holdings[EAST][HEART] = mask(&[TWO, THREE]);
        holdings[SOUTH][DIAMOND] = mask(&[TWO, THREE, FOUR]);
        holdings[WEST][CLUB] = mask(&[TWO, THREE, FOUR]);
        let pos = Position::new(&holdings, NORTH);

        // East ruffs the second spade in hearts
        let (tricks, _) = count_quick_tricks(&pos, NORTH, HEART);
        assert_eq!(tricks, 1);
        let (tricks, _) = count_quick_tricks(&pos, NORTH, NOTRUMP);
        assert_eq!(tricks, 3);
    }

    #[test]
    fn test_verdicts_for_both_sides() {
        let mut holdings = [[0u16; NUM_SUITS]; NUM_SEATS];
        holdings[NORTH][SPADE] = mask(&[ACE, KING]);
        holdings[EAST][SPADE] = mask(&[FOUR, THREE]);
        holdings[SOUTH][HEART] = mask(&[TWO, THREE]);
        holdings[WEST][CLUB] = mask(&[TWO, THREE]);
        let mut pos = Position::new(&holdings, NORTH);

        // depth 4: two tricks remain
        assert_eq!(quick_tricks(&mut pos, NORTH, 4, 2, NOTRUMP, true), Some(true));
        assert_eq!(pos.win_ranks[4][SPADE], mask(&[ACE, KING]));
        // Leader on the minimizing side: max side can get at most 0
        assert_eq!(quick_tricks(&mut pos, NORTH, 4, 1, NOTRUMP, false), Some(false));
        // Nothing to cash for East
        assert_eq!(quick_tricks(&mut pos, EAST, 4, 1, NOTRUMP, true), None);
    }
}
