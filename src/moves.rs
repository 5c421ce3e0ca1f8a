//! Move generation, ordering and per-trick bookkeeping
//!
//! Each (trick, relative hand) pair owns a small move list. Touching ranks
//! collapse into one representative move, and two runs separated only by
//! ranks already played before the trick started collapse too.

use super::heuristic::{follow_weight, lead_weight, KILLER_BONUS, TABLE_BONUS};
use super::lookup::tables;
use super::position::Position;
use super::types::*;

/// Longest possible move list: one per card of a 13-card hand
pub const MAX_MOVES: usize = 13;

/// Number of trick slots (trick 12 is the first trick of a full deal)
pub const TRICK_SLOTS: usize = 13;

/// A representative card and the equivalent ranks it stands for
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Move {
    pub suit: Suit,
    pub rank: Rank,
    /// Other ranks equivalent to this card
    pub sequence: u16,
    pub weight: i32,
}

impl Move {
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Move {
            suit,
            rank,
            sequence: 0,
            weight: 0,
        }
    }

    /// Same suit and representative rank
    #[inline]
    pub fn same_card(&self, other: &Move) -> bool {
        self.suit == other.suit && self.rank == other.rank
    }

    /// Whether this move stands for the given card
    #[inline]
    pub fn covers(&self, suit: Suit, rank: Rank) -> bool {
        self.suit == suit && (self.rank == rank || self.sequence & bit_map_rank(rank) != 0)
    }
}

/// State of the trick being played at one trick slot
#[derive(Clone, Copy, Debug, Default)]
pub struct TrickTrack {
    pub lead_seat: Seat,
    pub lead_suit: Suit,
    /// Ranks gone before this trick started
    pub removed_ranks: [u16; NUM_SUITS],
    /// Best card of the trick after each relative hand has played
    pub winning: [Move; NUM_SEATS],
    /// Relative hand holding `winning`
    pub high: [usize; NUM_SEATS],
    pub played: [Move; NUM_SEATS],
}

impl TrickTrack {
    /// Seat winning the trick after `rel` has played
    #[inline]
    pub fn winning_seat(&self, rel: usize) -> Seat {
        hand_id(self.lead_seat, self.high[rel])
    }

    /// Whether more than one card of the winning suit was played
    pub fn winner_contested(&self) -> bool {
        let suit = self.winning[3].suit;
        self.played.iter().filter(|m| m.suit == suit).count() > 1
    }
}

#[derive(Clone, Copy, Default)]
struct MoveList {
    moves: [Move; MAX_MOVES],
    len: usize,
    current: usize,
    lowest_win: [Rank; NUM_SUITS],
}

impl MoveList {
    fn clear(&mut self) {
        self.len = 0;
        self.current = 0;
        self.lowest_win = [0; NUM_SUITS];
    }

    fn push(&mut self, mv: Move) {
        if self.len < MAX_MOVES {
            self.moves[self.len] = mv;
            self.len += 1;
        }
    }
}

/// Move lists and trick tracks for one search
pub struct MoveGen {
    lists: [[MoveList; NUM_SEATS]; TRICK_SLOTS],
    track: [TrickTrack; TRICK_SLOTS],
    trump: usize,
    pub generated: u64,
}

impl Default for MoveGen {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveGen {
    pub fn new() -> Self {
        MoveGen {
            lists: [[MoveList::default(); NUM_SEATS]; TRICK_SLOTS],
            track: [TrickTrack::default(); TRICK_SLOTS],
            trump: NOTRUMP,
            generated: 0,
        }
    }

    /// Prepare the trick a solve starts in
    pub fn init(&mut self, trick: usize, lead_seat: Seat, aggr: &[u16; NUM_SUITS], trump: usize) {
        self.trump = trump;
        let mut removed = [0u16; NUM_SUITS];
        for suit in 0..NUM_SUITS {
            removed[suit] = FULL_SUIT & !aggr[suit];
        }
        self.track[trick] = TrickTrack {
            lead_seat,
            removed_ranks: removed,
            ..TrickTrack::default()
        };
        for list in self.lists.iter_mut().flatten() {
            list.clear();
        }
    }

    #[inline]
    pub fn track(&self, trick: usize) -> &TrickTrack {
        &self.track[trick]
    }

    /// Generate the leads for the hand on lead in `trick`.
    /// `best` and `best_tt` are ordering hints; pass a default move for none.
    pub fn move_gen0(&mut self, trick: usize, pos: &Position, best: &Move, best_tt: &Move) -> usize {
        let seat = self.track[trick].lead_seat;
        let removed = self.track[trick].removed_ranks;
        let trump = self.trump;
        let list = &mut self.lists[trick][0];
        list.clear();

        for suit in 0..NUM_SUITS {
            push_groups(list, suit, pos.rank_in_suit[seat][suit], removed[suit]);
        }

        for mv in list.moves[..list.len].iter_mut() {
            let mut weight = lead_weight(pos, seat, mv, trump);
            if best.rank != 0 && mv.covers(best.suit, best.rank) {
                weight += KILLER_BONUS;
            } else if best_tt.rank != 0 && mv.covers(best_tt.suit, best_tt.rank) {
                weight += TABLE_BONUS;
            }
            mv.weight = weight;
        }
        sort_moves(&mut list.moves[..list.len]);
        self.generated += list.len as u64;
        list.len
    }

    /// Generate the cards for the hand `rel` positions after the leader
    pub fn move_gen123(&mut self, trick: usize, rel: usize, pos: &Position) -> usize {
        let track = self.track[trick];
        let seat = hand_id(track.lead_seat, rel);
        let trump = self.trump;
        let list = &mut self.lists[trick][rel];
        list.clear();

        let lead_suit = track.lead_suit;
        if pos.rank_in_suit[seat][lead_suit] != 0 {
            push_groups(
                list,
                lead_suit,
                pos.rank_in_suit[seat][lead_suit],
                track.removed_ranks[lead_suit],
            );
        } else {
            for suit in 0..NUM_SUITS {
                push_groups(list, suit, pos.rank_in_suit[seat][suit], track.removed_ranks[suit]);
            }
        }

        for mv in list.moves[..list.len].iter_mut() {
            mv.weight = follow_weight(pos, seat, rel, &track, mv, trump);
        }
        sort_moves(&mut list.moves[..list.len]);
        self.generated += list.len as u64;
        list.len
    }

    /// Next move to search, skipping moves that are equivalent to an
    /// earlier losing move. `prev_wr` holds the ranks the previous move's
    /// result depended on; pass `None` when the previous move was not searched.
    pub fn make_next(
        &mut self,
        trick: usize,
        rel: usize,
        prev_wr: Option<&[u16; NUM_SUITS]>,
    ) -> Option<Move> {
        let list = &mut self.lists[trick][rel];
        if let Some(wr) = prev_wr {
            if list.current > 0 {
                let prev = list.moves[list.current - 1];
                let low = match tables().lowest_rank(wr[prev.suit]) {
                    0 => ACE + 1,
                    r => r,
                };
                if prev.rank < low {
                    list.lowest_win[prev.suit] = low;
                }
            }
        }

        while list.current < list.len {
            let mv = list.moves[list.current];
            list.current += 1;
            if mv.rank >= list.lowest_win[mv.suit] {
                self.record(trick, rel, mv);
                return Some(mv);
            }
        }
        None
    }

    /// Next move in list order with no skipping and no trick bookkeeping
    pub fn make_next_simple(&mut self, trick: usize, rel: usize) -> Option<Move> {
        let list = &mut self.lists[trick][rel];
        if list.current < list.len {
            let mv = list.moves[list.current];
            list.current += 1;
            Some(mv)
        } else {
            None
        }
    }

    /// Play a chosen card outside of iteration
    pub fn make_specific(&mut self, mv: Move, trick: usize, rel: usize) {
        self.record(trick, rel, mv);
    }

    /// Restart iteration of a list
    pub fn rewind(&mut self, trick: usize, rel: usize) {
        let list = &mut self.lists[trick][rel];
        list.current = 0;
        list.lowest_win = [0; NUM_SUITS];
    }

    pub fn get_length(&self, trick: usize, rel: usize) -> usize {
        self.lists[trick][rel].len
    }

    /// The ordered list last generated for (trick, rel)
    pub fn moves(&self, trick: usize, rel: usize) -> &[Move] {
        let list = &self.lists[trick][rel];
        &list.moves[..list.len]
    }

    fn record(&mut self, trick: usize, rel: usize, mv: Move) {
        let trump = self.trump;
        let t = &mut self.track[trick];
        t.played[rel] = mv;
        if rel == 0 {
            t.lead_suit = mv.suit;
            t.winning[0] = mv;
            t.high[0] = 0;
        } else {
            let best = t.winning[rel - 1];
            let beats = if mv.suit == best.suit {
                mv.rank > best.rank
            } else {
                mv.suit == trump
            };
            if beats {
                t.winning[rel] = mv;
                t.high[rel] = rel;
            } else {
                t.winning[rel] = best;
                t.high[rel] = t.high[rel - 1];
            }
        }

        if rel == 3 && trick > 0 {
            let winner = t.winning_seat(3);
            let mut removed = t.removed_ranks;
            for played in &t.played {
                removed[played.suit] |= bit_map_rank(played.rank);
            }
            self.track[trick - 1] = TrickTrack {
                lead_seat: winner,
                removed_ranks: removed,
                ..TrickTrack::default()
            };
        }
    }
}

/// Emit one move per run of a holding, merging runs whose gap is fully played
fn push_groups(list: &mut MoveList, suit: Suit, holding: u16, removed: u16) {
    if holding == 0 {
        return;
    }
    let groups = tables().groups(holding);
    let mut g = groups.len;
    while g > 0 {
        g -= 1;
        let rank = groups.rank[g];
        let mut sequence = groups.sequence[g];
        while g >= 1 && groups.gap[g] & removed == groups.gap[g] {
            g -= 1;
            sequence |= groups.fullseq[g];
        }
        list.push(Move {
            suit,
            rank,
            sequence,
            weight: 0,
        });
    }
}

/// Optimal comparator networks for 2..=12 elements
const NETWORKS: [&[(u8, u8)]; 13] = [
    &[],
    &[],
    &[(0, 1)],
    &[(0, 1), (0, 2), (1, 2)],
    &[(0, 1), (2, 3), (0, 2), (1, 3), (1, 2)],
    &[(0, 1), (2, 3), (0, 2), (1, 3), (1, 2), (0, 4), (2, 4), (1, 2), (3, 4)],
    &[
        (0, 1), (2, 3), (4, 5), (0, 2), (1, 3), (1, 2), (0, 4), (1, 5), (2, 4), (3, 5), (1, 2),
        (3, 4),
    ],
    &[
        (0, 1), (2, 3), (4, 5), (0, 2), (4, 6), (1, 3), (1, 2), (5, 6), (0, 4), (1, 5), (2, 6),
        (2, 4), (3, 5), (1, 2), (3, 4), (5, 6),
    ],
    &[
        (0, 1), (2, 3), (4, 5), (6, 7), (0, 2), (4, 6), (1, 3), (5, 7), (1, 2), (5, 6), (0, 4),
        (1, 5), (2, 6), (3, 7), (2, 4), (3, 5), (1, 2), (3, 4), (5, 6),
    ],
    &[
        (0, 1), (3, 4), (6, 7), (1, 2), (4, 5), (7, 8), (0, 1), (3, 4), (6, 7), (0, 3), (3, 6),
        (0, 3), (1, 4), (4, 7), (1, 4), (2, 5), (5, 8), (2, 5), (1, 3), (5, 7), (2, 6), (4, 6),
        (2, 4), (2, 3), (5, 6),
    ],
    &[
        (1, 8), (0, 4), (5, 9), (2, 6), (3, 7), (0, 3), (6, 9), (2, 5), (0, 1), (3, 6), (8, 9),
        (4, 7), (0, 2), (4, 8), (1, 5), (7, 9), (1, 2), (3, 4), (5, 6), (7, 8), (1, 3), (6, 8),
        (2, 4), (5, 7), (2, 3), (6, 7), (3, 5), (4, 6), (4, 5),
    ],
    &[
        (0, 1), (2, 3), (4, 5), (6, 7), (8, 9), (1, 3), (5, 7), (0, 2), (4, 6), (8, 10), (1, 2),
        (5, 6), (9, 10), (1, 5), (6, 10), (5, 9), (2, 6), (1, 5), (6, 10), (0, 4), (3, 7), (4, 8),
        (0, 4), (1, 4), (7, 10), (3, 8), (2, 3), (8, 9), (2, 4), (7, 9), (3, 5), (6, 8), (3, 4),
        (5, 6), (7, 8),
    ],
    &[
        (0, 1), (2, 3), (4, 5), (6, 7), (8, 9), (10, 11), (1, 3), (5, 7), (9, 11), (0, 2), (4, 6),
        (8, 10), (1, 2), (5, 6), (9, 10), (1, 5), (6, 10), (5, 9), (2, 6), (1, 5), (6, 10),
        (0, 4), (7, 11), (3, 7), (4, 8), (0, 4), (7, 11), (1, 4), (7, 10), (3, 8), (2, 3), (8, 9),
        (2, 4), (7, 9), (3, 5), (6, 8), (3, 4), (5, 6), (7, 8),
    ],
];

/// Sort descending by weight; equal weights keep generation order
pub fn sort_moves(moves: &mut [Move]) {
    let n = moves.len();
    let mut keys = [0i64; MAX_MOVES];
    for (i, mv) in moves.iter().enumerate() {
        keys[i] = (mv.weight as i64) * 16 - i as i64;
    }

    if n < NETWORKS.len() {
        for &(a, b) in NETWORKS[n] {
            let (a, b) = (a as usize, b as usize);
            if keys[a] < keys[b] {
                keys.swap(a, b);
                moves.swap(a, b);
            }
        }
    } else {
        for i in 1..n {
            let mut j = i;
            while j > 0 && keys[j - 1] < keys[j] {
                keys.swap(j - 1, j);
                moves.swap(j - 1, j);
                j -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(ranks: &[Rank]) -> u16 {
        ranks.iter().fold(0, |acc, &r| acc | bit_map_rank(r))
    }

    fn weighted(weights: &[i32]) -> Vec<Move> {
        weights
            .iter()
            .enumerate()
            .map(|(i, &w)| Move {
                suit: i % NUM_SUITS,
                rank: TWO + i,
                sequence: 0,
                weight: w,
            })
            .collect()
    }

    #[test]
    fn test_networks_sort_every_zero_one_input() {
        for n in 2..NETWORKS.len() {
            for bits in 0u32..(1 << n) {
                let weights: Vec<i32> = (0..n).map(|i| ((bits >> i) & 1) as i32).collect();
                let mut moves = weighted(&weights);
                sort_moves(&mut moves);
                for w in moves.windows(2) {
                    assert!(w[0].weight >= w[1].weight, "n={} bits={:b}", n, bits);
                }
            }
        }
    }

    #[test]
    fn test_sort_ties_keep_generation_order() {
        let mut moves = weighted(&[5, 9, 5, 1, 9, 5, 5, 0, 5, 5, 3, 5, 5]);
        let original = moves.clone();
        sort_moves(&mut moves);
        let order: Vec<usize> = moves
            .iter()
            .map(|m| original.iter().position(|o| o == m).unwrap())
            .collect();
        assert_eq!(order, vec![1, 4, 0, 2, 5, 6, 8, 9, 11, 12, 10, 3, 7]);
    }

    #[test]
    fn test_lead_collapses_sequences() {
        let mut holdings = [[0u16; NUM_SUITS]; NUM_SEATS];
        holdings[NORTH][SPADE] = mask(&[ACE, KING, QUEEN, NINE, EIGHT, FIVE]);
        holdings[EAST][SPADE] = mask(&[JACK, TEN, SEVEN, SIX]);
        holdings[SOUTH][HEART] = mask(&[ACE]);
        let pos = Position::new(&holdings, NORTH);

        let mut gen = MoveGen::new();
        gen.init(3, NORTH, &pos.aggr, NOTRUMP);
        let count = gen.move_gen0(3, &pos, &Move::default(), &Move::default());
        assert_eq!(count, 3);
        let top = gen.moves(3, 0).iter().find(|m| m.rank == ACE).unwrap();
        assert_eq!(top.sequence, mask(&[KING, QUEEN]));
    }

    #[test]
    fn test_lead_merges_across_played_gap() {
        // Jack and ten already played: AKQ and 98 are one class
        let mut holdings = [[0u16; NUM_SUITS]; NUM_SEATS];
        holdings[NORTH][SPADE] = mask(&[ACE, KING, QUEEN, NINE, EIGHT]);
        holdings[EAST][SPADE] = mask(&[SEVEN, SIX]);
        holdings[SOUTH][SPADE] = mask(&[FIVE, FOUR]);
        holdings[WEST][SPADE] = mask(&[THREE, TWO]);
        holdings[EAST][HEART] = mask(&[ACE, KING, QUEEN]);
        holdings[SOUTH][HEART] = mask(&[JACK, TEN, NINE]);
        holdings[WEST][HEART] = mask(&[EIGHT, SEVEN, SIX]);
        let pos = Position::new(&holdings, NORTH);

        let mut gen = MoveGen::new();
        gen.init(4, NORTH, &pos.aggr, NOTRUMP);
        assert_eq!(gen.move_gen0(4, &pos, &Move::default(), &Move::default()), 1);
        let mv = gen.moves(4, 0)[0];
        assert_eq!(mv.rank, ACE);
        assert_eq!(mv.sequence, mask(&[KING, QUEEN, NINE, EIGHT]));
    }

    #[test]
    fn test_follow_must_follow_suit() {
        let mut holdings = [[0u16; NUM_SUITS]; NUM_SEATS];
        holdings[NORTH][SPADE] = mask(&[ACE, FIVE]);
        holdings[EAST][SPADE] = mask(&[KING]);
        holdings[EAST][HEART] = mask(&[ACE]);
        holdings[SOUTH][HEART] = mask(&[KING, TWO]);
        holdings[WEST][HEART] = mask(&[QUEEN]);
        holdings[WEST][CLUB] = mask(&[ACE]);
        let mut pos = Position::new(&holdings, NORTH);

        let mut gen = MoveGen::new();
        gen.init(1, NORTH, &pos.aggr, NOTRUMP);
        gen.move_gen0(1, &pos, &Move::default(), &Move::default());
        gen.make_specific(Move::new(SPADE, FIVE), 1, 0);
        pos.play(NORTH, SPADE, FIVE);

        assert_eq!(gen.move_gen123(1, 1, &pos), 1);
        assert_eq!(gen.moves(1, 1)[0].suit, SPADE);

        gen.make_specific(Move::new(SPADE, KING), 1, 1);
        pos.play(EAST, SPADE, KING);
        // South is void in spades and may play anything
        assert_eq!(gen.move_gen123(1, 2, &pos), 2);
    }

    #[test]
    fn test_trick_winner_and_next_leader() {
        let mut gen = MoveGen::new();
        let aggr = [FULL_SUIT; NUM_SUITS];
        gen.init(5, NORTH, &aggr, HEART);
        gen.make_specific(Move::new(SPADE, KING), 5, 0);
        gen.make_specific(Move::new(SPADE, ACE), 5, 1);
        gen.make_specific(Move::new(HEART, TWO), 5, 2);
        gen.make_specific(Move::new(SPADE, THREE), 5, 3);

        let track = gen.track(5);
        assert_eq!(track.winning_seat(3), SOUTH);
        assert!(!track.winner_contested());
        assert_eq!(gen.track(4).lead_seat, SOUTH);
        assert_eq!(
            gen.track(4).removed_ranks[SPADE],
            mask(&[ACE, KING, THREE])
        );
    }

    #[test]
    fn test_make_next_skips_equivalent_losers() {
        let mut holdings = [[0u16; NUM_SUITS]; NUM_SEATS];
        holdings[NORTH][SPADE] = mask(&[NINE, SIX, THREE]);
        holdings[EAST][SPADE] = mask(&[ACE, KING, QUEEN]);
        holdings[WEST][SPADE] = mask(&[EIGHT, FIVE, FOUR]);
        let pos = Position::new(&holdings, NORTH);

        let mut gen = MoveGen::new();
        gen.init(2, NORTH, &pos.aggr, NOTRUMP);
        assert_eq!(gen.move_gen0(2, &pos, &Move::default(), &Move::default()), 3);

        let first = gen.make_next(2, 0, None).unwrap();
        // The first try depended only on the queen and above
        let wr = [mask(&[ACE, KING, QUEEN]), 0, 0, 0];
        assert!(first.rank < QUEEN);
        assert_eq!(gen.make_next(2, 0, Some(&wr)), None);

        gen.rewind(2, 0);
        let mut simple = 0;
        while gen.make_next_simple(2, 0).is_some() {
            simple += 1;
        }
        assert_eq!(simple, 3);
    }
}
