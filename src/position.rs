//! Search position: remaining cards, suit winners and per-depth records

use super::lookup::tables;
use super::moves::Move;
use super::types::*;

/// A card identified by the seat holding it; rank 0 means no card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HighCard {
    pub seat: Seat,
    pub rank: Rank,
}

impl HighCard {
    #[inline]
    pub fn is_none(&self) -> bool {
        self.rank == 0
    }
}

/// Owner of every card of the deal at the start of a solve, `[suit][rank]`.
pub type HandLookup = [[u8; 15]; NUM_SUITS];

/// The mutable game state threaded through the search.
#[derive(Clone)]
pub struct Position {
    /// Remaining ranks per seat and suit
    pub rank_in_suit: [[u16; NUM_SUITS]; NUM_SEATS],
    /// Cached suit lengths
    pub length: [[u8; NUM_SUITS]; NUM_SEATS],
    /// All remaining ranks per suit
    pub aggr: [u16; NUM_SUITS],
    /// Packed lengths of the first three suits per seat
    pub hand_dist: [u32; NUM_SEATS],
    pub winner: [HighCard; NUM_SUITS],
    pub second_best: [HighCard; NUM_SUITS],
    /// Completed tricks won by the side to play at the root
    pub tricks_max: i32,
    /// Trick leader, recorded for each depth
    pub first: [Seat; MAX_DEPTH],
    /// Card played at each depth
    pub mv: [Move; MAX_DEPTH],
    /// Ranks per suit the result at each depth depends on
    pub win_ranks: [[u16; NUM_SUITS]; MAX_DEPTH],
    /// Card owners when the position was built
    pub hand_lookup: HandLookup,
}

impl Position {
    /// Build a position from internal 13-bit holdings with `first` on lead
    pub fn new(holdings: &[[u16; NUM_SUITS]; NUM_SEATS], first: Seat) -> Self {
        let mut pos = Position {
            rank_in_suit: [[0; NUM_SUITS]; NUM_SEATS],
            length: [[0; NUM_SUITS]; NUM_SEATS],
            aggr: [0; NUM_SUITS],
            hand_dist: [0; NUM_SEATS],
            winner: [HighCard::default(); NUM_SUITS],
            second_best: [HighCard::default(); NUM_SUITS],
            tricks_max: 0,
            first: [first; MAX_DEPTH],
            mv: [Move::default(); MAX_DEPTH],
            win_ranks: [[0; NUM_SUITS]; MAX_DEPTH],
            hand_lookup: [[0; 15]; NUM_SUITS],
        };

        for seat in 0..NUM_SEATS {
            for suit in 0..NUM_SUITS {
                let holding = holdings[seat][suit] & FULL_SUIT;
                pos.rank_in_suit[seat][suit] = holding;
                pos.length[seat][suit] = tables().count(holding) as u8;
                pos.aggr[suit] |= holding;
                for rank in TWO..=ACE {
                    if holding & bit_map_rank(rank) != 0 {
                        pos.hand_lookup[suit][rank] = seat as u8;
                    }
                }
            }
            pos.update_hand_dist(seat);
        }
        for suit in 0..NUM_SUITS {
            pos.update_winners(suit);
        }
        pos
    }

    #[inline]
    fn update_hand_dist(&mut self, seat: Seat) {
        let len = &self.length[seat];
        self.hand_dist[seat] =
            ((len[SPADE] as u32) << 8) | ((len[HEART] as u32) << 4) | len[DIAMOND] as u32;
    }

    /// Seat holding `rank` of `suit`, if any
    pub fn owner(&self, suit: Suit, rank: Rank) -> Option<Seat> {
        let bit = bit_map_rank(rank);
        (0..NUM_SEATS).find(|&seat| self.rank_in_suit[seat][suit] & bit != 0)
    }

    /// Recompute the two highest remaining cards of a suit
    pub fn update_winners(&mut self, suit: Suit) {
        let t = tables();
        let aggr = self.aggr[suit];
        let top = t.highest_rank(aggr);
        self.winner[suit] = HighCard {
            seat: self.owner(suit, top).unwrap_or(NORTH),
            rank: top,
        };
        let rest = aggr & !bit_map_rank(top);
        let second = t.highest_rank(rest);
        self.second_best[suit] = HighCard {
            seat: self.owner(suit, second).unwrap_or(NORTH),
            rank: second,
        };
    }

    /// Remove a card from a hand
    pub fn play(&mut self, seat: Seat, suit: Suit, rank: Rank) {
        let bit = bit_map_rank(rank);
        self.rank_in_suit[seat][suit] &= !bit;
        self.aggr[suit] &= !bit;
        self.length[seat][suit] = self.length[seat][suit].saturating_sub(1);
        self.update_hand_dist(seat);
        self.update_winners(suit);
    }

    /// Return a card to a hand
    pub fn unplay(&mut self, seat: Seat, suit: Suit, rank: Rank) {
        let bit = bit_map_rank(rank);
        self.rank_in_suit[seat][suit] |= bit;
        self.aggr[suit] |= bit;
        self.length[seat][suit] += 1;
        self.update_hand_dist(seat);
        self.update_winners(suit);
    }

    /// Cards left in one hand
    pub fn cards_left(&self, seat: Seat) -> usize {
        self.length[seat].iter().map(|&l| l as usize).sum()
    }

    /// Cards left in all hands
    pub fn total_cards(&self) -> usize {
        (0..NUM_SEATS).map(|seat| self.cards_left(seat)).sum()
    }
}
