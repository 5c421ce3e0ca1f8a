//! Deals, requests and results at the solver boundary
//!
//! Holdings here use the external bit layout: rank `r` is bit `r`.

use std::fmt;

use super::cards::Holding;
use super::error::SolveError;
use super::hands::Hands;
use super::moves::Move;
use super::types::*;

/// A position to solve: remaining cards, trump, leader of the current
/// trick and up to three cards already played to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deal {
    /// 0..3 for a suit, 4 for no trump
    pub trump: usize,
    /// Leader of the current trick
    pub first: Seat,
    /// Cards played to the current trick in order; rank 0 ends the list
    pub current_trick_suit: [Suit; 3],
    pub current_trick_rank: [Rank; 3],
    /// `[seat][suit]`, bit `r` for rank `r`
    pub remain_cards: [[u32; NUM_SUITS]; NUM_SEATS],
}

impl Deal {
    /// Deal at the start of a trick
    pub fn new(hands: &Hands, trump: usize, first: Seat) -> Self {
        Deal {
            trump,
            first,
            current_trick_suit: [0; 3],
            current_trick_rank: [0; 3],
            remain_cards: hands.remain_cards(),
        }
    }

    /// Deal in the middle of a trick. `hands` must no longer hold the
    /// `played` cards, which are given in order from `first`.
    pub fn with_trick(hands: &Hands, trump: usize, first: Seat, played: &[(Suit, Rank)]) -> Self {
        let mut deal = Deal::new(hands, trump, first);
        for (i, &(suit, rank)) in played.iter().take(3).enumerate() {
            deal.current_trick_suit[i] = suit;
            deal.current_trick_rank[i] = rank;
        }
        deal
    }

    pub fn from_pbn(pbn: &str, trump: usize, first: Seat) -> Result<Self, SolveError> {
        let hands = Hands::from_pbn(pbn).ok_or_else(|| SolveError::Pbn(pbn.to_string()))?;
        Ok(Deal::new(&hands, trump, first))
    }

    /// Remaining cards as hands
    pub fn hands(&self) -> Hands {
        Hands::from_remain_cards(&self.remain_cards)
    }

    /// Cards played to the current trick
    pub fn played(&self) -> impl Iterator<Item = (Suit, Rank)> + '_ {
        self.current_trick_rank
            .iter()
            .zip(self.current_trick_suit.iter())
            .take_while(|(rank, _)| **rank != 0)
            .map(|(&rank, &suit)| (suit, rank))
    }
}

/// The cards returned by a solve and what each one scores
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FutureTricks {
    /// Trick-start nodes searched
    pub nodes: u64,
    pub cards: usize,
    pub suit: [Suit; TOTAL_TRICKS],
    pub rank: [Rank; TOTAL_TRICKS],
    /// Equivalent lower ranks, external layout
    pub equals: [u32; TOTAL_TRICKS],
    /// Tricks for the side to play, or -2 for an unsearched forced card
    pub score: [i32; TOTAL_TRICKS],
}

impl FutureTricks {
    pub(crate) fn push(&mut self, mv: &Move, score: i32) {
        if self.cards < TOTAL_TRICKS {
            let i = self.cards;
            self.suit[i] = mv.suit;
            self.rank[i] = mv.rank;
            self.equals[i] = (mv.sequence as u32) << 2;
            self.score[i] = score;
            self.cards += 1;
        }
    }

    pub fn scored_cards(&self) -> impl Iterator<Item = ScoredCard> + '_ {
        (0..self.cards).map(move |i| ScoredCard {
            suit: self.suit[i],
            rank: self.rank[i],
            equals: self.equals[i],
            score: self.score[i],
        })
    }

    /// Best score among the returned cards
    pub fn best_score(&self) -> Option<i32> {
        self.score[..self.cards].iter().copied().max()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoredCard {
    pub suit: Suit,
    pub rank: Rank,
    pub equals: u32,
    pub score: i32,
}

impl ScoredCard {
    /// Equivalent ranks as a holding
    pub fn equal_ranks(&self) -> Holding {
        Holding::from_external(self.equals)
    }
}

impl fmt::Display for ScoredCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", card_name(self.suit, self.rank))?;
        let equals = self.equal_ranks();
        if !equals.is_empty() {
            write!(f, "({})", equals)?;
        }
        write!(f, " {}", self.score)
    }
}

/// One request for a batch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Board {
    pub deal: Deal,
    pub target: i32,
    pub solutions: i32,
    pub mode: i32,
}

impl Board {
    pub fn new(deal: Deal, target: i32, solutions: i32, mode: i32) -> Self {
        Board {
            deal,
            target,
            solutions,
            mode,
        }
    }

    /// Maximum tricks with one optimal card
    pub fn best_card(deal: Deal) -> Self {
        Board::new(deal, -1, 1, 1)
    }
}

/// Strains in table order
pub const TABLE_STRAINS: [usize; NUM_STRAINS] = [NOTRUMP, SPADE, HEART, DIAMOND, CLUB];
/// Declarers in table order
pub const TABLE_DECLARERS: [Seat; NUM_SEATS] = [NORTH, SOUTH, EAST, WEST];

/// Tricks for every declarer in every strain
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DdTable {
    /// `[strain][declarer]` with strain 4 = no trump
    pub res_table: [[i32; NUM_SEATS]; NUM_STRAINS],
}

impl DdTable {
    pub fn tricks(&self, strain: usize, declarer: Seat) -> i32 {
        self.res_table[strain][declarer]
    }

    /// Compact form: declarers N S E W, strains NT S H D C, 10..13 as a..d
    pub fn to_ddt_string(&self) -> String {
        let mut s = String::with_capacity(20);
        for &declarer in &TABLE_DECLARERS {
            for &strain in &TABLE_STRAINS {
                let tricks = self.tricks(strain, declarer).clamp(0, 13) as u8;
                let ch = if tricks <= 9 {
                    (b'0' + tricks) as char
                } else {
                    (b'a' + (tricks - 10)) as char
                };
                s.push(ch);
            }
        }
        s
    }
}

fn strain_label(strain: usize) -> &'static str {
    match strain {
        SPADE => "S",
        HEART => "H",
        DIAMOND => "D",
        CLUB => "C",
        _ => "NT",
    }
}

impl fmt::Display for DdTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " ")?;
        for &strain in &TABLE_STRAINS {
            write!(f, " {:>2}", strain_label(strain))?;
        }
        writeln!(f)?;
        for &declarer in &TABLE_DECLARERS {
            write!(f, "{}", seat_letter(declarer))?;
            for &strain in &TABLE_STRAINS {
                write!(f, " {:>2}", self.tricks(strain, declarer))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
