//! Four hands representation - allocation-free
//!
//! A fixed 4x4 array of suit holdings indexed `[seat][suit]`.

use super::cards::*;
use super::types::*;

/// Four hands, one per seat - no heap allocation
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Hands {
    hands: [[Holding; NUM_SUITS]; NUM_SEATS],
}

impl Hands {
    /// Create empty hands
    #[inline]
    pub const fn new() -> Self {
        Hands {
            hands: [[Holding::new(); NUM_SUITS]; NUM_SEATS],
        }
    }

    /// Holding of one seat in one suit
    #[inline]
    pub fn holding(&self, seat: Seat, suit: Suit) -> Holding {
        self.hands[seat][suit]
    }

    /// Mutable holding of one seat in one suit
    #[inline]
    pub fn holding_mut(&mut self, seat: Seat, suit: Suit) -> &mut Holding {
        &mut self.hands[seat][suit]
    }

    /// Number of cards a seat holds
    #[inline]
    pub fn num_cards(&self, seat: Seat) -> usize {
        self.hands[seat].iter().map(Holding::size).sum()
    }

    /// Number of cards across all hands
    pub fn total_cards(&self) -> usize {
        (0..NUM_SEATS).map(|seat| self.num_cards(seat)).sum()
    }

    /// Number of tricks (cards per hand, taken from West)
    #[inline]
    pub fn num_tricks(&self) -> usize {
        self.num_cards(WEST)
    }

    /// Remaining cards of a suit across all hands
    pub fn suit_cards(&self, suit: Suit) -> Holding {
        (0..NUM_SEATS).fold(Holding::new(), |acc, seat| acc.union(self.hands[seat][suit]))
    }

    /// Holdings in the external bit layout (rank r at bit r)
    pub fn remain_cards(&self) -> [[u32; NUM_SUITS]; NUM_SEATS] {
        let mut cards = [[0u32; NUM_SUITS]; NUM_SEATS];
        for seat in 0..NUM_SEATS {
            for suit in 0..NUM_SUITS {
                cards[seat][suit] = self.hands[seat][suit].to_external();
            }
        }
        cards
    }

    /// Build from holdings in the external bit layout
    pub fn from_remain_cards(cards: &[[u32; NUM_SUITS]; NUM_SEATS]) -> Self {
        let mut hands = Hands::new();
        for seat in 0..NUM_SEATS {
            for suit in 0..NUM_SUITS {
                hands.hands[seat][suit] = Holding::from_external(cards[seat][suit]);
            }
        }
        hands
    }

    /// Exchange two suits in every hand
    pub fn swap_suits(&self, a: Suit, b: Suit) -> Hands {
        let mut hands = *self;
        for seat in 0..NUM_SEATS {
            hands.hands[seat].swap(a, b);
        }
        hands
    }

    /// Parse from PBN-style deal string
    /// Format: "N:AKQT3.J6.KJ42.95 652.AK42.AQ87.T4 J74.QT95.T.AK863 98.873.9653.QJ72"
    /// Order after first seat: rotates clockwise (N E S W or W N E S, etc.)
    pub fn from_pbn(s: &str) -> Option<Self> {
        let mut hands = Hands::new();
        let s = s.trim();

        let (start_seat, rest) = if s.len() >= 2 && s.chars().nth(1) == Some(':') {
            let seat_char = s.chars().next()?;
            (char_to_seat(seat_char)?, &s[2..])
        } else {
            (NORTH, s)
        };

        let hand_strs: Vec<&str> = rest.split_whitespace().collect();
        if hand_strs.len() != NUM_SEATS {
            return None;
        }

        for (i, hand_str) in hand_strs.iter().enumerate() {
            let seat = hand_id(start_seat, i);
            hands.hands[seat] = parse_hand(hand_str)?;
        }

        Some(hands)
    }

    /// Write as a PBN deal string starting from `first`
    pub fn to_pbn(&self, first: Seat) -> String {
        let mut out = String::new();
        out.push(seat_letter(first));
        out.push(':');
        for i in 0..NUM_SEATS {
            if i > 0 {
                out.push(' ');
            }
            let seat = hand_id(first, i);
            let suits: Vec<String> = self.hands[seat].iter().map(Holding::to_string).collect();
            out.push_str(&suits.join("."));
        }
        out
    }
}

impl std::ops::Index<Seat> for Hands {
    type Output = [Holding; NUM_SUITS];

    #[inline]
    fn index(&self, seat: Seat) -> &Self::Output {
        &self.hands[seat]
    }
}

impl std::ops::IndexMut<Seat> for Hands {
    #[inline]
    fn index_mut(&mut self, seat: Seat) -> &mut Self::Output {
        &mut self.hands[seat]
    }
}

impl std::fmt::Debug for Hands {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hands({})", self.to_pbn(NORTH))
    }
}

impl std::fmt::Display for Hands {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let line = |seat: Seat| -> String {
            (0..NUM_SUITS)
                .map(|suit| {
                    let holding = self.hands[seat][suit];
                    if holding.is_empty() {
                        format!("{} -", suit_letter(suit))
                    } else {
                        format!("{} {}", suit_letter(suit), holding)
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        };
        writeln!(f, "        {}", line(NORTH))?;
        writeln!(f, "{}        {}", line(WEST), line(EAST))?;
        writeln!(f, "        {}", line(SOUTH))
    }
}

/// Parse a single hand from PBN format (SHDC separated by dots)
fn parse_hand(s: &str) -> Option<[Holding; NUM_SUITS]> {
    let suits: Vec<&str> = s.split('.').collect();
    if suits.len() != NUM_SUITS {
        return None;
    }

    let mut hand = [Holding::new(); NUM_SUITS];
    for (suit, suit_str) in suits.iter().enumerate() {
        hand[suit] = Holding::parse(suit_str)?;
    }
    Some(hand)
}
