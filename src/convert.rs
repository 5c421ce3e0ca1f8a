//! Interop with `bridge_types`
//!
//! Callers that already hold a `bridge_types::Deal` hand it over here;
//! everything past this module works on suit masks.

use super::deal::Deal;
use super::hands::Hands;
use super::types::*;

const DIRECTIONS: [bridge_types::Direction; NUM_SEATS] = [
    bridge_types::Direction::North,
    bridge_types::Direction::East,
    bridge_types::Direction::South,
    bridge_types::Direction::West,
];

impl Hands {
    pub fn from_deal(deal: &bridge_types::Deal) -> Self {
        let mut hands = Hands::new();
        for dir in DIRECTIONS {
            let seat = direction_to_seat(dir);
            for card in deal.hand(dir).cards() {
                hands
                    .holding_mut(seat, convert_suit(card.suit))
                    .add(card.rank as usize);
            }
        }
        hands
    }
}

impl Deal {
    /// Full deal at the first trick, `first` on lead
    pub fn from_bridge_deal(deal: &bridge_types::Deal, trump: usize, first: bridge_types::Direction) -> Self {
        Deal::new(&Hands::from_deal(deal), trump, direction_to_seat(first))
    }
}

/// bridge_types orders suits from clubs up; ours run from spades down
fn convert_suit(suit: bridge_types::Suit) -> Suit {
    match suit {
        bridge_types::Suit::Spades => SPADE,
        bridge_types::Suit::Hearts => HEART,
        bridge_types::Suit::Diamonds => DIAMOND,
        bridge_types::Suit::Clubs => CLUB,
    }
}

pub fn seat_to_direction(seat: Seat) -> bridge_types::Direction {
    DIRECTIONS[seat % NUM_SEATS]
}

pub fn direction_to_seat(dir: bridge_types::Direction) -> Seat {
    match dir {
        bridge_types::Direction::North => NORTH,
        bridge_types::Direction::East => EAST,
        bridge_types::Direction::South => SOUTH,
        bridge_types::Direction::West => WEST,
    }
}
