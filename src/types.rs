//! Core type definitions: seats, suits and ranks

/// Suits: SPADE=0, HEART=1, DIAMOND=2, CLUB=3
pub type Suit = usize;
pub const SPADE: Suit = 0;
pub const HEART: Suit = 1;
pub const DIAMOND: Suit = 2;
pub const CLUB: Suit = 3;
pub const NUM_SUITS: usize = 4;
pub const NOTRUMP: usize = NUM_SUITS;
pub const NUM_STRAINS: usize = 5;

/// Ranks are absolute: TWO=2, ..., TEN=10, JACK=11, QUEEN=12, KING=13, ACE=14
pub type Rank = usize;
pub const TWO: Rank = 2;
pub const THREE: Rank = 3;
pub const FOUR: Rank = 4;
pub const FIVE: Rank = 5;
pub const SIX: Rank = 6;
pub const SEVEN: Rank = 7;
pub const EIGHT: Rank = 8;
pub const NINE: Rank = 9;
pub const TEN: Rank = 10;
pub const JACK: Rank = 11;
pub const QUEEN: Rank = 12;
pub const KING: Rank = 13;
pub const ACE: Rank = 14;
pub const NUM_RANKS: usize = 13;

/// Seats: NORTH=0, EAST=1, SOUTH=2, WEST=3
pub type Seat = usize;
pub const NORTH: Seat = 0;
pub const EAST: Seat = 1;
pub const SOUTH: Seat = 2;
pub const WEST: Seat = 3;
pub const NUM_SEATS: usize = 4;

pub const TOTAL_TRICKS: usize = NUM_RANKS;
pub const TOTAL_CARDS: usize = NUM_RANKS * NUM_SUITS;

/// Number of search depths: one per card of a full deal minus the last trick.
pub const MAX_DEPTH: usize = 50;

/// All 13 ranks of a suit as a holding mask.
pub const FULL_SUIT: u16 = 0x1fff;

/// Check if seat is NS (North or South)
#[inline]
pub fn is_ns(seat: Seat) -> bool {
    seat & 1 == 0
}

/// Get partner seat
#[inline]
pub fn partner(seat: Seat) -> Seat {
    (seat + 2) % NUM_SEATS
}

/// Get left-hand opponent
#[inline]
pub fn left_hand_opp(seat: Seat) -> Seat {
    (seat + 1) % NUM_SEATS
}

/// Get right-hand opponent
#[inline]
pub fn right_hand_opp(seat: Seat) -> Seat {
    (seat + 3) % NUM_SEATS
}

/// Seat playing `rel` positions after `first` in a trick
#[inline]
pub fn hand_id(first: Seat, rel: usize) -> Seat {
    (first + rel) % NUM_SEATS
}

/// Holding bit for an absolute rank (bit 0 = the two). Rank 0 maps to no bit.
#[inline]
pub fn bit_map_rank(rank: Rank) -> u16 {
    if rank < TWO {
        0
    } else {
        1 << (rank - TWO)
    }
}

/// Get seat name
pub fn seat_name(seat: Seat) -> &'static str {
    const NAMES: [&str; 4] = ["North", "East", "South", "West"];
    NAMES[seat]
}

/// Get seat letter
pub fn seat_letter(seat: Seat) -> char {
    const LETTERS: [char; 4] = ['N', 'E', 'S', 'W'];
    LETTERS[seat]
}

/// Get suit (or strain) name
pub fn suit_name(suit: Suit) -> &'static str {
    const NAMES: [&str; 5] = ["Spade", "Heart", "Diamond", "Club", "NoTrump"];
    NAMES[suit]
}

/// Get suit letter; no-trump is 'N'
pub fn suit_letter(suit: Suit) -> char {
    const LETTERS: [char; 5] = ['S', 'H', 'D', 'C', 'N'];
    LETTERS[suit]
}

/// Get rank name (character)
pub fn rank_name(rank: Rank) -> char {
    const NAMES: [char; 13] = [
        '2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A',
    ];
    NAMES[rank - TWO]
}

/// Convert character to suit
pub fn char_to_suit(c: char) -> Option<Suit> {
    match c.to_ascii_uppercase() {
        'S' => Some(SPADE),
        'H' => Some(HEART),
        'D' => Some(DIAMOND),
        'C' => Some(CLUB),
        'N' => Some(NOTRUMP),
        _ => None,
    }
}

/// Convert character to rank
pub fn char_to_rank(c: char) -> Option<Rank> {
    match c.to_ascii_uppercase() {
        '2' => Some(TWO),
        '3' => Some(THREE),
        '4' => Some(FOUR),
        '5' => Some(FIVE),
        '6' => Some(SIX),
        '7' => Some(SEVEN),
        '8' => Some(EIGHT),
        '9' => Some(NINE),
        'T' | '1' => Some(TEN),
        'J' => Some(JACK),
        'Q' => Some(QUEEN),
        'K' => Some(KING),
        'A' => Some(ACE),
        _ => None,
    }
}

/// Convert character to seat
pub fn char_to_seat(c: char) -> Option<Seat> {
    match c.to_ascii_uppercase() {
        'N' => Some(NORTH),
        'E' => Some(EAST),
        'S' => Some(SOUTH),
        'W' => Some(WEST),
        _ => None,
    }
}

/// Card name such as "SA" or "H7"
pub fn card_name(suit: Suit, rank: Rank) -> String {
    format!("{}{}", suit_letter(suit), rank_name(rank))
}
