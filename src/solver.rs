//! Solving one board: validation, table policy and the scoring modes
//!
//! `target` picks what is asked: -1 finds the maximum, 0 lists cards
//! unscored, 1..=13 asks for cards reaching at least that many tricks.
//! `solutions` picks how many cards come back: 1 = one optimal card,
//! 2 = every optimal card, 3 = every card with its own score. `mode` 0
//! returns a forced card unsearched, 2 keeps the table unconditionally.

use tracing::debug;

use super::deal::{Deal, FutureTricks};
use super::error::SolveError;
use super::moves::Move;
use super::search::SearchStats;
use super::slot::SolveSlot;
use super::types::*;

/// Holding bits that are valid in the external layout
const EXTERNAL_RANKS: u32 = (FULL_SUIT as u32) << 2;

/// A checked request, ready to search
struct Request {
    /// Cards still held, internal layout
    holdings: [[u16; NUM_SUITS]; NUM_SEATS],
    played: Vec<(Suit, Rank)>,
    card_count: usize,
}

/// Range checks on the request fields, before anything is counted
fn check_ranges(deal: &Deal, target: i32, solutions: i32, mode: i32) -> Result<(), SolveError> {
    if target < -1 {
        return Err(SolveError::TargetWrongLo(target));
    }
    if target > 13 {
        return Err(SolveError::TargetWrongHi(target));
    }
    if solutions < 1 {
        return Err(SolveError::SolutionsWrongLo(solutions));
    }
    if solutions > 3 {
        return Err(SolveError::SolutionsWrongHi(solutions));
    }
    if mode < 0 {
        return Err(SolveError::ModeWrongLo(mode));
    }
    if mode > 2 {
        return Err(SolveError::ModeWrongHi(mode));
    }
    if deal.trump > NOTRUMP {
        return Err(SolveError::TrumpWrong(deal.trump));
    }
    if deal.first >= NUM_SEATS {
        return Err(SolveError::FirstWrong(deal.first));
    }

    let mut ended = false;
    for i in 0..3 {
        let rank = deal.current_trick_rank[i];
        if rank == 0 {
            ended = true;
            continue;
        }
        if ended || !(TWO..=ACE).contains(&rank) || deal.current_trick_suit[i] >= NUM_SUITS {
            return Err(SolveError::SuitOrRank);
        }
    }

    let stray_bits = deal
        .remain_cards
        .iter()
        .flatten()
        .any(|&c| c & !EXTERNAL_RANKS != 0);
    if stray_bits {
        return Err(SolveError::SuitOrRank);
    }
    Ok(())
}

/// Consistency checks on the cards themselves
fn check_cards(deal: &Deal, target: i32) -> Result<Request, SolveError> {
    let mut holdings = [[0u16; NUM_SUITS]; NUM_SEATS];
    for seat in 0..NUM_SEATS {
        for suit in 0..NUM_SUITS {
            holdings[seat][suit] = (deal.remain_cards[seat][suit] >> 2) as u16 & FULL_SUIT;
        }
    }
    let played: Vec<(Suit, Rank)> = deal.played().collect();

    let held = |seat: Seat| -> usize {
        holdings[seat].iter().map(|h| h.count_ones() as usize).sum()
    };
    let card_count: usize = (0..NUM_SEATS).map(held).sum();
    if card_count == 0 {
        return Err(SolveError::ZeroCards);
    }
    if card_count > TOTAL_CARDS {
        return Err(SolveError::TooManyCards);
    }

    let mut counts = [0usize; NUM_SEATS];
    for (seat, count) in counts.iter_mut().enumerate() {
        *count = held(seat);
    }
    for i in 0..played.len() {
        counts[hand_id(deal.first, i)] += 1;
    }
    if counts.iter().any(|&c| c != counts[0]) {
        return Err(SolveError::CardCount);
    }

    let cc = card_count as i32;
    let tricks = ((cc - 4) >> 2) + if cc % 4 != 0 { 2 } else { 1 };
    if target > tricks {
        return Err(SolveError::TargetTooHigh { target, tricks });
    }

    for &(suit, rank) in &played {
        let bit = bit_map_rank(rank);
        if (0..NUM_SEATS).any(|seat| holdings[seat][suit] & bit != 0) {
            return Err(SolveError::PlayedCard);
        }
    }

    for suit in 0..NUM_SUITS {
        let mut seen = 0u16;
        for seat in 0..NUM_SEATS {
            if seen & holdings[seat][suit] != 0 {
                return Err(SolveError::DuplicateCards);
            }
            seen |= holdings[seat][suit];
        }
    }
    for (i, a) in played.iter().enumerate() {
        if played[i + 1..].contains(a) {
            return Err(SolveError::DuplicateCards);
        }
    }

    Ok(Request {
        holdings,
        played,
        card_count,
    })
}

/// Winner of a trick given its cards in order from `leader`
fn trick_winner(cards: &[(Suit, Rank)], leader: Seat, trump: usize) -> Seat {
    let mut best = 0;
    for i in 1..cards.len() {
        let (suit, rank) = cards[i];
        let (best_suit, best_rank) = cards[best];
        let beats = if suit == best_suit {
            rank > best_rank
        } else {
            suit == trump
        };
        if beats {
            best = i;
        }
    }
    hand_id(leader, best)
}

impl SolveSlot {
    /// Solve one board. See the module docs for `target`, `solutions`
    /// and `mode`.
    pub fn solve_board(
        &mut self,
        deal: &Deal,
        target: i32,
        solutions: i32,
        mode: i32,
    ) -> Result<FutureTricks, SolveError> {
        check_ranges(deal, target, solutions, mode)?;
        let req = check_cards(deal, target)?;
        self.prepare_table(&req.holdings, deal.trump, mode);

        if req.card_count <= 4 {
            return Ok(self.last_trick(deal, &req, target, solutions));
        }

        let mut start = req.holdings;
        for (i, &(suit, rank)) in req.played.iter().enumerate() {
            start[hand_id(deal.first, i)][suit] |= bit_map_rank(rank);
        }
        let played: Vec<Move> = req
            .played
            .iter()
            .map(|&(suit, rank)| Move::new(suit, rank))
            .collect();
        self.searcher.setup(&start, deal.first, &played, deal.trump);

        let no_moves = self.searcher.generate_root_moves();
        let hand = self.searcher.root_seat();
        let tricks = ((self.searcher.root_depth() + 3) >> 2) as i32 + 1;
        let mut fut = FutureTricks::default();

        if mode == 0 && no_moves == 1 && solutions != 3 {
            let mv = self.searcher.root_moves()[0];
            fut.push(&mv, -2);
            self.finish_solve();
            return Ok(fut);
        }

        if solutions == 3 {
            self.score_all_moves(&mut fut, hand, tricks);
        } else if target == 0 {
            let take = if solutions == 1 { 1 } else { no_moves };
            for mv in self.searcher.open_root_moves().iter().take(take) {
                fut.push(mv, 0);
            }
        } else if target == -1 {
            let (lb, best) = self.max_tricks(hand, 0, tricks);
            match best {
                Some(mv) if lb > 0 => {
                    fut.push(&mv, lb);
                    if solutions == 2 {
                        self.more_optimal_moves(&mut fut, mv, no_moves);
                    }
                }
                _ => {
                    let take = if solutions == 1 { 1 } else { no_moves };
                    for mv in self.searcher.open_root_moves().iter().take(take) {
                        fut.push(mv, 0);
                    }
                }
            }
        } else if self.searcher.search(target) {
            let mv = self.searcher.best_move[self.searcher.root_depth()];
            fut.push(&mv, target);
            if solutions == 2 {
                self.more_optimal_moves(&mut fut, mv, no_moves);
            }
        } else {
            // No card reaches the target: report -1 unless only one trick was asked
            fut.cards = 0;
            fut.score[0] = if target > 1 { -1 } else { 0 };
        }

        self.searcher.clear_forbidden();
        fut.nodes = self.searcher.stats.trick_nodes;
        self.finish_solve();
        debug!(
            target,
            solutions,
            mode,
            cards = fut.cards,
            best = fut.best_score().unwrap_or(fut.score[0]),
            nodes = self.searcher.stats.nodes,
            trick_nodes = fut.nodes,
            tt_hits = self.searcher.tt().stats().hits,
            "board solved"
        );
        Ok(fut)
    }

    /// One card per hand: play the trick out
    fn last_trick(&mut self, deal: &Deal, req: &Request, target: i32, solutions: i32) -> FutureTricks {
        let mut cards = req.played.clone();
        for rel in cards.len()..NUM_SEATS {
            let seat = hand_id(deal.first, rel);
            let card = (0..NUM_SUITS)
                .find(|&s| req.holdings[seat][s] != 0)
                .map(|s| (s, (req.holdings[seat][s].trailing_zeros() as usize) + TWO));
            if let Some(card) = card {
                cards.push(card);
            }
        }
        let hand = hand_id(deal.first, req.played.len());
        let mut fut = FutureTricks::default();
        let Some(&(suit, rank)) = cards.get(req.played.len()) else {
            return fut;
        };
        let winner = trick_winner(&cards, deal.first, deal.trump);
        let score = if target == 0 && solutions < 3 {
            0
        } else {
            (is_ns(winner) == is_ns(hand)) as i32
        };
        fut.push(&Move::new(suit, rank), score);
        self.searcher.stats = SearchStats::default();
        self.finish_solve();
        fut
    }

    /// Binary search for the most tricks reachable, starting near the
    /// middle; returns the bound and the move that reached it
    fn max_tricks(&mut self, hand: Seat, mut lb: i32, mut ub: i32) -> (i32, Option<Move>) {
        let mut guess = (7 - (hand & 1) as i32).clamp(lb + 1, ub.max(lb + 1));
        let mut best = None;
        while lb < ub {
            let g = guess.clamp(lb + 1, ub);
            if self.searcher.search(g) {
                best = Some(self.searcher.best_move[self.searcher.root_depth()]);
                lb = g;
                guess = g + 1;
            } else {
                ub = g - 1;
                guess = g - 1;
            }
        }
        debug!(hand = %seat_letter(hand), tricks = lb, "maximum found");
        (lb, best)
    }

    /// Score every root move, best first
    fn score_all_moves(&mut self, fut: &mut FutureTricks, hand: Seat, tricks: i32) {
        let mut ub = tricks;
        loop {
            let (lb, best) = self.max_tricks(hand, 0, ub);
            match best {
                Some(mv) if lb > 0 => {
                    fut.push(&mv, lb);
                    self.searcher.forbid(mv);
                    ub = lb;
                }
                _ => {
                    for mv in self.searcher.open_root_moves() {
                        fut.push(&mv, 0);
                    }
                    break;
                }
            }
            if self.searcher.open_root_moves().is_empty() {
                break;
            }
        }
    }

    /// Find the other moves reaching the score of the first one
    fn more_optimal_moves(&mut self, fut: &mut FutureTricks, first: Move, no_moves: usize) {
        let score = fut.score[0];
        let mut beaten = vec![first];
        for _ in 1..no_moves {
            for mv in &beaten {
                self.searcher.forbid(*mv);
            }
            if !self.searcher.search(score) {
                break;
            }
            let mv = self.searcher.best_move[self.searcher.root_depth()];
            fut.push(&mv, score);
            beaten = self.searcher.root_tried().to_vec();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SolverConfig, TtKind};
    use crate::hands::Hands;

    fn slot() -> SolveSlot {
        SolveSlot::new(&SolverConfig::with_tt_kind(TtKind::Small))
    }

    fn deal(pbn: &str, trump: usize, first: Seat) -> Deal {
        Deal::from_pbn(pbn, trump, first).unwrap()
    }

    const PBN: &str = "N:AKQT3.J6.KJ42.95 652.AK42.AQ87.T4 J74.QT95.T.AK863 98.873.9653.QJ72";

    #[test]
    fn test_range_errors() {
        let mut s = slot();
        let d = deal(PBN, NOTRUMP, WEST);
        assert_eq!(s.solve_board(&d, -2, 1, 1), Err(SolveError::TargetWrongLo(-2)));
        assert_eq!(s.solve_board(&d, 14, 1, 1), Err(SolveError::TargetWrongHi(14)));
        assert_eq!(s.solve_board(&d, -1, 0, 1), Err(SolveError::SolutionsWrongLo(0)));
        assert_eq!(s.solve_board(&d, -1, 4, 1), Err(SolveError::SolutionsWrongHi(4)));
        assert_eq!(s.solve_board(&d, -1, 1, -1), Err(SolveError::ModeWrongLo(-1)));
        assert_eq!(s.solve_board(&d, -1, 1, 3), Err(SolveError::ModeWrongHi(3)));

        let mut bad = d;
        bad.trump = 5;
        assert_eq!(s.solve_board(&bad, -1, 1, 1), Err(SolveError::TrumpWrong(5)));
        let mut bad = d;
        bad.first = 4;
        assert_eq!(s.solve_board(&bad, -1, 1, 1), Err(SolveError::FirstWrong(4)));
        let mut bad = d;
        bad.remain_cards[NORTH][SPADE] |= 1;
        assert_eq!(s.solve_board(&bad, -1, 1, 1), Err(SolveError::SuitOrRank));
        let mut bad = d;
        bad.current_trick_rank = [0, 5, 0];
        assert_eq!(s.solve_board(&bad, -1, 1, 1), Err(SolveError::SuitOrRank));
    }

    #[test]
    fn test_card_errors() {
        let mut s = slot();
        let empty = Deal::new(&Hands::new(), NOTRUMP, WEST);
        assert_eq!(s.solve_board(&empty, -1, 1, 1), Err(SolveError::ZeroCards));

        let short = deal("N:A... K... Q... J2...", NOTRUMP, WEST);
        assert_eq!(s.solve_board(&short, -1, 1, 1), Err(SolveError::CardCount));

        let two = deal("N:A2... K3... Q4... J5...", NOTRUMP, WEST);
        assert_eq!(
            s.solve_board(&two, 3, 1, 1),
            Err(SolveError::TargetTooHigh { target: 3, tricks: 2 })
        );

        let mut dup = two;
        dup.remain_cards[EAST][SPADE] = (1 << ACE) | (1 << THREE);
        assert_eq!(s.solve_board(&dup, -1, 1, 1), Err(SolveError::DuplicateCards));

        // West leads a card North still holds
        let hands = Hands::from_pbn("N:A2... K3... Q4... 5...").unwrap();
        let played = Deal::with_trick(&hands, NOTRUMP, WEST, &[(SPADE, ACE)]);
        assert_eq!(s.solve_board(&played, -1, 1, 1), Err(SolveError::PlayedCard));
    }

    #[test]
    fn test_last_trick_returns_one_card() {
        let mut s = slot();
        let d = deal("N:A... 2... 3... 4...", NOTRUMP, NORTH);
        let fut = s.solve_board(&d, -1, 1, 1).unwrap();
        assert_eq!(fut.cards, 1);
        assert_eq!((fut.suit[0], fut.rank[0]), (SPADE, ACE));
        assert_eq!(fut.score[0], 1);
        assert_eq!(fut.equals[0], 0);

        let fut = s.solve_board(&d, 0, 1, 1).unwrap();
        assert_eq!(fut.score[0], 0);

        // East to play after North's lead: EW lose the trick
        let hands = Hands::from_pbn("N:... 2... 3... 4...").unwrap();
        let d = Deal::with_trick(&hands, NOTRUMP, NORTH, &[(SPADE, ACE)]);
        let fut = s.solve_board(&d, -1, 3, 1).unwrap();
        assert_eq!((fut.cards, fut.rank[0], fut.score[0]), (1, TWO, 0));
    }

    #[test]
    fn test_forced_card_mode_zero() {
        let mut s = slot();
        // North has led the spade deuce; East's king-queen is one move
        let hands = Hands::from_pbn("N:.A.. KQ... 3.2.. .43..").unwrap();
        let d = Deal::with_trick(&hands, NOTRUMP, NORTH, &[(SPADE, TWO)]);
        let fut = s.solve_board(&d, -1, 1, 0).unwrap();
        assert_eq!((fut.cards, fut.suit[0], fut.score[0]), (1, SPADE, -2));
        assert!(matches!(fut.rank[0], KING | QUEEN));
        assert_eq!(fut.nodes, 0);

        // Searched anyway in mode 1: East wins both tricks
        let fut = s.solve_board(&d, -1, 1, 1).unwrap();
        assert_eq!(fut.score[0], 2);
    }

    #[test]
    fn test_target_failure_quirk() {
        let mut s = slot();
        // West on lead cannot take a trick against the top cards
        let d = deal("N:AKQ... 432... JT9... 876...", NOTRUMP, WEST);
        let fut = s.solve_board(&d, 2, 1, 1).unwrap();
        assert_eq!((fut.cards, fut.score[0]), (0, -1));
        let fut = s.solve_board(&d, 1, 1, 1).unwrap();
        assert_eq!((fut.cards, fut.score[0]), (0, 0));
    }

    #[test]
    fn test_target_zero_lists_cards() {
        let mut s = slot();
        let d = deal("N:AK.2.. QJ.3.. T9.4.. 87.5..", NOTRUMP, NORTH);
        let one = s.solve_board(&d, 0, 1, 1).unwrap();
        assert_eq!(one.cards, 1);
        let all = s.solve_board(&d, 0, 2, 1).unwrap();
        assert_eq!(all.cards, 2);
        assert!(all.scored_cards().all(|c| c.score == 0));
    }

    #[test]
    fn test_winner_of_trick() {
        let cards = [(SPADE, TEN), (SPADE, KING), (HEART, TWO), (SPADE, ACE)];
        assert_eq!(trick_winner(&cards, WEST, NOTRUMP), SOUTH);
        assert_eq!(trick_winner(&cards, WEST, HEART), EAST);
    }
}
