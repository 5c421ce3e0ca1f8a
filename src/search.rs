//! Alpha-beta search over a fixed target
//!
//! Each call answers one question: can the side to play at the root win at
//! least `target` tricks? At every trick start the search tries cheap
//! verdicts first (tricks already won or out of reach, quick tricks, later
//! trump tricks, the transposition table) before generating moves. Every
//! verdict comes with the ranks it depended on, which decide both what the
//! table stores and which sibling moves can be skipped as equivalent.

use tracing::trace;

use super::config::{SearchOptions, SolverConfig};
use super::later_tricks::{later_tricks_max, later_tricks_min};
use super::lookup::tables;
use super::moves::{Move, MoveGen};
use super::position::Position;
use super::quick_tricks::quick_tricks;
use super::trans_table::{new_trans_table, NodeCards, TransTable, TtLookup};
use super::types::*;

/// Counters for one solve
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Search nodes visited
    pub nodes: u64,
    /// Nodes at the start of a trick
    pub trick_nodes: u64,
    pub quick_cuts: u64,
    pub later_cuts: u64,
    pub tt_cuts: u64,
}

impl SearchStats {
    pub fn add(&mut self, other: &SearchStats) {
        self.nodes += other.nodes;
        self.trick_nodes += other.trick_nodes;
        self.quick_cuts += other.quick_cuts;
        self.later_cuts += other.later_cuts;
        self.tt_cuts += other.tt_cuts;
    }
}

/// Search state for one solve slot. Reused from solve to solve; only the
/// transposition table carries information from one solve to the next.
pub struct Searcher {
    pub pos: Position,
    pub moves: MoveGen,
    tt: Box<dyn TransTable>,
    options: SearchOptions,
    pub stats: SearchStats,
    forbidden: Vec<Move>,
    /// Root moves searched by the last call, in order
    root_tried: Vec<Move>,
    pub best_move: [Move; MAX_DEPTH],
    best_move_tt: [Move; MAX_DEPTH],
    trump: usize,
    root_depth: usize,
    max_is_ns: bool,
}

impl Searcher {
    pub fn new(config: &SolverConfig) -> Self {
        Searcher {
            pos: Position::new(&[[0; NUM_SUITS]; NUM_SEATS], NORTH),
            moves: MoveGen::new(),
            tt: new_trans_table(config.tt_kind, config.memory_default_mb, config.memory_max_mb),
            options: config.options,
            stats: SearchStats::default(),
            forbidden: Vec::new(),
            root_tried: Vec::new(),
            best_move: [Move::default(); MAX_DEPTH],
            best_move_tt: [Move::default(); MAX_DEPTH],
            trump: NOTRUMP,
            root_depth: 0,
            max_is_ns: true,
        }
    }

    pub fn tt(&self) -> &dyn TransTable {
        self.tt.as_ref()
    }

    pub fn tt_mut(&mut self) -> &mut dyn TransTable {
        self.tt.as_mut()
    }

    pub fn options(&self) -> SearchOptions {
        self.options
    }

    /// Prepare a solve.
    ///
    /// `holdings` are the hands at the start of the current trick, with
    /// `leader` on lead; `played` are the cards already played to it, in
    /// order. All hands must hold the same number of cards.
    pub fn setup(
        &mut self,
        holdings: &[[u16; NUM_SUITS]; NUM_SEATS],
        leader: Seat,
        played: &[Move],
        trump: usize,
    ) {
        self.pos = Position::new(holdings, leader);
        self.trump = trump;
        self.stats = SearchStats::default();
        self.best_move = [Move::default(); MAX_DEPTH];
        self.best_move_tt = [Move::default(); MAX_DEPTH];
        self.forbidden.clear();
        self.root_tried.clear();
        self.tt.init(&self.pos.hand_lookup);

        let ini_depth = self.pos.total_cards().saturating_sub(4);
        let trick = (ini_depth + 3) >> 2;
        self.moves.init(trick, leader, &self.pos.aggr, trump);

        for (rel, mv) in played.iter().enumerate() {
            let depth = ini_depth - rel;
            let seat = hand_id(leader, rel);
            self.pos.first[depth] = leader;
            self.moves.make_specific(*mv, trick, rel);
            self.pos.play(seat, mv.suit, mv.rank);
            self.pos.mv[depth] = *mv;
        }
        self.root_depth = ini_depth - played.len();
        self.pos.first[self.root_depth] = leader;
        self.max_is_ns = is_ns(self.root_seat());
    }

    #[inline]
    pub fn root_depth(&self) -> usize {
        self.root_depth
    }

    #[inline]
    fn root_trick_rel(&self) -> (usize, usize) {
        ((self.root_depth + 3) >> 2, (48 - self.root_depth) % 4)
    }

    /// Hand to play at the root
    pub fn root_seat(&self) -> Seat {
        let (_, rel) = self.root_trick_rel();
        hand_id(self.pos.first[self.root_depth], rel)
    }

    /// Generate the root moves in search order
    pub fn generate_root_moves(&mut self) -> usize {
        let depth = self.root_depth;
        let (trick, rel) = self.root_trick_rel();
        if rel == 0 {
            self.moves
                .move_gen0(trick, &self.pos, &self.best_move[depth], &self.best_move_tt[depth])
        } else {
            self.moves.move_gen123(trick, rel, &self.pos)
        }
    }

    /// The root moves last generated
    pub fn root_moves(&self) -> &[Move] {
        let (trick, rel) = self.root_trick_rel();
        self.moves.moves(trick, rel)
    }

    /// Root moves that are not forbidden, in list order
    pub fn open_root_moves(&mut self) -> Vec<Move> {
        let (trick, rel) = self.root_trick_rel();
        self.moves.rewind(trick, rel);
        let mut open = Vec::new();
        while let Some(mv) = self.moves.make_next_simple(trick, rel) {
            if !self.is_forbidden(&mv) {
                open.push(mv);
            }
        }
        open
    }

    pub fn forbid(&mut self, mv: Move) {
        if !self.is_forbidden(&mv) {
            self.forbidden.push(mv);
        }
    }

    pub fn clear_forbidden(&mut self) {
        self.forbidden.clear();
    }

    fn is_forbidden(&self, mv: &Move) -> bool {
        self.forbidden.iter().any(|f| f.same_card(mv))
    }

    /// Root moves searched by the last call, the cutoff move last
    pub fn root_tried(&self) -> &[Move] {
        &self.root_tried
    }

    /// Can the side to play at the root win `target` more tricks?
    pub fn search(&mut self, target: i32) -> bool {
        self.pos.tricks_max = 0;
        self.root_tried.clear();
        let result = self.ab_search(target, self.root_depth);
        trace!(target, result, nodes = self.stats.nodes, "root search");
        result
    }

    fn ab_search(&mut self, target: i32, depth: usize) -> bool {
        self.stats.nodes += 1;
        let trick = (depth + 3) >> 2;
        let rel = (48 - depth) % 4;
        let leader = self.pos.first[depth];
        let seat = hand_id(leader, rel);
        let is_max = is_ns(seat) == self.max_is_ns;
        let root = depth == self.root_depth;

        if rel == 0 {
            self.stats.trick_nodes += 1;
            if depth == 0 {
                return self.evaluate_last_trick(target);
            }
            if !root {
                if let Some(verdict) = self.trick_start_verdict(target, depth, trick, leader, is_max) {
                    return verdict;
                }
            }
        }

        if rel == 0 {
            self.moves
                .move_gen0(trick, &self.pos, &self.best_move[depth], &self.best_move_tt[depth]);
        } else {
            self.moves.move_gen123(trick, rel, &self.pos);
        }

        let mut union_wr = [0u16; NUM_SUITS];
        let mut prev_wr: Option<[u16; NUM_SUITS]> = None;
        loop {
            let skip_with = if self.options.rank_skip { prev_wr.as_ref() } else { None };
            let Some(mv) = self.moves.make_next(trick, rel, skip_with) else {
                break;
            };
            if root {
                if self.is_forbidden(&mv) {
                    prev_wr = None;
                    continue;
                }
                self.root_tried.push(mv);
            }

            let won = self.make_move(depth, trick, rel, seat, mv);
            let value = self.ab_search(target, depth - 1);
            let mut wr = self.pos.win_ranks[depth - 1];
            if rel == 3 {
                let track = self.moves.track(trick);
                if track.winner_contested() {
                    // The winner stands for its whole run, so the run's
                    // lower end has to stay inside the stored pattern
                    let w = track.winning[3];
                    wr[w.suit] |= bit_map_rank(w.rank) | w.sequence;
                }
            }
            self.undo_move(seat, mv, won);

            if value == is_max {
                self.pos.win_ranks[depth] = wr;
                self.best_move[depth] = mv;
                if rel == 0 && !root {
                    self.store(target, depth, trick, leader, value, Some(mv));
                }
                return value;
            }
            for s in 0..NUM_SUITS {
                union_wr[s] |= wr[s];
            }
            prev_wr = Some(wr);
        }

        self.pos.win_ranks[depth] = union_wr;
        if rel == 0 && !root {
            self.store(target, depth, trick, leader, !is_max, None);
        }
        !is_max
    }

    /// Play a card; returns whether it completed a trick won by the
    /// maximizing side
    fn make_move(&mut self, depth: usize, trick: usize, rel: usize, seat: Seat, mv: Move) -> bool {
        self.pos.play(seat, mv.suit, mv.rank);
        self.pos.mv[depth] = mv;
        if rel == 3 {
            let winner = self.moves.track(trick).winning_seat(3);
            self.pos.first[depth - 1] = winner;
            if is_ns(winner) == self.max_is_ns {
                self.pos.tricks_max += 1;
                return true;
            }
        } else {
            self.pos.first[depth - 1] = self.pos.first[depth];
        }
        false
    }

    fn undo_move(&mut self, seat: Seat, mv: Move, won: bool) {
        if won {
            self.pos.tricks_max -= 1;
        }
        self.pos.unplay(seat, mv.suit, mv.rank);
    }

    /// Settle a node at a trick start without generating moves, if possible
    fn trick_start_verdict(
        &mut self,
        target: i32,
        depth: usize,
        trick: usize,
        leader: Seat,
        is_max: bool,
    ) -> Option<bool> {
        let remaining = ((depth >> 2) + 1) as i32;
        if self.pos.tricks_max >= target {
            self.pos.win_ranks[depth] = [0; NUM_SUITS];
            return Some(true);
        }
        if self.pos.tricks_max + remaining < target {
            self.pos.win_ranks[depth] = [0; NUM_SUITS];
            return Some(false);
        }

        if self.options.quick_tricks {
            if let Some(v) = quick_tricks(&mut self.pos, leader, depth, target, self.trump, is_max) {
                self.stats.quick_cuts += 1;
                return Some(v);
            }
        }

        if self.options.later_tricks {
            let verdict = if is_max {
                later_tricks_min(&mut self.pos, leader, depth, target, self.trump, self.max_is_ns)
            } else {
                later_tricks_max(&mut self.pos, leader, depth, target, self.trump, self.max_is_ns)
            };
            if verdict.is_some() {
                self.stats.later_cuts += 1;
                return verdict;
            }
        }

        if self.options.trans_table {
            let need = target - self.pos.tricks_max;
            let limit = if self.max_is_ns { need - 1 } else { remaining - need };
            let hand_dist = self.pos.hand_dist;
            match self.tt.lookup(trick, leader, &self.pos.aggr, &hand_dist, limit) {
                TtLookup::Hit { node, lower_flag } => {
                    let t = tables();
                    for s in 0..NUM_SUITS {
                        self.pos.win_ranks[depth][s] =
                            t.win_ranks(self.pos.aggr[s], node.least_win[s] as usize);
                    }
                    self.stats.tt_cuts += 1;
                    return Some(lower_flag == self.max_is_ns);
                }
                TtLookup::BestMove { suit, rank } => {
                    self.best_move_tt[depth] = Move::new(suit, rank);
                }
                TtLookup::Miss => {
                    self.best_move_tt[depth] = Move::default();
                }
            }
        }
        None
    }

    /// Record the result of a trick-start node as bounds on NS tricks
    fn store(
        &mut self,
        target: i32,
        depth: usize,
        trick: usize,
        leader: Seat,
        value: bool,
        best: Option<Move>,
    ) {
        if !self.options.trans_table {
            return;
        }
        let remaining = ((depth >> 2) + 1) as i32;
        let need = target - self.pos.tricks_max;
        let (lbound, ubound) = match (self.max_is_ns, value) {
            (true, true) => (need, remaining),
            (true, false) => (0, need - 1),
            (false, true) => (0, remaining - need),
            (false, false) => (remaining - need + 1, remaining),
        };
        let clamp = |x: i32| x.clamp(0, remaining) as u8;
        let mut node = NodeCards {
            lbound: clamp(lbound),
            ubound: clamp(ubound),
            ..NodeCards::default()
        };
        if let Some(mv) = best {
            node.best_move_suit = mv.suit as u8;
            node.best_move_rank = mv.rank as u8;
        }
        let aggr = self.pos.aggr;
        let hand_dist = self.pos.hand_dist;
        let win_ranks = self.pos.win_ranks[depth];
        self.tt
            .add(trick, leader, &aggr, &win_ranks, &hand_dist, node, best.is_some());
    }

    /// Each hand has one card left: play the trick out
    fn evaluate_last_trick(&mut self, target: i32) -> bool {
        let leader = self.pos.first[0];
        let t = tables();
        let card_of = |pos: &Position, seat: Seat| -> (Suit, Rank) {
            (0..NUM_SUITS)
                .find(|&s| pos.rank_in_suit[seat][s] != 0)
                .map(|s| (s, t.highest_rank(pos.rank_in_suit[seat][s])))
                .unwrap_or((NOTRUMP, 0))
        };

        let (lead_suit, lead_rank) = card_of(&self.pos, leader);
        let mut win = (leader, lead_suit, lead_rank);
        let mut counts = [0usize; NUM_SUITS + 1];
        counts[lead_suit] += 1;
        for rel in 1..NUM_SEATS {
            let seat = hand_id(leader, rel);
            let (suit, rank) = card_of(&self.pos, seat);
            counts[suit] += 1;
            let beats = if suit == win.1 {
                rank > win.2
            } else {
                suit == self.trump
            };
            if beats {
                win = (seat, suit, rank);
            }
        }

        let (winner, suit, rank) = win;
        self.pos.win_ranks[0] = [0; NUM_SUITS];
        if suit < NUM_SUITS && counts[suit] > 1 {
            self.pos.win_ranks[0][suit] = bit_map_rank(rank);
        }
        let extra = (is_ns(winner) == self.max_is_ns) as i32;
        self.pos.tricks_max + extra >= target
    }
}
