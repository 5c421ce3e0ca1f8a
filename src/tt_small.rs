//! Transposition table for small memory budgets
//!
//! Per (trick, hand on lead) a binary search tree keyed on the packed suit
//! lengths leads to a tree of owner patterns, one level per suit. Each path
//! through the four levels ends in a `NodeCards`. When the budget runs out
//! the whole table is dropped and refilled from scratch.

use tracing::debug;

use super::arena::{Arena, Handle};
use super::config::{THREADMEM_SMALL_DEF_MB, THREADMEM_SMALL_MAX_MB};
use super::position::HandLookup;
use super::trans_table::*;
use super::types::*;

const WIN_NODES_FIRST: usize = 170_000;
const WIN_NODES_SLAB: usize = 50_000;
const NODE_CARDS_FIRST: usize = 60_000;
const NODE_CARDS_SLAB: usize = 50_000;
const LEN_NODES_FIRST: usize = 2_000;
const LEN_NODES_SLAB: usize = 2_000;

/// Most pattern nodes before the table is dropped
const MAX_WIN_NODES: usize = 700_000;

struct LenNode {
    key: u64,
    left: Option<Handle>,
    right: Option<Handle>,
    first_win: Option<Handle>,
}

/// One suit's pattern; siblings share a parent, children are the next suit
struct WinNode {
    order_set: u32,
    win_mask: u32,
    next: Option<Handle>,
    child: Option<Handle>,
    /// Set on the last suit only
    node: Option<Handle>,
}

pub struct TransTableS {
    roots: [[Option<Handle>; NUM_SEATS]; TT_TRICKS],
    len_nodes: Arena<LenNode>,
    win_nodes: Arena<WinNode>,
    nodes: Arena<NodeCards>,
    order: OrderTables,
    default_mb: usize,
    max_mb: usize,
    stats: TtStats,
}

impl Default for TransTableS {
    fn default() -> Self {
        Self::new()
    }
}

impl TransTableS {
    pub fn new() -> Self {
        TransTableS {
            roots: [[None; NUM_SEATS]; TT_TRICKS],
            len_nodes: Arena::new(LEN_NODES_FIRST, LEN_NODES_SLAB),
            win_nodes: Arena::new(WIN_NODES_FIRST, WIN_NODES_SLAB),
            nodes: Arena::new(NODE_CARDS_FIRST, NODE_CARDS_SLAB),
            order: OrderTables::new(),
            default_mb: THREADMEM_SMALL_DEF_MB,
            max_mb: THREADMEM_SMALL_MAX_MB,
            stats: TtStats::default(),
        }
    }

    fn bytes(&self) -> usize {
        self.len_nodes.bytes() + self.win_nodes.bytes() + self.nodes.bytes()
    }

    /// Bytes the next add could need beyond what is reserved
    fn growth_bytes(&self) -> usize {
        let mut extra = 0;
        if self.len_nodes.needs_slab() {
            extra += self.len_nodes.next_slab_bytes();
        }
        if self.win_nodes.needs_slab() {
            extra += self.win_nodes.next_slab_bytes();
        }
        if self.nodes.needs_slab() {
            extra += self.nodes.next_slab_bytes();
        }
        extra
    }

    fn out_of_room(&self) -> bool {
        self.win_nodes.len() + NUM_SUITS > MAX_WIN_NODES
            || self.bytes() + self.growth_bytes() > self.max_mb << 20
    }

    fn find_len_node(&self, trick: usize, seat: Seat, key: u64) -> Option<Handle> {
        let mut cur = self.roots[trick][seat];
        while let Some(h) = cur {
            let node = self.len_nodes.get(h)?;
            if key == node.key {
                return Some(h);
            }
            cur = if key < node.key { node.left } else { node.right };
        }
        None
    }

    fn find_or_add_len_node(&mut self, trick: usize, seat: Seat, key: u64) -> Option<Handle> {
        let fresh = LenNode {
            key,
            left: None,
            right: None,
            first_win: None,
        };
        let Some(mut cur) = self.roots[trick][seat] else {
            let h = self.len_nodes.alloc(fresh);
            self.roots[trick][seat] = Some(h);
            return Some(h);
        };
        loop {
            let node = self.len_nodes.get(cur)?;
            if key == node.key {
                return Some(cur);
            }
            let go_left = key < node.key;
            let next = if go_left { node.left } else { node.right };
            match next {
                Some(h) => cur = h,
                None => {
                    let h = self.len_nodes.alloc(fresh);
                    let parent = self.len_nodes.get_mut(cur)?;
                    if go_left {
                        parent.left = Some(h);
                    } else {
                        parent.right = Some(h);
                    }
                    return Some(h);
                }
            }
        }
    }

    /// Depth-first search of the pattern tree under `start` at `level`
    fn search(
        &self,
        start: Option<Handle>,
        level: usize,
        query: &[u32; NUM_SUITS],
        limit: i32,
        hint: &mut Option<NodeCards>,
    ) -> Option<(NodeCards, bool)> {
        let mut cur = start;
        while let Some(h) = cur {
            let win = self.win_nodes.get(h)?;
            cur = win.next;
            if query[level] & win.win_mask != win.order_set {
                continue;
            }
            if level + 1 < NUM_SUITS {
                if let Some(found) = self.search(win.child, level + 1, query, limit, hint) {
                    return Some(found);
                }
                continue;
            }
            let Some(node) = win.node.and_then(|n| self.nodes.get(n)) else {
                continue;
            };
            if let Some(lower) = decide(node, limit) {
                return Some((*node, lower));
            }
            if hint.is_none() && node.best_move_rank != 0 {
                *hint = Some(*node);
            }
        }
        None
    }

    /// Walk or extend the pattern chain under a length node; returns the leaf
    fn insert_pattern(&mut self, len_node: Handle, pattern: &Pattern) -> Option<(Handle, bool)> {
        let mut head = self.len_nodes.get(len_node)?.first_win;
        let mut parent: Option<Handle> = None;

        for level in 0..NUM_SUITS {
            let order_set = pattern.order_set[level];
            let win_mask = pattern.win_mask[level];

            let mut cur = head;
            let mut found = None;
            while let Some(h) = cur {
                let win = self.win_nodes.get(h)?;
                if win.order_set == order_set && win.win_mask == win_mask {
                    found = Some(h);
                    break;
                }
                cur = win.next;
            }

            let h = match found {
                Some(h) => h,
                None => {
                    let h = self.win_nodes.alloc(WinNode {
                        order_set,
                        win_mask,
                        next: head,
                        child: None,
                        node: None,
                    });
                    match parent {
                        None => self.len_nodes.get_mut(len_node)?.first_win = Some(h),
                        Some(p) => self.win_nodes.get_mut(p)?.child = Some(h),
                    }
                    h
                }
            };
            if level + 1 == NUM_SUITS {
                return Some((h, found.is_some()));
            }
            parent = Some(h);
            head = self.win_nodes.get(h)?.child;
        }
        None
    }
}

impl TransTable for TransTableS {
    fn init(&mut self, hand_lookup: &HandLookup) {
        self.order.init(hand_lookup);
    }

    fn set_memory_default(&mut self, megabytes: usize) {
        self.default_mb = megabytes;
    }

    fn set_memory_maximum(&mut self, megabytes: usize) {
        self.max_mb = megabytes;
    }

    fn make_tt(&mut self) {
        self.roots = [[None; NUM_SEATS]; TT_TRICKS];
        self.len_nodes.reset();
        self.win_nodes.reset();
        self.nodes.reset();
    }

    fn reset_memory(&mut self, reason: ResetReason) {
        debug!(
            reason = reason.name(),
            entries = self.nodes.len(),
            default_mb = self.default_mb,
            kb = self.memory_in_use(),
            "small table reset"
        );
        self.make_tt();
        self.stats.resets[reason.index()] += 1;
    }

    fn return_all_memory(&mut self) {
        self.roots = [[None; NUM_SEATS]; TT_TRICKS];
        self.len_nodes.release();
        self.win_nodes.release();
        self.nodes.release();
        self.stats.resets[ResetReason::FreeMemory.index()] += 1;
    }

    fn memory_in_use(&self) -> usize {
        self.bytes() / 1024
    }

    fn lookup(
        &mut self,
        trick: usize,
        seat: Seat,
        aggr: &[u16; NUM_SUITS],
        hand_dist: &[u32; NUM_SEATS],
        limit: i32,
    ) -> TtLookup {
        self.stats.lookups += 1;
        let Some(len_node) = self.find_len_node(trick, seat, suit_lengths(hand_dist)) else {
            return TtLookup::Miss;
        };
        let Some(first) = self.len_nodes.get(len_node).map(|n| n.first_win) else {
            return TtLookup::Miss;
        };
        let query = self.order.query(aggr);
        let mut hint = None;
        if let Some((node, lower_flag)) = self.search(first, 0, &query, limit, &mut hint) {
            self.stats.hits += 1;
            return TtLookup::Hit { node, lower_flag };
        }
        match hint {
            Some(node) => TtLookup::BestMove {
                suit: node.best_move_suit as Suit,
                rank: node.best_move_rank as Rank,
            },
            None => TtLookup::Miss,
        }
    }

    fn add(
        &mut self,
        trick: usize,
        seat: Seat,
        aggr: &[u16; NUM_SUITS],
        win_ranks: &[u16; NUM_SUITS],
        hand_dist: &[u32; NUM_SEATS],
        mut node: NodeCards,
        keep_best_move: bool,
    ) {
        if self.out_of_room() {
            self.reset_memory(ResetReason::MemoryExhausted);
            return;
        }
        self.stats.adds += 1;

        let pattern = self.order.pattern(aggr, win_ranks);
        node.least_win = pattern.least_win;
        if !keep_best_move {
            node.best_move_rank = 0;
        }

        let Some(len_node) = self.find_or_add_len_node(trick, seat, suit_lengths(hand_dist)) else {
            return;
        };
        let Some((leaf, existed)) = self.insert_pattern(len_node, &pattern) else {
            return;
        };

        let stored = if existed {
            self.win_nodes.get(leaf).and_then(|w| w.node)
        } else {
            None
        };
        match stored.and_then(|h| self.nodes.get_mut(h)) {
            Some(stored) => tighten(stored, &node, keep_best_move),
            None => {
                let h = self.nodes.alloc(node);
                if let Some(win) = self.win_nodes.get_mut(leaf) {
                    win.node = Some(h);
                }
            }
        }
        self.stats.entries = self.nodes.len() as u64;
    }

    fn stats(&self) -> TtStats {
        TtStats {
            entries: self.nodes.len() as u64,
            ..self.stats
        }
    }
}
