//! Transposition table for large memory budgets
//!
//! Entries for one (trick, hand on lead, suit lengths) key share a block of
//! pattern matches. Keys hash into 256 buckets per (trick, hand). Blocks
//! come from pages in a pool; when the pool is at its limit, blocks of the
//! later tricks that have not been read for a while are harvested and
//! reused before the table gives up and resets. The first tricks of a deal
//! are never harvested.

use tracing::debug;

use super::arena::{Arena, Handle};
use super::config::{THREADMEM_LARGE_DEF_MB, THREADMEM_LARGE_MAX_MB};
use super::position::HandLookup;
use super::trans_table::*;
use super::types::*;

const NUM_BUCKETS: usize = 256;
/// Keys per bucket before the oldest is overwritten
const BUCKET_SIZE: usize = 32;
/// Matches per block before the oldest is overwritten
const BLOCK_SIZE: usize = 125;
/// Blocks per page
const PAGE_BLOCKS: usize = 1000;
/// Highest trick index whose blocks are harvested; the walk goes down
/// from here to trick 0 and wraps
const FIRST_HARVEST_TRICK: usize = 8;
/// Lookups since a block was last read before it can be harvested
const HARVEST_AGE: u64 = 10_000;

#[derive(Clone, Copy)]
struct Match {
    top_set: [u32; NUM_SUITS],
    top_mask: [u32; NUM_SUITS],
    node: NodeCards,
}

impl Match {
    #[inline]
    fn matches(&self, query: &[u32; NUM_SUITS]) -> bool {
        (0..NUM_SUITS).all(|s| query[s] & self.top_mask[s] == self.top_set[s])
    }
}

struct Block {
    matches: Vec<Match>,
    next_write: usize,
    timestamp_read: u64,
}

impl Block {
    fn new(now: u64) -> Self {
        Block {
            matches: Vec::with_capacity(BLOCK_SIZE),
            next_write: 0,
            timestamp_read: now,
        }
    }

    fn reuse(&mut self, now: u64) {
        self.matches.clear();
        self.next_write = 0;
        self.timestamp_read = now;
    }
}

#[derive(Default, Clone)]
struct Bucket {
    entries: Vec<(u64, Handle)>,
    next_write: usize,
}

pub struct TransTableL {
    /// `[trick][seat]`, each with `NUM_BUCKETS` buckets once used
    roots: Vec<Vec<Vec<Bucket>>>,
    blocks: Arena<Block>,
    free: Vec<Handle>,
    order: OrderTables,
    default_mb: usize,
    max_mb: usize,
    clock: u64,
    /// Next (trick, hand) root the harvest walk visits
    harvest_at: (usize, Seat),
    stats: TtStats,
}

impl Default for TransTableL {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn hash8(key: u64) -> usize {
    key.to_le_bytes().iter().fold(0u8, |acc, &b| acc ^ b) as usize
}

/// Harvest walk order: every hand of a trick, then the trick below it
fn next_harvest_root(trick: usize, seat: Seat) -> (usize, Seat) {
    if seat + 1 < NUM_SEATS {
        (trick, seat + 1)
    } else if trick == 0 {
        (FIRST_HARVEST_TRICK, NORTH)
    } else {
        (trick - 1, NORTH)
    }
}

fn page_bytes() -> usize {
    PAGE_BLOCKS * (std::mem::size_of::<Block>() + BLOCK_SIZE * std::mem::size_of::<Match>())
}

impl TransTableL {
    pub fn new() -> Self {
        TransTableL {
            roots: Self::empty_roots(),
            blocks: Arena::new(PAGE_BLOCKS, PAGE_BLOCKS),
            free: Vec::new(),
            order: OrderTables::new(),
            default_mb: THREADMEM_LARGE_DEF_MB,
            max_mb: THREADMEM_LARGE_MAX_MB,
            clock: 0,
            harvest_at: (FIRST_HARVEST_TRICK, NORTH),
            stats: TtStats::default(),
        }
    }

    fn empty_roots() -> Vec<Vec<Vec<Bucket>>> {
        vec![vec![Vec::new(); NUM_SEATS]; TT_TRICKS]
    }

    /// Pages the budget allows, at least one
    fn max_pages(&self) -> usize {
        ((self.max_mb << 20) / page_bytes()).max(1)
    }

    fn find_block(&self, trick: usize, seat: Seat, key: u64) -> Option<Handle> {
        let buckets = self.roots.get(trick)?.get(seat)?;
        let bucket = buckets.get(hash8(key))?;
        bucket
            .entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|&(_, h)| h)
    }

    /// Free up to a page of blocks nobody has read lately. Visits the
    /// (trick, hand) roots of the later tricks in turn, starting where the
    /// previous harvest stopped, until a page is collected or every root
    /// has been seen once.
    fn harvest(&mut self) -> usize {
        let mut released = 0;
        for _ in 0..(FIRST_HARVEST_TRICK + 1) * NUM_SEATS {
            let (trick, seat) = self.harvest_at;
            released += self.harvest_root(trick, seat, PAGE_BLOCKS - released);
            self.harvest_at = next_harvest_root(trick, seat);
            if released >= PAGE_BLOCKS {
                break;
            }
        }
        self.stats.harvested += released as u64;
        debug!(blocks = released, free = self.free.len(), "large table harvest");
        released
    }

    /// Unlink stale blocks of one root and put them on the free list
    fn harvest_root(&mut self, trick: usize, seat: Seat, room: usize) -> usize {
        let now = self.clock;
        let blocks = &self.blocks;
        let free = &mut self.free;
        let Some(buckets) = self.roots.get_mut(trick).and_then(|r| r.get_mut(seat)) else {
            return 0;
        };
        let mut released = 0;
        for bucket in buckets.iter_mut() {
            let mut i = 0;
            while i < bucket.entries.len() && released < room {
                let h = bucket.entries[i].1;
                let stale = blocks
                    .get(h)
                    .map_or(false, |b| now.saturating_sub(b.timestamp_read) > HARVEST_AGE);
                if stale {
                    bucket.entries.swap_remove(i);
                    free.push(h);
                    released += 1;
                } else {
                    i += 1;
                }
            }
            bucket.next_write = bucket.next_write.min(bucket.entries.len());
        }
        released
    }

    /// A block to fill, or None when the table had to reset
    fn get_block(&mut self) -> Option<Handle> {
        let now = self.clock;
        if self.free.is_empty()
            && self.blocks.needs_slab()
            && self.blocks.slab_count() >= self.max_pages()
            && self.harvest() == 0
        {
            self.reset_memory(ResetReason::MemoryExhausted);
            return None;
        }
        match self.free.pop() {
            Some(h) => {
                self.blocks.get_mut(h)?.reuse(now);
                Some(h)
            }
            None => Some(self.blocks.alloc(Block::new(now))),
        }
    }

    /// Block for the key, created (or taken over from the oldest key of a
    /// full bucket) when missing
    fn block_for_add(&mut self, trick: usize, seat: Seat, key: u64) -> Option<Handle> {
        if let Some(h) = self.find_block(trick, seat, key) {
            return Some(h);
        }
        let bucket_index = hash8(key);
        if self.roots[trick][seat].is_empty() {
            self.roots[trick][seat] = vec![Bucket::default(); NUM_BUCKETS];
        }

        let full = self.roots[trick][seat][bucket_index].entries.len() >= BUCKET_SIZE;
        if full {
            let now = self.clock;
            let bucket = &mut self.roots[trick][seat][bucket_index];
            let slot = bucket.next_write % BUCKET_SIZE;
            bucket.next_write = (slot + 1) % BUCKET_SIZE;
            let h = bucket.entries[slot].1;
            bucket.entries[slot].0 = key;
            self.blocks.get_mut(h)?.reuse(now);
            return Some(h);
        }

        let h = self.get_block()?;
        let bucket = self.roots[trick][seat].get_mut(bucket_index)?;
        bucket.entries.push((key, h));
        Some(h)
    }
}

impl TransTable for TransTableL {
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
        self.roots = Self::empty_roots();
        self.blocks.reset();
        self.free.clear();
        self.clock = 0;
        self.harvest_at = (FIRST_HARVEST_TRICK, NORTH);
    }

    fn reset_memory(&mut self, reason: ResetReason) {
        debug!(
            reason = reason.name(),
            blocks = self.blocks.len(),
            harvested = self.stats.harvested,
            default_mb = self.default_mb,
            kb = self.memory_in_use(),
            "large table reset"
        );
        self.make_tt();
        self.stats.resets[reason.index()] += 1;
    }

    fn return_all_memory(&mut self) {
        self.roots = Self::empty_roots();
        self.blocks.release();
        self.free = Vec::new();
        self.harvest_at = (FIRST_HARVEST_TRICK, NORTH);
        self.stats.resets[ResetReason::FreeMemory.index()] += 1;
    }

    fn memory_in_use(&self) -> usize {
        (self.blocks.slab_count() * page_bytes()) / 1024
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
        self.clock += 1;
        let Some(h) = self.find_block(trick, seat, suit_lengths(hand_dist)) else {
            return TtLookup::Miss;
        };
        let query = self.order.query(aggr);
        let now = self.clock;
        let Some(block) = self.blocks.get_mut(h) else {
            return TtLookup::Miss;
        };
        block.timestamp_read = now;

        let mut hint = None;
        for m in block.matches.iter().rev() {
            if !m.matches(&query) {
                continue;
            }
            if let Some(lower_flag) = decide(&m.node, limit) {
                self.stats.hits += 1;
                return TtLookup::Hit {
                    node: m.node,
                    lower_flag,
                };
            }
            if hint.is_none() && m.node.best_move_rank != 0 {
                hint = Some(m.node);
            }
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
        let pattern = self.order.pattern(aggr, win_ranks);
        node.least_win = pattern.least_win;
        if !keep_best_move {
            node.best_move_rank = 0;
        }

        let Some(h) = self.block_for_add(trick, seat, suit_lengths(hand_dist)) else {
            return;
        };
        let Some(block) = self.blocks.get_mut(h) else {
            return;
        };
        self.stats.adds += 1;

        let existing = block
            .matches
            .iter_mut()
            .find(|m| m.top_set == pattern.order_set && m.top_mask == pattern.win_mask);
        if let Some(m) = existing {
            tighten(&mut m.node, &node, keep_best_move);
            return;
        }

        let fresh = Match {
            top_set: pattern.order_set,
            top_mask: pattern.win_mask,
            node,
        };
        if block.matches.len() < BLOCK_SIZE {
            block.matches.push(fresh);
        } else {
            let slot = block.next_write % BLOCK_SIZE;
            block.matches[slot] = fresh;
            block.next_write = (slot + 1) % BLOCK_SIZE;
        }
        self.stats.entries += 1;
    }

    fn stats(&self) -> TtStats {
        self.stats
    }
}
