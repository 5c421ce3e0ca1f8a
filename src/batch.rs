//! Solving many boards at once
//!
//! Boards are independent: each worker owns a [`SolveSlot`] and nothing is
//! shared between workers. Results always come back in input order.

use rayon::prelude::*;
use tracing::info;

use super::config::{SolverConfig, ThreadBackend};
use super::deal::{Board, DdTable, FutureTricks};
use super::error::SolveError;
use super::hands::Hands;
use super::slot::SolveSlot;

/// Runs independent jobs, each on a slot owned by the worker that runs it
pub trait BoardRunner: Send + Sync {
    fn name(&self) -> &'static str;

    fn solve_boards(&self, boards: &[Board]) -> Result<Vec<FutureTricks>, SolveError>;

    fn calc_tables(&self, deals: &[Hands]) -> Result<Vec<DdTable>, SolveError>;
}

/// Everything on the calling thread with a single slot
pub struct SequentialRunner {
    config: SolverConfig,
}

impl SequentialRunner {
    pub fn new(config: &SolverConfig) -> Self {
        SequentialRunner {
            config: config.clone(),
        }
    }
}

impl BoardRunner for SequentialRunner {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn solve_boards(&self, boards: &[Board]) -> Result<Vec<FutureTricks>, SolveError> {
        let mut slot = SolveSlot::new(&self.config);
        boards
            .iter()
            .map(|b| slot.solve_board(&b.deal, b.target, b.solutions, b.mode))
            .collect()
    }

    fn calc_tables(&self, deals: &[Hands]) -> Result<Vec<DdTable>, SolveError> {
        let mut slot = SolveSlot::new(&self.config);
        deals.iter().map(|hands| slot.calc_dd_table(hands)).collect()
    }
}

/// A private rayon pool; every worker builds its own slot
pub struct RayonRunner {
    config: SolverConfig,
    pool: rayon::ThreadPool,
}

impl RayonRunner {
    pub fn new(config: &SolverConfig) -> Result<Self, SolveError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.actual_threads())
            .thread_name(|i| format!("dds-worker-{i}"))
            .build()
            .map_err(|e| SolveError::ThreadCreate(e.to_string()))?;
        Ok(RayonRunner {
            config: config.clone(),
            pool,
        })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl BoardRunner for RayonRunner {
    fn name(&self) -> &'static str {
        "rayon"
    }

    fn solve_boards(&self, boards: &[Board]) -> Result<Vec<FutureTricks>, SolveError> {
        let config = &self.config;
        self.pool.install(|| {
            boards
                .par_iter()
                .map_init(
                    || SolveSlot::new(config),
                    |slot, b| slot.solve_board(&b.deal, b.target, b.solutions, b.mode),
                )
                .collect()
        })
    }

    fn calc_tables(&self, deals: &[Hands]) -> Result<Vec<DdTable>, SolveError> {
        let config = &self.config;
        self.pool.install(|| {
            deals
                .par_iter()
                .map_init(|| SolveSlot::new(config), |slot, hands| slot.calc_dd_table(hands))
                .collect()
        })
    }
}

/// The runner the configuration asks for
pub fn runner_for(config: &SolverConfig) -> Result<Box<dyn BoardRunner>, SolveError> {
    let runner: Box<dyn BoardRunner> = match config.backend {
        ThreadBackend::Sequential => Box::new(SequentialRunner::new(config)),
        ThreadBackend::Rayon => Box::new(RayonRunner::new(config)?),
    };
    Ok(runner)
}

/// Solve every board; the first error fails the batch
pub fn solve_all_boards(
    boards: &[Board],
    config: &SolverConfig,
) -> Result<Vec<FutureTricks>, SolveError> {
    let runner = runner_for(config)?;
    info!(boards = boards.len(), runner = runner.name(), "solving boards");
    let results = runner.solve_boards(boards)?;
    let nodes: u64 = results.iter().map(|f| f.nodes).sum();
    info!(boards = results.len(), nodes, "boards solved");
    Ok(results)
}

/// Double-dummy tables for every deal
pub fn calc_all_tables(deals: &[Hands], config: &SolverConfig) -> Result<Vec<DdTable>, SolveError> {
    let runner = runner_for(config)?;
    info!(deals = deals.len(), runner = runner.name(), "calculating tables");
    let tables = runner.calc_tables(deals)?;
    info!(tables = tables.len(), "tables done");
    Ok(tables)
}

/// Slots addressed by index, for callers that run their own threads
pub struct SolverPool {
    slots: Vec<SolveSlot>,
}

impl SolverPool {
    pub fn new(config: &SolverConfig) -> Self {
        let slots = (0..config.actual_threads())
            .map(|_| SolveSlot::new(config))
            .collect();
        SolverPool { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&mut self, index: usize) -> Result<&mut SolveSlot, SolveError> {
        self.slots
            .get_mut(index)
            .ok_or(SolveError::ThreadIndex(index))
    }

    pub fn solve_board(
        &mut self,
        index: usize,
        board: &Board,
    ) -> Result<FutureTricks, SolveError> {
        self.slot(index)?
            .solve_board(&board.deal, board.target, board.solutions, board.mode)
    }

    pub fn calc_dd_table(&mut self, index: usize, hands: &Hands) -> Result<DdTable, SolveError> {
        self.slot(index)?.calc_dd_table(hands)
    }

    /// Give every slot's table memory back
    pub fn free_memory(&mut self) {
        for slot in &mut self.slots {
            slot.free_memory();
        }
    }
}
