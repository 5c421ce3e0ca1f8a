//! Errors reported by the solve entry points
//!
//! Every variant maps to the classic numeric return code through
//! [`SolveError::code`].

use thiserror::Error;

/// Return code of a successful solve
pub const RETURN_NO_FAULT: i32 = 1;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SolveError {
    #[error("unknown fault")]
    Unknown,
    #[error("no cards left to play")]
    ZeroCards,
    #[error("target {target} exceeds the {tricks} tricks left")]
    TargetTooHigh { target: i32, tricks: i32 },
    #[error("a card is held by more than one hand")]
    DuplicateCards,
    #[error("target {0} is below -1")]
    TargetWrongLo(i32),
    #[error("target {0} is above 13")]
    TargetWrongHi(i32),
    #[error("solutions {0} is below 1")]
    SolutionsWrongLo(i32),
    #[error("solutions {0} is above 3")]
    SolutionsWrongHi(i32),
    #[error("more than 52 cards")]
    TooManyCards,
    #[error("bad suit or rank in the current trick or a holding")]
    SuitOrRank,
    #[error("a card played to the current trick is still held")]
    PlayedCard,
    #[error("hands hold different numbers of cards")]
    CardCount,
    #[error("slot index {0} out of range")]
    ThreadIndex(usize),
    #[error("mode {0} is below 0")]
    ModeWrongLo(i32),
    #[error("mode {0} is above 2")]
    ModeWrongHi(i32),
    #[error("trump {0} is not 0..4")]
    TrumpWrong(usize),
    #[error("leader {0} is not 0..3")]
    FirstWrong(usize),
    #[error("cannot parse deal {0:?}")]
    Pbn(String),
    #[error("cannot start worker pool: {0}")]
    ThreadCreate(String),
}

impl SolveError {
    /// Numeric code for callers that expect the classic interface
    pub fn code(&self) -> i32 {
        match self {
            SolveError::Unknown => -1,
            SolveError::ZeroCards => -2,
            SolveError::TargetTooHigh { .. } => -3,
            SolveError::DuplicateCards => -4,
            SolveError::TargetWrongLo(_) => -5,
            SolveError::TargetWrongHi(_) => -7,
            SolveError::SolutionsWrongLo(_) => -8,
            SolveError::SolutionsWrongHi(_) => -9,
            SolveError::TooManyCards => -10,
            SolveError::SuitOrRank => -12,
            SolveError::PlayedCard => -13,
            SolveError::CardCount => -14,
            SolveError::ThreadIndex(_) => -15,
            SolveError::ModeWrongLo(_) => -16,
            SolveError::ModeWrongHi(_) => -17,
            SolveError::TrumpWrong(_) => -18,
            SolveError::FirstWrong(_) => -19,
            SolveError::Pbn(_) => -99,
            SolveError::ThreadCreate(_) => -101,
        }
    }
}
