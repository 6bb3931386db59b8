//! Valuation pipeline: reset adjustment, XIRR solving, per-deal evaluation

mod adjust;
mod evaluator;
mod xirr;

pub use adjust::{apply_resets, AdjustedCashflow, AdjustedCashflowSeries};
pub use evaluator::{DealEvaluator, DealResult, EvaluationError};
pub use xirr::{
    SolverConfig, ValuationError, XirrSolver, DEFAULT_INITIAL_GUESS, DEFAULT_MAX_ITERATIONS,
};
