//! XIRR Engine - Multi-deal annualized return valuation with BBSY resets
//!
//! This library provides:
//! - Newton-Raphson XIRR over irregularly dated cash flows (Actual/365)
//! - Floating-rate cash-flow adjustment against a shared BBSY schedule
//! - Per-deal evaluation with spread ("ups") over a caller-supplied base rate
//! - Order-preserving batch runs where failed deals surface as tagged rows

pub mod batch;
pub mod deal;
pub mod rates;
pub mod valuation;

// Re-export commonly used types
pub use batch::{BatchRunner, BatchSummary};
pub use deal::{CashflowEntry, CashflowSeries, Deal, DealConfig, FlowKind, RateType};
pub use rates::{RateObservation, RateSchedule};
pub use valuation::{DealEvaluator, DealResult, SolverConfig, XirrSolver};
