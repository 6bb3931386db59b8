//! AWS Lambda handler for multi-deal XIRR valuation
//!
//! Accepts the whole run as JSON (deals, optional BBSY schedule, solver
//! settings) and returns the batch summary plus per-deal adjusted
//! cash-flow tables.

use chrono::NaiveDate;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use xirr_engine::valuation::{
    AdjustedCashflow, DealEvaluator, DealResult, SolverConfig, DEFAULT_INITIAL_GUESS,
    DEFAULT_MAX_ITERATIONS,
};
use xirr_engine::{
    CashflowEntry, CashflowSeries, Deal, DealConfig, FlowKind, RateObservation, RateSchedule,
    RateType,
};

/// Input for one valuation run
#[derive(Debug, Deserialize)]
pub struct ValuationRequest {
    /// Deals to evaluate, in summary order
    pub deals: Vec<DealInput>,

    /// BBSY observations shared by every floating deal
    #[serde(default)]
    pub bbsy: Vec<RateObservationInput>,

    /// Base rate in percent for the spread column (default: 5%)
    #[serde(default = "default_base_rate")]
    pub base_rate_pct: f64,

    /// Newton-Raphson starting rate as a fraction (default: 0.10)
    #[serde(default = "default_initial_guess")]
    pub initial_guess: f64,

    /// Newton-Raphson iteration budget (default: 100)
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Optional convergence tolerance on successive rates
    #[serde(default)]
    pub tolerance: Option<f64>,

    /// Include per-deal adjusted cash-flow tables in the response
    #[serde(default = "default_true")]
    pub include_tables: bool,
}

fn default_base_rate() -> f64 { 5.0 }
fn default_initial_guess() -> f64 { DEFAULT_INITIAL_GUESS }
fn default_max_iterations() -> u32 { DEFAULT_MAX_ITERATIONS }
fn default_true() -> bool { true }

/// One deal in the request
#[derive(Debug, Deserialize)]
pub struct DealInput {
    pub deal_id: u32,

    /// "Fixed" or "Floating"
    pub rate_type: RateType,

    /// Reset anniversary; floating deals without one pass through unadjusted
    #[serde(default)]
    pub anniversary_date: Option<NaiveDate>,

    pub cashflows: Vec<FlowInput>,
}

impl DealInput {
    fn to_deal(self) -> Deal {
        let entries = self
            .cashflows
            .into_iter()
            .map(|flow| flow.to_entry())
            .collect();

        Deal::new(
            DealConfig {
                deal_id: self.deal_id,
                rate_type: self.rate_type,
                anniversary_date: self.anniversary_date,
            },
            CashflowSeries::new(entries),
        )
    }
}

/// One cash flow in the request
#[derive(Debug, Deserialize)]
pub struct FlowInput {
    pub date: NaiveDate,
    pub amount: f64,

    /// "Outflow" or "Inflow"; derived from the sign when absent
    #[serde(default)]
    pub kind: Option<FlowKind>,
}

impl FlowInput {
    fn to_entry(self) -> CashflowEntry {
        CashflowEntry {
            date: self.date,
            amount: self.amount,
            kind: self.kind.unwrap_or_else(|| FlowKind::from_amount(self.amount)),
        }
    }
}

/// One BBSY observation in the request
#[derive(Debug, Deserialize)]
pub struct RateObservationInput {
    pub date: NaiveDate,
    pub rate_pct: f64,
}

impl RateObservationInput {
    fn to_observation(self) -> RateObservation {
        RateObservation::new(self.date, self.rate_pct)
    }
}

/// Output of one valuation run
#[derive(Debug, Serialize)]
pub struct ValuationResponse {
    pub deal_count: usize,
    pub error_count: usize,
    pub base_rate_pct: f64,
    pub summary: Vec<DealResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deal_tables: Vec<DealTable>,
    pub execution_time_ms: u64,
}

/// Per-deal adjusted cash flows, as valued
#[derive(Debug, Serialize)]
pub struct DealTable {
    pub deal_id: u32,
    pub rate_type: RateType,
    pub flows: Vec<AdjustedCashflow>,
}

/// Lambda handler function
async fn handler(event: LambdaEvent<ValuationRequest>) -> Result<ValuationResponse, Error> {
    let start = std::time::Instant::now();
    let (request, _context) = event.into_parts();

    let schedule: Option<RateSchedule> = if request.bbsy.is_empty() {
        None
    } else {
        Some(RateSchedule::new(
            request
                .bbsy
                .into_iter()
                .map(|obs| obs.to_observation())
                .collect(),
        ))
    };

    let deals: Vec<Deal> = request
        .deals
        .into_iter()
        .map(|deal| deal.to_deal())
        .collect();

    let evaluator = DealEvaluator::new(SolverConfig {
        initial_guess: request.initial_guess,
        max_iterations: request.max_iterations,
        tolerance: request.tolerance,
    });

    // Value deals in parallel; collect preserves request order
    let summary: Vec<DealResult> = deals
        .par_iter()
        .map(|deal| evaluator.evaluate_deal(deal, schedule.as_ref(), request.base_rate_pct))
        .collect();

    let deal_tables: Vec<DealTable> = if request.include_tables {
        deals
            .iter()
            .map(|deal| DealTable {
                deal_id: deal.deal_id(),
                rate_type: deal.config.rate_type,
                flows: evaluator
                    .prepare_series(&deal.config, &deal.cashflows, schedule.as_ref())
                    .flows,
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(ValuationResponse {
        deal_count: summary.len(),
        error_count: summary.iter().filter(|row| row.is_error()).count(),
        base_rate_pct: request.base_rate_pct,
        summary,
        deal_tables,
        execution_time_ms: start.elapsed().as_millis() as u64,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    run(service_fn(handler)).await
}
