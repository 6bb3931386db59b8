//! XIRR (annualized internal rate of return) for dated cash flows
//!
//! Used to value each deal's series on an Actual/365 day count measured
//! from its earliest flow

use chrono::NaiveDate;
use thiserror::Error;

use super::adjust::AdjustedCashflowSeries;
use crate::deal::CashflowSeries;

/// Starting rate for the Newton-Raphson iteration (10% annualized)
pub const DEFAULT_INITIAL_GUESS: f64 = 0.10;

/// Number of Newton-Raphson steps to run
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Days per year under the Actual/365 day count
const DAYS_PER_YEAR: f64 = 365.0;

/// Failure raised while iterating on the discounted value
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValuationError {
    /// The candidate rate reached -100% or below, so the discount base
    /// `1 + rate` is non-positive and fractional powers of it have no
    /// real value
    #[error("discount base 1 + rate is non-positive at iteration {iteration} (rate = {rate})")]
    ArithmeticFailure { rate: f64, iteration: u32 },
}

/// Solver settings
///
/// The contract is a fixed iteration budget: the solver runs every step and
/// returns the final iterate, stopping early only when the derivative
/// vanishes exactly. `tolerance` layers an optional convergence stop on top
/// of that (off by default, so two runs over the same series always take
/// the same path).
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Starting rate as a fraction (0.10 for 10%)
    pub initial_guess: f64,
    /// Iteration budget
    pub max_iterations: u32,
    /// Optional early stop once successive rates differ by less than this
    pub tolerance: Option<f64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            initial_guess: DEFAULT_INITIAL_GUESS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: None,
        }
    }
}

/// Newton-Raphson XIRR solver over irregularly dated cash flows
///
/// Flows are sorted ascending by date and each is discounted by
/// `(1 + rate)^t`, where `t` is the Actual/365 year fraction from the
/// earliest date. Degenerate series (empty, single flow, or all flows on
/// one day) leave the derivative at zero on the first step, so the initial
/// guess comes back unchanged. One-signed series terminate like any other;
/// the rate they produce is simply not meaningful.
#[derive(Debug, Clone, Default)]
pub struct XirrSolver {
    config: SolverConfig,
}

impl XirrSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve on the adjusted amounts of a prepared series
    ///
    /// # Returns
    /// * `Ok(rate)` - annualized rate as a fraction (0.05 for 5%)
    /// * `Err(ValuationError)` - the iteration left the real domain
    pub fn solve(&self, series: &AdjustedCashflowSeries) -> Result<f64, ValuationError> {
        let flows: Vec<(NaiveDate, f64)> = series
            .flows
            .iter()
            .map(|flow| (flow.date, flow.adjusted_amount))
            .collect();
        self.newton(flows)
    }

    /// Solve directly on raw amounts, skipping any rate adjustment
    pub fn solve_raw(&self, series: &CashflowSeries) -> Result<f64, ValuationError> {
        let flows: Vec<(NaiveDate, f64)> = series
            .entries
            .iter()
            .map(|entry| (entry.date, entry.amount))
            .collect();
        self.newton(flows)
    }

    fn newton(&self, mut flows: Vec<(NaiveDate, f64)>) -> Result<f64, ValuationError> {
        flows.sort_by_key(|&(date, _)| date);

        let mut rate = self.config.initial_guess;

        for iteration in 0..self.config.max_iterations {
            // A non-positive base cannot be raised to a fractional power;
            // surface it instead of iterating on garbage
            if 1.0 + rate <= 0.0 {
                return Err(ValuationError::ArithmeticFailure { rate, iteration });
            }

            let (npv, dnpv) = npv_and_derivative(&flows, rate);

            if dnpv == 0.0 {
                log::debug!("derivative vanished at iteration {}; returning current rate", iteration);
                break;
            }

            let new_rate = rate - npv / dnpv;

            if let Some(eps) = self.config.tolerance {
                if (new_rate - rate).abs() < eps {
                    return Ok(new_rate);
                }
            }

            rate = new_rate;
        }

        Ok(rate)
    }
}

/// Calculate NPV and its derivative with respect to rate
///
/// Year fractions are measured from the first flow, so the earliest flow
/// contributes at full face value and nothing to the derivative.
fn npv_and_derivative(flows: &[(NaiveDate, f64)], rate: f64) -> (f64, f64) {
    if flows.is_empty() {
        return (0.0, 0.0);
    }

    let base_date = flows[0].0;
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for &(date, amount) in flows {
        let years = (date - base_date).num_days() as f64 / DAYS_PER_YEAR;
        npv += amount / (1.0 + rate).powf(years);
        dnpv -= years * amount / (1.0 + rate).powf(years + 1.0);
    }

    (npv, dnpv)
}
