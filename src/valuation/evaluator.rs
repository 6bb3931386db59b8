//! Per-deal valuation: reset adjustment, XIRR, and spread over a base rate

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::adjust::{apply_resets, AdjustedCashflowSeries};
use super::xirr::{SolverConfig, ValuationError, XirrSolver};
use crate::deal::{CashflowSeries, Deal, DealConfig, RateType};
use crate::rates::RateSchedule;

/// Valuation failure scoped to a single deal
#[derive(Debug, Clone, PartialEq, Error)]
#[error("deal {deal_id}: {source}")]
pub struct EvaluationError {
    /// Deal that failed
    pub deal_id: u32,
    /// Underlying solver failure
    #[source]
    pub source: ValuationError,
}

/// One row of a batch summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealResult {
    /// Deal identifier, in input order
    pub deal_id: u32,
    /// Annualized return in percent; None when valuation failed
    pub xirr_pct: Option<f64>,
    /// Base rate the spread is measured against, in percent
    pub base_rate_pct: f64,
    /// Ups: `xirr_pct - base_rate_pct`; None when valuation failed
    pub spread_pct: Option<f64>,
    /// Failure rendered for display; None on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DealResult {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Values one deal at a time
///
/// Floating deals with a schedule are reset-adjusted first; fixed deals and
/// incompletely configured floating deals are valued exactly as supplied.
/// Fixed deals never touch the rate schedule.
#[derive(Debug, Clone, Default)]
pub struct DealEvaluator {
    solver: XirrSolver,
}

impl DealEvaluator {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            solver: XirrSolver::new(config),
        }
    }

    pub fn with_solver(solver: XirrSolver) -> Self {
        Self { solver }
    }

    /// The series this deal is valued on
    ///
    /// Also used to render per-deal adjusted tables, so display and
    /// valuation can never disagree.
    pub fn prepare_series(
        &self,
        config: &DealConfig,
        series: &CashflowSeries,
        schedule: Option<&RateSchedule>,
    ) -> AdjustedCashflowSeries {
        match (config.rate_type, schedule) {
            (RateType::Floating, Some(schedule)) => {
                apply_resets(series, Some(schedule), config.anniversary_date)
            }
            _ => AdjustedCashflowSeries::passthrough(series),
        }
    }

    /// Typed evaluation: annualized return in percent, or the failure
    pub fn try_evaluate(
        &self,
        config: &DealConfig,
        series: &CashflowSeries,
        schedule: Option<&RateSchedule>,
    ) -> Result<f64, EvaluationError> {
        let prepared = self.prepare_series(config, series, schedule);

        self.solver
            .solve(&prepared)
            .map(|rate| rate * 100.0)
            .map_err(|source| EvaluationError {
                deal_id: config.deal_id,
                source,
            })
    }

    /// Evaluate one deal into a summary row
    ///
    /// A failure lands in the row's `error` field; it never propagates, so
    /// one bad deal cannot take down a batch.
    pub fn evaluate(
        &self,
        config: &DealConfig,
        series: &CashflowSeries,
        schedule: Option<&RateSchedule>,
        base_rate_pct: f64,
    ) -> DealResult {
        match self.try_evaluate(config, series, schedule) {
            Ok(xirr_pct) => DealResult {
                deal_id: config.deal_id,
                xirr_pct: Some(xirr_pct),
                base_rate_pct,
                spread_pct: Some(xirr_pct - base_rate_pct),
                error: None,
            },
            Err(err) => {
                log::warn!("valuation failed: {}", err);
                DealResult {
                    deal_id: config.deal_id,
                    xirr_pct: None,
                    base_rate_pct,
                    spread_pct: None,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    /// Evaluate a bundled deal
    pub fn evaluate_deal(
        &self,
        deal: &Deal,
        schedule: Option<&RateSchedule>,
        base_rate_pct: f64,
    ) -> DealResult {
        self.evaluate(&deal.config, &deal.cashflows, schedule, base_rate_pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::CashflowEntry;
    use crate::rates::RateObservation;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn five_percent_series() -> CashflowSeries {
        CashflowSeries::new(vec![
            CashflowEntry::new(date(2025, 1, 1), -10_000.0),
            CashflowEntry::new(date(2026, 1, 1), 10_500.0),
        ])
    }

    fn two_step_schedule() -> RateSchedule {
        RateSchedule::new(vec![
            RateObservation::new(date(2025, 1, 1), 5.0),
            RateObservation::new(date(2025, 7, 20), 5.5),
        ])
    }

    #[test]
    fn test_fixed_deal_ignores_the_schedule() {
        let evaluator = DealEvaluator::default();
        let series = five_percent_series();

        let with_schedule = evaluator
            .try_evaluate(&DealConfig::fixed(1), &series, Some(&two_step_schedule()))
            .unwrap();
        let raw = XirrSolver::default().solve_raw(&series).unwrap() * 100.0;

        assert_eq!(with_schedule, raw);
        assert!((with_schedule - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_floating_deal_values_adjusted_amounts() {
        // Day-0 flow resets at 5%, day-365 flow at 5.5%, which moves the
        // valued series to [-10500, +11077.5] and the return to 5.5%
        let evaluator = DealEvaluator::default();
        let config = DealConfig::floating(2, date(2025, 1, 1));

        let xirr_pct = evaluator
            .try_evaluate(&config, &five_percent_series(), Some(&two_step_schedule()))
            .unwrap();

        assert!((xirr_pct - 5.5).abs() < 1e-4, "Expected ~5.5%, got {}", xirr_pct);
    }

    #[test]
    fn test_floating_deal_without_schedule_passes_through() {
        let evaluator = DealEvaluator::default();
        let config = DealConfig::floating(3, date(2025, 1, 1));

        let xirr_pct = evaluator
            .try_evaluate(&config, &five_percent_series(), None)
            .unwrap();

        assert!((xirr_pct - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_spread_is_measured_against_base_rate() {
        let evaluator = DealEvaluator::default();
        let result = evaluator.evaluate(
            &DealConfig::fixed(4),
            &five_percent_series(),
            None,
            3.0,
        );

        assert!(!result.is_error());
        assert_eq!(result.base_rate_pct, 3.0);
        let spread = result.spread_pct.unwrap();
        assert!((spread - 2.0).abs() < 1e-4, "Expected ~2%, got {}", spread);
    }

    #[test]
    fn test_failure_is_contained_in_the_row() {
        // Tiny recovery on a large outlay collapses the iteration
        let series = CashflowSeries::new(vec![
            CashflowEntry::new(date(2025, 1, 1), -1_000.0),
            CashflowEntry::new(date(2026, 1, 1), 10.0),
        ]);

        let evaluator = DealEvaluator::default();
        let result = evaluator.evaluate(&DealConfig::fixed(5), &series, None, 5.0);

        assert!(result.is_error());
        assert_eq!(result.deal_id, 5);
        assert_eq!(result.xirr_pct, None);
        assert_eq!(result.spread_pct, None);
        assert_eq!(result.base_rate_pct, 5.0);
    }

    #[test]
    fn test_evaluation_error_names_the_deal() {
        let series = CashflowSeries::new(vec![
            CashflowEntry::new(date(2025, 1, 1), -1_000.0),
            CashflowEntry::new(date(2026, 1, 1), 10.0),
        ]);

        let err = DealEvaluator::default()
            .try_evaluate(&DealConfig::fixed(7), &series, None)
            .unwrap_err();

        assert_eq!(err.deal_id, 7);
        assert!(err.to_string().contains("deal 7"));
    }
}
