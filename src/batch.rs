//! Batch evaluation across independent deals
//!
//! One shared rate schedule and base rate, one summary row per deal, in
//! input order regardless of which deals fail.

use serde::{Deserialize, Serialize};

use crate::deal::Deal;
use crate::rates::RateSchedule;
use crate::valuation::{DealEvaluator, DealResult, SolverConfig};

/// Summary of one batch run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// One row per input deal, in input order
    pub rows: Vec<DealResult>,
}

impl BatchSummary {
    pub fn new(rows: Vec<DealResult>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of deals whose valuation failed
    pub fn error_count(&self) -> usize {
        self.rows.iter().filter(|row| row.is_error()).count()
    }
}

/// Evaluates a collection of deals against one schedule and base rate
///
/// Deals are independent: each row is produced in isolation and a failed
/// deal surfaces as an error-marked row rather than aborting the run.
///
/// # Example
/// ```ignore
/// let runner = BatchRunner::new();
/// let summary = runner.run(&deals, Some(&schedule), 5.0);
///
/// for row in &summary.rows {
///     match row.xirr_pct {
///         Some(xirr) => println!("deal {}: {:.4}%", row.deal_id, xirr),
///         None => println!("deal {}: {}", row.deal_id, row.error.as_deref().unwrap_or("?")),
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct BatchRunner {
    evaluator: DealEvaluator,
}

impl BatchRunner {
    /// Create a runner with the default solver settings
    pub fn new() -> Self {
        Self {
            evaluator: DealEvaluator::default(),
        }
    }

    /// Create a runner with specific solver settings
    pub fn with_solver_config(config: SolverConfig) -> Self {
        Self {
            evaluator: DealEvaluator::new(config),
        }
    }

    /// Create a runner around a pre-built evaluator
    pub fn with_evaluator(evaluator: DealEvaluator) -> Self {
        Self { evaluator }
    }

    /// Get reference to the evaluator for per-deal work
    pub fn evaluator(&self) -> &DealEvaluator {
        &self.evaluator
    }

    /// Evaluate a single deal
    pub fn run_deal(
        &self,
        deal: &Deal,
        schedule: Option<&RateSchedule>,
        base_rate_pct: f64,
    ) -> DealResult {
        self.evaluator.evaluate_deal(deal, schedule, base_rate_pct)
    }

    /// Evaluate every deal, producing one row per deal in input order
    ///
    /// An empty slice yields an empty summary; a batch where every deal
    /// fails still yields a complete one.
    pub fn run(
        &self,
        deals: &[Deal],
        schedule: Option<&RateSchedule>,
        base_rate_pct: f64,
    ) -> BatchSummary {
        let rows = deals
            .iter()
            .map(|deal| self.evaluator.evaluate_deal(deal, schedule, base_rate_pct))
            .collect();

        BatchSummary::new(rows)
    }
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::{CashflowEntry, CashflowSeries, DealConfig};
    use crate::rates::RateObservation;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn healthy_deal(deal_id: u32) -> Deal {
        Deal::new(
            DealConfig::fixed(deal_id),
            CashflowSeries::new(vec![
                CashflowEntry::new(date(2025, 1, 1), -10_000.0),
                CashflowEntry::new(date(2026, 1, 1), 10_500.0),
            ]),
        )
    }

    fn poison_deal(deal_id: u32) -> Deal {
        // Collapses the Newton iteration below -100%
        Deal::new(
            DealConfig::fixed(deal_id),
            CashflowSeries::new(vec![
                CashflowEntry::new(date(2025, 1, 1), -1_000.0),
                CashflowEntry::new(date(2026, 1, 1), 10.0),
            ]),
        )
    }

    #[test]
    fn test_summary_preserves_input_order_and_length() {
        let deals = vec![healthy_deal(30), poison_deal(10), healthy_deal(20)];

        let summary = BatchRunner::new().run(&deals, None, 5.0);

        assert_eq!(summary.len(), 3);
        assert_eq!(summary.rows[0].deal_id, 30);
        assert_eq!(summary.rows[1].deal_id, 10);
        assert_eq!(summary.rows[2].deal_id, 20);

        assert!(!summary.rows[0].is_error());
        assert!(summary.rows[1].is_error());
        assert!(!summary.rows[2].is_error());
        assert_eq!(summary.error_count(), 1);
    }

    #[test]
    fn test_all_failures_still_produce_a_complete_summary() {
        let deals = vec![poison_deal(1), poison_deal(2)];

        let summary = BatchRunner::new().run(&deals, None, 5.0);

        assert_eq!(summary.len(), 2);
        assert_eq!(summary.error_count(), 2);
        for row in &summary.rows {
            assert_eq!(row.xirr_pct, None);
            assert!(row.error.is_some());
        }
    }

    #[test]
    fn test_empty_batch_yields_empty_summary() {
        let summary = BatchRunner::new().run(&[], None, 5.0);
        assert!(summary.is_empty());
        assert_eq!(summary.error_count(), 0);
    }

    #[test]
    fn test_mixed_rate_types_share_one_schedule() {
        let schedule = RateSchedule::new(vec![
            RateObservation::new(date(2025, 1, 1), 5.0),
            RateObservation::new(date(2025, 7, 20), 5.5),
        ]);

        let floating = Deal::new(
            DealConfig::floating(2, date(2025, 1, 1)),
            CashflowSeries::new(vec![
                CashflowEntry::new(date(2025, 1, 1), -10_000.0),
                CashflowEntry::new(date(2026, 1, 1), 10_500.0),
            ]),
        );
        let deals = vec![healthy_deal(1), floating];

        let summary = BatchRunner::new().run(&deals, Some(&schedule), 5.0);

        let fixed_xirr = summary.rows[0].xirr_pct.unwrap();
        let floating_xirr = summary.rows[1].xirr_pct.unwrap();

        assert!((fixed_xirr - 5.0).abs() < 1e-4, "Expected ~5%, got {}", fixed_xirr);
        assert!(
            (floating_xirr - 5.5).abs() < 1e-4,
            "Expected ~5.5%, got {}",
            floating_xirr
        );

        let spread = summary.rows[1].spread_pct.unwrap();
        assert!((spread - 0.5).abs() < 1e-4);
    }
}
