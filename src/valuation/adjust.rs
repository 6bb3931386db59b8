//! Floating-rate adjustment of cash flows against a BBSY schedule

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::deal::{CashflowSeries, FlowKind};
use crate::rates::RateSchedule;

/// A cash flow after the reset adjustment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustedCashflow {
    /// Date the flow occurs
    pub date: NaiveDate,
    /// Raw amount as supplied
    pub amount: f64,
    /// Display classification carried over from the raw entry
    pub kind: FlowKind,
    /// Reset rate applied, in percent. None when the series passed through
    /// unadjusted or no observation covered this date
    pub reset_rate_pct: Option<f64>,
    /// Amount the valuation actually discounts:
    /// `amount * (1 + reset_rate_pct / 100)`
    pub adjusted_amount: f64,
}

/// One deal's cash flows after adjustment, ascending by date
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdjustedCashflowSeries {
    pub flows: Vec<AdjustedCashflow>,
}

impl AdjustedCashflowSeries {
    /// Sorted copy of `series` with every amount carried over unchanged
    pub fn passthrough(series: &CashflowSeries) -> Self {
        let flows = series
            .sorted_entries()
            .into_iter()
            .map(|entry| AdjustedCashflow {
                date: entry.date,
                amount: entry.amount,
                kind: entry.kind,
                reset_rate_pct: None,
                adjusted_amount: entry.amount,
            })
            .collect();

        Self { flows }
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Sum of the amounts the valuation will discount
    pub fn total_adjusted(&self) -> f64 {
        self.flows.iter().map(|flow| flow.adjusted_amount).sum()
    }
}

/// Rewrite a series against the reference-rate schedule before valuation
///
/// Each flow independently picks up the observation with the latest
/// effective date on or before its own date and is scaled by
/// `1 + rate / 100`. Flows dated before the first observation keep their
/// raw amount (rate treated as zero). When the schedule or the anniversary
/// date is missing the series passes through unadjusted rather than
/// failing, so an incompletely configured floating deal values like a
/// fixed one.
///
/// The anniversary date is required for the adjustment to run but does not
/// select which flows reset; every flow re-reads the schedule at its own
/// date. Periodic resets keyed off the anniversary would be a future
/// extension.
///
/// Pure function of its inputs: re-running it with the same series and
/// schedule yields identical adjusted amounts.
pub fn apply_resets(
    series: &CashflowSeries,
    schedule: Option<&RateSchedule>,
    anniversary_date: Option<NaiveDate>,
) -> AdjustedCashflowSeries {
    let schedule = match (schedule, anniversary_date) {
        (Some(schedule), Some(_)) => schedule,
        _ => {
            log::debug!("rate schedule or anniversary date missing; series passes through unadjusted");
            return AdjustedCashflowSeries::passthrough(series);
        }
    };

    let flows = series
        .sorted_entries()
        .into_iter()
        .map(|entry| {
            let reset_rate_pct = schedule.rate_as_of(entry.date);
            if reset_rate_pct.is_none() {
                log::debug!("no rate observation on or before {}; amount unadjusted", entry.date);
            }
            let adjusted_amount = entry.amount * (1.0 + reset_rate_pct.unwrap_or(0.0) / 100.0);

            AdjustedCashflow {
                date: entry.date,
                amount: entry.amount,
                kind: entry.kind,
                reset_rate_pct,
                adjusted_amount,
            }
        })
        .collect();

    AdjustedCashflowSeries { flows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::CashflowEntry;
    use crate::rates::RateObservation;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn two_flow_series() -> CashflowSeries {
        CashflowSeries::new(vec![
            CashflowEntry::new(date(2025, 1, 1), -10_000.0),
            CashflowEntry::new(date(2026, 1, 1), 10_500.0),
        ])
    }

    fn two_step_schedule() -> RateSchedule {
        // Second observation 200 days after the first
        RateSchedule::new(vec![
            RateObservation::new(date(2025, 1, 1), 5.0),
            RateObservation::new(date(2025, 7, 20), 5.5),
        ])
    }

    #[test]
    fn test_each_flow_picks_its_own_reset() {
        let adjusted = apply_resets(
            &two_flow_series(),
            Some(&two_step_schedule()),
            Some(date(2025, 1, 1)),
        );

        assert_eq!(adjusted.flows[0].reset_rate_pct, Some(5.0));
        assert!((adjusted.flows[0].adjusted_amount - (-10_500.0)).abs() < 1e-9);

        assert_eq!(adjusted.flows[1].reset_rate_pct, Some(5.5));
        assert!((adjusted.flows[1].adjusted_amount - 11_077.5).abs() < 1e-9);
    }

    #[test]
    fn test_passthrough_without_schedule() {
        let adjusted = apply_resets(&two_flow_series(), None, Some(date(2025, 1, 1)));

        assert_eq!(adjusted.len(), 2);
        for flow in &adjusted.flows {
            assert!(flow.reset_rate_pct.is_none());
            assert_eq!(flow.adjusted_amount, flow.amount);
        }
    }

    #[test]
    fn test_passthrough_without_anniversary_date() {
        let adjusted = apply_resets(&two_flow_series(), Some(&two_step_schedule()), None);

        for flow in &adjusted.flows {
            assert!(flow.reset_rate_pct.is_none());
            assert_eq!(flow.adjusted_amount, flow.amount);
        }
    }

    #[test]
    fn test_flow_before_coverage_keeps_raw_amount() {
        let series = CashflowSeries::new(vec![
            CashflowEntry::new(date(2024, 6, 1), -10_000.0),
            CashflowEntry::new(date(2025, 8, 1), 10_500.0),
        ]);

        let adjusted = apply_resets(&series, Some(&two_step_schedule()), Some(date(2024, 6, 1)));

        assert_eq!(adjusted.flows[0].reset_rate_pct, None);
        assert_eq!(adjusted.flows[0].adjusted_amount, -10_000.0);
        assert_eq!(adjusted.flows[1].reset_rate_pct, Some(5.5));
    }

    #[test]
    fn test_output_is_sorted_by_date() {
        let series = CashflowSeries::new(vec![
            CashflowEntry::new(date(2026, 1, 1), 10_500.0),
            CashflowEntry::new(date(2025, 1, 1), -10_000.0),
        ]);

        let adjusted = apply_resets(&series, Some(&two_step_schedule()), Some(date(2025, 1, 1)));

        assert_eq!(adjusted.flows[0].date, date(2025, 1, 1));
        assert_eq!(adjusted.flows[1].date, date(2026, 1, 1));
    }

    #[test]
    fn test_adjustment_is_deterministic() {
        let series = two_flow_series();
        let schedule = two_step_schedule();

        let first = apply_resets(&series, Some(&schedule), Some(date(2025, 1, 1)));
        let second = apply_resets(&series, Some(&schedule), Some(date(2025, 1, 1)));

        assert_eq!(first.len(), second.len());
        for (a, b) in first.flows.iter().zip(second.flows.iter()) {
            assert_eq!(a.adjusted_amount, b.adjusted_amount);
            assert_eq!(a.reset_rate_pct, b.reset_rate_pct);
        }
    }
}
