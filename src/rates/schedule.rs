//! BBSY reference-rate schedule and as-of lookups

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single reference-rate observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateObservation {
    /// Date the rate takes effect
    pub effective_date: NaiveDate,
    /// Rate in percent (5.5 means 5.5%)
    pub rate_pct: f64,
}

impl RateObservation {
    pub fn new(effective_date: NaiveDate, rate_pct: f64) -> Self {
        Self {
            effective_date,
            rate_pct,
        }
    }
}

/// The reference-rate schedule shared by every floating deal in a run
///
/// Observations do not need to be pre-sorted or de-duplicated; every lookup
/// scans the whole schedule. The schedule is read-only during a batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateSchedule {
    pub observations: Vec<RateObservation>,
}

impl RateSchedule {
    pub fn new(observations: Vec<RateObservation>) -> Self {
        Self { observations }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Rate effective on `date`: the observation with the latest
    /// effective date on or before it
    ///
    /// Returns None when every observation is after `date`. When two
    /// observations share the latest effective date, the one appearing
    /// later in the schedule wins.
    pub fn rate_as_of(&self, date: NaiveDate) -> Option<f64> {
        let mut applicable: Option<&RateObservation> = None;

        for obs in &self.observations {
            if obs.effective_date > date {
                continue;
            }
            match applicable {
                Some(best) if obs.effective_date < best.effective_date => {}
                _ => applicable = Some(obs),
            }
        }

        applicable.map(|obs| obs.rate_pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn schedule() -> RateSchedule {
        RateSchedule::new(vec![
            RateObservation::new(date(2025, 1, 1), 5.0),
            RateObservation::new(date(2025, 7, 19), 5.5),
        ])
    }

    #[test]
    fn test_rate_as_of_picks_latest_on_or_before() {
        let s = schedule();
        assert_eq!(s.rate_as_of(date(2025, 3, 1)), Some(5.0));
        assert_eq!(s.rate_as_of(date(2025, 7, 19)), Some(5.5));
        assert_eq!(s.rate_as_of(date(2026, 1, 1)), Some(5.5));
    }

    #[test]
    fn test_rate_as_of_before_first_observation() {
        let s = schedule();
        assert_eq!(s.rate_as_of(date(2024, 12, 31)), None);
    }

    #[test]
    fn test_rate_as_of_handles_unsorted_schedule() {
        let s = RateSchedule::new(vec![
            RateObservation::new(date(2025, 7, 19), 5.5),
            RateObservation::new(date(2025, 1, 1), 5.0),
        ]);
        assert_eq!(s.rate_as_of(date(2025, 3, 1)), Some(5.0));
        assert_eq!(s.rate_as_of(date(2025, 8, 1)), Some(5.5));
    }

    #[test]
    fn test_duplicate_effective_date_later_observation_wins() {
        let s = RateSchedule::new(vec![
            RateObservation::new(date(2025, 1, 1), 5.0),
            RateObservation::new(date(2025, 1, 1), 5.25),
        ]);
        assert_eq!(s.rate_as_of(date(2025, 1, 1)), Some(5.25));
    }

    #[test]
    fn test_empty_schedule_has_no_rate() {
        let s = RateSchedule::default();
        assert_eq!(s.rate_as_of(date(2025, 1, 1)), None);
    }
}
