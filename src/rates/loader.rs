//! Load BBSY rate schedules from CSV

use super::{RateObservation, RateSchedule};
use chrono::NaiveDate;
use csv::Reader;
use std::error::Error;
use std::path::Path;

/// Raw CSV row matching the BBSY schedule columns
#[derive(Debug, serde::Deserialize)]
struct RateRow {
    #[serde(rename = "Date")]
    effective_date: NaiveDate,
    #[serde(rename = "Rate")]
    rate_pct: f64,
}

impl RateRow {
    fn to_observation(self) -> RateObservation {
        RateObservation {
            effective_date: self.effective_date,
            rate_pct: self.rate_pct,
        }
    }
}

/// Load a rate schedule from a CSV file
pub fn load_rate_schedule<P: AsRef<Path>>(path: P) -> Result<RateSchedule, Box<dyn Error>> {
    let mut reader = Reader::from_path(path)?;
    let mut observations = Vec::new();

    for result in reader.deserialize() {
        let row: RateRow = result?;
        observations.push(row.to_observation());
    }

    Ok(RateSchedule::new(observations))
}

/// Load a rate schedule from any reader
pub fn load_rate_schedule_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<RateSchedule, Box<dyn Error>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut observations = Vec::new();

    for result in csv_reader.deserialize() {
        let row: RateRow = result?;
        observations.push(row.to_observation());
    }

    Ok(RateSchedule::new(observations))
}
