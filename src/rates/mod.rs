//! Reference-rate schedules and loading

mod schedule;
pub mod loader;

pub use loader::load_rate_schedule;
pub use schedule::{RateObservation, RateSchedule};
