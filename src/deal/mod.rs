//! Deal data structures and manifest loading

mod data;
pub mod loader;

pub use data::{CashflowEntry, CashflowSeries, Deal, DealConfig, FlowKind, RateType};
pub use loader::{load_cashflows, load_deals, load_manifest};
