//! Deal and cash-flow data structures

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of a cash flow
///
/// Informational only: valuation reads the sign of the amount, not the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowKind {
    /// Money leaving the portfolio (investment, drawdown)
    Outflow,
    /// Money returning to the portfolio (repayment, distribution)
    Inflow,
}

impl FlowKind {
    /// Classify an amount by sign; zero counts as an inflow
    pub fn from_amount(amount: f64) -> Self {
        if amount < 0.0 {
            FlowKind::Outflow
        } else {
            FlowKind::Inflow
        }
    }
}

/// Rate basis of a deal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateType {
    /// Cash flows are valued exactly as supplied
    Fixed,
    /// Cash flows are scaled by the reference-rate schedule before valuation
    Floating,
}

/// A single dated cash flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashflowEntry {
    /// Date the flow occurs
    pub date: NaiveDate,
    /// Signed amount; negative for outflows, positive for inflows
    pub amount: f64,
    /// Display classification of the flow
    pub kind: FlowKind,
}

impl CashflowEntry {
    /// Create an entry, deriving the kind from the sign of the amount
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self {
            date,
            amount,
            kind: FlowKind::from_amount(amount),
        }
    }
}

/// The cash flows of one deal
///
/// Entries may be supplied in any order. Every consumer sorts ascending by
/// date first; the sort is stable, so same-day entries keep their supplied
/// order and are discounted individually rather than merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CashflowSeries {
    pub entries: Vec<CashflowEntry>,
}

impl CashflowSeries {
    pub fn new(entries: Vec<CashflowEntry>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, entry: CashflowEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of the entries in ascending date order
    pub fn sorted_entries(&self) -> Vec<CashflowEntry> {
        let mut sorted = self.entries.clone();
        sorted.sort_by_key(|entry| entry.date);
        sorted
    }
}

impl From<Vec<CashflowEntry>> for CashflowSeries {
    fn from(entries: Vec<CashflowEntry>) -> Self {
        Self::new(entries)
    }
}

/// Per-deal valuation settings, immutable during a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealConfig {
    /// Unique deal identifier
    pub deal_id: u32,
    /// Fixed or floating rate basis
    pub rate_type: RateType,
    /// Reset anniversary for floating deals. Accepted and carried for
    /// periodic reset support; not currently used to gate which flows
    /// reset. A floating deal without one is valued unadjusted.
    #[serde(default)]
    pub anniversary_date: Option<NaiveDate>,
}

impl DealConfig {
    /// Settings for a fixed-rate deal
    pub fn fixed(deal_id: u32) -> Self {
        Self {
            deal_id,
            rate_type: RateType::Fixed,
            anniversary_date: None,
        }
    }

    /// Settings for a floating-rate deal with the given reset anniversary
    pub fn floating(deal_id: u32, anniversary_date: NaiveDate) -> Self {
        Self {
            deal_id,
            rate_type: RateType::Floating,
            anniversary_date: Some(anniversary_date),
        }
    }
}

/// A deal: its settings plus its raw cash flows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    pub config: DealConfig,
    pub cashflows: CashflowSeries,
}

impl Deal {
    pub fn new(config: DealConfig, cashflows: CashflowSeries) -> Self {
        Self { config, cashflows }
    }

    pub fn deal_id(&self) -> u32 {
        self.config.deal_id
    }
}
