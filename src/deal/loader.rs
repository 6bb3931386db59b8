//! Load deal manifests and per-deal cash-flow files from CSV

use super::{CashflowEntry, CashflowSeries, Deal, DealConfig, FlowKind, RateType};
use chrono::NaiveDate;
use csv::Reader;
use std::error::Error;
use std::path::Path;

/// Raw CSV row matching the deals manifest columns
#[derive(Debug, serde::Deserialize)]
struct ManifestRow {
    #[serde(rename = "DealID")]
    deal_id: u32,
    #[serde(rename = "RateType")]
    rate_type: String,
    #[serde(rename = "AnniversaryDate")]
    #[serde(default)]
    anniversary_date: Option<NaiveDate>,
    #[serde(rename = "CashflowFile")]
    cashflow_file: String,
}

impl ManifestRow {
    fn to_config(self) -> Result<(DealConfig, String), Box<dyn Error>> {
        let rate_type = match self.rate_type.as_str() {
            "Fixed" => RateType::Fixed,
            "Floating" => RateType::Floating,
            other => return Err(format!("Unknown RateType: {}", other).into()),
        };

        let config = DealConfig {
            deal_id: self.deal_id,
            rate_type,
            anniversary_date: self.anniversary_date,
        };

        Ok((config, self.cashflow_file))
    }
}

/// Raw CSV row matching a per-deal cash-flow file
#[derive(Debug, serde::Deserialize)]
struct FlowRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Cashflow")]
    amount: f64,
    #[serde(rename = "Type")]
    #[serde(default)]
    kind: Option<String>,
}

impl FlowRow {
    fn to_entry(self) -> Result<CashflowEntry, Box<dyn Error>> {
        let kind = match self.kind.as_deref() {
            None | Some("") => FlowKind::from_amount(self.amount),
            Some("Outflow") => FlowKind::Outflow,
            Some("Inflow") => FlowKind::Inflow,
            Some(other) => return Err(format!("Unknown Type: {}", other).into()),
        };

        Ok(CashflowEntry {
            date: self.date,
            amount: self.amount,
            kind,
        })
    }
}

/// Load deal settings and cash-flow file names from a manifest CSV
pub fn load_manifest<P: AsRef<Path>>(path: P) -> Result<Vec<(DealConfig, String)>, Box<dyn Error>> {
    let mut reader = Reader::from_path(path)?;
    let mut configs = Vec::new();

    for result in reader.deserialize() {
        let row: ManifestRow = result?;
        configs.push(row.to_config()?);
    }

    Ok(configs)
}

/// Load a manifest from any reader (e.g., string buffer, network stream)
pub fn load_manifest_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<Vec<(DealConfig, String)>, Box<dyn Error>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut configs = Vec::new();

    for result in csv_reader.deserialize() {
        let row: ManifestRow = result?;
        configs.push(row.to_config()?);
    }

    Ok(configs)
}

/// Load one deal's cash flows from a CSV file
pub fn load_cashflows<P: AsRef<Path>>(path: P) -> Result<CashflowSeries, Box<dyn Error>> {
    let mut reader = Reader::from_path(path)?;
    let mut entries = Vec::new();

    for result in reader.deserialize() {
        let row: FlowRow = result?;
        entries.push(row.to_entry()?);
    }

    Ok(CashflowSeries::new(entries))
}

/// Load cash flows from any reader
pub fn load_cashflows_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<CashflowSeries, Box<dyn Error>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut entries = Vec::new();

    for result in csv_reader.deserialize() {
        let row: FlowRow = result?;
        entries.push(row.to_entry()?);
    }

    Ok(CashflowSeries::new(entries))
}

/// Load every deal named by a manifest, resolving each CashflowFile
/// relative to the manifest's directory
pub fn load_deals<P: AsRef<Path>>(manifest_path: P) -> Result<Vec<Deal>, Box<dyn Error>> {
    let manifest_path = manifest_path.as_ref();
    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new(""));

    let mut deals = Vec::new();
    for (config, cashflow_file) in load_manifest(manifest_path)? {
        let cashflows = load_cashflows(base_dir.join(&cashflow_file))?;
        deals.push(Deal::new(config, cashflows));
    }

    Ok(deals)
}
