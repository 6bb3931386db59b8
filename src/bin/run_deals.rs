//! Evaluate XIRR for a manifest of deals against a BBSY schedule
//!
//! Loads a deals manifest CSV plus per-deal cash-flow files, values every
//! deal in parallel, and prints a summary table.
//! Supports JSON output for API integration via --json and CSV artifact
//! export via --export-dir.

use anyhow::anyhow;
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use xirr_engine::deal::load_deals;
use xirr_engine::rates::load_rate_schedule;
use xirr_engine::valuation::{
    AdjustedCashflow, DealEvaluator, DealResult, SolverConfig, DEFAULT_INITIAL_GUESS,
    DEFAULT_MAX_ITERATIONS,
};
use xirr_engine::{BatchSummary, RateSchedule, RateType};

#[derive(Parser, Debug)]
#[command(
    name = "run_deals",
    about = "Evaluate annualized returns for a book of deals"
)]
struct Args {
    /// Deals manifest CSV (DealID,RateType,AnniversaryDate,CashflowFile)
    #[arg(long)]
    deals: PathBuf,

    /// BBSY schedule CSV (Date,Rate); floating deals pass through without it
    #[arg(long)]
    bbsy: Option<PathBuf>,

    /// Base rate in percent that spreads are measured against
    #[arg(long, default_value_t = 5.0)]
    base_rate: f64,

    /// Newton-Raphson starting rate as a fraction
    #[arg(long, default_value_t = DEFAULT_INITIAL_GUESS)]
    guess: f64,

    /// Newton-Raphson iteration budget
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    iterations: u32,

    /// Optional convergence tolerance on successive rates
    #[arg(long)]
    tolerance: Option<f64>,

    /// Emit the whole run as one JSON document instead of tables
    #[arg(long)]
    json: bool,

    /// Write summary.csv, bbsy.csv, and per-deal adjusted tables here
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

#[derive(Serialize)]
struct RunResponse {
    deal_count: usize,
    error_count: usize,
    base_rate_pct: f64,
    summary: Vec<DealResult>,
    deal_tables: Vec<DealTable>,
    execution_time_ms: u64,
}

/// Per-deal adjusted cash flows, as valued
#[derive(Serialize)]
struct DealTable {
    deal_id: u32,
    rate_type: RateType,
    flows: Vec<AdjustedCashflow>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let start = Instant::now();

    let deals = load_deals(&args.deals)
        .map_err(|e| anyhow!("failed to load deals from {}: {}", args.deals.display(), e))?;

    let schedule: Option<RateSchedule> = match &args.bbsy {
        Some(path) => Some(
            load_rate_schedule(path)
                .map_err(|e| anyhow!("failed to load BBSY schedule from {}: {}", path.display(), e))?,
        ),
        None => None,
    };

    if !args.json {
        println!(
            "Loaded {} deals, {} BBSY observations in {:?}",
            deals.len(),
            schedule.as_ref().map(|s| s.len()).unwrap_or(0),
            start.elapsed()
        );
    }

    let solver_config = SolverConfig {
        initial_guess: args.guess,
        max_iterations: args.iterations,
        tolerance: args.tolerance,
    };
    let evaluator = DealEvaluator::new(solver_config);

    // Value deals in parallel; collect preserves manifest order
    let eval_start = Instant::now();
    let rows: Vec<_> = deals
        .par_iter()
        .map(|deal| evaluator.evaluate_deal(deal, schedule.as_ref(), args.base_rate))
        .collect();
    let summary = BatchSummary::new(rows);

    if !args.json {
        println!(
            "Evaluated {} deals in {:?} ({} failed)",
            summary.len(),
            eval_start.elapsed(),
            summary.error_count()
        );
    }

    // Adjusted tables are only materialized when something consumes them
    let deal_tables: Vec<DealTable> = if args.json || args.export_dir.is_some() {
        deals
            .iter()
            .map(|deal| DealTable {
                deal_id: deal.deal_id(),
                rate_type: deal.config.rate_type,
                flows: evaluator
                    .prepare_series(&deal.config, &deal.cashflows, schedule.as_ref())
                    .flows,
            })
            .collect()
    } else {
        Vec::new()
    };

    if let Some(dir) = &args.export_dir {
        export_artifacts(dir, &summary, schedule.as_ref(), &deal_tables)?;
        if !args.json {
            println!("Artifacts written to {}", dir.display());
        }
    }

    if args.json {
        let response = RunResponse {
            deal_count: summary.len(),
            error_count: summary.error_count(),
            base_rate_pct: args.base_rate,
            summary: summary.rows,
            deal_tables,
            execution_time_ms: start.elapsed().as_millis() as u64,
        };
        println!("{}", serde_json::to_string(&response)?);
        return Ok(());
    }

    println!("\nSummary:");
    println!(
        "{:>6} {:>12} {:>12} {:>12}",
        "Deal", "XIRR (%)", "Base (%)", "Ups (%)"
    );
    println!("{}", "-".repeat(46));

    for row in &summary.rows {
        match (row.xirr_pct, row.spread_pct) {
            (Some(xirr), Some(spread)) => println!(
                "{:>6} {:>12.4} {:>12.2} {:>12.4}",
                row.deal_id, xirr, row.base_rate_pct, spread
            ),
            _ => println!(
                "{:>6} {:>12} {:>12.2} {:>12}  ({})",
                row.deal_id,
                "error",
                row.base_rate_pct,
                "-",
                row.error.as_deref().unwrap_or("unknown failure"),
            ),
        }
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}

/// Write summary.csv, bbsy.csv, and one adjusted table per deal
fn export_artifacts(
    dir: &Path,
    summary: &BatchSummary,
    schedule: Option<&RateSchedule>,
    deal_tables: &[DealTable],
) -> anyhow::Result<()> {
    fs::create_dir_all(dir)?;

    let mut file = File::create(dir.join("summary.csv"))?;
    writeln!(file, "Deal,XIRR (%),Base Rate (%),Ups (%),Error")?;
    for row in &summary.rows {
        writeln!(
            file,
            "{},{},{:.4},{},{}",
            row.deal_id,
            row.xirr_pct.map(|v| format!("{:.6}", v)).unwrap_or_default(),
            row.base_rate_pct,
            row.spread_pct.map(|v| format!("{:.6}", v)).unwrap_or_default(),
            row.error.as_deref().unwrap_or(""),
        )?;
    }

    if let Some(schedule) = schedule {
        let mut file = File::create(dir.join("bbsy.csv"))?;
        writeln!(file, "Date,Rate")?;
        for obs in &schedule.observations {
            writeln!(file, "{},{:.4}", obs.effective_date, obs.rate_pct)?;
        }
    }

    for table in deal_tables {
        let mut file = File::create(dir.join(format!("deal_{}_adjusted.csv", table.deal_id)))?;
        writeln!(file, "Date,Type,Cashflow,Rate,Adj_CF")?;
        for flow in &table.flows {
            writeln!(
                file,
                "{},{:?},{:.2},{},{:.2}",
                flow.date,
                flow.kind,
                flow.amount,
                flow.reset_rate_pct
                    .map(|r| format!("{:.4}", r))
                    .unwrap_or_default(),
                flow.adjusted_amount,
            )?;
        }
    }

    Ok(())
}
