//! XIRR Engine CLI
//!
//! Runs a small built-in book of deals through the valuation pipeline

use chrono::NaiveDate;
use std::fs::File;
use std::io::Write;
use xirr_engine::{
    BatchRunner, CashflowEntry, CashflowSeries, Deal, DealConfig, RateObservation, RateSchedule,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid calendar date")
}

fn main() {
    env_logger::init();

    println!("XIRR Engine v0.1.0");
    println!("==================\n");

    // BBSY schedule - quarterly observations through an easing cycle
    let schedule = RateSchedule::new(vec![
        RateObservation::new(date(2024, 12, 2), 4.35),
        RateObservation::new(date(2025, 3, 3), 4.10),
        RateObservation::new(date(2025, 6, 2), 3.85),
        RateObservation::new(date(2025, 9, 1), 3.60),
    ]);

    // Deal 101: fixed-rate term loan, semi-annual coupon plus bullet
    let fixed_deal = Deal::new(
        DealConfig::fixed(101),
        CashflowSeries::new(vec![
            CashflowEntry::new(date(2025, 1, 15), -100_000.0),
            CashflowEntry::new(date(2025, 7, 15), 3_000.0),
            CashflowEntry::new(date(2026, 1, 15), 103_000.0),
        ]),
    );

    // Deal 102: floating-rate facility resetting off the schedule
    let floating_deal = Deal::new(
        DealConfig::floating(102, date(2025, 1, 15)),
        CashflowSeries::new(vec![
            CashflowEntry::new(date(2025, 1, 15), -50_000.0),
            CashflowEntry::new(date(2025, 8, 15), 26_000.0),
            CashflowEntry::new(date(2026, 1, 15), 27_500.0),
        ]),
    );

    let deals = vec![fixed_deal, floating_deal];
    let base_rate_pct = 5.0; // spread benchmark

    println!("Deals: {}", deals.len());
    println!("BBSY observations: {}", schedule.len());
    println!("Base rate: {:.2}%\n", base_rate_pct);

    let runner = BatchRunner::new();

    // Per-deal adjusted cash flows, exactly as the solver will see them
    for deal in &deals {
        let prepared =
            runner
                .evaluator()
                .prepare_series(&deal.config, &deal.cashflows, Some(&schedule));

        println!(
            "Deal {} ({:?}) adjusted cash flows:",
            deal.deal_id(),
            deal.config.rate_type
        );
        println!(
            "{:>12} {:>9} {:>14} {:>8} {:>14}",
            "Date", "Type", "Cashflow", "Rate", "Adj_CF"
        );
        println!("{}", "-".repeat(62));

        for flow in &prepared.flows {
            let rate = flow
                .reset_rate_pct
                .map(|r| format!("{:.2}", r))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:>12} {:>9} {:>14.2} {:>8} {:>14.2}",
                flow.date.to_string(),
                format!("{:?}", flow.kind),
                flow.amount,
                rate,
                flow.adjusted_amount,
            );
        }
        println!();
    }

    // Run the batch
    let summary = runner.run(&deals, Some(&schedule), base_rate_pct);

    println!("Summary:");
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

    // Write the summary to CSV
    let csv_path = "xirr_summary.csv";
    let mut file = File::create(csv_path).expect("Unable to create CSV file");

    writeln!(file, "Deal,XIRR (%),Base Rate (%),Ups (%),Error").unwrap();
    for row in &summary.rows {
        writeln!(
            file,
            "{},{},{:.4},{},{}",
            row.deal_id,
            row.xirr_pct.map(|v| format!("{:.6}", v)).unwrap_or_default(),
            row.base_rate_pct,
            row.spread_pct.map(|v| format!("{:.6}", v)).unwrap_or_default(),
            row.error.as_deref().unwrap_or(""),
        )
        .unwrap();
    }

    println!("\nSummary written to: {}", csv_path);
    println!(
        "\nEvaluated {} deals ({} failed)",
        summary.len(),
        summary.error_count()
    );
}
