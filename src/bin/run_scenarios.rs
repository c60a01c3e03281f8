//! Run every scenario in a scenario CSV and write one total-view row per scenario
//!
//! Usage: run_scenarios [SCENARIO_CSV] [OUTPUT_CSV]

use anyhow::{Context, Result};
use log::{info, warn};
use msty_calculator::params::{load_scenarios, loader::DEFAULT_SCENARIO_PATH};
use msty_calculator::projection::round_to;
use msty_calculator::ScenarioRunner;
use serde::Serialize;
use std::env;
use std::time::Instant;

#[derive(Debug, Serialize)]
struct ScenarioSummaryRow {
    #[serde(rename = "ScenarioID")]
    scenario_id: String,
    #[serde(rename = "Months")]
    months: u32,
    #[serde(rename = "InitialShares")]
    initial_shares: f64,
    #[serde(rename = "FinalShares")]
    final_shares: f64,
    #[serde(rename = "TotalDividends")]
    total_dividends: f64,
    #[serde(rename = "TotalTaxPaid")]
    total_tax_paid: f64,
    #[serde(rename = "TotalPenalties")]
    total_penalties: f64,
    #[serde(rename = "TotalReinvested")]
    total_reinvested: f64,
    #[serde(rename = "TotalWithdrawn")]
    total_withdrawn: f64,
    #[serde(rename = "FinalAnnualIncome")]
    final_annual_income: f64,
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let input = args.next().unwrap_or_else(|| DEFAULT_SCENARIO_PATH.to_string());
    let output = args.next().unwrap_or_else(|| "scenario_summary.csv".to_string());

    let start = Instant::now();
    let scenarios = load_scenarios(&input).with_context(|| format!("loading scenarios from {}", input))?;
    info!("loaded {} scenarios in {:?}", scenarios.len(), start.elapsed());

    let params: Vec<_> = scenarios.iter().map(|s| s.params.clone()).collect();
    let runner = ScenarioRunner::default();

    let proj_start = Instant::now();
    let results = runner.run_batch(&params);
    info!("projections complete in {:?}", proj_start.elapsed());

    let mut writer = csv::Writer::from_path(&output).with_context(|| format!("creating {}", output))?;
    let mut written = 0;
    for (scenario, result) in scenarios.iter().zip(results) {
        let ledger = match result {
            Ok(ledger) => ledger,
            Err(e) => {
                warn!("scenario {} skipped: {}", scenario.scenario_id, e);
                continue;
            }
        };
        let summary = ledger.summary();
        writer.serialize(ScenarioSummaryRow {
            scenario_id: scenario.scenario_id.clone(),
            months: summary.total_periods,
            initial_shares: summary.initial_shares,
            final_shares: round_to(summary.final_shares, 4),
            total_dividends: round_to(summary.total_dividends, 2),
            total_tax_paid: round_to(summary.total_tax_paid, 2),
            total_penalties: round_to(summary.total_penalties, 2),
            total_reinvested: round_to(summary.total_reinvested, 2),
            total_withdrawn: round_to(summary.total_withdrawn, 2),
            final_annual_income: round_to(summary.final_annual_income, 2),
        })?;
        written += 1;
    }
    writer.flush()?;

    println!("Wrote {} scenario summaries to {}", written, output);
    println!("Total time: {:?}", start.elapsed());
    Ok(())
}
