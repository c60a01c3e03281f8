//! MSTY Calculator CLI
//!
//! Command-line interface for running projections and the closed-form calculators

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

use msty_calculator::calculators::{
    calculate_debt_return, future_value, load_lots, CompoundingFrequency, CompoundingParams,
    DebtReturnParams, InterestMode,
};
use msty_calculator::params::load_parameters;
use msty_calculator::projection::{round_to, LedgerSummary, LedgerView, ProjectionEngine, SummaryRow};

#[derive(Parser, Debug)]
#[command(name = "msty", about = "Dividend reinvestment projections and calculators")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Project a position month by month from a JSON parameter file
    Project {
        #[arg(short, long)]
        params: PathBuf,
        #[arg(short, long, default_value = "yearly")]
        view: LedgerView,
        /// Print the view and summary as JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Also write the view to a CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Return on shares bought with borrowed money
    Debt {
        #[arg(long)]
        debt_amount: f64,
        #[arg(long)]
        monthly_payment: f64,
        #[arg(long)]
        cost_basis: f64,
        #[arg(long)]
        loan_term: u32,
        #[arg(long)]
        compound_period: u32,
        #[arg(long)]
        reinvest_price: f64,
        #[arg(long)]
        monthly_dividend: f64,
        #[arg(long)]
        end_price: f64,
        /// Annual rate as a decimal; switches interest to simple-interest accounting
        #[arg(long)]
        interest_rate: Option<f64>,
        #[arg(long)]
        json: bool,
    },
    /// Average cost basis across purchase lots in a CSV file
    CostBasis {
        #[arg(short, long)]
        lots: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Future value under periodic compounding
    Compound {
        #[arg(long)]
        principal: f64,
        /// Annual rate as a decimal
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        years: u32,
        #[arg(long, default_value = "monthly")]
        frequency: CompoundingFrequency,
        #[arg(long)]
        json: bool,
    },
}

/// Flat row for CSV export of a ledger view
#[derive(Serialize)]
struct CsvViewRow {
    #[serde(rename = "Period")]
    period: String,
    #[serde(rename = "Months")]
    months: u32,
    #[serde(rename = "SharesAtStart")]
    shares_at_start: f64,
    #[serde(rename = "SharesAtEnd")]
    shares_at_end: f64,
    #[serde(rename = "GrossDividend")]
    gross_dividend: f64,
    #[serde(rename = "Tax")]
    tax: f64,
    #[serde(rename = "NetDividend")]
    net_dividend: f64,
    #[serde(rename = "Reinvested")]
    reinvested_amount: f64,
    #[serde(rename = "Withdrawn")]
    withdrawn_amount: f64,
    #[serde(rename = "NewShares")]
    new_shares: f64,
    #[serde(rename = "Penalty")]
    penalty: f64,
    #[serde(rename = "TaxRealized")]
    tax_realized: f64,
    #[serde(rename = "CumulativeTaxPaid")]
    cumulative_tax_paid: f64,
    #[serde(rename = "DeferredTaxDue")]
    deferred_tax_due: f64,
}

impl From<&SummaryRow> for CsvViewRow {
    fn from(row: &SummaryRow) -> Self {
        Self {
            period: row.period.to_string(),
            months: row.months,
            shares_at_start: round_to(row.shares_at_start, 4),
            shares_at_end: round_to(row.shares_at_end, 4),
            gross_dividend: round_to(row.gross_dividend, 2),
            tax: round_to(row.tax, 2),
            net_dividend: round_to(row.net_dividend, 2),
            reinvested_amount: round_to(row.reinvested_amount, 2),
            withdrawn_amount: round_to(row.withdrawn_amount, 2),
            new_shares: round_to(row.new_shares, 4),
            penalty: round_to(row.penalty, 2),
            tax_realized: round_to(row.tax_realized, 2),
            cumulative_tax_paid: round_to(row.cumulative_tax_paid, 2),
            deferred_tax_due: round_to(row.deferred_tax_due, 2),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Project { params, view, json, output } => {
            run_project(&params, view, json, output.as_deref())
        }
        Command::Debt {
            debt_amount,
            monthly_payment,
            cost_basis,
            loan_term,
            compound_period,
            reinvest_price,
            monthly_dividend,
            end_price,
            interest_rate,
            json,
        } => {
            let params = DebtReturnParams {
                debt_amount,
                monthly_payment,
                cost_basis_per_share: cost_basis,
                loan_term_months: loan_term,
                compounding_term_months: compound_period,
                reinvestment_price_per_share: reinvest_price,
                average_monthly_dividend_per_share: monthly_dividend,
                expected_end_price: end_price,
                interest_mode: match interest_rate {
                    Some(rate) => InterestMode::SimpleInterest { annual_interest_rate: rate },
                    None => InterestMode::FlatSchedule,
                },
            };
            run_debt(&params, json)
        }
        Command::CostBasis { lots, json } => run_cost_basis(&lots, json),
        Command::Compound { principal, rate, years, frequency, json } => {
            let params = CompoundingParams {
                principal,
                annual_rate: rate,
                years,
                frequency,
            };
            run_compound(&params, json)
        }
    }
}

fn run_project(path: &Path, view: LedgerView, json: bool, output: Option<&Path>) -> Result<()> {
    let params = load_parameters(path)
        .with_context(|| format!("loading parameters from {}", path.display()))?;
    let engine = ProjectionEngine::new(params)?;
    let ledger = engine.project();
    let rows = ledger.aggregate(view);
    let summary = ledger.summary();

    if let Some(output) = output {
        let mut writer = csv::Writer::from_path(output)
            .with_context(|| format!("creating {}", output.display()))?;
        for row in &rows {
            writer.serialize(CsvViewRow::from(row))?;
        }
        writer.flush()?;
        info!("wrote {} rows to {}", rows.len(), output.display());
    }

    if json {
        #[derive(Serialize)]
        struct Output<'a> {
            view: LedgerView,
            rows: &'a [SummaryRow],
            summary: &'a LedgerSummary,
        }
        let out = Output { view, rows: &rows, summary: &summary };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Projection ({} months, {:?} view):", ledger.len(), view);
    println!(
        "{:>8} {:>6} {:>14} {:>12} {:>10} {:>12} {:>12} {:>10} {:>10}",
        "Period", "Months", "Shares", "Gross", "Tax", "Reinvested", "NewShares", "Penalty", "TaxPaid"
    );
    println!("{}", "-".repeat(102));
    for row in &rows {
        println!(
            "{:>8} {:>6} {:>14.4} {:>12.2} {:>10.2} {:>12.2} {:>12.4} {:>10.2} {:>10.2}",
            row.period.to_string(),
            row.months,
            row.shares_at_end,
            row.gross_dividend,
            row.tax,
            row.reinvested_amount,
            row.new_shares,
            row.penalty,
            row.cumulative_tax_paid,
        );
    }

    println!("\nSummary:");
    println!("  Initial Shares:      {:.4}", summary.initial_shares);
    println!("  Final Shares:        {:.4}", summary.final_shares);
    println!("  Shares Added:        {:.4}", summary.shares_added);
    println!("  Total Dividends:     ${:.2}", summary.total_dividends);
    println!("  Total Tax Paid:      ${:.2}", summary.total_tax_paid);
    println!("  Total Penalties:     ${:.2}", summary.total_penalties);
    println!("  Total Reinvested:    ${:.2}", summary.total_reinvested);
    println!("  Total Withdrawn:     ${:.2}", summary.total_withdrawn);
    if summary.outstanding_tax_due > 0.0 {
        println!("  Deferred Tax Owed:   ${:.2}", summary.outstanding_tax_due);
    }
    println!("  Final Annual Income: ${:.2}", summary.final_annual_income);
    Ok(())
}

fn run_debt(params: &DebtReturnParams, json: bool) -> Result<()> {
    let result = calculate_debt_return(params)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Return on Debt:");
    println!("  Shares Purchased with Debt:     {:.2}", result.initial_shares);
    println!("  Monthly Dividend Income:        ${:.2}", result.monthly_dividend_income);
    println!("  Monthly Reinvestable:           ${:.2}", result.reinvestable_amount);
    println!("  Reinvested Shares:              {:.2}", result.new_shares);
    println!("  Final Share Count:              {:.2}", result.final_share_count);
    println!("  Portfolio Value:                ${:.2}", result.portfolio_value_at_exit);
    println!("  Interest Paid Over Loan:        ${:.2}", result.total_interest_paid);
    println!("  Net Portfolio Value After Debt: ${:.2}", result.net_value_after_debt);
    Ok(())
}

fn run_cost_basis(path: &Path, json: bool) -> Result<()> {
    let tracker = load_lots(path).with_context(|| format!("loading lots from {}", path.display()))?;
    let summary = tracker.summary();
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{:>12} {:>12} {:>12} {:>14}", "Date", "Shares", "Price", "Cost");
    for lot in tracker.lots() {
        println!(
            "{:>12} {:>12.4} {:>12.2} {:>14.2}",
            lot.date.to_string(),
            lot.shares,
            lot.price_per_share,
            lot.cost()
        );
    }
    println!("\nLots:               {}", summary.lot_count);
    println!("Total Shares:       {:.4}", summary.total_shares);
    println!("Total Cost:         ${:.2}", summary.total_cost);
    println!("Average Cost Basis: ${:.4}", summary.average_cost_basis);
    Ok(())
}

fn run_compound(params: &CompoundingParams, json: bool) -> Result<()> {
    let result = future_value(params)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }
    println!(
        "After {} years ({} periods), ${:.2} grows to ${:.2} (+${:.2})",
        params.years, result.total_periods, params.principal, result.future_value, result.total_growth
    );
    Ok(())
}
