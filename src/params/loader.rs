//! Load projection parameters from JSON files and scenario CSVs

use chrono::NaiveDate;
use csv::{Reader, StringRecord};
use log::debug;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::data::default_reinvest_percent;
use super::{AccountType, ProjectionParameters};
use crate::error::{CalcError, Result};

/// Default file name for the scenario grid used by `run_scenarios`
pub const DEFAULT_SCENARIO_PATH: &str = "scenarios.csv";

/// A named parameter set from a scenario file
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub scenario_id: String,
    pub params: ProjectionParameters,
}

/// Raw CSV row matching scenarios.csv columns
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "ScenarioID")]
    scenario_id: String,
    #[serde(rename = "InitialShares")]
    initial_shares: f64,
    #[serde(rename = "MonthlyDividend")]
    monthly_dividend: f64,
    #[serde(rename = "ReinvestPrice")]
    reinvest_price: f64,
    #[serde(rename = "Months")]
    months: u32,
    #[serde(rename = "AccountType")]
    account_type: String,
    #[serde(rename = "FederalRate", default)]
    federal_rate: f64,
    #[serde(rename = "StateRate", default)]
    state_rate: f64,
    #[serde(rename = "DeferToOctober", default)]
    defer_to_october: String,
    #[serde(rename = "ReinvestDividends")]
    reinvest_dividends: String,
    #[serde(rename = "ReinvestPercent", default = "default_reinvest_percent")]
    reinvest_percent: f64,
    #[serde(rename = "MonthlyWithdrawal", default)]
    monthly_withdrawal: f64,
    #[serde(rename = "StartDate")]
    start_date: String,
}

fn parse_flag(field: &str, value: &str, line: u64) -> Result<bool> {
    match value.trim() {
        "" | "N" | "n" | "false" | "FALSE" | "0" => Ok(false),
        "Y" | "y" | "true" | "TRUE" | "1" => Ok(true),
        other => Err(CalcError::InvalidRecord {
            line,
            reason: format!("unknown {} flag: {}", field, other),
        }),
    }
}

impl CsvRow {
    fn to_scenario(self, line: u64) -> Result<Scenario> {
        let account_type: AccountType = self.account_type.parse().map_err(|e: CalcError| {
            CalcError::InvalidRecord { line, reason: e.to_string() }
        })?;

        let start_date = NaiveDate::parse_from_str(self.start_date.trim(), "%Y-%m-%d").map_err(|e| {
            CalcError::InvalidRecord {
                line,
                reason: format!("bad StartDate {:?}: {}", self.start_date, e),
            }
        })?;

        let params = ProjectionParameters {
            initial_shares: self.initial_shares,
            average_monthly_dividend_per_share: self.monthly_dividend,
            reinvestment_price_per_share: self.reinvest_price,
            period_count: self.months,
            account_type,
            federal_tax_rate: self.federal_rate,
            state_tax_rate: self.state_rate,
            defer_taxes_to_october: parse_flag("DeferToOctober", &self.defer_to_october, line)?,
            reinvest_dividends: parse_flag("ReinvestDividends", &self.reinvest_dividends, line)?,
            reinvest_percent: self.reinvest_percent,
            monthly_withdrawal: self.monthly_withdrawal,
            start_date,
        };

        params.validate().map_err(|e| CalcError::InvalidRecord {
            line,
            reason: e.to_string(),
        })?;

        Ok(Scenario {
            scenario_id: self.scenario_id,
            params,
        })
    }
}

/// Load a single parameter set from a JSON file; omitted fields take defaults
pub fn load_parameters<P: AsRef<Path>>(path: P) -> Result<ProjectionParameters> {
    let file = File::open(path.as_ref())?;
    let params = load_parameters_from_reader(BufReader::new(file))?;
    debug!("loaded parameters from {}", path.as_ref().display());
    Ok(params)
}

/// Load a single parameter set from any JSON reader
pub fn load_parameters_from_reader<R: Read>(reader: R) -> Result<ProjectionParameters> {
    let params: ProjectionParameters = serde_json::from_reader(reader)?;
    params.validate()?;
    Ok(params)
}

/// Load all scenarios from a CSV file
pub fn load_scenarios<P: AsRef<Path>>(path: P) -> Result<Vec<Scenario>> {
    let file = File::open(path.as_ref())?;
    let scenarios = load_scenarios_from_reader(file)?;
    debug!("loaded {} scenarios from {}", scenarios.len(), path.as_ref().display());
    Ok(scenarios)
}

/// Load scenarios from any reader (e.g., string buffer)
pub fn load_scenarios_from_reader<R: Read>(reader: R) -> Result<Vec<Scenario>> {
    let mut csv_reader = Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut record = StringRecord::new();
    let mut scenarios = Vec::new();

    while csv_reader.read_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: CsvRow = record.deserialize(Some(&headers))?;
        scenarios.push(row.to_scenario(line)?);
    }

    Ok(scenarios)
}
