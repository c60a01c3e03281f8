//! Purchase lot tracking and average cost basis

use chrono::NaiveDate;
use csv::{Reader, StringRecord};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{require_non_negative, require_positive, CalcError, Result};

/// A single purchase of shares
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseLot {
    pub date: NaiveDate,
    pub shares: f64,
    pub price_per_share: f64,
}

impl PurchaseLot {
    pub fn cost(&self) -> f64 {
        self.shares * self.price_per_share
    }
}

/// Derived totals across all lots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBasisSummary {
    pub lot_count: usize,
    pub total_shares: f64,
    pub total_cost: f64,
    /// Zero when no shares are held
    pub average_cost_basis: f64,
}

/// Append-only collection of purchase lots owned by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBasisTracker {
    lots: Vec<PurchaseLot>,
}

impl CostBasisTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a purchase; lots keep insertion order
    pub fn add_lot(&mut self, lot: PurchaseLot) -> Result<()> {
        require_positive("shares", lot.shares)?;
        require_non_negative("price_per_share", lot.price_per_share)?;
        self.lots.push(lot);
        Ok(())
    }

    pub fn lots(&self) -> &[PurchaseLot] {
        &self.lots
    }

    pub fn summary(&self) -> CostBasisSummary {
        let total_shares: f64 = self.lots.iter().map(|l| l.shares).sum();
        let total_cost: f64 = self.lots.iter().map(PurchaseLot::cost).sum();
        let average_cost_basis = if total_shares > 0.0 {
            total_cost / total_shares
        } else {
            0.0
        };

        CostBasisSummary {
            lot_count: self.lots.len(),
            total_shares,
            total_cost,
            average_cost_basis,
        }
    }
}

/// Raw CSV row matching lots.csv columns
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Shares")]
    shares: f64,
    #[serde(rename = "PricePerShare")]
    price_per_share: f64,
}

/// Load lots from a CSV file into a new tracker
pub fn load_lots<P: AsRef<Path>>(path: P) -> Result<CostBasisTracker> {
    load_lots_from_reader(File::open(path)?)
}

/// Load lots from any reader (e.g., string buffer)
pub fn load_lots_from_reader<R: Read>(reader: R) -> Result<CostBasisTracker> {
    let mut csv_reader = Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut record = StringRecord::new();
    let mut tracker = CostBasisTracker::new();

    while csv_reader.read_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: CsvRow = record.deserialize(Some(&headers))?;
        let date = NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d").map_err(|e| {
            CalcError::InvalidRecord {
                line,
                reason: format!("bad Date {:?}: {}", row.date, e),
            }
        })?;
        tracker
            .add_lot(PurchaseLot {
                date,
                shares: row.shares,
                price_per_share: row.price_per_share,
            })
            .map_err(|e| CalcError::InvalidRecord {
                line,
                reason: e.to_string(),
            })?;
    }

    Ok(tracker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn lot(day: u32, shares: f64, price: f64) -> PurchaseLot {
        PurchaseLot {
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            shares,
            price_per_share: price,
        }
    }

    #[test]
    fn test_weighted_average() {
        let mut tracker = CostBasisTracker::new();
        tracker.add_lot(lot(1, 100.0, 20.0)).unwrap();
        tracker.add_lot(lot(15, 300.0, 24.0)).unwrap();

        let summary = tracker.summary();
        assert_eq!(summary.lot_count, 2);
        assert_relative_eq!(summary.total_shares, 400.0);
        assert_relative_eq!(summary.total_cost, 9_200.0, epsilon = 1e-9);
        assert_relative_eq!(summary.average_cost_basis, 23.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_tracker_average_is_zero() {
        let summary = CostBasisTracker::new().summary();
        assert_eq!(summary.total_shares, 0.0);
        assert_eq!(summary.average_cost_basis, 0.0);
    }

    #[test]
    fn test_rejects_non_positive_shares() {
        let mut tracker = CostBasisTracker::new();
        assert!(tracker.add_lot(lot(1, 0.0, 20.0)).is_err());
        assert!(tracker.add_lot(lot(1, 10.0, -1.0)).is_err());
        assert!(tracker.lots().is_empty());
    }

    #[test]
    fn test_load_lots_from_reader() {
        let data = "Date,Shares,PricePerShare\n2025-01-10,50,21.5\n2025-02-10,150,19.5\n";
        let tracker = load_lots_from_reader(data.as_bytes()).unwrap();
        assert_eq!(tracker.lots().len(), 2);
        assert_eq!(tracker.lots()[0].date, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
        assert_relative_eq!(tracker.summary().average_cost_basis, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_load_lots_bad_date_reports_line() {
        let data = "Date,Shares,PricePerShare\n2025-01-10,50,21.5\n01/02/2025,10,20\n";
        match load_lots_from_reader(data.as_bytes()) {
            Err(CalcError::InvalidRecord { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected invalid record, got {:?}", other),
        }
    }
}
