//! Monthly, yearly and whole-run views over a ledger
//!
//! Aggregation never touches the ledger it reads. Point-in-time fields
//! (share count, cumulative totals, deferred balance) take the last record
//! of each group; flow fields are summed.

use serde::{Deserialize, Serialize};

use super::ledger::{Ledger, PeriodRecord};
use crate::error::CalcError;
use crate::params::YearMonth;

/// Granularity of an aggregated ledger view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerView {
    Monthly,
    Yearly,
    Total,
}

impl std::str::FromStr for LedgerView {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" => Ok(LedgerView::Monthly),
            "yearly" | "year" | "annual" => Ok(LedgerView::Yearly),
            "total" => Ok(LedgerView::Total),
            other => Err(CalcError::InvalidParameter {
                field: "view",
                reason: format!("unknown view: {}", other),
            }),
        }
    }
}

/// Label for the span an aggregated row covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummaryPeriod {
    Month(YearMonth),
    Year(i32),
    Total,
}

impl std::fmt::Display for SummaryPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryPeriod::Month(ym) => write!(f, "{}", ym),
            SummaryPeriod::Year(year) => write!(f, "{}", year),
            SummaryPeriod::Total => write!(f, "Total"),
        }
    }
}

/// One row of an aggregated view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub period: SummaryPeriod,
    /// Number of ledger months folded into this row
    pub months: u32,

    // Snapshots
    pub shares_at_start: f64,
    pub shares_at_end: f64,

    // Flows (summed)
    pub gross_dividend: f64,
    pub tax: f64,
    pub net_dividend: f64,
    pub reinvested_amount: f64,
    pub withdrawn_amount: f64,
    pub new_shares: f64,
    pub penalty: f64,
    pub tax_realized: f64,

    // Running totals (last value)
    pub cumulative_tax_paid: f64,
    pub cumulative_dividends: f64,
    pub cumulative_reinvested: f64,
    pub cumulative_penalties: f64,
    pub deferred_tax_due: f64,
}

impl SummaryRow {
    fn from_record(period: SummaryPeriod, record: &PeriodRecord) -> Self {
        Self {
            period,
            months: 1,
            shares_at_start: record.shares_at_start,
            shares_at_end: record.shares_at_end,
            gross_dividend: record.gross_dividend,
            tax: record.tax,
            net_dividend: record.net_dividend,
            reinvested_amount: record.reinvested_amount,
            withdrawn_amount: record.withdrawn_amount,
            new_shares: record.new_shares,
            penalty: record.penalty,
            tax_realized: record.tax_realized,
            cumulative_tax_paid: record.cumulative_tax_paid,
            cumulative_dividends: record.cumulative_dividends,
            cumulative_reinvested: record.cumulative_reinvested,
            cumulative_penalties: record.cumulative_penalties,
            deferred_tax_due: record.deferred_tax_due,
        }
    }

    /// Fold a later record into this row
    fn absorb(&mut self, record: &PeriodRecord) {
        self.months += 1;

        self.gross_dividend += record.gross_dividend;
        self.tax += record.tax;
        self.net_dividend += record.net_dividend;
        self.reinvested_amount += record.reinvested_amount;
        self.withdrawn_amount += record.withdrawn_amount;
        self.new_shares += record.new_shares;
        self.penalty += record.penalty;
        self.tax_realized += record.tax_realized;

        self.shares_at_end = record.shares_at_end;
        self.cumulative_tax_paid = record.cumulative_tax_paid;
        self.cumulative_dividends = record.cumulative_dividends;
        self.cumulative_reinvested = record.cumulative_reinvested;
        self.cumulative_penalties = record.cumulative_penalties;
        self.deferred_tax_due = record.deferred_tax_due;
    }
}

/// Group consecutive records sharing a label into summary rows
fn group_by<F>(records: &[PeriodRecord], label: F) -> Vec<SummaryRow>
where
    F: Fn(&PeriodRecord) -> SummaryPeriod,
{
    let mut rows: Vec<SummaryRow> = Vec::new();
    for record in records {
        let period = label(record);
        match rows.last_mut() {
            Some(row) if row.period == period => row.absorb(record),
            _ => rows.push(SummaryRow::from_record(period, record)),
        }
    }
    rows
}

/// Build the requested view of a ledger
pub fn aggregate(records: &[PeriodRecord], view: LedgerView) -> Vec<SummaryRow> {
    match view {
        LedgerView::Monthly => records
            .iter()
            .map(|r| SummaryRow::from_record(SummaryPeriod::Month(r.year_month), r))
            .collect(),
        LedgerView::Yearly => group_by(records, |r| SummaryPeriod::Year(r.year_month.year)),
        LedgerView::Total => group_by(records, |_| SummaryPeriod::Total),
    }
}

impl Ledger {
    /// Aggregate this ledger into the requested view
    pub fn aggregate(&self, view: LedgerView) -> Vec<SummaryRow> {
        aggregate(self.records(), view)
    }
}
