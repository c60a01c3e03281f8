//! Ledger output structures for projections

use serde::{Deserialize, Serialize};

use crate::params::{ProjectionParameters, YearMonth};

/// A single row of projection output for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    // Timing
    pub period_index: u32,
    pub year_month: YearMonth,

    // Position
    pub shares_at_start: f64,
    pub shares_at_end: f64,

    // Flows for the month
    pub gross_dividend: f64,
    pub tax: f64,
    pub net_dividend: f64,
    pub reinvested_amount: f64,
    pub withdrawn_amount: f64,
    pub new_shares: f64,
    pub penalty: f64,
    /// Deferred tax paid this month (October settlements only)
    pub tax_realized: f64,

    // Running totals
    pub cumulative_tax_paid: f64,
    pub cumulative_dividends: f64,
    pub cumulative_reinvested: f64,
    pub cumulative_penalties: f64,
    /// Deferred tax still owed after this month
    pub deferred_tax_due: f64,
}

impl PeriodRecord {
    /// Create a new record with zeroed flows
    pub fn new(period_index: u32, year_month: YearMonth) -> Self {
        Self {
            period_index,
            year_month,
            shares_at_start: 0.0,
            shares_at_end: 0.0,
            gross_dividend: 0.0,
            tax: 0.0,
            net_dividend: 0.0,
            reinvested_amount: 0.0,
            withdrawn_amount: 0.0,
            new_shares: 0.0,
            penalty: 0.0,
            tax_realized: 0.0,
            cumulative_tax_paid: 0.0,
            cumulative_dividends: 0.0,
            cumulative_reinvested: 0.0,
            cumulative_penalties: 0.0,
            deferred_tax_due: 0.0,
        }
    }
}

/// Complete result of one projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    /// Inputs that produced this ledger
    pub params: ProjectionParameters,

    /// Monthly records in chronological order
    records: Vec<PeriodRecord>,
}

impl Ledger {
    pub(crate) fn with_capacity(params: ProjectionParameters) -> Self {
        let capacity = params.period_count as usize;
        Self {
            params,
            records: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, record: PeriodRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[PeriodRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&PeriodRecord> {
        self.records.last()
    }

    /// Headline metrics for display
    pub fn summary(&self) -> LedgerSummary {
        let total_dividends: f64 = self.records.iter().map(|r| r.gross_dividend).sum();
        let total_tax_withheld: f64 = self.records.iter().map(|r| r.tax).sum();
        let total_penalties: f64 = self.records.iter().map(|r| r.penalty).sum();
        let total_reinvested: f64 = self.records.iter().map(|r| r.reinvested_amount).sum();
        let total_withdrawn: f64 = self.records.iter().map(|r| r.withdrawn_amount).sum();

        let final_shares = self
            .records
            .last()
            .map(|r| r.shares_at_end)
            .unwrap_or(self.params.initial_shares);
        let total_tax_paid = self.records.last().map(|r| r.cumulative_tax_paid).unwrap_or(0.0);
        let outstanding_tax_due = self.records.last().map(|r| r.deferred_tax_due).unwrap_or(0.0);

        LedgerSummary {
            total_periods: self.records.len() as u32,
            initial_shares: self.params.initial_shares,
            final_shares,
            shares_added: final_shares - self.params.initial_shares,
            total_dividends,
            total_tax_withheld,
            total_tax_paid,
            total_penalties,
            total_reinvested,
            total_withdrawn,
            outstanding_tax_due,
            final_annual_income: final_shares * self.params.average_monthly_dividend_per_share * 12.0,
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub total_periods: u32,
    pub initial_shares: f64,
    pub final_shares: f64,
    pub shares_added: f64,
    pub total_dividends: f64,
    pub total_tax_withheld: f64,
    pub total_tax_paid: f64,
    pub total_penalties: f64,
    pub total_reinvested: f64,
    pub total_withdrawn: f64,
    /// Deferred tax accrued after the last October of the run
    pub outstanding_tax_due: f64,
    /// Gross dividend run-rate of the final share count
    pub final_annual_income: f64,
}

/// Round a value for display; never applied inside the projection
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1234.56789, 2), 1234.57);
        assert_eq!(round_to(80.000049, 4), 80.0);
        assert_eq!(round_to(-2.345, 1), -2.3);
    }

    #[test]
    fn test_empty_ledger_summary_uses_initial_shares() {
        let params = ProjectionParameters {
            initial_shares: 750.0,
            ..Default::default()
        };
        let ledger = Ledger::with_capacity(params);
        let summary = ledger.summary();
        assert_eq!(summary.total_periods, 0);
        assert_eq!(summary.final_shares, 750.0);
        assert_eq!(summary.shares_added, 0.0);
    }
}
