//! Running state carried from one projection month to the next

use crate::params::{ProjectionParameters, YearMonth};

/// State of the position at a point in time during projection
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Current projection period (1-indexed, 0 before the first advance)
    pub period_index: u32,

    /// Calendar month of the current period
    pub year_month: YearMonth,

    /// Shares held at the start of the current period
    pub shares_at_start: f64,

    /// Shares held after this period's reinvestment
    pub shares_at_end: f64,

    /// Deferred tax accrued but not yet paid
    pub tax_due: f64,

    /// Tax actually paid so far (withheld or settled)
    pub cumulative_tax_paid: f64,

    pub cumulative_dividends: f64,
    pub cumulative_reinvested: f64,
    pub cumulative_penalties: f64,
}

impl ProjectionState {
    /// Initialize state from parameters at projection start
    pub fn from_params(params: &ProjectionParameters) -> Self {
        Self {
            period_index: 0,
            year_month: params.period_month(1),
            shares_at_start: params.initial_shares,
            shares_at_end: params.initial_shares,
            tax_due: 0.0,
            cumulative_tax_paid: 0.0,
            cumulative_dividends: 0.0,
            cumulative_reinvested: 0.0,
            cumulative_penalties: 0.0,
        }
    }

    /// Advance to next month; opening shares come from the prior close
    pub fn advance_month(&mut self, params: &ProjectionParameters) {
        self.period_index += 1;
        self.year_month = params.period_month(self.period_index);
        self.shares_at_start = self.shares_at_end;
    }

    /// Pay out the deferred balance, returning the amount settled
    pub fn settle_tax_due(&mut self) -> f64 {
        let settled = self.tax_due;
        self.cumulative_tax_paid += settled;
        self.tax_due = 0.0;
        settled
    }
}
