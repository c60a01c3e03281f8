//! Core projection engine for monthly dividend reinvestment projections

use log::{debug, trace};

use super::ledger::{Ledger, PeriodRecord};
use super::state::ProjectionState;
use crate::error::Result;
use crate::params::{ProjectionParameters, ReinvestmentPolicy, TaxPolicy};

/// Main projection engine
///
/// Resolves the parameter set into its tax and reinvestment policies once,
/// then folds month by month over the share count.
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    params: ProjectionParameters,
    tax: TaxPolicy,
    reinvestment: ReinvestmentPolicy,
}

impl ProjectionEngine {
    /// Create a new engine, rejecting invalid parameters up front
    pub fn new(params: ProjectionParameters) -> Result<Self> {
        params.validate()?;
        let tax = params.tax_policy();
        let reinvestment = params.reinvestment_policy();
        Ok(Self {
            params,
            tax,
            reinvestment,
        })
    }

    pub fn params(&self) -> &ProjectionParameters {
        &self.params
    }

    /// Run the projection and return the full monthly ledger
    pub fn project(&self) -> Ledger {
        debug!(
            "projecting {} months from {} shares ({:?}, {:?})",
            self.params.period_count, self.params.initial_shares, self.tax, self.reinvestment
        );

        let mut ledger = Ledger::with_capacity(self.params.clone());
        let mut state = ProjectionState::from_params(&self.params);

        for _period in 1..=self.params.period_count {
            state.advance_month(&self.params);
            let record = self.calculate_month(&mut state);
            trace!(
                "period {} ({}): gross={:.4} tax={:.4} reinvested={:.4} shares={:.6}",
                record.period_index,
                record.year_month,
                record.gross_dividend,
                record.tax,
                record.reinvested_amount,
                record.shares_at_end
            );
            ledger.push(record);
        }

        debug!(
            "projection complete: {} shares after {} months",
            state.shares_at_end, self.params.period_count
        );
        ledger
    }

    /// Calculate flows for a single month and roll the state forward
    fn calculate_month(&self, state: &mut ProjectionState) -> PeriodRecord {
        let mut row = PeriodRecord::new(state.period_index, state.year_month);
        row.shares_at_start = state.shares_at_start;

        row.gross_dividend = state.shares_at_start * self.params.average_monthly_dividend_per_share;

        self.apply_tax(state, &mut row);
        row.net_dividend = row.gross_dividend - row.tax;

        self.apply_reinvestment(&mut row);
        row.new_shares = row.reinvested_amount / self.params.reinvestment_price_per_share;
        row.shares_at_end = state.shares_at_start + row.new_shares;

        // Update state for next month
        state.shares_at_end = row.shares_at_end;
        state.cumulative_dividends += row.gross_dividend;
        state.cumulative_reinvested += row.reinvested_amount;
        state.cumulative_penalties += row.penalty;

        row.cumulative_tax_paid = state.cumulative_tax_paid;
        row.cumulative_dividends = state.cumulative_dividends;
        row.cumulative_reinvested = state.cumulative_reinvested;
        row.cumulative_penalties = state.cumulative_penalties;
        row.deferred_tax_due = state.tax_due;

        row
    }

    /// Compute this month's withheld tax, deferral accrual and settlement
    fn apply_tax(&self, state: &mut ProjectionState, row: &mut PeriodRecord) {
        let settlement_month = state.year_month.is_tax_settlement_month();

        match self.tax {
            TaxPolicy::Exempt => {
                row.tax = 0.0;
            }
            TaxPolicy::Withheld { rate } => {
                row.tax = rate * row.gross_dividend;
                state.cumulative_tax_paid += row.tax;
            }
            TaxPolicy::DeferredToOctober { rate, penalty_rate } => {
                // Accrue first so October's own tax is settled with the rest
                state.tax_due += rate * row.gross_dividend;
                row.tax = 0.0;
                if settlement_month && state.tax_due > 0.0 {
                    let settled = state.settle_tax_due();
                    row.tax_realized = settled;
                    row.penalty = settled * penalty_rate;
                }
            }
            TaxPolicy::OctoberOnly { rate } => {
                row.tax = if settlement_month {
                    rate * row.gross_dividend
                } else {
                    0.0
                };
                state.cumulative_tax_paid += row.tax;
            }
        }
    }

    /// Split the net dividend between new shares and cash taken out
    fn apply_reinvestment(&self, row: &mut PeriodRecord) {
        match self.reinvestment {
            ReinvestmentPolicy::Reinvest { percent } => {
                row.reinvested_amount = row.net_dividend * percent;
                row.withdrawn_amount = row.net_dividend - row.reinvested_amount;
            }
            ReinvestmentPolicy::Withdraw { monthly_withdrawal } => {
                // Shortfall is not funded by selling shares
                row.reinvested_amount = (row.net_dividend - monthly_withdrawal).max(0.0);
                row.withdrawn_amount = row.net_dividend.min(monthly_withdrawal);
            }
        }
    }
}

/// Validate parameters and run a projection in one call
pub fn project(params: ProjectionParameters) -> Result<Ledger> {
    Ok(ProjectionEngine::new(params)?.project())
}
