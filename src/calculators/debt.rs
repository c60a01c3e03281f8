//! Return on a share purchase financed with debt
//!
//! Single-shot estimate: buy shares with the loan, service the loan from
//! the dividends, and reinvest whatever is left each month.

use serde::{Deserialize, Serialize};

use crate::error::{require_fraction, require_non_negative, require_positive, CalcError, Result};

/// How interest over the life of the loan is accounted for
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InterestMode {
    /// Interest is whatever the payment schedule pays beyond principal:
    /// `monthly_payment * loan_term_months - debt_amount`
    FlatSchedule,
    /// Simple interest on the full balance for the whole term
    SimpleInterest { annual_interest_rate: f64 },
}

/// Inputs to the debt-financed purchase calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtReturnParams {
    pub debt_amount: f64,
    pub monthly_payment: f64,
    /// Price paid for the shares bought with the loan
    pub cost_basis_per_share: f64,
    pub loan_term_months: u32,
    /// Months over which leftover dividends are reinvested
    pub compounding_term_months: u32,
    pub reinvestment_price_per_share: f64,
    pub average_monthly_dividend_per_share: f64,
    /// Projected share price when the position is closed
    pub expected_end_price: f64,
    pub interest_mode: InterestMode,
}

impl DebtReturnParams {
    pub fn validate(&self) -> Result<()> {
        require_non_negative("debt_amount", self.debt_amount)?;
        require_non_negative("monthly_payment", self.monthly_payment)?;
        require_positive("cost_basis_per_share", self.cost_basis_per_share)?;
        if self.loan_term_months < 1 {
            return Err(CalcError::invalid("loan_term_months", "must be at least 1"));
        }
        if self.compounding_term_months < 1 {
            return Err(CalcError::invalid("compounding_term_months", "must be at least 1"));
        }
        require_positive("reinvestment_price_per_share", self.reinvestment_price_per_share)?;
        require_non_negative(
            "average_monthly_dividend_per_share",
            self.average_monthly_dividend_per_share,
        )?;
        require_non_negative("expected_end_price", self.expected_end_price)?;
        if let InterestMode::SimpleInterest { annual_interest_rate } = self.interest_mode {
            require_fraction("annual_interest_rate", annual_interest_rate)?;
        }
        Ok(())
    }

    /// Total interest over the loan term under the selected mode
    pub fn total_interest_paid(&self) -> f64 {
        match self.interest_mode {
            InterestMode::FlatSchedule => {
                self.monthly_payment * self.loan_term_months as f64 - self.debt_amount
            }
            InterestMode::SimpleInterest { annual_interest_rate } => {
                (self.debt_amount * annual_interest_rate / 12.0) * self.loan_term_months as f64
            }
        }
    }
}

/// Outcome of the debt-financed purchase calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtReturnResult {
    pub initial_shares: f64,
    pub total_interest_paid: f64,
    pub monthly_dividend_income: f64,
    pub reinvestable_amount: f64,
    pub new_shares: f64,
    pub final_share_count: f64,
    pub portfolio_value_at_exit: f64,
    pub net_value_after_debt: f64,
}

/// Run the calculator
///
/// New shares accrue linearly: one month's reinvestable amount converted at
/// the reinvestment price, times the compounding term. Reinvested shares do
/// not themselves earn dividends here.
pub fn calculate_debt_return(params: &DebtReturnParams) -> Result<DebtReturnResult> {
    params.validate()?;

    let initial_shares = params.debt_amount / params.cost_basis_per_share;
    let monthly_dividend_income = initial_shares * params.average_monthly_dividend_per_share;
    let reinvestable_amount = (monthly_dividend_income - params.monthly_payment).max(0.0);
    let new_shares = (reinvestable_amount / params.reinvestment_price_per_share)
        * params.compounding_term_months as f64;
    let final_share_count = initial_shares + new_shares;
    let portfolio_value_at_exit = final_share_count * params.expected_end_price;

    Ok(DebtReturnResult {
        initial_shares,
        total_interest_paid: params.total_interest_paid(),
        monthly_dividend_income,
        reinvestable_amount,
        new_shares,
        final_share_count,
        portfolio_value_at_exit,
        net_value_after_debt: portfolio_value_at_exit - params.debt_amount,
    })
}
