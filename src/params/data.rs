//! Projection parameter set and the tax/reinvestment policies it resolves to

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{require_fraction, require_non_negative, require_positive, CalcError, Result};
use crate::market::MarketHistory;

/// Month in which deferred and October-only taxes are settled
pub const TAX_SETTLEMENT_MONTH: u32 = 10;

/// Flat penalty charged on deferred tax when it is settled
pub const DEFERRAL_PENALTY_RATE: f64 = 0.03;

/// Longest projection accepted, in months
pub const MAX_PERIOD_COUNT: u32 = 1200;

fn default_initial_shares() -> f64 { 10_000.0 }
fn default_dividend() -> f64 { 2.0 }
fn default_reinvestment_price() -> f64 { 25.0 }
fn default_period_count() -> u32 { 120 }
fn default_federal_rate() -> f64 { 0.22 }
fn default_state_rate() -> f64 { 0.05 }
fn default_true() -> bool { true }
pub(super) fn default_reinvest_percent() -> f64 { 1.0 }
fn default_start_date() -> NaiveDate { chrono::Local::now().date_naive() }

/// Tax treatment of the account holding the shares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    /// Brokerage account, dividends taxed as received (or deferred to October)
    Taxable,
    /// Tax only recognised on the October distribution each year
    TaxDeferred,
    /// Roth-style account, never taxed
    NonTaxable,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Taxable => "Taxable",
            AccountType::TaxDeferred => "TaxDeferred",
            AccountType::NonTaxable => "NonTaxable",
        }
    }
}

impl std::str::FromStr for AccountType {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "taxable" => Ok(AccountType::Taxable),
            "taxdeferred" => Ok(AccountType::TaxDeferred),
            "nontaxable" => Ok(AccountType::NonTaxable),
            other => Err(CalcError::invalid(
                "account_type",
                format!("unknown account type: {}", other),
            )),
        }
    }
}

/// Resolved tax rule applied to each period's gross dividend
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaxPolicy {
    /// No tax
    Exempt,
    /// Tax withheld from every distribution
    Withheld { rate: f64 },
    /// Tax accrued monthly and paid in October with a flat penalty
    DeferredToOctober { rate: f64, penalty_rate: f64 },
    /// Tax taken from the October distribution only
    OctoberOnly { rate: f64 },
}

/// Resolved rule for what happens to the net dividend
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReinvestmentPolicy {
    /// Buy shares with a fixed fraction of the net dividend
    Reinvest { percent: f64 },
    /// Take a fixed monthly amount, reinvest whatever is left
    Withdraw { monthly_withdrawal: f64 },
}

/// Calendar month a projection period falls in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    /// 1-12
    pub month: u32,
}

impl YearMonth {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Month `offset` months after this one
    pub fn plus_months(&self, offset: u32) -> Self {
        let zero_based = self.year as i64 * 12 + (self.month as i64 - 1) + offset as i64;
        Self {
            year: zero_based.div_euclid(12) as i32,
            month: zero_based.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn is_tax_settlement_month(&self) -> bool {
        self.month == TAX_SETTLEMENT_MONTH
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Inputs to a single projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionParameters {
    /// Shares held before the first period
    #[serde(default = "default_initial_shares")]
    pub initial_shares: f64,

    /// Expected distribution per share per month
    #[serde(default = "default_dividend")]
    pub average_monthly_dividend_per_share: f64,

    /// Price paid for reinvested shares
    #[serde(default = "default_reinvestment_price")]
    pub reinvestment_price_per_share: f64,

    /// Months to project
    #[serde(default = "default_period_count")]
    pub period_count: u32,

    #[serde(default = "default_account_type")]
    pub account_type: AccountType,

    #[serde(default = "default_federal_rate")]
    pub federal_tax_rate: f64,

    #[serde(default = "default_state_rate")]
    pub state_tax_rate: f64,

    /// Taxable accounts only: hold tax until October and pay a penalty
    #[serde(default)]
    pub defer_taxes_to_october: bool,

    #[serde(default = "default_true")]
    pub reinvest_dividends: bool,

    #[serde(default = "default_reinvest_percent")]
    pub reinvest_percent: f64,

    /// Cash taken each month when not reinvesting
    #[serde(default)]
    pub monthly_withdrawal: f64,

    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
}

fn default_account_type() -> AccountType {
    AccountType::NonTaxable
}

impl Default for ProjectionParameters {
    fn default() -> Self {
        Self {
            initial_shares: default_initial_shares(),
            average_monthly_dividend_per_share: default_dividend(),
            reinvestment_price_per_share: default_reinvestment_price(),
            period_count: default_period_count(),
            account_type: default_account_type(),
            federal_tax_rate: default_federal_rate(),
            state_tax_rate: default_state_rate(),
            defer_taxes_to_october: false,
            reinvest_dividends: true,
            reinvest_percent: default_reinvest_percent(),
            monthly_withdrawal: 0.0,
            start_date: default_start_date(),
        }
    }
}

impl ProjectionParameters {
    /// Check every field, naming the first one that is out of range
    pub fn validate(&self) -> Result<()> {
        require_non_negative("initial_shares", self.initial_shares)?;
        require_non_negative(
            "average_monthly_dividend_per_share",
            self.average_monthly_dividend_per_share,
        )?;
        require_positive("reinvestment_price_per_share", self.reinvestment_price_per_share)?;
        if self.period_count < 1 {
            return Err(CalcError::invalid("period_count", "must be at least 1"));
        }
        if self.period_count > MAX_PERIOD_COUNT {
            return Err(CalcError::invalid(
                "period_count",
                format!("must be at most {}", MAX_PERIOD_COUNT),
            ));
        }
        require_fraction("federal_tax_rate", self.federal_tax_rate)?;
        require_fraction("state_tax_rate", self.state_tax_rate)?;
        // Tax is taken at the sum, so it may never exceed the dividend
        if self.combined_tax_rate() > 1.0 {
            return Err(CalcError::invalid(
                "state_tax_rate",
                format!(
                    "federal plus state rate is {}, must not exceed 1",
                    self.combined_tax_rate()
                ),
            ));
        }
        require_fraction("reinvest_percent", self.reinvest_percent)?;
        require_non_negative("monthly_withdrawal", self.monthly_withdrawal)?;
        Ok(())
    }

    /// Combined federal and state rate
    pub fn combined_tax_rate(&self) -> f64 {
        self.federal_tax_rate + self.state_tax_rate
    }

    /// Resolve account type and deferral flag into a single tax rule
    pub fn tax_policy(&self) -> TaxPolicy {
        match self.account_type {
            AccountType::NonTaxable => TaxPolicy::Exempt,
            AccountType::Taxable if self.defer_taxes_to_october => TaxPolicy::DeferredToOctober {
                rate: self.combined_tax_rate(),
                penalty_rate: DEFERRAL_PENALTY_RATE,
            },
            AccountType::Taxable => TaxPolicy::Withheld {
                rate: self.combined_tax_rate(),
            },
            AccountType::TaxDeferred => TaxPolicy::OctoberOnly {
                rate: self.combined_tax_rate(),
            },
        }
    }

    pub fn reinvestment_policy(&self) -> ReinvestmentPolicy {
        if self.reinvest_dividends {
            ReinvestmentPolicy::Reinvest {
                percent: self.reinvest_percent,
            }
        } else {
            ReinvestmentPolicy::Withdraw {
                monthly_withdrawal: self.monthly_withdrawal,
            }
        }
    }

    /// Calendar month of a 1-indexed projection period
    pub fn period_month(&self, period_index: u32) -> YearMonth {
        YearMonth::from_date(self.start_date).plus_months(period_index.saturating_sub(1))
    }

    /// Take reinvestment price and dividend from the latest market observations
    ///
    /// Fields with no usable observation keep their current values.
    pub fn with_market_defaults(mut self, history: &MarketHistory, symbol: &str) -> Self {
        if let Some(obs) = history.latest(symbol) {
            self.reinvestment_price_per_share = obs.price;
        }
        if let Some(dividend) = history.average_dividend(symbol) {
            self.average_monthly_dividend_per_share = dividend;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ProjectionParameters {
        ProjectionParameters {
            start_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_validate() {
        assert!(params().validate().is_ok());
    }

    #[test]
    fn test_zero_reinvestment_price_rejected() {
        let p = ProjectionParameters {
            reinvestment_price_per_share: 0.0,
            ..params()
        };
        match p.validate() {
            Err(CalcError::InvalidParameter { field, .. }) => {
                assert_eq!(field, "reinvestment_price_per_share")
            }
            other => panic!("expected invalid parameter, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_period_count_rejected() {
        let p = ProjectionParameters {
            period_count: 0,
            ..params()
        };
        assert!(matches!(
            p.validate(),
            Err(CalcError::InvalidParameter { field: "period_count", .. })
        ));
    }

    #[test]
    fn test_period_count_capped() {
        let p = ProjectionParameters {
            period_count: MAX_PERIOD_COUNT,
            ..params()
        };
        assert!(p.validate().is_ok());

        let p = ProjectionParameters {
            period_count: u32::MAX,
            ..params()
        };
        assert!(matches!(
            p.validate(),
            Err(CalcError::InvalidParameter { field: "period_count", .. })
        ));
    }

    #[test]
    fn test_combined_tax_rate_above_one_rejected() {
        let p = ProjectionParameters {
            account_type: AccountType::Taxable,
            federal_tax_rate: 0.8,
            state_tax_rate: 0.5,
            ..params()
        };
        assert!(matches!(
            p.validate(),
            Err(CalcError::InvalidParameter { field: "state_tax_rate", .. })
        ));

        // Exactly 100% is still allowed
        let p = ProjectionParameters {
            federal_tax_rate: 0.75,
            state_tax_rate: 0.25,
            ..p
        };
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_tax_policy_resolution() {
        let mut p = params();
        p.federal_tax_rate = 0.2;
        p.state_tax_rate = 0.05;

        p.account_type = AccountType::NonTaxable;
        assert_eq!(p.tax_policy(), TaxPolicy::Exempt);

        p.account_type = AccountType::Taxable;
        assert_eq!(p.tax_policy(), TaxPolicy::Withheld { rate: 0.25 });

        p.defer_taxes_to_october = true;
        assert_eq!(
            p.tax_policy(),
            TaxPolicy::DeferredToOctober { rate: 0.25, penalty_rate: 0.03 }
        );

        // Deferral flag has no meaning outside Taxable
        p.account_type = AccountType::TaxDeferred;
        assert_eq!(p.tax_policy(), TaxPolicy::OctoberOnly { rate: 0.25 });
    }

    #[test]
    fn test_reinvestment_policy_resolution() {
        let mut p = params();
        p.reinvest_percent = 0.5;
        assert_eq!(p.reinvestment_policy(), ReinvestmentPolicy::Reinvest { percent: 0.5 });

        p.reinvest_dividends = false;
        p.monthly_withdrawal = 1200.0;
        assert_eq!(
            p.reinvestment_policy(),
            ReinvestmentPolicy::Withdraw { monthly_withdrawal: 1200.0 }
        );
    }

    #[test]
    fn test_period_month_rolls_over_year() {
        let p = params();
        assert_eq!(p.period_month(1), YearMonth { year: 2025, month: 1 });
        assert_eq!(p.period_month(12), YearMonth { year: 2025, month: 12 });
        assert_eq!(p.period_month(13), YearMonth { year: 2026, month: 1 });
        assert_eq!(p.period_month(22), YearMonth { year: 2026, month: 10 });
    }

    #[test]
    fn test_account_type_parsing() {
        assert_eq!("taxable".parse::<AccountType>().unwrap(), AccountType::Taxable);
        assert_eq!("Tax-Deferred".parse::<AccountType>().unwrap(), AccountType::TaxDeferred);
        assert_eq!("NonTaxable".parse::<AccountType>().unwrap(), AccountType::NonTaxable);
        assert!("roth".parse::<AccountType>().is_err());
    }

    #[test]
    fn test_json_defaults_fill_missing_fields() {
        let p: ProjectionParameters = serde_json::from_str(
            r#"{"initial_shares": 500, "start_date": "2025-03-01", "account_type": "Taxable"}"#,
        )
        .unwrap();
        assert_eq!(p.initial_shares, 500.0);
        assert_eq!(p.period_count, 120);
        assert_eq!(p.account_type, AccountType::Taxable);
        assert!(p.reinvest_dividends);
        assert_eq!(p.reinvest_percent, 1.0);
    }
}
