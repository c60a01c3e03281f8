//! Closed-form future value under periodic compounding

use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, CalcError, Result};

/// How often growth is credited within a year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompoundingFrequency {
    Annually,
    SemiAnnually,
    Quarterly,
    Monthly,
}

impl CompoundingFrequency {
    pub fn periods_per_year(&self) -> u32 {
        match self {
            CompoundingFrequency::Annually => 1,
            CompoundingFrequency::SemiAnnually => 2,
            CompoundingFrequency::Quarterly => 4,
            CompoundingFrequency::Monthly => 12,
        }
    }
}

impl std::str::FromStr for CompoundingFrequency {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "annually" | "annual" | "yearly" => Ok(CompoundingFrequency::Annually),
            "semiannually" | "semiannual" => Ok(CompoundingFrequency::SemiAnnually),
            "quarterly" => Ok(CompoundingFrequency::Quarterly),
            "monthly" => Ok(CompoundingFrequency::Monthly),
            other => Err(CalcError::invalid(
                "frequency",
                format!("unknown compounding frequency: {}", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundingParams {
    pub principal: f64,
    /// Annual rate as a decimal (0.05 for 5%)
    pub annual_rate: f64,
    pub years: u32,
    pub frequency: CompoundingFrequency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundingResult {
    pub total_periods: u32,
    pub future_value: f64,
    pub total_growth: f64,
}

/// `principal * (1 + rate / n) ^ (n * years)`
pub fn future_value(params: &CompoundingParams) -> Result<CompoundingResult> {
    require_non_negative("principal", params.principal)?;
    require_non_negative("annual_rate", params.annual_rate)?;
    if params.years < 1 {
        return Err(CalcError::invalid("years", "must be at least 1"));
    }

    let n = params.frequency.periods_per_year();
    let total_periods = n * params.years;
    let periodic_rate = params.annual_rate / n as f64;
    let future_value = params.principal * (1.0 + periodic_rate).powf(total_periods as f64);

    Ok(CompoundingResult {
        total_periods,
        future_value,
        total_growth: future_value - params.principal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_annual_compounding() {
        let result = future_value(&CompoundingParams {
            principal: 10_000.0,
            annual_rate: 0.05,
            years: 10,
            frequency: CompoundingFrequency::Annually,
        })
        .unwrap();
        assert_eq!(result.total_periods, 10);
        assert_relative_eq!(result.future_value, 16_288.94626777442, max_relative = 1e-10);
    }

    #[test]
    fn test_monthly_beats_annual() {
        let base = CompoundingParams {
            principal: 10_000.0,
            annual_rate: 0.05,
            years: 10,
            frequency: CompoundingFrequency::Annually,
        };
        let annual = future_value(&base).unwrap();
        let monthly = future_value(&CompoundingParams {
            frequency: CompoundingFrequency::Monthly,
            ..base
        })
        .unwrap();
        assert_eq!(monthly.total_periods, 120);
        assert!(monthly.future_value > annual.future_value);
        assert_relative_eq!(monthly.future_value, 16_470.0949769028, max_relative = 1e-10);
    }

    #[test]
    fn test_zero_rate_keeps_principal() {
        let result = future_value(&CompoundingParams {
            principal: 2_500.0,
            annual_rate: 0.0,
            years: 3,
            frequency: CompoundingFrequency::Quarterly,
        })
        .unwrap();
        assert_eq!(result.future_value, 2_500.0);
        assert_eq!(result.total_growth, 0.0);
    }

    #[test]
    fn test_frequency_parsing() {
        assert_eq!(
            "Semi-Annually".parse::<CompoundingFrequency>().unwrap(),
            CompoundingFrequency::SemiAnnually
        );
        assert!("daily".parse::<CompoundingFrequency>().is_err());
    }

    #[test]
    fn test_zero_years_rejected() {
        let err = future_value(&CompoundingParams {
            principal: 1.0,
            annual_rate: 0.05,
            years: 0,
            frequency: CompoundingFrequency::Monthly,
        });
        assert!(matches!(err, Err(CalcError::InvalidParameter { field: "years", .. })));
    }
}
