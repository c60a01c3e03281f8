//! Error types shared by the projection engine, calculators and loaders

/// Top-level error type for the calculator library
#[derive(Debug, thiserror::Error)]
pub enum CalcError {
    /// An input failed validation before any computation started
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    /// A CSV row parsed but could not be turned into a domain value
    #[error("invalid record on line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CalcError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        CalcError::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;

/// Reject values that are NaN, infinite or below zero
pub(crate) fn require_non_negative(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(CalcError::invalid(field, format!("must be a finite number, got {}", value)));
    }
    if value < 0.0 {
        return Err(CalcError::invalid(field, format!("must be non-negative, got {}", value)));
    }
    Ok(())
}

/// Reject values that are not strictly positive (divisors)
pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CalcError::invalid(field, format!("must be greater than zero, got {}", value)));
    }
    Ok(())
}

/// Reject rates outside [0, 1]
pub(crate) fn require_fraction(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(CalcError::invalid(field, format!("must be between 0 and 1, got {}", value)));
    }
    Ok(())
}
