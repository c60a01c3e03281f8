//! Bounded in-memory history of market observations
//!
//! Observations are supplied by whatever fetches quotes; this module only
//! keeps the most recent ones so they can seed projection defaults.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::error::{require_non_negative, require_positive, CalcError, Result};

/// Maximum number of observations retained
pub const MAX_MARKET_HISTORY: usize = 30;

/// A single price (and optional distribution) observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketObservation {
    pub symbol: String,
    pub observed_at: NaiveDateTime,
    pub price: f64,
    pub dividend_per_share: Option<f64>,
}

/// FIFO of the latest observations across all symbols
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "StoredHistory")]
pub struct MarketHistory {
    capacity: usize,
    entries: VecDeque<MarketObservation>,
}

/// Serialized form; replayed through `record` so the cap holds after loading
#[derive(Deserialize)]
struct StoredHistory {
    capacity: usize,
    entries: Vec<MarketObservation>,
}

impl TryFrom<StoredHistory> for MarketHistory {
    type Error = CalcError;

    fn try_from(stored: StoredHistory) -> Result<Self> {
        let mut history = MarketHistory::with_capacity(stored.capacity);
        for observation in stored.entries {
            history.record(observation)?;
        }
        Ok(history)
    }
}

impl Default for MarketHistory {
    fn default() -> Self {
        Self::with_capacity(MAX_MARKET_HISTORY)
    }
}

impl MarketHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capacity is clamped to `1..=MAX_MARKET_HISTORY`
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_MARKET_HISTORY);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Append an observation, dropping the oldest when full
    pub fn record(&mut self, observation: MarketObservation) -> Result<()> {
        require_positive("price", observation.price)?;
        if let Some(dividend) = observation.dividend_per_share {
            require_non_negative("dividend_per_share", dividend)?;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(observation);
        Ok(())
    }

    /// Most recently recorded observation for a symbol
    pub fn latest(&self, symbol: &str) -> Option<&MarketObservation> {
        self.entries.iter().rev().find(|o| o.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Mean of the recorded distributions for a symbol
    pub fn average_dividend(&self, symbol: &str) -> Option<f64> {
        let dividends: Vec<f64> = self
            .entries
            .iter()
            .filter(|o| o.symbol.eq_ignore_ascii_case(symbol))
            .filter_map(|o| o.dividend_per_share)
            .collect();
        if dividends.is_empty() {
            None
        } else {
            Some(dividends.iter().sum::<f64>() / dividends.len() as f64)
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &MarketObservation> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ProjectionParameters;
    use chrono::NaiveDate;

    fn obs(symbol: &str, day: u32, price: f64, dividend: Option<f64>) -> MarketObservation {
        MarketObservation {
            symbol: symbol.to_string(),
            observed_at: NaiveDate::from_ymd_opt(2025, 5, day)
                .unwrap()
                .and_hms_opt(16, 0, 0)
                .unwrap(),
            price,
            dividend_per_share: dividend,
        }
    }

    #[test]
    fn test_history_is_capped() {
        let mut history = MarketHistory::new();
        for i in 0..45 {
            history.record(obs("MSTY", 1 + (i % 28), 20.0 + i as f64, None)).unwrap();
        }
        assert_eq!(history.len(), MAX_MARKET_HISTORY);
        // Oldest fifteen were dropped
        assert_eq!(history.iter().next().unwrap().price, 35.0);
        assert_eq!(history.latest("MSTY").unwrap().price, 64.0);
    }

    #[test]
    fn test_latest_per_symbol() {
        let mut history = MarketHistory::new();
        history.record(obs("MSTY", 1, 21.0, Some(2.1))).unwrap();
        history.record(obs("MSTR", 1, 390.0, None)).unwrap();
        history.record(obs("MSTY", 2, 22.5, Some(1.9))).unwrap();

        assert_eq!(history.latest("msty").unwrap().price, 22.5);
        assert_eq!(history.latest("MSTR").unwrap().price, 390.0);
        assert!(history.latest("TSLY").is_none());
        assert!((history.average_dividend("MSTY").unwrap() - 2.0).abs() < 1e-12);
        assert!(history.average_dividend("MSTR").is_none());
    }

    #[test]
    fn test_rejects_bad_price() {
        let mut history = MarketHistory::new();
        assert!(history.record(obs("MSTY", 1, 0.0, None)).is_err());
        assert!(history.record(obs("MSTY", 1, 20.0, Some(-1.0))).is_err());
        assert!(history.is_empty());
    }

    #[test]
    fn test_capacity_clamped() {
        assert_eq!(MarketHistory::with_capacity(0).capacity(), 1);
        assert_eq!(MarketHistory::with_capacity(500).capacity(), MAX_MARKET_HISTORY);
    }

    #[test]
    fn test_deserialize_enforces_cap() {
        let entries: Vec<_> = (0..40)
            .map(|i| obs("MSTY", 1 + (i % 28), 20.0 + i as f64, None))
            .collect();
        let json = serde_json::json!({ "capacity": 0, "entries": entries });
        let history: MarketHistory = serde_json::from_value(json).unwrap();
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest("MSTY").unwrap().price, 59.0);

        let json = serde_json::json!({ "capacity": 1000, "entries": entries });
        let mut history: MarketHistory = serde_json::from_value(json).unwrap();
        assert_eq!(history.len(), MAX_MARKET_HISTORY);
        history.record(obs("MSTY", 3, 99.0, None)).unwrap();
        assert_eq!(history.len(), MAX_MARKET_HISTORY);
        assert_eq!(history.iter().next().unwrap().price, 31.0);
    }

    #[test]
    fn test_deserialize_rejects_bad_observation() {
        let json = serde_json::json!({
            "capacity": 5,
            "entries": [obs("MSTY", 1, -3.0, None)],
        });
        assert!(serde_json::from_value::<MarketHistory>(json).is_err());
    }

    #[test]
    fn test_serialized_history_reloads() {
        let mut history = MarketHistory::with_capacity(3);
        for day in 1..=4 {
            history.record(obs("MSTY", day, 20.0 + day as f64, Some(2.0))).unwrap();
        }
        let text = serde_json::to_string(&history).unwrap();
        let reloaded: MarketHistory = serde_json::from_str(&text).unwrap();
        assert_eq!(reloaded.capacity(), 3);
        assert_eq!(reloaded.iter().cloned().collect::<Vec<_>>(), history.iter().cloned().collect::<Vec<_>>());
    }

    #[test]
    fn test_seeds_projection_defaults() {
        let mut history = MarketHistory::with_capacity(5);
        history.record(obs("MSTY", 1, 24.0, Some(2.5))).unwrap();
        history.record(obs("MSTY", 2, 23.0, Some(1.5))).unwrap();

        let params = ProjectionParameters::default().with_market_defaults(&history, "MSTY");
        assert_eq!(params.reinvestment_price_per_share, 23.0);
        assert!((params.average_monthly_dividend_per_share - 2.0).abs() < 1e-12);

        // Unknown symbol leaves values alone
        let untouched = ProjectionParameters::default().with_market_defaults(&history, "MSTR");
        assert_eq!(untouched.reinvestment_price_per_share, 25.0);
    }
}
