//! Scenario runner for batch projections
//!
//! Holds a base parameter set and runs many projections from it, in
//! parallel where there is more than one.

use log::{debug, warn};
use rayon::prelude::*;

use crate::error::Result;
use crate::params::ProjectionParameters;
use crate::projection::{Ledger, ProjectionEngine};

/// Base parameters plus batch execution helpers
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(params);
///
/// // Same position, different reinvestment prices
/// for ledger in runner.run_price_sweep(&[18.0, 22.0, 26.0]) {
///     println!("{:?}", ledger?.summary());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    base_params: ProjectionParameters,
}

impl ScenarioRunner {
    pub fn new(base_params: ProjectionParameters) -> Self {
        Self { base_params }
    }

    /// Run a single projection
    pub fn run(&self, params: &ProjectionParameters) -> Result<Ledger> {
        Ok(ProjectionEngine::new(params.clone())?.project())
    }

    /// Run the base parameters unchanged
    pub fn run_base(&self) -> Result<Ledger> {
        self.run(&self.base_params)
    }

    /// Run independent projections in parallel; output keeps input order
    pub fn run_batch(&self, params: &[ProjectionParameters]) -> Vec<Result<Ledger>> {
        debug!("running batch of {} projections", params.len());
        let results: Vec<Result<Ledger>> = params.par_iter().map(|p| self.run(p)).collect();

        let failures = results.iter().filter(|r| r.is_err()).count();
        if failures > 0 {
            warn!("{} of {} projections rejected their parameters", failures, results.len());
        }
        results
    }

    /// Base parameters re-run at each reinvestment price
    pub fn run_price_sweep(&self, prices: &[f64]) -> Vec<Result<Ledger>> {
        let params: Vec<_> = prices
            .iter()
            .map(|&price| ProjectionParameters {
                reinvestment_price_per_share: price,
                ..self.base_params.clone()
            })
            .collect();
        self.run_batch(&params)
    }

    pub fn base(&self) -> &ProjectionParameters {
        &self.base_params
    }

    pub fn base_mut(&mut self) -> &mut ProjectionParameters {
        &mut self.base_params
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new(ProjectionParameters::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::AccountType;
    use chrono::NaiveDate;

    fn base() -> ProjectionParameters {
        ProjectionParameters {
            initial_shares: 1_000.0,
            average_monthly_dividend_per_share: 1.8,
            reinvestment_price_per_share: 22.0,
            period_count: 60,
            account_type: AccountType::Taxable,
            federal_tax_rate: 0.22,
            state_tax_rate: 0.05,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            ..Default::default()
        }
    }

    #[test]
    fn test_price_sweep_orders_results() {
        let runner = ScenarioRunner::new(base());
        let results = runner.run_price_sweep(&[15.0, 20.0, 30.0]);
        assert_eq!(results.len(), 3);

        let finals: Vec<f64> = results
            .into_iter()
            .map(|r| r.unwrap().summary().final_shares)
            .collect();
        // Cheaper reinvestment buys more shares
        assert!(finals[0] > finals[1]);
        assert!(finals[1] > finals[2]);
    }

    #[test]
    fn test_batch_matches_sequential() {
        let runner = ScenarioRunner::new(base());
        let params: Vec<_> = (1..=8)
            .map(|m| ProjectionParameters {
                period_count: m * 6,
                ..base()
            })
            .collect();

        let batch = runner.run_batch(&params);
        for (p, result) in params.iter().zip(batch) {
            let sequential = runner.run(p).unwrap();
            assert_eq!(result.unwrap(), sequential);
        }
    }

    #[test]
    fn test_batch_keeps_failures_in_place() {
        let runner = ScenarioRunner::new(base());
        let results = runner.run_price_sweep(&[20.0, 0.0, 25.0]);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_base_mut_changes_runs() {
        let mut runner = ScenarioRunner::new(base());
        runner.base_mut().period_count = 6;
        assert_eq!(runner.run_base().unwrap().len(), 6);
        assert_eq!(runner.base().period_count, 6);
    }
}
