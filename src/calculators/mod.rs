//! Closed-form calculators that share the projection's inputs

pub mod compounding;
pub mod cost_basis;
pub mod debt;

pub use compounding::{future_value, CompoundingFrequency, CompoundingParams, CompoundingResult};
pub use cost_basis::{load_lots, load_lots_from_reader, CostBasisSummary, CostBasisTracker, PurchaseLot};
pub use debt::{calculate_debt_return, DebtReturnParams, DebtReturnResult, InterestMode};
