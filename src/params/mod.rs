//! Projection parameters and scenario loading

mod data;
pub mod loader;

pub use data::{
    AccountType, ProjectionParameters, ReinvestmentPolicy, TaxPolicy, YearMonth,
    DEFERRAL_PENALTY_RATE, MAX_PERIOD_COUNT, TAX_SETTLEMENT_MONTH,
};
pub use loader::{load_parameters, load_parameters_from_reader, load_scenarios, load_scenarios_from_reader, Scenario};
