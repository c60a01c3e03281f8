//! MSTY Calculator - Dividend reinvestment projections for option-income ETF holders
//!
//! This library provides:
//! - Month-by-month reinvestment projections with tax and withdrawal policies
//! - Monthly, yearly and whole-run ledger views
//! - Debt-financed purchase, cost-basis and compounding calculators
//! - A bounded market observation history for seeding inputs
//! - Batch scenario execution

pub mod error;
pub mod params;
pub mod projection;
pub mod calculators;
pub mod market;
pub mod scenario;

// Re-export commonly used types
pub use error::{CalcError, Result};
pub use params::{AccountType, ProjectionParameters, ReinvestmentPolicy, TaxPolicy, YearMonth};
pub use projection::{project, Ledger, LedgerView, PeriodRecord, ProjectionEngine, SummaryRow};
pub use market::{MarketHistory, MarketObservation};
pub use scenario::ScenarioRunner;
