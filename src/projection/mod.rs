//! Projection engine for monthly dividend reinvestment projections

mod state;
mod engine;
mod ledger;
mod aggregate;

pub use state::ProjectionState;
pub use engine::{project, ProjectionEngine};
pub use ledger::{round_to, Ledger, LedgerSummary, PeriodRecord};
pub use aggregate::{aggregate, LedgerView, SummaryPeriod, SummaryRow};
