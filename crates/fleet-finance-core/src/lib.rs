pub mod declarations;
pub mod error;
pub mod exits;
pub mod ledger;
pub mod payments;
pub mod store;
pub mod types;

#[cfg(feature = "reporting")]
pub mod reporting;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::FleetFinanceError;
pub use types::*;

/// Standard result type for all fleet-finance operations
pub type FleetFinanceResult<T> = Result<T, FleetFinanceError>;
