pub mod error;
pub mod loan;
pub mod math;
pub mod payment;
pub mod rate;
pub mod schedule;
pub mod types;

#[cfg(feature = "strategies")]
pub mod strategies;

#[cfg(feature = "strategies")]
pub mod comparison;

pub use error::AmortizationError;
pub use types::*;

/// Standard result type for all amortization operations
pub type AmortizationResult<T> = Result<T, AmortizationError>;
