pub mod currency;
pub mod error;
pub mod fixed_point;
pub mod time_value;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "export")]
pub mod export;

pub use currency::Currency;
pub use error::LoanCalcError;
pub use types::*;

/// Standard result type for all loancalc operations
pub type LoanCalcResult<T> = Result<T, LoanCalcError>;
