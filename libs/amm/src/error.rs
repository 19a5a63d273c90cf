//! Error types for quote calculations

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    #[error("Invalid slippage tolerance {value}: must be within [0, 1]")]
    InvalidTolerance { value: String },

    #[error("Tolerance {value} is finer than one basis point")]
    TolerancePrecision { value: String },
}

pub type Result<T> = std::result::Result<T, QuoteError>;
