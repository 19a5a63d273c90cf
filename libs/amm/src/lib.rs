//! # Tidepool AMM Library - Slippage and Withdrawal Quoting
//!
//! ## Purpose
//!
//! Pure integer arithmetic for liquidity provisioning against constant-product pools.
//! Derives the minimum amounts a liquidity provider is willing to accept from a desired
//! amount and a slippage tolerance, and derives a safe liquidity-token burn amount from a
//! live balance reading. Performs no I/O: every input is a value, every output is a value.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Desired amounts and tolerances from liquidity requests, balance
//!   snapshots read by the orchestrator
//! - **Output Destinations**: Router `amountMin` parameters, liquidity burn amounts
//! - **Precision**: Raw `U256` base units throughout, tolerances in basis points
//!
//! ## Architecture Role
//!
//! ```text
//! Liquidity Request → [SlippageTolerance] → [QuoteCalculator] → Router call parameters
//!        ↓                   ↓                     ↓                    ↓
//! "0.2" / 2000bps     Validated [0, 1]     minimum_amount()       amountAMin / amountBMin
//! Balance Snapshot    Fixed point bps      safe_withdrawal_amount  liquidity to burn
//! ```
//!
//! Tolerances are never represented as binary floating point. Decimal literals are parsed
//! with `rust_decimal` and converted once into basis points.

pub mod error;
pub mod quote;
pub mod tolerance;

pub use error::{QuoteError, Result};
pub use quote::{QuoteCalculator, WithdrawalQuote};
pub use tolerance::{SlippageTolerance, BPS_DENOMINATOR};

/// Common types for quote calculations
pub use ethers_core::types::U256;
pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;
