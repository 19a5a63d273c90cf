//! Slippage minimums and withdrawal clamping with exact integer math
//!
//! All amounts are raw token base units (`U256`), matching what the router expects.
//! Rounding is always toward the smaller value so that a computed minimum never demands
//! more than the caller asked for.

use ethers_core::types::{U256, U512};
use tracing::debug;

use crate::tolerance::{SlippageTolerance, BPS_DENOMINATOR};

/// Outcome of clamping a requested liquidity burn against a live balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawalQuote {
    pub requested: U256,
    pub available: U256,
    /// Amount that is safe to burn
    pub amount: U256,
}

impl WithdrawalQuote {
    /// True when the balance could not cover the request and the amount was reduced
    pub fn is_clamped(&self) -> bool {
        self.amount != self.requested
    }
}

/// Quote functions for liquidity provisioning, all pure
pub struct QuoteCalculator;

impl QuoteCalculator {
    /// Minimum acceptable amount for `desired` under `tolerance`
    ///
    /// Computes `floor(desired * (1 - tolerance))`. Splitting `desired` into quotient and
    /// remainder by the bps denominator keeps every intermediate below `desired`, so the
    /// result is exact for the full `U256` range.
    ///
    /// # Returns
    /// * `desired` when the tolerance is zero
    /// * zero when the tolerance is total
    pub fn minimum_amount(desired: U256, tolerance: SlippageTolerance) -> U256 {
        let denominator = U256::from(BPS_DENOMINATOR);
        let retained = U256::from(tolerance.retained_bps());

        let quotient = desired / denominator;
        let remainder = desired % denominator;

        quotient * retained + remainder * retained / denominator
    }

    /// Liquidity amount that is safe to burn given the live balance
    ///
    /// Returns `requested` when the balance covers it. Otherwise returns half of the
    /// available balance rather than the whole of it, so a balance that shrank between
    /// read and decision is never fully liquidated.
    pub fn safe_withdrawal_amount(requested: U256, available: U256) -> U256 {
        if available >= requested {
            requested
        } else {
            available / U256::from(2u64)
        }
    }

    /// Same as [`Self::safe_withdrawal_amount`] but keeps the inputs for reporting
    pub fn withdrawal_quote(requested: U256, available: U256) -> WithdrawalQuote {
        let amount = Self::safe_withdrawal_amount(requested, available);
        if amount != requested {
            debug!(
                "Clamped withdrawal from {} to {} (available {})",
                requested, amount, available
            );
        }
        WithdrawalQuote {
            requested,
            available,
            amount,
        }
    }

    /// Scale a minimum computed for `original` down to a `clamped` burn amount
    ///
    /// Pool payouts are proportional to the liquidity burned, so a minimum that was
    /// feasible for `original` stays equally tight at `floor(minimum * clamped / original)`.
    /// Amounts that were not reduced keep their minimum unchanged.
    pub fn pro_rata_minimum(minimum: U256, original: U256, clamped: U256) -> U256 {
        if original.is_zero() || clamped >= original {
            return minimum;
        }

        let scaled: U512 = minimum.full_mul(clamped) / U512::from(original);
        // clamped < original so the scaled value is below `minimum`
        U256::try_from(scaled).unwrap_or(minimum)
    }
}
