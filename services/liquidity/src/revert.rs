//! Revert reason classification for Uniswap V2 router calls
//!
//! The router reports slippage failures per router argument (`A`/`B`), not per asset.
//! Mapping them back onto request legs lets a failure say which minimum was violated.

use std::fmt;

use ethers::types::U256;

use crate::types::Leg;

/// Minimum bound sent for each router argument of one call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegBounds {
    pub a: (Leg, U256),
    pub b: (Leg, U256),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertCause {
    /// The pool could not pay out at least `minimum` of `leg`
    MinimumNotMet { leg: Leg, minimum: U256 },
    DeadlineExpired,
    InsufficientLiquidityMinted,
    InsufficientLiquidityBurned,
    /// Token pull or native refund failed, usually allowance or balance
    TransferFailed,
    Unknown,
}

impl RevertCause {
    pub fn violated_leg(&self) -> Option<Leg> {
        match self {
            RevertCause::MinimumNotMet { leg, .. } => Some(*leg),
            _ => None,
        }
    }
}

impl fmt::Display for RevertCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevertCause::MinimumNotMet { leg, minimum } => {
                write!(f, "{} minimum {} not met", leg, minimum)
            }
            RevertCause::DeadlineExpired => f.write_str("deadline expired"),
            RevertCause::InsufficientLiquidityMinted => {
                f.write_str("insufficient liquidity minted")
            }
            RevertCause::InsufficientLiquidityBurned => {
                f.write_str("insufficient liquidity burned")
            }
            RevertCause::TransferFailed => f.write_str("token transfer failed"),
            RevertCause::Unknown => f.write_str("unrecognized revert"),
        }
    }
}

/// Classify a revert reason string against the bounds of the call that produced it
pub fn classify_revert(reason: Option<&str>, bounds: &LegBounds) -> RevertCause {
    let Some(reason) = reason else {
        return RevertCause::Unknown;
    };

    if reason.contains("INSUFFICIENT_A_AMOUNT") {
        let (leg, minimum) = bounds.a;
        RevertCause::MinimumNotMet { leg, minimum }
    } else if reason.contains("INSUFFICIENT_B_AMOUNT") {
        let (leg, minimum) = bounds.b;
        RevertCause::MinimumNotMet { leg, minimum }
    } else if reason.contains("EXPIRED") {
        RevertCause::DeadlineExpired
    } else if reason.contains("INSUFFICIENT_LIQUIDITY_MINTED") {
        RevertCause::InsufficientLiquidityMinted
    } else if reason.contains("INSUFFICIENT_LIQUIDITY_BURNED") {
        RevertCause::InsufficientLiquidityBurned
    } else if reason.contains("TRANSFER_FROM_FAILED")
        || reason.contains("transferFrom failed")
        || reason.contains("ETH_TRANSFER_FAILED")
        || reason.contains("ds-math-sub-underflow")
        || reason.contains("insufficient allowance")
    {
        RevertCause::TransferFailed
    } else {
        RevertCause::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn native_bounds() -> LegBounds {
        LegBounds {
            a: (Leg::Token, U256::from(80u64)),
            b: (Leg::Native, U256::from(10u64)),
        }
    }

    #[test]
    fn test_minimum_maps_to_leg() {
        let cause = classify_revert(
            Some("UniswapV2Router: INSUFFICIENT_B_AMOUNT"),
            &native_bounds(),
        );
        assert_eq!(
            cause,
            RevertCause::MinimumNotMet {
                leg: Leg::Native,
                minimum: U256::from(10u64)
            }
        );
        assert_eq!(cause.to_string(), "native minimum 10 not met");

        let cause = classify_revert(
            Some("UniswapV2Router: INSUFFICIENT_A_AMOUNT"),
            &native_bounds(),
        );
        assert_eq!(cause.violated_leg(), Some(Leg::Token));
    }

    #[test]
    fn test_other_reasons() {
        let bounds = native_bounds();
        assert_eq!(
            classify_revert(Some("UniswapV2Router: EXPIRED"), &bounds),
            RevertCause::DeadlineExpired
        );
        assert_eq!(
            classify_revert(Some("UniswapV2: INSUFFICIENT_LIQUIDITY_BURNED"), &bounds),
            RevertCause::InsufficientLiquidityBurned
        );
        assert_eq!(
            classify_revert(Some("TransferHelper: TRANSFER_FROM_FAILED"), &bounds),
            RevertCause::TransferFailed
        );
        assert_eq!(
            classify_revert(Some("something else"), &bounds),
            RevertCause::Unknown
        );
        assert_eq!(classify_revert(None, &bounds), RevertCause::Unknown);
    }
}
