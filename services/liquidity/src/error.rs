//! Error types for liquidity flows
//!
//! Input errors are raised while a flow is still `Requested`, before any network call.
//! On-chain failures carry the stage they happened in so the caller can judge whether
//! re-issuing the whole flow is safe. Nothing is retried here.

use ethers::types::{Address, U256};
use thiserror::Error;
use tidepool_amm::QuoteError;

use crate::clients::ClientError;
use crate::flow::FlowState;
use crate::revert::RevertCause;
use crate::types::Leg;

#[derive(Debug, Error)]
pub enum LiquidityError {
    #[error("Invalid slippage tolerance {tolerance}: {reason}")]
    InvalidTolerance { tolerance: String, reason: String },

    #[error("Invalid {leg} amount: {reason}")]
    InvalidAmount { leg: Leg, reason: &'static str },

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("No pair exists for {token_a:?}/{token_b:?}")]
    PairNotFound { token_a: Address, token_b: Address },

    #[error(
        "Insufficient liquidity in {pair:?} during {stage}: requested {requested}, held {available}"
    )]
    InsufficientBalance {
        stage: FlowState,
        pair: Address,
        requested: U256,
        available: U256,
    },

    #[error(
        "Clamped burn of {clamped} (requested {requested}) invalidates {leg} minimum {minimum}"
    )]
    ClampInvalidatesMinimum {
        requested: U256,
        clamped: U256,
        leg: Leg,
        minimum: U256,
    },

    #[error("Approval of {leg} token {token:?} failed: {source}")]
    ApprovalFailed {
        leg: Leg,
        token: Address,
        #[source]
        source: ClientError,
    },

    #[error(
        "Transaction reverted during {stage}: {cause} ({})",
        .reason.as_deref().unwrap_or("no reason")
    )]
    TransactionReverted {
        stage: FlowState,
        cause: RevertCause,
        reason: Option<String>,
    },

    #[error("RPC failure during {stage} ({operation}): {message}")]
    Rpc {
        stage: FlowState,
        operation: &'static str,
        message: String,
    },

    #[error("Invalid flow transition {from} -> {to}")]
    InvalidTransition { from: FlowState, to: FlowState },
}

impl LiquidityError {
    /// Flow stage the error surfaced in
    pub fn stage(&self) -> FlowState {
        match self {
            LiquidityError::ApprovalFailed { .. } => FlowState::Approving,
            LiquidityError::TransactionReverted { stage, .. }
            | LiquidityError::InsufficientBalance { stage, .. }
            | LiquidityError::Rpc { stage, .. } => *stage,
            LiquidityError::InvalidTransition { from, .. } => *from,
            _ => FlowState::Requested,
        }
    }

    /// True when nothing was sent to the chain, so the request can be fixed and re-issued
    pub fn is_pre_submission(&self) -> bool {
        self.stage() == FlowState::Requested
    }
}

impl From<QuoteError> for LiquidityError {
    fn from(err: QuoteError) -> Self {
        match err {
            QuoteError::InvalidTolerance { value } => LiquidityError::InvalidTolerance {
                tolerance: value,
                reason: "must be within [0, 1)".to_string(),
            },
            QuoteError::TolerancePrecision { value } => LiquidityError::InvalidTolerance {
                tolerance: value,
                reason: "finer than one basis point".to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, LiquidityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_labels() {
        let err = LiquidityError::TransactionReverted {
            stage: FlowState::Submitted,
            cause: RevertCause::DeadlineExpired,
            reason: Some("UniswapV2Router: EXPIRED".to_string()),
        };
        assert_eq!(err.stage(), FlowState::Submitted);
        assert!(!err.is_pre_submission());
        assert_eq!(
            err.to_string(),
            "Transaction reverted during Submitted: deadline expired (UniswapV2Router: EXPIRED)"
        );

        let err = LiquidityError::ApprovalFailed {
            leg: Leg::Counterparty,
            token: Address::zero(),
            source: ClientError::reverted("ERC20: approve to the zero address"),
        };
        assert_eq!(err.stage(), FlowState::Approving);

        let err = LiquidityError::PairNotFound {
            token_a: Address::zero(),
            token_b: Address::zero(),
        };
        assert!(err.is_pre_submission());
    }

    #[test]
    fn test_quote_error_conversion() {
        let err: LiquidityError = QuoteError::InvalidTolerance {
            value: "1.5".to_string(),
        }
        .into();
        assert!(matches!(err, LiquidityError::InvalidTolerance { .. }));
        assert!(err.is_pre_submission());
    }
}
