//! Request and outcome types
//!
//! Everything here is request scoped. Nothing is cached between flows: pairs are resolved
//! and balances read fresh every time.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use ethers::types::{Address, H256, U256};
use serde::Serialize;
use tidepool_amm::SlippageTolerance;

use crate::error::{LiquidityError, Result};

/// One side of a liquidity position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Leg {
    /// The request's primary token (router argument A)
    Token,
    /// The second ERC-20 of a token/token pair (router argument B)
    Counterparty,
    /// The native currency side of a token/native pair (router argument B)
    Native,
    /// The pair's liquidity token
    Liquidity,
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Leg::Token => "token",
            Leg::Counterparty => "counterparty",
            Leg::Native => "native",
            Leg::Liquidity => "liquidity",
        };
        f.write_str(label)
    }
}

/// Liquidity addition for a single token leg
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityRequest {
    pub token: Address,
    pub amount_desired: U256,
    pub tolerance: SlippageTolerance,
    pub recipient: Address,
    pub deadline: u64,
}

impl LiquidityRequest {
    /// Reject inputs that would make the slippage bounds meaningless
    pub fn validate(&self) -> Result<()> {
        if self.amount_desired.is_zero() {
            return Err(LiquidityError::InvalidAmount {
                leg: Leg::Token,
                reason: "desired amount must be positive",
            });
        }

        if self.tolerance.is_total() {
            return Err(LiquidityError::InvalidTolerance {
                tolerance: self.tolerance.to_string(),
                reason: "a total tolerance permits a zero minimum".to_string(),
            });
        }

        if self.recipient.is_zero() {
            return Err(LiquidityError::InvalidRequest {
                reason: "recipient must not be the zero address".to_string(),
            });
        }

        Ok(())
    }
}

/// Token/token liquidity addition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPairLiquidityRequest {
    pub base: LiquidityRequest,
    pub counterparty_token: Address,
    pub counterparty_amount_desired: U256,
}

impl TokenPairLiquidityRequest {
    pub fn validate(&self) -> Result<()> {
        self.base.validate()?;

        if self.counterparty_amount_desired.is_zero() {
            return Err(LiquidityError::InvalidAmount {
                leg: Leg::Counterparty,
                reason: "desired amount must be positive",
            });
        }

        if self.counterparty_token == self.base.token {
            return Err(LiquidityError::InvalidRequest {
                reason: "token and counterparty must differ".to_string(),
            });
        }

        Ok(())
    }
}

/// Token/native liquidity addition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeLiquidityRequest {
    pub base: LiquidityRequest,
    /// Value attached to the transaction, the ceiling of the native leg
    pub native_amount_desired: U256,
    /// Caller-supplied native floor, not derived from the tolerance
    pub min_native_amount: U256,
}

impl NativeLiquidityRequest {
    pub fn validate(&self) -> Result<()> {
        self.base.validate()?;

        if self.native_amount_desired.is_zero() {
            return Err(LiquidityError::InvalidAmount {
                leg: Leg::Native,
                reason: "attached value must be positive",
            });
        }

        if self.min_native_amount > self.native_amount_desired {
            return Err(LiquidityError::InvalidAmount {
                leg: Leg::Native,
                reason: "minimum exceeds attached value",
            });
        }

        Ok(())
    }
}

/// Liquidity withdrawal; `min_counterparty` is the native floor for native pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalRequest {
    pub token: Address,
    pub liquidity_desired: U256,
    pub min_token: U256,
    pub min_counterparty: U256,
    pub recipient: Address,
    pub deadline: u64,
}

impl WithdrawalRequest {
    pub fn validate(&self) -> Result<()> {
        if self.liquidity_desired.is_zero() {
            return Err(LiquidityError::InvalidAmount {
                leg: Leg::Liquidity,
                reason: "liquidity to burn must be positive",
            });
        }

        if self.recipient.is_zero() {
            return Err(LiquidityError::InvalidRequest {
                reason: "recipient must not be the zero address".to_string(),
            });
        }

        Ok(())
    }
}

/// Token/token liquidity withdrawal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPairWithdrawalRequest {
    pub base: WithdrawalRequest,
    pub counterparty_token: Address,
}

impl TokenPairWithdrawalRequest {
    pub fn validate(&self) -> Result<()> {
        self.base.validate()?;

        if self.counterparty_token == self.base.token {
            return Err(LiquidityError::InvalidRequest {
                reason: "token and counterparty must differ".to_string(),
            });
        }

        Ok(())
    }
}

/// Pair contract resolved through the factory for one flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PairHandle {
    pub address: Address,
    pub token_a: Address,
    pub token_b: Address,
}

/// Liquidity-token balance observed at a single point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceSnapshot {
    pub pair: Address,
    pub owner: Address,
    pub balance: U256,
    pub taken_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddLiquidityOutcome {
    pub tx_hash: H256,
    pub pair: Address,
    pub amount_token: U256,
    pub amount_counterparty: U256,
    pub liquidity_minted: U256,
    /// Approvals mined for this flow, in submission order
    pub approval_txs: Vec<H256>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddLiquidityNativeOutcome {
    pub tx_hash: H256,
    pub pair: Address,
    pub amount_token: U256,
    pub amount_native: U256,
    pub liquidity_minted: U256,
    pub approval_txs: Vec<H256>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoveLiquidityOutcome {
    pub tx_hash: H256,
    pub pair: Address,
    pub liquidity_requested: U256,
    pub liquidity_burned: U256,
    /// Minimums actually sent to the router, after clamp reconciliation
    pub min_token: U256,
    pub min_counterparty: U256,
    pub amount_token: U256,
    /// Native amount for native pairs
    pub amount_counterparty: U256,
    /// Liquidity-token approval mined before the burn
    pub approval_txs: Vec<H256>,
}

impl RemoveLiquidityOutcome {
    pub fn was_clamped(&self) -> bool {
        self.liquidity_burned != self.liquidity_requested
    }
}

/// Unix deadline `window` from now
pub fn deadline_from_now(window: Duration) -> u64 {
    let now = Utc::now().timestamp().max(0) as u64;
    now.saturating_add(window.as_secs())
}
