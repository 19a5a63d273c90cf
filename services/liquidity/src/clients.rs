//! Contract client seams
//!
//! The orchestrator never talks to a node directly. It drives these traits, which the
//! ethers adapter implements against a live chain and the tests implement in memory.
//! Every state-changing method is expected to return only once the transaction is
//! mined, so later steps observe its effects.

use async_trait::async_trait;
use ethers::types::{Address, H256, U256};
use thiserror::Error;

/// Failure reported by a contract client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The call executed and reverted, either in simulation or on chain
    #[error("execution reverted: {}", .reason.as_deref().unwrap_or("<no reason>"))]
    Reverted { reason: Option<String> },

    /// The node could not be reached or returned garbage
    #[error("transport error: {0}")]
    Transport(String),
}

impl ClientError {
    pub fn reverted(reason: impl Into<String>) -> Self {
        Self::Reverted {
            reason: Some(reason.into()),
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Reverted { reason } => reason.as_deref(),
            Self::Transport(message) => Some(message.as_str()),
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Amounts realized by a router `addLiquidity*` call, in router argument order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintReceipt {
    pub tx_hash: H256,
    pub amount_a: U256,
    pub amount_b: U256,
    pub liquidity: U256,
}

/// Amounts realized by a router `removeLiquidity*` call, in router argument order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurnReceipt {
    pub tx_hash: H256,
    pub amount_a: U256,
    pub amount_b: U256,
}

/// Arguments of `addLiquidity(tokenA, tokenB, ...)`
///
/// `pair` is the pool resolved for the flow; it is not sent to the router but lets the
/// adapter decode the pool's events without another factory lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidityCall {
    pub pair: Address,
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a_desired: U256,
    pub amount_b_desired: U256,
    pub amount_a_min: U256,
    pub amount_b_min: U256,
    pub to: Address,
    pub deadline: U256,
}

/// Arguments of `addLiquidityETH(token, ...)` plus the attached value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidityNativeCall {
    pub pair: Address,
    /// Wrapped native token, the pair's other side
    pub wrapped_native: Address,
    pub token: Address,
    pub amount_token_desired: U256,
    pub amount_token_min: U256,
    pub amount_native_min: U256,
    pub value: U256,
    pub to: Address,
    pub deadline: U256,
}

/// Arguments of `removeLiquidity(tokenA, tokenB, ...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquidityCall {
    pub pair: Address,
    pub token_a: Address,
    pub token_b: Address,
    pub liquidity: U256,
    pub amount_a_min: U256,
    pub amount_b_min: U256,
    pub to: Address,
    pub deadline: U256,
}

/// Arguments of `removeLiquidityETH(token, ...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquidityNativeCall {
    pub pair: Address,
    pub wrapped_native: Address,
    pub token: Address,
    pub liquidity: U256,
    pub amount_token_min: U256,
    pub amount_native_min: U256,
    pub to: Address,
    pub deadline: U256,
}

/// ERC-20 access, used for both the pooled tokens and the pair's liquidity token
#[async_trait]
pub trait TokenClient: Send + Sync {
    async fn approve(&self, token: Address, spender: Address, amount: U256) -> ClientResult<H256>;

    async fn balance_of(&self, token: Address, owner: Address) -> ClientResult<U256>;
}

/// Pair lookup on the factory
#[async_trait]
pub trait FactoryClient: Send + Sync {
    /// Returns the zero address when no pair exists
    async fn get_pair(&self, token_a: Address, token_b: Address) -> ClientResult<Address>;
}

/// Router entry points for liquidity management
#[async_trait]
pub trait RouterClient: Send + Sync {
    /// Router address, the spender for every approval
    fn address(&self) -> Address;

    /// Wrapped native token paired against in the `*ETH` entry points
    async fn wrapped_native(&self) -> ClientResult<Address>;

    async fn add_liquidity(&self, call: AddLiquidityCall) -> ClientResult<MintReceipt>;

    async fn add_liquidity_native(&self, call: AddLiquidityNativeCall)
        -> ClientResult<MintReceipt>;

    async fn remove_liquidity(&self, call: RemoveLiquidityCall) -> ClientResult<BurnReceipt>;

    async fn remove_liquidity_native(
        &self,
        call: RemoveLiquidityNativeCall,
    ) -> ClientResult<BurnReceipt>;
}
