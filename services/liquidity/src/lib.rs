//! # Tidepool Liquidity - Uniswap V2 Position Management
//!
//! ## Purpose
//!
//! Adds and removes liquidity on Uniswap V2 style pools with explicit slippage bounds.
//! Each operation is a short, strictly ordered flow of approvals followed by a single
//! router call, and every failure reports the stage it happened in.
//!
//! ## Integration Points
//!
//! - **Quote Math**: `tidepool-amm` for basis-point minimums and withdrawal clamping
//! - **Configuration**: `tidepool-config` for network presets and orchestrator settings
//! - **Chain Access**: [`clients`] traits, implemented over ethers in [`ethereum`]
//!
//! ## Architecture Role
//!
//! ```text
//! CLI / caller → [LiquidityOrchestrator] → RouterClient / FactoryClient / TokenClient
//!                        ↓                              ↓
//!                  LiquidityFlow                 EthersLiquidityClient
//!            Requested → Approving →               (simulate, sign,
//!            Submitted → Confirmed | Reverted       send, await receipt)
//! ```

#[macro_use]
pub mod logging;

pub mod clients;
pub mod error;
pub mod ethereum;
pub mod flow;
pub mod orchestrator;
pub mod revert;
pub mod types;

pub use clients::{ClientError, ClientResult, FactoryClient, RouterClient, TokenClient};
pub use error::{LiquidityError, Result};
pub use ethereum::EthersLiquidityClient;
pub use flow::{FlowKind, FlowState, LiquidityFlow};
pub use orchestrator::LiquidityOrchestrator;
pub use revert::{classify_revert, LegBounds, RevertCause};
pub use types::{
    deadline_from_now, AddLiquidityNativeOutcome, AddLiquidityOutcome, BalanceSnapshot, Leg,
    LiquidityRequest, NativeLiquidityRequest, PairHandle, RemoveLiquidityOutcome,
    TokenPairLiquidityRequest, TokenPairWithdrawalRequest, WithdrawalRequest,
};

pub use tidepool_amm::{QuoteCalculator, SlippageTolerance};
