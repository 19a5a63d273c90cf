//! # Liquidity Orchestrator - Approval, Mint and Burn Sequencing
//!
//! ## Purpose
//!
//! Drives the multi-step transaction sequences needed to add and remove liquidity on a
//! Uniswap V2 style router: pair resolution, slippage minimums, spend approvals and the
//! final router call. Each flow is a strictly sequential chain of awaited calls because
//! every step depends on the one before it.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Liquidity and withdrawal requests from the CLI or other services
//! - **Quote Math**: `tidepool_amm::QuoteCalculator` for minimums and withdrawal clamping
//! - **Chain Access**: `RouterClient`, `FactoryClient` and `TokenClient` implementations
//! - **Output**: Realized amounts and transaction hashes, or a staged `LiquidityError`
//!
//! ## Architecture Role
//!
//! ```text
//! Request → [Validate] → [Resolve Pair] → [Quote Minimums] → [Approve] → [Router Call]
//!    ↓           ↓              ↓                 ↓               ↓             ↓
//! Amounts    No network    Factory.getPair   Pure bps math   ERC-20 approve  add/remove
//! Tolerance  calls yet     fresh every flow  Balance clamp   per leg         Confirmed
//! ```
//!
//! The pool contract is the only source of truth and the only serialization point.
//! Balances are snapshots that are stale as soon as they are read; the withdrawal clamp
//! and the optional re-check before burning narrow that window without closing it.

use std::sync::Arc;

use chrono::Utc;
use ethers::types::{Address, U256};
use tidepool_amm::QuoteCalculator;
use tidepool_config::{ClampPolicy, OrchestratorSettings};
use tracing::debug;

use crate::clients::{
    AddLiquidityCall, AddLiquidityNativeCall, ClientError, FactoryClient,
    RemoveLiquidityCall, RemoveLiquidityNativeCall, RouterClient, TokenClient,
};
use crate::error::{LiquidityError, Result};
use crate::flow::{FlowKind, FlowState, LiquidityFlow};
use crate::revert::{classify_revert, LegBounds};
use crate::types::{
    AddLiquidityNativeOutcome, AddLiquidityOutcome, BalanceSnapshot, Leg,
    NativeLiquidityRequest, PairHandle, RemoveLiquidityOutcome, TokenPairLiquidityRequest,
    TokenPairWithdrawalRequest, WithdrawalRequest,
};

/// Burn amount and minimums after reconciling a request with the live balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WithdrawalPlan {
    liquidity: U256,
    min_token: U256,
    min_counterparty: U256,
}

/// Sequences liquidity flows against a router, factory and token clients
pub struct LiquidityOrchestrator<R, F, T> {
    router: Arc<R>,
    factory: Arc<F>,
    tokens: Arc<T>,
    /// Account that signs every transaction and holds the liquidity tokens
    sender: Address,
    settings: OrchestratorSettings,
}

impl<R, F, T> LiquidityOrchestrator<R, F, T>
where
    R: RouterClient,
    F: FactoryClient,
    T: TokenClient,
{
    pub fn new(
        router: Arc<R>,
        factory: Arc<F>,
        tokens: Arc<T>,
        sender: Address,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            router,
            factory,
            tokens,
            sender,
            settings,
        }
    }

    pub fn sender(&self) -> Address {
        self.sender
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Look up the pair for two tokens; `None` when the factory has no pool
    pub async fn resolve_pair(
        &self,
        token_a: Address,
        token_b: Address,
    ) -> Result<Option<PairHandle>> {
        log_search!("Resolving pair {:?}/{:?}", token_a, token_b);

        let address = self
            .factory
            .get_pair(token_a, token_b)
            .await
            .map_err(|e| rpc_error(FlowState::Requested, "getPair", e))?;

        if address.is_zero() {
            debug!("No pair for {:?}/{:?}", token_a, token_b);
            return Ok(None);
        }

        Ok(Some(PairHandle {
            address,
            token_a,
            token_b,
        }))
    }

    /// Read the liquidity-token balance of `owner` for `pair`
    pub async fn balance_snapshot(
        &self,
        pair: &PairHandle,
        owner: Address,
    ) -> Result<BalanceSnapshot> {
        let balance = self
            .tokens
            .balance_of(pair.address, owner)
            .await
            .map_err(|e| rpc_error(FlowState::Requested, "balanceOf", e))?;

        log_balance!(
            "Liquidity balance of {:?} in pair {:?}: {}",
            owner,
            pair.address,
            balance
        );

        Ok(BalanceSnapshot {
            pair: pair.address,
            owner,
            balance,
            taken_at: Utc::now(),
        })
    }

    /// Add liquidity to an existing token/token pair
    pub async fn add_liquidity(
        &self,
        request: &TokenPairLiquidityRequest,
    ) -> Result<AddLiquidityOutcome> {
        request.validate()?;
        let base = &request.base;
        let mut flow = LiquidityFlow::new(FlowKind::AddLiquidity);

        let pair = self.require_pair(base.token, request.counterparty_token).await?;

        let amount_token_min = QuoteCalculator::minimum_amount(base.amount_desired, base.tolerance);
        let amount_counterparty_min =
            QuoteCalculator::minimum_amount(request.counterparty_amount_desired, base.tolerance);
        debug!(
            "Minimums at {} tolerance: token {} counterparty {}",
            base.tolerance, amount_token_min, amount_counterparty_min
        );

        flow.advance(FlowState::Approving)?;
        self.approve(&mut flow, Leg::Token, base.token, base.amount_desired)
            .await?;
        self.approve(
            &mut flow,
            Leg::Counterparty,
            request.counterparty_token,
            request.counterparty_amount_desired,
        )
        .await?;

        let call = AddLiquidityCall {
            pair: pair.address,
            token_a: base.token,
            token_b: request.counterparty_token,
            amount_a_desired: base.amount_desired,
            amount_b_desired: request.counterparty_amount_desired,
            amount_a_min: amount_token_min,
            amount_b_min: amount_counterparty_min,
            to: base.recipient,
            deadline: U256::from(base.deadline),
        };
        let bounds = LegBounds {
            a: (Leg::Token, amount_token_min),
            b: (Leg::Counterparty, amount_counterparty_min),
        };

        flow.advance(FlowState::Submitted)?;
        log_execution!("Submitting {} to pair {:?}", flow.kind(), pair.address);
        let receipt = self
            .router
            .add_liquidity(call)
            .await
            .map_err(|e| submission_error(&mut flow, e, &bounds))?;
        flow.advance(FlowState::Confirmed)?;

        log_mint!(
            "Added {} token + {} counterparty for {} liquidity (tx {:?})",
            receipt.amount_a,
            receipt.amount_b,
            receipt.liquidity,
            receipt.tx_hash
        );

        Ok(AddLiquidityOutcome {
            tx_hash: receipt.tx_hash,
            pair: pair.address,
            amount_token: receipt.amount_a,
            amount_counterparty: receipt.amount_b,
            liquidity_minted: receipt.liquidity,
            approval_txs: flow.approvals().to_vec(),
        })
    }

    /// Add liquidity to an existing token/native pair
    ///
    /// Only the token leg minimum comes from the tolerance. The native leg is bounded by
    /// the attached value and the caller's explicit floor.
    pub async fn add_liquidity_native(
        &self,
        request: &NativeLiquidityRequest,
    ) -> Result<AddLiquidityNativeOutcome> {
        request.validate()?;
        let base = &request.base;
        let mut flow = LiquidityFlow::new(FlowKind::AddLiquidityNative);

        let wrapped = self.wrapped_native().await?;
        let pair = self.require_pair(base.token, wrapped).await?;

        let amount_token_min = QuoteCalculator::minimum_amount(base.amount_desired, base.tolerance);
        debug!(
            "Minimums at {} tolerance: token {} native {}",
            base.tolerance, amount_token_min, request.min_native_amount
        );

        flow.advance(FlowState::Approving)?;
        self.approve(&mut flow, Leg::Token, base.token, base.amount_desired)
            .await?;

        let call = AddLiquidityNativeCall {
            pair: pair.address,
            wrapped_native: wrapped,
            token: base.token,
            amount_token_desired: base.amount_desired,
            amount_token_min,
            amount_native_min: request.min_native_amount,
            value: request.native_amount_desired,
            to: base.recipient,
            deadline: U256::from(base.deadline),
        };
        let bounds = LegBounds {
            a: (Leg::Token, amount_token_min),
            b: (Leg::Native, request.min_native_amount),
        };

        flow.advance(FlowState::Submitted)?;
        log_execution!(
            "Submitting {} to pair {:?} with {} attached",
            flow.kind(),
            pair.address,
            request.native_amount_desired
        );
        let receipt = self
            .router
            .add_liquidity_native(call)
            .await
            .map_err(|e| submission_error(&mut flow, e, &bounds))?;
        flow.advance(FlowState::Confirmed)?;

        log_mint!(
            "Added {} token + {} native for {} liquidity (tx {:?})",
            receipt.amount_a,
            receipt.amount_b,
            receipt.liquidity,
            receipt.tx_hash
        );

        Ok(AddLiquidityNativeOutcome {
            tx_hash: receipt.tx_hash,
            pair: pair.address,
            amount_token: receipt.amount_a,
            amount_native: receipt.amount_b,
            liquidity_minted: receipt.liquidity,
            approval_txs: flow.approvals().to_vec(),
        })
    }

    /// Remove liquidity from a token/token pair, never burning more than is held
    pub async fn remove_liquidity(
        &self,
        request: &TokenPairWithdrawalRequest,
    ) -> Result<RemoveLiquidityOutcome> {
        request.validate()?;
        let base = &request.base;
        let mut flow = LiquidityFlow::new(FlowKind::RemoveLiquidity);

        let pair = self.require_pair(base.token, request.counterparty_token).await?;
        let plan = self.plan_withdrawal(&pair, base, Leg::Counterparty).await?;

        self.approve_burn(&mut flow, &pair, plan.liquidity).await?;

        let call = RemoveLiquidityCall {
            pair: pair.address,
            token_a: base.token,
            token_b: request.counterparty_token,
            liquidity: plan.liquidity,
            amount_a_min: plan.min_token,
            amount_b_min: plan.min_counterparty,
            to: base.recipient,
            deadline: U256::from(base.deadline),
        };
        let bounds = LegBounds {
            a: (Leg::Token, plan.min_token),
            b: (Leg::Counterparty, plan.min_counterparty),
        };

        flow.advance(FlowState::Submitted)?;
        log_execution!(
            "Submitting {} burning {} from pair {:?}",
            flow.kind(),
            plan.liquidity,
            pair.address
        );
        let receipt = self
            .router
            .remove_liquidity(call)
            .await
            .map_err(|e| submission_error(&mut flow, e, &bounds))?;
        flow.advance(FlowState::Confirmed)?;

        log_burn!(
            "Removed {} liquidity for {} token + {} counterparty (tx {:?})",
            plan.liquidity,
            receipt.amount_a,
            receipt.amount_b,
            receipt.tx_hash
        );

        Ok(RemoveLiquidityOutcome {
            tx_hash: receipt.tx_hash,
            pair: pair.address,
            liquidity_requested: base.liquidity_desired,
            liquidity_burned: plan.liquidity,
            min_token: plan.min_token,
            min_counterparty: plan.min_counterparty,
            amount_token: receipt.amount_a,
            amount_counterparty: receipt.amount_b,
            approval_txs: flow.approvals().to_vec(),
        })
    }

    /// Remove liquidity from a token/native pair; `min_counterparty` is the native floor
    pub async fn remove_liquidity_native(
        &self,
        request: &WithdrawalRequest,
    ) -> Result<RemoveLiquidityOutcome> {
        request.validate()?;
        let mut flow = LiquidityFlow::new(FlowKind::RemoveLiquidityNative);

        let wrapped = self.wrapped_native().await?;
        let pair = self.require_pair(request.token, wrapped).await?;
        let plan = self.plan_withdrawal(&pair, request, Leg::Native).await?;

        self.approve_burn(&mut flow, &pair, plan.liquidity).await?;

        let call = RemoveLiquidityNativeCall {
            pair: pair.address,
            wrapped_native: wrapped,
            token: request.token,
            liquidity: plan.liquidity,
            amount_token_min: plan.min_token,
            amount_native_min: plan.min_counterparty,
            to: request.recipient,
            deadline: U256::from(request.deadline),
        };
        let bounds = LegBounds {
            a: (Leg::Token, plan.min_token),
            b: (Leg::Native, plan.min_counterparty),
        };

        flow.advance(FlowState::Submitted)?;
        log_execution!(
            "Submitting {} burning {} from pair {:?}",
            flow.kind(),
            plan.liquidity,
            pair.address
        );
        let receipt = self
            .router
            .remove_liquidity_native(call)
            .await
            .map_err(|e| submission_error(&mut flow, e, &bounds))?;
        flow.advance(FlowState::Confirmed)?;

        log_burn!(
            "Removed {} liquidity for {} token + {} native (tx {:?})",
            plan.liquidity,
            receipt.amount_a,
            receipt.amount_b,
            receipt.tx_hash
        );

        Ok(RemoveLiquidityOutcome {
            tx_hash: receipt.tx_hash,
            pair: pair.address,
            liquidity_requested: request.liquidity_desired,
            liquidity_burned: plan.liquidity,
            min_token: plan.min_token,
            min_counterparty: plan.min_counterparty,
            amount_token: receipt.amount_a,
            amount_counterparty: receipt.amount_b,
            approval_txs: flow.approvals().to_vec(),
        })
    }

    async fn require_pair(&self, token_a: Address, token_b: Address) -> Result<PairHandle> {
        self.resolve_pair(token_a, token_b)
            .await?
            .ok_or(LiquidityError::PairNotFound { token_a, token_b })
    }

    async fn wrapped_native(&self) -> Result<Address> {
        self.router
            .wrapped_native()
            .await
            .map_err(|e| rpc_error(FlowState::Requested, "WETH", e))
    }

    /// Clamp the requested burn against a fresh balance and reconcile the minimums
    async fn plan_withdrawal(
        &self,
        pair: &PairHandle,
        request: &WithdrawalRequest,
        counterparty_leg: Leg,
    ) -> Result<WithdrawalPlan> {
        let snapshot = self.balance_snapshot(pair, self.sender).await?;
        let quote = QuoteCalculator::withdrawal_quote(request.liquidity_desired, snapshot.balance);

        if quote.amount.is_zero() {
            log_error!(
                "Nothing to withdraw from {:?}: requested {}, holding {}",
                pair.address,
                quote.requested,
                quote.available
            );
            return Err(LiquidityError::InsufficientBalance {
                stage: FlowState::Requested,
                pair: pair.address,
                requested: quote.requested,
                available: quote.available,
            });
        }

        if !quote.is_clamped() {
            return Ok(WithdrawalPlan {
                liquidity: quote.amount,
                min_token: request.min_token,
                min_counterparty: request.min_counterparty,
            });
        }

        log_clamp!(
            "Requested {} liquidity but only {} held; burning {}",
            quote.requested,
            quote.available,
            quote.amount
        );

        match self.settings.clamp_policy {
            ClampPolicy::ProRata => {
                let min_token = QuoteCalculator::pro_rata_minimum(
                    request.min_token,
                    quote.requested,
                    quote.amount,
                );
                let min_counterparty = QuoteCalculator::pro_rata_minimum(
                    request.min_counterparty,
                    quote.requested,
                    quote.amount,
                );
                debug!(
                    "Scaled minimums to token {} counterparty {}",
                    min_token, min_counterparty
                );
                Ok(WithdrawalPlan {
                    liquidity: quote.amount,
                    min_token,
                    min_counterparty,
                })
            }
            ClampPolicy::Abort => {
                for (leg, minimum) in [
                    (Leg::Token, request.min_token),
                    (counterparty_leg, request.min_counterparty),
                ] {
                    if !minimum.is_zero() {
                        return Err(LiquidityError::ClampInvalidatesMinimum {
                            requested: quote.requested,
                            clamped: quote.amount,
                            leg,
                            minimum,
                        });
                    }
                }
                Ok(WithdrawalPlan {
                    liquidity: quote.amount,
                    min_token: request.min_token,
                    min_counterparty: request.min_counterparty,
                })
            }
        }
    }

    /// Approve the router to pull `liquidity` pair tokens, then re-check the balance
    async fn approve_burn(
        &self,
        flow: &mut LiquidityFlow,
        pair: &PairHandle,
        liquidity: U256,
    ) -> Result<()> {
        flow.advance(FlowState::Approving)?;
        self.approve(flow, Leg::Liquidity, pair.address, liquidity)
            .await?;

        if !self.settings.recheck_balance {
            return Ok(());
        }

        let balance = match self.tokens.balance_of(pair.address, self.sender).await {
            Ok(balance) => balance,
            Err(e) => {
                let stage = flow.fail();
                return Err(rpc_error(stage, "balanceOf", e));
            }
        };

        if balance < liquidity {
            let stage = flow.fail();
            log_error!(
                "Liquidity balance dropped to {} before burning {}",
                balance,
                liquidity
            );
            return Err(LiquidityError::InsufficientBalance {
                stage,
                pair: pair.address,
                requested: liquidity,
                available: balance,
            });
        }

        Ok(())
    }

    async fn approve(
        &self,
        flow: &mut LiquidityFlow,
        leg: Leg,
        token: Address,
        amount: U256,
    ) -> Result<()> {
        let spender = self.router.address();
        log_approval!(
            "Approving {} {} of {:?} for router {:?}",
            amount,
            leg,
            token,
            spender
        );

        match self.tokens.approve(token, spender, amount).await {
            Ok(tx_hash) => {
                debug!("Approval confirmed: {:?}", tx_hash);
                flow.record_approval(tx_hash);
                Ok(())
            }
            Err(source) => {
                flow.fail();
                log_error!("Approval of {} token {:?} failed: {}", leg, token, source);
                Err(LiquidityError::ApprovalFailed { leg, token, source })
            }
        }
    }
}

fn rpc_error(stage: FlowState, operation: &'static str, err: ClientError) -> LiquidityError {
    LiquidityError::Rpc {
        stage,
        operation,
        message: err.to_string(),
    }
}

/// Map a failed router call onto the flow, marking it reverted
fn submission_error(
    flow: &mut LiquidityFlow,
    err: ClientError,
    bounds: &LegBounds,
) -> LiquidityError {
    let stage = flow.fail();
    match err {
        ClientError::Reverted { reason } => {
            let cause = classify_revert(reason.as_deref(), bounds);
            log_error!("{} reverted during {}: {}", flow.kind(), stage, cause);
            LiquidityError::TransactionReverted {
                stage,
                cause,
                reason,
            }
        }
        ClientError::Transport(message) => {
            log_error!("{} transport failure during {}: {}", flow.kind(), stage, message);
            LiquidityError::Rpc {
                stage,
                operation: flow.kind().entry_point(),
                message,
            }
        }
    }
}
