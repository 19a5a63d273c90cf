//! Per-flow state machine
//!
//! ```text
//! Requested ──► Approving ──► Submitted ──► Confirmed
//!                   │              │
//!                   └──► Reverted ◄┘
//! ```
//!
//! Flows never move backwards and are never resumed. Any failure after `Requested` ends
//! the flow; the caller starts a new one from fresh reads.

use std::fmt;
use std::time::Instant;

use ethers::types::H256;
use serde::Serialize;
use tracing::debug;

use crate::error::{LiquidityError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FlowState {
    Requested,
    Approving,
    Submitted,
    Confirmed,
    Reverted,
}

impl FlowState {
    pub fn can_transition_to(self, next: FlowState) -> bool {
        use FlowState::*;
        matches!(
            (self, next),
            (Requested, Approving)
                | (Approving, Submitted)
                | (Approving, Reverted)
                | (Submitted, Confirmed)
                | (Submitted, Reverted)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, FlowState::Confirmed | FlowState::Reverted)
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FlowState::Requested => "Requested",
            FlowState::Approving => "Approving",
            FlowState::Submitted => "Submitted",
            FlowState::Confirmed => "Confirmed",
            FlowState::Reverted => "Reverted",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FlowKind {
    AddLiquidity,
    AddLiquidityNative,
    RemoveLiquidity,
    RemoveLiquidityNative,
}

impl FlowKind {
    /// Router function the flow ends in
    pub fn entry_point(self) -> &'static str {
        match self {
            FlowKind::AddLiquidity => "addLiquidity",
            FlowKind::AddLiquidityNative => "addLiquidityETH",
            FlowKind::RemoveLiquidity => "removeLiquidity",
            FlowKind::RemoveLiquidityNative => "removeLiquidityETH",
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.entry_point())
    }
}

/// Tracks one orchestrated flow from request to terminal state
#[derive(Debug)]
pub struct LiquidityFlow {
    kind: FlowKind,
    state: FlowState,
    approvals: Vec<H256>,
    started: Instant,
}

impl LiquidityFlow {
    pub fn new(kind: FlowKind) -> Self {
        debug!("{} flow requested", kind);
        Self {
            kind,
            state: FlowState::Requested,
            approvals: Vec::new(),
            started: Instant::now(),
        }
    }

    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Approval transactions confirmed so far
    pub fn approvals(&self) -> &[H256] {
        &self.approvals
    }

    pub fn advance(&mut self, next: FlowState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(LiquidityError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        debug!(
            "{} flow {} -> {} after {}ms",
            self.kind,
            self.state,
            next,
            self.started.elapsed().as_millis()
        );
        self.state = next;
        Ok(())
    }

    pub fn record_approval(&mut self, tx_hash: H256) {
        self.approvals.push(tx_hash);
    }

    /// Mark the flow reverted and return the stage it failed in
    pub fn fail(&mut self) -> FlowState {
        let stage = self.state;
        if self.state.can_transition_to(FlowState::Reverted) {
            self.state = FlowState::Reverted;
            debug!("{} flow reverted during {}", self.kind, stage);
        }
        stage
    }
}
