//! In-memory chain shared by the orchestrator integration tests
//!
//! Records every approval and router invocation so tests can assert on what reached the
//! chain, and lets tests script pairs, balances and failures.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use ethers::types::{Address, H256, U256};
use parking_lot::Mutex;
use tidepool_config::OrchestratorSettings;
use tidepool_liquidity::clients::{
    AddLiquidityCall, AddLiquidityNativeCall, BurnReceipt, ClientError, ClientResult,
    FactoryClient, MintReceipt, RemoveLiquidityCall, RemoveLiquidityNativeCall, RouterClient,
    TokenClient,
};
use tidepool_liquidity::LiquidityOrchestrator;

pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn router() -> Address {
    addr(0x70)
}
pub fn weth() -> Address {
    addr(0xee)
}
pub fn token() -> Address {
    addr(0x11)
}
pub fn counterparty() -> Address {
    addr(0x22)
}
pub fn pair() -> Address {
    addr(0x50)
}
pub fn native_pair() -> Address {
    addr(0x51)
}
pub fn sender() -> Address {
    addr(0xaa)
}

/// Liquidity minted by every successful add
pub const MINTED: u64 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approval {
    pub token: Address,
    pub spender: Address,
    pub amount: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterInvocation {
    Add(AddLiquidityCall),
    AddNative(AddLiquidityNativeCall),
    Remove(RemoveLiquidityCall),
    RemoveNative(RemoveLiquidityNativeCall),
}

#[derive(Default)]
struct ChainState {
    pairs: HashMap<(Address, Address), Address>,
    /// Successive reads per (token, owner); the last value repeats
    balances: HashMap<(Address, Address), VecDeque<U256>>,
    approvals: Vec<Approval>,
    failing_approvals: HashMap<Address, ClientError>,
    router_failure: Option<ClientError>,
    router_calls: Vec<RouterInvocation>,
    factory_failure: Option<ClientError>,
    factory_reads: usize,
    /// Balance reads that succeed before every later read fails
    balance_failure: Option<(usize, ClientError)>,
    balance_reads: usize,
    wrapped_native_failure: Option<ClientError>,
    next_tx: u64,
}

impl ChainState {
    fn tx_hash(&mut self) -> H256 {
        self.next_tx += 1;
        H256::from_low_u64_be(self.next_tx)
    }
}

#[derive(Default)]
pub struct MockChain {
    state: Mutex<ChainState>,
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Chain with both the token/counterparty and token/WETH pools deployed
    pub fn with_pools() -> Arc<Self> {
        let chain = Self::new();
        chain.add_pair(token(), counterparty(), pair());
        chain.add_pair(token(), weth(), native_pair());
        chain
    }

    pub fn add_pair(&self, token_a: Address, token_b: Address, pair: Address) {
        self.state.lock().pairs.insert(sorted(token_a, token_b), pair);
    }

    pub fn set_balance(&self, token: Address, owner: Address, balance: u64) {
        self.script_balances(token, owner, &[balance]);
    }

    pub fn script_balances(&self, token: Address, owner: Address, reads: &[u64]) {
        self.state
            .lock()
            .balances
            .insert((token, owner), reads.iter().map(|b| U256::from(*b)).collect());
    }

    pub fn fail_approval(&self, token: Address, error: ClientError) {
        self.state.lock().failing_approvals.insert(token, error);
    }

    pub fn fail_router(&self, error: ClientError) {
        self.state.lock().router_failure = Some(error);
    }

    pub fn fail_factory(&self, error: ClientError) {
        self.state.lock().factory_failure = Some(error);
    }

    /// Let `successful` balance reads through, then fail every read after them
    pub fn fail_balance_reads_after(&self, successful: usize, error: ClientError) {
        self.state.lock().balance_failure = Some((successful, error));
    }

    pub fn fail_wrapped_native(&self, error: ClientError) {
        self.state.lock().wrapped_native_failure = Some(error);
    }

    pub fn approvals(&self) -> Vec<Approval> {
        self.state.lock().approvals.clone()
    }

    pub fn router_calls(&self) -> Vec<RouterInvocation> {
        self.state.lock().router_calls.clone()
    }

    pub fn factory_reads(&self) -> usize {
        self.state.lock().factory_reads
    }

    pub fn balance_reads(&self) -> usize {
        self.state.lock().balance_reads
    }

    fn record_router(&self, call: RouterInvocation) -> ClientResult<H256> {
        let mut state = self.state.lock();
        state.router_calls.push(call);
        if let Some(error) = state.router_failure.clone() {
            return Err(error);
        }
        Ok(state.tx_hash())
    }
}

fn sorted(a: Address, b: Address) -> (Address, Address) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[async_trait]
impl TokenClient for MockChain {
    async fn approve(&self, token: Address, spender: Address, amount: U256) -> ClientResult<H256> {
        let mut state = self.state.lock();
        if let Some(error) = state.failing_approvals.get(&token).cloned() {
            return Err(error);
        }
        state.approvals.push(Approval {
            token,
            spender,
            amount,
        });
        Ok(state.tx_hash())
    }

    async fn balance_of(&self, token: Address, owner: Address) -> ClientResult<U256> {
        let mut state = self.state.lock();
        state.balance_reads += 1;
        if let Some((successful, error)) = &state.balance_failure {
            if state.balance_reads > *successful {
                return Err(error.clone());
            }
        }
        let reads = match state.balances.get_mut(&(token, owner)) {
            Some(reads) => reads,
            None => return Ok(U256::zero()),
        };
        let balance = if reads.len() > 1 {
            reads.pop_front()
        } else {
            reads.front().copied()
        };
        Ok(balance.unwrap_or_default())
    }
}

#[async_trait]
impl FactoryClient for MockChain {
    async fn get_pair(&self, token_a: Address, token_b: Address) -> ClientResult<Address> {
        let mut state = self.state.lock();
        state.factory_reads += 1;
        if let Some(error) = state.factory_failure.clone() {
            return Err(error);
        }
        Ok(state
            .pairs
            .get(&sorted(token_a, token_b))
            .copied()
            .unwrap_or_else(Address::zero))
    }
}

#[async_trait]
impl RouterClient for MockChain {
    fn address(&self) -> Address {
        router()
    }

    async fn wrapped_native(&self) -> ClientResult<Address> {
        if let Some(error) = self.state.lock().wrapped_native_failure.clone() {
            return Err(error);
        }
        Ok(weth())
    }

    async fn add_liquidity(&self, call: AddLiquidityCall) -> ClientResult<MintReceipt> {
        let (amount_a, amount_b) = (call.amount_a_desired, call.amount_b_desired);
        let tx_hash = self.record_router(RouterInvocation::Add(call))?;
        Ok(MintReceipt {
            tx_hash,
            amount_a,
            amount_b,
            liquidity: U256::from(MINTED),
        })
    }

    async fn add_liquidity_native(
        &self,
        call: AddLiquidityNativeCall,
    ) -> ClientResult<MintReceipt> {
        let (amount_a, amount_b) = (call.amount_token_desired, call.value);
        let tx_hash = self.record_router(RouterInvocation::AddNative(call))?;
        Ok(MintReceipt {
            tx_hash,
            amount_a,
            amount_b,
            liquidity: U256::from(MINTED),
        })
    }

    async fn remove_liquidity(&self, call: RemoveLiquidityCall) -> ClientResult<BurnReceipt> {
        let liquidity = call.liquidity;
        let tx_hash = self.record_router(RouterInvocation::Remove(call))?;
        Ok(BurnReceipt {
            tx_hash,
            amount_a: liquidity * U256::from(2u64),
            amount_b: liquidity * U256::from(3u64),
        })
    }

    async fn remove_liquidity_native(
        &self,
        call: RemoveLiquidityNativeCall,
    ) -> ClientResult<BurnReceipt> {
        let liquidity = call.liquidity;
        let tx_hash = self.record_router(RouterInvocation::RemoveNative(call))?;
        Ok(BurnReceipt {
            tx_hash,
            amount_a: liquidity * U256::from(2u64),
            amount_b: liquidity,
        })
    }
}

pub type MockOrchestrator = LiquidityOrchestrator<MockChain, MockChain, MockChain>;

pub fn orchestrator(chain: &Arc<MockChain>) -> MockOrchestrator {
    orchestrator_with(chain, OrchestratorSettings::default())
}

pub fn orchestrator_with(
    chain: &Arc<MockChain>,
    settings: OrchestratorSettings,
) -> MockOrchestrator {
    LiquidityOrchestrator::new(chain.clone(), chain.clone(), chain.clone(), sender(), settings)
}
