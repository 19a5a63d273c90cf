//! Signing JSON-RPC client for the router, factory and ERC-20 contracts
//!
//! Every state-changing call is simulated with `eth_call` first so revert reasons surface
//! before gas is spent, then signed, broadcast and awaited until mined.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use ethers::abi::Detokenize;
use ethers::contract::{ContractCall, ContractError};
use ethers::prelude::*;
use tidepool_config::{NetworkConfig, UniswapV2Deployment};
use tracing::{debug, info};
use url::Url;

use super::bindings::{IUniswapV2Factory, IUniswapV2Router02, IERC20};
use super::events::{decode_burn, decode_mint};
use crate::clients::{
    AddLiquidityCall, AddLiquidityNativeCall, BurnReceipt, ClientError, ClientResult,
    FactoryClient, MintReceipt, RemoveLiquidityCall, RemoveLiquidityNativeCall, RouterClient,
    TokenClient,
};

pub type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

const CONFIRMATIONS: usize = 1;

/// Contract access for one signing account on one network
pub struct EthersLiquidityClient {
    client: Arc<SignerClient>,
    router: IUniswapV2Router02<SignerClient>,
    factory: IUniswapV2Factory<SignerClient>,
    /// Fixed legacy gas price; EIP-1559 pricing from the node when unset
    gas_price: Option<U256>,
}

impl EthersLiquidityClient {
    /// Connect to `network` and verify the node serves the configured chain
    pub async fn connect(
        network: &NetworkConfig,
        contracts: &UniswapV2Deployment,
        private_key: &str,
    ) -> Result<Self> {
        let started = Instant::now();

        let http_client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let url: Url = network.rpc_url.parse().context("Invalid RPC URL")?;
        let provider = Provider::new(Http::new_with_client(url, http_client));

        let remote_chain = provider
            .get_chainid()
            .await
            .context("Failed to query chain id")?;
        if remote_chain != U256::from(network.chain_id) {
            bail!(
                "RPC {} serves chain {} but network '{}' expects {}",
                network.rpc_url,
                remote_chain,
                network.name,
                network.chain_id
            );
        }

        let wallet = private_key
            .parse::<LocalWallet>()
            .context("Invalid private key format")?
            .with_chain_id(network.chain_id);

        let router_address: Address = contracts
            .router
            .parse()
            .context("Invalid router address")?;
        let factory_address: Address = contracts
            .factory
            .parse()
            .context("Invalid factory address")?;

        let client = Arc::new(SignerMiddleware::new(provider, wallet));
        let router = IUniswapV2Router02::new(router_address, client.clone());
        let factory = IUniswapV2Factory::new(factory_address, client.clone());

        info!(
            "✅ Connected to {} (chain {}) in {}ms",
            network.name,
            network.chain_id,
            started.elapsed().as_millis()
        );
        info!("   - Sender: {:?}", client.address());
        info!("   - Router: {:?}", router_address);
        info!("   - Factory: {:?}", factory_address);

        Ok(Self {
            client,
            router,
            factory,
            gas_price: network.gas_price_wei.map(U256::from),
        })
    }

    /// Signing account
    pub fn sender(&self) -> Address {
        self.client.address()
    }

    pub async fn native_balance(&self, owner: Address) -> Result<U256> {
        self.client
            .get_balance(owner, None)
            .await
            .context("Failed to read native balance")
    }

    /// Simulate, send and await one contract call
    ///
    /// Returns the simulated return value with the mined receipt.
    async fn execute<D>(
        &self,
        call: ContractCall<SignerClient, D>,
        label: &str,
    ) -> ClientResult<(D, TransactionReceipt)>
    where
        D: Detokenize + Send + Sync,
    {
        let call = match self.gas_price {
            Some(price) => call.legacy().gas_price(price),
            None => call,
        };

        let expected = call.call().await.map_err(contract_error)?;

        let pending = call.send().await.map_err(contract_error)?;
        let tx_hash = pending.tx_hash();
        debug!("{} submitted: {:?}", label, tx_hash);

        let receipt = pending
            .confirmations(CONFIRMATIONS)
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?
            .ok_or_else(|| {
                ClientError::Transport(format!("{} {:?} dropped from mempool", label, tx_hash))
            })?;

        if receipt.status != Some(U64::from(1)) {
            log_warning!("{} {:?} mined with failed status", label, tx_hash);
            return Err(ClientError::Reverted { reason: None });
        }

        debug!(
            "{} mined in block {:?}, gas used {:?}",
            label, receipt.block_number, receipt.gas_used
        );
        Ok((expected, receipt))
    }

    /// Realized mint amounts from the receipt, falling back to the simulated values
    fn mint_receipt(
        receipt: &TransactionReceipt,
        pair: Address,
        (token_a, token_b): (Address, Address),
        recipient: Address,
        simulated: (U256, U256, U256),
    ) -> MintReceipt {
        let realized = decode_mint(&receipt.logs, pair, token_a, token_b, recipient);

        let (amount_a, amount_b, liquidity) = realized.unwrap_or_else(|| {
            log_warning!(
                "No Mint event decoded from {:?}; reporting simulated amounts",
                receipt.transaction_hash
            );
            simulated
        });

        MintReceipt {
            tx_hash: receipt.transaction_hash,
            amount_a,
            amount_b,
            liquidity,
        }
    }

    /// Realized burn amounts from the receipt, falling back to the simulated values
    fn burn_receipt(
        receipt: &TransactionReceipt,
        pair: Address,
        (token_a, token_b): (Address, Address),
        simulated: (U256, U256),
    ) -> BurnReceipt {
        let realized = decode_burn(&receipt.logs, pair, token_a, token_b);

        let (amount_a, amount_b) = realized.unwrap_or_else(|| {
            log_warning!(
                "No Burn event decoded from {:?}; reporting simulated amounts",
                receipt.transaction_hash
            );
            simulated
        });

        BurnReceipt {
            tx_hash: receipt.transaction_hash,
            amount_a,
            amount_b,
        }
    }
}

/// Split revert data from transport failures
fn contract_error(err: ContractError<SignerClient>) -> ClientError {
    if let Some(reason) = err.decode_revert::<String>() {
        return ClientError::Reverted {
            reason: Some(reason),
        };
    }
    if err.is_revert() {
        return ClientError::Reverted { reason: None };
    }
    ClientError::Transport(err.to_string())
}

#[async_trait]
impl TokenClient for EthersLiquidityClient {
    async fn approve(&self, token: Address, spender: Address, amount: U256) -> ClientResult<H256> {
        let erc20 = IERC20::new(token, self.client.clone());
        let ((), receipt) = self
            .execute(erc20.approve(spender, amount), "approve")
            .await?;
        Ok(receipt.transaction_hash)
    }

    async fn balance_of(&self, token: Address, owner: Address) -> ClientResult<U256> {
        IERC20::new(token, self.client.clone())
            .balance_of(owner)
            .call()
            .await
            .map_err(contract_error)
    }
}

#[async_trait]
impl FactoryClient for EthersLiquidityClient {
    async fn get_pair(&self, token_a: Address, token_b: Address) -> ClientResult<Address> {
        self.factory
            .get_pair(token_a, token_b)
            .call()
            .await
            .map_err(contract_error)
    }
}

#[async_trait]
impl RouterClient for EthersLiquidityClient {
    fn address(&self) -> Address {
        self.router.address()
    }

    async fn wrapped_native(&self) -> ClientResult<Address> {
        self.router.weth().call().await.map_err(contract_error)
    }

    async fn add_liquidity(&self, call: AddLiquidityCall) -> ClientResult<MintReceipt> {
        let contract_call = self.router.add_liquidity(
            call.token_a,
            call.token_b,
            call.amount_a_desired,
            call.amount_b_desired,
            call.amount_a_min,
            call.amount_b_min,
            call.to,
            call.deadline,
        );
        let (simulated, receipt) = self.execute(contract_call, "addLiquidity").await?;

        Ok(Self::mint_receipt(
            &receipt,
            call.pair,
            (call.token_a, call.token_b),
            call.to,
            simulated,
        ))
    }

    async fn add_liquidity_native(
        &self,
        call: AddLiquidityNativeCall,
    ) -> ClientResult<MintReceipt> {
        let contract_call = self
            .router
            .add_liquidity_eth(
                call.token,
                call.amount_token_desired,
                call.amount_token_min,
                call.amount_native_min,
                call.to,
                call.deadline,
            )
            .value(call.value);
        let (simulated, receipt) = self.execute(contract_call, "addLiquidityETH").await?;

        Ok(Self::mint_receipt(
            &receipt,
            call.pair,
            (call.token, call.wrapped_native),
            call.to,
            simulated,
        ))
    }

    async fn remove_liquidity(&self, call: RemoveLiquidityCall) -> ClientResult<BurnReceipt> {
        let contract_call = self.router.remove_liquidity(
            call.token_a,
            call.token_b,
            call.liquidity,
            call.amount_a_min,
            call.amount_b_min,
            call.to,
            call.deadline,
        );
        let (simulated, receipt) = self.execute(contract_call, "removeLiquidity").await?;

        Ok(Self::burn_receipt(
            &receipt,
            call.pair,
            (call.token_a, call.token_b),
            simulated,
        ))
    }

    async fn remove_liquidity_native(
        &self,
        call: RemoveLiquidityNativeCall,
    ) -> ClientResult<BurnReceipt> {
        let contract_call = self.router.remove_liquidity_eth(
            call.token,
            call.liquidity,
            call.amount_token_min,
            call.amount_native_min,
            call.to,
            call.deadline,
        );
        let (simulated, receipt) = self.execute(contract_call, "removeLiquidityETH").await?;

        Ok(Self::burn_receipt(
            &receipt,
            call.pair,
            (call.token, call.wrapped_native),
            simulated,
        ))
    }
}
