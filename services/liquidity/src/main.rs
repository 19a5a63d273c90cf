//! Tidepool liquidity CLI
//!
//! Usage:
//!   tidepool --env fork pair --token-a <addr> --token-b <addr>
//!   tidepool add --token <addr> --counterparty <addr> --amount 1000 --counterparty-amount 2000
//!   tidepool add-native --token <addr> --amount 1000 --value 500000000000000000
//!   tidepool remove --token <addr> --counterparty <addr> --liquidity 42
//!   tidepool remove-native --token <addr> --liquidity 42 --min-native 1
//!
//! The signing key is read from `WALLET_KEY`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ethers::types::{Address, H256, U256};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tidepool_config::{load_config, wallet_key, LiquidityConfig};
use tidepool_liquidity::{
    deadline_from_now, log_balance, log_success, EthersLiquidityClient, LiquidityError,
    LiquidityOrchestrator, LiquidityRequest, NativeLiquidityRequest, SlippageTolerance,
    TokenPairLiquidityRequest, TokenPairWithdrawalRequest, WithdrawalRequest,
};

type Orchestrator =
    LiquidityOrchestrator<EthersLiquidityClient, EthersLiquidityClient, EthersLiquidityClient>;

#[derive(Parser, Debug)]
#[command(name = "tidepool")]
#[command(about = "Add and remove Uniswap V2 liquidity with slippage bounds")]
#[command(version)]
struct Cli {
    /// Configuration file path (defaults to config/liquidity.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Network preset and environment overlay (fork, mainnet, lisk-sepolia)
    #[arg(short, long)]
    env: Option<String>,

    /// Log level filter, overrides the configured level
    #[arg(short, long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a pair and report the sender's liquidity balance
    Pair {
        #[arg(long, value_parser = parse_address)]
        token_a: Address,
        #[arg(long, value_parser = parse_address)]
        token_b: Address,
    },

    /// Add liquidity to a token/token pair
    Add {
        #[arg(long, value_parser = parse_address)]
        token: Address,
        #[arg(long, value_parser = parse_address)]
        counterparty: Address,
        /// Desired token amount in base units
        #[arg(long, value_parser = parse_amount)]
        amount: U256,
        /// Desired counterparty amount in base units
        #[arg(long, value_parser = parse_amount)]
        counterparty_amount: U256,
        #[command(flatten)]
        submit: SubmitArgs,
    },

    /// Add liquidity to a token/native pair
    AddNative {
        #[arg(long, value_parser = parse_address)]
        token: Address,
        #[arg(long, value_parser = parse_amount)]
        amount: U256,
        /// Native value attached to the transaction, in wei
        #[arg(long, value_parser = parse_amount)]
        value: U256,
        /// Native floor in wei
        #[arg(long, value_parser = parse_amount, default_value = "0")]
        min_native: U256,
        #[command(flatten)]
        submit: SubmitArgs,
    },

    /// Remove liquidity from a token/token pair
    Remove {
        #[arg(long, value_parser = parse_address)]
        token: Address,
        #[arg(long, value_parser = parse_address)]
        counterparty: Address,
        /// Liquidity tokens to burn
        #[arg(long, value_parser = parse_amount)]
        liquidity: U256,
        #[arg(long, value_parser = parse_amount, default_value = "0")]
        min_token: U256,
        #[arg(long, value_parser = parse_amount, default_value = "0")]
        min_counterparty: U256,
        #[command(flatten)]
        submit: SubmitArgs,
    },

    /// Remove liquidity from a token/native pair
    RemoveNative {
        #[arg(long, value_parser = parse_address)]
        token: Address,
        #[arg(long, value_parser = parse_amount)]
        liquidity: U256,
        #[arg(long, value_parser = parse_amount, default_value = "0")]
        min_token: U256,
        #[arg(long, value_parser = parse_amount, default_value = "0")]
        min_native: U256,
        #[command(flatten)]
        submit: SubmitArgs,
    },
}

/// Options shared by every state-changing command
#[derive(Args, Debug)]
struct SubmitArgs {
    /// Slippage tolerance, e.g. 0.005, 0.5% or 50bps (defaults to the configured value)
    #[arg(long)]
    tolerance: Option<SlippageTolerance>,

    /// Recipient of minted liquidity or withdrawn assets (defaults to the sender)
    #[arg(long, value_parser = parse_address)]
    recipient: Option<Address>,

    /// Seconds until the transaction expires (defaults to the configured value)
    #[arg(long)]
    deadline_secs: Option<u64>,
}

/// Resolved submission parameters
struct Submission {
    tolerance: SlippageTolerance,
    recipient: Address,
    deadline: u64,
}

impl SubmitArgs {
    fn resolve(&self, config: &LiquidityConfig, sender: Address) -> Result<Submission> {
        let tolerance = match self.tolerance {
            Some(tolerance) => tolerance,
            None => SlippageTolerance::from_bps(config.orchestrator.default_tolerance_bps)
                .context("Invalid default tolerance")?,
        };
        let window = self
            .deadline_secs
            .unwrap_or(config.orchestrator.deadline_secs);

        Ok(Submission {
            tolerance,
            recipient: self.recipient.unwrap_or(sender),
            deadline: deadline_from_now(Duration::from_secs(window)),
        })
    }
}

fn parse_address(value: &str) -> std::result::Result<Address, String> {
    value
        .parse::<Address>()
        .map_err(|e| format!("invalid address '{}': {}", value, e))
}

fn parse_amount(value: &str) -> std::result::Result<U256, String> {
    U256::from_dec_str(value).map_err(|e| format!("invalid amount '{}': {}", value, e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref(), cli.env.as_deref())?;
    init_logging(
        cli.log_level.as_deref().unwrap_or(&config.log_level),
        cli.json_logs,
    );

    info!(
        "Starting Tidepool on {} (chain {})",
        config.network.name, config.network.chain_id
    );

    let key = wallet_key()?;
    let client = Arc::new(
        EthersLiquidityClient::connect(&config.network, &config.contracts, &key).await?,
    );
    let sender = client.sender();
    let orchestrator = LiquidityOrchestrator::new(
        client.clone(),
        client.clone(),
        client.clone(),
        sender,
        config.orchestrator.clone(),
    );

    if let Err(e) = run(cli.command, &config, &client, &orchestrator).await {
        match e.downcast_ref::<LiquidityError>() {
            Some(failure) if failure.is_pre_submission() => {
                error!("Nothing was sent: {}", failure);
            }
            Some(failure) => {
                error!(
                    "Flow stopped during {}; re-issue from fresh reads: {}",
                    failure.stage(),
                    failure
                );
            }
            None => error!("{:#}", e),
        }
        return Err(e);
    }

    Ok(())
}

async fn run(
    command: Command,
    config: &LiquidityConfig,
    client: &EthersLiquidityClient,
    orchestrator: &Orchestrator,
) -> Result<()> {
    let sender = orchestrator.sender();

    match command {
        Command::Pair { token_a, token_b } => {
            match orchestrator.resolve_pair(token_a, token_b).await? {
                Some(pair) => {
                    let snapshot = orchestrator.balance_snapshot(&pair, sender).await?;
                    print_json(&serde_json::json!({ "pair": pair, "balance": snapshot }))?;
                }
                None => print_json(&serde_json::json!({ "pair": null }))?,
            }
        }

        Command::Add {
            token,
            counterparty,
            amount,
            counterparty_amount,
            submit,
        } => {
            let submission = submit.resolve(config, sender)?;
            let request = TokenPairLiquidityRequest {
                base: LiquidityRequest {
                    token,
                    amount_desired: amount,
                    tolerance: submission.tolerance,
                    recipient: submission.recipient,
                    deadline: submission.deadline,
                },
                counterparty_token: counterparty,
                counterparty_amount_desired: counterparty_amount,
            };

            let outcome = orchestrator.add_liquidity(&request).await?;
            log_success!("Liquidity added in {:?}", outcome.tx_hash);
            report_explorer_link(config, outcome.tx_hash);
            print_json(&outcome)?;
        }

        Command::AddNative {
            token,
            amount,
            value,
            min_native,
            submit,
        } => {
            let submission = submit.resolve(config, sender)?;
            let request = NativeLiquidityRequest {
                base: LiquidityRequest {
                    token,
                    amount_desired: amount,
                    tolerance: submission.tolerance,
                    recipient: submission.recipient,
                    deadline: submission.deadline,
                },
                native_amount_desired: value,
                min_native_amount: min_native,
            };

            report_native_balance(client, sender, "before").await?;
            let outcome = orchestrator.add_liquidity_native(&request).await?;
            report_native_balance(client, sender, "after").await?;

            log_success!("Native liquidity added in {:?}", outcome.tx_hash);
            report_explorer_link(config, outcome.tx_hash);
            print_json(&outcome)?;
        }

        Command::Remove {
            token,
            counterparty,
            liquidity,
            min_token,
            min_counterparty,
            submit,
        } => {
            let submission = submit.resolve(config, sender)?;
            let request = TokenPairWithdrawalRequest {
                base: WithdrawalRequest {
                    token,
                    liquidity_desired: liquidity,
                    min_token,
                    min_counterparty,
                    recipient: submission.recipient,
                    deadline: submission.deadline,
                },
                counterparty_token: counterparty,
            };

            let outcome = orchestrator.remove_liquidity(&request).await?;
            log_success!("Liquidity removed in {:?}", outcome.tx_hash);
            report_explorer_link(config, outcome.tx_hash);
            print_json(&outcome)?;
        }

        Command::RemoveNative {
            token,
            liquidity,
            min_token,
            min_native,
            submit,
        } => {
            let submission = submit.resolve(config, sender)?;
            let request = WithdrawalRequest {
                token,
                liquidity_desired: liquidity,
                min_token,
                min_counterparty: min_native,
                recipient: submission.recipient,
                deadline: submission.deadline,
            };

            report_native_balance(client, sender, "before").await?;
            let outcome = orchestrator.remove_liquidity_native(&request).await?;
            report_native_balance(client, sender, "after").await?;

            log_success!("Native liquidity removed in {:?}", outcome.tx_hash);
            report_explorer_link(config, outcome.tx_hash);
            print_json(&outcome)?;
        }
    }

    Ok(())
}

async fn report_native_balance(
    client: &EthersLiquidityClient,
    owner: Address,
    when: &str,
) -> Result<()> {
    let balance = client.native_balance(owner).await?;
    log_balance!("Native balance of {:?} {}: {} wei", owner, when, balance);
    Ok(())
}

fn report_explorer_link(config: &LiquidityConfig, tx_hash: H256) {
    if let Some(url) = config.network.tx_url(&format!("{:?}", tx_hash)) {
        info!("   - Explorer: {}", url);
    }
}

fn print_json<S: Serialize>(value: &S) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render output")?;
    println!("{}", rendered);
    Ok(())
}

fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
