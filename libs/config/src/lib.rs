//! # Tidepool Configuration
//!
//! Network presets and layered configuration loading for Tidepool services.
//!
//! ## Features
//!
//! - **Network Presets**: Chain ids, RPC endpoints and gas settings for supported networks
//! - **Uniswap V2 Deployments**: Router, factory and token addresses per network
//! - **Layered Loading**: Defaults, TOML file, environment overlay, `TIDEPOOL__` variables
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tidepool_config::{networks, LiquidityConfig};
//!
//! let config = LiquidityConfig::load(None, Some("fork"))?;
//! assert_eq!(networks::mainnet::CHAIN_ID, 1);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod networks;
pub mod settings;

// Re-export commonly used types
pub use networks::{preset, NetworkConfig, UniswapV2Deployment};
pub use settings::{load_config, wallet_key, ClampPolicy, LiquidityConfig, OrchestratorSettings};
