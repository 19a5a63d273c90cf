//! Liquidity Service Configuration
//!
//! Loads configuration from built-in defaults, an optional TOML file, an optional
//! environment-specific overlay and finally `TIDEPOOL__` prefixed environment variables.

use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::networks::{self, is_address, NetworkConfig, UniswapV2Deployment};

/// Environment variable holding the signer's private key
pub const WALLET_KEY_ENV: &str = "WALLET_KEY";

/// Default config file location
pub const DEFAULT_CONFIG_PATH: &str = "config/liquidity.toml";

/// What to do with caller-supplied withdrawal minimums when the burn amount was clamped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClampPolicy {
    /// Scale minimums down in proportion to the clamped liquidity
    #[default]
    ProRata,
    /// Refuse to submit when a clamp makes the minimums inconsistent
    Abort,
}

/// Orchestrator behaviour settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorSettings {
    /// Slippage tolerance applied when a request does not name one (basis points)
    pub default_tolerance_bps: u32,
    /// Seconds from now until submitted transactions expire
    pub deadline_secs: u64,
    pub clamp_policy: ClampPolicy,
    /// Re-read the liquidity balance right before burning
    pub recheck_balance: bool,
}

/// Complete configuration for the liquidity service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityConfig {
    pub network: NetworkConfig,
    pub contracts: UniswapV2Deployment,
    pub orchestrator: OrchestratorSettings,
    pub log_level: String,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            default_tolerance_bps: 50, // 0.5%
            deadline_secs: 600,        // 10 minutes
            clamp_policy: ClampPolicy::ProRata,
            recheck_balance: true,
        }
    }
}

impl Default for LiquidityConfig {
    fn default() -> Self {
        Self::for_network(networks::fork::NAME).unwrap_or_else(|| Self {
            network: NetworkConfig {
                name: networks::fork::NAME.to_string(),
                chain_id: networks::fork::CHAIN_ID,
                rpc_url: networks::fork::RPC_URL.to_string(),
                gas_price_wei: None,
                explorer_url: None,
            },
            contracts: UniswapV2Deployment::mainnet(),
            orchestrator: OrchestratorSettings::default(),
            log_level: "info".to_string(),
        })
    }
}

impl LiquidityConfig {
    /// Configuration seeded from a built-in network preset
    ///
    /// Networks without a known deployment get the mainnet addresses as placeholders and
    /// must override `contracts` before use.
    pub fn for_network(name: &str) -> Option<Self> {
        let (network, deployment) = networks::preset(name)?;
        Some(Self {
            network,
            contracts: deployment.unwrap_or_else(UniswapV2Deployment::mainnet),
            orchestrator: OrchestratorSettings::default(),
            log_level: "info".to_string(),
        })
    }

    /// Load configuration from files with environment overrides
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let defaults = environment
            .and_then(Self::for_network)
            .unwrap_or_default();

        let mut builder = Config::builder().add_source(
            Config::try_from(&defaults).context("Failed to serialize default configuration")?,
        );

        match base_path {
            Some(path) => {
                info!("Loading liquidity config: {:?}", path);
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    info!("Loading liquidity config: {:?}", path);
                    builder = builder.add_source(File::from(path));
                } else {
                    debug!("No config file at {:?}, using defaults", path);
                }
            }
        }

        // Add environment-specific overrides if specified
        if let Some(env) = environment {
            let env_file = PathBuf::from("config/environments").join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                debug!("Environment config not found: {:?}", env_file);
            }
        }

        // Override with environment variables (TIDEPOOL__NETWORK__RPC_URL, ...)
        builder = builder.add_source(
            Environment::with_prefix("TIDEPOOL")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Expand environment variables in string values
    pub fn expand_env_vars(&mut self) -> Result<()> {
        self.network.rpc_url = shellexpand::env(&self.network.rpc_url)
            .context("Failed to expand RPC URL")?
            .into_owned();

        for address in [&mut self.contracts.router, &mut self.contracts.factory] {
            *address = shellexpand::env(address.as_str())
                .context("Failed to expand contract address")?
                .into_owned();
        }
        Ok(())
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.network.rpc_url.is_empty() {
            bail!("network.rpc_url must be set");
        }

        if self.network.chain_id == 0 {
            bail!("network.chain_id must be positive");
        }

        if !is_address(&self.contracts.router) {
            bail!("Invalid router address: {}", self.contracts.router);
        }

        if !is_address(&self.contracts.factory) {
            bail!("Invalid factory address: {}", self.contracts.factory);
        }

        // A total tolerance would disable slippage protection
        if self.orchestrator.default_tolerance_bps >= 10_000 {
            bail!("orchestrator.default_tolerance_bps must be < 10000 (100%)");
        }

        if self.orchestrator.deadline_secs == 0 {
            bail!("orchestrator.deadline_secs must be positive");
        }

        if self.network.gas_price_wei == Some(0) {
            warn!("Zero gas price configured for {}", self.network.name);
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write configuration to {:?}", path))?;
        Ok(())
    }
}

/// Read the signer key from the environment
pub fn wallet_key() -> Result<String> {
    std::env::var(WALLET_KEY_ENV)
        .with_context(|| format!("{} is not set", WALLET_KEY_ENV))
}

/// Convenience function to load, expand and validate configuration
pub fn load_config(path: Option<&Path>, environment: Option<&str>) -> Result<LiquidityConfig> {
    let mut config = LiquidityConfig::load(path, environment)?;
    config.expand_env_vars()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_validation() {
        let config = LiquidityConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.network.chain_id, networks::fork::CHAIN_ID);
        assert_eq!(config.orchestrator.deadline_secs, 600);
    }

    #[test]
    fn test_load_base_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("liquidity.toml");

        let config_content = r#"
log_level = "debug"

[network]
name = "lisk-sepolia"
chain_id = 4202
rpc_url = "https://rpc.sepolia-api.lisk.com"
gas_price_wei = 1000000000

[contracts]
router = "0x1111111111111111111111111111111111111111"
factory = "0x2222222222222222222222222222222222222222"

[orchestrator]
default_tolerance_bps = 2000
deadline_secs = 120
clamp_policy = "abort"
recheck_balance = false
"#;

        fs::write(&config_path, config_content).unwrap();

        let config = LiquidityConfig::load(Some(&config_path), None).unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.network.chain_id, 4202);
        assert_eq!(config.network.gas_price_wei, Some(1_000_000_000));
        assert_eq!(config.orchestrator.clamp_policy, ClampPolicy::Abort);
        assert_eq!(config.orchestrator.default_tolerance_bps, 2000);
        assert!(!config.orchestrator.recheck_balance);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("liquidity.toml");
        fs::write(&config_path, "[orchestrator]\ndeadline_secs = 30\n").unwrap();

        let config = LiquidityConfig::load(Some(&config_path), None).unwrap();

        assert_eq!(config.orchestrator.deadline_secs, 30);
        assert_eq!(config.orchestrator.clamp_policy, ClampPolicy::ProRata);
        assert_eq!(config.contracts, UniswapV2Deployment::mainnet());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("saved.toml");

        let mut config = LiquidityConfig::for_network("mainnet").unwrap();
        config.orchestrator.clamp_policy = ClampPolicy::Abort;
        config.save_to_file(&config_path).unwrap();

        let reloaded = LiquidityConfig::load(Some(&config_path), None).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_validation_rejects_total_tolerance() {
        let mut config = LiquidityConfig::default();
        config.orchestrator.default_tolerance_bps = 10_000;
        assert!(config.validate().is_err());

        let mut config = LiquidityConfig::default();
        config.contracts.router = "0xnot-an-address".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("TIDEPOOL_TEST_RPC_HOST", "node.internal");
        let mut config = LiquidityConfig::default();
        config.network.rpc_url = "http://${TIDEPOOL_TEST_RPC_HOST}:8545".to_string();

        config.expand_env_vars().unwrap();
        assert_eq!(config.network.rpc_url, "http://node.internal:8545");

        std::env::remove_var("TIDEPOOL_TEST_RPC_HOST");
    }
}
