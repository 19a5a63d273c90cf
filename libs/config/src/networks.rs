//! Network presets and contract deployments
//!
//! Constants for the networks Tidepool knows how to talk to. Addresses are kept as
//! checksummed strings so this crate stays free of chain client dependencies; callers
//! parse them into their own address type.

use serde::{Deserialize, Serialize};

/// Zero address, returned by the factory when no pair exists
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Ethereum mainnet with the canonical Uniswap V2 deployment
pub mod mainnet {
    pub const NAME: &str = "mainnet";
    pub const CHAIN_ID: u64 = 1;
    pub const RPC_URL: &str = "https://eth.llamarpc.com";

    pub const UNISWAP_V2_ROUTER: &str = "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D";
    pub const UNISWAP_V2_FACTORY: &str = "0x5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f";

    /// Common tokens
    pub const WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
    pub const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
    pub const DAI: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F";
}

/// Local hardhat node forking mainnet
pub mod fork {
    pub const NAME: &str = "fork";
    pub const CHAIN_ID: u64 = 31337;
    pub const RPC_URL: &str = "http://127.0.0.1:8545";
}

/// Lisk Sepolia testnet
pub mod lisk_sepolia {
    pub const NAME: &str = "lisk-sepolia";
    pub const CHAIN_ID: u64 = 4202;
    pub const RPC_URL: &str = "https://rpc.sepolia-api.lisk.com";
    /// Legacy gas price (1 gwei)
    pub const GAS_PRICE_WEI: u64 = 1_000_000_000;
    pub const EXPLORER_URL: &str = "https://sepolia-blockscout.lisk.com";
}

/// Router and factory addresses of a Uniswap V2 style deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniswapV2Deployment {
    pub router: String,
    pub factory: String,
}

impl UniswapV2Deployment {
    pub fn mainnet() -> Self {
        Self {
            router: mainnet::UNISWAP_V2_ROUTER.to_string(),
            factory: mainnet::UNISWAP_V2_FACTORY.to_string(),
        }
    }
}

/// Connection settings for a single chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    pub chain_id: u64,
    pub rpc_url: String,
    /// Fixed legacy gas price; EIP-1559 estimation is used when unset
    pub gas_price_wei: Option<u64>,
    /// Block explorer base URL, used to link submitted transactions
    pub explorer_url: Option<String>,
}

impl NetworkConfig {
    /// Explorer page for a transaction hash, if the network has an explorer
    pub fn tx_url(&self, tx_hash: &str) -> Option<String> {
        self.explorer_url
            .as_deref()
            .map(|base| format!("{}/tx/{}", base.trim_end_matches('/'), tx_hash))
    }
}

/// Look up a built-in network preset by name
///
/// The deployment is `None` for networks without a known Uniswap V2 deployment; those
/// need router and factory addresses from configuration.
pub fn preset(name: &str) -> Option<(NetworkConfig, Option<UniswapV2Deployment>)> {
    match name {
        mainnet::NAME => Some((
            NetworkConfig {
                name: mainnet::NAME.to_string(),
                chain_id: mainnet::CHAIN_ID,
                rpc_url: mainnet::RPC_URL.to_string(),
                gas_price_wei: None,
                explorer_url: Some("https://etherscan.io".to_string()),
            },
            Some(UniswapV2Deployment::mainnet()),
        )),
        fork::NAME | "hardhat" | "localhost" => Some((
            NetworkConfig {
                name: fork::NAME.to_string(),
                chain_id: fork::CHAIN_ID,
                rpc_url: fork::RPC_URL.to_string(),
                gas_price_wei: None,
                explorer_url: None,
            },
            Some(UniswapV2Deployment::mainnet()),
        )),
        lisk_sepolia::NAME => Some((
            NetworkConfig {
                name: lisk_sepolia::NAME.to_string(),
                chain_id: lisk_sepolia::CHAIN_ID,
                rpc_url: lisk_sepolia::RPC_URL.to_string(),
                gas_price_wei: Some(lisk_sepolia::GAS_PRICE_WEI),
                explorer_url: Some(lisk_sepolia::EXPLORER_URL.to_string()),
            },
            None,
        )),
        _ => None,
    }
}

/// Loose shape check for a hex address string
pub fn is_address(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .map(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let (lisk, deployment) = preset("lisk-sepolia").unwrap();
        assert_eq!(lisk.chain_id, 4202);
        assert_eq!(lisk.gas_price_wei, Some(1_000_000_000));
        assert!(deployment.is_none());

        let (fork, deployment) = preset("hardhat").unwrap();
        assert_eq!(fork.name, "fork");
        assert_eq!(deployment.unwrap().router, mainnet::UNISWAP_V2_ROUTER);

        assert!(preset("unknown").is_none());
    }

    #[test]
    fn test_tx_url() {
        let (lisk, _) = preset("lisk-sepolia").unwrap();
        assert_eq!(
            lisk.tx_url("0xabc").as_deref(),
            Some("https://sepolia-blockscout.lisk.com/tx/0xabc")
        );

        let (mut mainnet, _) = preset("mainnet").unwrap();
        mainnet.explorer_url = Some("https://etherscan.io/".to_string());
        assert_eq!(
            mainnet.tx_url("0xdef").as_deref(),
            Some("https://etherscan.io/tx/0xdef")
        );

        let (fork, _) = preset("fork").unwrap();
        assert_eq!(fork.tx_url("0xabc"), None);
    }

    #[test]
    fn test_address_constants_are_well_formed() {
        for address in [
            ZERO_ADDRESS,
            mainnet::UNISWAP_V2_ROUTER,
            mainnet::UNISWAP_V2_FACTORY,
            mainnet::WETH,
            mainnet::USDC,
            mainnet::DAI,
        ] {
            assert!(is_address(address), "{}", address);
        }
        assert!(!is_address("0x1234"));
        assert!(!is_address("7a250d5630B4cF539739dF2C5dAcb4c659F2488D"));
    }
}
