//! Ethers-backed contract clients
//!
//! Implements the client traits against a JSON-RPC node with a local signing key.

pub mod bindings;
mod client;
pub mod events;

pub use client::{EthersLiquidityClient, SignerClient};
