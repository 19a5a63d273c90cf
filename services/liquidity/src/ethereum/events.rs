//! Pair event decoding for realized liquidity amounts
//!
//! The router's return values are only observable in simulation. The mined amounts come
//! from the pair's `Mint`/`Burn` events and the liquidity token `Transfer` from the zero
//! address. Pair events report amounts in sorted token order, which is mapped back onto
//! the router's argument order here.

use ethers::abi::RawLog;
use ethers::contract::EthEvent;
use ethers::types::{Address, Log, U256};

#[derive(Clone, Debug, PartialEq, Eq, EthEvent)]
#[ethevent(name = "Mint", abi = "Mint(address,uint256,uint256)")]
pub struct MintEvent {
    #[ethevent(indexed)]
    pub sender: Address,
    pub amount0: U256,
    pub amount1: U256,
}

#[derive(Clone, Debug, PartialEq, Eq, EthEvent)]
#[ethevent(name = "Burn", abi = "Burn(address,uint256,uint256,address)")]
pub struct BurnEvent {
    #[ethevent(indexed)]
    pub sender: Address,
    pub amount0: U256,
    pub amount1: U256,
    #[ethevent(indexed)]
    pub to: Address,
}

#[derive(Clone, Debug, PartialEq, Eq, EthEvent)]
#[ethevent(name = "Transfer", abi = "Transfer(address,address,uint256)")]
pub struct TransferEvent {
    #[ethevent(indexed)]
    pub from: Address,
    #[ethevent(indexed)]
    pub to: Address,
    pub value: U256,
}

/// Decode every log emitted by `emitter` that matches event `E`
fn find_event<E: EthEvent>(logs: &[Log], emitter: Address) -> impl Iterator<Item = E> + '_ {
    logs.iter()
        .filter(move |log| log.address == emitter)
        .filter(|log| log.topics.first() == Some(&E::signature()))
        .filter_map(|log| {
            let raw = RawLog {
                topics: log.topics.clone(),
                data: log.data.to_vec(),
            };
            <E as EthEvent>::decode_log(&raw).ok()
        })
}

/// Map sorted-order pair amounts onto `(token_a, token_b)` order
fn in_argument_order(
    token_a: Address,
    token_b: Address,
    amount0: U256,
    amount1: U256,
) -> (U256, U256) {
    if token_a < token_b {
        (amount0, amount1)
    } else {
        (amount1, amount0)
    }
}

/// Realized `(amount_a, amount_b, liquidity)` of an add-liquidity receipt
pub fn decode_mint(
    logs: &[Log],
    pair: Address,
    token_a: Address,
    token_b: Address,
    recipient: Address,
) -> Option<(U256, U256, U256)> {
    let mint = find_event::<MintEvent>(logs, pair).next()?;
    // the first mint of a pair also locks minimum liquidity to the zero address
    let minted = find_event::<TransferEvent>(logs, pair)
        .find(|transfer| transfer.from.is_zero() && transfer.to == recipient)?;

    let (amount_a, amount_b) = in_argument_order(token_a, token_b, mint.amount0, mint.amount1);
    Some((amount_a, amount_b, minted.value))
}

/// Realized `(amount_a, amount_b)` of a remove-liquidity receipt
pub fn decode_burn(
    logs: &[Log],
    pair: Address,
    token_a: Address,
    token_b: Address,
) -> Option<(U256, U256)> {
    let burn = find_event::<BurnEvent>(logs, pair).next()?;
    Some(in_argument_order(token_a, token_b, burn.amount0, burn.amount1))
}
