//! Chain access
//!
//! `ChainClient` is the seam between the resolver and the RPC transport:
//! the five read calls a Uniswap V2 style factory/pair/ERC-20 set exposes.

mod client;
mod pool;

pub use client::RpcChainClient;
pub use pool::ChainClientPool;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use crate::error::PriceResult;

/// Raw pair reserves as returned by `getReserves()`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reserves {
    pub reserve0: U256,
    pub reserve1: U256,
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Pair address for two tokens, zero if the factory has none
    async fn get_pair(&self, factory: Address, token_a: Address, token_b: Address) -> PriceResult<Address>;

    async fn decimals(&self, token: Address) -> PriceResult<u8>;

    async fn token0(&self, pair: Address) -> PriceResult<Address>;

    async fn token1(&self, pair: Address) -> PriceResult<Address>;

    async fn get_reserves(&self, pair: Address) -> PriceResult<Reserves>;
}
