//! dex-price - cached spot prices from constant-product liquidity pools
//!
//! Resolution path for a symbol:
//! `RouteTable` -> `PriceCache` -> `ConstantCache` -> `ChainClientPool` ->
//! `calculator` -> anchor chaining -> `PriceCache`

pub mod cache;
pub mod calculator;
pub mod chain;
pub mod config;
pub mod error;
pub mod resolver;
pub mod routes;
pub mod server;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{ConstantCache, PairConstant, PriceCache};
pub use chain::{ChainClient, ChainClientPool, Reserves, RpcChainClient};
pub use config::Config;
pub use error::{PriceError, PriceResult};
pub use resolver::PriceResolver;
pub use routes::{Route, RouteTable};
