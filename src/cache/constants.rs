//! Per-pair constants discovered on chain
//!
//! Pair address, decimals and token order never change for a deployed pair,
//! so they are looked up once per symbol and kept for the life of the
//! process. There is no invalidation path.

use alloy_primitives::Address;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::chain::ChainClient;
use crate::error::{PriceError, PriceResult};
use crate::routes::{Route, RouteTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairConstant {
    pub pair: Address,
    pub target_decimals: u8,
    pub price_decimals: u8,
    pub target_is_token0: bool,
}

#[derive(Debug, Default)]
pub struct ConstantCache {
    constants: RwLock<HashMap<String, PairConstant>>,
}

impl ConstantCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, symbol: &str) -> Option<PairConstant> {
        self.constants.read().await.get(symbol).copied()
    }

    pub async fn len(&self) -> usize {
        self.constants.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.constants.read().await.is_empty()
    }

    /// Cached constant for the route's target symbol, discovering it on first use.
    ///
    /// Two concurrent first lookups may both hit the chain; the later write wins.
    pub async fn resolve<C>(&self, routes: &RouteTable, route: Route, client: &C) -> PriceResult<PairConstant>
    where
        C: ChainClient + ?Sized,
    {
        let symbol = &routes.pair(route).target_symbol;
        if let Some(constant) = self.get(symbol).await {
            return Ok(constant);
        }

        let constant = discover(routes, route, client).await?;

        self.constants.write().await.insert(symbol.clone(), constant);
        Ok(constant)
    }
}

/// getPair -> decimals x2 -> token0/token1, then check the pair really holds our tokens
async fn discover<C>(routes: &RouteTable, route: Route, client: &C) -> PriceResult<PairConstant>
where
    C: ChainClient + ?Sized,
{
    let factory = routes.swap(route).factory;
    let pair = routes.pair(route);
    let symbol = &pair.target_symbol;

    debug!("Discovering pair for {} on {}", symbol, routes.swap(route).name);

    let pair_addr = client
        .get_pair(factory, pair.target, pair.price)
        .await
        .map_err(|e| PriceError::PairDiscoveryFailed {
            symbol: symbol.clone(),
            reason: e.to_string(),
        })?;
    if pair_addr == Address::ZERO {
        return Err(PriceError::PairDiscoveryFailed {
            symbol: symbol.clone(),
            reason: format!("factory {:?} has no pair", factory),
        });
    }

    let named = |e: PriceError| e.for_symbol(symbol);

    let target_decimals = client.decimals(pair.target).await.map_err(named)?;
    let price_decimals = client.decimals(pair.price).await.map_err(named)?;

    let token0 = client.token0(pair_addr).await.map_err(named)?;
    let token1 = client.token1(pair_addr).await.map_err(named)?;

    let matches = (token0 == pair.target && token1 == pair.price)
        || (token0 == pair.price && token1 == pair.target);
    if !matches {
        return Err(PriceError::InvalidPairOrdering(symbol.clone()));
    }

    let constant = PairConstant {
        pair: pair_addr,
        target_decimals,
        price_decimals,
        target_is_token0: token0 == pair.target,
    };

    info!(
        "Pair for {}/{}: {:?} (decimals {}/{}, target is token{})",
        symbol,
        pair.price_symbol,
        pair_addr,
        target_decimals,
        price_decimals,
        if constant.target_is_token0 { 0 } else { 1 }
    );

    Ok(constant)
}
