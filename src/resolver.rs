//! Price resolution
//!
//! For a batch of symbols:
//! 1. serve what the price cache still holds
//! 2. for each miss: route -> pair constant -> reserves -> raw price
//! 3. while the quote token is not an anchor, price the quote token too and
//!    multiply (at most `max_hops` extra hops)
//! 4. write the new prices back, but only if the whole batch succeeded

use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::{ConstantCache, PriceCache};
use crate::calculator;
use crate::chain::{ChainClient, ChainClientPool};
use crate::error::{PriceError, PriceResult};
use crate::routes::{Route, RouteTable};

pub struct PriceResolver<C> {
    routes: Arc<RouteTable>,
    clients: ChainClientPool<C>,
    constants: Arc<ConstantCache>,
    prices: Arc<PriceCache>,
    max_hops: usize,
}

impl<C: ChainClient> PriceResolver<C> {
    pub fn new(
        routes: Arc<RouteTable>,
        clients: ChainClientPool<C>,
        constants: Arc<ConstantCache>,
        prices: Arc<PriceCache>,
        max_hops: usize,
    ) -> Self {
        Self {
            routes,
            clients,
            constants,
            prices,
            max_hops,
        }
    }

    /// Prices for `symbols`, in the order asked (duplicates included).
    ///
    /// The first failing symbol fails the whole batch and nothing is cached.
    pub async fn get_prices(&self, symbols: &[String]) -> PriceResult<Vec<(String, f64)>> {
        let (mut known, misses) = self.prices.get_many(symbols).await;

        if !misses.is_empty() {
            debug!("Resolving {} uncached symbols", misses.len());

            let fresh = try_join_all(misses.iter().map(|symbol| async move {
                self.resolve(symbol)
                    .await
                    .map(|price| (symbol.clone(), price))
            }))
            .await
            .map_err(|e| {
                warn!("Price lookup failed: {}", e);
                e
            })?;

            known.extend(fresh.iter().cloned());
            self.prices.put_many(fresh).await;
        }

        Ok(symbols
            .iter()
            .filter_map(|symbol| known.get(symbol).map(|price| (symbol.clone(), *price)))
            .collect())
    }

    /// Price of one symbol in anchor units, bypassing the price cache
    pub async fn resolve(&self, symbol: &str) -> PriceResult<f64> {
        let mut price = 1.0;
        let mut current = symbol.to_string();
        let mut hops = 0;

        loop {
            let route = self
                .routes
                .lookup(&current)
                .ok_or_else(|| PriceError::TokenNotFound(current.clone()))?;

            price *= self.pair_price(route).await?;

            let quote = &self.routes.pair(route).price_symbol;
            if self.routes.is_anchor(&self.routes.chain(route).name, quote) {
                return Ok(price);
            }
            if hops == self.max_hops {
                return Err(PriceError::UnsupportedRoute(symbol.to_string()));
            }

            hops += 1;
            current = quote.clone();
        }
    }

    /// Target priced in its own quote token. One client serves the whole lookup.
    async fn pair_price(&self, route: Route) -> PriceResult<f64> {
        let client = self.clients.next();
        let symbol = &self.routes.pair(route).target_symbol;

        let constant = self.constants.resolve(&self.routes, route, client).await?;
        let reserves = client
            .get_reserves(constant.pair)
            .await
            .map_err(|e| e.for_symbol(symbol))?;

        calculator::compute(
            reserves.reserve0,
            reserves.reserve1,
            constant.target_decimals,
            constant.price_decimals,
            constant.target_is_token0,
        )
        .map_err(|_| PriceError::EmptyPool(symbol.clone()))
    }

    pub fn list_tokens(&self) -> Vec<String> {
        self.routes.list_tokens()
    }
}
