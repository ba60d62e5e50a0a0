//! Short-lived price cache
//!
//! Bounds the upstream call rate: a symbol priced within the last second is
//! served from memory.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::trace;

use super::{Clock, SystemClock};

/// Seconds a price stays valid
pub const PRICE_TTL_SECS: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheEntry {
    pub price: f64,
    /// Seconds since the epoch at which the price was stored
    pub timestamp: i64,
}

impl CacheEntry {
    pub fn is_fresh(&self, now: i64, ttl: i64) -> bool {
        now - self.timestamp < ttl
    }
}

pub struct PriceCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: i64,
    clock: Arc<dyn Clock>,
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: PRICE_TTL_SECS,
            clock,
        }
    }

    /// Split `symbols` into fresh hits and misses (deduplicated, first-seen order).
    pub async fn get_many(&self, symbols: &[String]) -> (HashMap<String, f64>, Vec<String>) {
        let now = self.clock.now_secs();
        let mut hits = HashMap::new();
        let mut misses = Vec::new();
        let mut seen = HashSet::new();

        let entries = self.entries.read().await;
        for symbol in symbols {
            if !seen.insert(symbol.as_str()) {
                continue;
            }
            match entries.get(symbol) {
                Some(entry) if entry.is_fresh(now, self.ttl) => {
                    hits.insert(symbol.clone(), entry.price);
                }
                _ => misses.push(symbol.clone()),
            }
        }
        drop(entries);

        trace!("Price cache: {} hits, {} misses", hits.len(), misses.len());
        (hits, misses)
    }

    /// Store freshly fetched prices, all stamped with the current time.
    pub async fn put_many<I>(&self, prices: I)
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let timestamp = self.clock.now_secs();
        let mut entries = self.entries.write().await;
        for (symbol, price) in prices {
            entries.insert(symbol, CacheEntry { price, timestamp });
        }
    }

    pub async fn get(&self, symbol: &str) -> Option<CacheEntry> {
        self.entries.read().await.get(symbol).copied()
    }
}
