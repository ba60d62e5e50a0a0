//! Shared caches
//!
//! Two independent maps, each behind its own reader/writer lock:
//! - `ConstantCache`: per-symbol pair constants, resolved once and kept forever
//! - `PriceCache`: per-symbol prices, valid for one second
//!
//! Neither lock is ever held across an RPC call.

mod constants;
mod prices;

pub use constants::{ConstantCache, PairConstant};
pub use prices::{CacheEntry, PriceCache, PRICE_TTL_SECS};

use chrono::Utc;

/// Source of "now" in whole seconds since the epoch
pub trait Clock: Send + Sync {
    fn now_secs(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> i64 {
        Utc::now().timestamp()
    }
}
