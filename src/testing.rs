//! In-memory chain and clock for unit tests

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::cache::Clock;
use crate::chain::{ChainClient, Reserves};
use crate::error::{PriceError, PriceResult};

#[derive(Default)]
pub struct MockChainClient {
    decimals: HashMap<Address, u8>,
    pairs: HashMap<(Address, Address), Address>,
    tokens: HashMap<Address, (Address, Address)>,
    reserves: Mutex<HashMap<Address, Reserves>>,
    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<HashMap<&'static str, usize>>,
    total: AtomicUsize,
}

impl MockChainClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: Address, decimals: u8) -> Self {
        self.decimals.insert(token, decimals);
        self
    }

    /// Register a pool; the factory answers for both token orders.
    pub fn with_pair(mut self, pair: Address, token0: Address, token1: Address, reserve0: u128, reserve1: u128) -> Self {
        self.pairs.insert((token0, token1), pair);
        self.pairs.insert((token1, token0), pair);
        self.tokens.insert(pair, (token0, token1));
        self.reserves.lock().unwrap().insert(
            pair,
            Reserves {
                reserve0: U256::from(reserve0),
                reserve1: U256::from(reserve1),
            },
        );
        self
    }

    /// Pair whose token0/token1 do not match what the factory was asked for
    pub fn with_mismatched_pair(mut self, pair: Address, asked: (Address, Address), actual: (Address, Address)) -> Self {
        self.pairs.insert(asked, pair);
        self.pairs.insert((asked.1, asked.0), pair);
        self.tokens.insert(pair, actual);
        self
    }

    pub fn set_reserves(&self, pair: Address, reserve0: u128, reserve1: u128) {
        self.reserves.lock().unwrap().insert(
            pair,
            Reserves {
                reserve0: U256::from(reserve0),
                reserve1: U256::from(reserve1),
            },
        );
    }

    /// Make `getReserves` revert for one pool
    pub fn clear_reserves(&self, pair: Address) {
        self.reserves.lock().unwrap().remove(&pair);
    }

    pub fn fail(&self, call: &'static str) {
        self.failing.lock().unwrap().insert(call);
    }

    pub fn heal(&self, call: &'static str) {
        self.failing.lock().unwrap().remove(call);
    }

    pub fn calls(&self, call: &'static str) -> usize {
        self.calls.lock().unwrap().get(call).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    fn record(&self, call: &'static str) -> PriceResult<()> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self.calls.lock().unwrap().entry(call).or_insert(0) += 1;
        if self.failing.lock().unwrap().contains(call) {
            return Err(PriceError::rpc(call, "mock failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn get_pair(&self, _factory: Address, token_a: Address, token_b: Address) -> PriceResult<Address> {
        self.record("getPair")?;
        Ok(self.pairs.get(&(token_a, token_b)).copied().unwrap_or(Address::ZERO))
    }

    async fn decimals(&self, token: Address) -> PriceResult<u8> {
        self.record("decimals")?;
        self.decimals
            .get(&token)
            .copied()
            .ok_or_else(|| PriceError::rpc("decimals", "execution reverted"))
    }

    async fn token0(&self, pair: Address) -> PriceResult<Address> {
        self.record("token0")?;
        self.tokens
            .get(&pair)
            .map(|t| t.0)
            .ok_or_else(|| PriceError::rpc("token0", "execution reverted"))
    }

    async fn token1(&self, pair: Address) -> PriceResult<Address> {
        self.record("token1")?;
        self.tokens
            .get(&pair)
            .map(|t| t.1)
            .ok_or_else(|| PriceError::rpc("token1", "execution reverted"))
    }

    async fn get_reserves(&self, pair: Address) -> PriceResult<Reserves> {
        self.record("getReserves")?;
        self.reserves
            .lock()
            .unwrap()
            .get(&pair)
            .copied()
            .ok_or_else(|| PriceError::rpc("getReserves", "execution reverted"))
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn at(secs: i64) -> Self {
        Self {
            now: AtomicI64::new(secs),
        }
    }

    pub fn set(&self, secs: i64) {
        self.now.store(secs, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
