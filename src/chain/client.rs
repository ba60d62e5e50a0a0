//! JSON-RPC chain client
//!
//! Plain `eth_call`s against the Uniswap V2 factory/pair and ERC-20 ABIs.
//! One client is dialed per configured endpoint and shared by every request.

use alloy_primitives::{Address, Bytes, U256};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, trace};

use super::{ChainClient, Reserves};
use crate::error::{PriceError, PriceResult};

// ============================================
// CONTRACT INTERFACES
// ============================================

sol! {
    interface IUniswapV2Factory {
        function getPair(address tokenA, address tokenB) external view returns (address pair);
    }

    interface IUniswapV2Pair {
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
        function token0() external view returns (address);
        function token1() external view returns (address);
    }

    interface IERC20 {
        function decimals() external view returns (uint8);
    }
}

// ============================================
// CLIENT
// ============================================

pub struct RpcChainClient {
    endpoint: String,
    provider: RootProvider,
    timeout: Option<Duration>,
}

impl RpcChainClient {
    /// Build a client for `endpoint` and check that it answers.
    pub async fn dial(endpoint: &str, timeout: Option<Duration>) -> PriceResult<Self> {
        let url = endpoint
            .parse()
            .map_err(|e| PriceError::InvalidConfig(format!("rpc url {}: {}", endpoint, e)))?;

        let client = Self {
            endpoint: endpoint.to_string(),
            provider: RootProvider::new_http(url),
            timeout,
        };

        let chain_id = client.with_timeout("eth_chainId", client.provider.get_chain_id()).await?;
        debug!("Dialed {} (chain id {})", client.endpoint, chain_id);

        Ok(client)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn with_timeout<F, T, E>(&self, call: &'static str, fut: F) -> PriceResult<T>
    where
        F: std::future::IntoFuture<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| PriceError::rpc(call, format!("timed out after {:?}", limit)))?,
            None => fut.await,
        };
        result.map_err(|e| PriceError::rpc(call, e))
    }

    /// Encode, `eth_call`, decode
    async fn call<C>(&self, name: &'static str, to: Address, call: C) -> PriceResult<C::Return>
    where
        C: SolCall + Send,
    {
        let tx = TransactionRequest::default()
            .to(to)
            .input(Bytes::from(call.abi_encode()).into());

        trace!("{} -> {:?} via {}", name, to, self.endpoint);
        let output = self.with_timeout(name, self.provider.call(tx)).await?;

        C::abi_decode_returns(&output).map_err(|e| PriceError::rpc(name, e))
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn get_pair(&self, factory: Address, token_a: Address, token_b: Address) -> PriceResult<Address> {
        self.call(
            "getPair",
            factory,
            IUniswapV2Factory::getPairCall {
                tokenA: token_a,
                tokenB: token_b,
            },
        )
        .await
    }

    async fn decimals(&self, token: Address) -> PriceResult<u8> {
        self.call("decimals", token, IERC20::decimalsCall {}).await
    }

    async fn token0(&self, pair: Address) -> PriceResult<Address> {
        self.call("token0", pair, IUniswapV2Pair::token0Call {}).await
    }

    async fn token1(&self, pair: Address) -> PriceResult<Address> {
        self.call("token1", pair, IUniswapV2Pair::token1Call {}).await
    }

    async fn get_reserves(&self, pair: Address) -> PriceResult<Reserves> {
        let r = self
            .call("getReserves", pair, IUniswapV2Pair::getReservesCall {})
            .await?;

        // uint112 always fits in u128
        Ok(Reserves {
            reserve0: U256::from(r.reserve0.to::<u128>()),
            reserve1: U256::from(r.reserve1.to::<u128>()),
        })
    }
}
