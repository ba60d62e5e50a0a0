//! Route table: token symbol -> the pair that prices it
//!
//! Built once from configuration and never mutated afterwards, so it is
//! shared across request handlers without locking.

use alloy_primitives::Address;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::config::{parse_address, ChainConfig};
use crate::error::{PriceError, PriceResult};

/// The only chain the resolver knows how to talk to
pub const SUPPORTED_CHAIN: &str = "eth";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub target_symbol: String,
    pub target: Address,
    pub price_symbol: String,
    pub price: Address,
}

#[derive(Debug, Clone)]
pub struct Swap {
    pub name: String,
    pub factory: Address,
    pub pairs: Vec<Pair>,
}

#[derive(Debug, Clone)]
pub struct Chain {
    pub name: String,
    pub nodes: Vec<String>,
    pub anchors: HashSet<String>,
    pub swaps: Vec<Swap>,
}

/// Indices of a pair inside the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Route {
    pub chain: usize,
    pub swap: usize,
    pub pair: usize,
}

#[derive(Debug)]
pub struct RouteTable {
    chains: Vec<Chain>,
    routes: HashMap<String, Route>,
}

impl RouteTable {
    /// Build the table. Target symbols are global across chains and swaps.
    pub fn build(configs: &[ChainConfig]) -> PriceResult<Self> {
        let mut chains = Vec::with_capacity(configs.len());
        let mut routes = HashMap::new();

        for (chain_idx, chain_cfg) in configs.iter().enumerate() {
            if chain_cfg.name != SUPPORTED_CHAIN {
                return Err(PriceError::UnsupportedChain(chain_cfg.name.clone()));
            }

            let mut anchors = HashSet::new();
            for symbol in &chain_cfg.stable_coins {
                if !anchors.insert(symbol.clone()) {
                    return Err(PriceError::DuplicateStableCoin(symbol.clone()));
                }
            }

            let mut swaps = Vec::with_capacity(chain_cfg.swaps.len());
            for (swap_idx, swap_cfg) in chain_cfg.swaps.iter().enumerate() {
                let factory = parse_address(&swap_cfg.factory)
                    .map_err(|e| PriceError::InvalidConfig(e.to_string()))?;

                let mut pairs = Vec::with_capacity(swap_cfg.pairs.len());
                for (pair_idx, pair_cfg) in swap_cfg.pairs.iter().enumerate() {
                    let target = parse_address(&pair_cfg.target_token_addr)
                        .map_err(|e| PriceError::InvalidConfig(e.to_string()))?;
                    let price = parse_address(&pair_cfg.price_token_addr)
                        .map_err(|e| PriceError::InvalidConfig(e.to_string()))?;

                    let route = Route {
                        chain: chain_idx,
                        swap: swap_idx,
                        pair: pair_idx,
                    };
                    if routes.insert(pair_cfg.target_token_name.clone(), route).is_some() {
                        return Err(PriceError::DuplicateToken(
                            pair_cfg.target_token_name.clone(),
                        ));
                    }

                    pairs.push(Pair {
                        target_symbol: pair_cfg.target_token_name.clone(),
                        target,
                        price_symbol: pair_cfg.price_token_name.clone(),
                        price,
                    });
                }

                swaps.push(Swap {
                    name: swap_cfg.name.clone(),
                    factory,
                    pairs,
                });
            }

            debug!(
                "Chain {}: {} swaps, {} anchors",
                chain_cfg.name,
                swaps.len(),
                anchors.len()
            );

            chains.push(Chain {
                name: chain_cfg.name.clone(),
                nodes: chain_cfg.nodes.clone(),
                anchors,
                swaps,
            });
        }

        Ok(Self { chains, routes })
    }

    pub fn lookup(&self, symbol: &str) -> Option<Route> {
        self.routes.get(symbol).copied()
    }

    pub fn is_anchor(&self, chain: &str, symbol: &str) -> bool {
        self.chains
            .iter()
            .find(|c| c.name == chain)
            .map(|c| c.anchors.contains(symbol))
            .unwrap_or(false)
    }

    /// Every priceable symbol, in no particular order
    pub fn list_tokens(&self) -> Vec<String> {
        self.routes.keys().cloned().collect()
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn chain(&self, route: Route) -> &Chain {
        &self.chains[route.chain]
    }

    pub fn swap(&self, route: Route) -> &Swap {
        &self.chains[route.chain].swaps[route.swap]
    }

    pub fn pair(&self, route: Route) -> &Pair {
        &self.swap(route).pairs[route.pair]
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PairConfig, SwapConfig};

    fn pair(target: &str, target_addr: u8, price: &str, price_addr: u8) -> PairConfig {
        PairConfig {
            target_token_name: target.to_string(),
            target_token_addr: format!("{:?}", Address::repeat_byte(target_addr)),
            price_token_name: price.to_string(),
            price_token_addr: format!("{:?}", Address::repeat_byte(price_addr)),
        }
    }

    fn chain(name: &str, stable: &[&str], swaps: Vec<SwapConfig>) -> ChainConfig {
        ChainConfig {
            name: name.to_string(),
            nodes: vec!["http://localhost:8545".to_string()],
            stable_coins: stable.iter().map(|s| s.to_string()).collect(),
            swaps,
        }
    }

    fn swap(name: &str, pairs: Vec<PairConfig>) -> SwapConfig {
        SwapConfig {
            name: name.to_string(),
            factory: format!("{:?}", Address::repeat_byte(0xfa)),
            pairs,
        }
    }

    #[test]
    fn test_build_and_lookup() {
        let table = RouteTable::build(&[chain(
            "eth",
            &["USDT"],
            vec![swap("uniswap", vec![pair("WETH", 1, "USDT", 2), pair("UNI", 3, "WETH", 1)])],
        )])
        .unwrap();

        assert_eq!(table.len(), 2);
        let route = table.lookup("UNI").unwrap();
        assert_eq!(route, Route { chain: 0, swap: 0, pair: 1 });
        assert_eq!(table.pair(route).price_symbol, "WETH");
        assert_eq!(table.swap(route).factory, Address::repeat_byte(0xfa));
        assert_eq!(table.chain(route).name, "eth");
        assert!(table.lookup("DOGE").is_none());

        let mut tokens = table.list_tokens();
        tokens.sort();
        assert_eq!(tokens, vec!["UNI".to_string(), "WETH".to_string()]);
    }

    #[test]
    fn test_anchor_membership() {
        let table = RouteTable::build(&[chain(
            "eth",
            &["USDT", "USDC"],
            vec![swap("uniswap", vec![pair("WETH", 1, "USDT", 2)])],
        )])
        .unwrap();

        assert!(table.is_anchor("eth", "USDT"));
        assert!(table.is_anchor("eth", "USDC"));
        assert!(!table.is_anchor("eth", "WETH"));
        assert!(!table.is_anchor("bsc", "USDT"));
    }

    #[test]
    fn test_duplicate_target_across_swaps() {
        let err = RouteTable::build(&[chain(
            "eth",
            &[],
            vec![
                swap("uniswap", vec![pair("X", 1, "USDT", 2)]),
                swap("sushiswap", vec![pair("X", 1, "USDC", 3)]),
            ],
        )])
        .unwrap_err();

        assert_eq!(err, PriceError::DuplicateToken("X".to_string()));
    }

    #[test]
    fn test_duplicate_target_within_swap() {
        let err = RouteTable::build(&[chain(
            "eth",
            &[],
            vec![swap("uniswap", vec![pair("X", 1, "USDT", 2), pair("X", 4, "USDC", 3)])],
        )])
        .unwrap_err();

        assert_eq!(err, PriceError::DuplicateToken("X".to_string()));
    }

    #[test]
    fn test_duplicate_stable_coin() {
        let err = RouteTable::build(&[chain("eth", &["USDT", "USDT"], vec![])]).unwrap_err();
        assert_eq!(err, PriceError::DuplicateStableCoin("USDT".to_string()));
    }

    #[test]
    fn test_unsupported_chain() {
        let err = RouteTable::build(&[chain("bsc", &[], vec![])]).unwrap_err();
        assert_eq!(err, PriceError::UnsupportedChain("bsc".to_string()));
    }

    #[test]
    fn test_bad_address_is_config_error() {
        let mut bad = pair("WETH", 1, "USDT", 2);
        bad.target_token_addr = "not-an-address".to_string();
        let err = RouteTable::build(&[chain("eth", &[], vec![swap("uniswap", vec![bad])])])
            .unwrap_err();
        assert!(matches!(err, PriceError::InvalidConfig(_)));
    }
}
