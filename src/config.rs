//! Service Configuration
//!
//! The chain/swap/pair layout comes from a TOML file. A handful of scalar
//! settings can be overridden from the environment (or a `.env` file).

use alloy_primitives::Address;
use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Default HTTP port
const DEFAULT_LISTEN: u16 = 8080;

/// Extra hops allowed when a pair is quoted in a non-anchor token
const DEFAULT_MAX_HOPS: usize = 1;

// ============================================
// CONFIG TREE
// ============================================

/// One priced pair: `target` is quoted in `price`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairConfig {
    pub target_token_name: String,
    pub target_token_addr: String,
    pub price_token_name: String,
    pub price_token_addr: String,
}

/// An exchange venue, identified by its factory contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapConfig {
    pub name: String,
    pub factory: String,
    #[serde(default)]
    pub pairs: Vec<PairConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub name: String,
    /// RPC endpoints, one client handle is dialed per entry
    pub nodes: Vec<String>,
    /// Symbols treated as worth exactly one unit of account
    #[serde(default)]
    pub stable_coins: Vec<String>,
    #[serde(default)]
    pub swaps: Vec<SwapConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listen port
    #[serde(default = "default_listen")]
    pub listen: u16,

    /// Maximum extra hops through non-anchor quote tokens
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,

    /// Per-call RPC timeout; unset means calls may block indefinitely
    #[serde(default)]
    pub rpc_timeout_ms: Option<u64>,

    #[serde(default)]
    pub chains: Vec<ChainConfig>,
}

fn default_listen() -> u16 {
    DEFAULT_LISTEN
}

fn default_max_hops() -> usize {
    DEFAULT_MAX_HOPS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN,
            max_hops: DEFAULT_MAX_HOPS,
            rpc_timeout_ms: None,
            chains: vec![],
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| eyre!("Failed to read {}: {}", path.display(), e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(v) = env::var("DEX_PRICE_LISTEN") {
            self.listen = v
                .parse()
                .map_err(|e| eyre!("DEX_PRICE_LISTEN={}: {}", v, e))?;
        }
        if let Ok(v) = env::var("DEX_PRICE_MAX_HOPS") {
            self.max_hops = v
                .parse()
                .map_err(|e| eyre!("DEX_PRICE_MAX_HOPS={}: {}", v, e))?;
        }
        if let Ok(v) = env::var("DEX_PRICE_RPC_TIMEOUT_MS") {
            self.rpc_timeout_ms = Some(
                v.parse()
                    .map_err(|e| eyre!("DEX_PRICE_RPC_TIMEOUT_MS={}: {}", v, e))?,
            );
        }
        Ok(())
    }

    pub fn rpc_timeout(&self) -> Option<Duration> {
        self.rpc_timeout_ms.map(Duration::from_millis)
    }

    /// Structural checks. Duplicate symbols are caught when the route table is built.
    pub fn validate(&self) -> Result<()> {
        if self.chains.is_empty() {
            return Err(eyre!("No chains configured"));
        }
        if self.max_hops == 0 {
            return Err(eyre!("max_hops must be at least 1"));
        }

        for chain in &self.chains {
            if chain.nodes.is_empty() {
                return Err(eyre!("Chain {} has no RPC nodes", chain.name));
            }
            for swap in &chain.swaps {
                parse_address(&swap.factory)
                    .map_err(|e| eyre!("Swap {} factory: {}", swap.name, e))?;
                for pair in &swap.pairs {
                    parse_address(&pair.target_token_addr)
                        .map_err(|e| eyre!("{}: {}", pair.target_token_name, e))?;
                    parse_address(&pair.price_token_addr)
                        .map_err(|e| eyre!("{}: {}", pair.price_token_name, e))?;
                }
            }
        }

        Ok(())
    }

    pub fn pair_count(&self) -> usize {
        self.chains
            .iter()
            .flat_map(|c| c.swaps.iter())
            .map(|s| s.pairs.len())
            .sum()
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        println!("╔════════════════════════════════════════════════════════════╗");
        println!("║                 DEX PRICE - CONFIGURATION                  ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ Listen Port:       {:^40} ║", self.listen);
        println!("║ Max Hops:          {:^40} ║", self.max_hops);
        println!(
            "║ RPC Timeout:       {:^40} ║",
            self.rpc_timeout_ms
                .map(|ms| format!("{} ms", ms))
                .unwrap_or_else(|| "none".to_string())
        );
        println!("║ Pairs:             {:^40} ║", self.pair_count());
        for chain in &self.chains {
            println!("╠════════════════════════════════════════════════════════════╣");
            println!("║ CHAIN {:<52} ║", chain.name);
            println!("║ • Nodes:           {:^40} ║", chain.nodes.len());
            println!("║ • Stable Coins:    {:^40} ║", chain.stable_coins.join(","));
            for swap in &chain.swaps {
                println!("║ • {:<16} {:^40} ║", swap.name, format!("{} pairs", swap.pairs.len()));
            }
        }
        println!("╚════════════════════════════════════════════════════════════╝");
    }
}

pub(crate) fn parse_address(s: &str) -> Result<Address> {
    Address::from_str(s.trim()).map_err(|e| eyre!("invalid address {:?}: {}", s, e))
}

// ============================================
// TESTS
// ============================================
