//! Diagnostic tool - check a config end to end
//!
//! Run with: cargo run --bin diagnose -- --conf ./config.toml
//!
//! Loads the config, builds the route table, dials every node and prices
//! every token once, per node.

use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use std::env;
use std::sync::Arc;

use dex_price::cache::{ConstantCache, PriceCache};
use dex_price::chain::{ChainClientPool, RpcChainClient};
use dex_price::config::Config;
use dex_price::resolver::PriceResolver;
use dex_price::routes::RouteTable;

#[derive(Debug, Parser)]
struct Args {
    #[arg(long, default_value = "./config.toml")]
    conf: String,
}

fn section(title: &str) {
    println!("\n═══════════════════════════════════════════════════");
    println!("  {}", title);
    println!("═══════════════════════════════════════════════════\n");
}

/// Keep the first 30 and last 15 characters of a long url
fn shorten(url: &str) -> String {
    let len = url.chars().count();
    if len <= 50 {
        return url.to_string();
    }

    let head_end = url.char_indices().nth(30).map_or(url.len(), |(i, _)| i);
    let tail_start = url.char_indices().nth(len - 15).map_or(url.len(), |(i, _)| i);
    format!("{}...{}", &url[..head_end], &url[tail_start..])
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    println!("🔍 DEX PRICE DIAGNOSTIC CHECK");

    section("CONFIGURATION");
    let config = Config::load(&args.conf)?;
    for key in ["DEX_PRICE_LISTEN", "DEX_PRICE_MAX_HOPS", "DEX_PRICE_RPC_TIMEOUT_MS"] {
        match env::var(key) {
            Ok(v) => println!("  {}: {} (from env)", key, v),
            Err(_) => println!("  {}: (not set)", key),
        }
    }
    match config.validate() {
        Ok(()) => println!("\n  ✅ {} valid", args.conf),
        Err(e) => {
            println!("\n  ❌ {}", e);
            return Err(e);
        }
    }
    config.print_summary();

    section("ROUTES");
    let routes = Arc::new(RouteTable::build(&config.chains).map_err(|e| eyre!(e))?);
    let mut tokens = routes.list_tokens();
    tokens.sort();
    for symbol in &tokens {
        if let Some(route) = routes.lookup(symbol) {
            let pair = routes.pair(route);
            let anchor = routes.is_anchor(&routes.chain(route).name, &pair.price_symbol);
            println!(
                "  {:<10} → {:<10} via {} {}",
                symbol,
                pair.price_symbol,
                routes.swap(route).name,
                if anchor { "" } else { "(hop)" }
            );
        }
    }

    section("NODES");
    let mut healthy = 0;
    for chain in routes.chains() {
        for node in &chain.nodes {
            let client = match RpcChainClient::dial(node, config.rpc_timeout()).await {
                Ok(c) => c,
                Err(e) => {
                    println!("  ❌ {}: {}", shorten(node), e);
                    continue;
                }
            };

            // Fresh caches per node so every node serves its own reads
            let resolver = PriceResolver::new(
                routes.clone(),
                ChainClientPool::new(vec![client])?,
                Arc::new(ConstantCache::new()),
                Arc::new(PriceCache::new()),
                config.max_hops,
            );

            println!("  {}", shorten(node));
            let mut ok = true;
            for symbol in &tokens {
                match resolver.resolve(symbol).await {
                    Ok(price) => println!("    {:<10} {:>24.8}", symbol, price),
                    Err(e) => {
                        ok = false;
                        println!("    {:<10} ❌ {}", symbol, e);
                    }
                }
            }
            if ok {
                healthy += 1;
            }
        }
    }

    section("STATUS");
    let total: usize = routes.chains().iter().map(|c| c.nodes.len()).sum();
    println!("  Nodes pricing every token: {}/{}", healthy, total);

    if healthy == total {
        println!("\n✅ Diagnostic complete!\n");
    } else {
        println!("\n⚠️  Some nodes or pairs need attention\n");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten_keeps_short_urls() {
        assert_eq!(shorten("http://localhost:8545"), "http://localhost:8545");
    }

    #[test]
    fn test_shorten_long_url() {
        let url = format!("https://mainnet.example.io/v3/{}", "a".repeat(40));
        let short = shorten(&url);
        assert_eq!(short, format!("https://mainnet.example.io/v3/...{}", "a".repeat(15)));
    }

    #[test]
    fn test_shorten_multibyte_at_cut_points() {
        // Byte offsets 30 and len-15 both fall inside multi-byte characters
        let url = format!("https://node.example/{}", "é".repeat(40));
        let short = shorten(&url);
        assert!(short.starts_with("https://node.example/ééééééééé..."));
        assert!(short.ends_with(&"é".repeat(15)));
    }
}
