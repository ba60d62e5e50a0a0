//! dex-price - spot price service for Uniswap V2 style pools
//!
//! Run with: cargo run -- --conf ./config.toml

use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dex_price::cache::{ConstantCache, PriceCache};
use dex_price::chain::{ChainClientPool, RpcChainClient};
use dex_price::config::Config;
use dex_price::resolver::PriceResolver;
use dex_price::routes::{RouteTable, SUPPORTED_CHAIN};
use dex_price::server;

#[derive(Debug, Parser)]
#[command(name = "dex-price", about = "Serve token prices read from DEX pair reserves")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "./config.toml")]
    conf: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dex_price=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let config = Config::load(&args.conf)?;
    config.validate()?;
    config.print_summary();

    let routes = RouteTable::build(&config.chains).map_err(|e| {
        error!("Route table rejected: {}", e);
        eyre!(e)
    })?;
    info!("Routing {} tokens", routes.len());

    let chain = routes
        .chains()
        .iter()
        .find(|c| c.name == SUPPORTED_CHAIN)
        .ok_or_else(|| eyre!("No {} chain configured", SUPPORTED_CHAIN))?;

    let mut clients = Vec::with_capacity(chain.nodes.len());
    for node in &chain.nodes {
        let client = RpcChainClient::dial(node, config.rpc_timeout())
            .await
            .map_err(|e| eyre!("Dial {}: {}", node, e))?;
        info!("Connected to {}", client.endpoint());
        clients.push(client);
    }
    let pool = ChainClientPool::new(clients)?;

    let resolver = Arc::new(PriceResolver::new(
        Arc::new(routes),
        pool,
        Arc::new(ConstantCache::new()),
        Arc::new(PriceCache::new()),
        config.max_hops,
    ));

    server::serve(resolver, config.listen).await
}
