//! HTTP surface
//!
//! - `GET /price/{tokens}`: comma separated symbols, prices in request order
//! - `GET /tokens`: every priceable symbol
//! - `GET /health`

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use eyre::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::chain::ChainClient;
use crate::resolver::PriceResolver;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResp {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PriceResp {
    pub code: u16,
    pub msg: String,
    pub prices: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokensResp {
    pub tokens: Vec<String>,
}

pub fn router<C>(resolver: Arc<PriceResolver<C>>) -> Router
where
    C: ChainClient + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/tokens", get(list_tokens::<C>))
        .route("/price/:tokens", get(query_prices::<C>))
        .with_state(resolver)
}

/// Serve until Ctrl+C
pub async fn serve<C>(resolver: Arc<PriceResolver<C>>, port: u16) -> Result<()>
where
    C: ChainClient + 'static,
{
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, router(resolver))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down");
        })
        .await?;

    Ok(())
}

async fn health() -> Json<HealthResp> {
    Json(HealthResp {
        status: "ok".to_string(),
    })
}

async fn list_tokens<C>(State(resolver): State<Arc<PriceResolver<C>>>) -> Json<TokensResp>
where
    C: ChainClient + 'static,
{
    let mut tokens = resolver.list_tokens();
    tokens.sort();
    Json(TokensResp { tokens })
}

async fn query_prices<C>(
    State(resolver): State<Arc<PriceResolver<C>>>,
    Path(tokens): Path<String>,
) -> (StatusCode, Json<PriceResp>)
where
    C: ChainClient + 'static,
{
    let symbols: Vec<String> = tokens
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    if symbols.is_empty() {
        return not_found("no tokens requested".to_string());
    }

    match resolver.get_prices(&symbols).await {
        Ok(prices) => (
            StatusCode::OK,
            Json(PriceResp {
                code: StatusCode::OK.as_u16(),
                msg: String::new(),
                prices: prices.into_iter().map(|(_, price)| price).collect(),
            }),
        ),
        Err(e) => {
            warn!("GET /price/{} failed: {}", tokens, e);
            not_found(e.to_string())
        }
    }
}

fn not_found(msg: String) -> (StatusCode, Json<PriceResp>) {
    (
        StatusCode::NOT_FOUND,
        Json(PriceResp {
            code: StatusCode::NOT_FOUND.as_u16(),
            msg,
            prices: vec![],
        }),
    )
}
