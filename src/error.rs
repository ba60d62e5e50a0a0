//! Error taxonomy for price resolution
//!
//! Startup errors (duplicates, unsupported chains, bad config) abort the
//! process. Everything else is returned to the caller of a single batch and
//! never touches the price cache.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("token not found: {0}")]
    TokenNotFound(String),

    #[error("duplicate token: {0}")]
    DuplicateToken(String),

    #[error("duplicate stable coin: {0}")]
    DuplicateStableCoin(String),

    #[error("pair discovery failed for {symbol}: {reason}")]
    PairDiscoveryFailed { symbol: String, reason: String },

    #[error("invalid pair for {0}")]
    InvalidPairOrdering(String),

    #[error("empty pool for {0}")]
    EmptyPool(String),

    /// `symbol` is filled in once the failure reaches code that knows which
    /// token was being priced.
    #[error("rpc call {call} failed for {}: {reason}", .symbol.as_deref().unwrap_or("unknown token"))]
    RpcFailure {
        symbol: Option<String>,
        call: &'static str,
        reason: String,
    },

    #[error("chain {0} not supported yet")]
    UnsupportedChain(String),

    /// Quote chain still ends on a non-anchor token after `max_hops` extra hops.
    #[error("no anchor reachable for {0} within hop limit")]
    UnsupportedRoute(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl PriceError {
    pub fn rpc(call: &'static str, reason: impl std::fmt::Display) -> Self {
        PriceError::RpcFailure {
            symbol: None,
            call,
            reason: reason.to_string(),
        }
    }

    /// Attach the symbol being priced to an rpc failure that has none yet.
    /// The innermost symbol wins, so a failed hop names the hop's token.
    pub fn for_symbol(self, symbol: &str) -> Self {
        match self {
            PriceError::RpcFailure {
                symbol: None,
                call,
                reason,
            } => PriceError::RpcFailure {
                symbol: Some(symbol.to_string()),
                call,
                reason,
            },
            other => other,
        }
    }
}

pub type PriceResult<T> = std::result::Result<T, PriceError>;
