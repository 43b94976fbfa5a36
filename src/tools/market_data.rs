//! Market data adapters
//!
//! One adapter per asset class. Each fetch is bounded and never fails:
//! provider errors, timeouts and empty result sets all come back as a
//! non-`Found` [`Lookup`].

use super::{bounded, CryptoProvider, EquityProvider, Lookup};
use crate::models::MarketData;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct CryptoMarketAdapter {
    provider: Arc<dyn CryptoProvider>,
    timeout: Duration,
}

impl CryptoMarketAdapter {
    pub fn new(provider: Arc<dyn CryptoProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// First market record for a provider id
    pub async fn fetch(&self, id: &str) -> Lookup<MarketData> {
        debug!(id = %id, "Fetching crypto market data");
        bounded("crypto market data", self.timeout, self.provider.markets(id))
            .await
            .map(MarketData::Crypto)
    }

    /// Resolve a ticker symbol to its top-ranked id, then fetch by id
    pub async fn fetch_by_symbol(&self, symbol: &str) -> Lookup<MarketData> {
        let candidate = bounded("crypto symbol search", self.timeout, self.provider.search(symbol)).await;

        match candidate {
            Lookup::Found(coin) => self.fetch(&coin.id).await,
            Lookup::Empty => Lookup::Empty,
            Lookup::Failed(error) => Lookup::Failed(error),
        }
    }
}

pub struct EquityMarketAdapter {
    provider: Arc<dyn EquityProvider>,
    timeout: Duration,
}

impl EquityMarketAdapter {
    pub fn new(provider: Arc<dyn EquityProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// First quote record for a ticker symbol
    pub async fn fetch(&self, symbol: &str) -> Lookup<MarketData> {
        debug!(symbol = %symbol, "Fetching equity quote");
        bounded("equity quote", self.timeout, self.provider.quote(symbol))
            .await
            .map(MarketData::Stock)
    }
}
