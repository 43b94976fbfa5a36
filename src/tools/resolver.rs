//! Asset Resolver
//!
//! Maps a residual query to a single asset by walking an ordered list of
//! search strategies. The first strategy with a candidate wins and its
//! top-ranked candidate is taken as-is; nothing is re-ranked.
//!
//! Precedence is a business rule: crypto is always searched before equities,
//! so a ticker present in both universes resolves to the crypto asset.

use super::{bounded, CryptoProvider, EquityProvider, Lookup};
use crate::models::ResolvedAsset;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One step of the resolution chain
#[async_trait::async_trait]
pub trait ResolverStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    async fn search(&self, query: &str) -> Lookup<ResolvedAsset>;
}

pub struct CryptoSearch {
    provider: Arc<dyn CryptoProvider>,
    timeout: Duration,
}

impl CryptoSearch {
    pub fn new(provider: Arc<dyn CryptoProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }
}

#[async_trait::async_trait]
impl ResolverStrategy for CryptoSearch {
    fn name(&self) -> &'static str {
        "crypto"
    }

    async fn search(&self, query: &str) -> Lookup<ResolvedAsset> {
        bounded("crypto search", self.timeout, self.provider.search(query))
            .await
            .map(|coin| ResolvedAsset::crypto(coin.id, coin.symbol, coin.name))
    }
}

pub struct EquitySearch {
    provider: Arc<dyn EquityProvider>,
    timeout: Duration,
}

impl EquitySearch {
    pub fn new(provider: Arc<dyn EquityProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }
}

#[async_trait::async_trait]
impl ResolverStrategy for EquitySearch {
    fn name(&self) -> &'static str {
        "equity"
    }

    async fn search(&self, query: &str) -> Lookup<ResolvedAsset> {
        bounded("equity search", self.timeout, self.provider.search(query))
            .await
            .map(|quote| {
                let name = quote.name.unwrap_or_else(|| quote.symbol.clone());
                ResolvedAsset::stock(quote.symbol, name)
            })
    }
}

/// Ordered fallback chain of strategies
pub struct AssetResolver {
    strategies: Vec<Arc<dyn ResolverStrategy>>,
}

impl AssetResolver {
    pub fn new(strategies: Vec<Arc<dyn ResolverStrategy>>) -> Self {
        Self { strategies }
    }

    /// Crypto first, then stocks/ETFs
    pub fn crypto_first(
        crypto: Arc<dyn CryptoProvider>,
        equity: Arc<dyn EquityProvider>,
        timeout: Duration,
    ) -> Self {
        Self::new(vec![
            Arc::new(CryptoSearch::new(crypto, timeout)),
            Arc::new(EquitySearch::new(equity, timeout)),
        ])
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Walk the chain. A failed strategy ends resolution.
    pub async fn resolve(&self, query: &str) -> Lookup<ResolvedAsset> {
        for strategy in &self.strategies {
            match strategy.search(query).await {
                Lookup::Found(asset) => {
                    info!(
                        strategy = strategy.name(),
                        name = %asset.name,
                        kind = %asset.kind,
                        "Asset resolved"
                    );
                    return Lookup::Found(asset);
                }
                Lookup::Empty => {
                    debug!(strategy = strategy.name(), query = %query, "No candidate");
                }
                Lookup::Failed(error) => {
                    warn!(strategy = strategy.name(), error = %error, "Asset resolver error");
                    return Lookup::Failed(error);
                }
            }
        }

        Lookup::Empty
    }

    pub async fn resolve_asset(&self, query: &str) -> Option<ResolvedAsset> {
        self.resolve(query).await.into_option()
    }
}
