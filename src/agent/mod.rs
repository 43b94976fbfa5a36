//! Main orchestrator - one terminal branch per request
//!
//! INPUT → CLASSIFY → RESOLVE? → FETCH? → PROMPT → GENERATE
//!
//! Every non-blank request ends in exactly one generation call or exactly
//! one static notice, never both and never neither.

use crate::classifier::{Intent, QueryClassifier};
use crate::config::{AgentConfig, DEFAULT_GENERATION_TIMEOUT_MS};
use crate::generation::{
    empty_stream, single_fragment, start_bounded, GenerationBackend, GroqClient, TokenStream,
};
use crate::models::{AssetKind, Classification, MarketData, ResolvedAsset};
use crate::prompt::{self, SYSTEM_PROMPT};
use crate::tools::{
    AssetResolver, CoinGeckoClient, CryptoMarketAdapter, CryptoProvider, EquityMarketAdapter,
    EquityProvider, Lookup, YahooFinanceClient,
};
use crate::Result;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Terminal branch taken for a request
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing to answer
    Blank,
    Greeting,
    /// No asset resolved
    Knowledge,
    AssetAnalysis(ResolvedAsset),
    /// Asset resolved, market data missing
    DataUnavailable(ResolvedAsset),
}

impl Outcome {
    pub fn classification(&self) -> Option<Classification> {
        match self {
            Outcome::Blank => None,
            Outcome::Greeting => Some(Classification::Greeting),
            Outcome::Knowledge => Some(Classification::Knowledge),
            Outcome::AssetAnalysis(_) | Outcome::DataUnavailable(_) => {
                Some(Classification::AssetAnalysis)
            }
        }
    }

    pub fn asset(&self) -> Option<&ResolvedAsset> {
        match self {
            Outcome::AssetAnalysis(asset) | Outcome::DataUnavailable(asset) => Some(asset),
            _ => None,
        }
    }
}

/// What the orchestrator hands to the relay
pub struct AgentResponse {
    pub outcome: Outcome,
    /// User-role prompt, set only when generation was invoked
    pub prompt: Option<String>,
    pub tokens: TokenStream,
}

impl std::fmt::Debug for AgentResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentResponse")
            .field("outcome", &self.outcome)
            .field("prompt", &self.prompt)
            .finish_non_exhaustive()
    }
}

/// Stateless across requests; safe to share behind an `Arc`
pub struct InvestmentAgent {
    resolver: AssetResolver,
    crypto_adapter: CryptoMarketAdapter,
    equity_adapter: EquityMarketAdapter,
    backend: Arc<dyn GenerationBackend>,
    generation_timeout: Duration,
}

impl InvestmentAgent {
    pub fn new(
        resolver: AssetResolver,
        crypto_adapter: CryptoMarketAdapter,
        equity_adapter: EquityMarketAdapter,
        backend: Arc<dyn GenerationBackend>,
    ) -> Self {
        Self {
            resolver,
            crypto_adapter,
            equity_adapter,
            backend,
            generation_timeout: Duration::from_millis(DEFAULT_GENERATION_TIMEOUT_MS),
        }
    }

    /// Bound on starting generation and on the gap between fragments
    pub fn with_generation_timeout(mut self, limit: Duration) -> Self {
        self.generation_timeout = limit;
        self
    }

    /// Wire the crypto-first resolver and both adapters to one pair of providers
    pub fn with_providers(
        crypto: Arc<dyn CryptoProvider>,
        equity: Arc<dyn EquityProvider>,
        backend: Arc<dyn GenerationBackend>,
        timeout: Duration,
    ) -> Self {
        Self::new(
            AssetResolver::crypto_first(crypto.clone(), equity.clone(), timeout),
            CryptoMarketAdapter::new(crypto, timeout),
            EquityMarketAdapter::new(equity, timeout),
            backend,
        )
    }

    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let crypto: Arc<dyn CryptoProvider> = Arc::new(CoinGeckoClient::new(&config.providers)?);
        let equity: Arc<dyn EquityProvider> =
            Arc::new(YahooFinanceClient::new(&config.providers)?);
        let backend: Arc<dyn GenerationBackend> = Arc::new(GroqClient::new(config.llm.clone())?);

        info!(
            model = %config.llm.model,
            timeout_ms = config.providers.timeout.as_millis() as u64,
            "Investment agent initialized"
        );

        Ok(
            Self::with_providers(crypto, equity, backend, config.providers.timeout)
                .with_generation_timeout(config.llm.timeout),
        )
    }

    /// Run the decision procedure for one message
    pub async fn execute(&self, message: &str) -> AgentResponse {
        let start_time = Instant::now();
        let message = message.trim();

        if message.is_empty() {
            debug!("Blank message, nothing to generate");
            return AgentResponse {
                outcome: Outcome::Blank,
                prompt: None,
                tokens: empty_stream(),
            };
        }

        let response = match QueryClassifier::classify(message) {
            Intent::Greeting => {
                self.generate(Outcome::Greeting, prompt::greeting_prompt())
                    .await
            }
            Intent::Inquiry { query } => self.answer_inquiry(message, &query).await,
        };

        info!(
            classification = ?response.outcome.classification(),
            asset = response.outcome.asset().map(|a| a.name.as_str()),
            generated = response.prompt.is_some(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Request routed"
        );

        response
    }

    async fn answer_inquiry(&self, message: &str, query: &str) -> AgentResponse {
        debug!(query = %query, "Resolving residual query");

        let Some(asset) = self.resolver.resolve_asset(query).await else {
            return self
                .generate(Outcome::Knowledge, prompt::knowledge_prompt(message))
                .await;
        };

        let Some(market_data) = self.fetch_market_data(&asset).await else {
            warn!(name = %asset.name, kind = %asset.kind, "Market data unavailable");
            let notice = prompt::unavailable_notice(&asset.name);
            return AgentResponse {
                outcome: Outcome::DataUnavailable(asset),
                prompt: None,
                tokens: single_fragment(notice),
            };
        };

        match prompt::asset_prompt(message, &market_data) {
            Ok(text) => self.generate(Outcome::AssetAnalysis(asset), text).await,
            Err(e) => {
                error!(error = %e, "Failed to serialize market data");
                AgentResponse {
                    outcome: Outcome::AssetAnalysis(asset),
                    prompt: None,
                    tokens: stream::once(async move { Err(e) }).boxed(),
                }
            }
        }
    }

    async fn fetch_market_data(&self, asset: &ResolvedAsset) -> Option<MarketData> {
        let lookup = match (asset.kind, asset.id.as_deref(), asset.symbol.as_deref()) {
            (AssetKind::Crypto, Some(id), _) => self.crypto_adapter.fetch(id).await,
            (AssetKind::Crypto, None, Some(symbol)) => {
                self.crypto_adapter.fetch_by_symbol(symbol).await
            }
            (AssetKind::Stock, _, Some(symbol)) => self.equity_adapter.fetch(symbol).await,
            _ => Lookup::Empty,
        };

        lookup.into_option()
    }

    async fn generate(&self, outcome: Outcome, prompt: String) -> AgentResponse {
        let started = start_bounded(
            self.backend.as_ref(),
            SYSTEM_PROMPT,
            &prompt,
            self.generation_timeout,
        )
        .await;

        let tokens = match started {
            Ok(tokens) => tokens,
            Err(e) => {
                error!(error = %e, "Generation backend failed to start");
                stream::once(async move { Err(e) }).boxed()
            }
        };

        AgentResponse {
            outcome,
            prompt: Some(prompt),
            tokens,
        }
    }
}
