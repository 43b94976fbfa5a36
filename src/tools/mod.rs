//! Market data provider layer
//!
//! Providers are plain async lookups against third-party HTTP APIs.
//! Failures never cross this layer: resolver strategies and adapters
//! return a [`Lookup`] that callers collapse into an `Option`.

use crate::error::AgentError;
use crate::models::{CryptoSnapshot, EquitySnapshot};
use crate::Result;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

pub mod coingecko;
pub mod market_data;
pub mod resolver;
pub mod yahoo;

pub use coingecko::CoinGeckoClient;
pub use market_data::{CryptoMarketAdapter, EquityMarketAdapter};
pub use resolver::{AssetResolver, CryptoSearch, EquitySearch, ResolverStrategy};
pub use yahoo::YahooFinanceClient;

const CLIENT_USER_AGENT: &str = "Mozilla/5.0 (compatible; investment-agent/0.1)";

//
// ================= Provider Traits =================
//

/// Crypto search candidate, in provider rank order
#[derive(Debug, Clone, PartialEq)]
pub struct CoinCandidate {
    pub id: String,
    pub symbol: String,
    pub name: String,
}

/// Equity/ETF search candidate, in provider rank order
#[derive(Debug, Clone, PartialEq)]
pub struct EquityCandidate {
    pub symbol: String,
    pub name: Option<String>,
}

#[async_trait::async_trait]
pub trait CryptoProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<CoinCandidate>>;
    /// Market records for a single provider id
    async fn markets(&self, id: &str) -> Result<Vec<CryptoSnapshot>>;
}

#[async_trait::async_trait]
pub trait EquityProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<EquityCandidate>>;
    /// Quote records for a single ticker symbol
    async fn quote(&self, symbol: &str) -> Result<Vec<EquitySnapshot>>;
}

//
// ================= Fail-soft Lookup =================
//

/// Outcome of a provider-backed lookup.
///
/// `Empty` and `Failed` both mean "no data" to the pipeline; they stay
/// distinct so the failure path can be observed.
#[derive(Debug)]
pub enum Lookup<T> {
    Found(T),
    Empty,
    Failed(AgentError),
}

impl<T> Lookup<T> {
    pub fn from_first(items: Vec<T>) -> Self {
        match items.into_iter().next() {
            Some(item) => Lookup::Found(item),
            None => Lookup::Empty,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(value) => Lookup::Found(f(value)),
            Lookup::Empty => Lookup::Empty,
            Lookup::Failed(error) => Lookup::Failed(error),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Lookup::Failed(_))
    }

    /// Collapse into an `Option`, logging the failure case
    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::Empty => None,
            Lookup::Failed(error) => {
                warn!(error = %error, "Provider lookup failed, treating as no data");
                None
            }
        }
    }
}

/// Run a provider call under a deadline and fold it into a [`Lookup`]
pub async fn bounded<T, F>(label: &str, limit: Duration, call: F) -> Lookup<T>
where
    F: Future<Output = Result<Vec<T>>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(items)) => Lookup::from_first(items),
        Ok(Err(error)) => Lookup::Failed(error),
        Err(_) => Lookup::Failed(AgentError::Timeout(format!(
            "{} exceeded {}ms",
            label,
            limit.as_millis()
        ))),
    }
}

//
// ================= HTTP Client =================
//

/// Pooled JSON-over-HTTP client shared by the provider implementations
#[derive(Clone)]
pub struct ProviderClient {
    client: Client,
    base_url: String,
}

impl ProviderClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        extra_headers: &[(&'static str, String)],
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        for (name, value) in extra_headers {
            let value = HeaderValue::from_str(value).map_err(|e| {
                AgentError::Config(format!("Invalid value for header {}: {}", name, e))
            })?;
            headers.insert(HeaderName::from_static(name), value);
        }

        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, ?query, "Provider request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| AgentError::Provider(format!("Request to {} failed: {}", path, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Provider(format!(
                "Provider returned {} for {}: {}",
                status, path, body
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AgentError::Provider(format!("Invalid JSON from {}: {}", path, e)))
    }
}
