//! CoinGecko crypto provider
//!
//! `/search` resolves free text to coin ids, `/coins/markets` returns the
//! live market record for one id.

use super::{CoinCandidate, CryptoProvider, ProviderClient};
use crate::config::ProviderConfig;
use crate::models::CryptoSnapshot;
use crate::Result;
use serde::Deserialize;

pub struct CoinGeckoClient {
    http: ProviderClient,
}

impl CoinGeckoClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let headers = match &config.coingecko_api_key {
            Some(key) => vec![("x-cg-demo-api-key", key.clone())],
            None => vec![],
        };

        Ok(Self {
            http: ProviderClient::new(&config.coingecko_base_url, config.timeout, &headers)?,
        })
    }
}

#[async_trait::async_trait]
impl CryptoProvider for CoinGeckoClient {
    async fn search(&self, query: &str) -> Result<Vec<CoinCandidate>> {
        let response: SearchResponse = self.http.get_json("/search", &[("query", query)]).await?;
        Ok(response.into_candidates())
    }

    async fn markets(&self, id: &str) -> Result<Vec<CryptoSnapshot>> {
        let records: Vec<MarketRecord> = self
            .http
            .get_json(
                "/coins/markets",
                &[
                    ("vs_currency", "usd"),
                    ("ids", id),
                    ("price_change_percentage", "24h,7d,30d"),
                ],
            )
            .await?;

        Ok(records.into_iter().map(MarketRecord::into_snapshot).collect())
    }
}

//
// ================= Wire Types =================
//

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    coins: Vec<SearchCoin>,
}

#[derive(Debug, Deserialize)]
struct SearchCoin {
    id: String,
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    name: String,
}

impl SearchResponse {
    fn into_candidates(self) -> Vec<CoinCandidate> {
        self.coins
            .into_iter()
            .map(|coin| CoinCandidate {
                id: coin.id,
                symbol: coin.symbol.to_uppercase(),
                name: coin.name,
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct MarketRecord {
    name: String,
    #[serde(default)]
    symbol: String,
    current_price: Option<f64>,
    market_cap: Option<f64>,
    total_volume: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    price_change_percentage_7d_in_currency: Option<f64>,
    price_change_percentage_30d_in_currency: Option<f64>,
    ath: Option<f64>,
    ath_change_percentage: Option<f64>,
    circulating_supply: Option<f64>,
    last_updated: Option<String>,
}

impl MarketRecord {
    fn into_snapshot(self) -> CryptoSnapshot {
        CryptoSnapshot {
            name: self.name,
            symbol: self.symbol.to_uppercase(),
            price: self.current_price,
            market_cap: self.market_cap,
            volume_24h: self.total_volume,
            change_24h: self.price_change_percentage_24h,
            change_7d: self.price_change_percentage_7d_in_currency,
            change_30d: self.price_change_percentage_30d_in_currency,
            ath: self.ath,
            ath_change_percentage: self.ath_change_percentage,
            circulating_supply: self.circulating_supply,
            last_updated: self.last_updated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_keeps_provider_rank() {
        let body = r#"{
            "coins": [
                {"id": "solana", "name": "Solana", "symbol": "sol", "market_cap_rank": 6},
                {"id": "solana-name-service", "name": "Solana Name Service", "symbol": "sns"}
            ],
            "exchanges": [],
            "categories": []
        }"#;

        let response: SearchResponse = serde_json::from_str(body).unwrap();
        let candidates = response.into_candidates();

        assert_eq!(candidates.len(), 2);
        assert_eq!(
            candidates[0],
            CoinCandidate {
                id: "solana".to_string(),
                symbol: "SOL".to_string(),
                name: "Solana".to_string(),
            }
        );
    }

    #[test]
    fn test_search_without_coins_is_empty() {
        let response: SearchResponse = serde_json::from_str(r#"{"exchanges": []}"#).unwrap();
        assert!(response.into_candidates().is_empty());
    }

    #[test]
    fn test_market_record_normalization() {
        let body = r#"[{
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "current_price": 67012.5,
            "market_cap": 1320000000000,
            "total_volume": 28500000000,
            "price_change_percentage_24h": -1.25,
            "price_change_percentage_7d_in_currency": 4.1,
            "price_change_percentage_30d_in_currency": 12.9,
            "ath": 73738,
            "ath_change_percentage": -9.12,
            "circulating_supply": 19700000,
            "last_updated": "2024-05-01T12:00:00.000Z"
        }]"#;

        let records: Vec<MarketRecord> = serde_json::from_str(body).unwrap();
        let snapshot = records.into_iter().next().unwrap().into_snapshot();

        assert_eq!(snapshot.symbol, "BTC");
        assert_eq!(snapshot.price, Some(67012.5));
        assert_eq!(snapshot.volume_24h, Some(28500000000.0));
        assert_eq!(snapshot.change_7d, Some(4.1));
        assert_eq!(snapshot.ath_change_percentage, Some(-9.12));
        assert_eq!(
            snapshot.last_updated.as_deref(),
            Some("2024-05-01T12:00:00.000Z")
        );
    }

    #[test]
    fn test_market_record_tolerates_nulls() {
        let body = r#"[{"name": "Tiny", "symbol": "tny", "current_price": null, "ath": null}]"#;
        let records: Vec<MarketRecord> = serde_json::from_str(body).unwrap();
        let snapshot = records.into_iter().next().unwrap().into_snapshot();

        assert_eq!(snapshot.price, None);
        assert_eq!(snapshot.market_cap, None);
    }
}
