//! Yahoo Finance equity/ETF provider

use super::{EquityCandidate, EquityProvider, ProviderClient};
use crate::config::ProviderConfig;
use crate::error::AgentError;
use crate::models::EquitySnapshot;
use crate::Result;
use serde::Deserialize;

pub struct YahooFinanceClient {
    http: ProviderClient,
}

impl YahooFinanceClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            http: ProviderClient::new(&config.yahoo_base_url, config.timeout, &[])?,
        })
    }
}

#[async_trait::async_trait]
impl EquityProvider for YahooFinanceClient {
    async fn search(&self, query: &str) -> Result<Vec<EquityCandidate>> {
        let response: YahooSearchResponse = self
            .http
            .get_json("/v1/finance/search", &[("q", query)])
            .await?;
        Ok(response.into_candidates())
    }

    async fn quote(&self, symbol: &str) -> Result<Vec<EquitySnapshot>> {
        let response: YahooQuoteResponse = self
            .http
            .get_json("/v7/finance/quote", &[("symbols", symbol)])
            .await?;
        response.into_snapshots()
    }
}

//
// ================= Wire Types =================
//

#[derive(Debug, Deserialize)]
struct YahooSearchResponse {
    #[serde(default)]
    quotes: Vec<YahooSearchQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooSearchQuote {
    symbol: Option<String>,
    shortname: Option<String>,
    longname: Option<String>,
}

impl YahooSearchResponse {
    fn into_candidates(self) -> Vec<EquityCandidate> {
        self.quotes
            .into_iter()
            .filter_map(|quote| {
                let symbol = quote.symbol?;
                Some(EquityCandidate {
                    symbol,
                    name: quote.shortname.or(quote.longname),
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct YahooQuoteResponse {
    #[serde(rename = "quoteResponse")]
    quote_response: YahooQuoteResponseData,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteResponseData {
    #[serde(default)]
    result: Vec<YahooQuoteData>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooQuoteData {
    symbol: String,
    short_name: Option<String>,
    long_name: Option<String>,
    currency: Option<String>,
    full_exchange_name: Option<String>,
    regular_market_price: Option<f64>,
    regular_market_change: Option<f64>,
    regular_market_change_percent: Option<f64>,
    regular_market_open: Option<f64>,
    regular_market_previous_close: Option<f64>,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    regular_market_volume: Option<f64>,
    average_daily_volume3_month: Option<f64>,
    market_cap: Option<f64>,
    fifty_two_week_high: Option<f64>,
    fifty_two_week_low: Option<f64>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<f64>,
    regular_market_time: Option<i64>,
}

impl YahooQuoteResponse {
    fn into_snapshots(self) -> Result<Vec<EquitySnapshot>> {
        if let Some(error) = self.quote_response.error.filter(|e| !e.is_null()) {
            return Err(AgentError::Provider(format!("Yahoo quote error: {}", error)));
        }

        Ok(self
            .quote_response
            .result
            .into_iter()
            .map(YahooQuoteData::into_snapshot)
            .collect())
    }
}

impl YahooQuoteData {
    fn into_snapshot(self) -> EquitySnapshot {
        let name = self
            .short_name
            .or(self.long_name)
            .unwrap_or_else(|| self.symbol.clone());

        EquitySnapshot {
            symbol: self.symbol,
            name,
            currency: self.currency,
            exchange: self.full_exchange_name,
            price: self.regular_market_price,
            change: self.regular_market_change,
            change_percent: self.regular_market_change_percent,
            open: self.regular_market_open,
            previous_close: self.regular_market_previous_close,
            day_high: self.regular_market_day_high,
            day_low: self.regular_market_day_low,
            volume: self.regular_market_volume,
            average_volume: self.average_daily_volume3_month,
            market_cap: self.market_cap,
            fifty_two_week_high: self.fifty_two_week_high,
            fifty_two_week_low: self.fifty_two_week_low,
            trailing_pe: self.trailing_pe,
            market_time: self.regular_market_time,
        }
    }
}
