//! Core data models for the investment agent
//!
//! Nothing here outlives a single request.

use serde::{Deserialize, Serialize};
use std::fmt;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Crypto,
    Stock,
}

/// Final routing label of a request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    Greeting,
    Knowledge,
    AssetAnalysis,
}

//
// ================= Resolution =================
//

/// Asset identified from free text by the resolver.
///
/// Crypto assets need `id` for a market-data fetch, stocks need `symbol`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedAsset {
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub symbol: Option<String>,
    pub id: Option<String>,
    pub name: String,
}

impl ResolvedAsset {
    pub fn crypto(id: impl Into<String>, symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: AssetKind::Crypto,
            symbol: Some(symbol.into()),
            id: Some(id.into()),
            name: name.into(),
        }
    }

    pub fn stock(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: AssetKind::Stock,
            symbol: Some(symbol.into()),
            id: None,
            name: name.into(),
        }
    }
}

//
// ================= Market Data =================
//

/// Normalized snapshot as returned by a market data adapter.
///
/// Every numeric field is copied from the provider payload untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MarketData {
    Crypto(CryptoSnapshot),
    Stock(EquitySnapshot),
}

impl MarketData {
    pub fn name(&self) -> &str {
        match self {
            MarketData::Crypto(snapshot) => &snapshot.name,
            MarketData::Stock(snapshot) => &snapshot.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CryptoSnapshot {
    pub name: String,
    pub symbol: String,
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub volume_24h: Option<f64>,
    pub change_24h: Option<f64>,
    pub change_7d: Option<f64>,
    pub change_30d: Option<f64>,
    pub ath: Option<f64>,
    pub ath_change_percentage: Option<f64>,
    pub circulating_supply: Option<f64>,
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EquitySnapshot {
    pub symbol: String,
    pub name: String,
    pub currency: Option<String>,
    pub exchange: Option<String>,
    pub price: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub open: Option<f64>,
    pub previous_close: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub volume: Option<f64>,
    pub average_volume: Option<f64>,
    pub market_cap: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub trailing_pe: Option<f64>,
    /// Unix seconds of the last trade
    pub market_time: Option<i64>,
}

//
// ================= Streaming =================
//

/// One unit of client-facing output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Content(String),
    Done,
}

pub const DONE_SENTINEL: &str = "[DONE]";

impl StreamEvent {
    /// Payload carried on the `data:` line of the frame
    pub fn data(&self) -> String {
        match self {
            StreamEvent::Content(text) => serde_json::json!({ "content": text }).to_string(),
            StreamEvent::Done => DONE_SENTINEL.to_string(),
        }
    }

    /// Full wire frame, `data: <payload>\n\n`
    pub fn frame(&self) -> String {
        format!("data: {}\n\n", self.data())
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done)
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetKind::Crypto => "crypto",
            AssetKind::Stock => "stock",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Classification::Greeting => "greeting",
            Classification::Knowledge => "knowledge",
            Classification::AssetAnalysis => "asset-analysis",
        };
        write!(f, "{}", s)
    }
}
