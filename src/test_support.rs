//! In-process fakes for the provider and generation seams

use crate::error::AgentError;
use crate::generation::{GenerationBackend, TokenStream};
use crate::models::{CryptoSnapshot, EquitySnapshot};
use crate::tools::{CoinCandidate, CryptoProvider, EquityCandidate, EquityProvider};
use crate::Result;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum Behaviour {
    #[default]
    Normal,
    Failing,
    Stalled,
}

async fn misbehave(behaviour: Behaviour, what: &str) -> Result<()> {
    match behaviour {
        Behaviour::Normal => Ok(()),
        Behaviour::Failing => Err(AgentError::Provider(format!("{} unavailable", what))),
        Behaviour::Stalled => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        }
    }
}

//
// ================= Crypto =================
//

#[derive(Default)]
pub struct FakeCrypto {
    candidates: Vec<CoinCandidate>,
    markets: Vec<CryptoSnapshot>,
    behaviour: Behaviour,
    markets_failing: bool,
    log: CallLog,
}

impl FakeCrypto {
    pub fn with_candidates(mut self, candidates: Vec<(&str, &str, &str)>) -> Self {
        self.candidates = candidates
            .into_iter()
            .map(|(id, symbol, name)| CoinCandidate {
                id: id.to_string(),
                symbol: symbol.to_string(),
                name: name.to_string(),
            })
            .collect();
        self
    }

    pub fn with_markets(mut self, markets: Vec<CryptoSnapshot>) -> Self {
        self.markets = markets;
        self
    }

    /// Every call returns a provider error
    pub fn failing(mut self) -> Self {
        self.behaviour = Behaviour::Failing;
        self
    }

    /// Search works, market data fails
    pub fn failing_markets(mut self) -> Self {
        self.markets_failing = true;
        self
    }

    pub fn stalled(mut self) -> Self {
        self.behaviour = Behaviour::Stalled;
        self
    }

    pub fn sharing(mut self, log: &CallLog) -> Self {
        self.log = log.clone();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl CryptoProvider for FakeCrypto {
    async fn search(&self, query: &str) -> Result<Vec<CoinCandidate>> {
        self.record(format!("crypto.search:{}", query));
        misbehave(self.behaviour, "crypto search").await?;
        Ok(self.candidates.clone())
    }

    async fn markets(&self, id: &str) -> Result<Vec<CryptoSnapshot>> {
        self.record(format!("crypto.markets:{}", id));
        misbehave(self.behaviour, "crypto markets").await?;
        if self.markets_failing {
            return Err(AgentError::Provider("crypto markets unavailable".to_string()));
        }
        Ok(self.markets.clone())
    }
}

//
// ================= Equity =================
//

#[derive(Default)]
pub struct FakeEquity {
    candidates: Vec<EquityCandidate>,
    quotes: Vec<EquitySnapshot>,
    behaviour: Behaviour,
    quotes_failing: bool,
    log: CallLog,
}

impl FakeEquity {
    pub fn with_candidates(mut self, candidates: Vec<(&str, Option<&str>)>) -> Self {
        self.candidates = candidates
            .into_iter()
            .map(|(symbol, name)| EquityCandidate {
                symbol: symbol.to_string(),
                name: name.map(str::to_string),
            })
            .collect();
        self
    }

    pub fn with_quotes(mut self, quotes: Vec<EquitySnapshot>) -> Self {
        self.quotes = quotes;
        self
    }

    pub fn failing(mut self) -> Self {
        self.behaviour = Behaviour::Failing;
        self
    }

    /// Search works, quotes fail
    pub fn failing_quotes(mut self) -> Self {
        self.quotes_failing = true;
        self
    }

    pub fn stalled(mut self) -> Self {
        self.behaviour = Behaviour::Stalled;
        self
    }

    pub fn sharing(mut self, log: &CallLog) -> Self {
        self.log = log.clone();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl EquityProvider for FakeEquity {
    async fn search(&self, query: &str) -> Result<Vec<EquityCandidate>> {
        self.record(format!("equity.search:{}", query));
        misbehave(self.behaviour, "equity search").await?;
        Ok(self.candidates.clone())
    }

    async fn quote(&self, symbol: &str) -> Result<Vec<EquitySnapshot>> {
        self.record(format!("equity.quote:{}", symbol));
        misbehave(self.behaviour, "equity quote").await?;
        if self.quotes_failing {
            return Err(AgentError::Provider("equity quotes unavailable".to_string()));
        }
        Ok(self.quotes.clone())
    }
}

//
// ================= Generation =================
//

#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum Script {
    #[default]
    Complete,
    RefuseStart,
    StallStart,
    BreakAfter(usize),
    StallAfter(usize),
}

/// Backend replaying fixed fragments and recording every (system, prompt) pair
#[derive(Default)]
pub struct RecordingBackend {
    fragments: Vec<String>,
    script: Script,
    calls: Mutex<Vec<(String, String)>>,
}

impl RecordingBackend {
    pub fn new(fragments: Vec<&str>) -> Self {
        Self {
            fragments: fragments.into_iter().map(str::to_string).collect(),
            ..Self::default()
        }
    }

    /// Starting a completion fails
    pub fn failing(mut self) -> Self {
        self.script = Script::RefuseStart;
        self
    }

    /// Never finishes starting a completion
    pub fn stalled(mut self) -> Self {
        self.script = Script::StallStart;
        self
    }

    /// Yields `count` fragments, then an error
    pub fn breaking_after(mut self, count: usize) -> Self {
        self.script = Script::BreakAfter(count);
        self
    }

    /// Yields `count` fragments, then goes quiet without ending
    pub fn stalling_after(mut self, count: usize) -> Self {
        self.script = Script::StallAfter(count);
        self
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationBackend for RecordingBackend {
    async fn stream_completion(&self, system: &str, prompt: &str) -> Result<TokenStream> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), prompt.to_string()));

        let head = |count: usize| -> Vec<Result<String>> {
            self.fragments.iter().take(count).cloned().map(Ok).collect()
        };

        let tokens = match self.script {
            Script::RefuseStart => {
                return Err(AgentError::Generation("backend unavailable".to_string()))
            }
            Script::StallStart => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                return Err(AgentError::Generation("backend never answered".to_string()));
            }
            Script::Complete => stream::iter(head(self.fragments.len())).boxed(),
            Script::BreakAfter(count) => stream::iter(head(count))
                .chain(stream::once(async {
                    Err(AgentError::Generation("stream interrupted".to_string()))
                }))
                .boxed(),
            Script::StallAfter(count) => stream::iter(head(count)).chain(stream::pending()).boxed(),
        };

        Ok(tokens)
    }
}

//
// ================= Fixtures =================
//

pub fn sample_crypto_snapshot() -> CryptoSnapshot {
    CryptoSnapshot {
        name: "Solana".to_string(),
        symbol: "SOL".to_string(),
        price: Some(142.37),
        market_cap: Some(66_000_000_000.0),
        volume_24h: Some(2_450_000_000.0),
        change_24h: Some(-3.21),
        change_7d: Some(5.4),
        change_30d: Some(-12.8),
        ath: Some(259.96),
        ath_change_percentage: Some(-45.2),
        circulating_supply: Some(464_000_000.0),
        last_updated: Some("2024-05-01T12:00:00.000Z".to_string()),
    }
}

pub fn sample_equity_snapshot() -> EquitySnapshot {
    EquitySnapshot {
        symbol: "AAPL".to_string(),
        name: "Apple Inc.".to_string(),
        currency: Some("USD".to_string()),
        exchange: Some("NMS".to_string()),
        price: Some(189.84),
        change: Some(1.52),
        change_percent: Some(0.807),
        open: Some(188.1),
        previous_close: Some(188.32),
        day_high: Some(190.5),
        day_low: Some(187.6),
        volume: Some(52_300_000.0),
        average_volume: Some(58_100_000.0),
        market_cap: Some(2_930_000_000_000.0),
        fifty_two_week_high: Some(199.62),
        fifty_two_week_low: Some(164.08),
        trailing_pe: Some(29.5),
        market_time: Some(1_714_564_800),
    }
}
