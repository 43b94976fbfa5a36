//! Runtime configuration
//!
//! Everything is read from the process environment (the binaries load
//! `.env` first). Unparseable values fail at startup, never per request.

use crate::error::AgentError;
use crate::Result;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_GENERATION_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_GENERATION_MODEL: &str = "openai/gpt-oss-120b";
pub const DEFAULT_COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_YAHOO_FINANCE_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 8_000;
pub const DEFAULT_GENERATION_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_PORT: u16 = 8080;

/// Settings for the streaming chat-completions backend
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_completion_tokens: u32,
    /// Longest wait for the stream to start and between two fragments
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_GENERATION_BASE_URL.to_string(),
            model: DEFAULT_GENERATION_MODEL.to_string(),
            temperature: 0.7,
            max_completion_tokens: 4096,
            timeout: Duration::from_millis(DEFAULT_GENERATION_TIMEOUT_MS),
        }
    }
}

/// Market data provider endpoints
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub coingecko_base_url: String,
    pub coingecko_api_key: Option<String>,
    pub yahoo_base_url: String,
    /// Upper bound on every resolver search and adapter fetch
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            coingecko_base_url: DEFAULT_COINGECKO_BASE_URL.to_string(),
            coingecko_api_key: None,
            yahoo_base_url: DEFAULT_YAHOO_FINANCE_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_PROVIDER_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub llm: LlmConfig,
    pub providers: ProviderConfig,
    pub port: u16,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            providers: ProviderConfig::default(),
            port: DEFAULT_PORT,
        }
    }
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        let llm = LlmConfig {
            api_key: env::var("GROQ_API_KEY").unwrap_or_default(),
            base_url: string_var("GENERATION_BASE_URL", DEFAULT_GENERATION_BASE_URL),
            model: string_var("GENERATION_MODEL", DEFAULT_GENERATION_MODEL),
            temperature: parsed_var("GENERATION_TEMPERATURE", 0.7)?,
            max_completion_tokens: parsed_var("GENERATION_MAX_TOKENS", 4096)?,
            timeout: Duration::from_millis(parsed_var(
                "GENERATION_TIMEOUT_MS",
                DEFAULT_GENERATION_TIMEOUT_MS,
            )?),
        };

        let providers = ProviderConfig {
            coingecko_base_url: string_var("COINGECKO_BASE_URL", DEFAULT_COINGECKO_BASE_URL),
            coingecko_api_key: env::var("COINGECKO_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            yahoo_base_url: string_var("YAHOO_FINANCE_BASE_URL", DEFAULT_YAHOO_FINANCE_BASE_URL),
            timeout: Duration::from_millis(parsed_var(
                "PROVIDER_TIMEOUT_MS",
                DEFAULT_PROVIDER_TIMEOUT_MS,
            )?),
        };

        let port = match env::var("PORT").or_else(|_| env::var("API_PORT")) {
            Ok(raw) => parse_value("PORT", &raw)?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            llm,
            providers,
            port,
        })
    }
}

fn string_var(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parsed_var<T: FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => parse_value(name, &raw),
        _ => Ok(default),
    }
}

fn parse_value<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| AgentError::Config(format!("{} has an invalid value: {:?}", name, raw)))
}
