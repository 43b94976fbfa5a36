//! Investment Agent
//!
//! A streaming question-answering service for investors that:
//! - Detects greetings with a fixed rule table
//! - Resolves free text to a crypto asset or a stock/ETF (crypto first)
//! - Fetches a live market snapshot for the resolved asset
//! - Builds a grounded prompt and relays generated text as server-sent events
//!
//! PIPELINE:
//! INPUT → CLASSIFY → RESOLVE? → FETCH? → PROMPT → GENERATE → RELAY

pub mod agent;
pub mod api;
pub mod classifier;
pub mod config;
pub mod error;
pub mod generation;
pub mod models;
pub mod prompt;
pub mod relay;
pub mod tools;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{AgentError, Result};

// Re-export common types
pub use agent::{AgentResponse, InvestmentAgent, Outcome};
pub use classifier::{Intent, QueryClassifier};
pub use config::AgentConfig;
pub use models::*;
