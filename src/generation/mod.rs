//! Generation backend
//!
//! The backend is an opaque, one-shot producer of text fragments. Only the
//! orchestrator starts it and only the relay consumes it.

use crate::error::AgentError;
use crate::Result;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::time::Duration;

pub mod groq;
pub use groq::GroqClient;

/// Lazily produced fragments, in generation order
pub type TokenStream = BoxStream<'static, Result<String>>;

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Start a completion for one user-role prompt under a system instruction
    async fn stream_completion(&self, system: &str, prompt: &str) -> Result<TokenStream>;
}

/// Start a completion, failing with `Timeout` if the backend takes longer than `limit`
pub async fn start_bounded(
    backend: &dyn GenerationBackend,
    system: &str,
    prompt: &str,
    limit: Duration,
) -> Result<TokenStream> {
    match tokio::time::timeout(limit, backend.stream_completion(system, prompt)).await {
        Ok(started) => started.map(|tokens| with_idle_timeout(tokens, limit)),
        Err(_) => Err(AgentError::Timeout(format!(
            "Generation did not start within {}ms",
            limit.as_millis()
        ))),
    }
}

/// End the stream with a `Timeout` error once the source goes quiet for `limit`
pub fn with_idle_timeout(tokens: TokenStream, limit: Duration) -> TokenStream {
    stream::unfold(Some(tokens), move |state| async move {
        let mut tokens = state?;
        match tokio::time::timeout(limit, tokens.next()).await {
            Ok(Some(item)) => Some((item, Some(tokens))),
            Ok(None) => None,
            Err(_) => Some((
                Err(AgentError::Timeout(format!(
                    "No generation output for {}ms",
                    limit.as_millis()
                ))),
                None,
            )),
        }
    })
    .boxed()
}

/// A stream that yields one fixed fragment
pub fn single_fragment(text: impl Into<String>) -> TokenStream {
    stream::once(futures::future::ready(Ok(text.into()))).boxed()
}

/// A stream that ends immediately
pub fn empty_stream() -> TokenStream {
    stream::empty().boxed()
}
