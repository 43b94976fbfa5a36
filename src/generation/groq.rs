//! Streaming client for Groq's OpenAI-compatible chat completions API
//!
//! Uses a long-lived reqwest::Client for connection pooling. The response
//! body is decoded incrementally as server-sent events; nothing is buffered
//! beyond the current partial line.

use super::{GenerationBackend, TokenStream};
use crate::config::LlmConfig;
use crate::error::AgentError;
use crate::Result;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{error, info};

/// Reusable generation client (connection-pooled)
pub struct GroqClient {
    client: Client,
    config: LlmConfig,
}

impl GroqClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl GenerationBackend for GroqClient {
    async fn stream_completion(&self, system: &str, prompt: &str) -> Result<TokenStream> {
        if self.config.api_key.is_empty() {
            return Err(AgentError::Config("GROQ_API_KEY not configured".to_string()));
        }

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            top_p: 1.0,
            max_completion_tokens: self.config.max_completion_tokens,
            stream: true,
        };

        info!(model = %self.config.model, "Calling generation backend");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Generation request failed: {}", e);
                AgentError::Generation(format!("Generation request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "Generation backend error response: {}", error_text);
            return Err(AgentError::Generation(format!(
                "Generation backend returned {}: {}",
                status, error_text
            )));
        }

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
            .boxed();

        Ok(decode_fragments(body))
    }
}

//
// ================= Request / Chunk Types =================
//

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    top_p: f32,
    max_completion_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

//
// ================= Event Stream Decoding =================
//

#[derive(Debug, PartialEq)]
enum SseItem {
    Fragment(String),
    Done,
}

/// Line-oriented `text/event-stream` decoder tolerant of arbitrary chunking
#[derive(Debug, Default)]
struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Decode every complete line buffered so far.
    ///
    /// Items parsed before a bad line are kept; decoding stops at the first error.
    fn push(&mut self, chunk: &[u8]) -> Vec<Result<SseItem>> {
        self.buffer.extend_from_slice(chunk);

        let mut items = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');

            match parse_event_line(line) {
                Ok(Some(item)) => items.push(Ok(item)),
                Ok(None) => {}
                Err(error) => {
                    items.push(Err(error));
                    break;
                }
            }
        }

        items
    }
}

fn parse_event_line(line: &str) -> Result<Option<SseItem>> {
    // Comments, `event:` fields and blank separators carry no content
    let Some(payload) = line.strip_prefix("data:") else {
        return Ok(None);
    };

    let payload = payload.trim();
    if payload.is_empty() {
        return Ok(None);
    }
    if payload == "[DONE]" {
        return Ok(Some(SseItem::Done));
    }

    let chunk: ChatCompletionChunk = serde_json::from_str(payload)
        .map_err(|e| AgentError::Generation(format!("Malformed stream chunk: {}", e)))?;

    if let Some(error) = chunk.error {
        return Err(AgentError::Generation(format!(
            "Generation stream error: {}",
            error
        )));
    }

    let content = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .unwrap_or_default();

    Ok(Some(SseItem::Fragment(content)))
}

struct DecodeState {
    body: BoxStream<'static, reqwest::Result<Vec<u8>>>,
    decoder: SseDecoder,
    pending: VecDeque<Result<String>>,
    finished: bool,
}

/// Turn a raw response body into a fragment stream.
///
/// Ends at `[DONE]`, at end of body, or right after yielding an error.
fn decode_fragments(body: BoxStream<'static, reqwest::Result<Vec<u8>>>) -> TokenStream {
    let state = DecodeState {
        body,
        decoder: SseDecoder::default(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => {
                    for item in state.decoder.push(&chunk) {
                        match item {
                            Ok(SseItem::Fragment(text)) => state.pending.push_back(Ok(text)),
                            Ok(SseItem::Done) => {
                                state.finished = true;
                                break;
                            }
                            Err(error) => {
                                state.finished = true;
                                state.pending.push_back(Err(error));
                                break;
                            }
                        }
                    }
                }
                Some(Err(e)) => {
                    state.finished = true;
                    state.pending.push_back(Err(AgentError::Generation(format!(
                        "Stream interrupted: {}",
                        e
                    ))));
                }
                None => state.finished = true,
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_of(chunks: &[&str]) -> BoxStream<'static, reqwest::Result<Vec<u8>>> {
        let chunks: Vec<reqwest::Result<Vec<u8>>> =
            chunks.iter().map(|c| Ok(c.as_bytes().to_vec())).collect();
        stream::iter(chunks).boxed()
    }

    fn chunk(content: &str) -> String {
        format!(
            "data: {}\n\n",
            serde_json::json!({
                "id": "chatcmpl-1",
                "object": "chat.completion.chunk",
                "choices": [{"index": 0, "delta": {"content": content}, "finish_reason": null}]
            })
        )
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatCompletionRequest {
            model: "openai/gpt-oss-120b",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You are an analyst",
                },
                ChatMessage {
                    role: "user",
                    content: "What is RSI?",
                },
            ],
            temperature: 0.7,
            top_p: 1.0,
            max_completion_tokens: 4096,
            stream: true,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], true);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "What is RSI?");
        assert_eq!(json["max_completion_tokens"], 4096);
    }

    fn decoded(items: Vec<Result<SseItem>>) -> Vec<SseItem> {
        items.into_iter().map(|item| item.unwrap()).collect()
    }

    #[test]
    fn test_decoder_handles_split_lines() {
        let full = chunk("Hello");
        let (head, tail) = full.split_at(17);

        let mut decoder = SseDecoder::default();
        assert!(decoder.push(head.as_bytes()).is_empty());
        assert_eq!(
            decoded(decoder.push(tail.as_bytes())),
            vec![SseItem::Fragment("Hello".to_string())]
        );
    }

    #[test]
    fn test_decoder_role_only_delta_is_empty_fragment() {
        let mut decoder = SseDecoder::default();
        let items =
            decoder.push(b"data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\r\n\r\n");
        assert_eq!(decoded(items), vec![SseItem::Fragment(String::new())]);
    }

    #[test]
    fn test_decoder_ignores_comments_and_reports_done() {
        let mut decoder = SseDecoder::default();
        let items = decoder.push(b": keep-alive\nevent: message\ndata: [DONE]\n\n");
        assert_eq!(decoded(items), vec![SseItem::Done]);
    }

    #[test]
    fn test_decoder_rejects_error_chunks() {
        let mut decoder = SseDecoder::default();
        let items = decoder.push(b"data: {\"error\":{\"message\":\"rate limited\"}}\n");
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(AgentError::Generation(_))));
    }

    #[test]
    fn test_decoder_keeps_fragments_before_bad_line() {
        let mut decoder = SseDecoder::default();
        let mixed = format!("{}data: {{not json}}\n{}", chunk("kept"), chunk("after"));

        let items = decoder.push(mixed.as_bytes());

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), &SseItem::Fragment("kept".to_string()));
        assert!(matches!(items[1], Err(AgentError::Generation(_))));
    }

    #[tokio::test]
    async fn test_decode_fragments_until_done() {
        let first = chunk("Bit");
        let second = format!("{}{}", chunk("coin"), chunk(""));
        let body = body_of(&[&first, &second, "data: [DONE]\n\n", &chunk("ignored")]);

        let fragments: Vec<String> = decode_fragments(body)
            .map(|item| item.unwrap())
            .collect()
            .await;

        assert_eq!(fragments, vec!["Bit", "coin", ""]);
    }

    #[tokio::test]
    async fn test_decode_fragments_stops_after_error() {
        let body = body_of(&[&chunk("partial"), "data: {not json}\n", &chunk("never")]);

        let items: Vec<Result<String>> = decode_fragments(body).collect().await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "partial");
        assert!(matches!(items[1], Err(AgentError::Generation(_))));
    }

    #[tokio::test]
    async fn test_decode_fragments_bad_line_in_same_chunk() {
        let mixed = format!("{}data: {{not json}}\n", chunk("kept?"));
        let body = body_of(&[&mixed, &chunk("never")]);

        let items: Vec<Result<String>> = decode_fragments(body).collect().await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "kept?");
        tokio_test::assert_err!(&items[1]);
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let client = GroqClient::new(LlmConfig::default()).unwrap();
        let result = client.stream_completion("system", "hello").await;

        assert!(matches!(result, Err(AgentError::Config(_))));
    }
}
