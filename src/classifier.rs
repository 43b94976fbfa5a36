//! Query Classifier
//!
//! Rule-based intent detection over two closed vocabularies:
//! - Greeting: message equals or starts with a greeting token
//! - Inquiry: anything else, reduced to a residual query for asset resolution

/// Static keyword lists, zero allocation
pub const GREETING_TOKENS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "hii",
    "yo",
    "greetings",
    "good morning",
    "good afternoon",
    "good evening",
];

/// Filler and investment vocabulary stripped before resolution
pub const QUERY_STOPWORDS: &[&str] = &[
    // Actions
    "analyze", "analyse", "analysis", "compare", "buy", "sell", "invest",
    // Investment filler
    "price", "investment", "good", "should", "vs", "versus",
    // Question filler
    "what", "whats", "what's", "is", "of", "about", "think", "your", "take", "on",
    // Pronouns and articles
    "i", "me", "my", "a", "an", "the",
];

/// Outcome of text-only classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    /// Needs resolution; carries the residual query
    Inquiry { query: String },
}

/// Query classifier
pub struct QueryClassifier;

impl QueryClassifier {
    /// Classify a raw user message. The greeting check always runs first.
    pub fn classify(message: &str) -> Intent {
        if Self::is_greeting(message) {
            Intent::Greeting
        } else {
            Intent::Inquiry {
                query: Self::extract_query(message),
            }
        }
    }

    pub fn is_greeting(message: &str) -> bool {
        let text = message.trim().to_lowercase();
        if text.is_empty() {
            return false;
        }

        GREETING_TOKENS
            .iter()
            .any(|token| text == *token || text.starts_with(token))
    }

    /// Drop stopword tokens and keep whatever should name the asset
    pub fn extract_query(message: &str) -> String {
        message
            .split_whitespace()
            .map(|raw| raw.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|token| !token.is_empty())
            .filter(|token| !is_stopword(token))
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

fn is_stopword(token: &str) -> bool {
    QUERY_STOPWORDS
        .iter()
        .any(|stopword| stopword.eq_ignore_ascii_case(token))
}
