//! Core types for IsCool — the aggregation schema and the OpenAI-compatible
//! chat completions wire format used by most providers.
//!
//! The aggregation types serialize with snake_case keys so the JSON shape is
//! `{"final_answer": "...", "answers": [{"provider": "...", "answer": "..."}]}`.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Aggregation schema
// ─────────────────────────────────────────────

/// Provider identifier that switches the engine into fusion mode.
pub const FUSION_SENTINEL: &str = "fusion";

/// A question plus the providers it should be sent to.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct QuestionRequest {
    pub question: String,
    /// Requested provider identifiers. May contain duplicates or unknown names.
    #[serde(default = "default_providers")]
    pub providers: Vec<String>,
}

fn default_providers() -> Vec<String> {
    vec![FUSION_SENTINEL.to_string()]
}

impl QuestionRequest {
    /// Create a request for the given providers.
    pub fn new<I, S>(question: impl Into<String>, providers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QuestionRequest {
            question: question.into(),
            providers: providers.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the request selects fusion mode.
    pub fn is_fusion(&self) -> bool {
        self.providers.iter().any(|p| p == FUSION_SENTINEL)
    }
}

/// One provider's contribution to an aggregated response.
///
/// `answer` is either the provider's text verbatim or a failure placeholder.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderAnswer {
    pub provider: String,
    pub answer: String,
}

impl ProviderAnswer {
    pub fn new(provider: impl Into<String>, answer: impl Into<String>) -> Self {
        ProviderAnswer {
            provider: provider.into(),
            answer: answer.into(),
        }
    }
}

/// Final output of one aggregation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AggregatedResponse {
    pub final_answer: String,
    /// Ordered by dispatch order, not completion order.
    pub answers: Vec<ProviderAnswer>,
}

// ─────────────────────────────────────────────
// Chat completion wire format (OpenAI-compatible)
// ─────────────────────────────────────────────

/// A chat message in the OpenAI format.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role")]
pub enum Message {
    #[serde(rename = "system")]
    System { content: String },

    #[serde(rename = "user")]
    User { content: String },
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }
}

/// Request body for an OpenAI-compatible chat completion API.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Raw chat completion response. Only the fields we read are modelled.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

/// A single choice in a chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
    pub finish_reason: Option<String>,
}

/// The assistant message within a chat completion choice.
#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
    /// Reasoning trace from models like DeepSeek-R1. Logged, never returned.
    #[serde(default)]
    pub reasoning_content: Option<String>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if any and non-blank.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|text| !text.trim().is_empty())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
