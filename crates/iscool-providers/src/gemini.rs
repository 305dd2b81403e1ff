//! Google Gemini provider (`models/{model}:generateContent`).
//!
//! Gemini does not speak the OpenAI format, so it gets its own small wire
//! types. The same client serves both the `gemini` answerer and the
//! `gemini-reasoner` synthesizer; the reasoner variant relaxes the safety
//! filters because its input is other models' output.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use iscool_core::utils::truncate_string;

use crate::error::ProviderError;
use crate::http_provider::{
    build_header_map, build_http_client, read_error_body, MAX_ERROR_BODY,
};
use crate::prompts::build_synthesis_prompt;
use crate::traits::{ClientSettings, LlmClient, Reasoner};

const SAFETY_CATEGORIES: &[&str] = &[
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

// ─────────────────────────────────────────────
// Wire format
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, or a reason why there is none.
    fn into_text(self) -> Result<String, ProviderError> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(ProviderError::EmptyResponse(match block_reason {
                Some(reason) => format!("prompt blocked by Gemini ({reason})"),
                None => "no candidates in response".to_string(),
            }));
        };

        let text: String = candidate
            .content
            .unwrap_or_default()
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        if text.trim().is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "?".to_string());
            return Err(ProviderError::EmptyResponse(format!(
                "Gemini returned no text (finish_reason: {reason})"
            )));
        }
        Ok(text)
    }
}

// ─────────────────────────────────────────────
// GeminiProvider
// ─────────────────────────────────────────────

/// Client for the Gemini REST API.
pub struct GeminiProvider {
    client: reqwest::Client,
    settings: ClientSettings,
    extra_headers: HeaderMap,
    relaxed_safety: bool,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_base", &self.settings.api_base)
            .field("model", &self.settings.model)
            .field("relaxed_safety", &self.relaxed_safety)
            .finish()
    }
}

impl GeminiProvider {
    pub fn new(settings: ClientSettings) -> Result<Self, ProviderError> {
        let client = build_http_client(settings.timeout_secs)?;
        let extra_headers = build_header_map(&settings);

        Ok(GeminiProvider {
            client,
            settings,
            extra_headers,
            relaxed_safety: false,
        })
    }

    /// Disable Gemini's safety blocking (`BLOCK_NONE` for every category).
    pub fn with_relaxed_safety(mut self) -> Self {
        self.relaxed_safety = true;
        self
    }

    fn generate_url(&self) -> String {
        let base = self.settings.api_base.trim_end_matches('/');
        format!("{}/models/{}:generateContent", base, self.settings.model)
    }

    fn build_request(&self, system: Option<&str>, prompt: &str) -> GenerateContentRequest {
        let safety_settings = if self.relaxed_safety {
            SAFETY_CATEGORIES
                .iter()
                .map(|&category| SafetySetting {
                    category,
                    threshold: "BLOCK_NONE",
                })
                .collect()
        } else {
            Vec::new()
        };

        GenerateContentRequest {
            system_instruction: system.map(|text| Content {
                role: None,
                parts: vec![Part {
                    text: Some(text.to_string()),
                }],
            }),
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: self
                .settings
                .temperature
                .map(|temperature| GenerationConfig { temperature }),
            safety_settings,
        }
    }

    async fn generate(&self, request: GenerateContentRequest) -> Result<String, ProviderError> {
        let provider = self.settings.display_name;
        debug!(provider, model = %self.settings.model, "Calling Gemini");

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.settings.api_key)
            .headers(self.extra_headers.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(provider, error = %e, "HTTP request failed");
                ProviderError::from_reqwest(e, self.settings.timeout_secs)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = read_error_body(response, self.settings.timeout_secs).await?;
            error!(provider, status = %status, body = %error_text, "API error");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: truncate_string(&error_text, MAX_ERROR_BODY),
            });
        }

        let parsed = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| {
                error!(provider, error = %e, "Failed to read Gemini response");
                ProviderError::from_reqwest(e, self.settings.timeout_secs)
            })?;

        parsed.into_text().inspect_err(|e| {
            warn!(provider, error = %e, "Gemini produced no usable text");
        })
    }
}

#[async_trait]
impl LlmClient for GeminiProvider {
    async fn ask(&self, question: &str) -> Result<String, ProviderError> {
        let request = self.build_request(Some(self.settings.system_prompt.as_str()), question);
        self.generate(request).await
    }
}

#[async_trait]
impl Reasoner for GeminiProvider {
    async fn synthesize(
        &self,
        question: &str,
        first: &str,
        second: &str,
    ) -> Result<String, ProviderError> {
        let prompt = build_synthesis_prompt(question, first, second);
        let request = self.build_request(None, &prompt);
        self.generate(request).await
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
