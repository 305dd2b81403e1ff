//! Generic HTTP provider for OpenAI-compatible `/chat/completions` APIs.
//!
//! Covers: OpenAI, the Hugging Face router, and DeepSeek (chat and reasoner).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, error, warn};

use iscool_core::types::{ChatCompletionRequest, ChatCompletionResponse, Message};
use iscool_core::utils::truncate_string;

use crate::error::ProviderError;
use crate::prompts::build_synthesis_prompt;
use crate::traits::{ClientSettings, LlmClient, Reasoner};

/// Error bodies are cut to this many characters before surfacing.
pub(crate) const MAX_ERROR_BODY: usize = 200;

// ─────────────────────────────────────────────
// HttpProvider
// ─────────────────────────────────────────────

/// A provider that talks to any OpenAI-compatible HTTP API.
pub struct HttpProvider {
    client: reqwest::Client,
    settings: ClientSettings,
    extra_headers: HeaderMap,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("api_base", &self.settings.api_base)
            .field("model", &self.settings.model)
            .field("provider", &self.settings.display_name)
            .finish()
    }
}

impl HttpProvider {
    /// Create a new HttpProvider from resolved settings.
    pub fn new(settings: ClientSettings) -> Result<Self, ProviderError> {
        let client = build_http_client(settings.timeout_secs)?;
        let extra_headers = build_header_map(&settings);

        Ok(HttpProvider {
            client,
            settings,
            extra_headers,
        })
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.settings.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }

    /// Send one chat completion and return the first choice's text.
    async fn complete(&self, messages: Vec<Message>) -> Result<String, ProviderError> {
        let provider = self.settings.display_name;

        debug!(
            provider,
            model = %self.settings.model,
            messages = messages.len(),
            "Calling LLM"
        );

        let request_body = ChatCompletionRequest {
            model: self.settings.model.clone(),
            messages,
            temperature: self.settings.temperature,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.settings.api_key)
            .headers(self.extra_headers.clone())
            .json(&request_body)
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

        let chat_resp = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| {
                error!(provider, error = %e, "Failed to read LLM response");
                ProviderError::from_reqwest(e, self.settings.timeout_secs)
            })?;

        if let Some(reasoning) = chat_resp
            .choices
            .first()
            .and_then(|c| c.message.reasoning_content.as_deref())
        {
            debug!(provider, reasoning_len = reasoning.len(), "dropping reasoning trace");
        }

        match chat_resp.first_content() {
            Some(text) => {
                debug!(provider, chars = text.len(), "LLM response received");
                Ok(text.to_string())
            }
            None => {
                let finish_reason = chat_resp
                    .choices
                    .first()
                    .and_then(|c| c.finish_reason.as_deref())
                    .unwrap_or("?");
                Err(ProviderError::EmptyResponse(format!(
                    "no content in response (finish_reason: {finish_reason})"
                )))
            }
        }
    }
}

#[async_trait]
impl LlmClient for HttpProvider {
    async fn ask(&self, question: &str) -> Result<String, ProviderError> {
        self.complete(vec![
            Message::system(self.settings.system_prompt.clone()),
            Message::user(question),
        ])
        .await
    }
}

#[async_trait]
impl Reasoner for HttpProvider {
    async fn synthesize(
        &self,
        question: &str,
        first: &str,
        second: &str,
    ) -> Result<String, ProviderError> {
        let prompt = build_synthesis_prompt(question, first, second);
        self.complete(vec![Message::user(prompt)]).await
    }
}

// ─────────────────────────────────────────────
// Shared helpers
// ─────────────────────────────────────────────

/// Build a `reqwest` client with a bounded per-request timeout.
pub(crate) fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ProviderError::Network(format!("failed to build HTTP client: {e}")))
}

/// Read a non-success body for the error message.
///
/// A body that stalls past the client timeout is still a timeout.
pub(crate) async fn read_error_body(
    response: reqwest::Response,
    timeout_secs: u64,
) -> Result<String, ProviderError> {
    match response.text().await {
        Ok(text) => Ok(text),
        Err(e) if e.is_timeout() => Err(ProviderError::Timeout(timeout_secs)),
        Err(_) => Ok("Failed to read error body".to_string()),
    }
}

/// Convert configured extra headers, skipping invalid ones.
pub(crate) fn build_header_map(settings: &ClientSettings) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (key, value) in &settings.extra_headers {
        if let (Ok(name), Ok(val)) = (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, val);
        } else {
            warn!(provider = settings.display_name, "Invalid header: {}={}", key, value);
        }
    }
    headers
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_settings(api_base: &str) -> ClientSettings {
        ClientSettings {
            display_name: "DeepSeek",
            api_base: api_base.to_string(),
            api_key: "test-key-123".to_string(),
            model: "deepseek-chat".to_string(),
            system_prompt: "Você é o IsCoolGPT.".to_string(),
            temperature: None,
            timeout_secs: 5,
            extra_headers: HashMap::new(),
        }
    }

    fn ok_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-test",
            "choices": [{
                "message": { "content": content },
                "finish_reason": "stop"
            }]
        })
    }

    // ── Unit tests ──

    #[test]
    fn test_completions_url_trailing_slash() {
        let provider = HttpProvider::new(make_settings("https://api.deepseek.com/")).unwrap();
        assert_eq!(
            provider.completions_url(),
            "https://api.deepseek.com/chat/completions"
        );
    }

    #[test]
    fn test_completions_url_no_trailing_slash() {
        let provider = HttpProvider::new(make_settings("https://api.openai.com/v1")).unwrap();
        assert_eq!(
            provider.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_extra_headers() {
        let mut settings = make_settings("https://router.huggingface.co/v1");
        settings
            .extra_headers
            .insert("X-Use-Cache".to_string(), "false".to_string());
        settings
            .extra_headers
            .insert("bad header".to_string(), "x".to_string());
        let provider = HttpProvider::new(settings).unwrap();
        assert!(provider.extra_headers.contains_key("x-use-cache"));
        assert_eq!(provider.extra_headers.len(), 1);
    }

    // ── Integration tests with mock server ──

    #[tokio::test]
    async fn test_ask_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("EC2 é um serviço de VMs.")))
            .mount(&mock_server)
            .await;

        let provider = HttpProvider::new(make_settings(&mock_server.uri())).unwrap();
        let answer = provider.ask("O que é EC2?").await.unwrap();

        assert_eq!(answer, "EC2 é um serviço de VMs.");
    }

    #[tokio::test]
    async fn test_ask_sends_system_prompt_and_question() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "deepseek-chat",
                "messages": [
                    { "role": "system", "content": "Você é o IsCoolGPT." },
                    { "role": "user", "content": "O que é VPC?" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("ok")))
            .mount(&mock_server)
            .await;

        let provider = HttpProvider::new(make_settings(&mock_server.uri())).unwrap();

        // If the body matcher fails, wiremock returns 404 → we'd get an error
        assert_eq!(provider.ask("O que é VPC?").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_synthesize_embeds_both_answers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("síntese")))
            .mount(&mock_server)
            .await;

        let mut settings = make_settings(&mock_server.uri());
        settings.model = "deepseek-reasoner".to_string();
        let provider = HttpProvider::new(settings).unwrap();

        let answer = provider
            .synthesize("O que é S3?", "resposta A", "resposta B")
            .await
            .unwrap();
        assert_eq!(answer, "síntese");

        let requests = mock_server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let prompt = body["messages"][0]["content"].as_str().unwrap();
        assert_eq!(body["messages"][0]["role"], "user");
        assert!(prompt.contains("resposta A"));
        assert!(prompt.contains("resposta B"));
        assert!(prompt.contains("O que é S3?"));
    }

    #[tokio::test]
    async fn test_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {
                    "message": "Rate limit exceeded",
                    "type": "rate_limit_error"
                }
            })))
            .mount(&mock_server)
            .await;

        let provider = HttpProvider::new(make_settings(&mock_server.uri())).unwrap();
        let err = provider.ask("Hello").await.unwrap_err();

        assert_eq!(err.kind(), "HttpStatusError");
        let msg = err.to_string();
        assert!(msg.contains("429"));
        assert!(msg.contains("Rate limit exceeded"));
    }

    #[tokio::test]
    async fn test_error_body_is_truncated() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("x".repeat(1000)))
            .mount(&mock_server)
            .await;

        let provider = HttpProvider::new(make_settings(&mock_server.uri())).unwrap();
        match provider.ask("Hello").await.unwrap_err() {
            ProviderError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body.chars().count(), MAX_ERROR_BODY);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_network_error() {
        // Point to a port that's not listening
        let provider = HttpProvider::new(make_settings("http://127.0.0.1:1")).unwrap();
        let err = provider.ask("Hello").await.unwrap_err();
        assert_eq!(err.kind(), "NetworkError");
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(ok_body("tarde demais"))
                    .set_delay(std::time::Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let mut settings = make_settings(&mock_server.uri());
        settings.timeout_secs = 1;
        let provider = HttpProvider::new(settings).unwrap();
        let err = provider.ask("Hello").await.unwrap_err();
        assert_eq!(err.kind(), "TimeoutError");
        assert_eq!(err.to_string(), "request timed out after 1s");
    }

    #[tokio::test]
    async fn test_stalled_body_times_out() {
        let base = crate::test_util::stalled_body_server().await;

        let mut settings = make_settings(&base);
        settings.timeout_secs = 1;
        let provider = HttpProvider::new(settings).unwrap();
        let err = provider.ask("Hello").await.unwrap_err();
        assert_eq!(err.kind(), "TimeoutError");
    }

    #[tokio::test]
    async fn test_malformed_payload() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let provider = HttpProvider::new(make_settings(&mock_server.uri())).unwrap();
        let err = provider.ask("Hello").await.unwrap_err();
        assert_eq!(err.kind(), "MalformedResponse");
    }

    #[tokio::test]
    async fn test_empty_content() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": { "content": null },
                    "finish_reason": "content_filter"
                }]
            })))
            .mount(&mock_server)
            .await;

        let provider = HttpProvider::new(make_settings(&mock_server.uri())).unwrap();
        let err = provider.ask("Hello").await.unwrap_err();
        assert_eq!(err.kind(), "EmptyResponse");
        assert!(err.to_string().contains("content_filter"));
    }

    #[tokio::test]
    async fn test_reasoning_content_is_not_returned() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": {
                        "content": "The answer is 42.",
                        "reasoning_content": "Let me think step by step..."
                    },
                    "finish_reason": "stop"
                }]
            })))
            .mount(&mock_server)
            .await;

        let provider = HttpProvider::new(make_settings(&mock_server.uri())).unwrap();
        let answer = provider.synthesize("q", "a", "b").await.unwrap();
        assert_eq!(answer, "The answer is 42.");
    }
}
