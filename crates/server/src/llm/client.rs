//! Language model API client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use secrecy::ExposeSecret;
use tracing::instrument;
use url::Url;

use crate::config::LlmConfig;

use super::error::LlmError;
use super::types::{ChatRequest, ChatResponse, Message};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 2048;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Language model client.
///
/// Cheap to clone; the underlying HTTP connection pool is shared.
#[derive(Clone)]
pub struct LlmClient {
    inner: Arc<LlmClientInner>,
}

struct LlmClientInner {
    client: reqwest::Client,
    model: String,
    api_url: Url,
}

impl LlmClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` if the API key contains invalid header
    /// characters or the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let mut api_key = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|_| LlmError::Config("API key is not a valid header value".to_string()))?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-api-key", api_key);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LlmError::Config(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(LlmClientInner {
                client,
                model: config.model.clone(),
                api_url: config.api_url.clone(),
            }),
        })
    }

    /// The configured model ID.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.inner.model
    }

    /// Send one system prompt and one user message, returning the reply text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API returns an error
    /// response, or the reply contains no text.
    #[instrument(skip(self, system, user_message), fields(model = %self.inner.model))]
    pub async fn complete(
        &self,
        system: String,
        user_message: String,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: self.inner.model.clone(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature,
            system,
            messages: vec![Message::user(user_message)],
        };

        let response = self
            .inner
            .client
            .post(self.inner.api_url.clone())
            .json(&request)
            .send()
            .await?;

        let response = self.handle_response(response).await?;
        tracing::debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "LLM call complete"
        );

        let text = response.text();
        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }

    /// Decode a success body, or turn an error status into an `LlmError`.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<ChatResponse, LlmError> {
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok());
        let body = response.text().await?;

        if status.is_success() {
            return Ok(serde_json::from_str(&body)?);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            tracing::error!(model = %self.inner.model, "LLM API rejected the configured key");
        } else {
            tracing::warn!(status = status.as_u16(), "LLM API returned an error");
        }
        Err(LlmError::from_status(status, &body, retry_after))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn config(api_key: &str) -> LlmConfig {
        LlmConfig {
            api_key: SecretString::from(api_key),
            model: "claude-sonnet-4-20250514".to_string(),
            api_url: Url::parse("http://127.0.0.1:9/v1/messages").unwrap(),
        }
    }

    #[test]
    fn test_new_rejects_invalid_header_key() {
        let result = LlmClient::new(&config("bad\nkey"));
        assert!(matches!(result, Err(LlmError::Config(_))));
    }

    #[test]
    fn test_new_keeps_model() {
        let client = LlmClient::new(&config("sk-ant-test")).unwrap();
        assert_eq!(client.model(), "claude-sonnet-4-20250514");
    }

    #[tokio::test]
    async fn test_complete_unreachable_is_http_error() {
        let client = LlmClient::new(&config("sk-ant-test")).unwrap();
        let result = client
            .complete("system".to_string(), "hello".to_string(), 0.7)
            .await;
        assert!(matches!(result, Err(LlmError::Http(_))));
    }

    #[test]
    fn test_llm_client_is_send_sync_clone() {
        fn assert_traits<T: Send + Sync + Clone>() {}
        assert_traits::<LlmClient>();
    }
}
