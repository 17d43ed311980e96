//! Error types for the language model client.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when calling the language model API.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The request never produced a response (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error {status} ({error_type}): {message}")]
    Api {
        status: u16,
        error_type: String,
        message: String,
    },

    /// 429 from the API. `retry_after` is in seconds, when the API sent one.
    #[error("rate limited by the model API")]
    RateLimited { retry_after: Option<u64> },

    /// 401 from the API; the configured key is wrong or revoked.
    #[error("model API rejected the API key")]
    Unauthorized,

    /// A success response whose body is not a messages reply.
    #[error("unexpected response body: {0}")]
    Parse(#[from] serde_json::Error),

    /// The reply carried no text.
    #[error("model returned no text")]
    EmptyResponse,

    /// The client could not be configured.
    #[error("invalid client configuration: {0}")]
    Config(String),
}

/// Error envelope sent by the API: `{"type": "error", "error": {...}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

impl LlmError {
    /// Build the error for a non-success `status` with `body`.
    ///
    /// Bodies outside the API's error envelope (a proxy's HTML page, say) are
    /// kept verbatim as the message.
    pub(crate) fn from_status(status: StatusCode, body: &str, retry_after: Option<u64>) -> Self {
        match status {
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited { retry_after },
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            _ => {
                let (error_type, message) = serde_json::from_str::<ErrorEnvelope>(body)
                    .map_or_else(
                        |_| ("unknown".to_string(), body.trim().to_string()),
                        |envelope| (envelope.error.kind, envelope.error.message),
                    );
                Self::Api {
                    status: status.as_u16(),
                    error_type,
                    message,
                }
            }
        }
    }
}
