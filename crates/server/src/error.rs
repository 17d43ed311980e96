//! Unified error handling for the API.
//!
//! Every handler returns `Result<_, AppError>`. Errors render as
//! `{"success": false, "error": "..."}` with the matching status code.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use pantry_manager_core::LookupError;
use pantry_manager_core::pantry::{EditError, ItemError, MergeError};

use crate::db::RepositoryError;
use crate::llm::LlmError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Language model API call failed.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// The language model replied with something that is not valid JSON.
    #[error("Invalid JSON format from model")]
    InvalidModelOutput {
        /// The reply as received.
        raw: String,
    },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The client is over its request quota.
    #[error("Too many requests, retry in {retry_after}s")]
    RateLimited {
        /// Seconds until the next request is allowed.
        retry_after: u64,
    },

    /// Request conflicts with current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("Resource not found".to_string()),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Database(other),
        }
    }
}

impl From<LookupError> for AppError {
    fn from(err: LookupError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<ItemError> for AppError {
    fn from(err: ItemError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<MergeError> for AppError {
    fn from(err: MergeError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<EditError> for AppError {
    fn from(err: EditError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl AppError {
    /// HTTP status code for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Llm(_) | Self::InvalidModelOutput { .. } => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server-side errors with Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_) | Self::Llm(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let retry_after = match &self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        };

        // Don't expose internal error details to clients
        let body = match self {
            Self::Database(_) | Self::Internal(_) => {
                json!({ "success": false, "error": "Internal server error" })
            }
            Self::Llm(_) => json!({ "success": false, "error": "Failed to generate response" }),
            Self::InvalidModelOutput { raw } => {
                tracing::warn!(raw_len = raw.len(), "Model returned unparseable output");
                json!({ "success": false, "error": "Invalid JSON format from model", "raw": raw })
            }
            Self::NotFound(msg) | Self::BadRequest(msg) | Self::Conflict(msg) => {
                json!({ "success": false, "error": msg })
            }
            limited @ Self::RateLimited { .. } => {
                json!({ "success": false, "error": limited.to_string() })
            }
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

/// Set the Sentry user context for the current request.
pub fn set_sentry_user(user_id: &str, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}
