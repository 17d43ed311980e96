//! User sign-in and lookup handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use pantry_manager_core::Email;

use super::{find_user, lookup_chain};
use crate::db::{LoginDetails, UserRepository};
use crate::error::{AppError, set_sentry_user};
use crate::extract::{ApiJson, ApiQuery, UserQuery};
use crate::models::User;
use crate::state::AppState;

/// Sign-in details posted by the client after provider authentication.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "photoURL")]
    pub photo_url: Option<String>,
    pub uid: Option<String>,
}

impl LoginRequest {
    /// Validate the request into repository input.
    ///
    /// A missing name falls back to the email's local part.
    fn into_details(self) -> Result<LoginDetails, AppError> {
        let raw_email = self
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AppError::BadRequest("email is required".to_string()))?;
        let email = Email::parse(raw_email).map_err(|e| AppError::BadRequest(e.to_string()))?;

        let name = self
            .name
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| email.local_part().to_owned());

        Ok(LoginDetails {
            name,
            email,
            photo_url: self.photo_url.filter(|p| !p.trim().is_empty()),
            auth_uid: self.uid.map(|u| u.trim().to_owned()).filter(|u| !u.is_empty()),
        })
    }
}

/// Response carrying one user.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

/// Create the user on first sign-in, or link a changed auth UID.
///
/// POST /api/userLogin
///
/// # Errors
///
/// Returns 400 for a missing or invalid email and 409 if the UID is already
/// linked to another user.
#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let details = body.into_details()?;
    let user = UserRepository::new(state.pool())
        .upsert_login(&details)
        .await?;
    set_sentry_user(&user.id.to_string(), Some(user.email.as_str()));
    Ok(Json(UserResponse { user }))
}

/// Look up a user by id, auth UID or email.
///
/// GET /api/userLogin?userId=
///
/// # Errors
///
/// Returns 400 without an identifier and 404 if no user matches.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UserQuery>,
) -> Result<Json<UserResponse>, AppError> {
    let chain = lookup_chain(query.user_id.as_deref())?;
    let user = find_user(&state, &chain).await?;
    Ok(Json(UserResponse { user }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(json: serde_json::Value) -> LoginRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_login_requires_email() {
        let err = request(serde_json::json!({"name": "Jamie"}))
            .into_details()
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "email is required"));
    }

    #[test]
    fn test_login_rejects_invalid_email() {
        let err = request(serde_json::json!({"email": "not-an-email"}))
            .into_details()
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_login_accepts_photo_url_alias() {
        let details = request(serde_json::json!({
            "name": "Jamie",
            "email": "Jamie@Example.com",
            "photoURL": "https://example.com/a.png",
            "uid": "firebase-uid"
        }))
        .into_details()
        .unwrap();

        assert_eq!(details.email.as_str(), "jamie@example.com");
        assert_eq!(details.photo_url.as_deref(), Some("https://example.com/a.png"));
        assert_eq!(details.auth_uid.as_deref(), Some("firebase-uid"));
    }

    #[test]
    fn test_login_name_falls_back_to_local_part() {
        let details = request(serde_json::json!({"email": "sam@example.com", "uid": "  "}))
            .into_details()
            .unwrap();
        assert_eq!(details.name, "sam");
        assert_eq!(details.auth_uid, None);
    }
}
