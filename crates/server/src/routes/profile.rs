//! Profile handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use pantry_manager_core::{ProfileUpdate, UserProfile};

use super::{find_user, lookup_chain, user_not_found};
use crate::db::{Change, UserRepository};
use crate::error::AppError;
use crate::extract::{ApiJson, ApiQuery, UserQuery};
use crate::state::AppState;

/// Response carrying a profile.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub profile: UserProfile,
}

/// Get the user's profile with defaults filled in.
///
/// GET /api/profile?userId=
///
/// # Errors
///
/// Returns 400 without an identifier and 404 for an unknown user.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UserQuery>,
) -> Result<Json<ProfileResponse>, AppError> {
    let chain = lookup_chain(query.user_id.as_deref())?;
    let user = find_user(&state, &chain).await?;

    Ok(Json(ProfileResponse {
        success: true,
        profile: user.effective_profile(),
    }))
}

/// Request to update a profile.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub user_id: Option<String>,
    pub profile_data: Option<ProfileUpdate>,
}

/// Response from a profile update.
#[derive(Debug, Serialize)]
pub struct UpdateProfileResponse {
    pub success: bool,
    pub message: &'static str,
    pub profile: UserProfile,
}

/// Apply a partial profile update. Only supplied fields change.
///
/// PUT /api/profile, POST /api/profile/update, POST /api/profile-update
///
/// # Errors
///
/// Returns 400 for a missing identifier or update, 404 for an unknown user.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpdateProfileRequest>,
) -> Result<Json<UpdateProfileResponse>, AppError> {
    let chain = lookup_chain(body.user_id.as_deref())?;
    let update = body
        .profile_data
        .ok_or_else(|| AppError::BadRequest("profileData is required".to_string()))?;

    let (user, ()) = UserRepository::new(state.pool())
        .with_locked(&chain, |user| {
            if update.is_empty() {
                return Change::Skip(());
            }
            update.apply(&mut user.profile);
            Change::Write(())
        })
        .await?
        .ok_or_else(user_not_found)?;

    tracing::info!(user_id = %user.id, "Updated profile");
    Ok(Json(UpdateProfileResponse {
        success: true,
        message: "Profile updated successfully",
        profile: user.effective_profile(),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_reads_nested_profile_data() {
        let request: UpdateProfileRequest = serde_json::from_value(serde_json::json!({
            "userId": "uid-1",
            "profileData": {
                "region": "EU",
                "notificationSettings": {"weeklyReminders": false}
            }
        }))
        .unwrap();

        let update = request.profile_data.unwrap();
        assert_eq!(update.region.as_deref(), Some("EU"));
        assert!(update.display_name.is_none());
        assert!(!update.is_empty());
    }
}
