//! Notification handler.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Serialize;
use tracing::instrument;

use pantry_manager_core::{Notification, notifications_for};

use super::{find_user, lookup_chain};
use crate::error::AppError;
use crate::extract::{ApiQuery, UserQuery};
use crate::state::AppState;

/// Notifications derived from the pantry.
#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub success: bool,
    pub notifications: Vec<Notification>,
}

/// List expiry and low-stock notifications for the user.
///
/// GET /api/notifications?userId=
///
/// # Errors
///
/// Returns 400 without an identifier and 404 for an unknown user.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UserQuery>,
) -> Result<Json<NotificationsResponse>, AppError> {
    let chain = lookup_chain(query.user_id.as_deref())?;
    let user = find_user(&state, &chain).await?;

    let notifications = notifications_for(
        &user.pantry,
        user.profile.notification_settings,
        Utc::now(),
    );

    Ok(Json(NotificationsResponse {
        success: true,
        notifications,
    }))
}
