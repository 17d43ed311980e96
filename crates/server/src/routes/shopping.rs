//! Shopping list suggestion handler.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use pantry_manager_core::shopping::suggest;
use pantry_manager_core::{RecipeNeeds, ShoppingListItem};

use super::{find_user, lookup_chain};
use crate::error::AppError;
use crate::extract::ApiJson;
use crate::state::AppState;

/// Request for shopping suggestions.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsRequest {
    pub user_id: Option<String>,
    /// Recipes the user picked, with their missing ingredients.
    #[serde(default)]
    pub recipes: Vec<RecipeNeeds>,
    /// Names already on the user's list.
    #[serde(default)]
    pub existing: Vec<String>,
}

/// Suggested shopping list entries.
#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub success: bool,
    pub items: Vec<ShoppingListItem>,
}

/// Suggest items from low stock, soon-expiring items and recipe gaps.
///
/// POST /api/shopping-list/suggestions
///
/// # Errors
///
/// Returns 400 without an identifier and 404 for an unknown user.
#[instrument(skip(state, body))]
pub async fn suggestions(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SuggestionsRequest>,
) -> Result<Json<SuggestionsResponse>, AppError> {
    let chain = lookup_chain(body.user_id.as_deref())?;
    let user = find_user(&state, &chain).await?;

    let items = suggest(
        &user.pantry,
        &user.profile,
        &body.recipes,
        &body.existing,
        Utc::now(),
    );
    tracing::debug!(user_id = %user.id, count = items.len(), "Built shopping suggestions");

    Ok(Json(SuggestionsResponse {
        success: true,
        items,
    }))
}
