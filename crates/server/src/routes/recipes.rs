//! Language model recipe handlers.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use pantry_manager_core::Recipe;

use crate::error::AppError;
use crate::extract::ApiJson;
use crate::services::RecipeService;
use crate::state::AppState;

/// Request for recipe suggestions.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestRequest {
    pub pantry_items: Option<Vec<String>>,
}

/// Suggested recipes.
#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub recipes: Arc<Vec<Recipe>>,
}

/// Suggest three recipes using the caller's pantry items.
///
/// POST /api/recipe-suggestion
///
/// # Errors
///
/// Returns 400 without `pantryItems` and 502 if the model fails or replies
/// with something other than a recipe array.
#[instrument(skip(state, body))]
pub async fn suggest(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SuggestRequest>,
) -> Result<Json<SuggestResponse>, AppError> {
    let pantry_items = body
        .pantry_items
        .ok_or_else(|| AppError::BadRequest("pantryItems array is required".to_string()))?;

    let recipes = RecipeService::new(state.llm(), state.recipe_cache())
        .suggest(&pantry_items)
        .await?;

    Ok(Json(SuggestResponse { recipes }))
}

/// Request for a chat reply.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub user_message: Option<String>,
    pub pantry_items: Option<Vec<String>>,
}

/// The model's reply.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Chat about recipes with the caller's pantry as context.
///
/// POST /api/recipes
///
/// # Errors
///
/// Returns 400 for a blank message or missing items and 502 if the model
/// fails.
#[instrument(skip(state, body))]
pub async fn chat(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let invalid = || AppError::BadRequest("Invalid request".to_string());
    let message = body
        .user_message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(invalid)?;
    let pantry_items = body.pantry_items.ok_or_else(invalid)?;

    let reply = RecipeService::new(state.llm(), state.recipe_cache())
        .chat(&message, &pantry_items)
        .await?;

    Ok(Json(ChatResponse { reply }))
}
