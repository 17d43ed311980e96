//! Pantry handlers: add (merge), list, update and remove.

use axum::{Json, body::Bytes, extract::State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use pantry_manager_core::pantry::{
    self, IncomingItem, ItemEdit, PantryItem, find_item_mut, merge_items, validate_batch,
};
use pantry_manager_core::{NewPantryItem, PantryItemId};

use super::{find_user, lookup_chain, user_not_found};
use crate::db::{Change, UserRepository};
use crate::error::AppError;
use crate::extract::{ApiJson, ApiQuery, UserQuery};
use crate::state::AppState;

// =============================================================================
// Add
// =============================================================================

/// Request to merge items into a pantry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemsRequest {
    pub user_id: Option<String>,
    pub items: Option<Value>,
}

/// Response from a merge.
#[derive(Debug, Serialize)]
pub struct AddItemsResponse {
    pub success: bool,
    pub message: String,
    pub inserted: usize,
    pub updated: usize,
    pub pantry: Vec<PantryItem>,
}

/// Parse and validate the `items` array.
fn parse_items(items: Option<Value>) -> Result<Vec<NewPantryItem>, AppError> {
    let Some(Value::Array(items)) = items else {
        return Err(AppError::BadRequest("Items array is required".to_string()));
    };

    let items = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<IncomingItem>(item)
                .map_err(|e| AppError::BadRequest(format!("item {index}: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(validate_batch(items)?)
}

/// Merge items into the user's pantry.
///
/// POST /api/addItems
///
/// # Errors
///
/// Returns 400 for a missing identifier, invalid items, or a merged quantity
/// too large to store, and 404 for an unknown user.
#[instrument(skip(state, body))]
pub async fn add_items(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AddItemsRequest>,
) -> Result<Json<AddItemsResponse>, AppError> {
    let chain = lookup_chain(body.user_id.as_deref())?;
    let items = parse_items(body.items)?;

    let (user, merged) = UserRepository::new(state.pool())
        .with_locked(&chain, |user| {
            match merge_items(&mut user.pantry, items, Utc::now()) {
                Ok(outcome) => Change::Write(Ok(outcome)),
                Err(e) => Change::Skip(Err(e)),
            }
        })
        .await?
        .ok_or_else(user_not_found)?;
    let outcome = merged?;

    tracing::info!(
        user_id = %user.id,
        inserted = outcome.inserted,
        updated = outcome.updated,
        "Merged pantry items"
    );

    Ok(Json(AddItemsResponse {
        success: true,
        message: outcome.summary(),
        inserted: outcome.inserted,
        updated: outcome.updated,
        pantry: user.pantry,
    }))
}

// =============================================================================
// List
// =============================================================================

/// Optional body for the list route.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListBody {
    user_id: Option<String>,
}

/// Response listing a pantry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PantryResponse {
    pub success: bool,
    pub pantry_items: Vec<PantryItem>,
}

/// Identifier from the JSON body, falling back to the query string.
///
/// Body parse failures are ignored so that clients posting an empty or
/// non-JSON body can still pass `?userId=`.
fn list_identifier(query: UserQuery, body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ListBody>(body)
        .ok()
        .and_then(|b| b.user_id)
        .filter(|id| !id.trim().is_empty())
        .or(query.user_id)
}

/// List the user's pantry.
///
/// GET|POST /api/getPantryItems
///
/// # Errors
///
/// Returns 400 without an identifier and 404 for an unknown user.
#[instrument(skip(state, query, body))]
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UserQuery>,
    body: Bytes,
) -> Result<Json<PantryResponse>, AppError> {
    let identifier = list_identifier(query, &body);
    let chain = lookup_chain(identifier.as_deref())?;
    let user = find_user(&state, &chain).await?;

    Ok(Json(PantryResponse {
        success: true,
        pantry_items: user.pantry,
    }))
}

// =============================================================================
// Update
// =============================================================================

/// Request to edit one item.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub user_id: Option<String>,
    pub item: Option<ItemEdit>,
}

/// Response with the edited item.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemResponse {
    pub success: bool,
    pub updated_item: PantryItem,
}

fn item_not_found() -> AppError {
    AppError::NotFound("Item not found in pantry".to_string())
}

/// Parse an item ID from a request.
fn parse_item_id(raw: Option<&str>, field: &str) -> Result<PantryItemId, AppError> {
    let raw = raw
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{field} is required")))?;
    PantryItemId::parse(raw).ok_or_else(|| AppError::BadRequest(format!("Invalid {field}")))
}

/// Edit one item in the user's pantry.
///
/// PUT /api/updatePantryItem
///
/// # Errors
///
/// Returns 400 for missing fields, 404 for an unknown user or item.
#[instrument(skip(state, body))]
pub async fn update_item(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpdateItemRequest>,
) -> Result<Json<UpdateItemResponse>, AppError> {
    let chain = lookup_chain(body.user_id.as_deref())?;
    let mut edit = body
        .item
        .ok_or_else(|| AppError::BadRequest("item is required".to_string()))?;
    let item_id = parse_item_id(edit.id.take().as_deref(), "item id")?;
    let edit = edit.validate()?;

    let (user, found) = UserRepository::new(state.pool())
        .with_locked(&chain, |user| match find_item_mut(&mut user.pantry, item_id) {
            Some(item) => {
                edit.apply(item);
                Change::Write(true)
            }
            None => Change::Skip(false),
        })
        .await?
        .ok_or_else(user_not_found)?;

    if !found {
        return Err(item_not_found());
    }

    let updated_item = user
        .pantry
        .into_iter()
        .find(|item| item.id == item_id)
        .ok_or_else(item_not_found)?;

    tracing::info!(user_id = %user.id, item_id = %item_id, "Updated pantry item");
    Ok(Json(UpdateItemResponse {
        success: true,
        updated_item,
    }))
}

// =============================================================================
// Remove
// =============================================================================

/// Request to remove one item.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemRequest {
    pub user_id: Option<String>,
    pub item_id: Option<String>,
}

/// Response naming the removed item.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemResponse {
    pub success: bool,
    pub removed_id: PantryItemId,
}

/// Remove one item from the user's pantry.
///
/// DELETE /api/removePantryItem
///
/// # Errors
///
/// Returns 400 for missing fields, 404 for an unknown user or item.
#[instrument(skip(state, body))]
pub async fn remove_item(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RemoveItemRequest>,
) -> Result<Json<RemoveItemResponse>, AppError> {
    let chain = lookup_chain(body.user_id.as_deref())?;
    let item_id = parse_item_id(body.item_id.as_deref(), "itemId")?;

    let (user, removed) = UserRepository::new(state.pool())
        .with_locked(&chain, |user| {
            match pantry::remove_item(&mut user.pantry, item_id) {
                Some(_) => Change::Write(true),
                None => Change::Skip(false),
            }
        })
        .await?
        .ok_or_else(user_not_found)?;

    if !removed {
        return Err(AppError::NotFound("Pantry item not found".to_string()));
    }

    tracing::info!(user_id = %user.id, item_id = %item_id, "Removed pantry item");
    Ok(Json(RemoveItemResponse {
        success: true,
        removed_id: item_id,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_items_must_be_an_array() {
        for items in [None, Some(json!({"name": "Rice"})), Some(json!("Rice"))] {
            let err = parse_items(items).unwrap_err();
            assert!(matches!(err, AppError::BadRequest(msg) if msg == "Items array is required"));
        }
    }

    #[test]
    fn test_items_are_validated_with_defaults() {
        let items = parse_items(Some(json!([{"name": " Rice "}, {"name": "Oil", "unit": "l"}])))
            .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Rice");
        assert_eq!(items[0].unit, "pcs");
        assert_eq!(items[1].unit, "l");
    }

    #[test]
    fn test_item_with_wrong_field_type_is_rejected() {
        let err = parse_items(Some(json!([{"name": "Rice", "quantity": "two"}]))).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg.starts_with("item 0:")));
    }

    #[test]
    fn test_item_without_name_is_rejected() {
        let err = parse_items(Some(json!([{"quantity": 2}]))).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_list_identifier_prefers_body() {
        let query = UserQuery {
            user_id: Some("from-query".to_string()),
        };
        assert_eq!(
            list_identifier(query, br#"{"userId":"from-body"}"#).as_deref(),
            Some("from-body")
        );
    }

    #[test]
    fn test_list_identifier_falls_back_to_query() {
        let query = || UserQuery {
            user_id: Some("from-query".to_string()),
        };
        assert_eq!(list_identifier(query(), b"").as_deref(), Some("from-query"));
        assert_eq!(list_identifier(query(), b"{oops").as_deref(), Some("from-query"));
        assert_eq!(
            list_identifier(query(), br#"{"userId":""}"#).as_deref(),
            Some("from-query")
        );
    }

    #[test]
    fn test_parse_item_id() {
        let id = PantryItemId::generate();
        assert_eq!(
            parse_item_id(Some(&id.to_string()), "itemId").unwrap(),
            id
        );
        assert!(matches!(
            parse_item_id(None, "itemId"),
            Err(AppError::BadRequest(msg)) if msg == "itemId is required"
        ));
        assert!(matches!(
            parse_item_id(Some("abc"), "itemId"),
            Err(AppError::BadRequest(msg)) if msg == "Invalid itemId"
        ));
    }
}
