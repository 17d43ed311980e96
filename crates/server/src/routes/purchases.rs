//! Purchase lookup handlers for QR receipt import.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;

use pantry_manager_core::{Purchase, PurchaseId};

use crate::db::PurchaseRepository;
use crate::error::AppError;
use crate::extract::ApiJson;
use crate::state::AppState;

const INVALID_QR_CODE: &str = "Invalid QR code";

/// Request naming a purchase.
#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    pub id: Option<String>,
}

/// Get a purchase by the ID in the request body.
///
/// POST /api/purchase
///
/// # Errors
///
/// Returns 400 for a missing or malformed ID and 404 if no purchase matches.
#[instrument(skip(state))]
pub async fn by_body(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<PurchaseRequest>,
) -> Result<Json<Purchase>, AppError> {
    let raw = body
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing purchase id".to_string()))?;
    let id = PurchaseId::parse(raw)
        .ok_or_else(|| AppError::BadRequest("Invalid purchase id".to_string()))?;

    let purchase = PurchaseRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase not found".to_string()))?;

    Ok(Json(purchase))
}

/// Get a purchase by the ID encoded in a receipt's QR code.
///
/// GET /api/purchase/{id}
///
/// # Errors
///
/// Returns 400 for a malformed ID and 404 if no purchase matches.
#[instrument(skip(state))]
pub async fn by_qr_code(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<Purchase>, AppError> {
    let id = PurchaseId::parse(raw.trim())
        .ok_or_else(|| AppError::BadRequest(INVALID_QR_CODE.to_string()))?;

    let purchase = PurchaseRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(INVALID_QR_CODE.to_string()))?;

    tracing::debug!(purchase_id = %id, items = purchase.items.len(), "Scanned purchase");
    Ok(Json(purchase))
}
