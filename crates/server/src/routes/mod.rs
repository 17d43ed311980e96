//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                        - Liveness check
//! GET  /health/ready                  - Database readiness check
//!
//! # Users
//! POST /api/userLogin                 - Create or link user on sign-in
//! GET  /api/userLogin?userId=         - User by identifier
//!
//! # Pantry
//! POST /api/addItems                  - Merge items into the pantry
//! GET  /api/getPantryItems?userId=    - List pantry
//! POST /api/getPantryItems            - List pantry (identifier in body)
//! PUT  /api/updatePantryItem          - Edit one item
//! DELETE /api/removePantryItem        - Remove one item
//!
//! # Profile
//! GET  /api/profile?userId=           - Profile with defaults
//! PUT  /api/profile                   - Partial profile update
//! POST /api/profile/update            - Same, for clients that cannot PUT
//! POST /api/profile-update            - Same
//!
//! # Purchases
//! POST /api/purchase                  - Purchase by id in body
//! GET  /api/purchase/{id}             - Purchase by id from a QR code
//!
//! # Shopping list and notifications
//! POST /api/shopping-list/suggestions - Derived shopping list
//! GET  /api/notifications?userId=     - Derived notifications
//!
//! # Language model (rate limited)
//! POST /api/recipe-suggestion         - Three recipes for the pantry
//! POST /api/recipes                   - Recipe chat
//! ```
//!
//! Every user-scoped route resolves the caller's identifier through
//! [`LookupChain`](pantry_manager_core::LookupChain): primary id, then auth
//! UID, then email.

pub mod health;
pub mod notifications;
pub mod pantry;
pub mod profile;
pub mod purchases;
pub mod recipes;
pub mod shopping;
pub mod users;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use pantry_manager_core::LookupChain;

use crate::config::ServerConfig;
use crate::db::UserRepository;
use crate::error::{AppError, set_sentry_user};
use crate::middleware::llm_rate_limiter;
use crate::models::User;
use crate::state::AppState;

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/userLogin", get(users::show).post(users::login))
}

/// Create the pantry routes router.
pub fn pantry_routes() -> Router<AppState> {
    Router::new()
        .route("/addItems", post(pantry::add_items))
        .route("/getPantryItems", get(pantry::list).post(pantry::list))
        .route("/updatePantryItem", put(pantry::update_item))
        .route("/removePantryItem", delete(pantry::remove_item))
}

/// Create the profile routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile::show).put(profile::update))
        .route("/profile/update", post(profile::update))
        .route("/profile-update", post(profile::update))
}

/// Create the purchase routes router.
pub fn purchase_routes() -> Router<AppState> {
    Router::new()
        .route("/purchase", post(purchases::by_body))
        .route("/purchase/{id}", get(purchases::by_qr_code))
}

/// Create the derived-data routes router.
pub fn derived_routes() -> Router<AppState> {
    Router::new()
        .route("/shopping-list/suggestions", post(shopping::suggestions))
        .route("/notifications", get(notifications::index))
}

/// Create the language model routes router, rate limited per client IP.
pub fn llm_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .route("/recipe-suggestion", post(recipes::suggest))
        .route("/recipes", post(recipes::chat))
        .layer(llm_rate_limiter(config.trust_proxy_headers))
}

/// Create all routes for the API.
pub fn routes(config: &ServerConfig) -> Router<AppState> {
    let api = Router::new()
        .merge(user_routes())
        .merge(pantry_routes())
        .merge(profile_routes())
        .merge(purchase_routes())
        .merge(derived_routes())
        .merge(llm_routes(config));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api)
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Build the lookup chain for a caller-supplied identifier.
///
/// Runs before any database access so a missing identifier is always a 400.
fn lookup_chain(identifier: Option<&str>) -> Result<LookupChain, AppError> {
    Ok(LookupChain::new(identifier.unwrap_or_default())?)
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

/// Resolve the user or fail with 404.
async fn find_user(state: &AppState, chain: &LookupChain) -> Result<User, AppError> {
    let user = UserRepository::new(state.pool())
        .find(chain)
        .await?
        .ok_or_else(user_not_found)?;
    set_sentry_user(&user.id.to_string(), Some(user.email.as_str()));
    Ok(user)
}
