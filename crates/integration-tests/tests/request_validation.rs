//! Router-level request validation.
//!
//! Every request here must be rejected before the database is touched: the
//! pool points at a port nothing listens on, so reaching it would surface as
//! a 500 instead of the expected status.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use serde_json::json;

use pantry_manager_integration_tests::{
    UNREACHABLE_DATABASE_URL, empty_request, json_request, lazy_app, send,
};

fn assert_bad_request(status: StatusCode, body: &serde_json::Value, message: &str) {
    assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], message);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_is_ok_without_database() {
    let app = lazy_app(UNREACHABLE_DATABASE_URL);
    let response = tower::ServiceExt::oneshot(app, empty_request("GET", "/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_readiness_reports_unavailable_database() {
    let app = lazy_app(UNREACHABLE_DATABASE_URL);
    let (status, _) = send(&app, empty_request("GET", "/health/ready")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

// =============================================================================
// Missing identifiers
// =============================================================================

#[tokio::test]
async fn test_user_scoped_routes_require_identifier() {
    let app = lazy_app(UNREACHABLE_DATABASE_URL);
    let message = "user identifier is required";

    let requests = vec![
        empty_request("GET", "/api/userLogin"),
        empty_request("GET", "/api/getPantryItems"),
        json_request("POST", "/api/getPantryItems", &json!({})),
        json_request("POST", "/api/addItems", &json!({"items": []})),
        json_request("PUT", "/api/updatePantryItem", &json!({"item": {}})),
        json_request("DELETE", "/api/removePantryItem", &json!({"itemId": "x"})),
        empty_request("GET", "/api/profile"),
        json_request("PUT", "/api/profile", &json!({"profileData": {}})),
        json_request("POST", "/api/profile/update", &json!({"profileData": {}})),
        json_request("POST", "/api/profile-update", &json!({"profileData": {}})),
        json_request("POST", "/api/shopping-list/suggestions", &json!({})),
        empty_request("GET", "/api/notifications"),
        empty_request("GET", "/api/notifications?userId=%20%20"),
    ];

    for request in requests {
        let uri = request.uri().clone();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}: {body}");
        assert_eq!(body["error"], message, "{uri}");
    }
}

#[tokio::test]
async fn test_repeated_user_id_is_json_bad_request() {
    let app = lazy_app(UNREACHABLE_DATABASE_URL);

    for uri in [
        "/api/userLogin?userId=a&userId=b",
        "/api/getPantryItems?userId=a&userId=b",
        "/api/profile?userId=a&userId=b",
        "/api/notifications?userId=a&userId=b",
    ] {
        let (status, body) = send(&app, empty_request("GET", uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}: {body}");
        assert_eq!(body["success"], false, "{uri}");
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .starts_with("Invalid query string"),
            "{uri}"
        );
    }
}

// =============================================================================
// Malformed bodies
// =============================================================================

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = lazy_app(UNREACHABLE_DATABASE_URL);
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/addItems")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{\"userId\": "))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_add_items_requires_array() {
    let app = lazy_app(UNREACHABLE_DATABASE_URL);

    for items in [json!(null), json!({"name": "Rice"}), json!("Rice")] {
        let (status, body) = send(
            &app,
            json_request("POST", "/api/addItems", &json!({"userId": "uid-1", "items": items})),
        )
        .await;
        assert_bad_request(status, &body, "Items array is required");
    }
}

#[tokio::test]
async fn test_add_items_validates_each_item() {
    let app = lazy_app(UNREACHABLE_DATABASE_URL);
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/addItems",
            &json!({"userId": "uid-1", "items": [{"name": "Rice"}, {"name": "  "}]}),
        ),
    )
    .await;
    assert_bad_request(status, &body, "item 1: name is required");

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/addItems",
            &json!({"userId": "uid-1", "items": [{"name": "Rice", "quantity": -1}]}),
        ),
    )
    .await;
    assert_bad_request(status, &body, "item 0: quantity must be a non-negative number");
}

#[tokio::test]
async fn test_update_item_requires_item_fields() {
    let app = lazy_app(UNREACHABLE_DATABASE_URL);

    let (status, body) = send(
        &app,
        json_request("PUT", "/api/updatePantryItem", &json!({"userId": "uid-1"})),
    )
    .await;
    assert_bad_request(status, &body, "item is required");

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            "/api/updatePantryItem",
            &json!({"userId": "uid-1", "item": {"name": "Rice", "quantity": 1, "unit": "kg"}}),
        ),
    )
    .await;
    assert_bad_request(status, &body, "item id is required");

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            "/api/updatePantryItem",
            &json!({
                "userId": "uid-1",
                "item": {"id": uuid_string(), "quantity": 1, "unit": "kg"}
            }),
        ),
    )
    .await;
    assert_bad_request(status, &body, "name is required");
}

#[tokio::test]
async fn test_remove_item_requires_valid_item_id() {
    let app = lazy_app(UNREACHABLE_DATABASE_URL);

    let (status, body) = send(
        &app,
        json_request("DELETE", "/api/removePantryItem", &json!({"userId": "uid-1"})),
    )
    .await;
    assert_bad_request(status, &body, "itemId is required");

    let (status, body) = send(
        &app,
        json_request(
            "DELETE",
            "/api/removePantryItem",
            &json!({"userId": "uid-1", "itemId": "507f1f77bcf86cd799439011"}),
        ),
    )
    .await;
    assert_bad_request(status, &body, "Invalid itemId");
}

#[tokio::test]
async fn test_profile_update_requires_profile_data() {
    let app = lazy_app(UNREACHABLE_DATABASE_URL);
    let (status, body) = send(
        &app,
        json_request("PUT", "/api/profile", &json!({"userId": "uid-1"})),
    )
    .await;
    assert_bad_request(status, &body, "profileData is required");
}

#[tokio::test]
async fn test_login_requires_valid_email() {
    let app = lazy_app(UNREACHABLE_DATABASE_URL);

    let (status, body) = send(
        &app,
        json_request("POST", "/api/userLogin", &json!({"name": "Jamie", "uid": "uid-1"})),
    )
    .await;
    assert_bad_request(status, &body, "email is required");

    let (status, _) = send(
        &app,
        json_request("POST", "/api/userLogin", &json!({"email": "jamie at example"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Purchases
// =============================================================================

#[tokio::test]
async fn test_purchase_path_rejects_invalid_qr_code() {
    let app = lazy_app(UNREACHABLE_DATABASE_URL);
    let (status, body) = send(&app, empty_request("GET", "/api/purchase/not-a-receipt")).await;
    assert_bad_request(status, &body, "Invalid QR code");
}

#[tokio::test]
async fn test_purchase_body_rejects_missing_and_invalid_id() {
    let app = lazy_app(UNREACHABLE_DATABASE_URL);

    let (status, body) = send(&app, json_request("POST", "/api/purchase", &json!({}))).await;
    assert_bad_request(status, &body, "Missing purchase id");

    let (status, body) = send(
        &app,
        json_request("POST", "/api/purchase", &json!({"id": "12345"})),
    )
    .await;
    assert_bad_request(status, &body, "Invalid purchase id");
}

// =============================================================================
// Language model routes
// =============================================================================

#[tokio::test]
async fn test_recipe_chat_requires_message_and_items() {
    let app = lazy_app(UNREACHABLE_DATABASE_URL);

    for body in [
        json!({"pantryItems": ["rice"]}),
        json!({"userMessage": "   ", "pantryItems": ["rice"]}),
        json!({"userMessage": "What can I cook?"}),
    ] {
        let (status, response) = send(&app, json_request("POST", "/api/recipes", &body)).await;
        assert_bad_request(status, &response, "Invalid request");
    }
}

#[tokio::test]
async fn test_recipe_suggestion_requires_items() {
    let app = lazy_app(UNREACHABLE_DATABASE_URL);
    let (status, body) = send(
        &app,
        json_request("POST", "/api/recipe-suggestion", &json!({})),
    )
    .await;
    assert_bad_request(status, &body, "pantryItems array is required");
}

#[tokio::test]
async fn test_unreachable_model_is_bad_gateway() {
    let app = lazy_app(UNREACHABLE_DATABASE_URL);
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/recipes",
            &json!({"userMessage": "Dinner ideas?", "pantryItems": ["rice", "beans"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Failed to generate response");
}

#[tokio::test]
async fn test_language_model_routes_are_rate_limited() {
    let app = lazy_app(UNREACHABLE_DATABASE_URL);
    let request = || json_request("POST", "/api/recipes", &json!({"pantryItems": []}));

    for _ in 0..5 {
        let (status, _) = send(&app, request()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, body) = send(&app, request()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_forwarded_for_does_not_reset_the_limit() {
    let app = lazy_app(UNREACHABLE_DATABASE_URL);

    for n in 0..6 {
        let mut request = json_request("POST", "/api/recipes", &json!({"pantryItems": []}));
        let spoofed = format!("203.0.113.{n}").parse().unwrap();
        request.headers_mut().insert("x-forwarded-for", spoofed);

        let (status, body) = send(&app, request).await;
        let expected = if n < 5 {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::TOO_MANY_REQUESTS
        };
        assert_eq!(status, expected, "request {n}: {body}");
    }
}

#[tokio::test]
async fn test_request_without_peer_address_gets_json_error() {
    let app = lazy_app(UNREACHABLE_DATABASE_URL);
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/recipe-suggestion")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(r#"{"pantryItems": ["rice"]}"#))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Internal server error");
}

// =============================================================================
// Routing
// =============================================================================

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = lazy_app(UNREACHABLE_DATABASE_URL);
    let (status, _) = send(&app, empty_request("GET", "/api/pantry")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn uuid_string() -> String {
    pantry_manager_core::PantryItemId::generate().to_string()
}
