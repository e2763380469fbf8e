mod common;

use axum::http::{header, StatusCode};
use serde_json::json;

use shop_admin_api::auth::Permission;

use common::{body_json, get, json_request, send, super_admin_token, tenant_token, test_state};

#[tokio::test]
async fn me_returns_token_snapshot() {
    let state = test_state();
    let token = tenant_token(&state, &[Permission::ManageProducts, Permission::ManageOrders]);

    let response = send(&state, get("/api/auth/me", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["isSuperAdmin"], false);
    assert_eq!(data["dbName"], "tenant_acme");
    assert_eq!(data["tenantName"], "Acme");
    assert_eq!(data["permissions"], json!(["manage_products", "manage_orders"]));
}

#[tokio::test]
async fn me_for_super_admin() {
    let state = test_state();
    let token = super_admin_token(&state);

    let response = send(&state, get("/api/auth/me", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["isSuperAdmin"], true);
    assert!(body["data"].get("tenantId").is_none());
}

#[tokio::test]
async fn me_requires_session() {
    let state = test_state();
    let response = send(&state, get("/api/auth/me", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_expires_cookie_without_session() {
    let state = test_state();
    let response = send(&state, json_request("POST", "/login/api/logout", None, json!({}))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(set_cookie.starts_with("token="));
    assert!(set_cookie.contains("Max-Age=0"));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));
}

#[tokio::test]
async fn login_validates_body_first() {
    let state = test_state();
    let response = send(
        &state,
        json_request("POST", "/login/api/login", None, json!({"email": "admin@acme.test"})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["field_errors"]["password"], "This field is required");
}
