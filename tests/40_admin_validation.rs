mod common;

use axum::http::StatusCode;
use serde_json::json;

use shop_admin_api::auth::Permission;

use common::{body_json, json_request, send, super_admin_token, tenant_token, test_state};

#[tokio::test]
async fn tenant_create_refuses_server_databases() {
    let state = test_state();
    let token = super_admin_token(&state);

    for db_name in ["postgres", "template0", "template1", "shop_settings"] {
        let response = send(
            &state,
            json_request(
                "POST",
                "/admin/api/tenants",
                Some(&token),
                json!({"name": "Acme", "dbName": db_name}),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", db_name);
        let body = body_json(response).await;
        assert!(body["field_errors"]["dbName"].is_string());
    }
}

#[tokio::test]
async fn tenant_update_refuses_server_databases() {
    let state = test_state();
    let token = super_admin_token(&state);

    let response = send(
        &state,
        json_request(
            "PUT",
            "/admin/api/tenants",
            Some(&token),
            json!({
                "id": "5b0c7c1e-8f0e-4a8e-9b5c-2a1f6b1d9e01",
                "name": "Acme",
                "dbName": "template1"
            }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn discount_quote_validates_before_query() {
    let state = test_state();
    let token = tenant_token(&state, &[Permission::ManageDiscounts]);

    let response = send(
        &state,
        json_request("POST", "/admin/api/global-discounts/applicable", Some(&token), json!({})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["field_errors"]["amount"], "This field is required");

    let response = send(
        &state,
        json_request(
            "POST",
            "/admin/api/global-discounts/applicable",
            Some(&token),
            json!({"amount": 10, "productId": "not-a-uuid"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn discount_quote_needs_manage_discounts() {
    let state = test_state();
    let token = tenant_token(&state, &[Permission::ManageCoupons]);

    let response = send(
        &state,
        json_request(
            "POST",
            "/admin/api/global-discounts/applicable",
            Some(&token),
            json!({"amount": 10}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
