// handlers/public/system.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Shop Admin API",
            "version": version,
            "description": "Multi-tenant shop administration backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "session": "/login/api/login, /login/api/logout (public - cookie session)",
                "me": "/api/auth/me (authenticated)",
                "catalog": "/admin/api/{products,categories,attributes,attribute-values} (permission)",
                "promotions": "/admin/api/{global-discounts,coupons} (permission)",
                "orders": "/admin/api/orders[/:id] (manage_orders)",
                "buyers": "/admin/api/buyers[/:id] (tenant + manage_buyers)",
                "mail": "/admin/api/send-email (tenant)",
                "platform": "/admin/api/{tenants,users,roles} (super-admin)",
            }
        }
    }))
}

/// GET /health - 503 while the settings database is unreachable
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.databases.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": true,
                    "message": "Database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
