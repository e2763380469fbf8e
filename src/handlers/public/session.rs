// handlers/public/session.rs - POST /login/api/login and POST /login/api/logout

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::cookie::{expired_session_cookie, session_cookie};
use crate::auth::SessionSummary;
use crate::error::ApiError;
use crate::handlers::utils::{non_empty, Required};
use crate::middleware::ApiResponse;
use crate::services::session_service;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

/**
 * POST /login/api/login - Verify staff credentials and start a session
 *
 * Expected Input:
 * ```json
 * { "email": "admin@acme.test", "password": "secret" }
 * ```
 *
 * Sets the HTTP-only `token` cookie and returns the session snapshot:
 * ```json
 * {
 *   "success": true,
 *   "data": {
 *     "userId": "...",
 *     "dbName": "tenant_3f2a...",
 *     "isSuperAdmin": false,
 *     "permissions": ["manage_orders"]
 *   }
 * }
 * ```
 *
 * Unknown email and wrong password produce the same 401.
 */
pub async fn login_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginBody>,
) -> Result<(CookieJar, ApiResponse<SessionSummary>), ApiError> {
    Required::new().text("email", &body.email).text("password", &body.password).check()?;

    let settings = state.databases.settings_pool().await?;
    let session = session_service::login(
        &settings,
        state.databases.settings_database(),
        &state.tokens,
        non_empty(&body.email).unwrap_or_default(),
        body.password.as_deref().unwrap_or_default(),
    )
    .await?;

    let cookie = session_cookie(
        session.token,
        state.config.security.jwt_expiry_hours,
        state.secure_cookies(),
    );

    Ok((jar.add(cookie), ApiResponse::success(SessionSummary::from(&session.claims))))
}

/// POST /login/api/logout - Overwrite the session cookie with an expired one.
/// Needs no valid session.
pub async fn logout_post(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, ApiResponse<Value>) {
    let jar = jar.add(expired_session_cookie(state.secure_cookies()));
    (jar, ApiResponse::success(json!({ "loggedOut": true })))
}
