use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::cookie::token_from_headers;
use crate::auth::{authorize, AuthContext, Permission};
use crate::error::ApiError;
use crate::state::AppState;

/// Resolve the session cookie into an `AuthContext` and inject it into the
/// request. Any authentication failure ends the request with a uniform 401.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = token_from_headers(request.headers());
    let ctx = authorize(token.as_deref(), &state.tokens, &state.databases).await?;

    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

fn context(request: &Request) -> Result<&AuthContext, ApiError> {
    request
        .extensions()
        .get::<AuthContext>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))
}

/// Route-family gate for a single permission. Layered with
/// `from_fn_with_state(Permission::X, require_permission)`.
pub async fn require_permission(
    State(permission): State<Permission>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    context(&request)?.require(permission)?;
    Ok(next.run(request).await)
}

pub async fn require_super_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    context(&request)?.require_super_admin()?;
    Ok(next.run(request).await)
}

pub async fn require_tenant(request: Request, next: Next) -> Result<Response, ApiError> {
    context(&request)?.require_tenant()?;
    Ok(next.run(request).await)
}
