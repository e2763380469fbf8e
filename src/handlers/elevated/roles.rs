// handlers/elevated/roles.rs - /admin/api/roles handlers (super-admin only)

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::AuthContext;
use crate::database::models::Role;
use crate::database::Repository;
use crate::error::ApiError;
use crate::handlers::utils::{non_empty, parse_permissions, parse_uuid, IdQuery, Required};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct RoleBody {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

fn repository(ctx: &AuthContext) -> Repository<Role> {
    Repository::new("roles", "Role", ctx.database.clone())
}

/// GET /admin/api/roles
pub async fn role_list(Extension(ctx): Extension<AuthContext>) -> ApiResult<Vec<Role>> {
    Ok(ApiResponse::success(repository(&ctx).select_live().await?))
}

/// GET /admin/api/roles/:id
pub async fn role_show(Extension(ctx): Extension<AuthContext>, Path(id): Path<String>) -> ApiResult<Role> {
    let id = parse_uuid("id", &id)?;
    Ok(ApiResponse::success(repository(&ctx).select_404(id).await?))
}

/**
 * POST /admin/api/roles - Create a named permission bundle
 *
 * ```json
 * { "name": "Editor", "description": "Catalog only", "permissions": ["manage_products", "manage_categories"] }
 * ```
 *
 * Sessions already issued keep their snapshot; changes apply at next login.
 */
pub async fn role_create(Extension(ctx): Extension<AuthContext>, Json(body): Json<RoleBody>) -> ApiResult<Role> {
    Required::new().text("name", &body.name).check()?;
    let permissions = parse_permissions(&body.permissions)?;

    let role = sqlx::query_as::<_, Role>(
        "INSERT INTO roles (name, description, permissions) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(non_empty(&body.name))
    .bind(non_empty(&body.description))
    .bind(permissions.to_stored())
    .fetch_one(&ctx.database)
    .await?;

    Ok(ApiResponse::created(role))
}

/// PUT /admin/api/roles
pub async fn role_update(Extension(ctx): Extension<AuthContext>, Json(body): Json<RoleBody>) -> ApiResult<Role> {
    Required::new().text("id", &body.id).text("name", &body.name).check()?;
    let id = parse_uuid("id", body.id.as_deref().unwrap_or_default())?;
    let permissions = parse_permissions(&body.permissions)?;

    let role = sqlx::query_as::<_, Role>(
        r#"
        UPDATE roles SET name = $2, description = $3, permissions = $4, updated_at = now()
        WHERE id = $1 AND is_deleted = FALSE
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(non_empty(&body.name))
    .bind(non_empty(&body.description))
    .bind(permissions.to_stored())
    .fetch_optional(&ctx.database)
    .await?
    .ok_or_else(|| ApiError::not_found("Role not found"))?;

    Ok(ApiResponse::success(role))
}

/// DELETE /admin/api/roles?id=
pub async fn role_delete(Extension(ctx): Extension<AuthContext>, Query(query): Query<IdQuery>) -> ApiResult<Value> {
    repository(&ctx).soft_delete(query.require()?).await?;
    Ok(ApiResponse::message("Role deleted"))
}
