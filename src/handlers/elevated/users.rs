// handlers/elevated/users.rs - /admin/api/users handlers (super-admin only)

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::auth::{AccountKind, AuthContext, PermissionSet};
use crate::database::models::StaffUser;
use crate::database::service::{email_taken, find_role, find_tenant};
use crate::database::Repository;
use crate::error::ApiError;
use crate::handlers::utils::{non_empty, optional_uuid, parse_permissions, parse_uuid, IdQuery, Required};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub tenant_id: Option<String>,
    pub role_id: Option<String>,
    /// `null` or absent means "derive from role and tenant".
    pub permissions: Option<Vec<String>>,
}

/// Validated references shared by create and update.
struct UserLinks {
    kind: AccountKind,
    tenant_id: Option<Uuid>,
    role_id: Option<Uuid>,
    permissions: Option<PermissionSet>,
}

impl UserBody {
    async fn links(&self, settings: &PgPool) -> Result<UserLinks, ApiError> {
        let tenant_id = optional_uuid("tenantId", &self.tenant_id)?;
        let role_id = optional_uuid("roleId", &self.role_id)?;

        if let Some(tenant_id) = tenant_id {
            let live = find_tenant(settings, tenant_id).await?.is_some_and(|t| !t.is_deleted);
            if !live {
                return Err(ApiError::field("tenantId", "Tenant does not exist"));
            }
        }
        if let Some(role_id) = role_id {
            if find_role(settings, role_id).await?.is_none() {
                return Err(ApiError::field("roleId", "Role does not exist"));
            }
        }

        let permissions = self.permissions.as_deref().map(parse_permissions).transpose()?;

        Ok(UserLinks {
            kind: account_kind(tenant_id),
            tenant_id,
            role_id,
            permissions,
        })
    }
}

/// Staff accounts belong to a tenant or are super-admins; nothing else.
fn account_kind(tenant_id: Option<Uuid>) -> AccountKind {
    match tenant_id {
        Some(_) => AccountKind::TenantAdmin,
        None => AccountKind::SuperAdmin,
    }
}

fn repository(ctx: &AuthContext) -> Repository<StaffUser> {
    Repository::joined("users", "u", StaffUser::SELECT, "User", ctx.database.clone())
}

fn refuse_self(ctx: &AuthContext, id: Uuid) -> Result<(), ApiError> {
    if ctx.user_id == id {
        return Err(ApiError::bad_request("You cannot delete your own account"));
    }
    Ok(())
}

/// GET /admin/api/users - live staff accounts with tenant and role names
pub async fn user_list(Extension(ctx): Extension<AuthContext>) -> ApiResult<Vec<StaffUser>> {
    Ok(ApiResponse::success(repository(&ctx).select_live().await?))
}

/// GET /admin/api/users/:id
pub async fn user_show(Extension(ctx): Extension<AuthContext>, Path(id): Path<String>) -> ApiResult<StaffUser> {
    let id = parse_uuid("id", &id)?;
    Ok(ApiResponse::success(repository(&ctx).select_404(id).await?))
}

/**
 * POST /admin/api/users - Create a staff account
 *
 * Expected Input:
 * ```json
 * {
 *   "email": "editor@acme.test",
 *   "password": "secret",
 *   "fullName": "Ana Anić",
 *   "tenantId": "...",
 *   "roleId": "...",
 *   "permissions": null
 * }
 * ```
 *
 * Without `tenantId` the account is a super-admin. Duplicate emails are 409.
 */
pub async fn user_create(
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<UserBody>,
) -> ApiResult<StaffUser> {
    Required::new().text("email", &body.email).text("password", &body.password).check()?;
    let email = non_empty(&body.email).unwrap_or_default();
    let links = body.links(&ctx.database).await?;

    if email_taken(&ctx.database, email, None).await? {
        return Err(ApiError::conflict("A user with this email already exists"));
    }

    let password_hash = hash_password(body.password.as_deref().unwrap_or_default()).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ApiError::internal_server_error("Unable to store password")
    })?;

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (email, password_hash, full_name, account_kind, tenant_id, role_id, permissions)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(email)
    .bind(&password_hash)
    .bind(non_empty(&body.full_name))
    .bind(links.kind.as_str())
    .bind(links.tenant_id)
    .bind(links.role_id)
    .bind(links.permissions.as_ref().map(PermissionSet::to_stored))
    .fetch_one(&ctx.database)
    .await?;

    tracing::info!("Created {} account {} ({})", links.kind, id, email);
    Ok(ApiResponse::created(repository(&ctx).select_404(id).await?))
}

/// PUT /admin/api/users - Update a staff account. The password is re-hashed
/// only when a non-empty one is supplied.
pub async fn user_update(
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<UserBody>,
) -> ApiResult<StaffUser> {
    Required::new().text("id", &body.id).text("email", &body.email).check()?;
    let id = parse_uuid("id", body.id.as_deref().unwrap_or_default())?;
    let email = non_empty(&body.email).unwrap_or_default();
    let links = body.links(&ctx.database).await?;

    if email_taken(&ctx.database, email, Some(id)).await? {
        return Err(ApiError::conflict("A user with this email already exists"));
    }

    let password_hash = match body.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => Some(hash_password(password).map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            ApiError::internal_server_error("Unable to store password")
        })?),
        None => None,
    };

    let result = sqlx::query(
        r#"
        UPDATE users
        SET email = $2, password_hash = COALESCE($3, password_hash), full_name = $4,
            account_kind = $5, tenant_id = $6, role_id = $7, permissions = $8, updated_at = now()
        WHERE id = $1 AND is_deleted = FALSE
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(password_hash)
    .bind(non_empty(&body.full_name))
    .bind(links.kind.as_str())
    .bind(links.tenant_id)
    .bind(links.role_id)
    .bind(links.permissions.as_ref().map(PermissionSet::to_stored))
    .execute(&ctx.database)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("User not found"));
    }
    Ok(ApiResponse::success(repository(&ctx).select_404(id).await?))
}

/// DELETE /admin/api/users?id= - soft delete
pub async fn user_delete(
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Value> {
    let id = query.require()?;
    refuse_self(&ctx, id)?;
    repository(&ctx).soft_delete(id).await?;
    tracing::info!("User {} deleted by {}", id, ctx.user_id);
    Ok(ApiResponse::message("User deleted"))
}

/// DELETE /admin/api/users/:id/purge - remove the row permanently
pub async fn user_purge(Extension(ctx): Extension<AuthContext>, Path(id): Path<String>) -> ApiResult<Value> {
    let id = parse_uuid("id", &id)?;
    refuse_self(&ctx, id)?;
    repository(&ctx).hard_delete(id).await?;
    tracing::warn!("User {} purged by {}", id, ctx.user_id);
    Ok(ApiResponse::message("User permanently deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_tenant_presence() {
        assert_eq!(account_kind(None), AccountKind::SuperAdmin);
        assert_eq!(account_kind(Some(Uuid::new_v4())), AccountKind::TenantAdmin);
    }

    #[test]
    fn null_permissions_stay_unset() {
        let body: UserBody = serde_json::from_value(serde_json::json!({
            "email": "a@b.test",
            "permissions": null
        }))
        .unwrap();
        assert!(body.permissions.is_none());

        let body: UserBody = serde_json::from_value(serde_json::json!({
            "email": "a@b.test",
            "permissions": []
        }))
        .unwrap();
        assert_eq!(body.permissions, Some(vec![]));
    }
}
