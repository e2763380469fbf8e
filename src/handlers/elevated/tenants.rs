// handlers/elevated/tenants.rs - /admin/api/tenants handlers (super-admin only)
//
// Queries run against the caller's resolved database, which for a
// super-admin is always the settings database.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::{AuthContext, PermissionSet};
use crate::database::models::Tenant;
use crate::database::Repository;
use crate::error::ApiError;
use crate::handlers::utils::{non_empty, parse_permissions, parse_uuid, IdQuery, Required};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{NewTenant, TenantService};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantBody {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub db_name: Option<String>,
    pub business_email: Option<String>,
    pub business_email_password: Option<String>,
    pub phone_number: Option<String>,
    pub is_active: Option<bool>,
    pub permissions: Option<Vec<String>>,
}

impl TenantBody {
    fn permission_set(&self) -> Result<PermissionSet, ApiError> {
        parse_permissions(self.permissions.as_deref().unwrap_or_default())
    }
}

fn repository(ctx: &AuthContext) -> Repository<Tenant> {
    Repository::new("tenants", "Tenant", ctx.database.clone())
}

/// GET /admin/api/tenants
pub async fn tenant_list(Extension(ctx): Extension<AuthContext>) -> ApiResult<Vec<Tenant>> {
    Ok(ApiResponse::success(repository(&ctx).select_live().await?))
}

/// GET /admin/api/tenants/:id
pub async fn tenant_show(Extension(ctx): Extension<AuthContext>, Path(id): Path<String>) -> ApiResult<Tenant> {
    let id = parse_uuid("id", &id)?;
    Ok(ApiResponse::success(repository(&ctx).select_404(id).await?))
}

/**
 * POST /admin/api/tenants - Register a tenant and provision its database
 *
 * Expected Input:
 * ```json
 * {
 *   "name": "Acme",
 *   "dbName": "acme_shop",
 *   "businessEmail": "shop@acme.test",
 *   "businessEmailPassword": "app-password",
 *   "phoneNumber": "+381...",
 *   "isActive": true,
 *   "permissions": ["manage_products", "manage_orders"]
 * }
 * ```
 *
 * The database is created and migrated right away. If that step fails the
 * tenant stays registered and the failure is only logged.
 */
pub async fn tenant_create(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<TenantBody>,
) -> ApiResult<Tenant> {
    Required::new().text("name", &body.name).text("dbName", &body.db_name).check()?;
    let permissions = body.permission_set()?;

    let service = TenantService::new(ctx.database.clone(), state.databases.clone());
    let tenant = service
        .create_tenant(NewTenant {
            name: non_empty(&body.name).unwrap_or_default().to_string(),
            database_name: non_empty(&body.db_name).map(str::to_string),
            business_email: non_empty(&body.business_email).map(str::to_string),
            business_email_password: non_empty(&body.business_email_password).map(str::to_string),
            phone_number: non_empty(&body.phone_number).map(str::to_string),
            is_active: body.is_active.unwrap_or(true),
            permissions,
        })
        .await?;

    Ok(ApiResponse::created(tenant))
}

/// PUT /admin/api/tenants - Update tenant settings.
///
/// The mailbox password is kept when omitted. A changed `dbName` is
/// provisioned like a new tenant; data is not moved between databases.
pub async fn tenant_update(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<TenantBody>,
) -> ApiResult<Tenant> {
    Required::new()
        .text("id", &body.id)
        .text("name", &body.name)
        .text("dbName", &body.db_name)
        .check()?;
    let id = parse_uuid("id", body.id.as_deref().unwrap_or_default())?;
    let name = non_empty(&body.name).unwrap_or_default();
    let db_name = non_empty(&body.db_name).unwrap_or_default();
    TenantService::validate_tenant_name(name)?;
    if !state.databases.is_tenant_db_name(db_name) {
        return Err(ApiError::field("dbName", format!("'{}' is not a valid database name", db_name)));
    }
    let permissions = body.permission_set()?;

    let current = repository(&ctx).select_404(id).await?;

    let tenant = sqlx::query_as::<_, Tenant>(
        r#"
        UPDATE tenants
        SET name = $2, database_name = $3, business_email = $4,
            business_email_password = COALESCE($5, business_email_password),
            phone_number = $6, is_active = $7, permissions = $8, updated_at = now()
        WHERE id = $1 AND is_deleted = FALSE
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(db_name)
    .bind(non_empty(&body.business_email))
    .bind(non_empty(&body.business_email_password))
    .bind(non_empty(&body.phone_number))
    .bind(body.is_active.unwrap_or(current.is_active))
    .bind(permissions.to_stored())
    .fetch_optional(&ctx.database)
    .await?
    .ok_or_else(|| ApiError::not_found("Tenant not found"))?;

    if tenant.database_name != current.database_name {
        tracing::info!(
            "Tenant {} moved from {} to {}",
            tenant.id,
            current.database_name,
            tenant.database_name
        );
        let service = TenantService::new(ctx.database.clone(), state.databases.clone());
        if let Err(e) = service.provision_database(&tenant.database_name).await {
            tracing::warn!("Tenant {}: database {} not provisioned: {}", tenant.id, tenant.database_name, e);
        }
    }

    Ok(ApiResponse::success(tenant))
}

/// DELETE /admin/api/tenants?id= - soft delete; the tenant database is kept
/// and its admins can no longer log in.
pub async fn tenant_delete(
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Value> {
    let id = query.require()?;
    repository(&ctx).soft_delete(id).await?;
    tracing::info!("Tenant {} deleted by {}", id, ctx.user_id);
    Ok(ApiResponse::message("Tenant deleted"))
}
