// handlers/protected/attributes.rs - /admin/api/attributes handlers (manage_attributes)

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::AuthContext;
use crate::database::models::Attribute;
use crate::database::Repository;
use crate::error::ApiError;
use crate::handlers::utils::{non_empty, parse_uuid, IdQuery, Required};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct AttributeBody {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
}

fn repository(ctx: &AuthContext) -> Repository<Attribute> {
    Repository::new("attributes", "Attribute", ctx.database.clone())
}

/// GET /admin/api/attributes
pub async fn attribute_list(Extension(ctx): Extension<AuthContext>) -> ApiResult<Vec<Attribute>> {
    Ok(ApiResponse::success(repository(&ctx).select_live().await?))
}

/// GET /admin/api/attributes/:id
pub async fn attribute_show(Extension(ctx): Extension<AuthContext>, Path(id): Path<String>) -> ApiResult<Attribute> {
    let id = parse_uuid("id", &id)?;
    Ok(ApiResponse::success(repository(&ctx).select_404(id).await?))
}

/// POST /admin/api/attributes - `{ "name": "Color" }`
pub async fn attribute_create(
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<AttributeBody>,
) -> ApiResult<Attribute> {
    Required::new().text("name", &body.name).check()?;

    let attribute = sqlx::query_as::<_, Attribute>("INSERT INTO attributes (name) VALUES ($1) RETURNING *")
        .bind(non_empty(&body.name))
        .fetch_one(&ctx.database)
        .await?;

    Ok(ApiResponse::created(attribute))
}

/// PUT /admin/api/attributes
pub async fn attribute_update(
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<AttributeBody>,
) -> ApiResult<Attribute> {
    Required::new().text("id", &body.id).text("name", &body.name).check()?;
    let id = parse_uuid("id", body.id.as_deref().unwrap_or_default())?;

    let attribute = sqlx::query_as::<_, Attribute>(
        "UPDATE attributes SET name = $2 WHERE id = $1 AND is_deleted = FALSE RETURNING *",
    )
    .bind(id)
    .bind(non_empty(&body.name))
    .fetch_optional(&ctx.database)
    .await?
    .ok_or_else(|| ApiError::not_found("Attribute not found"))?;

    Ok(ApiResponse::success(attribute))
}

/// DELETE /admin/api/attributes?id=
pub async fn attribute_delete(
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Value> {
    repository(&ctx).soft_delete(query.require()?).await?;
    Ok(ApiResponse::message("Attribute deleted"))
}
