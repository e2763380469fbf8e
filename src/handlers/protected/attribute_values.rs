// handlers/protected/attribute_values.rs - /admin/api/attribute-values handlers (manage_attribute_values)

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::database::models::{Attribute, AttributeValue};
use crate::database::Repository;
use crate::error::ApiError;
use crate::handlers::utils::{non_empty, optional_uuid, parse_uuid, IdQuery, Required};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeValueBody {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub attribute_id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeValueFilter {
    pub attribute_id: Option<String>,
}

fn repository(ctx: &AuthContext) -> Repository<AttributeValue> {
    Repository::joined("attribute_values", "v", AttributeValue::SELECT, "Attribute value", ctx.database.clone())
}

/// The owning attribute must exist and be live.
async fn live_attribute(ctx: &AuthContext, raw: &Option<String>) -> Result<Uuid, ApiError> {
    let id = parse_uuid("attributeId", raw.as_deref().unwrap_or_default())?;
    let exists = Repository::<Attribute>::new("attributes", "Attribute", ctx.database.clone())
        .select_one(id)
        .await?
        .is_some();
    if !exists {
        return Err(ApiError::field("attributeId", "Attribute does not exist"));
    }
    Ok(id)
}

/// GET /admin/api/attribute-values[?attributeId=]
pub async fn attribute_value_list(
    Extension(ctx): Extension<AuthContext>,
    Query(filter): Query<AttributeValueFilter>,
) -> ApiResult<Vec<AttributeValue>> {
    let values = match optional_uuid("attributeId", &filter.attribute_id)? {
        Some(attribute_id) => {
            let sql = format!(
                "{} WHERE v.is_deleted = FALSE AND v.attribute_id = $1 ORDER BY v.created_at DESC",
                AttributeValue::SELECT
            );
            sqlx::query_as::<_, AttributeValue>(&sql)
                .bind(attribute_id)
                .fetch_all(&ctx.database)
                .await?
        }
        None => repository(&ctx).select_live().await?,
    };

    Ok(ApiResponse::success(values))
}

/// GET /admin/api/attribute-values/:id
pub async fn attribute_value_show(
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<AttributeValue> {
    let id = parse_uuid("id", &id)?;
    Ok(ApiResponse::success(repository(&ctx).select_404(id).await?))
}

/// POST /admin/api/attribute-values - `{ "attributeId": "...", "name": "Red" }`
pub async fn attribute_value_create(
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<AttributeValueBody>,
) -> ApiResult<AttributeValue> {
    Required::new()
        .text("attributeId", &body.attribute_id)
        .text("name", &body.name)
        .check()?;
    let attribute_id = live_attribute(&ctx, &body.attribute_id).await?;

    let (id,): (Uuid,) =
        sqlx::query_as("INSERT INTO attribute_values (attribute_id, name) VALUES ($1, $2) RETURNING id")
            .bind(attribute_id)
            .bind(non_empty(&body.name))
            .fetch_one(&ctx.database)
            .await?;

    Ok(ApiResponse::created(repository(&ctx).select_404(id).await?))
}

/// PUT /admin/api/attribute-values
pub async fn attribute_value_update(
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<AttributeValueBody>,
) -> ApiResult<AttributeValue> {
    Required::new()
        .text("id", &body.id)
        .text("attributeId", &body.attribute_id)
        .text("name", &body.name)
        .check()?;
    let id = parse_uuid("id", body.id.as_deref().unwrap_or_default())?;
    let attribute_id = live_attribute(&ctx, &body.attribute_id).await?;

    let result = sqlx::query(
        "UPDATE attribute_values SET attribute_id = $2, name = $3 WHERE id = $1 AND is_deleted = FALSE",
    )
    .bind(id)
    .bind(attribute_id)
    .bind(non_empty(&body.name))
    .execute(&ctx.database)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Attribute value not found"));
    }
    Ok(ApiResponse::success(repository(&ctx).select_404(id).await?))
}

/// DELETE /admin/api/attribute-values?id=
pub async fn attribute_value_delete(
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Value> {
    repository(&ctx).soft_delete(query.require()?).await?;
    Ok(ApiResponse::message("Attribute value deleted"))
}
