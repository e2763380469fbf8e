// handlers/protected/categories.rs - /admin/api/categories handlers (manage_categories)

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::AuthContext;
use crate::database::models::Category;
use crate::database::Repository;
use crate::error::ApiError;
use crate::handlers::utils::{non_empty, parse_uuid, IdQuery, Required};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBody {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

fn repository(ctx: &AuthContext) -> Repository<Category> {
    Repository::new("categories", "Category", ctx.database.clone())
}

/// GET /admin/api/categories
pub async fn category_list(Extension(ctx): Extension<AuthContext>) -> ApiResult<Vec<Category>> {
    Ok(ApiResponse::success(repository(&ctx).select_live().await?))
}

/// GET /admin/api/categories/:id
pub async fn category_show(Extension(ctx): Extension<AuthContext>, Path(id): Path<String>) -> ApiResult<Category> {
    let id = parse_uuid("id", &id)?;
    Ok(ApiResponse::success(repository(&ctx).select_404(id).await?))
}

/**
 * POST /admin/api/categories - Create category
 *
 * ```json
 * { "name": "Lighting", "description": "Lamps and bulbs", "image": "https://..." }
 * ```
 */
pub async fn category_create(
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<CategoryBody>,
) -> ApiResult<Category> {
    Required::new().text("name", &body.name).check()?;

    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (name, description, image) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(non_empty(&body.name))
    .bind(non_empty(&body.description))
    .bind(non_empty(&body.image))
    .fetch_one(&ctx.database)
    .await?;

    Ok(ApiResponse::created(category))
}

/// PUT /admin/api/categories
pub async fn category_update(
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<CategoryBody>,
) -> ApiResult<Category> {
    Required::new().text("id", &body.id).text("name", &body.name).check()?;
    let id = parse_uuid("id", body.id.as_deref().unwrap_or_default())?;

    let category = sqlx::query_as::<_, Category>(
        r#"
        UPDATE categories SET name = $2, description = $3, image = $4
        WHERE id = $1 AND is_deleted = FALSE
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(non_empty(&body.name))
    .bind(non_empty(&body.description))
    .bind(non_empty(&body.image))
    .fetch_optional(&ctx.database)
    .await?
    .ok_or_else(|| ApiError::not_found("Category not found"))?;

    Ok(ApiResponse::success(category))
}

/// DELETE /admin/api/categories?id=
pub async fn category_delete(
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Value> {
    repository(&ctx).soft_delete(query.require()?).await?;
    Ok(ApiResponse::message("Category deleted"))
}
