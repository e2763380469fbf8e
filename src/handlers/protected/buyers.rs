// handlers/protected/buyers.rs - /admin/api/buyers handlers (tenant users with manage_buyers)
//
// Read-only view of storefront customers. Password hashes are never selected.

use axum::{
    extract::{Path, Query, State},
    Extension,
};

use crate::auth::AuthContext;
use crate::database::models::Buyer;
use crate::database::{ListQuery, PageRequest, Paginated};
use crate::error::ApiError;
use crate::handlers::utils::parse_uuid;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

const FILTER: &str = "($1::text IS NULL OR email ILIKE $1 OR name ILIKE $1 OR lastname ILIKE $1)";

/// GET /admin/api/buyers?search=&page=&perPage=
pub async fn buyer_list(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Paginated<Buyer>> {
    let page = PageRequest::from_query(&query, &state.config.api);
    let pattern = page.search_pattern();

    let sql = format!("{} WHERE {} ORDER BY created_at DESC LIMIT $2 OFFSET $3", Buyer::SELECT, FILTER);
    let items = sqlx::query_as::<_, Buyer>(&sql)
        .bind(&pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&ctx.database)
        .await?;

    let count_sql = format!("SELECT COUNT(*) FROM users WHERE {}", FILTER);
    let total: (i64,) = sqlx::query_as(&count_sql)
        .bind(&pattern)
        .fetch_one(&ctx.database)
        .await?;

    Ok(ApiResponse::success(Paginated::new(items, &page, total.0)))
}

/// GET /admin/api/buyers/:id
pub async fn buyer_show(Extension(ctx): Extension<AuthContext>, Path(id): Path<String>) -> ApiResult<Buyer> {
    let id = parse_uuid("id", &id)?;
    let sql = format!("{} WHERE id = $1", Buyer::SELECT);
    let buyer = sqlx::query_as::<_, Buyer>(&sql)
        .bind(id)
        .fetch_optional(&ctx.database)
        .await?
        .ok_or_else(|| ApiError::not_found("Buyer not found"))?;

    Ok(ApiResponse::success(buyer))
}
