// handlers/protected/orders.rs - /admin/api/orders handlers (manage_orders)

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::database::models::order::order_total;
use crate::database::models::{Order, OrderDetail, OrderItem, OrderStatus};
use crate::database::{ListQuery, PageRequest, Paginated};
use crate::error::ApiError;
use crate::handlers::utils::{non_empty, parse_uuid, Required};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::notifier::notify_status_change;
use crate::state::AppState;

/// Paging fields are repeated here rather than flattened; flattening breaks
/// numeric parsing of query strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
    #[serde(alias = "per_page", alias = "limit")]
    pub per_page: Option<u32>,
    pub status: Option<String>,
}

impl OrderListQuery {
    fn list(&self) -> ListQuery {
        ListQuery {
            search: self.search.clone(),
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ItemChange {
    #[serde(alias = "_id")]
    pub id: String,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct ItemsBody {
    #[serde(default)]
    pub items: Vec<ItemChange>,
}

fn parse_status(raw: &str) -> Result<OrderStatus, ApiError> {
    raw.trim().parse().map_err(|e: String| ApiError::field("status", e))
}

async fn load_detail(pool: &PgPool, id: Uuid) -> Result<OrderDetail, ApiError> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Order not found"))?;

    let sql = format!("{} WHERE i.order_id = $1 ORDER BY p.name", OrderItem::SELECT);
    let order_items = sqlx::query_as::<_, OrderItem>(&sql).bind(id).fetch_all(pool).await?;

    Ok(OrderDetail { order, order_items })
}

/**
 * GET /admin/api/orders - Paginated order list, newest first
 *
 * Query: `search` (customer name or email), `status` (label or slug),
 * `page`, `perPage`.
 */
pub async fn order_list(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<Paginated<Order>> {
    let page = PageRequest::from_query(&query.list(), &state.config.api);
    let pattern = page.search_pattern();
    let status = non_empty(&query.status).map(parse_status).transpose()?;

    let filter = r#"($1::text IS NULL OR customer_name ILIKE $1 OR customer_email ILIKE $1)
        AND ($2::text IS NULL OR status = $2)"#;

    let sql = format!(
        "SELECT * FROM orders WHERE {} ORDER BY order_time DESC LIMIT $3 OFFSET $4",
        filter
    );
    let items = sqlx::query_as::<_, Order>(&sql)
        .bind(&pattern)
        .bind(status.map(|s| s.as_str()))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&ctx.database)
        .await?;

    let count_sql = format!("SELECT COUNT(*) FROM orders WHERE {}", filter);
    let total: (i64,) = sqlx::query_as(&count_sql)
        .bind(&pattern)
        .bind(status.map(|s| s.as_str()))
        .fetch_one(&ctx.database)
        .await?;

    Ok(ApiResponse::success(Paginated::new(items, &page, total.0)))
}

/**
 * GET /admin/api/orders/:id - Order with its line items
 *
 * ```json
 * {
 *   "success": true,
 *   "data": {
 *     "id": "...",
 *     "status": "U pripremi",
 *     "customerName": "Ana",
 *     "total": "53.00",
 *     "orderItems": [{ "productName": "Lamp", "quantity": 2, "unitPrice": "12.50", "subtotal": "25.00" }]
 *   }
 * }
 * ```
 */
pub async fn order_show(Extension(ctx): Extension<AuthContext>, Path(id): Path<String>) -> ApiResult<OrderDetail> {
    let id = parse_uuid("id", &id)?;
    Ok(ApiResponse::success(load_detail(&ctx.database, id).await?))
}

/**
 * PUT /admin/api/orders - Change order status
 *
 * ```json
 * { "id": "...", "status": "Poslata" }
 * ```
 *
 * The customer is emailed after the update commits. Mail failures are
 * logged only; the response reflects the status change alone.
 */
pub async fn order_update_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<StatusBody>,
) -> ApiResult<OrderDetail> {
    Required::new().text("id", &body.id).text("status", &body.status).check()?;
    let id = parse_uuid("id", body.id.as_deref().unwrap_or_default())?;
    let status = parse_status(body.status.as_deref().unwrap_or_default())?;

    let result = sqlx::query("UPDATE orders SET status = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(status)
        .execute(&ctx.database)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Order not found"));
    }
    tracing::info!("Order {} in {} set to {}", id, ctx.db_name, status.as_str());

    let detail = load_detail(&ctx.database, id).await?;

    match ctx.tenant_id {
        Some(tenant_id) => match state.databases.settings_pool().await {
            Ok(settings) => notify_status_change(state.mailer.as_ref(), &settings, tenant_id, &detail).await,
            Err(e) => tracing::warn!("Order {}: settings database unavailable, skipping status email: {}", id, e),
        },
        None => tracing::debug!("Order {} updated by super-admin, no tenant mailbox to send from", id),
    }

    Ok(ApiResponse::success(detail))
}

/**
 * PUT /admin/api/orders/:id - Edit line item quantities
 *
 * ```json
 * { "items": [{ "id": "...", "quantity": 3 }] }
 * ```
 *
 * Subtotals and the order total are recomputed in one transaction.
 */
pub async fn order_update_items(
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(body): Json<ItemsBody>,
) -> ApiResult<OrderDetail> {
    let order_id = parse_uuid("id", &id)?;
    if body.items.is_empty() {
        return Err(ApiError::missing_fields(&["items"]));
    }

    let mut changes = Vec::with_capacity(body.items.len());
    for change in &body.items {
        if change.quantity < 1 {
            return Err(ApiError::field("quantity", "Quantity must be at least 1"));
        }
        changes.push((parse_uuid("items.id", &change.id)?, change.quantity));
    }

    let mut tx = ctx.database.begin().await?;

    let locked: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM orders WHERE id = $1 FOR UPDATE")
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?;
    if locked.is_none() {
        return Err(ApiError::not_found("Order not found"));
    }

    let sql = format!("{} WHERE i.order_id = $1 FOR UPDATE OF i", OrderItem::SELECT);
    let mut items = sqlx::query_as::<_, OrderItem>(&sql)
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;

    for (item_id, quantity) in changes {
        let item = items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| ApiError::not_found(format!("Order item {} not found", item_id)))?;
        item.set_quantity(quantity);

        sqlx::query("UPDATE order_items SET quantity = $2, subtotal = $3 WHERE id = $1")
            .bind(item.id)
            .bind(item.quantity)
            .bind(item.subtotal)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query("UPDATE orders SET total = $2, updated_at = now() WHERE id = $1")
        .bind(order_id)
        .bind(order_total(&items))
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::info!("Order {} in {}: quantities updated", order_id, ctx.db_name);

    Ok(ApiResponse::success(load_detail(&ctx.database, order_id).await?))
}
