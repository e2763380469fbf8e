// handlers/protected/products.rs - /admin/api/products handlers (manage_products)

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::database::models::Product;
use crate::database::{ListQuery, PageRequest, Paginated, Repository};
use crate::error::ApiError;
use crate::handlers::utils::{non_empty, optional_uuid, parse_uuid, uuid_list, IdQuery, Required};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductBody {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub category_id: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_promoted: bool,
    #[serde(default)]
    pub related_products: Vec<String>,
    pub attributes: Option<Value>,
}

struct ProductFields {
    name: String,
    description: Option<String>,
    price: Decimal,
    sale_price: Option<Decimal>,
    category_id: Option<Uuid>,
    image: Option<String>,
    images: Vec<String>,
    is_promoted: bool,
    related_products: Vec<Uuid>,
    attributes: Value,
}

impl ProductBody {
    fn fields(&self) -> Result<ProductFields, ApiError> {
        let price = self.price.unwrap_or(Decimal::ZERO);
        if price < Decimal::ZERO {
            return Err(ApiError::field("price", "Price cannot be negative"));
        }
        if matches!(self.sale_price, Some(sale) if sale < Decimal::ZERO) {
            return Err(ApiError::field("salePrice", "Sale price cannot be negative"));
        }

        let attributes = match &self.attributes {
            None | Some(Value::Null) => Value::Array(vec![]),
            Some(value @ Value::Array(_)) => value.clone(),
            Some(_) => return Err(ApiError::field("attributes", "Must be an array")),
        };

        Ok(ProductFields {
            name: non_empty(&self.name).unwrap_or_default().to_string(),
            description: non_empty(&self.description).map(str::to_string),
            price,
            sale_price: self.sale_price,
            category_id: optional_uuid("categoryId", &self.category_id)?,
            image: non_empty(&self.image).map(str::to_string),
            images: self.images.clone(),
            is_promoted: self.is_promoted,
            related_products: uuid_list("relatedProducts", &self.related_products)?,
            attributes,
        })
    }
}

fn repository(ctx: &AuthContext) -> Repository<Product> {
    Repository::joined("products", "p", Product::SELECT, "Product", ctx.database.clone())
}

/**
 * GET /admin/api/products - Paginated product list
 *
 * Query: `search` (name or description), `page`, `perPage`.
 *
 * ```json
 * {
 *   "success": true,
 *   "data": {
 *     "items": [{ "id": "...", "name": "Lamp", "categoryName": "Lighting", "price": "49.90" }],
 *     "pagination": { "page": 1, "perPage": 20, "total": 1, "totalPages": 1 }
 *   }
 * }
 * ```
 */
pub async fn product_list(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Paginated<Product>> {
    let page = PageRequest::from_query(&query, &state.config.api);
    let pattern = page.search_pattern();

    let filter = "p.is_deleted = FALSE AND ($1::text IS NULL OR p.name ILIKE $1 OR p.description ILIKE $1)";
    let sql = format!(
        "{} WHERE {} ORDER BY p.created_at DESC LIMIT $2 OFFSET $3",
        Product::SELECT,
        filter
    );
    let items = sqlx::query_as::<_, Product>(&sql)
        .bind(&pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&ctx.database)
        .await?;

    let count_sql = format!("SELECT COUNT(*) FROM products p WHERE {}", filter);
    let total: (i64,) = sqlx::query_as(&count_sql)
        .bind(&pattern)
        .fetch_one(&ctx.database)
        .await?;

    Ok(ApiResponse::success(Paginated::new(items, &page, total.0)))
}

/// GET /admin/api/products/:id
pub async fn product_show(Extension(ctx): Extension<AuthContext>, Path(id): Path<String>) -> ApiResult<Product> {
    let id = parse_uuid("id", &id)?;
    Ok(ApiResponse::success(repository(&ctx).select_404(id).await?))
}

/**
 * POST /admin/api/products - Create product
 *
 * Only `name` is required; `price` defaults to 0.
 *
 * ```json
 * { "name": "Lamp", "price": 49.90, "categoryId": "...", "images": [], "attributes": [] }
 * ```
 */
pub async fn product_create(
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<ProductBody>,
) -> ApiResult<Product> {
    Required::new().text("name", &body.name).check()?;
    let f = body.fields()?;

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO products
            (name, description, price, sale_price, category_id, image, images, is_promoted, related_products, attributes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id
        "#,
    )
    .bind(&f.name)
    .bind(&f.description)
    .bind(f.price)
    .bind(f.sale_price)
    .bind(f.category_id)
    .bind(&f.image)
    .bind(&f.images)
    .bind(f.is_promoted)
    .bind(&f.related_products)
    .bind(&f.attributes)
    .fetch_one(&ctx.database)
    .await?;

    tracing::info!("Created product {} in {}", id, ctx.db_name);
    Ok(ApiResponse::created(repository(&ctx).select_404(id).await?))
}

/// PUT /admin/api/products - Replace product fields. Requires `id`, `name`,
/// `description`, `categoryId` and `price`.
pub async fn product_update(
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<ProductBody>,
) -> ApiResult<Product> {
    Required::new()
        .text("id", &body.id)
        .text("name", &body.name)
        .text("description", &body.description)
        .text("categoryId", &body.category_id)
        .present("price", &body.price)
        .check()?;
    let id = parse_uuid("id", body.id.as_deref().unwrap_or_default())?;
    let f = body.fields()?;

    let result = sqlx::query(
        r#"
        UPDATE products
        SET name = $2, description = $3, price = $4, sale_price = $5, category_id = $6,
            image = $7, images = $8, is_promoted = $9, related_products = $10, attributes = $11
        WHERE id = $1 AND is_deleted = FALSE
        "#,
    )
    .bind(id)
    .bind(&f.name)
    .bind(&f.description)
    .bind(f.price)
    .bind(f.sale_price)
    .bind(f.category_id)
    .bind(&f.image)
    .bind(&f.images)
    .bind(f.is_promoted)
    .bind(&f.related_products)
    .bind(&f.attributes)
    .execute(&ctx.database)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Product not found"));
    }
    Ok(ApiResponse::success(repository(&ctx).select_404(id).await?))
}

/// DELETE /admin/api/products?id=
pub async fn product_delete(
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Value> {
    let id = query.require()?;
    repository(&ctx).soft_delete(id).await?;
    tracing::info!("Deleted product {} in {}", id, ctx.db_name);
    Ok(ApiResponse::message("Product deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_underscore_id_and_defaults() {
        let body: ProductBody = serde_json::from_value(json!({
            "_id": "0b9c7c3e-5d5e-4d7a-9a43-1d8f0e6f2b11",
            "name": "Lamp",
            "price": "12.50",
            "categoryId": ""
        }))
        .unwrap();
        assert!(body.id.is_some());

        let f = body.fields().unwrap();
        assert_eq!(f.category_id, None);
        assert_eq!(f.attributes, json!([]));
        assert!(!f.is_promoted);
    }

    #[test]
    fn rejects_negative_prices_and_bad_attributes() {
        let body = ProductBody {
            price: Some(Decimal::NEGATIVE_ONE),
            ..Default::default()
        };
        assert!(body.fields().is_err());

        let body = ProductBody {
            attributes: Some(json!({"color": "red"})),
            ..Default::default()
        };
        assert!(body.fields().is_err());
    }
}
