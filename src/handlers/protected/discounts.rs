// handlers/protected/discounts.rs - /admin/api/global-discounts handlers (manage_discounts)

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::database::models::{DiscountScope, GlobalDiscount};
use crate::database::Repository;
use crate::error::ApiError;
use crate::handlers::utils::{non_empty, optional_uuid, parse_uuid, uuid_list, IdQuery, Required};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountBody {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub discount_type: Option<String>,
    pub apply_to: Option<String>,
    pub min_purchase_amount: Option<Decimal>,
    pub discount_percentage: Option<Decimal>,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub product_ids: Vec<String>,
}

struct DiscountFields {
    scope: DiscountScope,
    product_ids: Vec<Uuid>,
    is_active: bool,
}

impl DiscountBody {
    fn fields(&self) -> Result<DiscountFields, ApiError> {
        let scope = match non_empty(&self.apply_to) {
            Some(raw) => raw.parse::<DiscountScope>().map_err(|e| ApiError::field("applyTo", e))?,
            None => DiscountScope::Global,
        };

        if let Some(pct) = self.discount_percentage {
            if pct < Decimal::ZERO || pct > Decimal::ONE_HUNDRED {
                return Err(ApiError::field("discountPercentage", "Must be between 0 and 100"));
            }
        }
        if matches!(self.min_purchase_amount, Some(min) if min < Decimal::ZERO) {
            return Err(ApiError::field("minPurchaseAmount", "Cannot be negative"));
        }

        let product_ids = uuid_list("productIds", &self.product_ids)?;
        if scope == DiscountScope::Products && product_ids.is_empty() {
            return Err(ApiError::field("productIds", "Select at least one product"));
        }

        Ok(DiscountFields {
            scope,
            product_ids,
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicableBody {
    pub product_id: Option<String>,
    pub amount: Option<Decimal>,
}

/// Best live discount for a purchase. Discounts do not stack.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountQuote {
    pub amount: Decimal,
    pub discount: Decimal,
    pub total_after_discount: Decimal,
    pub best: Option<GlobalDiscount>,
    pub applicable: Vec<GlobalDiscount>,
}

impl DiscountQuote {
    pub fn compute(discounts: Vec<GlobalDiscount>, product_id: Option<Uuid>, amount: Decimal) -> Self {
        let applicable: Vec<GlobalDiscount> =
            discounts.into_iter().filter(|d| d.applies_to(product_id, amount)).collect();

        // First one wins a tie
        let best = applicable.iter().fold(None::<&GlobalDiscount>, |best, d| match best {
            Some(b) if b.discount_for(amount) >= d.discount_for(amount) => Some(b),
            _ => Some(d),
        });
        let discount = best.map_or(Decimal::ZERO, |d| d.discount_for(amount));

        Self {
            amount,
            discount,
            total_after_discount: amount - discount,
            best: best.cloned(),
            applicable,
        }
    }
}

fn repository(ctx: &AuthContext) -> Repository<GlobalDiscount> {
    Repository::new("global_discounts", "Discount", ctx.database.clone())
}

/// GET /admin/api/global-discounts
pub async fn discount_list(Extension(ctx): Extension<AuthContext>) -> ApiResult<Vec<GlobalDiscount>> {
    Ok(ApiResponse::success(repository(&ctx).select_live().await?))
}

/// GET /admin/api/global-discounts/:id
pub async fn discount_show(
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<GlobalDiscount> {
    let id = parse_uuid("id", &id)?;
    Ok(ApiResponse::success(repository(&ctx).select_404(id).await?))
}

/**
 * POST /admin/api/global-discounts - Create discount
 *
 * `applyTo` defaults to `global`; `products` requires `productIds`.
 *
 * ```json
 * {
 *   "name": "Summer sale",
 *   "type": "percentage",
 *   "applyTo": "products",
 *   "discountPercentage": 15,
 *   "productIds": ["..."]
 * }
 * ```
 */
pub async fn discount_create(
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<DiscountBody>,
) -> ApiResult<GlobalDiscount> {
    Required::new().text("name", &body.name).text("type", &body.discount_type).check()?;
    let f = body.fields()?;

    let discount = sqlx::query_as::<_, GlobalDiscount>(
        r#"
        INSERT INTO global_discounts
            (name, description, discount_type, apply_to, min_purchase_amount, discount_percentage, is_active, product_ids)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(non_empty(&body.name))
    .bind(non_empty(&body.description))
    .bind(non_empty(&body.discount_type))
    .bind(f.scope.as_str())
    .bind(body.min_purchase_amount)
    .bind(body.discount_percentage)
    .bind(f.is_active)
    .bind(&f.product_ids)
    .fetch_one(&ctx.database)
    .await?;

    tracing::info!("Created discount {} ({}) in {}", discount.id, discount.apply_to, ctx.db_name);
    Ok(ApiResponse::created(discount))
}

/// PUT /admin/api/global-discounts
pub async fn discount_update(
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<DiscountBody>,
) -> ApiResult<GlobalDiscount> {
    Required::new()
        .text("id", &body.id)
        .text("name", &body.name)
        .text("type", &body.discount_type)
        .check()?;
    let id = parse_uuid("id", body.id.as_deref().unwrap_or_default())?;
    let f = body.fields()?;

    let discount = sqlx::query_as::<_, GlobalDiscount>(
        r#"
        UPDATE global_discounts
        SET name = $2, description = $3, discount_type = $4, apply_to = $5, min_purchase_amount = $6,
            discount_percentage = $7, is_active = $8, product_ids = $9, updated_at = now()
        WHERE id = $1 AND is_deleted = FALSE
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(non_empty(&body.name))
    .bind(non_empty(&body.description))
    .bind(non_empty(&body.discount_type))
    .bind(f.scope.as_str())
    .bind(body.min_purchase_amount)
    .bind(body.discount_percentage)
    .bind(f.is_active)
    .bind(&f.product_ids)
    .fetch_optional(&ctx.database)
    .await?
    .ok_or_else(|| ApiError::not_found("Discount not found"))?;

    Ok(ApiResponse::success(discount))
}

/// DELETE /admin/api/global-discounts?id=
pub async fn discount_delete(
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Value> {
    repository(&ctx).soft_delete(query.require()?).await?;
    Ok(ApiResponse::message("Discount deleted"))
}

/**
 * POST /admin/api/global-discounts/applicable - Price a purchase
 *
 * ```json
 * { "productId": "...", "amount": 120.00 }
 * ```
 *
 * Without `productId` only store-wide discounts can apply.
 */
pub async fn discount_applicable(
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<ApplicableBody>,
) -> ApiResult<DiscountQuote> {
    Required::new().present("amount", &body.amount).check()?;
    let amount = body.amount.unwrap_or_default();
    if amount < Decimal::ZERO {
        return Err(ApiError::field("amount", "Cannot be negative"));
    }
    let product_id = optional_uuid("productId", &body.product_id)?;

    let discounts = repository(&ctx).select_live().await?;
    Ok(ApiResponse::success(DiscountQuote::compute(discounts, product_id, amount)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_active_global_discount() {
        let f = DiscountBody::default().fields().unwrap();
        assert_eq!(f.scope, DiscountScope::Global);
        assert!(f.is_active);
    }

    #[test]
    fn product_scope_needs_products() {
        let body = DiscountBody {
            apply_to: Some("products".into()),
            ..Default::default()
        };
        assert!(body.fields().is_err());

        let body = DiscountBody {
            apply_to: Some("products".into()),
            product_ids: vec![Uuid::new_v4().to_string()],
            ..Default::default()
        };
        assert_eq!(body.fields().unwrap().scope, DiscountScope::Products);
    }

    #[test]
    fn percentage_must_be_in_range() {
        let body = DiscountBody {
            discount_percentage: Some(Decimal::from(120)),
            ..Default::default()
        };
        assert!(body.fields().is_err());

        let body = DiscountBody {
            apply_to: Some("everything".into()),
            ..Default::default()
        };
        assert!(body.fields().is_err());
    }

    fn stored(scope: &str, pct: i64, products: Vec<Uuid>) -> GlobalDiscount {
        GlobalDiscount {
            id: Uuid::new_v4(),
            name: format!("{} {}%", scope, pct),
            description: None,
            discount_type: "percentage".into(),
            apply_to: scope.into(),
            min_purchase_amount: None,
            discount_percentage: Some(Decimal::from(pct)),
            is_active: true,
            product_ids: products,
            is_deleted: false,
            created_at: chrono::Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn quote_picks_largest_applicable_discount() {
        let product = Uuid::new_v4();
        let mut inactive = stored("global", 50, vec![]);
        inactive.is_active = false;
        let discounts = vec![
            stored("global", 10, vec![]),
            stored("products", 25, vec![product]),
            stored("products", 40, vec![Uuid::new_v4()]),
            inactive,
        ];

        let quote = DiscountQuote::compute(discounts, Some(product), Decimal::from(200));
        assert_eq!(quote.applicable.len(), 2);
        assert_eq!(quote.discount, Decimal::from(50));
        assert_eq!(quote.total_after_discount, Decimal::from(150));
        assert_eq!(quote.best.unwrap().discount_percentage, Some(Decimal::from(25)));
    }

    #[test]
    fn quote_without_product_only_uses_global_discounts() {
        let discounts = vec![stored("products", 30, vec![Uuid::new_v4()])];
        let quote = DiscountQuote::compute(discounts, None, Decimal::from(80));
        assert!(quote.best.is_none());
        assert_eq!(quote.discount, Decimal::ZERO);
        assert_eq!(quote.total_after_discount, Decimal::from(80));
    }
}
