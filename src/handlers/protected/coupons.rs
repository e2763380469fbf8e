// handlers/protected/coupons.rs - /admin/api/coupons handlers (manage_coupons)

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::database::models::{Coupon, CouponType};
use crate::database::Repository;
use crate::error::ApiError;
use crate::handlers::utils::{non_empty, parse_uuid, IdQuery, Required};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponBody {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub coupon_type: Option<String>,
    pub discount_value: Option<Decimal>,
    pub min_purchase_amount: Option<Decimal>,
    pub max_usage_count: Option<i32>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

struct CouponFields {
    code: String,
    kind: CouponType,
    discount_value: Decimal,
    is_active: bool,
}

impl CouponBody {
    fn required(&self) -> Required {
        Required::new()
            .text("code", &self.code)
            .text("name", &self.name)
            .text("type", &self.coupon_type)
            .present("discountValue", &self.discount_value)
    }

    fn fields(&self) -> Result<CouponFields, ApiError> {
        let kind = non_empty(&self.coupon_type)
            .unwrap_or_default()
            .parse::<CouponType>()
            .map_err(|e| ApiError::field("type", e))?;

        let discount_value = self.discount_value.unwrap_or_default();
        if discount_value <= Decimal::ZERO {
            return Err(ApiError::field("discountValue", "Must be greater than 0"));
        }
        if kind == CouponType::Percentage && discount_value > Decimal::ONE_HUNDRED {
            return Err(ApiError::field("discountValue", "Percentage cannot exceed 100"));
        }
        if matches!(self.min_purchase_amount, Some(min) if min <= Decimal::ZERO) {
            return Err(ApiError::field("minPurchaseAmount", "Must be greater than 0"));
        }
        if matches!(self.max_usage_count, Some(max) if max <= 0) {
            return Err(ApiError::field("maxUsageCount", "Must be greater than 0"));
        }

        Ok(CouponFields {
            code: Coupon::normalize_code(non_empty(&self.code).unwrap_or_default()),
            kind,
            discount_value,
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

fn repository(ctx: &AuthContext) -> Repository<Coupon> {
    Repository::new("coupons", "Coupon", ctx.database.clone())
}

async fn ensure_code_free(pool: &PgPool, code: &str, except: Option<Uuid>) -> Result<(), ApiError> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM coupons WHERE code = $1 AND is_deleted = FALSE AND ($2::uuid IS NULL OR id <> $2)",
    )
    .bind(code)
    .bind(except)
    .fetch_one(pool)
    .await?;

    if count > 0 {
        return Err(ApiError::conflict(format!("Coupon code {} already exists", code)));
    }
    Ok(())
}

/// GET /admin/api/coupons
pub async fn coupon_list(Extension(ctx): Extension<AuthContext>) -> ApiResult<Vec<Coupon>> {
    Ok(ApiResponse::success(repository(&ctx).select_live().await?))
}

/// GET /admin/api/coupons/:id
pub async fn coupon_show(Extension(ctx): Extension<AuthContext>, Path(id): Path<String>) -> ApiResult<Coupon> {
    let id = parse_uuid("id", &id)?;
    Ok(ApiResponse::success(repository(&ctx).select_404(id).await?))
}

/**
 * POST /admin/api/coupons - Create coupon
 *
 * Codes are stored upper-cased and must be unique among live coupons.
 *
 * ```json
 * {
 *   "code": "spring10",
 *   "name": "Spring",
 *   "type": "percentage",
 *   "discountValue": 10,
 *   "minPurchaseAmount": 50,
 *   "maxUsageCount": 100,
 *   "expiryDate": "2026-06-01T00:00:00Z"
 * }
 * ```
 */
pub async fn coupon_create(
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<CouponBody>,
) -> ApiResult<Coupon> {
    body.required().check()?;
    let f = body.fields()?;
    ensure_code_free(&ctx.database, &f.code, None).await?;

    let coupon = sqlx::query_as::<_, Coupon>(
        r#"
        INSERT INTO coupons
            (code, name, description, coupon_type, discount_value, min_purchase_amount,
             max_usage_count, expiry_date, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(&f.code)
    .bind(non_empty(&body.name))
    .bind(non_empty(&body.description))
    .bind(f.kind.as_str())
    .bind(f.discount_value)
    .bind(body.min_purchase_amount)
    .bind(body.max_usage_count)
    .bind(body.expiry_date)
    .bind(f.is_active)
    .fetch_one(&ctx.database)
    .await?;

    tracing::info!("Created coupon {} in {}", coupon.code, ctx.db_name);
    Ok(ApiResponse::created(coupon))
}

/// PUT /admin/api/coupons - usage count is never writable here.
pub async fn coupon_update(
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<CouponBody>,
) -> ApiResult<Coupon> {
    body.required().text("id", &body.id).check()?;
    let id = parse_uuid("id", body.id.as_deref().unwrap_or_default())?;
    let f = body.fields()?;
    ensure_code_free(&ctx.database, &f.code, Some(id)).await?;

    let coupon = sqlx::query_as::<_, Coupon>(
        r#"
        UPDATE coupons
        SET code = $2, name = $3, description = $4, coupon_type = $5, discount_value = $6,
            min_purchase_amount = $7, max_usage_count = $8, expiry_date = $9, is_active = $10,
            updated_at = now()
        WHERE id = $1 AND is_deleted = FALSE
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&f.code)
    .bind(non_empty(&body.name))
    .bind(non_empty(&body.description))
    .bind(f.kind.as_str())
    .bind(f.discount_value)
    .bind(body.min_purchase_amount)
    .bind(body.max_usage_count)
    .bind(body.expiry_date)
    .bind(f.is_active)
    .fetch_optional(&ctx.database)
    .await?
    .ok_or_else(|| ApiError::not_found("Coupon not found"))?;

    Ok(ApiResponse::success(coupon))
}

/// DELETE /admin/api/coupons?id=
pub async fn coupon_delete(
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Value> {
    repository(&ctx).soft_delete(query.require()?).await?;
    Ok(ApiResponse::message("Coupon deleted"))
}

#[derive(Debug, Deserialize)]
pub struct ValidateBody {
    pub code: Option<String>,
    pub amount: Option<Decimal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponCheck {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub discount: Decimal,
    pub total_after_discount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<Coupon>,
}

impl CouponCheck {
    fn evaluate(coupon: Option<Coupon>, amount: Decimal, now: DateTime<Utc>) -> Self {
        let Some(coupon) = coupon else {
            return Self {
                valid: false,
                reason: Some("Coupon not found".to_string()),
                discount: Decimal::ZERO,
                total_after_discount: amount,
                coupon: None,
            };
        };

        match coupon.check_redeemable(now, amount) {
            Ok(()) => {
                let discount = coupon.discount_for(amount);
                Self {
                    valid: true,
                    reason: None,
                    discount,
                    total_after_discount: amount - discount,
                    coupon: Some(coupon),
                }
            }
            Err(rejection) => Self {
                valid: false,
                reason: Some(rejection.to_string()),
                discount: Decimal::ZERO,
                total_after_discount: amount,
                coupon: Some(coupon),
            },
        }
    }
}

/**
 * POST /admin/api/coupons/validate - Check a code against a purchase amount
 *
 * ```json
 * { "code": "SPRING10", "amount": 120 }
 * ```
 *
 * Always 200; `valid` and `reason` describe the outcome.
 */
pub async fn coupon_validate(
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<ValidateBody>,
) -> ApiResult<CouponCheck> {
    Required::new().text("code", &body.code).present("amount", &body.amount).check()?;
    let amount = body.amount.unwrap_or_default();
    if amount < Decimal::ZERO {
        return Err(ApiError::field("amount", "Cannot be negative"));
    }

    let code = Coupon::normalize_code(non_empty(&body.code).unwrap_or_default());
    let coupon = sqlx::query_as::<_, Coupon>("SELECT * FROM coupons WHERE code = $1 AND is_deleted = FALSE")
        .bind(&code)
        .fetch_optional(&ctx.database)
        .await?;

    Ok(ApiResponse::success(CouponCheck::evaluate(coupon, amount, Utc::now())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(kind: &str, value: i64) -> CouponBody {
        CouponBody {
            code: Some(" spring10 ".into()),
            name: Some("Spring".into()),
            coupon_type: Some(kind.into()),
            discount_value: Some(Decimal::from(value)),
            ..Default::default()
        }
    }

    fn stored(kind: &str, value: i64) -> Coupon {
        Coupon {
            id: Uuid::new_v4(),
            code: "SPRING10".into(),
            name: "Spring".into(),
            description: None,
            coupon_type: kind.into(),
            discount_value: Decimal::from(value),
            min_purchase_amount: None,
            max_usage_count: None,
            usage_count: 0,
            expiry_date: None,
            is_active: true,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn normalizes_code_and_defaults_active() {
        let f = body("percentage", 10).fields().unwrap();
        assert_eq!(f.code, "SPRING10");
        assert_eq!(f.kind, CouponType::Percentage);
        assert!(f.is_active);
    }

    #[test]
    fn rejects_non_positive_values() {
        assert!(body("fixed", 0).fields().is_err());
        assert!(body("percentage", 101).fields().is_err());

        let mut b = body("fixed", 5);
        b.min_purchase_amount = Some(Decimal::ZERO);
        assert!(b.fields().is_err());

        let mut b = body("fixed", 5);
        b.max_usage_count = Some(0);
        assert!(b.fields().is_err());

        assert!(body("bogus", 5).fields().is_err());
    }

    #[test]
    fn missing_fields_are_reported() {
        let err = CouponBody::default().required().check().unwrap_err();
        let json = err.to_json();
        for field in ["code", "name", "type", "discountValue"] {
            assert!(json["field_errors"].get(field).is_some(), "{} missing", field);
        }
    }

    #[test]
    fn evaluate_reports_discount_or_reason() {
        let now = Utc::now();
        let ok = CouponCheck::evaluate(Some(stored("fixed", 15)), Decimal::from(100), now);
        assert!(ok.valid);
        assert_eq!(ok.discount, Decimal::from(15));
        assert_eq!(ok.total_after_discount, Decimal::from(85));

        let mut inactive = stored("fixed", 15);
        inactive.is_active = false;
        let rejected = CouponCheck::evaluate(Some(inactive), Decimal::from(100), now);
        assert!(!rejected.valid);
        assert_eq!(rejected.reason.as_deref(), Some("Coupon is not active"));

        let missing = CouponCheck::evaluate(None, Decimal::from(100), now);
        assert!(!missing.valid);
        assert!(missing.coupon.is_none());
    }
}
