use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountScope {
    Global,
    Products,
}

impl DiscountScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountScope::Global => "global",
            DiscountScope::Products => "products",
        }
    }
}

impl FromStr for DiscountScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(DiscountScope::Global),
            "products" => Ok(DiscountScope::Products),
            other => Err(format!("unknown discount scope '{}'", other)),
        }
    }
}

/// Store-wide or product-targeted percentage discount.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GlobalDiscount {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub discount_type: String,
    pub apply_to: String,
    pub min_purchase_amount: Option<Decimal>,
    pub discount_percentage: Option<Decimal>,
    pub is_active: bool,
    pub product_ids: Vec<Uuid>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl GlobalDiscount {
    pub fn scope(&self) -> DiscountScope {
        self.apply_to.parse().unwrap_or(DiscountScope::Global)
    }

    /// Whether this discount covers a purchase of `amount`, optionally for a
    /// specific product.
    pub fn applies_to(&self, product_id: Option<Uuid>, amount: Decimal) -> bool {
        if !self.is_active || self.is_deleted {
            return false;
        }
        if let Some(min) = self.min_purchase_amount {
            if amount < min {
                return false;
            }
        }
        match self.scope() {
            DiscountScope::Global => true,
            DiscountScope::Products => product_id.map_or(false, |id| self.product_ids.contains(&id)),
        }
    }

    pub fn discount_for(&self, amount: Decimal) -> Decimal {
        let pct = self.discount_percentage.unwrap_or(Decimal::ZERO).clamp(Decimal::ZERO, HUNDRED);
        round_money(amount * pct / HUNDRED)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponType {
    Percentage,
    Fixed,
}

impl CouponType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CouponType::Percentage => "percentage",
            CouponType::Fixed => "fixed",
        }
    }
}

impl FromStr for CouponType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" | "percent" => Ok(CouponType::Percentage),
            "fixed" | "amount" => Ok(CouponType::Fixed),
            other => Err(format!("unknown coupon type '{}'", other)),
        }
    }
}

/// Why a coupon cannot be used right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponRejection {
    Inactive,
    Expired,
    UsageExhausted,
    BelowMinimum(Decimal),
}

impl fmt::Display for CouponRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CouponRejection::Inactive => write!(f, "Coupon is not active"),
            CouponRejection::Expired => write!(f, "Coupon has expired"),
            CouponRejection::UsageExhausted => write!(f, "Coupon usage limit reached"),
            CouponRejection::BelowMinimum(min) => write!(f, "Minimum purchase amount is {}", min),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub coupon_type: String,
    pub discount_value: Decimal,
    pub min_purchase_amount: Option<Decimal>,
    pub max_usage_count: Option<i32>,
    pub usage_count: i32,
    pub expiry_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Coupon {
    /// Codes are compared case-insensitively by storing them upper-cased.
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    pub fn kind(&self) -> CouponType {
        self.coupon_type.parse().unwrap_or(CouponType::Fixed)
    }

    pub fn check_redeemable(&self, now: DateTime<Utc>, amount: Decimal) -> Result<(), CouponRejection> {
        if !self.is_active || self.is_deleted {
            return Err(CouponRejection::Inactive);
        }
        if matches!(self.expiry_date, Some(expiry) if expiry < now) {
            return Err(CouponRejection::Expired);
        }
        if matches!(self.max_usage_count, Some(max) if self.usage_count >= max) {
            return Err(CouponRejection::UsageExhausted);
        }
        match self.min_purchase_amount {
            Some(min) if amount < min => Err(CouponRejection::BelowMinimum(min)),
            _ => Ok(()),
        }
    }

    /// Discount on `amount`, never more than the amount itself.
    pub fn discount_for(&self, amount: Decimal) -> Decimal {
        let raw = match self.kind() {
            CouponType::Percentage => amount * self.discount_value.min(HUNDRED) / HUNDRED,
            CouponType::Fixed => self.discount_value,
        };
        round_money(raw.min(amount).max(Decimal::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn coupon(kind: &str, value: &str) -> Coupon {
        Coupon {
            id: Uuid::new_v4(),
            code: "SPRING10".into(),
            name: "Spring".into(),
            description: None,
            coupon_type: kind.into(),
            discount_value: dec(value),
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

    fn discount(scope: &str, pct: &str) -> GlobalDiscount {
        GlobalDiscount {
            id: Uuid::new_v4(),
            name: "Summer".into(),
            description: None,
            discount_type: "percentage".into(),
            apply_to: scope.into(),
            min_purchase_amount: None,
            discount_percentage: Some(dec(pct)),
            is_active: true,
            product_ids: vec![],
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn normalizes_codes() {
        assert_eq!(Coupon::normalize_code("  spring10 "), "SPRING10");
    }

    #[test]
    fn percentage_and_fixed_discounts() {
        assert_eq!(coupon("percentage", "15").discount_for(dec("200")), dec("30.00"));
        assert_eq!(coupon("fixed", "25").discount_for(dec("200")), dec("25.00"));
        assert_eq!(coupon("fixed", "250").discount_for(dec("200")), dec("200.00"));
        assert_eq!(coupon("percentage", "150").discount_for(dec("80")), dec("80.00"));
    }

    #[test]
    fn redeemability_rules() {
        let now = Utc::now();
        let mut c = coupon("fixed", "10");
        assert_eq!(c.check_redeemable(now, dec("5")), Ok(()));

        c.min_purchase_amount = Some(dec("50"));
        assert_eq!(c.check_redeemable(now, dec("49.99")), Err(CouponRejection::BelowMinimum(dec("50"))));

        c.max_usage_count = Some(3);
        c.usage_count = 3;
        assert_eq!(c.check_redeemable(now, dec("60")), Err(CouponRejection::UsageExhausted));

        c.usage_count = 0;
        c.expiry_date = Some(now - Duration::days(1));
        assert_eq!(c.check_redeemable(now, dec("60")), Err(CouponRejection::Expired));

        c.expiry_date = None;
        c.is_active = false;
        assert_eq!(c.check_redeemable(now, dec("60")), Err(CouponRejection::Inactive));
    }

    #[test]
    fn global_discount_scope() {
        let product = Uuid::new_v4();
        let everywhere = discount("global", "10");
        assert!(everywhere.applies_to(None, dec("1")));
        assert_eq!(everywhere.discount_for(dec("99.99")), dec("10.00"));

        let mut targeted = discount("products", "20");
        assert!(!targeted.applies_to(Some(product), dec("100")));
        targeted.product_ids.push(product);
        assert!(targeted.applies_to(Some(product), dec("100")));
        assert!(!targeted.applies_to(None, dec("100")));

        targeted.min_purchase_amount = Some(dec("150"));
        assert!(!targeted.applies_to(Some(product), dec("100")));
    }
}
