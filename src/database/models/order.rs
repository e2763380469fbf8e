use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef};
use sqlx::{Decode, Encode, FromRow, Postgres, Type};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Order lifecycle. The JSON form uses the storefront's labels; English
/// slugs are stored and also accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "U pripremi", alias = "pending")]
    Pending,
    #[serde(rename = "Poslata", alias = "shipped")]
    Shipped,
    #[serde(rename = "Dostavljena", alias = "delivered")]
    Delivered,
    #[serde(rename = "Otkazana", alias = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "U pripremi",
            OrderStatus::Shipped => "Poslata",
            OrderStatus::Delivered => "Dostavljena",
            OrderStatus::Cancelled => "Otkazana",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" | "U pripremi" => Ok(OrderStatus::Pending),
            "shipped" | "Poslata" => Ok(OrderStatus::Shipped),
            "delivered" | "Dostavljena" => Ok(OrderStatus::Delivered),
            "cancelled" | "Otkazana" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status '{}'", other)),
        }
    }
}

impl Type<Postgres> for OrderStatus {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for OrderStatus {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let raw = <&str as Decode<Postgres>>::decode(value)?;
        raw.parse().map_err(Into::into)
    }
}

impl Encode<'_, Postgres> for OrderStatus {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> IsNull {
        <&str as Encode<Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub order_time: DateTime<Utc>,
    pub status: OrderStatus,
    pub buyer_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub total: Decimal,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Line item joined with the product name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Option<Uuid>,
    pub product_name: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

impl OrderItem {
    pub const SELECT: &'static str = r#"
        SELECT i.id, i.order_id, i.product_id, p.name AS product_name,
               i.quantity, i.unit_price, i.subtotal
        FROM order_items i
        LEFT JOIN products p ON p.id = i.product_id
    "#;

    pub fn set_quantity(&mut self, quantity: i32) {
        self.quantity = quantity;
        self.subtotal = self.unit_price * Decimal::from(quantity);
    }
}

/// Order with its line items, as returned by the detail endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub order_items: Vec<OrderItem>,
}

pub fn order_total(items: &[OrderItem]) -> Decimal {
    items.iter().map(|i| i.subtotal).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(unit: &str, qty: i32) -> OrderItem {
        let unit_price: Decimal = unit.parse().unwrap();
        OrderItem {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            product_id: Some(Uuid::new_v4()),
            product_name: None,
            quantity: qty,
            unit_price,
            subtotal: unit_price * Decimal::from(qty),
        }
    }

    #[test]
    fn status_json_uses_storefront_labels() {
        assert_eq!(serde_json::to_string(&OrderStatus::Shipped).unwrap(), "\"Poslata\"");
        let s: OrderStatus = serde_json::from_str("\"Otkazana\"").unwrap();
        assert_eq!(s, OrderStatus::Cancelled);
        let s: OrderStatus = serde_json::from_str("\"delivered\"").unwrap();
        assert_eq!(s, OrderStatus::Delivered);
        assert!(serde_json::from_str::<OrderStatus>("\"lost\"").is_err());
    }

    #[test]
    fn status_parses_slug_and_label() {
        for status in [OrderStatus::Pending, OrderStatus::Shipped, OrderStatus::Delivered, OrderStatus::Cancelled] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
            assert_eq!(status.label().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn quantity_change_recomputes_subtotal_and_total() {
        let mut items = vec![item("12.50", 2), item("3.00", 1)];
        assert_eq!(order_total(&items), "28.00".parse::<Decimal>().unwrap());

        items[0].set_quantity(4);
        assert_eq!(items[0].subtotal, "50.00".parse::<Decimal>().unwrap());
        assert_eq!(order_total(&items), "53.00".parse::<Decimal>().unwrap());
    }
}
