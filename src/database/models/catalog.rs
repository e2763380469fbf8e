use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// Product row joined with its category name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub image: Option<String>,
    pub images: Vec<String>,
    pub is_promoted: bool,
    pub related_products: Vec<Uuid>,
    pub attributes: Value,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub const SELECT: &'static str = r#"
        SELECT p.id, p.name, p.description, p.price, p.sale_price,
               p.category_id, c.name AS category_name,
               p.image, p.images, p.is_promoted, p.related_products, p.attributes,
               p.is_deleted, p.created_at
        FROM products p
        LEFT JOIN categories c ON c.id = p.category_id
    "#;

    /// Price a buyer actually pays; a sale price only counts when lower.
    pub fn effective_price(&self) -> Decimal {
        match self.sale_price {
            Some(sale) if sale > Decimal::ZERO && sale < self.price => sale,
            _ => self.price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub id: Uuid,
    pub name: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// Attribute value joined with the owning attribute's name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AttributeValue {
    pub id: Uuid,
    pub attribute_id: Uuid,
    pub attribute_name: Option<String>,
    pub name: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl AttributeValue {
    pub const SELECT: &'static str = r#"
        SELECT v.id, v.attribute_id, a.name AS attribute_name, v.name, v.is_deleted, v.created_at
        FROM attribute_values v
        LEFT JOIN attributes a ON a.id = v.attribute_id
    "#;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn product(price: &str, sale: Option<&str>) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Lamp".into(),
            description: None,
            price: dec(price),
            sale_price: sale.map(dec),
            category_id: None,
            category_name: None,
            image: None,
            images: vec![],
            is_promoted: false,
            related_products: vec![],
            attributes: Value::Array(vec![]),
            is_deleted: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn sale_price_applies_only_when_lower() {
        assert_eq!(product("100", Some("80")).effective_price(), dec("80"));
        assert_eq!(product("100", Some("120")).effective_price(), dec("100"));
        assert_eq!(product("100", Some("0")).effective_price(), dec("100"));
        assert_eq!(product("100", None).effective_price(), dec("100"));
    }

    #[test]
    fn serializes_camel_case_with_category_name() {
        let mut p = product("10.50", None);
        p.category_name = Some("Lighting".into());
        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(value["categoryName"], "Lighting");
        assert!(value.get("salePrice").is_some());
        assert!(value.get("isPromoted").is_some());
    }
}
