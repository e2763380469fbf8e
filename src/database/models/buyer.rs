use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Storefront customer account in a tenant database. Read-only from the
/// admin side; the password hash is never selected.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Buyer {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub lastname: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Buyer {
    pub const SELECT: &'static str = r#"
        SELECT id, email, name, lastname, address, postal_code, city, phone, created_at
        FROM users
    "#;
}
