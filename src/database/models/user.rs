use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::{AccountKind, PermissionSet};

/// Staff credential in the settings database, joined with tenant and role names.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StaffUser {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub full_name: Option<String>,
    pub account_kind: String,
    pub tenant_id: Option<Uuid>,
    pub tenant_name: Option<String>,
    pub role_id: Option<Uuid>,
    pub role_name: Option<String>,
    pub permissions: Option<Vec<String>>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StaffUser {
    /// Column list used by every staff query; keeps joins consistent.
    pub const SELECT: &'static str = r#"
        SELECT u.id, u.email, u.password_hash, u.full_name, u.account_kind,
               u.tenant_id, t.name AS tenant_name,
               u.role_id, r.name AS role_name,
               u.permissions, u.is_deleted, u.created_at, u.updated_at
        FROM users u
        LEFT JOIN tenants t ON t.id = u.tenant_id
        LEFT JOIN roles r ON r.id = u.role_id
    "#;

    /// Unknown discriminants are treated as buyers so they never gain staff access.
    pub fn kind(&self) -> AccountKind {
        self.account_kind.parse().unwrap_or(AccountKind::Buyer)
    }

    /// Direct override, when one is stored.
    pub fn permission_override(&self) -> Option<PermissionSet> {
        self.permissions.as_deref().map(PermissionSet::from_stored)
    }
}
