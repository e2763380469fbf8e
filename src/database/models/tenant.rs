use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::{PermissionSet, TenantScope};
use crate::services::mailer::MailCredentials;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "dbName")]
    pub database_name: String,
    pub business_email: Option<String>,
    #[serde(skip_serializing, default)]
    pub business_email_password: Option<String>,
    pub phone_number: Option<String>,
    pub is_active: bool,
    pub permissions: Vec<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Tenant {
    pub fn scope(&self) -> TenantScope {
        TenantScope {
            id: self.id,
            name: self.name.clone(),
            db_name: self.database_name.clone(),
        }
    }

    /// Allow-list granted to this tenant's admin users.
    pub fn permission_set(&self) -> PermissionSet {
        PermissionSet::from_stored(&self.permissions)
    }

    /// Logins are refused for tenants that are switched off or removed.
    pub fn accepts_logins(&self) -> bool {
        self.is_active && !self.is_deleted
    }

    pub fn mail_credentials(&self) -> Option<MailCredentials> {
        match (&self.business_email, &self.business_email_password) {
            (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => Some(MailCredentials {
                from_name: self.name.clone(),
                username: user.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant() -> Tenant {
        Tenant {
            id: Uuid::new_v4(),
            name: "Acme".into(),
            database_name: "tenant_acme".into(),
            business_email: Some("shop@acme.test".into()),
            business_email_password: Some("app-password".into()),
            phone_number: None,
            is_active: true,
            permissions: vec!["manage_products".into()],
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn password_never_serialized() {
        let value = serde_json::to_value(tenant()).unwrap();
        assert_eq!(value["dbName"], "tenant_acme");
        assert!(value.get("businessEmailPassword").is_none());
    }

    #[test]
    fn inactive_or_deleted_tenants_refuse_logins() {
        let mut t = tenant();
        assert!(t.accepts_logins());
        t.is_active = false;
        assert!(!t.accepts_logins());
        t.is_active = true;
        t.is_deleted = true;
        assert!(!t.accepts_logins());
    }

    #[test]
    fn credentials_require_both_fields() {
        let mut t = tenant();
        assert!(t.mail_credentials().is_some());
        t.business_email_password = Some(String::new());
        assert!(t.mail_credentials().is_none());
    }
}
