use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::permission::{Permission, PermissionSet};
use super::AuthError;

/// Explicit account discriminant, carried both in the `users` tables and in
/// the token, so "no tenant" never has to double as "super-admin".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    SuperAdmin,
    TenantAdmin,
    Buyer,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::SuperAdmin => "super_admin",
            AccountKind::TenantAdmin => "tenant_admin",
            AccountKind::Buyer => "buyer",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(AccountKind::SuperAdmin),
            "tenant_admin" => Ok(AccountKind::TenantAdmin),
            "buyer" => Ok(AccountKind::Buyer),
            other => Err(format!("unknown account kind '{}'", other)),
        }
    }
}

/// Tenant a session is bound to.
#[derive(Debug, Clone)]
pub struct TenantScope {
    pub id: Uuid,
    pub name: String,
    pub db_name: String,
}

/// Session snapshot signed into the cookie. Nothing here is refreshed
/// until the user logs in again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Uuid>,
    pub db_name: String,
    pub kind: AccountKind,
    #[serde(default)]
    pub is_super_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_name: Option<String>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn super_admin(user_id: Uuid, settings_db: &str, full_name: Option<String>, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            tenant_id: None,
            db_name: settings_db.to_string(),
            kind: AccountKind::SuperAdmin,
            is_super_admin: true,
            role: None,
            full_name,
            tenant_name: None,
            permissions: Vec::new(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        }
    }

    pub fn tenant_admin(
        user_id: Uuid,
        tenant: &TenantScope,
        role: Option<String>,
        full_name: Option<String>,
        permissions: &PermissionSet,
        lifetime: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            tenant_id: Some(tenant.id),
            db_name: tenant.db_name.clone(),
            kind: AccountKind::TenantAdmin,
            is_super_admin: false,
            role,
            full_name,
            tenant_name: Some(tenant.name.clone()),
            permissions: permissions.to_vec(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        }
    }
}

/// HS256 signer/verifier for session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(secret: &str, expiry_hours: u64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::SecretNotConfigured);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime: Duration::hours(expiry_hours as i64),
        })
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn issue(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature => AuthError::BadSignature,
                _ => AuthError::Malformed(e.to_string()),
            })
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}
