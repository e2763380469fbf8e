pub mod authorizer;
pub mod cookie;
pub mod password;
pub mod permission;
pub mod token;

use thiserror::Error;

use crate::database::DatabaseError;

pub use authorizer::{authorize, AuthContext, Scope, SessionSummary};
pub use permission::{Permission, PermissionSet};
pub use token::{AccountKind, Claims, TenantScope, TokenService};

/// Reasons a request fails authentication. Kept distinct for logs only;
/// callers see one uniform 401.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no session token presented")]
    MissingToken,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token expired")]
    Expired,

    #[error("token signature invalid")]
    BadSignature,

    #[error("buyer accounts cannot use the admin API")]
    NotStaff,

    #[error("token claims contradict its account kind")]
    InconsistentClaims,

    #[error("JWT secret not configured")]
    SecretNotConfigured,

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}
