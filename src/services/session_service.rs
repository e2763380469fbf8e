use sqlx::PgPool;

use crate::auth::password::verify_password;
use crate::auth::{AccountKind, AuthError, Claims, PermissionSet, TokenService};
use crate::database::manager::DatabaseError;
use crate::database::models::StaffUser;
use crate::database::service::{find_role, find_staff_by_email, find_tenant};

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("tenant is inactive or deleted")]
    TenantUnavailable,
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Token(#[from] AuthError),
}

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub claims: Claims,
}

/// Direct override wins outright; otherwise the role's bundle plus the
/// tenant's allow-list.
pub fn effective_permissions(
    user_override: Option<PermissionSet>,
    role: Option<&PermissionSet>,
    tenant: &PermissionSet,
) -> PermissionSet {
    match user_override {
        Some(direct) => direct,
        None => role.cloned().unwrap_or_default().union(tenant),
    }
}

/// Verify credentials against the settings database and issue a token.
pub async fn login(
    settings: &PgPool,
    settings_db: &str,
    tokens: &TokenService,
    email: &str,
    password: &str,
) -> Result<Session, LoginError> {
    let user = find_staff_by_email(settings, email)
        .await?
        .ok_or(LoginError::InvalidCredentials)?;

    match verify_password(password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => return Err(LoginError::InvalidCredentials),
        Err(e) => {
            tracing::warn!("User {} has an unusable password hash: {}", user.id, e);
            return Err(LoginError::InvalidCredentials);
        }
    }

    let claims = match user.kind() {
        AccountKind::SuperAdmin => Claims::super_admin(user.id, settings_db, user.full_name.clone(), tokens.lifetime()),
        AccountKind::TenantAdmin => tenant_claims(settings, tokens, &user).await?,
        AccountKind::Buyer => {
            tracing::warn!("Buyer-kind account {} attempted staff login", user.id);
            return Err(LoginError::InvalidCredentials);
        }
    };

    let token = tokens.issue(&claims)?;
    tracing::info!("User {} logged in ({})", user.id, claims.kind);
    Ok(Session { token, claims })
}

async fn tenant_claims(settings: &PgPool, tokens: &TokenService, user: &StaffUser) -> Result<Claims, LoginError> {
    let tenant_id = user.tenant_id.ok_or_else(|| {
        tracing::warn!("Tenant admin {} has no tenant assigned", user.id);
        LoginError::InvalidCredentials
    })?;

    let tenant = find_tenant(settings, tenant_id)
        .await?
        .filter(|t| t.accepts_logins())
        .ok_or(LoginError::TenantUnavailable)?;

    let role = match user.role_id {
        Some(role_id) => find_role(settings, role_id).await?,
        None => None,
    };
    let role_permissions = role.as_ref().map(|r| r.permission_set());

    let permissions = effective_permissions(
        user.permission_override(),
        role_permissions.as_ref(),
        &tenant.permission_set(),
    );

    Ok(Claims::tenant_admin(
        user.id,
        &tenant.scope(),
        role.map(|r| r.name),
        user.full_name.clone(),
        &permissions,
        tokens.lifetime(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Permission;

    fn set(perms: &[Permission]) -> PermissionSet {
        perms.iter().copied().collect()
    }

    #[test]
    fn override_replaces_role_and_tenant() {
        let result = effective_permissions(
            Some(set(&[Permission::ManageOrders])),
            Some(&set(&[Permission::ManageProducts])),
            &set(&[Permission::ManageBuyers]),
        );
        assert_eq!(result, set(&[Permission::ManageOrders]));
    }

    #[test]
    fn role_and_tenant_are_merged() {
        let result = effective_permissions(
            None,
            Some(&set(&[Permission::ManageProducts])),
            &set(&[Permission::ManageBuyers, Permission::ManageProducts]),
        );
        assert_eq!(result, set(&[Permission::ManageProducts, Permission::ManageBuyers]));
    }

    #[test]
    fn empty_override_means_no_permissions() {
        let result = effective_permissions(Some(PermissionSet::new()), None, &set(&[Permission::ManageOrders]));
        assert!(result.is_empty());
    }

    #[test]
    fn tenant_allow_list_alone() {
        let result = effective_permissions(None, None, &set(&[Permission::ManageCoupons]));
        assert_eq!(result, set(&[Permission::ManageCoupons]));
    }
}
