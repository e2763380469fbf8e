use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Role, StaffUser, Tenant};

/// Live staff account by email (case-insensitive)
pub async fn find_staff_by_email(pool: &PgPool, email: &str) -> Result<Option<StaffUser>, DatabaseError> {
    let sql = format!("{} WHERE lower(u.email) = lower($1) AND u.is_deleted = FALSE", StaffUser::SELECT);
    let user = sqlx::query_as::<_, StaffUser>(&sql)
        .bind(email.trim())
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// Tenant by id, including soft-deleted rows so callers can tell them apart
pub async fn find_tenant(pool: &PgPool, tenant_id: Uuid) -> Result<Option<Tenant>, DatabaseError> {
    let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
        .bind(tenant_id)
        .fetch_optional(pool)
        .await?;

    Ok(tenant)
}

/// Live role by id
pub async fn find_role(pool: &PgPool, role_id: Uuid) -> Result<Option<Role>, DatabaseError> {
    let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1 AND is_deleted = FALSE")
        .bind(role_id)
        .fetch_optional(pool)
        .await?;

    Ok(role)
}

/// Whether any other staff account uses this email. Soft-deleted accounts
/// count too: the address stays reserved until the account is purged.
pub async fn email_taken(pool: &PgPool, email: &str, except: Option<Uuid>) -> Result<bool, DatabaseError> {
    let count: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM users WHERE lower(email) = lower($1) AND ($2::uuid IS NULL OR id <> $2)",
    )
    .bind(email.trim())
    .bind(except)
    .fetch_one(pool)
    .await?;

    Ok(count.0 > 0)
}
