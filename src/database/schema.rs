//! DDL for the settings database and for every tenant database.
//!
//! Statements are idempotent so they can be re-run by `shopctl migrate`
//! and by tenant provisioning.

use sqlx::PgPool;

use super::DatabaseError;

pub const SETTINGS_SCHEMA: &[&str] = &[
    r#"CREATE EXTENSION IF NOT EXISTS pgcrypto"#,
    r#"CREATE TABLE IF NOT EXISTS tenants (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name TEXT NOT NULL,
        database_name TEXT NOT NULL UNIQUE,
        business_email TEXT,
        business_email_password TEXT,
        phone_number TEXT,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        permissions TEXT[] NOT NULL DEFAULT '{}',
        is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ
    )"#,
    r#"CREATE TABLE IF NOT EXISTS roles (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name TEXT NOT NULL,
        description TEXT,
        permissions TEXT[] NOT NULL DEFAULT '{}',
        is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ
    )"#,
    r#"CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        full_name TEXT,
        account_kind TEXT NOT NULL CHECK (account_kind IN ('super_admin', 'tenant_admin')),
        tenant_id UUID REFERENCES tenants(id),
        role_id UUID REFERENCES roles(id),
        permissions TEXT[],
        is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ,
        CHECK ((account_kind = 'super_admin') = (tenant_id IS NULL))
    )"#,
];

pub const TENANT_SCHEMA: &[&str] = &[
    r#"CREATE EXTENSION IF NOT EXISTS pgcrypto"#,
    r#"CREATE TABLE IF NOT EXISTS categories (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name TEXT NOT NULL,
        description TEXT,
        image TEXT,
        is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS products (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name TEXT NOT NULL,
        description TEXT,
        price NUMERIC(12, 2) NOT NULL DEFAULT 0,
        sale_price NUMERIC(12, 2),
        category_id UUID REFERENCES categories(id),
        image TEXT,
        images TEXT[] NOT NULL DEFAULT '{}',
        is_promoted BOOLEAN NOT NULL DEFAULT FALSE,
        related_products UUID[] NOT NULL DEFAULT '{}',
        attributes JSONB NOT NULL DEFAULT '[]',
        is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS attributes (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name TEXT NOT NULL,
        is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS attribute_values (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        attribute_id UUID NOT NULL REFERENCES attributes(id),
        name TEXT NOT NULL,
        is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS global_discounts (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name TEXT NOT NULL,
        description TEXT,
        discount_type TEXT NOT NULL,
        apply_to TEXT NOT NULL DEFAULT 'global',
        min_purchase_amount NUMERIC(12, 2),
        discount_percentage NUMERIC(5, 2),
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        product_ids UUID[] NOT NULL DEFAULT '{}',
        is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ
    )"#,
    r#"CREATE TABLE IF NOT EXISTS coupons (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        code TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT,
        coupon_type TEXT NOT NULL,
        discount_value NUMERIC(12, 2) NOT NULL,
        min_purchase_amount NUMERIC(12, 2),
        max_usage_count INTEGER,
        usage_count INTEGER NOT NULL DEFAULT 0,
        expiry_date TIMESTAMPTZ,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ
    )"#,
    r#"CREATE UNIQUE INDEX IF NOT EXISTS coupons_live_code ON coupons (code) WHERE NOT is_deleted"#,
    r#"CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        account_kind TEXT NOT NULL DEFAULT 'buyer' CHECK (account_kind = 'buyer'),
        email TEXT NOT NULL,
        password_hash TEXT,
        name TEXT,
        lastname TEXT,
        address TEXT,
        postal_code TEXT,
        city TEXT,
        phone TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS orders (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        order_time TIMESTAMPTZ NOT NULL DEFAULT now(),
        status TEXT NOT NULL DEFAULT 'pending',
        buyer_id UUID REFERENCES users(id),
        customer_name TEXT NOT NULL,
        customer_email TEXT NOT NULL,
        customer_phone TEXT,
        total NUMERIC(12, 2) NOT NULL DEFAULT 0,
        updated_at TIMESTAMPTZ
    )"#,
    r#"CREATE TABLE IF NOT EXISTS order_items (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        order_id UUID NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
        product_id UUID REFERENCES products(id),
        quantity INTEGER NOT NULL CHECK (quantity > 0),
        unit_price NUMERIC(12, 2) NOT NULL,
        subtotal NUMERIC(12, 2) NOT NULL
    )"#,
];

/// Run each statement in order against the given pool.
pub async fn apply(pool: &PgPool, statements: &[&str]) -> Result<(), DatabaseError> {
    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(statements: &[&str]) -> Vec<String> {
        statements
            .iter()
            .filter_map(|s| s.strip_prefix("CREATE TABLE IF NOT EXISTS "))
            .filter_map(|s| s.split_whitespace().next())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn tenant_schema_has_fixed_table_set() {
        let mut names = tables(TENANT_SCHEMA);
        names.sort();
        assert_eq!(
            names,
            vec![
                "attribute_values",
                "attributes",
                "categories",
                "coupons",
                "global_discounts",
                "order_items",
                "orders",
                "products",
                "users",
            ]
        );
    }

    #[test]
    fn settings_schema_has_registry_tables() {
        assert_eq!(tables(SETTINGS_SCHEMA), vec!["tenants", "roles", "users"]);
    }
}
