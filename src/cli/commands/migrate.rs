use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::schema::{self, SETTINGS_SCHEMA, TENANT_SCHEMA};
use crate::database::DatabaseManager;

/// Create the settings database if needed and apply its schema. With
/// `tenants`, every live tenant database is re-migrated as well.
pub async fn handle(databases: &DatabaseManager, tenants: bool, output_format: OutputFormat) -> anyhow::Result<()> {
    let settings_db = databases.settings_database().to_string();
    databases.create_database(&settings_db).await?;

    let settings = databases.settings_pool().await?;
    schema::apply(&settings, SETTINGS_SCHEMA).await?;
    tracing::info!("Settings database {} migrated", settings_db);

    let mut migrated = Vec::new();
    if tenants {
        let names: Vec<(String,)> =
            sqlx::query_as("SELECT database_name FROM tenants WHERE is_deleted = FALSE ORDER BY database_name")
                .fetch_all(&settings)
                .await?;

        for (name,) in names {
            if !databases.is_tenant_db_name(&name) {
                tracing::warn!("Skipping tenant database {}: reserved or invalid name", name);
                continue;
            }
            databases.create_database(&name).await?;
            let pool = databases.tenant_pool(&name).await?;
            schema::apply(&pool, TENANT_SCHEMA).await?;
            tracing::info!("Tenant database {} migrated", name);
            migrated.push(name);
        }
    }

    output_success(
        &output_format,
        &format!("Migrated {} and {} tenant database(s)", settings_db, migrated.len()),
        Some(json!({ "settings_database": settings_db, "tenant_databases": migrated })),
    )
}
