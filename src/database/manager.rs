use sqlx::{postgres::PgPoolOptions, PgPool};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from DatabaseManager and the query helpers built on it
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Invalid database name: {0}")]
    InvalidDatabaseName(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Registry of connection pools keyed by database name.
///
/// Built once at startup and shared through application state. Pools are
/// created lazily, so resolving a name never touches the network.
#[derive(Clone)]
pub struct DatabaseManager {
    pools: Arc<RwLock<HashMap<String, PgPool>>>,
    base_url: Option<String>,
    settings_database: String,
    max_connections: u32,
    acquire_timeout: Duration,
}

impl DatabaseManager {
    /// Database used for CREATE DATABASE and existence checks.
    const ADMIN_DB_NAME: &'static str = "postgres";

    /// Server databases a tenant can never be pointed at.
    pub const RESERVED_DB_NAMES: [&'static str; 3] = [Self::ADMIN_DB_NAME, "template0", "template1"];

    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            pools: Arc::new(RwLock::new(HashMap::new())),
            base_url: config.url.clone(),
            settings_database: config.settings_database.clone(),
            max_connections: config.max_connections,
            acquire_timeout: Duration::from_secs(config.connection_timeout),
        }
    }

    pub fn settings_database(&self) -> &str {
        &self.settings_database
    }

    /// Shared registry database (tenants, roles, staff users)
    pub async fn settings_pool(&self) -> Result<PgPool, DatabaseError> {
        self.get_pool(&self.settings_database).await
    }

    /// Tenant database pool (validated name)
    pub async fn tenant_pool(&self, database_name: &str) -> Result<PgPool, DatabaseError> {
        if !self.is_tenant_db_name(database_name) {
            return Err(DatabaseError::InvalidDatabaseName(database_name.to_string()));
        }
        self.get_pool(database_name).await
    }

    /// Get existing pool or create a new one lazily
    async fn get_pool(&self, database_name: &str) -> Result<PgPool, DatabaseError> {
        // Fast path: try read lock
        {
            let pools = self.pools.read().await;
            if let Some(pool) = pools.get(database_name) {
                return Ok(pool.clone());
            }
        }

        let mut pools = self.pools.write().await;
        // Another request may have won the race while we waited
        if let Some(pool) = pools.get(database_name) {
            return Ok(pool.clone());
        }

        let connection_string = self.build_connection_string(database_name)?;
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect_lazy(&connection_string)?;

        pools.insert(database_name.to_string(), pool.clone());
        info!("Created database pool for: {}", database_name);
        Ok(pool)
    }

    fn build_connection_string(&self, database_name: &str) -> Result<String, DatabaseError> {
        let base = self
            .base_url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let mut url = url::Url::parse(base).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        // Replace the path to the database name (ensure leading slash)
        url.set_path(&format!("/{}", database_name));
        Ok(url.into())
    }

    /// Pings the settings pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        let pool = self.settings_pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    pub async fn database_exists(&self, database_name: &str) -> Result<bool, DatabaseError> {
        let admin_pool = self.get_pool(Self::ADMIN_DB_NAME).await?;
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pg_database WHERE datname = $1")
            .bind(database_name)
            .fetch_one(&admin_pool)
            .await?;
        Ok(count.0 > 0)
    }

    /// Create an empty database; a no-op when it already exists.
    pub async fn create_database(&self, database_name: &str) -> Result<(), DatabaseError> {
        if !Self::is_valid_db_name(database_name) {
            return Err(DatabaseError::InvalidDatabaseName(database_name.to_string()));
        }
        if self.database_exists(database_name).await? {
            info!("Database {} already exists", database_name);
            return Ok(());
        }

        let admin_pool = self.get_pool(Self::ADMIN_DB_NAME).await?;
        let query = format!("CREATE DATABASE {}", Self::quote_identifier(database_name));
        sqlx::query(&query).execute(&admin_pool).await?;

        info!("Created database {}", database_name);
        Ok(())
    }

    /// Names with a cached pool, sorted.
    pub async fn cached_names(&self) -> Vec<String> {
        let pools = self.pools.read().await;
        let mut names: Vec<String> = pools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Close and remove all pools (e.g., on shutdown)
    pub async fn close_all(&self) {
        let mut pools = self.pools.write().await;
        for (name, pool) in pools.drain() {
            pool.close().await;
            info!("Closed database pool: {}", name);
        }
    }

    /// Quote SQL identifier to prevent injection
    pub fn quote_identifier(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Postgres identifier rules, restricted: starts with a letter, then
    /// letters, digits or underscores, at most 63 bytes.
    pub fn is_valid_db_name(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() => {}
            _ => return false,
        }
        name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    pub fn is_reserved_db_name(name: &str) -> bool {
        Self::RESERVED_DB_NAMES.iter().any(|r| r.eq_ignore_ascii_case(name))
    }

    /// Valid identifier that is neither a server database nor the settings
    /// database.
    pub fn is_tenant_db_name(&self, name: &str) -> bool {
        Self::is_valid_db_name(name)
            && !Self::is_reserved_db_name(name)
            && !name.eq_ignore_ascii_case(&self.settings_database)
    }
}
