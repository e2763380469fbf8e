use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;

/// Generic access to a soft-deletable table.
///
/// `select` is the full `SELECT ... FROM table [alias] [JOIN ...]` prefix and
/// `alias` is how the base table is referred to inside it.
pub struct Repository<T> {
    table_name: &'static str,
    alias: &'static str,
    select: String,
    label: &'static str,
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin + Serialize,
{
    pub fn new(table_name: &'static str, label: &'static str, pool: PgPool) -> Self {
        Self {
            table_name,
            alias: table_name,
            select: format!("SELECT * FROM {}", table_name),
            label,
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Repository over a joined projection, e.g. products with category names.
    pub fn joined(
        table_name: &'static str,
        alias: &'static str,
        select: &'static str,
        label: &'static str,
        pool: PgPool,
    ) -> Self {
        Self {
            table_name,
            alias,
            select: select.to_string(),
            label,
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_live(&self) -> Result<Vec<T>, DatabaseError> {
        let sql = format!(
            "{} WHERE {a}.is_deleted = FALSE ORDER BY {a}.created_at DESC",
            self.select,
            a = self.alias
        );
        Ok(sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn select_one(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        let sql = format!(
            "{} WHERE {a}.id = $1 AND {a}.is_deleted = FALSE",
            self.select,
            a = self.alias
        );
        Ok(sqlx::query_as::<_, T>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    pub async fn select_404(&self, id: Uuid) -> Result<T, DatabaseError> {
        self.select_one(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} not found", self.label)))
    }

    /// Flip the deleted flag; a missing or already-deleted row is a 404.
    pub async fn soft_delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let sql = format!(
            "UPDATE {} SET is_deleted = TRUE WHERE id = $1 AND is_deleted = FALSE",
            self.table_name
        );
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("{} not found", self.label)));
        }
        Ok(())
    }

    /// Remove the row outright, deleted or not.
    pub async fn hard_delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table_name);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("{} not found", self.label)));
        }
        Ok(())
    }
}
