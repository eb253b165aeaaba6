//! The session the administrative operations run statements through.
//!
//! The dialects only build SQL. Executing it is the job of a [`Session`],
//! which is borrowed for the duration of one call and never owned.

use std::future::Future;

use sqlx::sqlite::SqlitePool;
use tracing::debug;

use crate::error::Result;
use crate::schema::TableMetadata;

/// A positional argument bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SqlArg {
    /// Text value.
    Text(String),
    /// Integer value.
    Int(i64),
}

impl From<&str> for SqlArg {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlArg {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for SqlArg {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for SqlArg {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

/// A parameterized query and its arguments, in placeholder order.
pub type Query = (String, Vec<SqlArg>);

/// Executes SQL and enumerates tables on behalf of the dialect layer.
pub trait Session {
    /// Executes one statement, returning the number of affected rows.
    fn execute(&self, sql: &str, args: &[SqlArg]) -> impl Future<Output = Result<u64>>;

    /// Lists the tables of the connection's default schema.
    fn list_tables(&self) -> impl Future<Output = Result<Vec<TableMetadata>>>;
}

/// SQL to enumerate user tables of a SQLite database.
pub const SQLITE_LIST_TABLES_SQL: &str =
    "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name";

/// [`Session`] over a SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqliteSession {
    pool: SqlitePool,
}

impl SqliteSession {
    /// Creates a session over `pool`.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl Session for SqliteSession {
    async fn execute(&self, sql: &str, args: &[SqlArg]) -> Result<u64> {
        debug!(sql = %sql, args = args.len(), "Executing statement");

        let mut query = sqlx::query(sql);
        for arg in args {
            query = match arg {
                SqlArg::Text(value) => query.bind(value.clone()),
                SqlArg::Int(value) => query.bind(*value),
            };
        }
        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn list_tables(&self) -> Result<Vec<TableMetadata>> {
        let rows: Vec<(String,)> = sqlx::query_as(SQLITE_LIST_TABLES_SQL)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(name,)| TableMetadata::new(name))
            .collect())
    }
}
