#![allow(dead_code)]

use sqlstore_dialect::prelude::*;
use sqlx::sqlite::SqlitePoolOptions;

/// One dialect per supported engine, without a schema.
pub fn all_dialects() -> Vec<Box<dyn Dialect>> {
    EngineKind::ALL
        .into_iter()
        .map(|engine| new_dialect(&DialectConfig::new(engine)))
        .collect()
}

pub fn dialect(engine: EngineKind) -> Box<dyn Dialect> {
    new_dialect(&DialectConfig::new(engine))
}

/// Every non-custom column type.
pub fn all_column_types() -> Vec<ColumnType> {
    [
        "BIT", "TINYINT", "SMALLINT", "MEDIUMINT", "INT", "INTEGER", "BIGINT", "CHAR",
        "VARCHAR", "NVARCHAR", "TINYTEXT", "TEXT", "MEDIUMTEXT", "LONGTEXT", "UUID", "DATE",
        "DATETIME", "TIME", "TIMESTAMP", "TIMESTAMPZ", "DECIMAL", "NUMERIC", "REAL", "FLOAT",
        "DOUBLE", "BINARY", "VARBINARY", "TINYBLOB", "BLOB", "MEDIUMBLOB", "LONGBLOB",
        "BYTEA", "BOOL", "BOOLEAN", "SERIAL", "BIGSERIAL", "JSON",
    ]
    .into_iter()
    .map(|name| ColumnType::from(name.to_string()))
    .collect()
}

/// Counts non-overlapping occurrences of `needle` in `haystack`.
pub fn occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

/// A session over a fresh in-memory SQLite database.
pub async fn sqlite_session() -> SqliteSession {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");
    SqliteSession::new(pool)
}

/// Counts the rows of `table`.
pub async fn count_rows(session: &SqliteSession, table: &str) -> i64 {
    let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM `{table}`"))
        .fetch_one(session.pool())
        .await
        .unwrap_or_else(|e| panic!("Failed to count rows of {table}: {e}"));
    row.0
}
