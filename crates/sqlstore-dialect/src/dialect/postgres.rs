//! PostgreSQL dialect.

use std::error::Error;

use super::{
    catalog_query, precision_suffix, quote_all, AdminStatement, Dialect, ResolvedColumn,
    PRESERVED_TABLE_NEXT_ID,
};
use crate::classify::driver_fault;
use crate::config::EngineKind;
use crate::error::TableAction;
use crate::schema::{Column, ColumnType, Index};
use crate::session::Query;

/// SQLSTATE `unique_violation`.
pub const UNIQUE_VIOLATION: &str = "23505";

/// SQLSTATE `deadlock_detected`.
pub const DEADLOCK_DETECTED: &str = "40P01";

/// Builds an `INSERT ... ON CONFLICT (...) DO UPDATE` statement.
pub(super) fn on_conflict_upsert<D: Dialect + ?Sized>(
    dialect: &D,
    table_name: &str,
    key_cols: &[String],
    update_cols: &[String],
) -> String {
    let columns = quote_all(dialect, update_cols);
    let placeholders = vec!["?"; update_cols.len()];
    let assignments: Vec<String> = columns
        .iter()
        .map(|c| format!("{c}=excluded.{c}"))
        .collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT({}) DO UPDATE SET {}",
        table_name,
        columns.join(", "),
        placeholders.join(", "),
        quote_all(dialect, key_cols).join(", "),
        assignments.join(", ")
    )
}

/// PostgreSQL dialect.
#[derive(Debug, Clone, Default)]
pub struct PostgresDialect {
    schema: Option<String>,
}

impl PostgresDialect {
    /// Creates a PostgreSQL dialect; `schema` defaults to the search path.
    #[must_use]
    pub const fn new(schema: Option<String>) -> Self {
        Self { schema }
    }
}

impl Dialect for PostgresDialect {
    fn kind(&self) -> EngineKind {
        EngineKind::Postgres
    }

    fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "true"
        } else {
            "false"
        }
    }

    fn auto_increment_clause(&self) -> &'static str {
        // SERIAL/BIGSERIAL carry the sequence, there is no keyword.
        ""
    }

    fn resolve(&self, column: &Column) -> ResolvedColumn {
        let mut col = column.clone();
        // Only these types take a length or precision in Postgres.
        let sized = match &col.column_type {
            ColumnType::TinyInt => return ResolvedColumn::new(col, "SMALLINT"),
            ColumnType::SmallInt => {
                let ty = if col.is_auto_increment { "SERIAL" } else { "SMALLINT" };
                return ResolvedColumn::new(col, ty);
            }
            ColumnType::MediumInt | ColumnType::Int | ColumnType::Integer => {
                let ty = if col.is_auto_increment { "SERIAL" } else { "INTEGER" };
                return ResolvedColumn::new(col, ty);
            }
            ColumnType::BigInt => {
                let ty = if col.is_auto_increment { "BIGSERIAL" } else { "BIGINT" };
                return ResolvedColumn::new(col, ty);
            }
            ColumnType::Serial | ColumnType::BigSerial => {
                col.is_auto_increment = true;
                col.nullable = false;
                let ty = col.column_type.to_string();
                return ResolvedColumn::new(col, ty);
            }
            ColumnType::Binary
            | ColumnType::VarBinary
            | ColumnType::TinyBlob
            | ColumnType::Blob
            | ColumnType::MediumBlob
            | ColumnType::LongBlob
            | ColumnType::Bytea => return ResolvedColumn::new(col, "BYTEA"),
            ColumnType::Date => return ResolvedColumn::new(col, "DATE"),
            ColumnType::DateTime | ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::TimestampZ => {
                return ResolvedColumn::new(col, "timestamp with time zone");
            }
            ColumnType::Float | ColumnType::Real => return ResolvedColumn::new(col, "REAL"),
            ColumnType::Double => return ResolvedColumn::new(col, "DOUBLE PRECISION"),
            ColumnType::Text
            | ColumnType::TinyText
            | ColumnType::MediumText
            | ColumnType::LongText => return ResolvedColumn::new(col, "TEXT"),
            ColumnType::NVarchar | ColumnType::Varchar => "VARCHAR",
            ColumnType::Bool | ColumnType::Boolean => return ResolvedColumn::new(col, "BOOLEAN"),
            ColumnType::Json => return ResolvedColumn::new(col, "JSON"),
            ColumnType::Uuid => return ResolvedColumn::new(col, "UUID"),
            other => {
                if col.is_auto_increment {
                    return ResolvedColumn::new(col, "SERIAL");
                }
                other.as_str()
            }
        };
        let sql_type = format!("{sized}{}", precision_suffix(col.length, col.length2));
        ResolvedColumn::new(col, sql_type)
    }

    fn update_table_sql(&self, table_name: &str, columns: &[Column]) -> String {
        let statements: Vec<String> = columns
            .iter()
            .map(|c| format!("ALTER {} TYPE {}", self.quote(&c.name), self.sql_type(c)))
            .collect();
        format!(
            "ALTER TABLE {} {};",
            self.quote(table_name),
            statements.join(", ")
        )
    }

    fn drop_index_sql(&self, table_name: &str, index: &Index) -> String {
        format!("DROP INDEX {} CASCADE", self.quote(&index.name_for(table_name)))
    }

    fn index_check_sql(&self, table_name: &str, index_name: &str) -> Option<Query> {
        Some(catalog_query(
            "SELECT 1 FROM pg_indexes WHERE schemaname={schema} AND tablename=? AND indexname=?",
            self.schema(),
            "current_schema()",
            vec![table_name.into(), index_name.into()],
        ))
    }

    fn column_check_sql(&self, table_name: &str, column_name: &str) -> Option<Query> {
        Some(catalog_query(
            "SELECT 1 FROM information_schema.columns WHERE table_schema={schema} AND table_name=? AND column_name=?",
            self.schema(),
            "current_schema()",
            vec![table_name.into(), column_name.into()],
        ))
    }

    fn clean_table_sql(&self, table_name: &str) -> Vec<AdminStatement> {
        vec![AdminStatement::new(
            TableAction::Delete,
            format!("DROP TABLE IF EXISTS {} CASCADE;", self.qualify(table_name)),
        )]
    }

    fn truncate_sql(&self, table_name: &str) -> String {
        format!(
            "TRUNCATE TABLE {} RESTART IDENTITY CASCADE;",
            self.quote(table_name)
        )
    }

    fn reset_auto_increment_sql(&self, table_name: &str) -> String {
        format!(
            "ALTER SEQUENCE {} RESTART WITH {};",
            self.quote(&format!("{table_name}_id_seq")),
            PRESERVED_TABLE_NEXT_ID
        )
    }

    fn upsert_sql(&self, table_name: &str, key_cols: &[String], update_cols: &[String]) -> String {
        on_conflict_upsert(self, table_name, key_cols, update_cols)
    }

    fn lock_sql(&self, key: &str, _timeout_secs: u32) -> Option<Query> {
        Some((
            "SELECT pg_try_advisory_lock(hashtext(?))".to_string(),
            vec![key.into()],
        ))
    }

    fn unlock_sql(&self, key: &str) -> Option<Query> {
        Some((
            "SELECT pg_advisory_unlock(hashtext(?))".to_string(),
            vec![key.into()],
        ))
    }

    fn is_deadlock(&self, err: &(dyn Error + 'static)) -> bool {
        driver_fault(err).is_some_and(|f| f.has_code(DEADLOCK_DETECTED))
    }

    fn is_unique_constraint_violation(&self, err: &(dyn Error + 'static)) -> bool {
        driver_fault(err).is_some_and(|f| f.has_code(UNIQUE_VIOLATION))
    }
}
