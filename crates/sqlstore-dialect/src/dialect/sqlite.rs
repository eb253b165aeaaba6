//! SQLite dialect.
//!
//! SQLite uses type affinity, so every abstract type collapses onto one of
//! a handful of storage classes and no lengths are rendered.

use std::error::Error;

use super::postgres::on_conflict_upsert;
use super::{Dialect, ResolvedColumn, PRESERVED_TABLE_NEXT_ID};
use crate::classify::driver_fault;
use crate::config::EngineKind;
use crate::schema::{Column, ColumnType, Index};
use crate::session::Query;

/// `SQLITE_CONSTRAINT_UNIQUE`.
pub const CONSTRAINT_UNIQUE: u32 = 2067;

/// `SQLITE_CONSTRAINT_PRIMARYKEY`.
pub const CONSTRAINT_PRIMARYKEY: u32 = 1555;

/// Primary result codes of `SQLITE_BUSY` and `SQLITE_LOCKED`.
const BUSY: u32 = 5;
const LOCKED: u32 = 6;

/// SQLite dialect.
#[derive(Debug, Clone, Default)]
pub struct SqliteDialect {
    schema: Option<String>,
}

impl SqliteDialect {
    /// Creates a SQLite dialect; `schema` names an attached database.
    #[must_use]
    pub const fn new(schema: Option<String>) -> Self {
        Self { schema }
    }
}

impl Dialect for SqliteDialect {
    fn kind(&self) -> EngineKind {
        EngineKind::Sqlite
    }

    fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    fn quote_char(&self) -> char {
        '`'
    }

    fn auto_increment_clause(&self) -> &'static str {
        "AUTOINCREMENT"
    }

    fn resolve(&self, column: &Column) -> ResolvedColumn {
        let mut col = column.clone();
        let sql_type = match &col.column_type {
            ColumnType::Date | ColumnType::DateTime | ColumnType::Time | ColumnType::Timestamp => {
                "DATETIME".to_string()
            }
            ColumnType::TimestampZ
            | ColumnType::Char
            | ColumnType::Varchar
            | ColumnType::NVarchar
            | ColumnType::TinyText
            | ColumnType::Text
            | ColumnType::MediumText
            | ColumnType::LongText => "TEXT".to_string(),
            ColumnType::Bit
            | ColumnType::TinyInt
            | ColumnType::SmallInt
            | ColumnType::MediumInt
            | ColumnType::Int
            | ColumnType::Integer
            | ColumnType::BigInt
            | ColumnType::Bool
            | ColumnType::Boolean => "INTEGER".to_string(),
            ColumnType::Float | ColumnType::Double | ColumnType::Real => "REAL".to_string(),
            ColumnType::Decimal | ColumnType::Numeric => "NUMERIC".to_string(),
            ColumnType::TinyBlob
            | ColumnType::Blob
            | ColumnType::MediumBlob
            | ColumnType::LongBlob
            | ColumnType::Bytea
            | ColumnType::Binary
            | ColumnType::VarBinary => "BLOB".to_string(),
            ColumnType::Serial | ColumnType::BigSerial => {
                col.is_primary_key = true;
                col.is_auto_increment = true;
                col.nullable = false;
                "INTEGER".to_string()
            }
            other => other.to_string(),
        };
        ResolvedColumn::new(col, sql_type)
    }

    fn drop_index_sql(&self, table_name: &str, index: &Index) -> String {
        format!("DROP INDEX {}", self.quote(&index.name_for(table_name)))
    }

    fn index_check_sql(&self, table_name: &str, index_name: &str) -> Option<Query> {
        Some((
            "SELECT 1 FROM sqlite_master WHERE type='index' AND tbl_name=? AND name=?".to_string(),
            vec![table_name.into(), index_name.into()],
        ))
    }

    fn column_check_sql(&self, table_name: &str, column_name: &str) -> Option<Query> {
        Some((
            "SELECT 1 FROM pragma_table_info(?) WHERE name=?".to_string(),
            vec![table_name.into(), column_name.into()],
        ))
    }

    fn truncate_sql(&self, table_name: &str) -> String {
        format!("DELETE FROM {};", self.quote(table_name))
    }

    fn reset_auto_increment_sql(&self, table_name: &str) -> String {
        // sqlite_sequence stores the last id handed out.
        format!(
            "UPDATE sqlite_sequence SET seq = {} WHERE name = '{}';",
            PRESERVED_TABLE_NEXT_ID - 1,
            table_name
        )
    }

    fn upsert_sql(&self, table_name: &str, key_cols: &[String], update_cols: &[String]) -> String {
        on_conflict_upsert(self, table_name, key_cols, update_cols)
    }

    fn is_deadlock(&self, err: &(dyn Error + 'static)) -> bool {
        driver_fault(err)
            .and_then(|f| f.number)
            .is_some_and(|n| matches!(n & 0xff, BUSY | LOCKED))
    }

    fn is_unique_constraint_violation(&self, err: &(dyn Error + 'static)) -> bool {
        driver_fault(err)
            .is_some_and(|f| f.has_number(CONSTRAINT_UNIQUE) || f.has_number(CONSTRAINT_PRIMARYKEY))
    }
}
