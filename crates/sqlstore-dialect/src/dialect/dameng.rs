//! Dameng (DM) dialect.
//!
//! Dameng speaks an Oracle-flavoured SQL: identity columns instead of
//! sequences, `VARCHAR2`/`CLOB` for text, and schema-qualified DDL.

use std::error::Error;

use super::{
    catalog_query, precision_suffix, quote_all, AdminStatement, Dialect, ResolvedColumn,
};
use crate::classify::driver_fault;
use crate::config::EngineKind;
use crate::error::TableAction;
use crate::schema::{Column, ColumnType, Index};
use crate::session::Query;

/// Error code Dameng reports for a unique-constraint violation.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Length forced onto UUID columns.
const UUID_LENGTH: u32 = 40;

/// Dameng dialect.
#[derive(Debug, Clone, Default)]
pub struct DamengDialect {
    schema: Option<String>,
}

impl DamengDialect {
    /// Creates a Dameng dialect; `schema` is the owner DDL is qualified with.
    #[must_use]
    pub const fn new(schema: Option<String>) -> Self {
        Self { schema }
    }
}

impl Dialect for DamengDialect {
    fn kind(&self) -> EngineKind {
        EngineKind::Dameng
    }

    fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    fn auto_increment_clause(&self) -> &'static str {
        "IDENTITY"
    }

    fn null_on_primary_key(&self) -> bool {
        false
    }

    fn resolve(&self, column: &Column) -> ResolvedColumn {
        let mut col = column.clone();
        let base = match &col.column_type {
            ColumnType::TinyInt => return ResolvedColumn::new(col, "TINYINT"),
            ColumnType::Custom(name) if name.eq_ignore_ascii_case("BYTE") => {
                return ResolvedColumn::new(col, "TINYINT");
            }
            ColumnType::SmallInt
            | ColumnType::MediumInt
            | ColumnType::Int
            | ColumnType::Integer => return ResolvedColumn::new(col, "INTEGER"),
            ColumnType::BigInt | ColumnType::Serial | ColumnType::BigSerial => {
                return ResolvedColumn::new(col, "BIGINT");
            }
            ColumnType::Bit | ColumnType::Bool | ColumnType::Boolean => {
                return ResolvedColumn::new(col, "BIT");
            }
            ColumnType::Uuid => {
                col.length = UUID_LENGTH;
                "VARCHAR"
            }
            ColumnType::Binary => {
                if col.length == 0 {
                    return ResolvedColumn::new(col, "BINARY(MAX)");
                }
                "BINARY"
            }
            ColumnType::VarBinary
            | ColumnType::TinyBlob
            | ColumnType::Blob
            | ColumnType::MediumBlob
            | ColumnType::LongBlob
            | ColumnType::Bytea => return ResolvedColumn::new(col, "VARBINARY"),
            ColumnType::Date => return ResolvedColumn::new(col, "DATE"),
            ColumnType::Time => {
                let ty = format!("TIME{}", precision_suffix(col.length, 0));
                return ResolvedColumn::new(col, ty);
            }
            ColumnType::DateTime | ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::TimestampZ => {
                let ty = format!(
                    "TIMESTAMP{} WITH TIME ZONE",
                    precision_suffix(col.length, 0)
                );
                return ResolvedColumn::new(col, ty);
            }
            ColumnType::Float => "FLOAT",
            ColumnType::Real | ColumnType::Double => "REAL",
            ColumnType::Numeric | ColumnType::Decimal => "NUMERIC",
            ColumnType::Custom(name) if name.eq_ignore_ascii_case("NUMBER") => "NUMERIC",
            ColumnType::Text | ColumnType::Json => return ResolvedColumn::new(col, "TEXT"),
            ColumnType::MediumText | ColumnType::LongText => "CLOB",
            ColumnType::Char | ColumnType::Varchar | ColumnType::TinyText => "VARCHAR2",
            other => {
                let ty = format!("{other}{}", precision_suffix(col.length, col.length2));
                return ResolvedColumn::new(col, ty);
            }
        };
        let sql_type = format!("{base}{}", precision_suffix(col.length, col.length2));
        ResolvedColumn::new(col, sql_type)
    }

    fn update_table_sql(&self, table_name: &str, columns: &[Column]) -> String {
        let statements: Vec<String> = columns
            .iter()
            .map(|c| self.column_clause_no_pk(c).trim().to_string())
            .collect();
        format!(
            "alter table {} modify ({});",
            self.qualify(table_name),
            statements.join(", ")
        )
    }

    fn create_index_sql(&self, table_name: &str, index: &Index) -> String {
        let unique = if index.is_unique() { " UNIQUE" } else { "" };
        format!(
            "CREATE{} INDEX {} ON {} ({});",
            unique,
            self.quote(&index.name_for(table_name)),
            self.qualify(table_name),
            quote_all(self, &index.columns).join(",")
        )
    }

    fn drop_index_sql(&self, table_name: &str, index: &Index) -> String {
        format!("DROP INDEX {}", self.qualify(&index.name_for(table_name)))
    }

    fn index_check_sql(&self, table_name: &str, index_name: &str) -> Option<Query> {
        Some(catalog_query(
            "SELECT INDEX_NAME FROM ALL_INDEXES WHERE TABLE_NAME = ? AND INDEX_NAME = ? AND OWNER = {schema}",
            self.schema(),
            "USER",
            vec![table_name.into(), index_name.into()],
        ))
    }

    fn column_check_sql(&self, table_name: &str, column_name: &str) -> Option<Query> {
        // The catalog contract of this engine checks ALL_INDEXES here too.
        Some(catalog_query(
            "SELECT 1 FROM ALL_INDEXES WHERE TABLE_NAME = ? AND INDEX_NAME = ? AND OWNER = {schema}",
            self.schema(),
            "USER",
            vec![table_name.into(), column_name.into()],
        ))
    }

    fn clean_table_sql(&self, table_name: &str) -> Vec<AdminStatement> {
        vec![AdminStatement::new(
            TableAction::Delete,
            format!("drop table {};", self.qualify(table_name)),
        )]
    }

    fn is_unique_constraint_violation(&self, err: &(dyn Error + 'static)) -> bool {
        driver_fault(err).is_some_and(|f| f.has_code(UNIQUE_VIOLATION))
    }
}
