//! Database dialect implementations.
//!
//! Every supported engine implements [`Dialect`]. Engine constants and the
//! type-mapping table are required methods; everything built on top of them
//! (column clauses, CREATE TABLE, index DDL, upserts, admin statements) is a
//! default method that calls back into `self`, so an engine only overrides
//! the statements where its syntax differs.

mod dameng;
mod mysql;
mod oceanbase;
mod postgres;
mod sqlite;

pub use dameng::DamengDialect;
pub use mysql::MySqlDialect;
pub use oceanbase::OceanBaseDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use std::error::Error;

use crate::classify::driver_fault;
use crate::config::EngineKind;
use crate::error::TableAction;
use crate::schema::{Column, Index, Table};
use crate::session::{Query, SqlArg};

/// Table whose default rows survive [`Dialect::truncate_table_sql`].
pub const PRESERVED_TABLE: &str = "dashboard_acl";

/// Auto-increment value the preserved table restarts from.
pub const PRESERVED_TABLE_NEXT_ID: u32 = 3;

/// A column after type resolution.
///
/// Resolution may force flags and lengths on the column (a SERIAL column
/// becomes an auto-increment primary key, a boolean gets length 1, ...).
/// Rendering always works from the resolved column, never the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    /// The normalized column.
    pub column: Column,
    /// Concrete SQL type, including any length and charset suffix.
    pub sql_type: String,
}

impl ResolvedColumn {
    /// Pairs a normalized column with its SQL type.
    #[must_use]
    pub fn new(column: Column, sql_type: impl Into<String>) -> Self {
        Self {
            column,
            sql_type: sql_type.into(),
        }
    }
}

/// One statement of an administrative table operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminStatement {
    /// The SQL to execute.
    pub sql: String,
    /// What the statement does, used to report failures.
    pub action: TableAction,
}

impl AdminStatement {
    /// Creates a statement performing `action`.
    #[must_use]
    pub fn new(action: TableAction, sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            action,
        }
    }
}

/// Renders the `(length)` or `(length,length2)` suffix of a type.
#[must_use]
pub fn precision_suffix(length: u32, length2: u32) -> String {
    if length2 > 0 {
        format!("({length},{length2})")
    } else if length > 0 {
        format!("({length})")
    } else {
        String::new()
    }
}

/// Parses a boolean default the way migration definitions write them.
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Quotes every name with the dialect's quote character.
pub fn quote_all<D>(dialect: &D, names: &[String]) -> Vec<String>
where
    D: Dialect + ?Sized,
{
    names.iter().map(|n| dialect.quote(n)).collect()
}

/// Trait for engine-specific SQL generation.
pub trait Dialect: Send + Sync {
    /// Returns the engine this dialect targets.
    fn kind(&self) -> EngineKind;

    /// Returns the driver name tag.
    fn driver_name(&self) -> &'static str {
        self.kind().driver_name()
    }

    /// Default schema of the connection, when configured.
    fn schema(&self) -> Option<&str> {
        None
    }

    /// Returns the identifier quote character.
    fn quote_char(&self) -> char {
        '"'
    }

    /// Quotes an identifier (table name, column name, etc.).
    fn quote(&self, name: &str) -> String {
        let q = self.quote_char();
        format!("{q}{name}{q}")
    }

    /// Quotes `name`, prefixed with the quoted schema when one is configured.
    fn qualify(&self, name: &str) -> String {
        match self.schema() {
            Some(schema) => format!("{}.{}", self.quote(schema), self.quote(name)),
            None => self.quote(name),
        }
    }

    /// Renders a boolean literal.
    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    /// Returns the auto-increment keyword, empty when the type carries it.
    fn auto_increment_clause(&self) -> &'static str;

    /// Whether column clauses spell out `NULL`/`NOT NULL`.
    fn show_create_null(&self) -> bool {
        true
    }

    /// Whether nullability is also rendered on an inline primary key.
    fn null_on_primary_key(&self) -> bool {
        true
    }

    /// Whether CREATE TABLE declares a storage engine and charset.
    fn supports_engine(&self) -> bool {
        false
    }

    /// Storage engine and charset suffix of CREATE TABLE.
    fn table_options(&self) -> &'static str {
        ""
    }

    /// Resolves the column's abstract type to a concrete SQL type.
    fn resolve(&self, column: &Column) -> ResolvedColumn;

    /// Returns just the concrete SQL type of `column`.
    fn sql_type(&self, column: &Column) -> String {
        self.resolve(column).sql_type
    }

    /// Renders the default value of `column`.
    ///
    /// Boolean defaults are normalized to the engine's literal; anything that
    /// does not parse as a boolean is passed through.
    fn default_value(&self, column: &Column) -> String {
        if column.column_type.is_bool() {
            if let Some(value) = parse_bool(column.default.trim()) {
                return self.boolean_literal(value).to_string();
            }
        }
        column.default.clone()
    }

    /// Renders a resolved column, with or without its primary-key clause.
    fn render_column(&self, resolved: &ResolvedColumn, include_pk: bool) -> String {
        let col = &resolved.column;
        let mut sql = format!("{} {} ", self.quote(&col.name), resolved.sql_type);

        let inline_pk = include_pk && col.is_primary_key;
        if inline_pk {
            sql.push_str("PRIMARY KEY ");
            let auto_increment = self.auto_increment_clause();
            if col.is_auto_increment && !auto_increment.is_empty() {
                sql.push_str(auto_increment);
                sql.push(' ');
            }
        }

        if self.show_create_null() && (!inline_pk || self.null_on_primary_key()) {
            sql.push_str(if col.nullable { "NULL " } else { "NOT NULL " });
        }

        if col.has_default() {
            sql.push_str("DEFAULT ");
            sql.push_str(&self.default_value(col));
            sql.push(' ');
        }

        sql
    }

    /// Column clause including the primary-key declaration.
    fn column_clause(&self, column: &Column) -> String {
        self.render_column(&self.resolve(column), true)
    }

    /// Column clause without the primary-key declaration, for ALTER/MODIFY.
    fn column_clause_no_pk(&self, column: &Column) -> String {
        self.render_column(&self.resolve(column), false)
    }

    /// Generates SQL for CREATE TABLE.
    fn create_table_sql(&self, table: &Table) -> String {
        let mut resolved: Vec<ResolvedColumn> =
            table.columns.iter().map(|c| self.resolve(c)).collect();

        // Resolution can turn a column into a primary key (SERIAL types).
        let mut pk_list = table.primary_keys.clone();
        for r in &resolved {
            if r.column.is_primary_key && !pk_list.contains(&r.column.name) {
                pk_list.push(r.column.name.clone());
            }
        }

        // The key list wins over unflagged columns.
        for r in &mut resolved {
            if pk_list.contains(&r.column.name) {
                r.column.is_primary_key = true;
                r.column.nullable = false;
            }
        }

        let mut defs: Vec<String> = resolved
            .iter()
            .map(|r| {
                let inline = pk_list.len() == 1 && pk_list.contains(&r.column.name);
                self.render_column(r, inline).trim().to_string()
            })
            .collect();

        if pk_list.len() > 1 {
            defs.push(format!(
                "PRIMARY KEY ({})",
                quote_all(self, &pk_list).join(",")
            ));
        }

        let mut sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
            self.quote(&table.name),
            defs.join("\n, ")
        );
        if self.supports_engine() {
            sql.push_str(self.table_options());
        }
        sql.push(';');
        sql
    }

    /// Generates SQL for ADD COLUMN.
    fn add_column_sql(&self, table_name: &str, column: &Column) -> String {
        format!(
            "alter table {} ADD COLUMN {}",
            self.quote(table_name),
            self.column_clause_no_pk(column).trim()
        )
    }

    /// Generates SQL to alter several columns of a table at once.
    fn update_table_sql(&self, _table_name: &str, _columns: &[Column]) -> String {
        "-- NOT REQUIRED".to_string()
    }

    /// Generates SQL for renaming a column.
    fn rename_column_sql(&self, table_name: &str, column: &Column, new_name: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            self.quote(table_name),
            self.quote(&column.name),
            self.quote(new_name)
        )
    }

    /// Generates SQL for renaming a table.
    fn rename_table_sql(&self, old_name: &str, new_name: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME TO {}",
            self.quote(old_name),
            self.quote(new_name)
        )
    }

    /// Generates SQL for DROP TABLE.
    fn drop_table_sql(&self, table_name: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", self.quote(table_name))
    }

    /// Generates SQL copying rows between tables, column by column.
    fn copy_table_data_sql(
        &self,
        source_table: &str,
        target_table: &str,
        source_columns: &[String],
        target_columns: &[String],
    ) -> String {
        format!(
            "INSERT INTO {} ({}) SELECT {} FROM {}",
            self.quote(target_table),
            quote_all(self, target_columns).join(", "),
            quote_all(self, source_columns).join(", "),
            self.quote(source_table)
        )
    }

    /// Generates SQL for CREATE INDEX.
    fn create_index_sql(&self, table_name: &str, index: &Index) -> String {
        let unique = if index.is_unique() { " UNIQUE" } else { "" };
        format!(
            "CREATE{} INDEX {} ON {} ({});",
            unique,
            self.quote(&index.name_for(table_name)),
            self.quote(table_name),
            quote_all(self, &index.columns).join(",")
        )
    }

    /// Generates SQL for DROP INDEX.
    fn drop_index_sql(&self, table_name: &str, index: &Index) -> String {
        format!(
            "DROP INDEX {} ON {}",
            self.quote(&index.name_for(table_name)),
            self.quote(table_name)
        )
    }

    /// Query returning a row when `index_name` exists on `table_name`.
    ///
    /// `None` when the engine has no catalog to ask.
    fn index_check_sql(&self, _table_name: &str, _index_name: &str) -> Option<Query> {
        None
    }

    /// Query returning a row when `column_name` exists on `table_name`.
    fn column_check_sql(&self, _table_name: &str, _column_name: &str) -> Option<Query> {
        None
    }

    /// Statement that does nothing.
    fn no_op_sql(&self) -> &'static str {
        "SELECT 0;"
    }

    /// LIMIT clause.
    fn limit_sql(&self, limit: u64) -> String {
        format!(" LIMIT {limit}")
    }

    /// LIMIT/OFFSET clause.
    fn limit_offset_sql(&self, limit: u64, offset: u64) -> String {
        format!(" LIMIT {limit} OFFSET {offset}")
    }

    /// Statements dropping one table while cleaning the database.
    fn clean_table_sql(&self, table_name: &str) -> Vec<AdminStatement> {
        vec![AdminStatement::new(
            TableAction::Delete,
            format!("DROP TABLE IF EXISTS {};", self.qualify(table_name)),
        )]
    }

    /// Statement emptying one table.
    fn truncate_sql(&self, table_name: &str) -> String {
        format!("TRUNCATE TABLE {};", self.quote(table_name))
    }

    /// Statement restarting the preserved table's auto-increment counter.
    fn reset_auto_increment_sql(&self, table_name: &str) -> String {
        format!(
            "ALTER TABLE {} AUTO_INCREMENT = {};",
            self.quote(table_name),
            PRESERVED_TABLE_NEXT_ID
        )
    }

    /// Statements emptying one table while truncating the database.
    ///
    /// The preserved table keeps its sentinel rows (both foreign keys `-1`)
    /// and has its counter reset instead of being truncated.
    fn truncate_table_sql(&self, table_name: &str) -> Vec<AdminStatement> {
        if table_name == PRESERVED_TABLE {
            return vec![
                AdminStatement::new(
                    TableAction::Truncate,
                    format!(
                        "DELETE FROM {} WHERE dashboard_id != -1 AND org_id != -1;",
                        self.quote(table_name)
                    ),
                ),
                AdminStatement::new(
                    TableAction::Reset,
                    self.reset_auto_increment_sql(table_name),
                ),
            ];
        }
        vec![AdminStatement::new(
            TableAction::Truncate,
            self.truncate_sql(table_name),
        )]
    }

    /// Generates an insert-or-update statement.
    ///
    /// The default relies on the table's own unique keys to hit the
    /// duplicate-key path, so `key_cols` is unused.
    fn upsert_sql(&self, table_name: &str, _key_cols: &[String], update_cols: &[String]) -> String {
        let columns = quote_all(self, update_cols);
        let placeholders = vec!["?"; update_cols.len()];
        let assignments: Vec<String> = columns.iter().map(|c| format!("{c}=VALUES({c})")).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({}) ON DUPLICATE KEY UPDATE {}",
            table_name,
            columns.join(", "),
            placeholders.join(", "),
            assignments.join(", ")
        )
    }

    /// Query acquiring the named migration lock.
    fn lock_sql(&self, _key: &str, _timeout_secs: u32) -> Option<Query> {
        None
    }

    /// Query releasing the named migration lock.
    fn unlock_sql(&self, _key: &str) -> Option<Query> {
        None
    }

    /// Whether `err` reports a deadlock.
    fn is_deadlock(&self, _err: &(dyn Error + 'static)) -> bool {
        false
    }

    /// Whether `err` reports a unique-constraint violation.
    fn is_unique_constraint_violation(&self, err: &(dyn Error + 'static)) -> bool;

    /// Vendor message of `err`, or an empty string for non-database errors.
    fn error_message(&self, err: &(dyn Error + 'static)) -> String {
        driver_fault(err).map(|f| f.message).unwrap_or_default()
    }
}

/// Builds `(sql, args)` for a catalog check.
///
/// `{schema}` in the template becomes a placeholder bound to the configured
/// schema, at its position among the other placeholders, or the engine's
/// current-schema expression when no schema is configured.
fn catalog_query(
    template: &str,
    schema: Option<&str>,
    current_schema: &str,
    mut args: Vec<SqlArg>,
) -> Query {
    let Some(at) = template.find("{schema}") else {
        return (template.to_string(), args);
    };
    match schema {
        Some(schema) => {
            let position = template[..at].matches('?').count().min(args.len());
            args.insert(position, SqlArg::from(schema));
            (template.replacen("{schema}", "?", 1), args)
        }
        None => (template.replacen("{schema}", current_schema, 1), args),
    }
}
