//! OceanBase dialect (MySQL mode).

use std::error::Error;

use super::mysql::{
    change_column_sql, column_check, drop_without_fk_checks, get_lock, has_error_number,
    index_check, release_lock, resolve_mysql_family, ER_DUP_ENTRY, ER_LOCK_DEADLOCK,
};
use super::{AdminStatement, Dialect, ResolvedColumn};
use crate::config::EngineKind;
use crate::schema::{Column, Index};
use crate::session::Query;

const OCEANBASE_COLLATION: &str = "utf8mb4_general_ci";

/// OceanBase dialect.
///
/// Speaks MySQL, but declares `utf8mb4_general_ci` everywhere and does not
/// restate the table charset when modifying columns.
#[derive(Debug, Clone, Default)]
pub struct OceanBaseDialect {
    schema: Option<String>,
}

impl OceanBaseDialect {
    /// Creates an OceanBase dialect for a connection whose database is `schema`.
    #[must_use]
    pub const fn new(schema: Option<String>) -> Self {
        Self { schema }
    }
}

impl Dialect for OceanBaseDialect {
    fn kind(&self) -> EngineKind {
        EngineKind::OceanBase
    }

    fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    fn quote_char(&self) -> char {
        '`'
    }

    fn auto_increment_clause(&self) -> &'static str {
        "AUTO_INCREMENT"
    }

    fn supports_engine(&self) -> bool {
        true
    }

    fn table_options(&self) -> &'static str {
        " ENGINE=InnoDB DEFAULT CHARSET utf8mb4 COLLATE utf8mb4_general_ci"
    }

    fn resolve(&self, column: &Column) -> ResolvedColumn {
        resolve_mysql_family(column, OCEANBASE_COLLATION)
    }

    fn update_table_sql(&self, table_name: &str, columns: &[Column]) -> String {
        let statements: Vec<String> = columns
            .iter()
            .map(|c| format!("MODIFY {}", self.column_clause_no_pk(c).trim()))
            .collect();
        format!(
            "ALTER TABLE {} {};",
            self.quote(table_name),
            statements.join(", ")
        )
    }

    fn rename_column_sql(&self, table_name: &str, column: &Column, new_name: &str) -> String {
        change_column_sql(self, table_name, column, new_name)
    }

    fn rename_table_sql(&self, old_name: &str, new_name: &str) -> String {
        format!(
            "RENAME TABLE {} TO {}",
            self.quote(old_name),
            self.quote(new_name)
        )
    }

    fn drop_index_sql(&self, table_name: &str, index: &Index) -> String {
        format!(
            "DROP INDEX {} ON {}",
            self.quote(&index.name_for(table_name)),
            self.quote(table_name)
        )
    }

    fn index_check_sql(&self, table_name: &str, index_name: &str) -> Option<Query> {
        Some(index_check(self.schema(), table_name, index_name))
    }

    fn column_check_sql(&self, table_name: &str, column_name: &str) -> Option<Query> {
        Some(column_check(self.schema(), table_name, column_name))
    }

    fn clean_table_sql(&self, table_name: &str) -> Vec<AdminStatement> {
        drop_without_fk_checks(self, table_name)
    }

    fn lock_sql(&self, key: &str, timeout_secs: u32) -> Option<Query> {
        Some(get_lock(key, timeout_secs))
    }

    fn unlock_sql(&self, key: &str) -> Option<Query> {
        Some(release_lock(key))
    }

    fn is_deadlock(&self, err: &(dyn Error + 'static)) -> bool {
        has_error_number(err, ER_LOCK_DEADLOCK)
    }

    fn is_unique_constraint_violation(&self, err: &(dyn Error + 'static)) -> bool {
        has_error_number(err, ER_DUP_ENTRY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::VendorError;
    use crate::schema::{ColumnType, Table};

    fn dialect() -> OceanBaseDialect {
        OceanBaseDialect::new(Some("grafana".to_string()))
    }

    #[test]
    fn test_text_types_use_general_collation() {
        let d = dialect();
        assert_eq!(
            d.sql_type(&Column::new("title", ColumnType::Varchar).length(255)),
            "VARCHAR(255) CHARACTER SET utf8mb4 COLLATE utf8mb4_general_ci"
        );
        assert_eq!(
            d.sql_type(&Column::new("body", ColumnType::LongText)),
            "LONGTEXT CHARACTER SET utf8mb4 COLLATE utf8mb4_general_ci"
        );
        assert_eq!(d.sql_type(&Column::new("flag", ColumnType::Bool)), "TINYINT(1)");
    }

    #[test]
    fn test_create_table_with_composite_key() {
        let table = Table::new("team_member")
            .column(Column::new("team_id", ColumnType::BigInt).not_null())
            .column(Column::new("user_id", ColumnType::BigInt).not_null())
            .column(Column::new("permission", ColumnType::SmallInt).default("0"))
            .primary_key(["team_id", "user_id"]);

        assert_eq!(
            dialect().create_table_sql(&table),
            "CREATE TABLE IF NOT EXISTS `team_member` (\n\
             `team_id` BIGINT(20) NOT NULL\n\
             , `user_id` BIGINT(20) NOT NULL\n\
             , `permission` SMALLINT NULL DEFAULT 0\n\
             , PRIMARY KEY (`team_id`,`user_id`)\n\
             ) ENGINE=InnoDB DEFAULT CHARSET utf8mb4 COLLATE utf8mb4_general_ci;"
        );
    }

    #[test]
    fn test_update_table_has_no_charset_fragment() {
        let columns = vec![Column::new("login", ColumnType::Varchar).length(190).not_null()];
        assert_eq!(
            dialect().update_table_sql("user", &columns),
            "ALTER TABLE `user` MODIFY `login` VARCHAR(190) CHARACTER SET utf8mb4 COLLATE utf8mb4_general_ci NOT NULL;"
        );
    }

    #[test]
    fn test_rename_column() {
        let column = Column::new("is_disabled", ColumnType::Bool);
        assert_eq!(
            dialect().rename_column_sql("user", &column, "disabled"),
            "ALTER TABLE `user` CHANGE `is_disabled` `disabled` TINYINT(1)"
        );
    }

    #[test]
    fn test_classification_matches_mysql_codes() {
        let d = dialect();
        assert!(d.is_unique_constraint_violation(&VendorError::new("1062", "Duplicate entry")));
        assert!(d.is_deadlock(&VendorError::new("1213", "Deadlock found")));
        assert!(!d.is_deadlock(&VendorError::new("1205", "Lock wait timeout exceeded")));
    }
}
