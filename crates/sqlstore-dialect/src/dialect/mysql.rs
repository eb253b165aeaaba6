//! MySQL dialect.
//!
//! The helpers marked `pub(super)` are shared with the other MySQL-family
//! engine (OceanBase), which differs only in collation and a few statements.

use std::error::Error;

use super::{
    catalog_query, precision_suffix, AdminStatement, Dialect, ResolvedColumn,
};
use crate::classify::driver_fault;
use crate::config::EngineKind;
use crate::error::TableAction;
use crate::schema::{Column, ColumnType, Index};
use crate::session::{Query, SqlArg};

/// MySQL error number for a duplicate key.
pub const ER_DUP_ENTRY: u32 = 1062;

/// MySQL error number for a deadlock.
pub const ER_LOCK_DEADLOCK: u32 = 1213;

const MYSQL_COLLATION: &str = "utf8mb4_unicode_ci";

/// Maps a column to its MySQL-family type, appending `collation` to text types.
pub(super) fn resolve_mysql_family(column: &Column, collation: &str) -> ResolvedColumn {
    let mut col = column.clone();
    let mut sql_type = match &col.column_type {
        ColumnType::Bool => {
            col.length = 1;
            "TINYINT".to_string()
        }
        ColumnType::Serial => {
            col.is_auto_increment = true;
            col.is_primary_key = true;
            col.nullable = false;
            "INT".to_string()
        }
        ColumnType::BigSerial => {
            col.is_auto_increment = true;
            col.is_primary_key = true;
            col.nullable = false;
            "BIGINT".to_string()
        }
        ColumnType::Bytea => "BLOB".to_string(),
        ColumnType::TimestampZ => {
            col.length = 64;
            "CHAR".to_string()
        }
        ColumnType::NVarchar => "VARCHAR".to_string(),
        other => other.to_string(),
    };

    if sql_type == "BIGINT" && col.length == 0 && col.length2 == 0 {
        col.length = 20;
    }
    sql_type.push_str(&precision_suffix(col.length, col.length2));

    if col.column_type.is_text() {
        sql_type.push_str(" CHARACTER SET utf8mb4 COLLATE ");
        sql_type.push_str(collation);
    }

    ResolvedColumn::new(col, sql_type)
}

pub(super) fn change_column_sql<D: Dialect + ?Sized>(
    dialect: &D,
    table_name: &str,
    column: &Column,
    new_name: &str,
) -> String {
    format!(
        "ALTER TABLE {} CHANGE {} {} {}",
        dialect.quote(table_name),
        dialect.quote(&column.name),
        dialect.quote(new_name),
        dialect.sql_type(column)
    )
}

pub(super) fn index_check(schema: Option<&str>, table_name: &str, index_name: &str) -> Query {
    catalog_query(
        "SELECT 1 FROM INFORMATION_SCHEMA.STATISTICS WHERE TABLE_SCHEMA={schema} AND TABLE_NAME=? AND INDEX_NAME=?",
        schema,
        "DATABASE()",
        vec![table_name.into(), index_name.into()],
    )
}

pub(super) fn column_check(schema: Option<&str>, table_name: &str, column_name: &str) -> Query {
    catalog_query(
        "SELECT 1 FROM INFORMATION_SCHEMA.COLUMNS WHERE TABLE_SCHEMA={schema} AND TABLE_NAME=? AND COLUMN_NAME=?",
        schema,
        "DATABASE()",
        vec![table_name.into(), column_name.into()],
    )
}

/// Drops a table with foreign-key checks disabled around the drop.
pub(super) fn drop_without_fk_checks<D: Dialect + ?Sized>(
    dialect: &D,
    table_name: &str,
) -> Vec<AdminStatement> {
    vec![
        AdminStatement::new(TableAction::Delete, "set foreign_key_checks = 0"),
        AdminStatement::new(
            TableAction::Delete,
            format!("DROP TABLE IF EXISTS {};", dialect.qualify(table_name)),
        ),
        AdminStatement::new(TableAction::Delete, "set foreign_key_checks = 1"),
    ]
}

pub(super) fn get_lock(key: &str, timeout_secs: u32) -> Query {
    (
        "SELECT GET_LOCK(?, ?)".to_string(),
        vec![key.into(), SqlArg::from(timeout_secs)],
    )
}

pub(super) fn release_lock(key: &str) -> Query {
    ("SELECT RELEASE_LOCK(?)".to_string(), vec![key.into()])
}

pub(super) fn has_error_number(err: &(dyn Error + 'static), number: u32) -> bool {
    driver_fault(err).is_some_and(|f| f.has_number(number))
}

/// MySQL dialect.
#[derive(Debug, Clone, Default)]
pub struct MySqlDialect {
    schema: Option<String>,
}

impl MySqlDialect {
    /// Creates a MySQL dialect for a connection whose database is `schema`.
    #[must_use]
    pub const fn new(schema: Option<String>) -> Self {
        Self { schema }
    }
}

impl Dialect for MySqlDialect {
    fn kind(&self) -> EngineKind {
        EngineKind::MySql
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
        " ENGINE=InnoDB DEFAULT CHARSET UTF8"
    }

    fn resolve(&self, column: &Column) -> ResolvedColumn {
        resolve_mysql_family(column, MYSQL_COLLATION)
    }

    fn update_table_sql(&self, table_name: &str, columns: &[Column]) -> String {
        let mut statements =
            vec![format!("DEFAULT CHARACTER SET utf8mb4 COLLATE {MYSQL_COLLATION}")];
        statements.extend(
            columns
                .iter()
                .map(|c| format!("MODIFY {}", self.column_clause_no_pk(c).trim())),
        );
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
    use crate::schema::Table;

    fn dialect() -> MySqlDialect {
        MySqlDialect::new(Some("grafana".to_string()))
    }

    #[test]
    fn test_type_mapping() {
        let d = dialect();
        assert_eq!(d.sql_type(&Column::new("b", ColumnType::Bool)), "TINYINT(1)");
        assert_eq!(d.sql_type(&Column::new("n", ColumnType::BigInt)), "BIGINT(20)");
        assert_eq!(
            d.sql_type(&Column::new("n", ColumnType::BigInt).length(11)),
            "BIGINT(11)"
        );
        assert_eq!(d.sql_type(&Column::new("d", ColumnType::Bytea)), "BLOB");
        assert_eq!(d.sql_type(&Column::new("t", ColumnType::TimestampZ)), "CHAR(64)");
        assert_eq!(
            d.sql_type(&Column::new("v", ColumnType::NVarchar).length(255)),
            "VARCHAR(255) CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci"
        );
        assert_eq!(
            d.sql_type(&Column::new("p", ColumnType::Decimal).precision(10, 2)),
            "DECIMAL(10,2)"
        );
        assert_eq!(
            d.sql_type(&Column::new("g", ColumnType::Custom("GEOMETRY".into()))),
            "GEOMETRY"
        );
    }

    #[test]
    fn test_serial_normalization() {
        let resolved = dialect().resolve(&Column::new("id", ColumnType::Serial));
        assert_eq!(resolved.sql_type, "INT");
        assert!(resolved.column.is_primary_key);
        assert!(resolved.column.is_auto_increment);
        assert!(!resolved.column.nullable);
    }

    #[test]
    fn test_create_table() {
        let table = Table::new("user")
            .column(
                Column::new("id", ColumnType::BigInt)
                    .primary_key()
                    .auto_increment(),
            )
            .column(Column::new("login", ColumnType::Varchar).length(190).not_null())
            .column(
                Column::new("is_admin", ColumnType::Bool)
                    .not_null()
                    .default("false"),
            );

        assert_eq!(
            dialect().create_table_sql(&table),
            "CREATE TABLE IF NOT EXISTS `user` (\n\
             `id` BIGINT(20) PRIMARY KEY AUTO_INCREMENT NOT NULL\n\
             , `login` VARCHAR(190) CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci NOT NULL\n\
             , `is_admin` TINYINT(1) NOT NULL DEFAULT 0\n\
             ) ENGINE=InnoDB DEFAULT CHARSET UTF8;"
        );
    }

    #[test]
    fn test_update_table() {
        let columns = vec![
            Column::new("title", ColumnType::Varchar).length(255).not_null(),
            Column::new("data", ColumnType::MediumText),
        ];
        assert_eq!(
            dialect().update_table_sql("dashboard", &columns),
            "ALTER TABLE `dashboard` DEFAULT CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci, \
             MODIFY `title` VARCHAR(255) CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci NOT NULL, \
             MODIFY `data` MEDIUMTEXT CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci NULL;"
        );
    }

    #[test]
    fn test_rename_column() {
        let column = Column::new("name", ColumnType::Varchar).length(150);
        assert_eq!(
            dialect().rename_column_sql("team", &column, "title"),
            "ALTER TABLE `team` CHANGE `name` `title` VARCHAR(150) CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci"
        );
    }

    #[test]
    fn test_index_sql() {
        let index = Index::new(["org_id", "login"]).unique();
        assert_eq!(
            dialect().create_index_sql("user", &index),
            "CREATE UNIQUE INDEX `UQE_user_org_id_login` ON `user` (`org_id`,`login`);"
        );
        assert_eq!(
            dialect().drop_index_sql("user", &index),
            "DROP INDEX `UQE_user_org_id_login` ON `user`"
        );
    }

    #[test]
    fn test_existence_checks() {
        let (sql, args) = dialect().index_check_sql("user", "UQE_user_login").unwrap();
        assert_eq!(
            sql,
            "SELECT 1 FROM INFORMATION_SCHEMA.STATISTICS WHERE TABLE_SCHEMA=? AND TABLE_NAME=? AND INDEX_NAME=?"
        );
        assert_eq!(
            args,
            vec![
                SqlArg::from("grafana"),
                SqlArg::from("user"),
                SqlArg::from("UQE_user_login")
            ]
        );

        let (sql, args) = MySqlDialect::default()
            .column_check_sql("user", "email")
            .unwrap();
        assert!(sql.contains("TABLE_SCHEMA=DATABASE() AND TABLE_NAME=? AND COLUMN_NAME=?"));
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_clean_table_brackets_fk_checks() {
        let statements = dialect().clean_table_sql("star");
        let sql: Vec<&str> = statements.iter().map(|s| s.sql.as_str()).collect();
        assert_eq!(
            sql,
            vec![
                "set foreign_key_checks = 0",
                "DROP TABLE IF EXISTS `grafana`.`star`;",
                "set foreign_key_checks = 1",
            ]
        );
    }

    #[test]
    fn test_truncate_preserved_table() {
        let statements = dialect().truncate_table_sql("dashboard_acl");
        assert_eq!(statements.len(), 2);
        assert_eq!(
            statements[0].sql,
            "DELETE FROM `dashboard_acl` WHERE dashboard_id != -1 AND org_id != -1;"
        );
        assert_eq!(statements[1].action, TableAction::Reset);
        assert_eq!(
            statements[1].sql,
            "ALTER TABLE `dashboard_acl` AUTO_INCREMENT = 3;"
        );

        let statements = dialect().truncate_table_sql("user");
        assert_eq!(statements[0].sql, "TRUNCATE TABLE `user`;");
    }

    #[test]
    fn test_upsert() {
        let cols = vec!["key".to_string(), "value".to_string()];
        assert_eq!(
            dialect().upsert_sql("kv_store", &["key".to_string()], &cols),
            "INSERT INTO kv_store (`key`, `value`) VALUES (?, ?) \
             ON DUPLICATE KEY UPDATE `key`=VALUES(`key`), `value`=VALUES(`value`)"
        );
    }

    #[test]
    fn test_locks() {
        let (sql, args) = dialect().lock_sql("grafana-migrate", 5).unwrap();
        assert_eq!(sql, "SELECT GET_LOCK(?, ?)");
        assert_eq!(args, vec![SqlArg::from("grafana-migrate"), SqlArg::Int(5)]);
        assert_eq!(
            dialect().unlock_sql("grafana-migrate").unwrap().0,
            "SELECT RELEASE_LOCK(?)"
        );
    }

    #[test]
    fn test_error_classification() {
        let d = dialect();
        let dup = VendorError::new("1062", "Duplicate entry 'admin' for key 'UQE_user_login'");
        let deadlock = VendorError::new("1213", "Deadlock found when trying to get lock");

        assert!(d.is_unique_constraint_violation(&dup));
        assert!(!d.is_unique_constraint_violation(&deadlock));
        assert!(d.is_deadlock(&deadlock));
        assert!(!d.is_deadlock(&dup));
        assert_eq!(
            d.error_message(&dup),
            "Duplicate entry 'admin' for key 'UQE_user_login'"
        );

        let io = std::io::Error::other("broken pipe");
        assert!(!d.is_unique_constraint_violation(&io));
        assert_eq!(d.error_message(&io), "");
    }
}
