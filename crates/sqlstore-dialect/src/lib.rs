//! SQL dialects for a multi-engine schema migrator.
//!
//! `sqlstore-dialect` renders one database-agnostic description of schema
//! changes into engine-specific SQL, and classifies driver errors into the
//! few outcomes a migration runner acts on.
//!
//! # Architecture
//!
//! - **Schema** - Tables, columns and indexes a migration wants to exist
//! - **Dialect** - One [`Dialect`](dialect::Dialect) per engine (MySQL,
//!   OceanBase, PostgreSQL, SQLite, Dameng) generating DDL, catalog checks
//!   and upserts
//! - **Classify** - Deadlock and unique-violation detection over driver errors
//! - **Admin** - Dropping or emptying every table through a [`Session`](session::Session)
//! - **Registry** - Picking the dialect from configuration
//!
//! # Example
//!
//! ```rust
//! use sqlstore_dialect::prelude::*;
//!
//! let dialect = new_dialect(&DialectConfig::new(EngineKind::MySql));
//!
//! let table = Table::new("user")
//!     .column(Column::new("id", ColumnType::BigInt).primary_key().auto_increment())
//!     .column(Column::new("login", ColumnType::Varchar).length(190).not_null());
//!
//! let sql = dialect.create_table_sql(&table);
//! assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS `user`"));
//! assert!(sql.contains("`id` BIGINT(20) PRIMARY KEY AUTO_INCREMENT NOT NULL"));
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Print the CREATE TABLE statement of a table definition
//! sqlstore-dialect --engine postgres create-table user.json
//!
//! # Empty every table of a SQLite database
//! sqlstore-dialect --engine sqlite3 truncate --database sqlite:grafana.db
//! ```

pub mod admin;
pub mod classify;
pub mod config;
pub mod dialect;
pub mod error;
pub mod registry;
pub mod schema;
pub mod session;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::admin::{clean_db, truncate_db_tables};
    pub use crate::classify::{classify, driver_fault, ErrorClass, VendorError};
    pub use crate::config::{DialectConfig, EngineKind};
    pub use crate::dialect::{
        AdminStatement, DamengDialect, Dialect, MySqlDialect, OceanBaseDialect, PostgresDialect,
        ResolvedColumn, SqliteDialect,
    };
    pub use crate::error::{DialectError, Result, TableAction};
    pub use crate::registry::{dialect_for, new_dialect};
    pub use crate::schema::{Column, ColumnType, Index, IndexKind, Table, TableMetadata};
    pub use crate::session::{Query, Session, SqlArg, SqliteSession};
}
