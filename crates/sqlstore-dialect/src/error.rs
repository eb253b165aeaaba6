//! Error types for the dialect layer.

use std::fmt;

/// Which part of an administrative table operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableAction {
    /// Dropping the table.
    Delete,
    /// Emptying the table.
    Truncate,
    /// Resetting the table's auto-increment counter.
    Reset,
}

impl fmt::Display for TableAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Delete => "delete",
            Self::Truncate => "truncate",
            Self::Reset => "reset",
        })
    }
}

/// Errors that can occur while executing dialect SQL.
///
/// SQL generation itself never fails; these errors come from the session
/// or from setting the layer up.
#[derive(Debug, thiserror::Error)]
pub enum DialectError {
    /// Database error returned by the driver.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A statement of a bulk table operation failed.
    #[error("failed to {action} table {table:?}")]
    Table {
        /// The table being processed.
        table: String,
        /// What was being done to it.
        action: TableAction,
        /// The underlying failure.
        #[source]
        source: Box<DialectError>,
    },

    /// The configured engine kind is not known.
    #[error("Unknown database engine: {0}")]
    UnknownEngine(String),

    /// The engine has no support for the requested operation.
    #[error("Engine '{engine}' does not support {operation}")]
    UnsupportedEngine {
        /// Engine driver name.
        engine: String,
        /// The operation requested.
        operation: String,
    },

    /// Invalid or incomplete configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error (reading definitions or configuration).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DialectError {
    /// Wraps `source` with the table and action it failed on.
    pub fn table(table: impl Into<String>, action: TableAction, source: Self) -> Self {
        Self::Table {
            table: table.into(),
            action,
            source: Box::new(source),
        }
    }
}

/// Result type for dialect operations.
pub type Result<T> = std::result::Result<T, DialectError>;
