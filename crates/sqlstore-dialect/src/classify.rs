//! Classification of driver errors.
//!
//! The migration runner decides whether to retry, ignore or abort based on a
//! handful of questions about a failed statement. The answers depend on
//! vendor error codes, which each dialect knows; this module only digs the
//! code and message out of whatever error value the driver produced.

use std::error::Error;

use sqlx::mysql::MySqlDatabaseError;

use crate::dialect::Dialect;

/// A vendor error reported by a driver without a sqlx backend.
///
/// Driver adapters for engines such as Dameng wrap their native errors in
/// this type so the dialects can classify them like any other.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct VendorError {
    /// Vendor error code or SQLSTATE.
    pub code: String,
    /// Vendor message.
    pub message: String,
}

impl VendorError {
    /// Creates a vendor error from its code and message.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Code and message of a database-side failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverFault {
    /// Vendor code as text (SQLSTATE for Postgres, extended code for SQLite).
    pub code: Option<String>,
    /// Numeric vendor error number, when the driver exposes one.
    pub number: Option<u32>,
    /// Human-readable vendor message.
    pub message: String,
}

impl DriverFault {
    /// Whether the textual code equals `code`.
    #[must_use]
    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }

    /// Whether the numeric error number equals `number`.
    #[must_use]
    pub fn has_number(&self, number: u32) -> bool {
        self.number == Some(number)
    }
}

/// Finds the database fault in `err` or its source chain.
///
/// Returns `None` when no error in the chain came from a database.
#[must_use]
pub fn driver_fault(err: &(dyn Error + 'static)) -> Option<DriverFault> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(sqlx::Error::Database(db)) = e.downcast_ref::<sqlx::Error>() {
            let code = db.code().map(|c| c.into_owned());
            let number = db
                .try_downcast_ref::<MySqlDatabaseError>()
                .map(|my| u32::from(my.number()))
                .or_else(|| code.as_deref().and_then(|c| c.parse().ok()));
            return Some(DriverFault {
                code,
                number,
                message: db.message().to_string(),
            });
        }
        if let Some(vendor) = e.downcast_ref::<VendorError>() {
            return Some(DriverFault {
                code: Some(vendor.code.clone()),
                number: vendor.code.parse().ok(),
                message: vendor.message.clone(),
            });
        }
        current = e.source();
    }
    None
}

/// The three answers the runner asks about a failed statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorClass {
    /// The statement lost a deadlock and may be retried.
    pub is_deadlock: bool,
    /// The statement hit a unique or primary-key constraint.
    pub is_unique_violation: bool,
    /// Vendor message, empty for non-database errors.
    pub message: String,
}

/// Classifies `err` with the rules of `dialect`.
#[must_use]
pub fn classify<D>(dialect: &D, err: &(dyn Error + 'static)) -> ErrorClass
where
    D: Dialect + ?Sized,
{
    ErrorClass {
        is_deadlock: dialect.is_deadlock(err),
        is_unique_violation: dialect.is_unique_constraint_violation(err),
        message: dialect.error_message(err),
    }
}
