//! Administrative database operations used by test harnesses.
//!
//! Both operations enumerate the tables of the session's schema and run the
//! dialect's per-table statements strictly in order. The first failure aborts
//! the operation; statements already executed are not rolled back.

use tracing::{debug, info, warn};

use crate::dialect::{AdminStatement, Dialect};
use crate::error::{DialectError, Result};
use crate::session::Session;

/// Drops every table of the session's schema.
///
/// Returns the number of tables dropped.
pub async fn clean_db<D, S>(dialect: &D, session: &S) -> Result<usize>
where
    D: Dialect + ?Sized,
    S: Session,
{
    let tables = session.list_tables().await?;
    info!(
        engine = %dialect.driver_name(),
        tables = tables.len(),
        "Cleaning database"
    );

    let mut dropped = 0;
    for table in &tables {
        if table.name.is_empty() {
            continue;
        }
        let statements = dialect.clean_table_sql(&table.name);
        run_statements(session, &table.name, &statements).await?;
        dropped += 1;
    }

    info!(tables = dropped, "Database cleaned");
    Ok(dropped)
}

/// Empties every table of the session's schema.
///
/// `dashboard_acl` keeps its default rows and has its counter reset rather
/// than being truncated. Returns the number of tables processed.
pub async fn truncate_db_tables<D, S>(dialect: &D, session: &S) -> Result<usize>
where
    D: Dialect + ?Sized,
    S: Session,
{
    let tables = session.list_tables().await?;
    info!(
        engine = %dialect.driver_name(),
        tables = tables.len(),
        "Truncating database tables"
    );

    let mut truncated = 0;
    for table in &tables {
        if table.name.is_empty() {
            continue;
        }
        let statements = dialect.truncate_table_sql(&table.name);
        run_statements(session, &table.name, &statements).await?;
        truncated += 1;
    }

    info!(tables = truncated, "Database tables truncated");
    Ok(truncated)
}

async fn run_statements<S: Session>(
    session: &S,
    table: &str,
    statements: &[AdminStatement],
) -> Result<()> {
    for statement in statements {
        debug!(table = %table, sql = %statement.sql, "Executing admin statement");
        if let Err(err) = session.execute(&statement.sql, &[]).await {
            warn!(
                table = %table,
                action = %statement.action,
                error = %err,
                "Table operation failed"
            );
            return Err(DialectError::table(table, statement.action, err));
        }
    }
    Ok(())
}
