//! Dialect selection.

use crate::config::{DialectConfig, EngineKind};
use crate::dialect::{
    DamengDialect, Dialect, MySqlDialect, OceanBaseDialect, PostgresDialect, SqliteDialect,
};
use crate::error::Result;

/// Builds the dialect for the configured engine.
#[must_use]
pub fn new_dialect(config: &DialectConfig) -> Box<dyn Dialect> {
    let schema = config.schema.clone();
    match config.engine {
        EngineKind::MySql => Box::new(MySqlDialect::new(schema)),
        EngineKind::OceanBase => Box::new(OceanBaseDialect::new(schema)),
        EngineKind::Postgres => Box::new(PostgresDialect::new(schema)),
        EngineKind::Sqlite => Box::new(SqliteDialect::new(schema)),
        EngineKind::Dameng => Box::new(DamengDialect::new(schema)),
    }
}

/// Builds the dialect for a driver name such as `mysql` or `sqlite3`.
///
/// Fails with [`DialectError::UnknownEngine`](crate::error::DialectError::UnknownEngine)
/// for names no dialect is registered under.
pub fn dialect_for(engine: &str, schema: Option<String>) -> Result<Box<dyn Dialect>> {
    let engine: EngineKind = engine.parse()?;
    Ok(new_dialect(&DialectConfig { engine, schema }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DialectError;

    #[test]
    fn test_every_engine_has_a_dialect() {
        for engine in EngineKind::ALL {
            let dialect = new_dialect(&DialectConfig::new(engine));
            assert_eq!(dialect.kind(), engine);
            assert_eq!(dialect.driver_name(), engine.driver_name());
        }
    }

    #[test]
    fn test_dialect_for_driver_names() {
        let dialect = dialect_for("postgres", Some("public".to_string())).unwrap();
        assert_eq!(dialect.kind(), EngineKind::Postgres);
        assert_eq!(dialect.schema(), Some("public"));

        let dialect = dialect_for("sqlite3", None).unwrap();
        assert_eq!(dialect.quote("user"), "`user`");
    }

    #[test]
    fn test_unknown_engine() {
        let err = dialect_for("mssql", None).err().unwrap();
        assert!(matches!(err, DialectError::UnknownEngine(name) if name == "mssql"));
    }
}
