//! Engine selection and dialect configuration.
//!
//! The engine kind always comes from configuration; the layer never sniffs
//! the connection to guess which database it talks to.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DialectError, Result};

/// Supported database engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EngineKind {
    MySql,
    OceanBase,
    Postgres,
    Sqlite,
    /// Dameng (DM), an Oracle-compatible engine.
    Dameng,
}

impl EngineKind {
    /// All supported engines.
    pub const ALL: [Self; 5] = [
        Self::MySql,
        Self::OceanBase,
        Self::Postgres,
        Self::Sqlite,
        Self::Dameng,
    ];

    /// Returns the driver name tag of the engine.
    #[must_use]
    pub const fn driver_name(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::OceanBase => "oceanbase",
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite3",
            Self::Dameng => "dm",
        }
    }

    /// Whether the engine speaks the MySQL dialect family.
    #[must_use]
    pub const fn is_mysql_family(self) -> bool {
        matches!(self, Self::MySql | Self::OceanBase)
    }
}

impl FromStr for EngineKind {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(Self::MySql),
            "oceanbase" => Ok(Self::OceanBase),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "sqlite3" | "sqlite" => Ok(Self::Sqlite),
            "dm" | "dameng" => Ok(Self::Dameng),
            _ => Err(DialectError::UnknownEngine(s.to_string())),
        }
    }
}

impl TryFrom<String> for EngineKind {
    type Error = DialectError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<EngineKind> for String {
    fn from(value: EngineKind) -> Self {
        value.driver_name().to_string()
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.driver_name())
    }
}

/// Configuration used to build a dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialectConfig {
    /// Engine the dialect targets.
    pub engine: EngineKind,
    /// Default schema (database, owner) of the connection, if configured.
    #[serde(default)]
    pub schema: Option<String>,
}

impl DialectConfig {
    /// Creates a configuration without a schema.
    #[must_use]
    pub const fn new(engine: EngineKind) -> Self {
        Self {
            engine,
            schema: None,
        }
    }

    /// Sets the default schema.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Parses a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
