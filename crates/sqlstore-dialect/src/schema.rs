//! Schema metadata consumed by the dialects.
//!
//! These types describe what a migration wants to exist: tables, their
//! columns in DDL order, primary keys and indexes. The dialects never keep
//! them around; each SQL-generating call borrows them for its duration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Abstract column type tag.
///
/// Dialects map each tag to a concrete SQL type. Tags the crate does not know
/// about are kept as [`ColumnType::Custom`] and rendered verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    Bit,
    TinyInt,
    SmallInt,
    MediumInt,
    Int,
    Integer,
    BigInt,
    Char,
    Varchar,
    NVarchar,
    TinyText,
    Text,
    MediumText,
    LongText,
    Uuid,
    Date,
    DateTime,
    Time,
    Timestamp,
    /// Timestamp with time zone.
    TimestampZ,
    Decimal,
    Numeric,
    Real,
    Float,
    Double,
    Binary,
    VarBinary,
    TinyBlob,
    Blob,
    MediumBlob,
    LongBlob,
    Bytea,
    Bool,
    Boolean,
    Serial,
    BigSerial,
    Json,
    /// Engine-specific type name, passed through as is.
    Custom(String),
}

impl ColumnType {
    /// Returns the canonical upper-case tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Bit => "BIT",
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::MediumInt => "MEDIUMINT",
            Self::Int => "INT",
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::Char => "CHAR",
            Self::Varchar => "VARCHAR",
            Self::NVarchar => "NVARCHAR",
            Self::TinyText => "TINYTEXT",
            Self::Text => "TEXT",
            Self::MediumText => "MEDIUMTEXT",
            Self::LongText => "LONGTEXT",
            Self::Uuid => "UUID",
            Self::Date => "DATE",
            Self::DateTime => "DATETIME",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::TimestampZ => "TIMESTAMPZ",
            Self::Decimal => "DECIMAL",
            Self::Numeric => "NUMERIC",
            Self::Real => "REAL",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Binary => "BINARY",
            Self::VarBinary => "VARBINARY",
            Self::TinyBlob => "TINYBLOB",
            Self::Blob => "BLOB",
            Self::MediumBlob => "MEDIUMBLOB",
            Self::LongBlob => "LONGBLOB",
            Self::Bytea => "BYTEA",
            Self::Bool => "BOOL",
            Self::Boolean => "BOOLEAN",
            Self::Serial => "SERIAL",
            Self::BigSerial => "BIGSERIAL",
            Self::Json => "JSON",
            Self::Custom(name) => name,
        }
    }

    /// Whether the tag stores character data.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(
            self,
            Self::Char
                | Self::Varchar
                | Self::NVarchar
                | Self::TinyText
                | Self::Text
                | Self::MediumText
                | Self::LongText
        )
    }

    /// Whether the tag is a boolean type whose defaults need literal rendering.
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Self::Bool | Self::Boolean)
    }
}

impl FromStr for ColumnType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s.to_ascii_uppercase().as_str() {
            "BIT" => Self::Bit,
            "TINYINT" => Self::TinyInt,
            "SMALLINT" => Self::SmallInt,
            "MEDIUMINT" => Self::MediumInt,
            "INT" => Self::Int,
            "INTEGER" => Self::Integer,
            "BIGINT" => Self::BigInt,
            "CHAR" => Self::Char,
            "VARCHAR" => Self::Varchar,
            "NVARCHAR" => Self::NVarchar,
            "TINYTEXT" => Self::TinyText,
            "TEXT" => Self::Text,
            "MEDIUMTEXT" => Self::MediumText,
            "LONGTEXT" => Self::LongText,
            "UUID" => Self::Uuid,
            "DATE" => Self::Date,
            "DATETIME" => Self::DateTime,
            "TIME" => Self::Time,
            "TIMESTAMP" => Self::Timestamp,
            "TIMESTAMPZ" => Self::TimestampZ,
            "DECIMAL" => Self::Decimal,
            "NUMERIC" => Self::Numeric,
            "REAL" => Self::Real,
            "FLOAT" => Self::Float,
            "DOUBLE" => Self::Double,
            "BINARY" => Self::Binary,
            "VARBINARY" => Self::VarBinary,
            "TINYBLOB" => Self::TinyBlob,
            "BLOB" => Self::Blob,
            "MEDIUMBLOB" => Self::MediumBlob,
            "LONGBLOB" => Self::LongBlob,
            "BYTEA" => Self::Bytea,
            "BOOL" => Self::Bool,
            "BOOLEAN" => Self::Boolean,
            "SERIAL" => Self::Serial,
            "BIGSERIAL" => Self::BigSerial,
            "JSON" => Self::Json,
            _ => Self::Custom(s.to_string()),
        };
        Ok(ty)
    }
}

impl From<String> for ColumnType {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(ty) => ty,
            Err(never) => match never {},
        }
    }
}

impl From<ColumnType> for String {
    fn from(value: ColumnType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn nullable_by_default() -> bool {
    true
}

/// A column definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within its table.
    pub name: String,
    /// Abstract type tag.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Length or precision; 0 means unset.
    #[serde(default)]
    pub length: u32,
    /// Scale for decimal types; 0 means unset.
    #[serde(default)]
    pub length2: u32,
    /// Whether NULL is allowed.
    #[serde(default = "nullable_by_default")]
    pub nullable: bool,
    /// Raw default expression; empty means no default.
    #[serde(default)]
    pub default: String,
    /// Whether the column belongs to the primary key.
    #[serde(default)]
    pub is_primary_key: bool,
    /// Whether the column auto-increments.
    #[serde(default)]
    pub is_auto_increment: bool,
}

impl Column {
    /// Creates a nullable column without length, default or key flags.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            length: 0,
            length2: 0,
            nullable: true,
            default: String::new(),
            is_primary_key: false,
            is_auto_increment: false,
        }
    }

    /// Sets the length.
    #[must_use]
    pub const fn length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }

    /// Sets precision and scale.
    #[must_use]
    pub const fn precision(mut self, length: u32, length2: u32) -> Self {
        self.length = length;
        self.length2 = length2;
        self
    }

    /// Sets the column as NOT NULL.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets the column as nullable.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Sets the raw default expression.
    #[must_use]
    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default = value.into();
        self
    }

    /// Marks the column as primary key. Primary keys are never NULL.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.nullable = false;
        self
    }

    /// Marks the column as auto-incrementing.
    #[must_use]
    pub const fn auto_increment(mut self) -> Self {
        self.is_auto_increment = true;
        self
    }

    /// Whether a default expression is set.
    #[must_use]
    pub fn has_default(&self) -> bool {
        !self.default.is_empty()
    }
}

/// Kind of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    #[default]
    Plain,
    Unique,
}

/// An index over one or more columns of a table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Index {
    /// Explicit name; derived from the columns when absent.
    #[serde(default)]
    pub name: Option<String>,
    /// Indexed columns, in index order.
    pub columns: Vec<String>,
    /// Plain or unique.
    #[serde(default)]
    pub kind: IndexKind,
}

impl Index {
    /// Creates a plain index over `columns`.
    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            columns: columns.into_iter().map(Into::into).collect(),
            kind: IndexKind::Plain,
        }
    }

    /// Makes this a unique index.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.kind = IndexKind::Unique;
        self
    }

    /// Sets an explicit name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether this is a unique index.
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.kind == IndexKind::Unique
    }

    /// Returns the index name as created on `table`.
    ///
    /// Names already carrying the `UQE_`/`IDX_` prefix are kept; any other
    /// name is prefixed with the kind marker and the table name.
    #[must_use]
    pub fn name_for(&self, table: &str) -> String {
        let base = match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self.columns.join("_"),
        };
        if base.starts_with("UQE_") || base.starts_with("IDX_") {
            return base;
        }
        match self.kind {
            IndexKind::Unique => format!("UQE_{table}_{base}"),
            IndexKind::Plain => format!("IDX_{table}_{base}"),
        }
    }
}

/// A table definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Columns in DDL order.
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Primary-key column names.
    #[serde(default)]
    pub primary_keys: Vec<String>,
}

impl Table {
    /// Creates an empty table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_keys: Vec::new(),
        }
    }

    /// Appends a column, registering it as a primary key when flagged.
    #[must_use]
    pub fn column(mut self, column: Column) -> Self {
        if column.is_primary_key && !self.primary_keys.contains(&column.name) {
            self.primary_keys.push(column.name.clone());
        }
        self.columns.push(column);
        self
    }

    /// Replaces the primary-key column list, flagging the named columns.
    #[must_use]
    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_keys = columns.into_iter().map(Into::into).collect();
        self.sync_primary_keys();
        self
    }

    /// Reconciles `primary_keys` with the column flags.
    ///
    /// Definitions loaded from JSON usually either flag the columns or list
    /// the key, not both. An empty list is filled from the flags; otherwise
    /// the listed columns get flagged.
    pub fn sync_primary_keys(&mut self) {
        if self.primary_keys.is_empty() {
            self.primary_keys = self
                .columns
                .iter()
                .filter(|c| c.is_primary_key)
                .map(|c| c.name.clone())
                .collect();
            return;
        }
        for column in &mut self.columns {
            if self.primary_keys.contains(&column.name) {
                column.is_primary_key = true;
                column.nullable = false;
            }
        }
    }

    /// Gets a column by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Table metadata as enumerated by a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Table name.
    pub name: String,
}

impl TableMetadata {
    /// Creates metadata for the table `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
