//! Configuration type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::identifier::QuotePolicy;
use crate::names::NamingConvention;
use crate::tags::DEFAULT_IDENTIFIER;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Target database.
    pub database: DatabaseConfig,

    /// Entity mapping behavior.
    #[serde(default)]
    pub mapping: MappingConfig,
}

/// Target database configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Dialect key (`mysql`, `postgres`, `sqlite`, `mssql`, `clickhouse` or an alias).
    pub dialect: String,

    /// Connection string in the dialect's format.
    pub connection: String,

    /// Identifier quoting (default: always).
    #[serde(default)]
    pub quote_policy: QuotePolicy,

    /// Schema overriding the one in the connection string.
    #[serde(default)]
    pub schema: Option<String>,

    /// Storage engine for CREATE TABLE (MySQL).
    #[serde(default)]
    pub store_engine: Option<String>,

    /// Charset for CREATE TABLE, overriding the connection charset.
    #[serde(default)]
    pub charset: Option<String>,
}

// Custom Debug implementation to redact the connection string, which may hold a password
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("dialect", &self.dialect)
            .field("connection", &"[REDACTED]")
            .field("quote_policy", &self.quote_policy)
            .field("schema", &self.schema)
            .field("store_engine", &self.store_engine)
            .field("charset", &self.charset)
            .finish()
    }
}

/// Entity mapping configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Annotation key read from field descriptors (default: "orm").
    #[serde(default = "default_identifier")]
    pub identifier: String,

    /// Type name to table name convention (default: snake).
    #[serde(default)]
    pub table_mapper: NamingConvention,

    /// Field name to column name convention (default: snake).
    #[serde(default)]
    pub column_mapper: NamingConvention,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            identifier: default_identifier(),
            table_mapper: NamingConvention::default(),
            column_mapper: NamingConvention::default(),
        }
    }
}

fn default_identifier() -> String {
    DEFAULT_IDENTIFIER.to_string()
}
