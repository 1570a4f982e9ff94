//! Parsed connection descriptors.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::MapError;

/// Database family a dialect targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    Mysql,
    Postgres,
    Sqlite,
    Mssql,
    ClickHouse,
}

impl DbType {
    pub const ALL: [DbType; 5] = [
        DbType::Mysql,
        DbType::Postgres,
        DbType::Sqlite,
        DbType::Mssql,
        DbType::ClickHouse,
    ];

    /// Canonical registry key.
    pub fn as_str(&self) -> &'static str {
        match self {
            DbType::Mysql => "mysql",
            DbType::Postgres => "postgres",
            DbType::Sqlite => "sqlite",
            DbType::Mssql => "mssql",
            DbType::ClickHouse => "clickhouse",
        }
    }

    /// Map an alias (`pg`, `sqlite3`, `sqlserver`, `mariadb`, `ch`, ...) to its
    /// canonical key. Unknown names are lowercased and returned as-is so
    /// third-party dialects can register under their own keys.
    pub fn normalize_key(name: &str) -> String {
        let lower = name.trim().to_ascii_lowercase();
        match lower.as_str() {
            "mysql" | "mariadb" | "tidb" => "mysql".to_string(),
            "postgres" | "postgresql" | "pg" | "pgx" => "postgres".to_string(),
            "sqlite" | "sqlite3" => "sqlite".to_string(),
            "mssql" | "sqlserver" | "sql_server" => "mssql".to_string(),
            "clickhouse" | "ch" => "clickhouse".to_string(),
            _ => lower,
        }
    }
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DbType {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match DbType::normalize_key(s).as_str() {
            "mysql" => Ok(DbType::Mysql),
            "postgres" => Ok(DbType::Postgres),
            "sqlite" => Ok(DbType::Sqlite),
            "mssql" => Ok(DbType::Mssql),
            "clickhouse" => Ok(DbType::ClickHouse),
            _ => Err(MapError::UnknownDialect(s.to_string())),
        }
    }
}

/// Structured form of a connection string.
///
/// Produced by a dialect's connection-string parser. Only the schema may
/// change after parsing.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uri {
    pub db_type: DbType,
    /// Transport, e.g. `tcp`, `unix` or `file`.
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub user: String,
    /// Never serialized.
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default)]
    pub charset: String,
    #[serde(default)]
    pub schema: String,
    /// Remaining key/value parameters in input order.
    #[serde(default)]
    pub params: IndexMap<String, String>,
}

impl Uri {
    pub fn new(db_type: DbType) -> Self {
        Self {
            db_type,
            protocol: String::new(),
            host: String::new(),
            port: None,
            database: String::new(),
            user: String::new(),
            password: String::new(),
            charset: String::new(),
            schema: String::new(),
            params: IndexMap::new(),
        }
    }

    /// `host:port`, or just the host when no port was given.
    pub fn address(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.host, port),
            None => self.host.clone(),
        }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Uri")
            .field("db_type", &self.db_type)
            .field("protocol", &self.protocol)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("charset", &self.charset)
            .field("schema", &self.schema)
            .field("params", &self.params)
            .finish()
    }
}

/// Parse a port component, reporting failures against `dialect`.
pub(crate) fn parse_port(dialect: &str, value: &str) -> crate::error::Result<u16> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|_| MapError::connection(dialect, format!("invalid port '{}'", value)))
}
