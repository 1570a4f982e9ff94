//! Dialect registry for explicit dependency injection.
//!
//! The [`DialectRegistry`] maps database keys to dialect factories. It is
//! constructed once, populated, and then passed to whatever opens dialects,
//! so there is no process-wide mutable state.
//!
//! Keys are case-insensitive and aliases (`postgresql`, `pg`, `sqlite3`,
//! `sqlserver`, `mariadb`, `ch`) resolve to their canonical key. Registering a
//! second factory under the same key is rejected.
//!
//! # Example
//!
//! ```
//! use ormap::core::DialectRegistry;
//!
//! let registry = DialectRegistry::with_builtins();
//! let dialect = registry.open("postgresql", "postgres://app@localhost/shop").unwrap();
//! assert_eq!(dialect.uri().database, "shop");
//! assert_eq!(dialect.quote("user"), "\"user\"");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::drivers::{ClickHouseDialect, MssqlDialect, MysqlDialect, PostgresDialect, SqliteDialect};
use crate::error::{MapError, Result};

use super::traits::Dialect;
use super::uri::DbType;

/// Creates a fresh, uninitialized dialect.
pub type DialectFactory = Arc<dyn Fn() -> Box<dyn Dialect> + Send + Sync>;

/// Registry of dialect factories keyed by database type.
#[derive(Default, Clone)]
pub struct DialectRegistry {
    factories: HashMap<String, DialectFactory>,
}

impl DialectRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with MySQL, PostgreSQL, SQLite, SQL Server and
    /// ClickHouse registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.insert_builtin(DbType::Mysql, || Box::new(MysqlDialect::new()));
        registry.insert_builtin(DbType::Postgres, || Box::new(PostgresDialect::new()));
        registry.insert_builtin(DbType::Sqlite, || Box::new(SqliteDialect::new()));
        registry.insert_builtin(DbType::Mssql, || Box::new(MssqlDialect::new()));
        registry.insert_builtin(DbType::ClickHouse, || Box::new(ClickHouseDialect::new()));
        registry
    }

    fn insert_builtin<F>(&mut self, db_type: DbType, factory: F)
    where
        F: Fn() -> Box<dyn Dialect> + Send + Sync + 'static,
    {
        self.factories
            .insert(db_type.as_str().to_string(), Arc::new(factory));
    }

    /// Register a dialect factory.
    ///
    /// Fails with [`MapError::DuplicateDialect`] when the key (after alias
    /// resolution) is already taken.
    pub fn register<F>(&mut self, key: &str, factory: F) -> Result<()>
    where
        F: Fn() -> Box<dyn Dialect> + Send + Sync + 'static,
    {
        let key = DbType::normalize_key(key);
        if self.factories.contains_key(&key) {
            return Err(MapError::DuplicateDialect(key));
        }
        debug!("Registered dialect '{}'", key);
        self.factories.insert(key, Arc::new(factory));
        Ok(())
    }

    /// Create a fresh dialect for the key, if registered.
    pub fn lookup(&self, key: &str) -> Option<Box<dyn Dialect>> {
        self.factories
            .get(&DbType::normalize_key(key))
            .map(|factory| factory())
    }

    /// Create a dialect and initialize it from a connection string.
    pub fn open(&self, key: &str, conn: &str) -> Result<Box<dyn Dialect>> {
        let mut dialect = self
            .lookup(key)
            .ok_or_else(|| MapError::UnknownDialect(key.to_string()))?;
        let uri = dialect.parse_connection_string(conn)?;
        debug!(
            "Opened {} dialect for database '{}' at '{}'",
            dialect.db_type(),
            uri.database,
            uri.address()
        );
        dialect.init(uri);
        Ok(dialect)
    }

    /// Check if a key is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(&DbType::normalize_key(key))
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl fmt::Debug for DialectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialectRegistry")
            .field("dialects", &self.keys())
            .finish()
    }
}
