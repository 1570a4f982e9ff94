//! Database dialect implementations.
//!
//! - [`mysql`]: MySQL / MariaDB
//! - [`postgres`]: PostgreSQL
//! - [`sqlite`]: SQLite
//! - [`mssql`]: Microsoft SQL Server
//! - [`clickhouse`]: ClickHouse
//! - [`common`]: shared DDL assembly and SQL filters
//!
//! # Adding New Databases
//!
//! 1. Create a new module under `drivers/` with `dialect.rs` and `dsn.rs`
//! 2. Implement the [`Dialect`](crate::core::Dialect) trait, overriding the
//!    default DDL methods only where the database differs
//! 3. Register a factory in [`DialectRegistry::with_builtins`](crate::core::DialectRegistry::with_builtins)

pub mod clickhouse;
pub mod common;
pub mod mssql;
pub mod mysql;
pub mod postgres;
pub mod sqlite;

pub use clickhouse::ClickHouseDialect;
pub use common::{apply_filters, IdFilter, QuoteFilter, SeqFilter};
pub use mssql::MssqlDialect;
pub use mysql::MysqlDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;
