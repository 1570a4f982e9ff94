//! PostgreSQL driver.
//!
//! - [`PostgresDialect`]: SQL syntax strategy for PostgreSQL
//! - [`parse_dsn`]: URL and `key=value` connection string parser

mod dialect;
mod dsn;

pub use dialect::{PostgresDialect, DEFAULT_SCHEMA};
pub use dsn::parse_dsn;
