//! MySQL / MariaDB driver.
//!
//! - [`MysqlDialect`]: SQL syntax strategy for MySQL
//! - [`parse_dsn`]: connection string parser (`user:pass@tcp(host:port)/db?charset=utf8mb4`)

mod dialect;
mod dsn;

pub use dialect::MysqlDialect;
pub use dsn::parse_dsn;
