//! Microsoft SQL Server driver.
//!
//! - [`MssqlDialect`]: SQL syntax strategy for SQL Server
//! - [`parse_dsn`]: `sqlserver://` URL and ADO `key=value;` parser

mod dialect;
mod dsn;

pub use dialect::MssqlDialect;
pub use dsn::parse_dsn;
