//! SQLite driver.

mod dialect;
mod dsn;

pub use dialect::SqliteDialect;
pub use dsn::parse_dsn;
