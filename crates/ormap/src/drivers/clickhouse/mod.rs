//! ClickHouse driver.
//!
//! - [`ClickHouseDialect`]: SQL syntax strategy for ClickHouse
//! - [`parse_dsn`]: connection string parser (`tcp://host:9000?username=app&database=db`)

mod dialect;
mod dsn;

pub use dialect::ClickHouseDialect;
pub use dsn::parse_dsn;
