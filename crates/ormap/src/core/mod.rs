//! Core abstractions for dialect-aware schema mapping.
//!
//! - [`schema`]: table, column and index metadata
//! - [`identifier`]: identifier quoting ([`Quoter`])
//! - [`traits`]: the [`Dialect`] strategy and SQL [`Filter`]s
//! - [`catalog`]: dialect registry for dependency injection
//! - [`uri`]: parsed connection descriptors
//!
//! # Architecture
//!
//! The core module defines database-agnostic abstractions that are implemented
//! by driver modules (`drivers/mysql`, `drivers/postgres`, etc.). New databases
//! are added by implementing [`Dialect`] and registering a factory.
//!
//! # Design Patterns
//!
//! - **Strategy**: `Dialect` provides interchangeable SQL generation
//! - **Template Method**: default trait methods define the DDL skeleton
//! - **Registry**: `DialectRegistry` creates dialects by key

pub mod catalog;
pub mod identifier;
pub mod schema;
pub mod traits;
pub mod uri;

// Re-export commonly used types for convenience
pub use catalog::{DialectFactory, DialectRegistry};
pub use identifier::{QuotePolicy, Quoter, ReservePolicy};
pub use schema::{Column, Index, IndexType, MapType, SqlType, Table, TimeZone};
pub use traits::{CreateTableOptions, Dialect, Filter, Statement};
pub use uri::{DbType, Uri};
