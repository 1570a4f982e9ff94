//! # ormap
//!
//! Annotation-driven entity to relational schema mapping.
//!
//! This library provides the mapping core of an ORM:
//!
//! - **Schema building** from entity descriptors with per-field annotations
//! - **SQL dialects** for MySQL, PostgreSQL, SQLite, SQL Server and ClickHouse
//! - **Identifier quoting** that understands qualified names and aliases
//! - **SQL filters** for placeholder renumbering and quote normalization
//! - **Connection string parsing** per dialect
//!
//! ## Example
//!
//! ```rust
//! use ormap::{DialectRegistry, EntityDescriptor, FieldDescriptor, FieldType, Parser};
//! use ormap::core::CreateTableOptions;
//!
//! let registry = DialectRegistry::with_builtins();
//! let dialect = registry.open("postgres", "postgres://app@localhost/shop").unwrap();
//!
//! let parser = Parser::default();
//! let user = EntityDescriptor::new("User")
//!     .field(FieldDescriptor::new("ID", FieldType::I64).tag("orm", "pk autoincr"))
//!     .field(FieldDescriptor::new("Name", FieldType::String).tag("orm", "varchar(64) notnull"));
//! let table = parser.parse(&user).unwrap();
//!
//! let ddl = dialect.create_table_sql(&table, &CreateTableOptions::default());
//! assert_eq!(
//!     ddl.sql,
//!     "CREATE TABLE IF NOT EXISTS \"user\" (\"id\" BIGSERIAL PRIMARY KEY NOT NULL, \"name\" VARCHAR(64) NOT NULL)"
//! );
//! ```

pub mod cache;
pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod names;
pub mod tags;
pub mod typemap;

// Re-exports for convenient access
pub use cache::{CacheManager, MemoryCacheManager};
pub use config::Config;
pub use crate::core::{
    Column, DbType, Dialect, DialectRegistry, Filter, Index, Quoter, Statement, Table, Uri,
};
pub use drivers::apply_filters;
pub use error::{MapError, Result};
pub use names::{NameMapper, NamingConvention};
pub use tags::{Entity, EntityDescriptor, FieldDescriptor, Parser};
pub use typemap::FieldType;
