//! Core traits for dialect-aware SQL generation.
//!
//! - [`Dialect`]: SQL syntax strategy for different database engines
//! - [`Filter`]: text rewrite applied to generated SQL before execution
//!
//! # Design Patterns
//!
//! - **Strategy**: each database implements [`Dialect`]; callers hold a `dyn Dialect`
//! - **Template Method**: default methods delegate to the shared builders in
//!   [`crate::drivers::common::base`], and drivers override only what differs

use std::fmt;

use crate::drivers::common::base;
use crate::error::Result;

use super::identifier::{QuotePolicy, Quoter};
use super::schema::{Column, Index, Table};
use super::uri::{DbType, Uri};

/// SQL text plus positional arguments, ready for an execution layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<String>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(sql: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sql: sql.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            f.write_str(&self.sql)
        } else {
            write!(f, "{} {:?}", self.sql, self.args)
        }
    }
}

/// Per-call overrides for CREATE TABLE.
#[derive(Debug, Clone, Default)]
pub struct CreateTableOptions {
    /// Table name to use instead of [`Table::name`].
    pub table_name: Option<String>,
    /// Storage engine clause (MySQL).
    pub store_engine: Option<String>,
    /// Charset clause; falls back to the connection charset.
    pub charset: Option<String>,
}

/// SQL dialect strategy.
///
/// Implementors must provide identity, quoting, type naming and existence
/// checks. DDL generation has defaults built from the capability flags.
pub trait Dialect: Send + Sync {
    /// Database family.
    fn db_type(&self) -> DbType;

    /// Connection descriptor the dialect was initialized with.
    fn uri(&self) -> &Uri;

    /// Bind a parsed connection descriptor.
    fn init(&mut self, uri: Uri);

    /// Parse a connection string into a descriptor for this dialect.
    fn parse_connection_string(&self, conn: &str) -> Result<Uri>;

    /// Reassign the default schema.
    fn set_schema(&mut self, schema: &str);

    /// Change when bare identifiers are quoted.
    fn set_quote_policy(&mut self, policy: QuotePolicy);

    fn quoter(&self) -> Quoter;

    /// Check if a word is reserved in this dialect.
    fn is_reserved(&self, name: &str) -> bool;

    /// Quote an identifier expression.
    fn quote(&self, name: &str) -> String {
        self.quoter().quote(name)
    }

    /// Native type name for a column, including length arguments.
    fn sql_type(&self, col: &Column) -> String;

    /// Default value as written in a column definition.
    fn column_default(&self, col: &Column) -> Option<String> {
        col.default.clone()
    }

    /// Keyword appended after `PRIMARY KEY` for auto-increment columns.
    fn auto_incr_str(&self) -> &str;

    fn supports_engine(&self) -> bool {
        false
    }

    fn supports_charset(&self) -> bool {
        false
    }

    fn supports_drop_if_exists(&self) -> bool {
        true
    }

    /// Whether column definitions spell out `NULL` / `NOT NULL`.
    fn show_create_null(&self) -> bool {
        true
    }

    fn supports_insert_many(&self) -> bool {
        true
    }

    fn supports_column_comment(&self) -> bool {
        false
    }

    fn supports_modify_column(&self) -> bool {
        true
    }

    /// Whether DROP INDEX needs an `ON <table>` clause.
    fn index_on_table(&self) -> bool {
        false
    }

    fn create_table_sql(&self, table: &Table, opts: &CreateTableOptions) -> Statement {
        base::create_table_sql(self, table, opts)
    }

    fn drop_table_sql(&self, table_name: &str) -> Statement {
        base::drop_table_sql(self, table_name)
    }

    fn create_index_sql(&self, table_name: &str, index: &Index) -> Statement {
        base::create_index_sql(self, table_name, index)
    }

    fn drop_index_sql(&self, table_name: &str, index: &Index) -> Statement {
        base::drop_index_sql(self, table_name, index)
    }

    fn modify_column_sql(&self, table_name: &str, col: &Column) -> Statement {
        base::modify_column_sql(self, table_name, col)
    }

    /// Query returning a row when the table exists.
    fn table_check_sql(&self, table_name: &str) -> Statement;

    /// Query returning a row when the column exists.
    fn column_check_sql(&self, table_name: &str, col_name: &str) -> Statement {
        base::column_check_sql(self, table_name, col_name)
    }

    /// Query returning a row when the index (by rendered name) exists.
    fn index_check_sql(&self, table_name: &str, index_name: &str) -> Statement;

    /// Filters to run over generated SQL, in order.
    fn filters(&self) -> Vec<Box<dyn Filter>>;

    fn for_update_sql(&self, query: &str) -> String {
        format!("{} FOR UPDATE", query)
    }

    /// Literal form of a byte string.
    fn format_bytes(&self, bytes: &[u8]) -> String {
        format!("0x{}", base::hex(bytes))
    }
}

impl fmt::Debug for dyn Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialect")
            .field("db_type", &self.db_type())
            .field("uri", self.uri())
            .finish()
    }
}

/// A text rewrite over generated SQL.
///
/// Filters see the dialect and, when available, the table the statement
/// operates on.
pub trait Filter: Send + Sync {
    fn apply(&self, dialect: &dyn Dialect, table: Option<&Table>, sql: &str) -> String;
}
