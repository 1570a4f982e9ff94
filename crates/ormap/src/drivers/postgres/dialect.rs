//! PostgreSQL SQL dialect (Strategy pattern).
//!
//! Double-quote identifiers, `SERIAL`/`BIGSERIAL` for auto-increment keys,
//! schema-qualified DDL, and `$n` placeholders via [`SeqFilter`].

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::core::identifier::{QuotePolicy, Quoter};
use crate::core::schema::{Column, Index, Table};
use crate::core::traits::{CreateTableOptions, Dialect, Filter, Statement};
use crate::core::uri::{DbType, Uri};
use crate::drivers::common::{base, IdFilter, QuoteFilter, SeqFilter};
use crate::error::Result;
use crate::typemap::names::*;

/// Schema used when the connection does not name one.
pub const DEFAULT_SCHEMA: &str = "public";

const QUOTER: Quoter = Quoter::new('"', '"');

static RESERVED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "ALL", "ANALYSE", "ANALYZE", "AND", "ANY", "ARRAY", "AS", "ASC", "ASYMMETRIC",
        "AUTHORIZATION", "BINARY", "BOTH", "CASE", "CAST", "CHECK", "COLLATE", "COLLATION",
        "COLUMN", "CONCURRENTLY", "CONSTRAINT", "CREATE", "CROSS", "CURRENT_CATALOG",
        "CURRENT_DATE", "CURRENT_ROLE", "CURRENT_SCHEMA", "CURRENT_TIME", "CURRENT_TIMESTAMP",
        "CURRENT_USER", "DEFAULT", "DEFERRABLE", "DESC", "DISTINCT", "DO", "ELSE", "END",
        "EXCEPT", "FALSE", "FETCH", "FOR", "FOREIGN", "FREEZE", "FROM", "FULL", "GRANT", "GROUP",
        "HAVING", "ILIKE", "IN", "INITIALLY", "INNER", "INTERSECT", "INTO", "IS", "ISNULL", "JOIN",
        "LATERAL", "LEADING", "LEFT", "LIKE", "LIMIT", "LOCALTIME", "LOCALTIMESTAMP", "NATURAL",
        "NOT", "NOTNULL", "NULL", "OFFSET", "ON", "ONLY", "OR", "ORDER", "OUTER", "OVERLAPS",
        "PLACING", "PRIMARY", "REFERENCES", "RETURNING", "RIGHT", "SELECT", "SESSION_USER",
        "SIMILAR", "SOME", "SYMMETRIC", "TABLE", "TABLESAMPLE", "THEN", "TO", "TRAILING", "TRUE",
        "UNION", "UNIQUE", "USER", "USING", "VARIADIC", "VERBOSE", "WHEN", "WHERE", "WINDOW",
        "WITH",
    ]
    .into_iter()
    .collect()
});

fn is_reserved_word(name: &str) -> bool {
    RESERVED.contains(name.to_ascii_uppercase().as_str())
}

/// PostgreSQL dialect implementation.
#[derive(Debug, Clone)]
pub struct PostgresDialect {
    uri: Uri,
    quoter: Quoter,
}

impl PostgresDialect {
    /// Create a new PostgreSQL dialect instance.
    pub fn new() -> Self {
        Self {
            uri: Uri::new(DbType::Postgres),
            quoter: QUOTER,
        }
    }

    /// Effective schema: the connection's, or `public`.
    pub fn schema(&self) -> &str {
        if self.uri.schema.is_empty() {
            DEFAULT_SCHEMA
        } else {
            &self.uri.schema
        }
    }

    fn qualify(&self, table_name: &str) -> String {
        if self.uri.schema.is_empty() || table_name.contains('.') {
            table_name.to_string()
        } else {
            format!("{}.{}", self.uri.schema, table_name)
        }
    }
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for PostgresDialect {
    fn db_type(&self) -> DbType {
        DbType::Postgres
    }

    fn uri(&self) -> &Uri {
        &self.uri
    }

    fn init(&mut self, uri: Uri) {
        self.uri = uri;
    }

    fn parse_connection_string(&self, conn: &str) -> Result<Uri> {
        super::parse_dsn(conn)
    }

    fn set_schema(&mut self, schema: &str) {
        self.uri.schema = schema.to_string();
    }

    fn set_quote_policy(&mut self, policy: QuotePolicy) {
        self.quoter = QUOTER.with_policy(policy.resolve(is_reserved_word));
    }

    fn quoter(&self) -> Quoter {
        self.quoter
    }

    fn is_reserved(&self, name: &str) -> bool {
        is_reserved_word(name)
    }

    fn sql_type(&self, col: &Column) -> String {
        let mut res = match col.sql_type.name.as_str() {
            TINYINT => return SMALLINT.to_string(),
            BIT => return BOOLEAN.to_string(),
            MEDIUMINT | INT | INTEGER => {
                return if col.is_auto_increment { SERIAL } else { INTEGER }.to_string();
            }
            BIGINT => {
                return if col.is_auto_increment { BIGSERIAL } else { BIGINT }.to_string();
            }
            SERIAL | BIGSERIAL => col.sql_type.name.clone(),
            BINARY | VARBINARY | BLOB | TINYBLOB | MEDIUMBLOB | LONGBLOB => {
                return BYTEA.to_string();
            }
            DATETIME => TIMESTAMP.to_string(),
            TIMESTAMPZ => return "TIMESTAMP WITH TIME ZONE".to_string(),
            FLOAT => REAL.to_string(),
            DOUBLE => return "DOUBLE PRECISION".to_string(),
            TINYTEXT | MEDIUMTEXT | LONGTEXT | ENUM | SET => TEXT.to_string(),
            NVARCHAR => VARCHAR.to_string(),
            UUID | UNIQUEIDENTIFIER => return UUID.to_string(),
            BOOL | BOOLEAN => return col.sql_type.name.clone(),
            other => {
                if col.is_auto_increment {
                    return SERIAL.to_string();
                }
                other.to_string()
            }
        };

        let (length, length2) = (col.sql_type.length, col.sql_type.length2);
        if res == TEXT {
            return res;
        }
        if length2 > 0 {
            res.push_str(&format!("({},{})", length, length2));
        } else if length > 0 {
            res.push_str(&format!("({})", length));
        }
        res
    }

    fn auto_incr_str(&self) -> &str {
        ""
    }

    fn create_table_sql(&self, table: &Table, opts: &CreateTableOptions) -> Statement {
        let name = opts.table_name.as_deref().unwrap_or(&table.name);
        let opts = CreateTableOptions {
            table_name: Some(self.qualify(name)),
            ..opts.clone()
        };
        base::create_table_sql(self, table, &opts)
    }

    fn drop_table_sql(&self, table_name: &str) -> Statement {
        base::drop_table_sql(self, &self.qualify(table_name))
    }

    fn create_index_sql(&self, table_name: &str, index: &Index) -> Statement {
        base::create_index_sql(self, &self.qualify(table_name), index)
    }

    fn drop_index_sql(&self, table_name: &str, index: &Index) -> Statement {
        let name = self.qualify(&index.x_name(table_name));
        Statement::new(format!("DROP INDEX IF EXISTS {}", self.quote(&name)))
    }

    fn modify_column_sql(&self, table_name: &str, col: &Column) -> Statement {
        Statement::new(format!(
            "ALTER TABLE {} ALTER COLUMN {} TYPE {}",
            self.quote(&self.qualify(table_name)),
            self.quote(&col.name),
            self.sql_type(col)
        ))
    }

    fn table_check_sql(&self, table_name: &str) -> Statement {
        Statement::with_args(
            "SELECT tablename FROM pg_tables WHERE schemaname = ? AND tablename = ?",
            [self.schema(), table_name],
        )
    }

    fn column_check_sql(&self, table_name: &str, col_name: &str) -> Statement {
        Statement::with_args(
            "SELECT column_name FROM INFORMATION_SCHEMA.COLUMNS \
             WHERE table_catalog = ? AND table_schema = ? AND table_name = ? AND column_name = ?",
            [self.uri.database.as_str(), self.schema(), table_name, col_name],
        )
    }

    fn index_check_sql(&self, table_name: &str, index_name: &str) -> Statement {
        Statement::with_args(
            "SELECT indexname FROM pg_indexes WHERE schemaname = ? AND tablename = ? AND indexname = ?",
            [self.schema(), table_name, index_name],
        )
    }

    fn filters(&self) -> Vec<Box<dyn Filter>> {
        vec![
            Box::new(IdFilter),
            Box::new(QuoteFilter),
            Box::new(SeqFilter::new("$", 1)),
        ]
    }

    fn format_bytes(&self, bytes: &[u8]) -> String {
        format!("E'\\\\x{}'", base::hex(bytes))
    }
}
