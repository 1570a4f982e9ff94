//! SQLite SQL dialect (Strategy pattern).
//!
//! SQLite has type affinity rather than strict types, so most declared
//! types collapse onto INTEGER, REAL, NUMERIC, TEXT or BLOB.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::core::identifier::{QuotePolicy, Quoter};
use crate::core::schema::Column;
use crate::core::traits::{Dialect, Filter, Statement};
use crate::core::uri::{DbType, Uri};
use crate::drivers::common::{base, IdFilter};
use crate::error::Result;
use crate::typemap::names::*;

const QUOTER: Quoter = Quoter::new('`', '`');

static RESERVED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "ABORT", "ACTION", "ADD", "AFTER", "ALL", "ALTER", "ANALYZE", "AND", "AS", "ASC",
        "ATTACH", "AUTOINCREMENT", "BEFORE", "BEGIN", "BETWEEN", "BY", "CASCADE", "CASE", "CAST",
        "CHECK", "COLLATE", "COLUMN", "COMMIT", "CONFLICT", "CONSTRAINT", "CREATE", "CROSS",
        "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "DATABASE", "DEFAULT", "DEFERRABLE",
        "DEFERRED", "DELETE", "DESC", "DETACH", "DISTINCT", "DROP", "EACH", "ELSE", "END",
        "ESCAPE", "EXCEPT", "EXCLUSIVE", "EXISTS", "EXPLAIN", "FAIL", "FOR", "FOREIGN", "FROM",
        "FULL", "GLOB", "GROUP", "HAVING", "IF", "IGNORE", "IMMEDIATE", "IN", "INDEX", "INDEXED",
        "INITIALLY", "INNER", "INSERT", "INSTEAD", "INTERSECT", "INTO", "IS", "ISNULL", "JOIN",
        "KEY", "LEFT", "LIKE", "LIMIT", "MATCH", "NATURAL", "NO", "NOT", "NOTNULL", "NULL", "OF",
        "OFFSET", "ON", "OR", "ORDER", "OUTER", "PLAN", "PRAGMA", "PRIMARY", "QUERY", "RAISE",
        "RECURSIVE", "REFERENCES", "REGEXP", "REINDEX", "RELEASE", "RENAME", "REPLACE",
        "RESTRICT", "RIGHT", "ROLLBACK", "ROW", "SAVEPOINT", "SELECT", "SET", "TABLE", "TEMP",
        "TEMPORARY", "THEN", "TO", "TRANSACTION", "TRIGGER", "UNION", "UNIQUE", "UPDATE", "USING",
        "VACUUM", "VALUES", "VIEW", "VIRTUAL", "WHEN", "WHERE", "WITH", "WITHOUT",
    ]
    .into_iter()
    .collect()
});

fn is_reserved_word(name: &str) -> bool {
    RESERVED.contains(name.to_ascii_uppercase().as_str())
}

/// SQLite dialect implementation.
#[derive(Debug, Clone)]
pub struct SqliteDialect {
    uri: Uri,
    quoter: Quoter,
}

impl SqliteDialect {
    pub fn new() -> Self {
        Self {
            uri: Uri::new(DbType::Sqlite),
            quoter: QUOTER,
        }
    }
}

impl Default for SqliteDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for SqliteDialect {
    fn db_type(&self) -> DbType {
        DbType::Sqlite
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
        match col.sql_type.name.as_str() {
            DATE | DATETIME | TIMESTAMP | TIME => DATETIME,
            TIMESTAMPZ => TEXT,
            CHAR | VARCHAR | NVARCHAR | NCHAR | TINYTEXT | TEXT | MEDIUMTEXT | LONGTEXT | CLOB
            | ENUM | SET | UUID | JSON | JSONB => TEXT,
            BOOL | BOOLEAN | BIT | TINYINT | SMALLINT | MEDIUMINT | INT | INTEGER | BIGINT
            | SERIAL | BIGSERIAL => INTEGER,
            FLOAT | DOUBLE | REAL => REAL,
            DECIMAL | NUMERIC | MONEY => NUMERIC,
            TINYBLOB | BLOB | MEDIUMBLOB | LONGBLOB | BYTEA | BINARY | VARBINARY => BLOB,
            other => other,
        }
        .to_string()
    }

    /// Booleans are stored as integers.
    fn column_default(&self, col: &Column) -> Option<String> {
        base::bool_default_as_int(col)
    }

    fn auto_incr_str(&self) -> &str {
        "AUTOINCREMENT"
    }

    fn supports_modify_column(&self) -> bool {
        false
    }

    fn table_check_sql(&self, table_name: &str) -> Statement {
        Statement::with_args(
            "SELECT name FROM sqlite_master WHERE type='table' and name = ?",
            [table_name],
        )
    }

    fn column_check_sql(&self, table_name: &str, col_name: &str) -> Statement {
        Statement::with_args(
            "SELECT name FROM pragma_table_info(?) WHERE name = ?",
            [table_name, col_name],
        )
    }

    fn index_check_sql(&self, _table_name: &str, index_name: &str) -> Statement {
        Statement::with_args(
            "SELECT name FROM sqlite_master WHERE type='index' and name = ?",
            [index_name],
        )
    }

    fn filters(&self) -> Vec<Box<dyn Filter>> {
        vec![Box::new(IdFilter)]
    }

    fn for_update_sql(&self, query: &str) -> String {
        query.to_string()
    }

    fn format_bytes(&self, bytes: &[u8]) -> String {
        format!("X'{}'", base::hex(bytes))
    }
}
