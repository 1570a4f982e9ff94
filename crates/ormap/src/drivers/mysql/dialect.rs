//! MySQL/MariaDB SQL dialect (Strategy pattern).
//!
//! Backtick quoting, `AUTO_INCREMENT`, engine and charset clauses, and
//! inline column comments. Compatible with MySQL 5.7+ and MariaDB 10.2+.

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
        "ADD", "ALL", "ALTER", "ANALYZE", "AND", "AS", "ASC", "BEFORE", "BETWEEN", "BIGINT",
        "BINARY", "BLOB", "BOTH", "BY", "CALL", "CASCADE", "CASE", "CHANGE", "CHAR", "CHARACTER",
        "CHECK", "COLLATE", "COLUMN", "CONDITION", "CONSTRAINT", "CONTINUE", "CONVERT", "CREATE",
        "CROSS", "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_USER", "CURSOR",
        "DATABASE", "DATABASES", "DAY_HOUR", "DEC", "DECIMAL", "DECLARE", "DEFAULT", "DELAYED",
        "DELETE", "DESC", "DESCRIBE", "DETERMINISTIC", "DISTINCT", "DIV", "DOUBLE", "DROP", "DUAL",
        "EACH", "ELSE", "ELSEIF", "ENCLOSED", "ESCAPED", "EXISTS", "EXIT", "EXPLAIN", "FALSE",
        "FETCH", "FLOAT", "FOR", "FORCE", "FOREIGN", "FROM", "FULLTEXT", "GRANT", "GROUP",
        "HAVING", "HIGH_PRIORITY", "IF", "IGNORE", "IN", "INDEX", "INFILE", "INNER", "INOUT",
        "INSENSITIVE", "INSERT", "INT", "INTEGER", "INTERVAL", "INTO", "IS", "ITERATE", "JOIN",
        "KEY", "KEYS", "KILL", "LEADING", "LEAVE", "LEFT", "LIKE", "LIMIT", "LINES", "LOAD",
        "LOCALTIME", "LOCALTIMESTAMP", "LOCK", "LONG", "LONGBLOB", "LONGTEXT", "LOOP",
        "LOW_PRIORITY", "MATCH", "MEDIUMBLOB", "MEDIUMINT", "MEDIUMTEXT", "MOD", "MODIFIES",
        "NATURAL", "NOT", "NULL", "NUMERIC", "ON", "OPTIMIZE", "OPTION", "OPTIONALLY", "OR",
        "ORDER", "OUT", "OUTER", "OUTFILE", "PRECISION", "PRIMARY", "PROCEDURE", "PURGE", "RANGE",
        "READ", "READS", "REAL", "REFERENCES", "REGEXP", "RELEASE", "RENAME", "REPEAT", "REPLACE",
        "REQUIRE", "RESTRICT", "RETURN", "REVOKE", "RIGHT", "RLIKE", "SCHEMA", "SCHEMAS",
        "SELECT", "SENSITIVE", "SEPARATOR", "SET", "SHOW", "SMALLINT", "SPATIAL", "SPECIFIC",
        "SQL", "SSL", "STARTING", "STRAIGHT_JOIN", "TABLE", "TERMINATED", "THEN", "TINYBLOB",
        "TINYINT", "TINYTEXT", "TO", "TRAILING", "TRIGGER", "TRUE", "UNDO", "UNION", "UNIQUE",
        "UNLOCK", "UNSIGNED", "UPDATE", "USAGE", "USE", "USING", "UTC_DATE", "UTC_TIME",
        "UTC_TIMESTAMP", "VALUES", "VARBINARY", "VARCHAR", "VARCHARACTER", "VARYING", "WHEN",
        "WHERE", "WHILE", "WITH", "WRITE", "XOR", "YEAR_MONTH", "ZEROFILL",
    ]
    .into_iter()
    .collect()
});

fn is_reserved_word(name: &str) -> bool {
    RESERVED.contains(name.to_ascii_uppercase().as_str())
}

/// MySQL/MariaDB dialect implementation.
#[derive(Debug, Clone)]
pub struct MysqlDialect {
    uri: Uri,
    quoter: Quoter,
}

impl MysqlDialect {
    /// Create a new MySQL dialect instance.
    pub fn new() -> Self {
        Self {
            uri: Uri::new(DbType::Mysql),
            quoter: QUOTER,
        }
    }
}

impl Default for MysqlDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for MysqlDialect {
    fn db_type(&self) -> DbType {
        DbType::Mysql
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
        let mut length = col.sql_type.length;
        let length2 = col.sql_type.length2;

        let mut res = match col.sql_type.name.as_str() {
            BOOL | BOOLEAN => {
                length = 1;
                TINYINT.to_string()
            }
            SERIAL => INT.to_string(),
            BIGSERIAL => BIGINT.to_string(),
            BYTEA => BLOB.to_string(),
            TIMESTAMPZ => {
                length = 64;
                CHAR.to_string()
            }
            ENUM | SET => {
                let labels: Vec<String> = if col.sql_type.name == ENUM {
                    col.enum_options.keys().map(|v| base::string_literal(v)).collect()
                } else {
                    col.set_options.keys().map(|v| base::string_literal(v)).collect()
                };
                return format!("{}({})", col.sql_type.name, labels.join(","));
            }
            NVARCHAR => VARCHAR.to_string(),
            UUID | UNIQUEIDENTIFIER => {
                length = 40;
                VARCHAR.to_string()
            }
            JSON | JSONB => TEXT.to_string(),
            other => other.to_string(),
        };

        if res == BIGINT && length <= 0 && length2 <= 0 {
            length = 20;
        }

        if length2 > 0 {
            res.push_str(&format!("({},{})", length, length2));
        } else if length > 0 {
            res.push_str(&format!("({})", length));
        }
        res
    }

    fn auto_incr_str(&self) -> &str {
        "AUTO_INCREMENT"
    }

    fn supports_engine(&self) -> bool {
        true
    }

    fn supports_charset(&self) -> bool {
        true
    }

    fn supports_column_comment(&self) -> bool {
        true
    }

    fn index_on_table(&self) -> bool {
        true
    }

    fn table_check_sql(&self, table_name: &str) -> Statement {
        Statement::with_args(
            "SELECT `TABLE_NAME` from `INFORMATION_SCHEMA`.`TABLES` WHERE `TABLE_SCHEMA`=? and `TABLE_NAME`=?",
            [self.uri.database.as_str(), table_name],
        )
    }

    fn index_check_sql(&self, table_name: &str, index_name: &str) -> Statement {
        Statement::with_args(
            "SELECT `INDEX_NAME` FROM `INFORMATION_SCHEMA`.`STATISTICS` WHERE `TABLE_SCHEMA` = ? AND `TABLE_NAME` = ? AND `INDEX_NAME`=?",
            [self.uri.database.as_str(), table_name, index_name],
        )
    }

    fn filters(&self) -> Vec<Box<dyn Filter>> {
        vec![Box::new(IdFilter)]
    }
}
