//! Microsoft SQL Server SQL dialect (Strategy pattern).
//!
//! Bracket quoting, `IDENTITY` keys, and guarded CREATE/DROP TABLE since
//! older SQL Server versions lack `IF [NOT] EXISTS` on those statements.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::core::identifier::{QuotePolicy, Quoter};
use crate::core::schema::{Column, Table};
use crate::core::traits::{CreateTableOptions, Dialect, Filter, Statement};
use crate::core::uri::{DbType, Uri};
use crate::drivers::common::{base, IdFilter, QuoteFilter};
use crate::error::Result;
use crate::typemap::names::*;

const QUOTER: Quoter = Quoter::new('[', ']');

static RESERVED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "ADD", "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "AUTHORIZATION", "BACKUP", "BEGIN",
        "BETWEEN", "BREAK", "BROWSE", "BULK", "BY", "CASCADE", "CASE", "CHECK", "CHECKPOINT",
        "CLOSE", "CLUSTERED", "COALESCE", "COLLATE", "COLUMN", "COMMIT", "COMPUTE", "CONSTRAINT",
        "CONTAINS", "CONTINUE", "CONVERT", "CREATE", "CROSS", "CURRENT", "CURRENT_DATE",
        "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_USER", "CURSOR", "DATABASE", "DBCC",
        "DEALLOCATE", "DECLARE", "DEFAULT", "DELETE", "DENY", "DESC", "DISK", "DISTINCT",
        "DISTRIBUTED", "DOUBLE", "DROP", "DUMP", "ELSE", "END", "ERRLVL", "ESCAPE", "EXCEPT",
        "EXEC", "EXECUTE", "EXISTS", "EXIT", "EXTERNAL", "FETCH", "FILE", "FILLFACTOR", "FOR",
        "FOREIGN", "FREETEXT", "FROM", "FULL", "FUNCTION", "GOTO", "GRANT", "GROUP", "HAVING",
        "HOLDLOCK", "IDENTITY", "IF", "IN", "INDEX", "INNER", "INSERT", "INTERSECT", "INTO", "IS",
        "JOIN", "KEY", "KILL", "LEFT", "LIKE", "LINENO", "LOAD", "MERGE", "NATIONAL", "NOCHECK",
        "NONCLUSTERED", "NOT", "NULL", "NULLIF", "OF", "OFF", "OFFSETS", "ON", "OPEN", "OPTION",
        "OR", "ORDER", "OUTER", "OVER", "PERCENT", "PIVOT", "PLAN", "PRECISION", "PRIMARY",
        "PRINT", "PROC", "PROCEDURE", "PUBLIC", "RAISERROR", "READ", "RECONFIGURE", "REFERENCES",
        "REPLICATION", "RESTORE", "RESTRICT", "RETURN", "REVERT", "REVOKE", "RIGHT", "ROLLBACK",
        "ROWCOUNT", "ROWGUIDCOL", "RULE", "SAVE", "SCHEMA", "SELECT", "SESSION_USER", "SET",
        "SETUSER", "SHUTDOWN", "SOME", "STATISTICS", "SYSTEM_USER", "TABLE", "TABLESAMPLE",
        "THEN", "TO", "TOP", "TRAN", "TRANSACTION", "TRIGGER", "TRUNCATE", "UNION", "UNIQUE",
        "UNPIVOT", "UPDATE", "USE", "USER", "VALUES", "VARYING", "VIEW", "WAITFOR", "WHEN",
        "WHERE", "WHILE", "WITH",
    ]
    .into_iter()
    .collect()
});

fn is_reserved_word(name: &str) -> bool {
    RESERVED.contains(name.to_ascii_uppercase().as_str())
}

/// Microsoft SQL Server dialect implementation.
#[derive(Debug, Clone)]
pub struct MssqlDialect {
    uri: Uri,
    quoter: Quoter,
}

impl MssqlDialect {
    /// Create a new MSSQL dialect instance.
    pub fn new() -> Self {
        Self {
            uri: Uri::new(DbType::Mssql),
            quoter: QUOTER,
        }
    }
}

impl Default for MssqlDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for MssqlDialect {
    fn db_type(&self) -> DbType {
        DbType::Mssql
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
        let mut length2 = col.sql_type.length2;

        let mut res = match col.sql_type.name.as_str() {
            BOOL | BOOLEAN | BIT => return BIT.to_string(),
            SERIAL | MEDIUMINT | INT | INTEGER => return INT.to_string(),
            BIGSERIAL | BIGINT => return BIGINT.to_string(),
            TINYINT => return TINYINT.to_string(),
            BYTEA | BLOB | BINARY | TINYBLOB | MEDIUMBLOB | LONGBLOB => {
                if length == 0 {
                    length = 50;
                }
                VARBINARY.to_string()
            }
            TIMESTAMP | DATETIME => {
                if length > 3 {
                    "DATETIME2".to_string()
                } else {
                    return DATETIME.to_string();
                }
            }
            TIMESTAMPZ => {
                length = 7;
                length2 = 0;
                "DATETIMEOFFSET".to_string()
            }
            TEXT | MEDIUMTEXT | TINYTEXT | LONGTEXT | JSON | JSONB | ENUM | SET => {
                return "VARCHAR(MAX)".to_string();
            }
            DOUBLE => REAL.to_string(),
            UUID => {
                length = 40;
                VARCHAR.to_string()
            }
            VARCHAR | NVARCHAR if length == -1 => {
                return format!("{}(MAX)", col.sql_type.name);
            }
            other => other.to_string(),
        };

        if length2 > 0 {
            res.push_str(&format!("({},{})", length, length2));
        } else if length > 0 {
            res.push_str(&format!("({})", length));
        }
        res
    }

    fn column_default(&self, col: &Column) -> Option<String> {
        base::bool_default_as_int(col)
    }

    fn auto_incr_str(&self) -> &str {
        "IDENTITY"
    }

    fn supports_drop_if_exists(&self) -> bool {
        false
    }

    fn index_on_table(&self) -> bool {
        true
    }

    fn create_table_sql(&self, table: &Table, opts: &CreateTableOptions) -> Statement {
        let name = opts.table_name.as_deref().unwrap_or(&table.name);
        Statement::new(format!(
            "IF NOT EXISTS (SELECT [name] FROM sys.tables WHERE [name] = {}) CREATE TABLE {} ({})",
            base::string_literal(name),
            self.quote(name),
            base::column_list(self, table)
        ))
    }

    fn drop_table_sql(&self, table_name: &str) -> Statement {
        Statement::new(format!(
            "IF EXISTS (SELECT * FROM sysobjects WHERE id = object_id(N{}) AND OBJECTPROPERTY(id, N'IsUserTable') = 1) DROP TABLE {}",
            base::string_literal(table_name),
            self.quote(table_name)
        ))
    }

    fn modify_column_sql(&self, table_name: &str, col: &Column) -> Statement {
        Statement::new(format!(
            "ALTER TABLE {} ALTER COLUMN {}",
            self.quote(table_name),
            base::column_definition(self, col, false)
        ))
    }

    fn table_check_sql(&self, table_name: &str) -> Statement {
        Statement::with_args("SELECT [name] FROM sys.tables WHERE [name] = ?", [table_name])
    }

    fn column_check_sql(&self, table_name: &str, col_name: &str) -> Statement {
        Statement::with_args(
            "SELECT [COLUMN_NAME] FROM [INFORMATION_SCHEMA].[COLUMNS] WHERE [TABLE_NAME] = ? AND [COLUMN_NAME] = ?",
            [table_name, col_name],
        )
    }

    fn index_check_sql(&self, table_name: &str, index_name: &str) -> Statement {
        Statement::with_args(
            "SELECT 1 FROM sys.indexes WHERE object_id = OBJECT_ID(?) AND name = ?",
            [table_name, index_name],
        )
    }

    fn filters(&self) -> Vec<Box<dyn Filter>> {
        vec![Box::new(IdFilter), Box::new(QuoteFilter)]
    }

    fn for_update_sql(&self, query: &str) -> String {
        query.to_string()
    }
}
