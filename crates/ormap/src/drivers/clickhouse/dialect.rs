//! ClickHouse SQL dialect (Strategy pattern).
//!
//! Tables are created on a MergeTree-family engine ordered by the primary
//! key. Nullable columns are wrapped in `Nullable(..)` instead of carrying
//! a `NULL` clause, and secondary indexes are data-skipping indexes added
//! through `ALTER TABLE`.

use crate::core::identifier::{QuotePolicy, Quoter};
use crate::core::schema::{Column, Index, Table};
use crate::core::traits::{CreateTableOptions, Dialect, Filter, Statement};
use crate::core::uri::{DbType, Uri};
use crate::drivers::common::base;
use crate::error::Result;
use crate::typemap::names::*;

const QUOTER: Quoter = Quoter::new('`', '`');

const DEFAULT_ENGINE: &str = "MergeTree()";

/// Enum8 holds values in the Int8 range.
const ENUM8_MAX_OPTIONS: usize = 128;

fn is_reserved_word(_name: &str) -> bool {
    false
}

/// ClickHouse dialect implementation.
#[derive(Debug, Clone)]
pub struct ClickHouseDialect {
    uri: Uri,
    quoter: Quoter,
}

impl ClickHouseDialect {
    pub fn new() -> Self {
        Self {
            uri: Uri::new(DbType::ClickHouse),
            quoter: QUOTER,
        }
    }

    fn base_type(&self, col: &Column) -> String {
        let t = &col.sql_type;
        match t.name.as_str() {
            BOOL | BOOLEAN | BIT => "Bool".to_string(),
            TINYINT => "Int8".to_string(),
            SMALLINT => "Int16".to_string(),
            MEDIUMINT | INT | INTEGER | SERIAL => "Int32".to_string(),
            BIGINT | BIGSERIAL => "Int64".to_string(),
            FLOAT | REAL => "Float32".to_string(),
            DOUBLE => "Float64".to_string(),
            DECIMAL | NUMERIC | MONEY | SMALLMONEY => {
                if t.length > 0 {
                    format!("Decimal({}, {})", t.length, t.length2)
                } else {
                    "Decimal(26, 8)".to_string()
                }
            }
            CHAR | NCHAR if t.length > 0 => format!("FixedString({})", t.length),
            UUID | UNIQUEIDENTIFIER => "UUID".to_string(),
            DATE => "Date".to_string(),
            DATETIME | TIMESTAMP | SMALLDATETIME => "DateTime".to_string(),
            TIMESTAMPZ => "DateTime('UTC')".to_string(),
            YEAR => "UInt16".to_string(),
            ENUM if !col.enum_options.is_empty() => {
                let width = if col.enum_options.len() <= ENUM8_MAX_OPTIONS { 8 } else { 16 };
                let options: Vec<String> = col
                    .enum_options
                    .iter()
                    .map(|(label, pos)| format!("{} = {}", base::string_literal(label), pos))
                    .collect();
                format!("Enum{}({})", width, options.join(", "))
            }
            SET => "Array(String)".to_string(),
            _ => "String".to_string(),
        }
    }
}

impl Default for ClickHouseDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for ClickHouseDialect {
    fn db_type(&self) -> DbType {
        DbType::ClickHouse
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

    /// Primary key columns are never wrapped; arrays cannot be.
    fn sql_type(&self, col: &Column) -> String {
        let ty = self.base_type(col);
        if col.nullable && !col.is_primary_key && !ty.starts_with("Array(") {
            format!("Nullable({})", ty)
        } else {
            ty
        }
    }

    fn column_default(&self, col: &Column) -> Option<String> {
        base::bool_default_as_int(col)
    }

    fn auto_incr_str(&self) -> &str {
        ""
    }

    fn supports_engine(&self) -> bool {
        true
    }

    fn show_create_null(&self) -> bool {
        false
    }

    fn supports_column_comment(&self) -> bool {
        true
    }

    /// `ENGINE` and `ORDER BY` are mandatory; a table without a primary
    /// key is ordered by `tuple()`.
    fn create_table_sql(&self, table: &Table, opts: &CreateTableOptions) -> Statement {
        let table_name = opts.table_name.as_deref().unwrap_or(&table.name);
        let defs: Vec<String> = table
            .columns()
            .map(|col| {
                let mut def = base::column_definition(self, col, false);
                if !col.comment.is_empty() {
                    def.push_str(" COMMENT ");
                    def.push_str(&base::string_literal(&col.comment));
                }
                def
            })
            .collect();

        let engine = opts
            .store_engine
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(DEFAULT_ENGINE);
        let order_by = if table.primary_keys.is_empty() {
            "tuple()".to_string()
        } else {
            format!("({})", self.quoter.join(&table.primary_keys, ", "))
        };

        Statement::new(format!(
            "CREATE TABLE IF NOT EXISTS {} ({}) ENGINE = {} ORDER BY {}",
            self.quote(table_name),
            defs.join(", "),
            engine,
            order_by
        ))
    }

    /// Data-skipping index; uniqueness is not enforced by ClickHouse.
    fn create_index_sql(&self, table_name: &str, index: &Index) -> Statement {
        Statement::new(format!(
            "ALTER TABLE {} ADD INDEX {} ({}) TYPE minmax GRANULARITY 1",
            self.quote(table_name),
            self.quote(&index.x_name(table_name)),
            self.quoter.join(&index.columns, ", ")
        ))
    }

    fn drop_index_sql(&self, table_name: &str, index: &Index) -> Statement {
        Statement::new(format!(
            "ALTER TABLE {} DROP INDEX {}",
            self.quote(table_name),
            self.quote(&index.x_name(table_name))
        ))
    }

    fn table_check_sql(&self, table_name: &str) -> Statement {
        Statement::with_args(
            "SELECT name FROM system.tables WHERE database = ? AND name = ?",
            [self.uri.database.as_str(), table_name],
        )
    }

    fn column_check_sql(&self, table_name: &str, col_name: &str) -> Statement {
        Statement::with_args(
            "SELECT name FROM system.columns WHERE database = ? AND table = ? AND name = ?",
            [self.uri.database.as_str(), table_name, col_name],
        )
    }

    fn index_check_sql(&self, table_name: &str, index_name: &str) -> Statement {
        Statement::with_args(
            "SELECT name FROM system.data_skipping_indices WHERE database = ? AND table = ? AND name = ?",
            [self.uri.database.as_str(), table_name, index_name],
        )
    }

    fn filters(&self) -> Vec<Box<dyn Filter>> {
        Vec::new()
    }

    fn for_update_sql(&self, query: &str) -> String {
        query.to_string()
    }

    fn format_bytes(&self, bytes: &[u8]) -> String {
        format!("unhex('{}')", base::hex(bytes))
    }
}
