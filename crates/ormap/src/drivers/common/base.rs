//! Shared DDL assembly used by the default [`Dialect`] methods.
//!
//! Every function here is generic over the dialect so that drivers can
//! call back into the shared shape after customizing a piece of it.

use crate::core::identifier::Quoter;
use crate::core::schema::{Column, Index, IndexType, Table};
use crate::core::traits::{CreateTableOptions, Dialect, Statement};

/// Column definition for CREATE TABLE / ALTER TABLE.
///
/// With `inline_pk` the definition carries `PRIMARY KEY` and the
/// dialect's auto-increment keyword. Primary key columns are always
/// rendered `NOT NULL`, including members of a composite key that the
/// schema leaves nullable.
pub fn column_definition<D: Dialect + ?Sized>(dialect: &D, col: &Column, inline_pk: bool) -> String {
    let mut parts = vec![dialect.quote(&col.name), dialect.sql_type(col)];

    if inline_pk && col.is_primary_key {
        parts.push("PRIMARY KEY".to_string());
        if col.is_auto_increment && !dialect.auto_incr_str().is_empty() {
            parts.push(dialect.auto_incr_str().to_string());
        }
    }

    if let Some(default) = dialect.column_default(col) {
        parts.push(format!("DEFAULT {}", default));
    }

    if dialect.show_create_null() {
        let nullable = col.nullable && !col.is_primary_key;
        parts.push(if nullable { "NULL" } else { "NOT NULL" }.to_string());
    }

    parts.join(" ")
}

/// CREATE TABLE with inline single primary key or trailing composite key.
pub fn create_table_sql<D: Dialect + ?Sized>(
    dialect: &D,
    table: &Table,
    opts: &CreateTableOptions,
) -> Statement {
    let table_name = opts.table_name.as_deref().unwrap_or(&table.name);
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (", dialect.quote(table_name));
    sql.push_str(&column_list(dialect, table));
    sql.push(')');

    if dialect.supports_engine() {
        if let Some(engine) = opts.store_engine.as_deref().filter(|e| !e.is_empty()) {
            sql.push_str(" ENGINE=");
            sql.push_str(engine);
        }
    }

    if dialect.supports_charset() {
        let charset = opts
            .charset
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(&dialect.uri().charset);
        if !charset.is_empty() {
            sql.push_str(" DEFAULT CHARSET ");
            sql.push_str(charset);
        }
    }

    Statement::new(sql)
}

/// Column definitions joined by `, `, followed by a composite key clause
/// when the table has more than one primary key.
pub fn column_list<D: Dialect + ?Sized>(dialect: &D, table: &Table) -> String {
    let single_pk = table.has_single_pk();
    let mut defs: Vec<String> = table
        .columns()
        .map(|col| {
            let mut def = column_definition(dialect, col, single_pk);
            if dialect.supports_column_comment() && !col.comment.is_empty() {
                def.push_str(" COMMENT ");
                def.push_str(&string_literal(&col.comment));
            }
            def
        })
        .collect();

    if table.primary_keys.len() > 1 {
        defs.push(format!(
            "PRIMARY KEY ({})",
            dialect.quoter().join(&table.primary_keys, ", ")
        ));
    }

    defs.join(", ")
}

pub fn drop_table_sql<D: Dialect + ?Sized>(dialect: &D, table_name: &str) -> Statement {
    if dialect.supports_drop_if_exists() {
        Statement::new(format!("DROP TABLE IF EXISTS {}", dialect.quote(table_name)))
    } else {
        Statement::new(format!("DROP TABLE {}", dialect.quote(table_name)))
    }
}

pub fn create_index_sql<D: Dialect + ?Sized>(dialect: &D, table_name: &str, index: &Index) -> Statement {
    let unique = match index.index_type {
        IndexType::Unique => " UNIQUE",
        IndexType::Plain => "",
    };
    Statement::new(format!(
        "CREATE{} INDEX {} ON {} ({})",
        unique,
        dialect.quote(&index.x_name(table_name)),
        dialect.quote(table_name),
        dialect.quoter().join(&index.columns, ",")
    ))
}

pub fn drop_index_sql<D: Dialect + ?Sized>(dialect: &D, table_name: &str, index: &Index) -> Statement {
    let name = dialect.quote(&index.x_name(table_name));
    if dialect.index_on_table() {
        Statement::new(format!("DROP INDEX {} ON {}", name, dialect.quote(table_name)))
    } else {
        Statement::new(format!("DROP INDEX {}", name))
    }
}

pub fn modify_column_sql<D: Dialect + ?Sized>(dialect: &D, table_name: &str, col: &Column) -> Statement {
    Statement::new(format!(
        "ALTER TABLE {} MODIFY COLUMN {}",
        dialect.quote(table_name),
        column_definition(dialect, col, false)
    ))
}

/// INFORMATION_SCHEMA column lookup keyed by database, table and column.
pub fn column_check_sql<D: Dialect + ?Sized>(dialect: &D, table_name: &str, col_name: &str) -> Statement {
    let sql = "SELECT `COLUMN_NAME` FROM `INFORMATION_SCHEMA`.`COLUMNS` \
               WHERE `TABLE_SCHEMA` = ? AND `TABLE_NAME` = ? AND `COLUMN_NAME` = ?";
    Statement::with_args(
        Quoter::COMMON.replace(sql, &dialect.quoter()),
        [dialect.uri().database.as_str(), table_name, col_name],
    )
}

/// Map `true`/`false` defaults of boolean columns to `1`/`0`.
pub fn bool_default_as_int(col: &Column) -> Option<String> {
    let default = col.default.as_ref()?;
    if matches!(col.sql_type.name.as_str(), "BOOL" | "BOOLEAN" | "BIT") {
        if default.eq_ignore_ascii_case("true") {
            return Some("1".to_string());
        }
        if default.eq_ignore_ascii_case("false") {
            return Some("0".to_string());
        }
    }
    Some(default.clone())
}

/// Single-quoted SQL string literal with embedded quotes doubled.
pub fn string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Lowercase hex digits of a byte string.
pub fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::SqlType;
    use crate::drivers::MysqlDialect;

    #[test]
    fn test_composite_key_members_render_not_null() {
        let d = MysqlDialect::new();
        let mut table = Table::new("membership");
        for name in ["group_id", "user_id"] {
            let mut col = Column::new(name, name, SqlType::new("BIGINT"));
            col.is_primary_key = true;
            table.add_column(col);
        }
        table.add_column(Column::new("role", "role", SqlType::with_length("VARCHAR", 16, 0)));
        assert!(table.get_column("group_id").unwrap().nullable);

        assert_eq!(
            create_table_sql(&d, &table, &CreateTableOptions::default()).sql,
            "CREATE TABLE IF NOT EXISTS `membership` (`group_id` BIGINT(20) NOT NULL, \
             `user_id` BIGINT(20) NOT NULL, `role` VARCHAR(16) NULL, \
             PRIMARY KEY (`group_id`, `user_id`))"
        );
        assert_eq!(
            column_definition(&d, table.get_column("user_id").unwrap(), false),
            "`user_id` BIGINT(20) NOT NULL"
        );
    }

    #[test]
    fn test_string_literal_escapes_quotes() {
        assert_eq!(string_literal("it's"), "'it''s'");
        assert_eq!(string_literal(""), "''");
    }

    #[test]
    fn test_hex() {
        assert_eq!(hex(&[0x00, 0xab, 0x10]), "00ab10");
        assert_eq!(hex(&[]), "");
    }
}
