//! SQL text filters shared by the built-in dialects.
//!
//! Generated SQL is written with `?` placeholders and backtick quoting.
//! Each dialect lists the filters that turn that into its native form.

use crate::core::identifier::Quoter;
use crate::core::schema::Table;
use crate::core::traits::{Dialect, Filter};

/// Run a dialect's filters over `sql` in declared order.
pub fn apply_filters(dialect: &dyn Dialect, table: Option<&Table>, sql: &str) -> String {
    dialect
        .filters()
        .iter()
        .fold(sql.to_string(), |acc, filter| filter.apply(dialect, table, &acc))
}

/// Rewrites `?` placeholders to numbered ones (`$1`, `$2`, ...).
#[derive(Debug, Clone)]
pub struct SeqFilter {
    pub prefix: String,
    pub start: usize,
}

impl SeqFilter {
    pub fn new(prefix: impl Into<String>, start: usize) -> Self {
        Self {
            prefix: prefix.into(),
            start,
        }
    }
}

impl Filter for SeqFilter {
    fn apply(&self, _dialect: &dyn Dialect, _table: Option<&Table>, sql: &str) -> String {
        convert_question_marks(sql, &self.prefix, self.start)
    }
}

/// Number every `?` outside single-quoted literals.
///
/// Inside a literal, `''` is an escaped quote and a backslash escapes the
/// following character. A backslash directly before `''` is taken as a
/// plain character so the pair stays a doubled-quote escape.
pub fn convert_question_marks(sql: &str, prefix: &str, start: usize) -> String {
    let chars: Vec<char> = sql.chars().collect();
    let mut buf = String::with_capacity(sql.len() + 8);
    let mut index = start;
    let mut in_literal = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if !in_literal {
            if c == '?' {
                buf.push_str(prefix);
                buf.push_str(&index.to_string());
                index += 1;
            } else {
                if c == '\'' {
                    in_literal = true;
                }
                buf.push(c);
            }
            i += 1;
            continue;
        }

        buf.push(c);
        match c {
            '\\' if !starts_doubled_quote(&chars, i + 1) => {
                if let Some(&next) = chars.get(i + 1) {
                    buf.push(next);
                    i += 1;
                }
            }
            '\'' => {
                if chars.get(i + 1) == Some(&'\'') {
                    buf.push('\'');
                    i += 1;
                } else {
                    in_literal = false;
                }
            }
            _ => {}
        }
        i += 1;
    }
    buf
}

fn starts_doubled_quote(chars: &[char], at: usize) -> bool {
    chars.get(at) == Some(&'\'') && chars.get(at + 1) == Some(&'\'')
}

/// Rewrites backtick quoting to the dialect's quote pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuoteFilter;

impl Filter for QuoteFilter {
    fn apply(&self, dialect: &dyn Dialect, _table: Option<&Table>, sql: &str) -> String {
        let quoter = dialect.quoter();
        if quoter.is_empty() {
            return sql.to_string();
        }
        Quoter::COMMON.replace(sql, &quoter)
    }
}

/// Replaces the ` (id) ` placeholder with the table's sole primary key.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdFilter;

impl Filter for IdFilter {
    fn apply(&self, dialect: &dyn Dialect, table: Option<&Table>, sql: &str) -> String {
        let pk = match table {
            Some(t) if t.has_single_pk() => &t.primary_keys[0],
            _ => return sql.to_string(),
        };
        let quoter = dialect.quoter();
        let replacement = format!(" {} ", quoter.quote(pk));
        sql.replace(" `(id)` ", &replacement)
            .replace(&format!(" {} ", quoter.quote("(id)")), &replacement)
            .replace(" (id) ", &replacement)
    }
}
