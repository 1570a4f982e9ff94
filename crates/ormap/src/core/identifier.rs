//! Identifier quoting for dialect-correct SQL text.
//!
//! A [`Quoter`] wraps identifier segments in a dialect's quote pair. Input
//! expressions may already mix bare names, generic backtick quoting and the
//! dialect's own quoting, be qualified (`schema.table`) and carry an alias
//! (`table AS t`). Backticks act as a dialect-agnostic quote marker: SQL
//! written against backticks is normalized to the target dialect.
//!
//! # Examples
//!
//! ```
//! use ormap::core::Quoter;
//!
//! let quoter = Quoter::new('[', ']');
//! assert_eq!(quoter.quote("`myschema`.mytable"), "[myschema].[mytable]");
//! assert_eq!(quoter.quote("`message_user` AS `sender`"), "[message_user] AS [sender]");
//! assert_eq!(quoter.trim("[myschema].[mytable]"), "myschema.mytable");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generic quote character accepted in any dialect.
pub const COMMON_QUOTE: char = '`';

/// When a bare identifier segment gets wrapped in quotes.
#[derive(Clone, Copy)]
pub enum ReservePolicy {
    /// Quote every identifier.
    Always,
    /// Never quote bare identifiers; already-quoted segments are still normalized.
    Never,
    /// Quote only identifiers for which the predicate returns true (reserved words).
    Keywords(fn(&str) -> bool),
}

impl ReservePolicy {
    fn reserves(&self, ident: &str) -> bool {
        match self {
            ReservePolicy::Always => true,
            ReservePolicy::Never => false,
            ReservePolicy::Keywords(is_reserved) => is_reserved(ident),
        }
    }
}

impl fmt::Debug for ReservePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservePolicy::Always => f.write_str("Always"),
            ReservePolicy::Never => f.write_str("Never"),
            ReservePolicy::Keywords(_) => f.write_str("Keywords"),
        }
    }
}

/// Configured quoting mode, resolved by each dialect into a [`ReservePolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotePolicy {
    #[default]
    Always,
    Never,
    /// Quote only the dialect's reserved words.
    Reserved,
}

impl QuotePolicy {
    pub fn resolve(self, is_reserved: fn(&str) -> bool) -> ReservePolicy {
        match self {
            QuotePolicy::Always => ReservePolicy::Always,
            QuotePolicy::Never => ReservePolicy::Never,
            QuotePolicy::Reserved => ReservePolicy::Keywords(is_reserved),
        }
    }
}

/// A dialect's identifier quote pair and reservation policy.
#[derive(Debug, Clone, Copy)]
pub struct Quoter {
    prefix: Option<char>,
    suffix: Option<char>,
    policy: ReservePolicy,
}

impl Quoter {
    /// Backtick quoter used as the dialect-agnostic form.
    pub const COMMON: Quoter = Quoter {
        prefix: Some(COMMON_QUOTE),
        suffix: Some(COMMON_QUOTE),
        policy: ReservePolicy::Always,
    };

    /// Quoter that leaves identifiers untouched.
    pub const NONE: Quoter = Quoter {
        prefix: None,
        suffix: None,
        policy: ReservePolicy::Always,
    };

    /// Create a quoter that always quotes.
    pub const fn new(prefix: char, suffix: char) -> Self {
        Self {
            prefix: Some(prefix),
            suffix: Some(suffix),
            policy: ReservePolicy::Always,
        }
    }

    pub const fn with_policy(mut self, policy: ReservePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn prefix(&self) -> Option<char> {
        self.prefix
    }

    pub fn suffix(&self) -> Option<char> {
        self.suffix
    }

    pub fn policy(&self) -> ReservePolicy {
        self.policy
    }

    /// True when the quoter has neither prefix nor suffix.
    pub fn is_empty(&self) -> bool {
        self.prefix.is_none() && self.suffix.is_none()
    }

    fn pair(&self) -> (char, char) {
        let prefix = self.prefix.or(self.suffix).unwrap_or(COMMON_QUOTE);
        let suffix = self.suffix.unwrap_or(prefix);
        (prefix, suffix)
    }

    /// Quote an identifier expression.
    pub fn quote(&self, value: &str) -> String {
        let mut buf = String::with_capacity(value.len() + 4);
        self.quote_to(&mut buf, value);
        buf
    }

    /// Quote each identifier expression.
    pub fn strings(&self, values: &[impl AsRef<str>]) -> Vec<String> {
        values.iter().map(|v| self.quote(v.as_ref())).collect()
    }

    /// Append the quoted form of an identifier expression to `buf`.
    ///
    /// Scans left to right: dots pass through, segments already wrapped in
    /// the dialect quote or in backticks are re-wrapped with their content
    /// untouched, a space closes the current segment and introduces either
    /// an `AS` keyword or an alias, and any other bare segment is wrapped.
    /// The `AS` detection is a two-character lookahead, not a tokenizer.
    pub fn quote_to(&self, buf: &mut String, value: &str) {
        if self.is_empty() {
            buf.push_str(value);
            return;
        }

        let (prefix, suffix) = self.pair();
        let chars: Vec<char> = value.chars().collect();
        let len = chars.len();
        let mut i = 0;

        while i < len {
            let c = chars[i];
            if c == '.' {
                buf.push('.');
                i += 1;
            } else if c == prefix || c == COMMON_QUOTE {
                let close = if c == prefix { suffix } else { COMMON_QUOTE };
                buf.push(prefix);
                i += 1;
                while i < len && chars[i] != close && chars[i] != ' ' {
                    buf.push(chars[i]);
                    i += 1;
                }
                buf.push(suffix);
                if i < len && chars[i] == close {
                    i += 1;
                }
            } else if c == ' ' {
                // `a AS b` or `a b`
                while i < len {
                    if chars[i] != ' '
                        && chars[i - 1] == ' '
                        && len > i + 1
                        && !is_as_keyword(chars[i], chars[i + 1])
                    {
                        break;
                    }
                    buf.push(chars[i]);
                    i += 1;
                }
            } else {
                let start = i;
                while i < len && chars[i] != '.' && chars[i] != ' ' {
                    i += 1;
                }
                let segment: String = chars[start..i].iter().collect();
                if self.policy.reserves(&segment) {
                    buf.push(prefix);
                    buf.push_str(&segment);
                    buf.push(suffix);
                } else {
                    buf.push_str(&segment);
                }
            }
        }
    }

    /// Remove one layer of this dialect's quotes, keeping qualifier dots.
    pub fn trim(&self, value: &str) -> String {
        let chars: Vec<char> = value.chars().collect();
        if chars.len() < 2 || self.is_empty() {
            return value.to_string();
        }
        let (prefix, suffix) = self.pair();
        let last = chars.len() - 1;

        let mut buf = String::with_capacity(value.len());
        for (i, &c) in chars.iter().enumerate() {
            let skip = (i == 0 && c == prefix)
                || (i == last && c == suffix)
                || (c == suffix && i < last && chars[i + 1] == '.')
                || (c == prefix && i > 0 && chars[i - 1] == '.');
            if !skip {
                buf.push(c);
            }
        }
        buf
    }

    /// Join column names quoted with `sep`; `*` is never quoted.
    pub fn join(&self, columns: &[impl AsRef<str>], sep: &str) -> String {
        let mut buf = String::new();
        self.join_write(&mut buf, columns, sep);
        buf
    }

    /// Append joined, quoted column names to `buf`.
    pub fn join_write(&self, buf: &mut String, columns: &[impl AsRef<str>], sep: &str) {
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                buf.push_str(sep);
            }
            let column = column.as_ref().trim();
            if column == "*" {
                buf.push('*');
            } else {
                self.quote_to(buf, column);
            }
        }
    }

    /// Rewrite SQL quoted with this quoter's pair into `target`'s pair.
    ///
    /// Characters inside single-quoted string literals are left alone.
    /// An empty `target` strips the quotes.
    pub fn replace(&self, sql: &str, target: &Quoter) -> String {
        if self.is_empty() {
            return sql.to_string();
        }
        let (from_prefix, from_suffix) = self.pair();
        let mut buf = String::with_capacity(sql.len());
        let mut in_literal = false;
        let mut open = false;

        for c in sql.chars() {
            if c == '\'' {
                in_literal = !in_literal;
                buf.push(c);
                continue;
            }
            if in_literal {
                buf.push(c);
                continue;
            }
            if !open && c == from_prefix {
                open = true;
                if let Some(p) = target.prefix {
                    buf.push(p);
                }
            } else if open && c == from_suffix {
                open = false;
                if let Some(s) = target.suffix {
                    buf.push(s);
                }
            } else {
                buf.push(c);
            }
        }
        buf
    }
}

fn is_as_keyword(a: char, b: char) -> bool {
    a.eq_ignore_ascii_case(&'a') && b.eq_ignore_ascii_case(&'s')
}
