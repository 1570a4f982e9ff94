//! Naming conventions between type/field names and table/column names.
//!
//! The parser consults a [`NameMapper`] whenever an annotation does not
//! carry an explicit name. Three conventions are provided:
//!
//! | Mapper | `UserID` → | `user_id` → |
//! |---|---|---|
//! | [`SnakeMapper`] | `user_id` | `UserId` |
//! | [`GonicMapper`] | `user_id` | `UserID` |
//! | [`SameMapper`] | `UserID` | `user_id` |
//!
//! Runs of capitals are treated as one word, so `StructWithSQLType` maps to
//! `struct_with_sql_type` and `ID` to `id`.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Translates between type names and database names.
pub trait NameMapper: Send + Sync + fmt::Debug {
    /// Map a type or field name to a table or column name.
    fn obj_to_table(&self, name: &str) -> String;

    /// Map a table or column name back to a type or field name.
    fn table_to_obj(&self, name: &str) -> String;
}

/// Built-in naming conventions, selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingConvention {
    #[default]
    Snake,
    Same,
    Gonic,
}

impl NamingConvention {
    /// Build the mapper for this convention, wrapped in a [`CacheMapper`].
    pub fn mapper(self) -> Arc<dyn NameMapper> {
        let inner: Arc<dyn NameMapper> = match self {
            NamingConvention::Snake => Arc::new(SnakeMapper),
            NamingConvention::Same => Arc::new(SameMapper),
            NamingConvention::Gonic => Arc::new(GonicMapper::new()),
        };
        Arc::new(CacheMapper::new(inner))
    }
}

/// Split a camel-case name into lower-case words joined by `_`.
fn snake_cased(name: &str) -> String {
    let mut out: Vec<char> = Vec::with_capacity(name.len() + 4);
    for (idx, chr) in name.chars().enumerate() {
        if chr.is_ascii_uppercase() && idx > 0 {
            if let Some(&last) = out.last() {
                if !last.is_ascii_uppercase() && last != '_' {
                    out.push('_');
                }
            }
        }
        // "SQLType": the last capital of a run starts the next word
        if !chr.is_ascii_uppercase() && chr != '_' && out.len() >= 2 {
            let len = out.len();
            if out[len - 1].is_ascii_uppercase() && out[len - 2].is_ascii_uppercase() {
                let last = out[len - 1];
                out[len - 1] = '_';
                out.push(last);
            }
        }
        out.push(chr);
    }
    out.into_iter().collect::<String>().to_ascii_lowercase()
}

fn title_cased(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// `UserName` ↔ `user_name`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeMapper;

impl NameMapper for SnakeMapper {
    fn obj_to_table(&self, name: &str) -> String {
        snake_cased(name)
    }

    fn table_to_obj(&self, name: &str) -> String {
        name.split('_').map(title_cased).collect()
    }
}

/// Identity mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct SameMapper;

impl NameMapper for SameMapper {
    fn obj_to_table(&self, name: &str) -> String {
        name.to_string()
    }

    fn table_to_obj(&self, name: &str) -> String {
        name.to_string()
    }
}

const COMMON_INITIALISMS: &[&str] = &[
    "ACL", "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID",
    "IP", "JSON", "LHS", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SQL", "SSH", "TCP", "TLS",
    "TTL", "UDP", "UI", "UID", "UUID", "URI", "URL", "UTC", "UTF8", "VM", "XML", "XMPP", "XSRF",
    "XSS",
];

/// Snake-case mapping that restores initialisms on the way back:
/// `user_id` → `UserID`, `api_url` → `APIURL`.
#[derive(Debug, Clone)]
pub struct GonicMapper {
    initialisms: HashSet<String>,
}

impl GonicMapper {
    /// Mapper with the common initialisms (`ID`, `URL`, `JSON`, ...).
    pub fn new() -> Self {
        Self::with_initialisms(COMMON_INITIALISMS.iter().copied())
    }

    /// Mapper with a custom set of initialisms.
    pub fn with_initialisms<I, S>(initialisms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            initialisms: initialisms
                .into_iter()
                .map(|s| s.as_ref().to_ascii_uppercase())
                .collect(),
        }
    }
}

impl Default for GonicMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl NameMapper for GonicMapper {
    fn obj_to_table(&self, name: &str) -> String {
        snake_cased(name)
    }

    fn table_to_obj(&self, name: &str) -> String {
        name.split('_')
            .map(|word| {
                let upper = word.to_ascii_uppercase();
                if self.initialisms.contains(&upper) {
                    upper
                } else {
                    title_cased(word)
                }
            })
            .collect()
    }
}

/// Memoizes another mapper in both directions.
#[derive(Debug)]
pub struct CacheMapper {
    inner: Arc<dyn NameMapper>,
    to_table: RwLock<HashMap<String, String>>,
    to_obj: RwLock<HashMap<String, String>>,
}

impl CacheMapper {
    pub fn new(inner: Arc<dyn NameMapper>) -> Self {
        Self {
            inner,
            to_table: RwLock::new(HashMap::new()),
            to_obj: RwLock::new(HashMap::new()),
        }
    }

    fn cached(
        cache: &RwLock<HashMap<String, String>>,
        name: &str,
        map: impl FnOnce(&str) -> String,
    ) -> String {
        if let Some(hit) = cache.read().get(name) {
            return hit.clone();
        }
        let mapped = map(name);
        cache.write().insert(name.to_string(), mapped.clone());
        mapped
    }
}

impl NameMapper for CacheMapper {
    fn obj_to_table(&self, name: &str) -> String {
        Self::cached(&self.to_table, name, |n| self.inner.obj_to_table(n))
    }

    fn table_to_obj(&self, name: &str) -> String {
        Self::cached(&self.to_obj, name, |n| self.inner.table_to_obj(n))
    }
}
