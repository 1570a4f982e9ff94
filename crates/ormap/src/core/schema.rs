//! Schema and metadata types for mapped tables, columns and indexes.
//!
//! These types are the database-agnostic result of parsing an entity
//! descriptor. Dialects render them into DDL text.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::typemap::names;

/// A SQL type name with optional length/precision parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SqlType {
    /// Upper-cased semantic type name (e.g., "VARCHAR", "BIGINT").
    pub name: String,

    /// Length or precision (0 when absent).
    pub length: i64,

    /// Scale (0 when absent).
    pub length2: i64,
}

impl SqlType {
    /// Create a type without length parameters.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self::with_length(name, 0, 0)
    }

    /// Create a type with length/precision parameters.
    pub fn with_length(name: impl AsRef<str>, length: i64, length2: i64) -> Self {
        Self {
            name: name.as_ref().to_ascii_uppercase(),
            length,
            length2,
        }
    }

    pub fn is_text(&self) -> bool {
        names::TEXT_TYPES.contains(&self.name.as_str())
    }

    pub fn is_blob(&self) -> bool {
        names::BLOB_TYPES.contains(&self.name.as_str())
    }

    pub fn is_numeric(&self) -> bool {
        names::NUMERIC_TYPES.contains(&self.name.as_str())
    }

    pub fn is_time(&self) -> bool {
        names::TIME_TYPES.contains(&self.name.as_str())
    }

    pub fn is_json(&self) -> bool {
        self.name == names::JSON || self.name == names::JSONB
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.length, self.length2) {
            (0, 0) => write!(f, "{}", self.name),
            (l, 0) => write!(f, "{}({})", self.name, l),
            (l, l2) => write!(f, "{}({},{})", self.name, l, l2),
        }
    }
}

/// Direction in which a column's value flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MapType {
    /// Read from and written to the database.
    #[default]
    Bidirectional,
    /// Written to the database, never read back (`->`).
    OnlyToDb,
    /// Read from the database, never written (`<-`).
    OnlyFromDb,
}

/// Time zone applied to a temporal column's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeZone {
    Utc,
    Local,
}

/// Index kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexType {
    Plain,
    Unique,
}

impl IndexType {
    fn prefix(self) -> &'static str {
        match self {
            IndexType::Plain => "IDX_",
            IndexType::Unique => "UQE_",
        }
    }
}

/// Index metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Index label (or full name when not regular).
    pub name: String,

    /// Plain or unique.
    pub index_type: IndexType,

    /// Indexed column names, in registration order.
    pub columns: Vec<String>,

    /// Whether the rendered name is derived from table name and label.
    /// Cleared for indexes whose stored name must be used verbatim.
    pub is_regular: bool,
}

impl Index {
    /// Create a regular index whose rendered name is derived from the table name.
    pub fn new(name: impl Into<String>, index_type: IndexType) -> Self {
        Self {
            name: name.into(),
            index_type,
            columns: Vec::new(),
            is_regular: true,
        }
    }

    /// Append a column, ignoring duplicates.
    pub fn add_column(&mut self, column: impl Into<String>) {
        let column = column.into();
        if !self.columns.contains(&column) {
            self.columns.push(column);
        }
    }

    /// Rendered index name for a table.
    ///
    /// Regular indexes become `IDX_<table>_<label>` or `UQE_<table>_<label>`,
    /// using the last dotted segment of the table name with quotes removed.
    /// Names that already carry a prefix, and non-regular names, are kept.
    pub fn x_name(&self, table_name: &str) -> String {
        if !self.is_regular || self.name.starts_with("IDX_") || self.name.starts_with("UQE_") {
            return self.name.clone();
        }
        let unquoted: String = table_name
            .chars()
            .filter(|c| !matches!(c, '"' | '`' | '[' | ']'))
            .collect();
        let table = unquoted.rsplit('.').next().unwrap_or(&unquoted);
        format!("{}{}_{}", self.index_type.prefix(), table, self.name)
    }
}

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name in the database.
    pub name: String,

    /// Descriptor field the column was built from (dotted for embedded fields).
    pub field_name: String,

    /// SQL type.
    pub sql_type: SqlType,

    pub is_primary_key: bool,
    pub is_auto_increment: bool,

    /// Whether the column allows NULL.
    pub nullable: bool,

    pub is_created: bool,
    pub is_updated: bool,
    pub is_deleted: bool,
    pub is_version: bool,

    /// Value is stored as serialized JSON.
    pub is_json: bool,

    /// Raw SQL default expression or literal.
    pub default: Option<String>,

    /// Column comment.
    pub comment: String,

    pub map_type: MapType,

    /// Enum label to 0-based position, in declaration order.
    pub enum_options: IndexMap<String, usize>,

    /// Set label to 0-based position, in declaration order.
    pub set_options: IndexMap<String, usize>,

    pub time_zone: Option<TimeZone>,

    /// Index names this column participates in.
    pub indexes: IndexMap<String, IndexType>,
}

impl Column {
    /// Create a nullable column with no flags set.
    pub fn new(name: impl Into<String>, field_name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            field_name: field_name.into(),
            sql_type,
            is_primary_key: false,
            is_auto_increment: false,
            nullable: true,
            is_created: false,
            is_updated: false,
            is_deleted: false,
            is_version: false,
            is_json: false,
            default: None,
            comment: String::new(),
            map_type: MapType::Bidirectional,
            enum_options: IndexMap::new(),
            set_options: IndexMap::new(),
            time_zone: None,
            indexes: IndexMap::new(),
        }
    }

    /// Whether the column's value is managed by the session layer.
    pub fn is_lifecycle(&self) -> bool {
        self.is_created || self.is_updated || self.is_deleted || self.is_version
    }
}

/// Table metadata.
///
/// Columns are kept in insertion order, which is the DDL column order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: String,

    columns: IndexMap<String, Column>,

    /// Primary key column names, in declared column order.
    pub primary_keys: Vec<String>,

    /// Indexes by label, in registration order.
    pub indexes: IndexMap<String, Index>,

    /// Auto-increment column name.
    pub auto_increment: Option<String>,

    pub created: Option<String>,
    pub updated: Option<String>,
    pub deleted: Option<String>,
    pub version: Option<String>,

    /// Whether a cacher was requested for this table.
    pub cacheable: bool,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append a column, recording its key and lifecycle roles.
    ///
    /// Returns `false` without modifying the table when a column with the
    /// same name already exists.
    pub fn add_column(&mut self, column: Column) -> bool {
        if self.columns.contains_key(&column.name) {
            return false;
        }
        let name = column.name.clone();
        if column.is_primary_key {
            self.primary_keys.push(name.clone());
        }
        if column.is_auto_increment {
            self.auto_increment = Some(name.clone());
        }
        if column.is_created {
            self.created = Some(name.clone());
        }
        if column.is_updated {
            self.updated = Some(name.clone());
        }
        if column.is_deleted {
            self.deleted = Some(name.clone());
        }
        if column.is_version {
            self.version = Some(name.clone());
        }
        self.columns.insert(name, column);
        true
    }

    /// Look up a column by name, falling back to a case-insensitive match.
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name).or_else(|| {
            self.columns
                .values()
                .find(|c| c.name.eq_ignore_ascii_case(name))
        })
    }

    pub fn get_column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.get_mut(name)
    }

    /// Columns in declared order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    /// Column names in declared order.
    pub fn columns_seq(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Primary key columns in declared order.
    pub fn pk_columns(&self) -> Vec<&Column> {
        self.primary_keys
            .iter()
            .filter_map(|name| self.columns.get(name))
            .collect()
    }

    /// Register a column into the index with the given label, creating it if needed.
    pub fn add_index_column(&mut self, label: &str, index_type: IndexType, column: &str) {
        self.indexes
            .entry(label.to_string())
            .or_insert_with(|| Index::new(label, index_type))
            .add_column(column);
    }

    /// Check if the table has a primary key.
    pub fn has_pk(&self) -> bool {
        !self.primary_keys.is_empty()
    }

    /// Check if the table has a single-column primary key.
    pub fn has_single_pk(&self) -> bool {
        self.primary_keys.len() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_column(name: &str, sql_type: &str) -> Column {
        Column::new(name, name, SqlType::new(sql_type))
    }

    #[test]
    fn test_sql_type_display() {
        assert_eq!(SqlType::new("int").to_string(), "INT");
        assert_eq!(SqlType::with_length("varchar", 32, 0).to_string(), "VARCHAR(32)");
        assert_eq!(SqlType::with_length("numeric", 10, 2).to_string(), "NUMERIC(10,2)");
    }

    #[test]
    fn test_sql_type_categories() {
        assert!(SqlType::new("varchar").is_text());
        assert!(SqlType::new("bigint").is_numeric());
        assert!(SqlType::new("datetime").is_time());
        assert!(SqlType::new("blob").is_blob());
        assert!(SqlType::new("jsonb").is_json());
        assert!(!SqlType::new("int").is_text());
    }

    #[test]
    fn test_index_x_name() {
        let idx = Index::new("name", IndexType::Plain);
        assert_eq!(idx.x_name("user"), "IDX_user_name");

        let uq = Index::new("email", IndexType::Unique);
        assert_eq!(uq.x_name("public.\"user\""), "UQE_user_email");

        let mut explicit = Index::new("my_index", IndexType::Plain);
        explicit.is_regular = false;
        assert_eq!(explicit.x_name("user"), "my_index");

        let prefixed = Index::new("IDX_custom", IndexType::Plain);
        assert_eq!(prefixed.x_name("user"), "IDX_custom");
    }

    #[test]
    fn test_table_preserves_insertion_order() {
        let mut table = Table::new("user");
        assert!(table.add_column(make_test_column("zeta", "INT")));
        assert!(table.add_column(make_test_column("alpha", "INT")));
        assert!(table.add_column(make_test_column("mid", "INT")));
        assert_eq!(table.columns_seq(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_table_rejects_duplicate_column() {
        let mut table = Table::new("user");
        assert!(table.add_column(make_test_column("id", "INT")));
        assert!(!table.add_column(make_test_column("id", "BIGINT")));
        assert_eq!(table.column_count(), 1);
        assert_eq!(table.get_column("id").unwrap().sql_type.name, "INT");
    }

    #[test]
    fn test_table_tracks_keys_and_roles() {
        let mut table = Table::new("user");
        let mut id = make_test_column("id", "BIGINT");
        id.is_primary_key = true;
        id.is_auto_increment = true;
        let mut created = make_test_column("created_at", "DATETIME");
        created.is_created = true;
        table.add_column(id);
        table.add_column(created);

        assert!(table.has_single_pk());
        assert_eq!(table.auto_increment.as_deref(), Some("id"));
        assert_eq!(table.created.as_deref(), Some("created_at"));
        assert_eq!(table.pk_columns().len(), 1);
    }

    #[test]
    fn test_get_column_case_insensitive() {
        let mut table = Table::new("user");
        table.add_column(make_test_column("UserName", "VARCHAR"));
        assert!(table.get_column("username").is_some());
        assert!(table.get_column("missing").is_none());
    }

    #[test]
    fn test_add_index_column() {
        let mut table = Table::new("user");
        table.add_index_column("s", IndexType::Plain, "a");
        table.add_index_column("s", IndexType::Plain, "b");
        table.add_index_column("s", IndexType::Plain, "a");
        assert_eq!(table.indexes["s"].columns, vec!["a", "b"]);
    }
}
