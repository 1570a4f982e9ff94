//! Default mapping from descriptor value types to SQL types.
//!
//! A field without an explicit SQL type token gets its type from
//! [`default_sql_type`]. Types with no mapping here (entities, custom
//! types) must either be registered with the parser or carry an explicit
//! type in their annotation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::schema::SqlType;

/// Semantic SQL type names shared by all dialects.
pub mod names {
    pub const BIT: &str = "BIT";
    pub const TINYINT: &str = "TINYINT";
    pub const SMALLINT: &str = "SMALLINT";
    pub const MEDIUMINT: &str = "MEDIUMINT";
    pub const INT: &str = "INT";
    pub const INTEGER: &str = "INTEGER";
    pub const BIGINT: &str = "BIGINT";

    pub const ENUM: &str = "ENUM";
    pub const SET: &str = "SET";

    pub const CHAR: &str = "CHAR";
    pub const VARCHAR: &str = "VARCHAR";
    pub const NCHAR: &str = "NCHAR";
    pub const NVARCHAR: &str = "NVARCHAR";
    pub const TINYTEXT: &str = "TINYTEXT";
    pub const TEXT: &str = "TEXT";
    pub const NTEXT: &str = "NTEXT";
    pub const CLOB: &str = "CLOB";
    pub const MEDIUMTEXT: &str = "MEDIUMTEXT";
    pub const LONGTEXT: &str = "LONGTEXT";
    pub const UUID: &str = "UUID";
    pub const UNIQUEIDENTIFIER: &str = "UNIQUEIDENTIFIER";
    pub const SYSNAME: &str = "SYSNAME";

    pub const DATE: &str = "DATE";
    pub const DATETIME: &str = "DATETIME";
    pub const SMALLDATETIME: &str = "SMALLDATETIME";
    pub const TIME: &str = "TIME";
    pub const TIMESTAMP: &str = "TIMESTAMP";
    pub const TIMESTAMPZ: &str = "TIMESTAMPZ";
    pub const YEAR: &str = "YEAR";

    pub const DECIMAL: &str = "DECIMAL";
    pub const NUMERIC: &str = "NUMERIC";
    pub const MONEY: &str = "MONEY";
    pub const SMALLMONEY: &str = "SMALLMONEY";
    pub const REAL: &str = "REAL";
    pub const FLOAT: &str = "FLOAT";
    pub const DOUBLE: &str = "DOUBLE";

    pub const BINARY: &str = "BINARY";
    pub const VARBINARY: &str = "VARBINARY";
    pub const TINYBLOB: &str = "TINYBLOB";
    pub const BLOB: &str = "BLOB";
    pub const MEDIUMBLOB: &str = "MEDIUMBLOB";
    pub const LONGBLOB: &str = "LONGBLOB";
    pub const BYTEA: &str = "BYTEA";

    pub const BOOL: &str = "BOOL";
    pub const BOOLEAN: &str = "BOOLEAN";

    pub const SERIAL: &str = "SERIAL";
    pub const BIGSERIAL: &str = "BIGSERIAL";

    pub const JSON: &str = "JSON";
    pub const JSONB: &str = "JSONB";

    pub const TEXT_TYPES: &[&str] = &[
        CHAR, VARCHAR, NCHAR, NVARCHAR, TINYTEXT, TEXT, NTEXT, CLOB, MEDIUMTEXT, LONGTEXT, UUID,
        UNIQUEIDENTIFIER, SYSNAME, ENUM, SET,
    ];

    pub const BLOB_TYPES: &[&str] = &[
        BINARY, VARBINARY, TINYBLOB, BLOB, MEDIUMBLOB, LONGBLOB, BYTEA,
    ];

    pub const NUMERIC_TYPES: &[&str] = &[
        BIT, TINYINT, SMALLINT, MEDIUMINT, INT, INTEGER, BIGINT, DECIMAL, NUMERIC, MONEY,
        SMALLMONEY, REAL, FLOAT, DOUBLE, SERIAL, BIGSERIAL, BOOL, BOOLEAN,
    ];

    pub const TIME_TYPES: &[&str] = &[
        DATE, DATETIME, SMALLDATETIME, TIME, TIMESTAMP, TIMESTAMPZ, YEAR,
    ];

    const OTHER_TYPES: &[&str] = &[JSON, JSONB];

    /// Check if a (case-insensitive) word names a known SQL type.
    pub fn is_known(word: &str) -> bool {
        let upper = word.to_ascii_uppercase();
        [TEXT_TYPES, BLOB_TYPES, NUMERIC_TYPES, TIME_TYPES, OTHER_TYPES]
            .iter()
            .any(|group| group.contains(&upper.as_str()))
    }
}

/// Declared value type of a descriptor field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    Bytes,
    DateTime,
    Date,
    Time,
    Decimal,
    Uuid,
    /// Nullable wrapper; maps like its inner type.
    Optional(Box<FieldType>),
    /// Sequence of values; byte lists map to BLOB, others to TEXT.
    List(Box<FieldType>),
    /// Key/value map, stored as TEXT.
    Map,
    /// Another entity, by type name. Only mappable with `extends` or `json`.
    Entity(String),
    /// Application type by name; needs a registered mapping.
    Custom(String),
}

impl FieldType {
    /// Strip `Optional` wrappers.
    pub fn inner(&self) -> &FieldType {
        match self {
            FieldType::Optional(inner) => inner.inner(),
            other => other,
        }
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self.inner(),
            FieldType::DateTime | FieldType::Date | FieldType::Time
        )
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self.inner(),
            FieldType::I8
                | FieldType::I16
                | FieldType::I32
                | FieldType::I64
                | FieldType::U8
                | FieldType::U16
                | FieldType::U32
                | FieldType::U64
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Optional(inner) => write!(f, "Option<{}>", inner),
            FieldType::List(inner) => write!(f, "Vec<{}>", inner),
            FieldType::Entity(name) | FieldType::Custom(name) => f.write_str(name),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Map a value type to its default SQL type.
///
/// Returns `None` for entities and custom types.
pub fn default_sql_type(field_type: &FieldType) -> Option<SqlType> {
    use names::*;

    let sql_type = match field_type.inner() {
        FieldType::Bool => SqlType::new(BOOL),
        FieldType::I8 | FieldType::I16 | FieldType::I32 => SqlType::new(INT),
        FieldType::U8 | FieldType::U16 | FieldType::U32 => SqlType::new(INT),
        FieldType::I64 | FieldType::U64 => SqlType::new(BIGINT),
        FieldType::F32 => SqlType::new(FLOAT),
        FieldType::F64 => SqlType::new(DOUBLE),
        FieldType::String => SqlType::with_length(VARCHAR, 255, 0),
        FieldType::Bytes => SqlType::new(BLOB),
        FieldType::DateTime => SqlType::new(DATETIME),
        FieldType::Date => SqlType::new(DATE),
        FieldType::Time => SqlType::new(TIME),
        FieldType::Decimal => SqlType::with_length(DECIMAL, 26, 8),
        FieldType::Uuid => SqlType::new(UUID),
        FieldType::List(elem) if matches!(elem.inner(), FieldType::U8) => SqlType::new(BLOB),
        FieldType::List(_) | FieldType::Map => SqlType::new(TEXT),
        FieldType::Entity(_) | FieldType::Custom(_) | FieldType::Optional(_) => return None,
    };
    Some(sql_type)
}
