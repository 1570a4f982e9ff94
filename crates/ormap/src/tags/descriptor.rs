//! Entity descriptors: the fields of a type and their annotations.
//!
//! Descriptors are built in code or deserialized from JSON/YAML. Each field
//! carries annotations keyed by identifier (`orm`, `db`, ...); the parser
//! reads only the one matching its configured identifier.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::typemap::FieldType;

/// Default annotation identifier.
pub const DEFAULT_IDENTIFIER: &str = "orm";

fn default_visible() -> bool {
    true
}

/// One field of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Annotation strings by identifier.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub annotations: IndexMap<String, String>,

    /// Private fields are never mapped, even when annotated.
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            annotations: IndexMap::new(),
            visible: true,
        }
    }

    /// Attach an annotation under `identifier`.
    pub fn tag(mut self, identifier: impl Into<String>, annotation: impl Into<String>) -> Self {
        self.annotations.insert(identifier.into(), annotation.into());
        self
    }

    /// Mark the field private.
    pub fn private(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn annotation(&self, identifier: &str) -> Option<&str> {
        self.annotations.get(identifier).map(String::as_str)
    }
}

/// A mappable type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    /// Type name; also the memoization key.
    pub type_name: String,

    /// Explicit table name, bypassing the table name mapper.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,

    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl EntityDescriptor {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            table_name: None,
            fields: Vec::new(),
        }
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Types that describe themselves.
pub trait Entity {
    fn descriptor() -> EntityDescriptor;
}
