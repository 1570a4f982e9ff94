//! Error types for schema mapping and dialect operations.

use thiserror::Error;

/// Main error type for the mapping library.
#[derive(Error, Debug)]
pub enum MapError {
    /// Annotation string could not be tokenized (unbalanced parenthesis, bad quoting).
    #[error("Malformed annotation {annotation:?}: {message}")]
    MalformedAnnotation { annotation: String, message: String },

    /// Mutually exclusive annotation tokens on one column.
    #[error("Conflicting annotation on {field}: {message}")]
    ConflictingAnnotation { field: String, message: String },

    /// A field's value type has no SQL mapping and no explicit SQL type override.
    #[error("No SQL type mapping for field {field} of type {value_type}")]
    UnknownSqlType { field: String, value_type: String },

    /// An entity embeds itself, directly or through other entities.
    #[error("Cyclic embedding detected: {0}")]
    CyclicEmbedding(String),

    /// Entity referenced by an embedded field was never registered with the parser.
    #[error("Unknown entity type: {0}")]
    UnknownEntity(String),

    /// Connection string could not be parsed for the dialect.
    #[error("Invalid connection string for {dialect}: {message}")]
    InvalidConnectionString { dialect: String, message: String },

    /// No dialect registered under the key.
    #[error("Unknown database dialect: {0}")]
    UnknownDialect(String),

    /// A dialect is already registered under the key.
    #[error("Dialect already registered: {0}")]
    DuplicateDialect(String),

    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MapError {
    /// Create a MalformedAnnotation error.
    pub fn malformed(annotation: impl Into<String>, message: impl Into<String>) -> Self {
        MapError::MalformedAnnotation {
            annotation: annotation.into(),
            message: message.into(),
        }
    }

    /// Create a ConflictingAnnotation error for a field.
    pub fn conflict(field: impl Into<String>, message: impl Into<String>) -> Self {
        MapError::ConflictingAnnotation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an UnknownSqlType error.
    pub fn unknown_type(field: impl Into<String>, value_type: impl Into<String>) -> Self {
        MapError::UnknownSqlType {
            field: field.into(),
            value_type: value_type.into(),
        }
    }

    /// Create an InvalidConnectionString error.
    pub fn connection(dialect: impl Into<String>, message: impl Into<String>) -> Self {
        MapError::InvalidConnectionString {
            dialect: dialect.into(),
            message: message.into(),
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for mapping operations.
pub type Result<T> = std::result::Result<T, MapError>;
