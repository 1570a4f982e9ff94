//! Configuration validation.

use super::Config;
use crate::error::{MapError, Result};

fn has_whitespace(s: &str) -> bool {
    s.chars().any(char::is_whitespace)
}

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    let database = &config.database;
    if database.dialect.trim().is_empty() {
        return Err(MapError::Config("database.dialect is required".into()));
    }
    if database.connection.trim().is_empty() {
        return Err(MapError::Config("database.connection is required".into()));
    }
    if let Some(schema) = &database.schema {
        if schema.is_empty() || has_whitespace(schema) {
            return Err(MapError::Config(format!(
                "database.schema must be a non-empty name, got '{}'",
                schema
            )));
        }
    }
    if let Some(engine) = &database.store_engine {
        if engine.is_empty() || has_whitespace(engine) {
            return Err(MapError::Config(format!(
                "database.store_engine must be a single word, got '{}'",
                engine
            )));
        }
    }

    let identifier = &config.mapping.identifier;
    if identifier.is_empty() || has_whitespace(identifier) {
        return Err(MapError::Config(format!(
            "mapping.identifier must be a non-empty word, got '{}'",
            identifier
        )));
    }

    Ok(())
}
