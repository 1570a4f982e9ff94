//! Configuration loading and validation.
//!
//! ```yaml
//! database:
//!   dialect: mysql
//!   connection: "app:secret@tcp(localhost:3306)/shop?charset=utf8mb4"
//!   quote_policy: reserved
//!   store_engine: InnoDB
//! mapping:
//!   identifier: db
//!   table_mapper: snake
//!   column_mapper: gonic
//! ```

mod types;
mod validation;

pub use types::*;

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::cache::CacheManager;
use crate::core::catalog::DialectRegistry;
use crate::core::traits::{CreateTableOptions, Dialect};
use crate::error::Result;
use crate::tags::Parser;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Open the configured dialect and apply quoting and schema settings.
    pub fn open_dialect(&self, registry: &DialectRegistry) -> Result<Box<dyn Dialect>> {
        let db = &self.database;
        let mut dialect = registry.open(&db.dialect, &db.connection)?;
        dialect.set_quote_policy(db.quote_policy);
        if let Some(schema) = &db.schema {
            dialect.set_schema(schema);
        }
        debug!(
            "Configured {} dialect (quote policy {:?})",
            dialect.db_type(),
            db.quote_policy
        );
        Ok(dialect)
    }

    /// Build a parser with the configured identifier and naming conventions.
    pub fn build_parser(&self, cache_manager: Arc<dyn CacheManager>) -> Parser {
        let mapping = &self.mapping;
        Parser::new(
            mapping.identifier.clone(),
            mapping.table_mapper.mapper(),
            mapping.column_mapper.mapper(),
            cache_manager,
        )
    }

    /// CREATE TABLE options from the engine and charset settings.
    pub fn create_table_options(&self) -> CreateTableOptions {
        CreateTableOptions {
            table_name: None,
            store_engine: self.database.store_engine.clone(),
            charset: self.database.charset.clone(),
        }
    }
}
