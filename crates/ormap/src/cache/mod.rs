//! Cache-manager collaborator.
//!
//! The parser only decides *whether* a table gets a cacher (`cache` and
//! `nocache` annotations); storage and eviction belong to the session layer.
//! [`MemoryCacheManager`] keeps the registrations in memory.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Cacher settings for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cacher {
    pub table: String,

    /// Maximum number of cached rows.
    pub max_entries: usize,

    /// Entry lifetime.
    pub expire: Duration,
}

impl Cacher {
    pub const DEFAULT_MAX_ENTRIES: usize = 10_000;
    pub const DEFAULT_EXPIRE: Duration = Duration::from_secs(3600);

    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            max_entries: Self::DEFAULT_MAX_ENTRIES,
            expire: Self::DEFAULT_EXPIRE,
        }
    }
}

/// Per-table cacher registration.
pub trait CacheManager: Send + Sync {
    /// Register a cacher for the table, replacing any existing one.
    fn register_cacher(&self, table: &str);

    /// Remove the table's cacher, if any.
    fn unregister_cacher(&self, table: &str);

    /// The table's cacher, if registered.
    fn get_cacher(&self, table: &str) -> Option<Arc<Cacher>>;
}

/// In-memory [`CacheManager`].
///
/// When a default cacher template is set, registrations copy its limits.
#[derive(Debug, Default)]
pub struct MemoryCacheManager {
    default: Option<Cacher>,
    cachers: RwLock<HashMap<String, Arc<Cacher>>>,
}

impl MemoryCacheManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `template`'s limits for every registered table.
    pub fn with_default(template: Cacher) -> Self {
        Self {
            default: Some(template),
            cachers: RwLock::new(HashMap::new()),
        }
    }

    /// Registered table names, sorted.
    pub fn tables(&self) -> Vec<String> {
        let mut tables: Vec<String> = self.cachers.read().keys().cloned().collect();
        tables.sort_unstable();
        tables
    }
}

impl CacheManager for MemoryCacheManager {
    fn register_cacher(&self, table: &str) {
        let cacher = match &self.default {
            Some(template) => Cacher {
                table: table.to_string(),
                ..template.clone()
            },
            None => Cacher::new(table),
        };
        debug!("Registered cacher for table '{}'", table);
        self.cachers.write().insert(table.to_string(), Arc::new(cacher));
    }

    fn unregister_cacher(&self, table: &str) {
        if self.cachers.write().remove(table).is_some() {
            debug!("Removed cacher for table '{}'", table);
        }
    }

    fn get_cacher(&self, table: &str) -> Option<Arc<Cacher>> {
        self.cachers.read().get(table).cloned()
    }
}
