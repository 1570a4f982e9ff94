//! Memoized table builds.
//!
//! Each type name owns a slot; concurrent first builds of the same type
//! block on the slot so the builder runs once and every caller receives the
//! same `Arc<Table>`. A failed build leaves the slot empty.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::debug;

use crate::core::schema::Table;
use crate::error::Result;

type Slot = Arc<OnceCell<Arc<Table>>>;

#[derive(Default)]
pub struct TableCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &str) -> Slot {
        self.slots.lock().entry(key.to_string()).or_default().clone()
    }

    /// Return the cached table for `key`, building it on first access.
    pub fn get_or_try_build<F>(&self, key: &str, build: F) -> Result<Arc<Table>>
    where
        F: FnOnce() -> Result<Table>,
    {
        let slot = self.slot(key);
        if let Some(table) = slot.get() {
            debug!("Table cache hit for {}", key);
            return Ok(table.clone());
        }
        slot.get_or_try_init(|| build().map(Arc::new)).cloned()
    }

    pub fn get(&self, key: &str) -> Option<Arc<Table>> {
        self.slots.lock().get(key).and_then(|slot| slot.get().cloned())
    }

    /// Drop the cached table for `key`.
    pub fn invalidate(&self, key: &str) {
        self.slots.lock().remove(key);
    }

    pub fn clear(&self) {
        self.slots.lock().clear();
    }

    /// Number of built tables.
    pub fn len(&self) -> usize {
        self.slots.lock().values().filter(|s| s.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for TableCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableCache").field("tables", &self.len()).finish()
    }
}
