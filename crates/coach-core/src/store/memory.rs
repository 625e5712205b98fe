use super::{LoadedTables, PersistentStore, decode_all};
use crate::error::{CoachError, Result};
use crate::tables::{TableKind, Tables};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct Inner {
    texts: HashMap<TableKind, String>,
    writes: HashMap<TableKind, usize>,
    fail_writes: bool,
}

/// A [`PersistentStore`] that keeps serialized tables in memory.
///
/// Clones share the same storage, so a handle kept by a test observes the
/// writes made through the clone owned by a cache. Survives cache drops, which
/// makes it usable for simulated reloads.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the stored text of a table.
    pub fn with_text(self, kind: TableKind, text: impl Into<String>) -> Self {
        self.lock().texts.insert(kind, text.into());
        self
    }

    /// Returns the stored text of a table, if it was ever written.
    pub fn text(&self, kind: TableKind) -> Option<String> {
        self.lock().texts.get(&kind).cloned()
    }

    /// Number of successful writes of a table.
    pub fn write_count(&self, kind: TableKind) -> usize {
        self.lock().writes.get(&kind).copied().unwrap_or(0)
    }

    /// Makes every subsequent write fail until switched off again.
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PersistentStore for MemoryStore {
    fn load_all(&self) -> LoadedTables {
        let inner = self.lock();
        decode_all(|kind| Ok(inner.texts.get(&kind).cloned()))
    }

    fn write_table(&mut self, kind: TableKind, tables: &Tables) -> Result<()> {
        let text = tables.encode(kind)?;
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(CoachError::data_access(format!(
                "write of '{}' rejected",
                kind
            )));
        }
        inner.texts.insert(kind, text);
        *inner.writes.entry(kind).or_insert(0) += 1;
        Ok(())
    }
}
