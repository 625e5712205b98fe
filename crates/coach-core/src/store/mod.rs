//! Persistent store abstraction.
//!
//! A store keeps the serialized text of each table under its own key. Loading
//! never fails: a table that cannot be read or parsed comes back empty and is
//! reported in [`LoadedTables::corrupted`].

mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use crate::tables::{TableKind, Tables};

/// Result of hydrating all tables from a store.
#[derive(Debug, Clone, Default)]
pub struct LoadedTables {
    pub tables: Tables,
    /// Tables that were reset to empty because their stored text was unusable.
    pub corrupted: Vec<TableKind>,
}

/// Durable key-value storage for the three session tables.
pub trait PersistentStore: Send {
    /// Loads every table, resetting unreadable ones to empty.
    fn load_all(&self) -> LoadedTables;

    /// Overwrites the stored representation of `kind` with the whole table from `tables`.
    fn write_table(&mut self, kind: TableKind, tables: &Tables) -> Result<()>;
}

/// Builds [`LoadedTables`] from a per-table text reader.
///
/// `read` returns `Ok(None)` for a table that has never been written.
pub fn decode_all<F>(mut read: F) -> LoadedTables
where
    F: FnMut(TableKind) -> Result<Option<String>>,
{
    let mut loaded = LoadedTables::default();

    for kind in TableKind::ALL {
        let outcome = read(kind).and_then(|text| match text {
            Some(text) => loaded.tables.decode(kind, &text),
            None => Ok(()),
        });

        if let Err(e) = outcome {
            tracing::warn!("[Store] Table '{}' is unreadable, resetting to empty: {}", kind, e);
            loaded.tables.reset(kind);
            loaded.corrupted.push(kind);
        }
    }

    loaded
}
