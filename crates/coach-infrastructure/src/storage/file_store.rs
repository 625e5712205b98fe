//! File-backed persistent store.

use super::atomic_file::AtomicTextFile;
use coach_core::error::Result;
use coach_core::store::{LoadedTables, PersistentStore, decode_all};
use coach_core::tables::{TableKind, Tables};
use std::fs;
use std::path::{Path, PathBuf};

/// Stores each table as a JSON file inside one directory.
///
/// ```text
/// <dir>/
/// ├── code-by-key.json
/// ├── chat-by-problem.json
/// └── language-by-problem.json
/// ```
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (and creates if needed) a store rooted at `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `kind`.
    pub fn table_path(&self, kind: TableKind) -> PathBuf {
        self.dir.join(format!("{}.json", kind.key()))
    }

    fn file(&self, kind: TableKind) -> AtomicTextFile {
        AtomicTextFile::new(self.table_path(kind))
    }
}

impl PersistentStore for FileStore {
    fn load_all(&self) -> LoadedTables {
        let loaded = decode_all(|kind| Ok(self.file(kind).load()?));
        tracing::debug!(
            "[FileStore] Loaded tables from {:?} ({} corrupted)",
            self.dir,
            loaded.corrupted.len()
        );
        loaded
    }

    fn write_table(&mut self, kind: TableKind, tables: &Tables) -> Result<()> {
        let text = tables.encode(kind)?;
        self.file(kind).save(&text)?;
        tracing::debug!("[FileStore] Wrote table '{}'", kind);
        Ok(())
    }
}
