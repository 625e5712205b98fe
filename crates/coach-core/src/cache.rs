//! In-memory mirror of the persisted tables.
//!
//! `SessionCache` is the only component that talks to a [`PersistentStore`].
//! Reads are served from memory; every write updates memory first and then
//! persists the whole affected table.

use crate::error::Result;
use crate::language::Language;
use crate::store::PersistentStore;
use crate::tables::{TableKind, Tables};
use crate::transcript::Transcript;

/// Hydration state of a [`SessionCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Uninitialized,
    Hydrated,
}

pub struct SessionCache<S: PersistentStore> {
    store: S,
    tables: Tables,
    state: CacheState,
    fallback_language: Language,
    corrupted: Vec<TableKind>,
}

impl<S: PersistentStore> SessionCache<S> {
    /// Creates an uninitialized cache over `store`.
    pub fn new(store: S, fallback_language: Language) -> Self {
        Self {
            store,
            tables: Tables::default(),
            state: CacheState::Uninitialized,
            fallback_language,
            corrupted: Vec::new(),
        }
    }

    /// Loads all tables from the store.
    ///
    /// Only the first call reads the store; later calls are no-ops so that
    /// in-memory writes are never clobbered by a re-read.
    pub fn hydrate(&mut self) {
        if self.state == CacheState::Hydrated {
            tracing::debug!("[SessionCache] Already hydrated, skipping");
            return;
        }

        let loaded = self.store.load_all();
        self.tables = loaded.tables;
        self.corrupted = loaded.corrupted;
        self.state = CacheState::Hydrated;

        tracing::info!(
            "[SessionCache] Hydrated: {} problem(s) with code, {} transcript(s), {} language preference(s)",
            self.tables.code.len(),
            self.tables.chat.len(),
            self.tables.language.len()
        );
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    /// Tables that were reset during hydration because their stored text was corrupt.
    pub fn corrupted_tables(&self) -> &[TableKind] {
        &self.corrupted
    }

    // ============================================================================
    // Reads
    // ============================================================================

    /// Returns the stored code for a slot, if any edit was ever committed to it.
    pub fn stored_code(&self, problem_id: &str, language: &Language) -> Option<&str> {
        self.tables
            .code
            .get(problem_id)
            .and_then(|slots| slots.get(language))
            .map(String::as_str)
    }

    /// Code for a slot, or the language's starter template when the slot is empty.
    pub fn get_code(&self, problem_id: &str, language: &Language) -> String {
        self.stored_code(problem_id, language)
            .unwrap_or_else(|| language.starter_template())
            .to_string()
    }

    /// Transcript for a problem, or the opening transcript on first visit.
    pub fn get_chat(&self, problem_id: &str) -> Transcript {
        self.tables
            .chat
            .get(problem_id)
            .cloned()
            .unwrap_or_else(Transcript::opening)
    }

    /// Last language chosen for a problem, or the fallback language.
    pub fn get_language(&self, problem_id: &str) -> Language {
        self.tables
            .language
            .get(problem_id)
            .cloned()
            .unwrap_or_else(|| self.fallback_language.clone())
    }

    // ============================================================================
    // Writes
    // ============================================================================

    /// Records code for a slot and persists the code table.
    ///
    /// The in-memory value is updated even when persisting fails.
    pub fn set_code(&mut self, problem_id: &str, language: &Language, code: String) -> Result<()> {
        self.tables
            .code
            .entry(problem_id.to_string())
            .or_default()
            .insert(language.clone(), code);
        self.persist(TableKind::Code)
    }

    /// Records a problem's transcript and persists the chat table.
    ///
    /// Empty transcripts are kept in memory only.
    pub fn set_chat(&mut self, problem_id: &str, transcript: Transcript) -> Result<()> {
        let is_empty = transcript.is_empty();
        self.tables.chat.insert(problem_id.to_string(), transcript);
        if is_empty {
            return Ok(());
        }
        self.persist(TableKind::Chat)
    }

    /// Records a problem's language preference and persists the language table.
    pub fn set_language(&mut self, problem_id: &str, language: &Language) -> Result<()> {
        self.tables
            .language
            .insert(problem_id.to_string(), language.clone());
        self.persist(TableKind::Language)
    }

    fn persist(&mut self, kind: TableKind) -> Result<()> {
        self.store.write_table(kind, &self.tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::transcript::Turn;

    fn hydrated(store: &MemoryStore) -> SessionCache<MemoryStore> {
        let mut cache = SessionCache::new(store.clone(), Language::default());
        cache.hydrate();
        cache
    }

    #[test]
    fn test_defaults_when_absent() {
        let cache = hydrated(&MemoryStore::new());
        let python = Language::new("python");

        assert_eq!(cache.get_code("two-sum", &python), python.starter_template());
        assert_eq!(cache.get_chat("two-sum"), Transcript::opening());
        assert_eq!(cache.get_language("two-sum"), Language::default());
        assert!(cache.stored_code("two-sum", &python).is_none());
    }

    #[test]
    fn test_read_after_write() {
        let store = MemoryStore::new();
        let mut cache = hydrated(&store);
        let python = Language::new("python");

        cache
            .set_code("two-sum", &python, "print(1)".to_string())
            .unwrap();
        assert_eq!(cache.get_code("two-sum", &python), "print(1)");
        assert_eq!(store.write_count(TableKind::Code), 1);
    }

    #[test]
    fn test_isolation_between_problems() {
        let mut cache = hydrated(&MemoryStore::new());
        let python = Language::new("python");

        cache
            .set_code("reverse-string", &python, "s[::-1]".to_string())
            .unwrap();
        cache
            .set_code("two-sum", &python, "two".to_string())
            .unwrap();

        assert_eq!(cache.get_code("reverse-string", &python), "s[::-1]");
        assert_eq!(cache.get_code("two-sum", &python), "two");
    }

    #[test]
    fn test_hydrate_happens_once() {
        let store = MemoryStore::new();
        let mut cache = hydrated(&store);
        cache
            .set_language("two-sum", &Language::new("rust"))
            .unwrap();

        // Another writer changes the store behind the cache's back
        let mut other = store.clone();
        other.write_table(TableKind::Language, &Tables::default()).unwrap();

        cache.hydrate();
        assert_eq!(cache.get_language("two-sum"), Language::new("rust"));
        assert_eq!(cache.state(), CacheState::Hydrated);
    }

    #[test]
    fn test_write_failure_keeps_memory_authoritative() {
        let store = MemoryStore::new();
        let mut cache = hydrated(&store);
        store.set_fail_writes(true);

        let result = cache.set_chat("two-sum", Transcript::from_turns(vec![Turn::user("hi")]));

        assert!(result.is_err());
        assert_eq!(cache.get_chat("two-sum").len(), 1);
        assert!(store.text(TableKind::Chat).is_none());
    }

    #[test]
    fn test_empty_transcript_is_not_persisted() {
        let store = MemoryStore::new();
        let mut cache = hydrated(&store);
        cache.set_chat("two-sum", Transcript::default()).unwrap();
        assert_eq!(store.write_count(TableKind::Chat), 0);
    }

    #[test]
    fn test_reports_corrupted_tables() {
        let store = MemoryStore::new().with_text(TableKind::Code, "oops");
        let cache = hydrated(&store);
        assert_eq!(cache.corrupted_tables(), &[TableKind::Code]);
    }
}
