//! The three persisted tables and their text codec.
//!
//! Each table is serialized as a whole; stores never write individual rows.

use crate::error::Result;
use crate::language::Language;
use crate::transcript::Transcript;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Code buffers, `problemId → language → code`.
pub type CodeTable = BTreeMap<String, BTreeMap<Language, String>>;
/// Transcripts, `problemId → transcript`.
pub type ChatTable = BTreeMap<String, Transcript>;
/// Language preferences, `problemId → language`.
pub type LanguageTable = BTreeMap<String, Language>;

/// Identifies one logical table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableKind {
    Code,
    Chat,
    Language,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [TableKind::Code, TableKind::Chat, TableKind::Language];

    /// Storage key of the table.
    pub fn key(self) -> &'static str {
        match self {
            TableKind::Code => "code-by-key",
            TableKind::Chat => "chat-by-problem",
            TableKind::Language => "language-by-problem",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// In-memory form of all persisted tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tables {
    pub code: CodeTable,
    pub chat: ChatTable,
    pub language: LanguageTable,
}

/// Accepted on-disk shapes of the code table.
#[derive(Deserialize)]
#[serde(untagged)]
enum CodeTableRepr {
    Nested(BTreeMap<String, BTreeMap<String, String>>),
    /// `"problemId-language" → code`, as written by older clients.
    Flat(BTreeMap<String, String>),
}

impl Tables {
    /// Serializes one table to text.
    pub fn encode(&self, kind: TableKind) -> Result<String> {
        let text = match kind {
            TableKind::Code => serde_json::to_string_pretty(&self.code)?,
            TableKind::Chat => serde_json::to_string_pretty(&self.chat)?,
            TableKind::Language => serde_json::to_string_pretty(&self.language)?,
        };
        Ok(text)
    }

    /// Replaces one table with the contents parsed from `text`.
    ///
    /// Blank text decodes to an empty table. On error the table is left untouched.
    pub fn decode(&mut self, kind: TableKind, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            self.reset(kind);
            return Ok(());
        }

        match kind {
            TableKind::Code => {
                let repr: CodeTableRepr = serde_json::from_str(text)?;
                self.code = match repr {
                    CodeTableRepr::Nested(nested) => nested
                        .into_iter()
                        .map(|(problem_id, slots)| {
                            let slots = slots
                                .into_iter()
                                .map(|(language, code)| (Language::new(language), code))
                                .collect();
                            (problem_id, slots)
                        })
                        .collect(),
                    CodeTableRepr::Flat(flat) => code_table_from_flat(flat),
                };
            }
            TableKind::Chat => {
                self.chat = serde_json::from_str(text)?;
            }
            TableKind::Language => {
                let raw: BTreeMap<String, String> = serde_json::from_str(text)?;
                self.language = raw
                    .into_iter()
                    .map(|(problem_id, language)| (problem_id, Language::new(language)))
                    .collect();
            }
        }
        Ok(())
    }

    /// Empties one table.
    pub fn reset(&mut self, kind: TableKind) {
        match kind {
            TableKind::Code => self.code.clear(),
            TableKind::Chat => self.chat.clear(),
            TableKind::Language => self.language.clear(),
        }
    }
}

fn code_table_from_flat(flat: BTreeMap<String, String>) -> CodeTable {
    let mut table = CodeTable::new();
    for (key, code) in flat {
        match split_legacy_key(&key) {
            Some((problem_id, language)) => {
                table
                    .entry(problem_id.to_string())
                    .or_default()
                    .insert(Language::new(language), code);
            }
            None => {
                tracing::warn!("[Tables] Dropping code slot with unsplittable key '{}'", key);
            }
        }
    }
    table
}

/// Splits a legacy `problemId-language` key.
///
/// Problem ids usually contain `-` themselves, so the longest known language
/// suffix wins; unknown languages fall back to the last separator.
fn split_legacy_key(key: &str) -> Option<(&str, &str)> {
    let known = Language::known()
        .filter_map(|language| {
            let problem_id = key.strip_suffix(language)?.strip_suffix('-')?;
            (!problem_id.is_empty()).then_some((problem_id, language))
        })
        .max_by_key(|(_, language)| language.len());

    if let Some((problem_id, language)) = known {
        let language_start = key.len() - language.len();
        return Some((problem_id, &key[language_start..]));
    }

    let (problem_id, language) = key.rsplit_once('-')?;
    if problem_id.is_empty() || language.is_empty() {
        return None;
    }
    Some((problem_id, language))
}
