use crate::language::Language;
use crate::problem::Problem;
use crate::transcript::Transcript;

/// In-memory state of the currently displayed problem/language pair.
///
/// Owned by the `SessionController`; callers only ever see it through shared
/// references, so every mutation goes through the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub(super) problem: Problem,
    pub(super) language: Language,
    pub(super) code: String,
    pub(super) transcript: Transcript,
    /// Generation of the armed debounce ticket, if the live code is not yet committed.
    pub(super) pending: Option<u64>,
}

impl ActiveSession {
    pub(super) fn new(
        problem: Problem,
        language: Language,
        code: String,
        transcript: Transcript,
    ) -> Self {
        Self {
            problem,
            language,
            code,
            transcript,
            pending: None,
        }
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn problem_id(&self) -> &str {
        &self.problem.id
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn has_pending_write(&self) -> bool {
        self.pending.is_some()
    }
}
