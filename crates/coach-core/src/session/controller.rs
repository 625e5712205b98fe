use super::active::ActiveSession;
use crate::cache::SessionCache;
use crate::error::{CoachError, Result};
use crate::language::Language;
use crate::problem::ProblemCatalog;
use crate::skill::SkillLevel;
use crate::store::PersistentStore;
use crate::transcript::{Transcript, Turn};
use std::time::Duration;

/// Quiet period after the last edit before the code is committed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Lifecycle phase of the controller.
///
/// `Flushing` and `Loading` are only entered for the duration of a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Loading,
    Active,
    Flushing,
}

/// Tunables of a [`SessionController`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub debounce: Duration,
    pub fallback_language: Language,
    /// Level sent along with mentor requests.
    pub skill_level: SkillLevel,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            fallback_language: Language::default(),
            skill_level: SkillLevel::default(),
        }
    }
}

/// Handle for one armed debounce timer.
///
/// The scheduler waits `delay` and hands the ticket back through
/// [`SessionController::on_debounce_elapsed`]. Only the most recent ticket
/// commits anything; older ones are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTicket {
    generation: u64,
    delay: Duration,
}

impl DebounceTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Orchestrates the active problem, its live buffers and their persistence.
///
/// `SessionController` is responsible for:
/// - Switching the active problem, flushing the outgoing code first
/// - Coalescing edits into one debounced write per burst
/// - Persisting language choices and transcript turns immediately
/// - Flushing pending code on teardown
///
/// Storage failures are logged and absorbed; the in-memory state stays
/// authoritative for the rest of the session.
pub struct SessionController<S: PersistentStore> {
    cache: SessionCache<S>,
    catalog: ProblemCatalog,
    debounce: Duration,
    skill_level: SkillLevel,
    phase: SessionPhase,
    active: Option<ActiveSession>,
    next_generation: u64,
}

impl<S: PersistentStore> SessionController<S> {
    /// Creates a controller and hydrates its cache from `store`.
    pub fn new(store: S, catalog: ProblemCatalog, settings: SessionSettings) -> Self {
        let mut cache = SessionCache::new(store, settings.fallback_language);
        cache.hydrate();
        Self {
            cache,
            catalog,
            debounce: settings.debounce,
            skill_level: settings.skill_level,
            phase: SessionPhase::Idle,
            active: None,
            next_generation: 0,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    pub fn catalog(&self) -> &ProblemCatalog {
        &self.catalog
    }

    pub fn cache(&self) -> &SessionCache<S> {
        &self.cache
    }

    pub fn debounce_window(&self) -> Duration {
        self.debounce
    }

    pub fn skill_level(&self) -> SkillLevel {
        self.skill_level
    }

    pub fn set_skill_level(&mut self, level: SkillLevel) {
        tracing::debug!(
            "[SessionController] Skill level {} -> {}",
            self.skill_level,
            level
        );
        self.skill_level = level;
    }

    /// Makes `problem_id` the active problem.
    ///
    /// Pending code of the outgoing session is committed before anything is
    /// read for the incoming one. Unknown ids open the first catalog entry.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` only when the catalog is empty.
    pub fn switch_to(&mut self, problem_id: &str) -> Result<&ActiveSession> {
        let problem = self
            .catalog
            .resolve(problem_id)
            .cloned()
            .ok_or_else(|| CoachError::not_found("problem", problem_id))?;

        if self.has_pending_write() {
            self.transition(SessionPhase::Flushing);
            self.flush();
        }

        self.transition(SessionPhase::Loading);
        let language = self.cache.get_language(&problem.id);
        let code = self.cache.get_code(&problem.id, &language);
        let transcript = self.cache.get_chat(&problem.id);

        tracing::info!(
            "[SessionController] Switched to '{}' ({})",
            problem.id,
            language
        );

        self.transition(SessionPhase::Active);
        let session = self
            .active
            .insert(ActiveSession::new(problem, language, code, transcript));
        Ok(&*session)
    }

    /// Replaces the live buffer and arms the debounce timer.
    ///
    /// The returned ticket supersedes every ticket issued before it.
    pub fn on_code_change(&mut self, text: impl Into<String>) -> Result<DebounceTicket> {
        let generation = self.next_generation + 1;
        let active = self.active.as_mut().ok_or(CoachError::NoActiveSession)?;

        active.code = text.into();
        active.pending = Some(generation);
        self.next_generation = generation;

        Ok(DebounceTicket {
            generation,
            delay: self.debounce,
        })
    }

    /// Commits the live buffer if `ticket` is still the current one.
    ///
    /// Returns true when a write was committed.
    pub fn on_debounce_elapsed(&mut self, ticket: DebounceTicket) -> bool {
        let is_current = self
            .active
            .as_ref()
            .is_some_and(|active| active.pending == Some(ticket.generation));

        if !is_current {
            tracing::debug!(
                "[SessionController] Ignoring superseded debounce ticket {}",
                ticket.generation
            );
            return false;
        }
        self.flush()
    }

    /// Commits any pending code write immediately.
    ///
    /// Returns true when there was something to commit.
    pub fn flush(&mut self) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        if active.pending.take().is_none() {
            return false;
        }

        let result = self
            .cache
            .set_code(&active.problem.id, &active.language, active.code.clone());
        log_persist_failure(result, "code");
        true
    }

    /// Switches the active problem to another language.
    ///
    /// Pending code for the old language is flushed first, the new language
    /// becomes the problem's preference and its slot (or starter template)
    /// becomes the live buffer.
    pub fn on_language_change(&mut self, language: impl Into<Language>) -> Result<&ActiveSession> {
        let language = language.into();
        if self.active.is_none() {
            return Err(CoachError::NoActiveSession);
        }

        self.flush();

        let active = self.active.as_mut().ok_or(CoachError::NoActiveSession)?;
        log_persist_failure(
            self.cache.set_language(&active.problem.id, &language),
            "language",
        );
        active.code = self.cache.get_code(&active.problem.id, &language);
        tracing::debug!(
            "[SessionController] '{}' language {} -> {}",
            active.problem.id,
            active.language,
            language
        );
        active.language = language;

        Ok(&*active)
    }

    /// Appends a turn to the live transcript and persists the transcript.
    pub fn on_chat_append(&mut self, turn: Turn) -> Result<()> {
        let active = self.active.as_mut().ok_or(CoachError::NoActiveSession)?;
        active.transcript.push(turn);
        log_persist_failure(
            self.cache
                .set_chat(&active.problem.id, active.transcript.clone()),
            "chat",
        );
        Ok(())
    }

    /// Appends a turn to the transcript of `problem_id`, active or not.
    ///
    /// Used for replies that arrive after the user has moved to another problem.
    pub fn append_turn_for(&mut self, problem_id: &str, turn: Turn) -> Result<()> {
        let is_active = self
            .active
            .as_ref()
            .is_some_and(|active| active.problem.id == problem_id);
        if is_active {
            return self.on_chat_append(turn);
        }

        let mut transcript = self.cache.get_chat(problem_id);
        transcript.push(turn);
        log_persist_failure(self.cache.set_chat(problem_id, transcript), "chat");
        Ok(())
    }

    /// Resets the live transcript to its opening state and persists it.
    pub fn clear_chat(&mut self) -> Result<()> {
        let active = self.active.as_mut().ok_or(CoachError::NoActiveSession)?;
        active.transcript = Transcript::opening();
        log_persist_failure(
            self.cache
                .set_chat(&active.problem.id, active.transcript.clone()),
            "chat",
        );
        Ok(())
    }

    /// Resets the live buffer to the language's starter template and persists it.
    ///
    /// Any pending debounced write is discarded since the reset supersedes it.
    pub fn clear_code(&mut self) -> Result<()> {
        let active = self.active.as_mut().ok_or(CoachError::NoActiveSession)?;
        active.pending = None;
        active.code = active.language.starter_template().to_string();
        log_persist_failure(
            self.cache
                .set_code(&active.problem.id, &active.language, active.code.clone()),
            "code",
        );
        Ok(())
    }

    /// Flushes pending code and drops the active session.
    pub fn teardown(&mut self) {
        self.flush();
        if let Some(active) = self.active.take() {
            tracing::info!("[SessionController] Closed '{}'", active.problem.id);
        }
        self.transition(SessionPhase::Idle);
    }

    fn has_pending_write(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(ActiveSession::has_pending_write)
    }

    fn transition(&mut self, next: SessionPhase) {
        tracing::debug!("[SessionController] {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}

impl<S: PersistentStore> Drop for SessionController<S> {
    fn drop(&mut self) {
        if self.flush() {
            tracing::debug!("[SessionController] Flushed pending code on drop");
        }
    }
}

fn log_persist_failure(result: Result<()>, table: &str) {
    if let Err(e) = result {
        tracing::warn!(
            "[SessionController] Failed to persist {} (keeping in-memory state): {}",
            table,
            e
        );
    }
}
