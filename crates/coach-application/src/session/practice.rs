//! PracticeSession - async driver of a [`SessionController`].
//!
//! Owns the controller behind one `tokio::sync::Mutex`, runs the debounce
//! timer as a cancellable task and routes mentor requests through a
//! [`BackendGateway`].

use crate::verdict::SubmissionVerdict;
use anyhow::{Context, Result};
use coach_core::error::CoachError;
use coach_core::gateway::{BackendGateway, GatewayAction, GatewayRequest, reply_turn};
use coach_core::language::Language;
use coach_core::problem::ProblemCatalog;
use coach_core::session::{ActiveSession, DebounceTicket, SessionController, SessionSettings};
use coach_core::skill::SkillLevel;
use coach_core::store::PersistentStore;
use coach_core::transcript::Turn;
use coach_infrastructure::{CoachConfig, FileStore};
use coach_interaction::HttpBackendGateway;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Result of one mentor request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentorReply {
    /// Problem the reply was recorded on.
    pub problem_id: String,
    /// The assistant turn appended to that problem's transcript.
    pub turn: Turn,
    /// Parsed judge verdict, for successful `submit` requests.
    pub verdict: Option<SubmissionVerdict>,
}

struct Inner<S: PersistentStore> {
    controller: SessionController<S>,
    timer: Option<CancellationToken>,
}

impl<S: PersistentStore> Inner<S> {
    fn cancel_timer(&mut self) {
        if let Some(token) = self.timer.take() {
            token.cancel();
        }
    }
}

/// Async facade over the session controller.
///
/// # Thread Safety
///
/// All controller operations are serialized by a single mutex. The lock is
/// never held across a gateway call, so edits and switches proceed while a
/// mentor request is in flight.
pub struct PracticeSession<S: PersistentStore + 'static> {
    inner: Arc<Mutex<Inner<S>>>,
    gateway: Arc<dyn BackendGateway>,
}

impl<S: PersistentStore + 'static> PracticeSession<S> {
    /// Creates a session over `store`, hydrating its cache.
    pub fn new(
        store: S,
        catalog: ProblemCatalog,
        settings: SessionSettings,
        gateway: Arc<dyn BackendGateway>,
    ) -> Self {
        let controller = SessionController::new(store, catalog, settings);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                controller,
                timer: None,
            })),
            gateway,
        }
    }

    /// Snapshot of the active session, if any.
    pub async fn active(&self) -> Option<ActiveSession> {
        self.inner.lock().await.controller.active().cloned()
    }

    /// Opens `problem_id`, committing any pending edit of the current problem first.
    pub async fn open(&self, problem_id: &str) -> Result<ActiveSession> {
        let mut inner = self.inner.lock().await;
        inner.cancel_timer();
        let active = inner.controller.switch_to(problem_id)?;
        Ok(active.clone())
    }

    /// Records an edit of the live buffer and re-arms the debounce timer.
    pub async fn edit(&self, text: impl Into<String>) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let ticket = inner.controller.on_code_change(text)?;
        inner.cancel_timer();
        inner.timer = Some(self.spawn_debounce(ticket));
        Ok(())
    }

    /// Commits any pending edit now.
    pub async fn flush(&self) -> bool {
        let mut inner = self.inner.lock().await;
        inner.cancel_timer();
        inner.controller.flush()
    }

    pub async fn change_language(&self, language: impl Into<Language>) -> Result<ActiveSession> {
        let mut inner = self.inner.lock().await;
        inner.cancel_timer();
        let active = inner.controller.on_language_change(language)?;
        Ok(active.clone())
    }

    /// Changes the skill level sent with subsequent mentor requests.
    pub async fn set_skill_level(&self, level: SkillLevel) {
        self.inner.lock().await.controller.set_skill_level(level);
    }

    pub async fn clear_chat(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.controller.clear_chat()?;
        Ok(())
    }

    pub async fn clear_code(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.cancel_timer();
        inner.controller.clear_code()?;
        Ok(())
    }

    /// Sends a mentor request for the active problem.
    ///
    /// A `message` is recorded as a user turn before the request goes out.
    /// Exactly one assistant turn is appended once the gateway answers, to the
    /// problem that was active when the request was made.
    pub async fn ask(&self, action: GatewayAction, message: Option<String>) -> Result<MentorReply> {
        let request = {
            let mut inner = self.inner.lock().await;
            if inner.controller.active().is_none() {
                return Err(CoachError::NoActiveSession.into());
            }
            if let Some(message) = &message {
                inner.controller.on_chat_append(Turn::user(message.clone()))?;
            }
            let active = inner
                .controller
                .active()
                .ok_or(CoachError::NoActiveSession)?;
            GatewayRequest {
                action,
                code: active.code().to_string(),
                language: active.language().to_string(),
                problem_id: active.problem_id().to_string(),
                problem_description: active.problem().description.clone(),
                skill_level: inner.controller.skill_level(),
                message,
            }
        };

        tracing::info!(
            "[PracticeSession] Sending {} request for '{}'",
            action,
            request.problem_id
        );
        let outcome = self.gateway.send(&request).await;

        let verdict = match (&outcome, action) {
            (Ok(response), GatewayAction::Submit) if response.error.is_none() => {
                Some(SubmissionVerdict::parse(response.text()))
            }
            _ => None,
        };
        let turn = reply_turn(outcome);

        let mut inner = self.inner.lock().await;
        inner
            .controller
            .append_turn_for(&request.problem_id, turn.clone())?;

        Ok(MentorReply {
            problem_id: request.problem_id,
            turn,
            verdict,
        })
    }

    /// Cancels the armed timer, flushes pending code and closes the active problem.
    ///
    /// The session stays usable: a later `open` starts over with fresh timers.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        inner.cancel_timer();
        inner.controller.teardown();
    }

    fn spawn_debounce(&self, ticket: DebounceTicket) -> CancellationToken {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(ticket.delay()) => {
                    let mut inner = inner.lock().await;
                    if inner.controller.on_debounce_elapsed(ticket) {
                        tracing::debug!(
                            "[PracticeSession] Committed debounced edit {}",
                            ticket.generation()
                        );
                    }
                }
            }
        });

        token
    }
}

impl PracticeSession<FileStore> {
    /// Wires a file-backed session talking HTTP to the configured backend.
    pub fn from_config(config: &CoachConfig) -> Result<Self> {
        let store = FileStore::new(config.storage_dir()?)
            .context("Failed to open session storage")?;
        let catalog = config.catalog()?;
        let gateway = HttpBackendGateway::new(&config.backend)?;
        tracing::info!("[PracticeSession] Storage at {:?}", store.dir());

        Ok(Self::new(
            store,
            catalog,
            config.session_settings(),
            Arc::new(gateway),
        ))
    }
}
