#[cfg(test)]
mod tests {
    use crate::session::PracticeSession;
    use async_trait::async_trait;
    use coach_core::gateway::{
        BackendGateway, GatewayAction, GatewayError, GatewayRequest, GatewayResponse,
        failure_text,
    };
    use coach_core::language::Language;
    use coach_core::problem::ProblemCatalog;
    use coach_core::session::SessionSettings;
    use coach_core::skill::SkillLevel;
    use coach_core::store::{MemoryStore, PersistentStore};
    use coach_core::tables::TableKind;
    use coach_core::transcript::{Author, Turn};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Gateway double that records requests and answers from a script.
    struct ScriptedGateway {
        reply: Result<GatewayResponse, GatewayError>,
        requests: Mutex<Vec<GatewayRequest>>,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedGateway {
        fn replying(reply: Result<GatewayResponse, GatewayError>) -> Self {
            Self {
                reply,
                requests: Mutex::new(Vec::new()),
                gate: None,
            }
        }

        fn gated(reply: Result<GatewayResponse, GatewayError>, gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::replying(reply)
            }
        }

        fn requests(&self) -> Vec<GatewayRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BackendGateway for ScriptedGateway {
        async fn send(&self, request: &GatewayRequest) -> Result<GatewayResponse, GatewayError> {
            self.requests.lock().unwrap().push(request.clone());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.reply.clone()
        }
    }

    fn text_reply(field: &str) -> Result<GatewayResponse, GatewayError> {
        Ok(GatewayResponse {
            response: Some(field.to_string()),
            ..Default::default()
        })
    }

    fn session_with(
        store: &MemoryStore,
        gateway: Arc<ScriptedGateway>,
    ) -> PracticeSession<MemoryStore> {
        PracticeSession::new(
            store.clone(),
            ProblemCatalog::default(),
            SessionSettings::default(),
            gateway,
        )
    }

    fn stored_code(store: &MemoryStore, problem_id: &str, language: &str) -> Option<String> {
        store
            .load_all()
            .tables
            .code
            .get(problem_id)
            .and_then(|slots| slots.get(&Language::new(language)))
            .cloned()
    }

    fn stored_turns(store: &MemoryStore, problem_id: &str) -> Vec<Turn> {
        store
            .load_all()
            .tables
            .chat
            .get(problem_id)
            .map(|transcript| transcript.turns().to_vec())
            .unwrap_or_default()
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_coalesce_into_one_write() {
        let store = MemoryStore::new();
        let session = session_with(&store, Arc::new(ScriptedGateway::replying(text_reply("ok"))));
        session.open("two-sum").await.unwrap();

        for i in 0..5 {
            session.edit(format!("draft {}", i)).await.unwrap();
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(store.write_count(TableKind::Code), 0);

        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(store.write_count(TableKind::Code), 1);
        assert_eq!(
            stored_code(&store, "two-sum", "javascript").as_deref(),
            Some("draft 4")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_before_switch_is_flushed() {
        let store = MemoryStore::new();
        let session = session_with(&store, Arc::new(ScriptedGateway::replying(text_reply("ok"))));
        session.open("two-sum").await.unwrap();
        session.edit("function twoSum() {}").await.unwrap();

        let opened = session.open("reverse-string").await.unwrap();

        assert_eq!(opened.problem_id(), "reverse-string");
        assert_eq!(
            stored_code(&store, "two-sum", "javascript").as_deref(),
            Some("function twoSum() {}")
        );

        // The cancelled timer must not write again.
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(store.write_count(TableKind::Code), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_language_change_keeps_slots_apart() {
        let store = MemoryStore::new();
        let session = session_with(&store, Arc::new(ScriptedGateway::replying(text_reply("ok"))));
        session.open("two-sum").await.unwrap();
        session.change_language("python").await.unwrap();
        session.edit("def two_sum(): pass").await.unwrap();

        let active = session.change_language("javascript").await.unwrap();

        assert_eq!(active.code(), Language::new("javascript").starter_template());
        assert_eq!(
            stored_code(&store, "two-sum", "python").as_deref(),
            Some("def two_sum(): pass")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_flushes_pending_edit() {
        let store = MemoryStore::new();
        let session = session_with(&store, Arc::new(ScriptedGateway::replying(text_reply("ok"))));
        session.open("two-sum").await.unwrap();
        session.edit("unsaved").await.unwrap();

        session.shutdown().await;

        assert_eq!(stored_code(&store, "two-sum", "javascript").as_deref(), Some("unsaved"));
        assert!(session.active().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_still_commits_after_shutdown_and_reopen() {
        let store = MemoryStore::new();
        let session = session_with(&store, Arc::new(ScriptedGateway::replying(text_reply("ok"))));
        session.open("two-sum").await.unwrap();
        session.shutdown().await;

        session.open("two-sum").await.unwrap();
        session.edit("after reopen").await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(store.write_count(TableKind::Code), 1);
        assert_eq!(
            stored_code(&store, "two-sum", "javascript").as_deref(),
            Some("after reopen")
        );
    }

    #[tokio::test]
    async fn test_ask_sends_snapshot_and_records_reply() {
        let store = MemoryStore::new();
        let gateway = Arc::new(ScriptedGateway::replying(text_reply("Try a hash map.")));
        let session = session_with(&store, gateway.clone());
        session.open("two-sum").await.unwrap();
        session.edit("let seen = {};").await.unwrap();

        let reply = session
            .ask(GatewayAction::Hint, Some("hint please".to_string()))
            .await
            .unwrap();

        assert_eq!(reply.problem_id, "two-sum");
        assert_eq!(reply.turn, Turn::assistant("Try a hash map."));
        assert!(reply.verdict.is_none());

        let requests = gateway.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].action, GatewayAction::Hint);
        assert_eq!(requests[0].code, "let seen = {};");
        assert_eq!(requests[0].language, "javascript");
        assert_eq!(requests[0].message.as_deref(), Some("hint please"));
        assert_eq!(requests[0].skill_level, SkillLevel::Beginner);
        assert!(requests[0].problem_description.contains("target"));

        let turns = stored_turns(&store, "two-sum");
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[1], Turn::user("hint please"));
        assert_eq!(turns[2], Turn::assistant("Try a hash map."));
    }

    #[tokio::test]
    async fn test_skill_level_follows_settings_and_changes() {
        let gateway = Arc::new(ScriptedGateway::replying(text_reply("ok")));
        let settings = SessionSettings {
            skill_level: SkillLevel::Advanced,
            ..SessionSettings::default()
        };
        let session = PracticeSession::new(
            MemoryStore::new(),
            ProblemCatalog::default(),
            settings,
            gateway.clone(),
        );
        session.open("two-sum").await.unwrap();

        session.ask(GatewayAction::Chat, Some("ready".to_string())).await.unwrap();
        session.set_skill_level(SkillLevel::Intermediate).await;
        session.ask(GatewayAction::Hint, None).await.unwrap();

        let levels: Vec<SkillLevel> = gateway
            .requests()
            .iter()
            .map(|request| request.skill_level)
            .collect();
        assert_eq!(levels, vec![SkillLevel::Advanced, SkillLevel::Intermediate]);
    }

    #[tokio::test]
    async fn test_gateway_failure_adds_one_failure_turn() {
        let store = MemoryStore::new();
        let error = GatewayError::Transport("connection refused".to_string());
        let gateway = Arc::new(ScriptedGateway::replying(Err(error.clone())));
        let session = session_with(&store, gateway);
        session.open("two-sum").await.unwrap();

        let reply = session
            .ask(GatewayAction::Chat, Some("hint please".to_string()))
            .await
            .unwrap();

        assert_eq!(reply.turn.text, failure_text(&error));
        let active = session.active().await.unwrap();
        let turns = active.transcript().turns();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[1], Turn::user("hint please"));
        assert_eq!(turns[2].author, Author::Assistant);
        assert_eq!(stored_turns(&store, "two-sum"), turns.to_vec());
    }

    #[tokio::test]
    async fn test_reply_error_field_is_a_failure() {
        let store = MemoryStore::new();
        let gateway = Arc::new(ScriptedGateway::replying(Ok(GatewayResponse {
            error: Some("model offline".to_string()),
            ..Default::default()
        })));
        let session = session_with(&store, gateway);
        session.open("two-sum").await.unwrap();

        let reply = session.ask(GatewayAction::Submit, None).await.unwrap();

        assert!(reply.turn.text.contains("model offline"));
        assert!(reply.verdict.is_none());
        // No message means no user turn: opening turn plus the reply.
        assert_eq!(stored_turns(&store, "two-sum").len(), 2);
    }

    #[tokio::test]
    async fn test_submit_reply_is_parsed_into_verdict() {
        let store = MemoryStore::new();
        let gateway = Arc::new(ScriptedGateway::replying(text_reply(
            "RESULT: PASS\nFEEDBACK: Handles duplicates correctly.",
        )));
        let session = session_with(&store, gateway);
        session.open("two-sum").await.unwrap();

        let reply = session.ask(GatewayAction::Submit, None).await.unwrap();

        let verdict = reply.verdict.unwrap();
        assert!(verdict.passed);
        assert_eq!(verdict.feedback, "Handles duplicates correctly.");
    }

    #[tokio::test]
    async fn test_late_reply_goes_to_originating_problem() {
        let store = MemoryStore::new();
        let gate = Arc::new(Notify::new());
        let gateway = Arc::new(ScriptedGateway::gated(text_reply("Use two pointers."), gate.clone()));
        let session = Arc::new(session_with(&store, gateway.clone()));
        session.open("two-sum").await.unwrap();

        let pending = {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                session
                    .ask(GatewayAction::Chat, Some("how do I start?".to_string()))
                    .await
            })
        };
        while gateway.requests().is_empty() {
            tokio::task::yield_now().await;
        }

        session.open("reverse-string").await.unwrap();
        gate.notify_one();
        let reply = pending.await.unwrap().unwrap();

        assert_eq!(reply.problem_id, "two-sum");
        let two_sum = stored_turns(&store, "two-sum");
        assert_eq!(two_sum.last(), Some(&Turn::assistant("Use two pointers.")));

        let active = session.active().await.unwrap();
        assert_eq!(active.problem_id(), "reverse-string");
        assert_eq!(active.transcript().len(), 1);
        assert!(stored_turns(&store, "reverse-string").is_empty());
    }

    #[tokio::test]
    async fn test_ask_without_active_problem_fails() {
        let gateway = Arc::new(ScriptedGateway::replying(text_reply("ok")));
        let session = session_with(&MemoryStore::new(), gateway.clone());

        assert!(session.ask(GatewayAction::Hint, None).await.is_err());
        assert!(gateway.requests().is_empty());
    }

    #[tokio::test]
    async fn test_clear_operations() {
        let store = MemoryStore::new();
        let session = session_with(&store, Arc::new(ScriptedGateway::replying(text_reply("ok"))));
        session.open("two-sum").await.unwrap();
        session.edit("scratch").await.unwrap();
        session.ask(GatewayAction::Chat, Some("hi".to_string())).await.unwrap();

        session.clear_code().await.unwrap();
        session.clear_chat().await.unwrap();

        let active = session.active().await.unwrap();
        assert_eq!(active.code(), Language::new("javascript").starter_template());
        assert_eq!(active.transcript().len(), 1);
        assert!(!active.has_pending_write());
    }
}

#[cfg(test)]
mod file_backed_tests {
    use crate::session::PracticeSession;
    use coach_infrastructure::CoachConfig;
    use coach_infrastructure::config::StorageConfig;
    use tempfile::TempDir;

    #[tokio::test(start_paused = true)]
    async fn test_from_config_persists_across_sessions() {
        let temp_dir = TempDir::new().unwrap();
        let config = CoachConfig {
            storage: StorageConfig {
                directory: Some(temp_dir.path().join("sessions")),
            },
            ..CoachConfig::default()
        };

        let first = PracticeSession::from_config(&config).unwrap();
        first.open("reverse-string").await.unwrap();
        first.change_language("python").await.unwrap();
        first.edit("def reverse(s): return s[::-1]").await.unwrap();
        first.shutdown().await;
        drop(first);

        let second = PracticeSession::from_config(&config).unwrap();
        let active = second.open("reverse-string").await.unwrap();
        assert_eq!(active.language().as_str(), "python");
        assert_eq!(active.code(), "def reverse(s): return s[::-1]");
    }
}
