//! SubmitAnswerHandler - Command handler for one chat turn.
//!
//! Records the answer, then either returns the next prompt or, when the
//! last question was answered, takes the finished record out of the engine
//! and saves it through the persistence gateway.
//!
//! The save runs on its own task: once the session has left the engine, a
//! dropped request (client gone, request timeout) must not abort the write.

use std::sync::Arc;

use crate::application::{ConversationEngine, PersistenceGateway, SaveOutcome};
use crate::domain::checkin::{CheckinError, Progress};
use crate::domain::foundation::SessionId;

/// Command carrying one answer.
#[derive(Debug, Clone)]
pub struct SubmitAnswerCommand {
    pub session_id: SessionId,
    pub answer: String,
}

/// What the front end shows next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAnswerResult {
    /// More questions remain.
    Continue { prompt: String, progress: Progress },
    /// The check-in is finished and the session has been discarded.
    Completed { outcome: SaveOutcome, progress: Progress },
}

/// Handler for answer submissions.
pub struct SubmitAnswerHandler {
    engine: Arc<ConversationEngine>,
    gateway: Arc<PersistenceGateway>,
}

impl SubmitAnswerHandler {
    pub fn new(engine: Arc<ConversationEngine>, gateway: Arc<PersistenceGateway>) -> Self {
        Self { engine, gateway }
    }

    pub async fn handle(&self, cmd: SubmitAnswerCommand) -> Result<SubmitAnswerResult, CheckinError> {
        let id = cmd.session_id;
        self.engine.submit_answer(&id, &cmd.answer).await?;

        if !self.engine.is_complete(&id).await? {
            let prompt = self.engine.next_prompt(&id).await?.unwrap_or_default();
            let progress = self.engine.progress(&id).await?;
            return Ok(SubmitAnswerResult::Continue { prompt, progress });
        }

        let progress = self.engine.progress(&id).await?;
        let record = self.engine.take_completed(&id).await?;

        let gateway = self.gateway.clone();
        let pending = record.clone();
        let saved = tokio::spawn(async move { gateway.save(&pending).await })
            .await
            .unwrap_or_else(|err| {
                Err(CheckinError::fallback_write_failed(format!("save task failed: {}", err)))
            });

        match saved {
            Ok(outcome) => Ok(SubmitAnswerResult::Completed { outcome, progress }),
            Err(err) => {
                // Last trace of the answers: keep them in the log output.
                let payload = serde_json::to_string(&record).unwrap_or_default();
                tracing::error!(session_id = %id, record = %payload, error = %err, "Check-in lost");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sheets::InMemoryTabularStore;
    use crate::adapters::storage::InMemoryFallbackLog;
    use crate::application::GatewayOptions;
    use crate::domain::checkin::{AnswerPolicy, CheckType, QuestionCatalog};
    use crate::ports::{FallbackLog, TabularStore, TabularStoreError};
    use std::time::Duration;

    struct Fixture {
        engine: Arc<ConversationEngine>,
        store: InMemoryTabularStore,
        log: InMemoryFallbackLog,
        handler: SubmitAnswerHandler,
    }

    async fn fixture(log: InMemoryFallbackLog) -> Fixture {
        fixture_with(InMemoryTabularStore::new(), log, GatewayOptions::default()).await
    }

    async fn fixture_with(
        store: InMemoryTabularStore,
        log: InMemoryFallbackLog,
        options: GatewayOptions,
    ) -> Fixture {
        let engine = Arc::new(ConversationEngine::new(
            QuestionCatalog::builtin(),
            AnswerPolicy::AcceptEmpty,
        ));
        let remote: Arc<dyn TabularStore> = Arc::new(store.clone());
        let gateway = Arc::new(
            PersistenceGateway::connect(Ok(remote), Arc::new(log.clone()), options).await,
        );
        Fixture {
            handler: SubmitAnswerHandler::new(engine.clone(), gateway),
            engine,
            store,
            log,
        }
    }

    async fn started(engine: &ConversationEngine) -> SessionId {
        let id = engine.start("Ava", CheckType::Start).await.unwrap();
        engine.next_prompt(&id).await.unwrap();
        engine.next_prompt(&id).await.unwrap();
        id
    }

    fn answer(session_id: SessionId, text: &str) -> SubmitAnswerCommand {
        SubmitAnswerCommand {
            session_id,
            answer: text.to_string(),
        }
    }

    #[tokio::test]
    async fn intermediate_answer_returns_next_prompt() {
        let f = fixture(InMemoryFallbackLog::new()).await;
        let id = started(&f.engine).await;

        let result = f.handler.handle(answer(id, "7")).await.unwrap();
        match result {
            SubmitAnswerResult::Continue { prompt, progress } => {
                assert!(prompt.starts_with("1️⃣"));
                assert_eq!(progress, Progress { current: 1, total: 5 });
            }
            other => panic!("expected Continue, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn last_answer_saves_and_discards_session() {
        let f = fixture(InMemoryFallbackLog::new()).await;
        let id = started(&f.engine).await;

        for text in ["7", "a", "b", "c"] {
            f.handler.handle(answer(id, text)).await.unwrap();
        }
        let result = f.handler.handle(answer(id, "d")).await.unwrap();

        assert_eq!(
            result,
            SubmitAnswerResult::Completed {
                outcome: SaveOutcome::Remote,
                progress: Progress { current: 5, total: 5 },
            }
        );
        assert_eq!(f.engine.active_sessions().await, 0);
        assert_eq!(f.store.partition_count().await, 1);
        assert!(f.log.is_empty().await);

        let err = f.handler.handle(answer(id, "again")).await.unwrap_err();
        assert!(matches!(err, CheckinError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn remote_outage_reports_fallback() {
        let f = fixture(InMemoryFallbackLog::new()).await;
        f.store
            .set_failure(Some(TabularStoreError::Connectivity("down".to_string())))
            .await;
        let id = started(&f.engine).await;

        let mut last = None;
        for text in ["1", "2", "3", "4", "5"] {
            last = Some(f.handler.handle(answer(id, text)).await.unwrap());
        }

        assert!(matches!(
            last,
            Some(SubmitAnswerResult::Completed { outcome: SaveOutcome::Fallback, .. })
        ));
        let entries = f.log.read_all().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].record.answers()[4].answer, "5");
    }

    #[tokio::test]
    async fn both_paths_failing_still_discards_session() {
        let f = fixture(InMemoryFallbackLog::failing()).await;
        f.store
            .set_failure(Some(TabularStoreError::Unauthorized("403".to_string())))
            .await;
        let id = started(&f.engine).await;

        for text in ["1", "2", "3", "4"] {
            f.handler.handle(answer(id, text)).await.unwrap();
        }
        let err = f.handler.handle(answer(id, "5")).await.unwrap_err();

        assert!(matches!(err, CheckinError::FallbackWriteFailed(_)));
        assert_eq!(f.engine.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn dropped_request_still_saves_checkin() {
        let store = InMemoryTabularStore::new().with_delay(Duration::from_millis(300));
        let options = GatewayOptions {
            remote_timeout: Duration::from_secs(5),
            always_write_local_backup: false,
        };
        let f = fixture_with(store, InMemoryFallbackLog::new(), options).await;
        let id = started(&f.engine).await;

        for text in ["1", "2", "3", "4"] {
            f.handler.handle(answer(id, text)).await.unwrap();
        }
        let cut_short =
            tokio::time::timeout(Duration::from_millis(100), f.handler.handle(answer(id, "5"))).await;
        assert!(cut_short.is_err());

        // find + create + append at 300ms each
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(f.engine.active_sessions().await, 0);
        assert_eq!(f.store.partition_count().await, 1);
        assert_eq!(f.store.partitions_created(), 1);
        assert!(f.log.is_empty().await);
    }
}
