//! ConversationEngine - the shared conversational core for all front ends.
//!
//! Owns the live sessions and drives each through its question set. The
//! engine performs no I/O; completed sessions are taken out with
//! [`ConversationEngine::take_completed`] and handed to the persistence
//! gateway by the caller.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::SessionRegistry;
use crate::domain::checkin::{
    AnswerPolicy, AnswerRecord, CheckType, CheckinError, CheckinRecord, CheckinSession, Progress,
    QuestionCatalog,
};
use crate::domain::foundation::SessionId;

/// Conversation engine over a question catalog.
#[derive(Debug)]
pub struct ConversationEngine {
    catalog: RwLock<QuestionCatalog>,
    policy: AnswerPolicy,
    registry: SessionRegistry,
}

impl ConversationEngine {
    pub fn new(catalog: QuestionCatalog, policy: AnswerPolicy) -> Self {
        Self {
            catalog: RwLock::new(catalog),
            policy,
            registry: SessionRegistry::new(),
        }
    }

    /// Swaps the question catalog used by sessions started from now on.
    /// Running sessions keep the questions they started with.
    pub async fn replace_catalog(&self, catalog: QuestionCatalog) {
        *self.catalog.write().await = catalog;
        tracing::info!("Question catalog replaced");
    }

    /// Starts a session for `user_name` with the question set for `check_type`.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the name is blank
    pub async fn start(&self, user_name: &str, check_type: CheckType) -> Result<SessionId, CheckinError> {
        let questions = self.catalog.read().await.for_kind(check_type).clone();
        let session = CheckinSession::start(user_name, check_type, questions)?;
        let id = self.registry.insert(session).await;
        tracing::info!(session_id = %id, check_type = %check_type, "Check-in session started");
        Ok(id)
    }

    /// Greeting on the first call, then the current question's prompt.
    /// `None` once the session is complete.
    pub async fn next_prompt(&self, id: &SessionId) -> Result<Option<String>, CheckinError> {
        self.registry
            .update(id, |session| session.next_prompt())
            .await
            .ok_or(CheckinError::SessionNotFound(*id))
    }

    /// Records an answer for the current question.
    ///
    /// Returns whether an answer was recorded; submitting to a session that
    /// is not waiting for an answer changes nothing.
    pub async fn submit_answer(&self, id: &SessionId, raw_text: &str) -> Result<bool, CheckinError> {
        let policy = self.policy;
        self.registry
            .update(id, |session| session.submit_answer(raw_text, policy))
            .await
            .ok_or(CheckinError::SessionNotFound(*id))?
    }

    pub async fn is_complete(&self, id: &SessionId) -> Result<bool, CheckinError> {
        self.registry
            .read(id, |session| session.is_complete())
            .await
            .ok_or(CheckinError::SessionNotFound(*id))
    }

    pub async fn progress(&self, id: &SessionId) -> Result<Progress, CheckinError> {
        self.registry
            .read(id, |session| session.progress())
            .await
            .ok_or(CheckinError::SessionNotFound(*id))
    }

    /// Builds the record of a completed session without removing it.
    pub async fn snapshot(&self, id: &SessionId) -> Result<CheckinRecord, CheckinError> {
        self.registry
            .read(id, |session| session.snapshot())
            .await
            .ok_or(CheckinError::SessionNotFound(*id))?
    }

    /// Steps back one question, returning the answer that was removed.
    pub async fn previous_question(&self, id: &SessionId) -> Result<Option<AnswerRecord>, CheckinError> {
        self.registry
            .update(id, |session| session.previous_question())
            .await
            .ok_or(CheckinError::SessionNotFound(*id))
    }

    /// Snapshots a completed session and removes it in one step.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if the id is unknown or already taken
    /// - `InvalidState` if the session is not complete (it stays registered)
    pub async fn take_completed(&self, id: &SessionId) -> Result<CheckinRecord, CheckinError> {
        let record = self
            .registry
            .remove_if(id, |session| session.snapshot())
            .await
            .ok_or(CheckinError::SessionNotFound(*id))??;
        tracing::info!(
            session_id = %id,
            check_type = %record.check_type(),
            answers = record.answers().len(),
            "Check-in session completed"
        );
        Ok(record)
    }

    /// Discards a session. Returns whether anything was removed.
    pub async fn cancel(&self, id: &SessionId) -> bool {
        let removed = self.registry.remove(id).await;
        if removed {
            tracing::info!(session_id = %id, "Check-in session cancelled");
        }
        removed
    }

    /// Drops sessions idle for longer than `ttl`.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let evicted = self.registry.evict_idle(ttl).await;
        if evicted > 0 {
            tracing::info!(evicted, ttl_secs = ttl.as_secs(), "Evicted idle check-in sessions");
        }
        evicted
    }

    pub async fn active_sessions(&self) -> usize {
        self.registry.len().await
    }

    /// Spawns a task that evicts idle sessions every `interval`.
    pub fn spawn_eviction(self: &Arc<Self>, interval: Duration, ttl: Duration) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                engine.evict_idle(ttl).await;
            }
        })
    }
}
