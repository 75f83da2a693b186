//! GetPromptHandler - Query handler for re-sending the current prompt.

use std::sync::Arc;

use crate::application::ConversationEngine;
use crate::domain::checkin::{CheckinError, Progress};
use crate::domain::foundation::SessionId;

/// Query for a session's current prompt.
#[derive(Debug, Clone)]
pub struct GetPromptQuery {
    pub session_id: SessionId,
}

/// Current prompt and progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptView {
    /// `None` once every question is answered.
    pub prompt: Option<String>,
    pub completed: bool,
    pub progress: Progress,
}

/// Handler for prompt retransmission.
pub struct GetPromptHandler {
    engine: Arc<ConversationEngine>,
}

impl GetPromptHandler {
    pub fn new(engine: Arc<ConversationEngine>) -> Self {
        Self { engine }
    }

    pub async fn handle(&self, query: GetPromptQuery) -> Result<PromptView, CheckinError> {
        let id = query.session_id;
        let prompt = self.engine.next_prompt(&id).await?;
        Ok(PromptView {
            prompt,
            completed: self.engine.is_complete(&id).await?,
            progress: self.engine.progress(&id).await?,
        })
    }
}
