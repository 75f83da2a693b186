//! PreviousQuestionHandler - Command handler for the form's Back button.

use std::sync::Arc;

use crate::application::ConversationEngine;
use crate::domain::checkin::{AnswerRecord, CheckinError, Progress};
use crate::domain::foundation::SessionId;

/// Command to step back one question.
#[derive(Debug, Clone)]
pub struct PreviousQuestionCommand {
    pub session_id: SessionId,
}

/// The question to show again and the answer it had.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviousQuestionResult {
    pub prompt: Option<String>,
    /// `None` when there was nothing to step back to.
    pub previous_answer: Option<AnswerRecord>,
    pub progress: Progress,
}

pub struct PreviousQuestionHandler {
    engine: Arc<ConversationEngine>,
}

impl PreviousQuestionHandler {
    pub fn new(engine: Arc<ConversationEngine>) -> Self {
        Self { engine }
    }

    pub async fn handle(&self, cmd: PreviousQuestionCommand) -> Result<PreviousQuestionResult, CheckinError> {
        let id = cmd.session_id;
        let previous_answer = self.engine.previous_question(&id).await?;
        Ok(PreviousQuestionResult {
            prompt: self.engine.next_prompt(&id).await?,
            previous_answer,
            progress: self.engine.progress(&id).await?,
        })
    }
}
