//! StartCheckinHandler - Command handler for opening a check-in session.

use std::sync::Arc;

use crate::application::ConversationEngine;
use crate::domain::checkin::{CheckType, CheckinError, Progress};
use crate::domain::foundation::SessionId;

/// Command to start a check-in.
#[derive(Debug, Clone)]
pub struct StartCheckinCommand {
    pub user_name: String,
    pub check_type: CheckType,
}

/// Result of starting a check-in.
#[derive(Debug, Clone)]
pub struct StartCheckinResult {
    pub session_id: SessionId,
    pub greeting: String,
    /// Prompt of the first question, delivered with the greeting.
    pub first_prompt: Option<String>,
    pub progress: Progress,
}

impl StartCheckinResult {
    /// Greeting and first prompt as one chat message.
    pub fn opening_message(&self) -> String {
        match &self.first_prompt {
            Some(prompt) => format!("{}\n\n{}", self.greeting, prompt),
            None => self.greeting.clone(),
        }
    }
}

/// Handler for starting check-ins.
pub struct StartCheckinHandler {
    engine: Arc<ConversationEngine>,
}

impl StartCheckinHandler {
    pub fn new(engine: Arc<ConversationEngine>) -> Self {
        Self { engine }
    }

    pub async fn handle(&self, cmd: StartCheckinCommand) -> Result<StartCheckinResult, CheckinError> {
        let session_id = self.engine.start(&cmd.user_name, cmd.check_type).await?;

        // First call yields the greeting, the second the first question.
        let greeting = self.engine.next_prompt(&session_id).await?.unwrap_or_default();
        let first_prompt = self.engine.next_prompt(&session_id).await?;
        let progress = self.engine.progress(&session_id).await?;

        Ok(StartCheckinResult {
            session_id,
            greeting,
            first_prompt,
            progress,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::checkin::{AnswerPolicy, QuestionCatalog};

    fn handler() -> (StartCheckinHandler, Arc<ConversationEngine>) {
        let engine = Arc::new(ConversationEngine::new(
            QuestionCatalog::builtin(),
            AnswerPolicy::AcceptEmpty,
        ));
        (StartCheckinHandler::new(engine.clone()), engine)
    }

    #[tokio::test]
    async fn returns_greeting_and_first_question() {
        let (handler, engine) = handler();
        let result = handler
            .handle(StartCheckinCommand {
                user_name: " Ava ".to_string(),
                check_type: CheckType::End,
            })
            .await
            .unwrap();

        assert_eq!(
            result.greeting,
            "Good evening, Ava! 🌇 Let's wrap up your day with a quick check-out."
        );
        assert!(result.first_prompt.as_deref().unwrap().starts_with("1️⃣"));
        assert!(result.opening_message().contains("\n\n"));
        assert_eq!(result.progress, Progress { current: 0, total: 5 });
        assert_eq!(engine.active_sessions().await, 1);
    }

    #[tokio::test]
    async fn blank_name_fails_without_registering() {
        let (handler, engine) = handler();
        let err = handler
            .handle(StartCheckinCommand {
                user_name: "".to_string(),
                check_type: CheckType::Start,
            })
            .await
            .unwrap_err();

        assert!(err.is_invalid_input());
        assert_eq!(engine.active_sessions().await, 0);
    }
}
