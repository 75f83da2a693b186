//! CancelCheckinHandler - Command handler for abandoning a check-in.

use std::sync::Arc;

use crate::application::ConversationEngine;
use crate::domain::foundation::SessionId;

/// Command to cancel a session.
#[derive(Debug, Clone)]
pub struct CancelCheckinCommand {
    pub session_id: SessionId,
}

/// Handler for cancellations.
///
/// Cancelling an unknown or already finished session is not an error.
pub struct CancelCheckinHandler {
    engine: Arc<ConversationEngine>,
}

impl CancelCheckinHandler {
    pub fn new(engine: Arc<ConversationEngine>) -> Self {
        Self { engine }
    }

    /// Returns whether a live session was removed.
    pub async fn handle(&self, cmd: CancelCheckinCommand) -> bool {
        self.engine.cancel(&cmd.session_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::checkin::{AnswerPolicy, CheckType, QuestionCatalog};

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let engine = Arc::new(ConversationEngine::new(
            QuestionCatalog::builtin(),
            AnswerPolicy::AcceptEmpty,
        ));
        let id = engine.start("Ava", CheckType::Start).await.unwrap();
        let handler = CancelCheckinHandler::new(engine.clone());

        assert!(handler.handle(CancelCheckinCommand { session_id: id }).await);
        assert!(!handler.handle(CancelCheckinCommand { session_id: id }).await);
        assert_eq!(engine.active_sessions().await, 0);
    }
}
