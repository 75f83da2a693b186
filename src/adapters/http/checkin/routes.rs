//! HTTP routes for check-in endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    cancel_session, get_prompt, health, previous_question, send_message, start_session,
    CheckinHandlers,
};

/// Creates the check-in router, mounted under `/api`.
pub fn checkin_routes(handlers: CheckinHandlers) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/start-session", post(start_session))
        .route("/send-message", post(send_message))
        .route("/cancel-session", post(cancel_session))
        .route("/previous-question", post(previous_question))
        .route("/sessions/:id/prompt", get(get_prompt))
        .with_state(handlers)
}
