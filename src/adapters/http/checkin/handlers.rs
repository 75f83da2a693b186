//! HTTP handlers for check-in endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::{
    CancelCheckinCommand, CancelCheckinHandler, ConversationEngine, GetPromptHandler, GetPromptQuery,
    PersistenceGateway, PreviousQuestionCommand, PreviousQuestionHandler, SaveOutcome,
    StartCheckinCommand, StartCheckinHandler, SubmitAnswerCommand, SubmitAnswerHandler,
    SubmitAnswerResult,
};
use crate::domain::checkin::{CheckType, CheckinError};
use crate::domain::foundation::{SessionId, Timestamp};

use super::dto::{
    ChatResponse, ErrorResponse, HealthResponse, MessageResponse, PreviousQuestionResponse,
    SendMessageRequest, SessionRequest, StartSessionRequest, StartSessionResponse,
};

/// Sent when the check-in reached the spreadsheet.
pub const SAVED_MESSAGE: &str = "✅ All done! Your responses have been saved. Have a great day! 🌟";

/// Sent when the check-in went to the local fallback log.
pub const SAVED_LOCALLY_MESSAGE: &str =
    "⚠️ All done! The spreadsheet is unavailable right now, so your responses were saved locally instead. Have a great day! 🌟";

/// Sent when neither destination accepted the check-in.
pub const NOT_SAVED_MESSAGE: &str =
    "❌ Sorry, your responses could not be saved. Please share them with your team lead directly.";

const INVALID_SESSION_MESSAGE: &str = "Invalid session";

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct CheckinHandlers {
    start_handler: Arc<StartCheckinHandler>,
    submit_handler: Arc<SubmitAnswerHandler>,
    cancel_handler: Arc<CancelCheckinHandler>,
    prompt_handler: Arc<GetPromptHandler>,
    previous_handler: Arc<PreviousQuestionHandler>,
    engine: Arc<ConversationEngine>,
    gateway: Arc<PersistenceGateway>,
}

impl CheckinHandlers {
    /// Builds every handler over one engine and gateway.
    pub fn new(
        engine: Arc<ConversationEngine>,
        gateway: Arc<PersistenceGateway>,
    ) -> Self {
        Self {
            start_handler: Arc::new(StartCheckinHandler::new(engine.clone())),
            submit_handler: Arc::new(SubmitAnswerHandler::new(engine.clone(), gateway.clone())),
            cancel_handler: Arc::new(CancelCheckinHandler::new(engine.clone())),
            prompt_handler: Arc::new(GetPromptHandler::new(engine.clone())),
            previous_handler: Arc::new(PreviousQuestionHandler::new(engine.clone())),
            engine,
            gateway,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/health - Liveness and remote store mode
pub async fn health(State(handlers): State<CheckinHandlers>) -> Response {
    let remote = if handlers.gateway.is_degraded() {
        "degraded"
    } else {
        "connected"
    };
    let response = HealthResponse {
        status: "healthy".to_string(),
        timestamp: Timestamp::now().to_rfc3339(),
        remote: remote.to_string(),
        active_sessions: handlers.engine.active_sessions().await,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// POST /api/start-session - Open a check-in and return the greeting
pub async fn start_session(
    State(handlers): State<CheckinHandlers>,
    Json(req): Json<StartSessionRequest>,
) -> Response {
    if req.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Name is required")),
        )
            .into_response();
    }

    let check_type = match req.check_type.as_deref() {
        None => CheckType::default(),
        Some(raw) => match raw.parse::<CheckType>() {
            Ok(check_type) => check_type,
            Err(e) => return handle_checkin_error(CheckinError::from(e)),
        },
    };

    let cmd = StartCheckinCommand {
        user_name: req.name,
        check_type,
    };

    match handlers.start_handler.handle(cmd).await {
        Ok(result) => {
            let response = StartSessionResponse {
                session_id: result.session_id.to_string(),
                message: result.opening_message(),
                progress: result.progress.into(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_checkin_error(e),
    }
}

/// POST /api/send-message - Submit one answer
pub async fn send_message(
    State(handlers): State<CheckinHandlers>,
    Json(req): Json<SendMessageRequest>,
) -> Response {
    let session_id = match parse_session_id(&req.session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let cmd = SubmitAnswerCommand {
        session_id,
        answer: req.message,
    };

    match handlers.submit_handler.handle(cmd).await {
        Ok(SubmitAnswerResult::Continue { prompt, progress }) => {
            let response = ChatResponse {
                message: prompt,
                completed: false,
                progress: progress.into(),
                saved_to: None,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(SubmitAnswerResult::Completed { outcome, progress }) => {
            let message = match outcome {
                SaveOutcome::Remote => SAVED_MESSAGE,
                SaveOutcome::Fallback => SAVED_LOCALLY_MESSAGE,
            };
            let response = ChatResponse {
                message: message.to_string(),
                completed: true,
                progress: progress.into(),
                saved_to: Some(outcome.as_str().to_string()),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_checkin_error(e),
    }
}

/// POST /api/cancel-session - Discard a check-in
pub async fn cancel_session(
    State(handlers): State<CheckinHandlers>,
    Json(req): Json<SessionRequest>,
) -> Response {
    // Unknown or malformed ids are acknowledged like known ones.
    if let Ok(session_id) = req.session_id.parse::<SessionId>() {
        handlers
            .cancel_handler
            .handle(CancelCheckinCommand { session_id })
            .await;
    }

    let response = MessageResponse {
        message: "Session cancelled".to_string(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /api/sessions/:id/prompt - Re-send the current prompt
pub async fn get_prompt(
    State(handlers): State<CheckinHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.prompt_handler.handle(GetPromptQuery { session_id }).await {
        Ok(view) => {
            let response = ChatResponse {
                message: view.prompt.unwrap_or_default(),
                completed: view.completed,
                progress: view.progress.into(),
                saved_to: None,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_checkin_error(e),
    }
}

/// POST /api/previous-question - Step back one question
pub async fn previous_question(
    State(handlers): State<CheckinHandlers>,
    Json(req): Json<SessionRequest>,
) -> Response {
    let session_id = match parse_session_id(&req.session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .previous_handler
        .handle(PreviousQuestionCommand { session_id })
        .await
    {
        Ok(result) => {
            let response = PreviousQuestionResponse {
                message: result.prompt.unwrap_or_default(),
                previous_answer: result.previous_answer.map(|a| a.answer),
                progress: result.progress.into(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_checkin_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn parse_session_id(raw: &str) -> Result<SessionId, Response> {
    raw.trim().parse::<SessionId>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(INVALID_SESSION_MESSAGE)),
        )
            .into_response()
    })
}

fn handle_checkin_error(error: CheckinError) -> Response {
    match &error {
        CheckinError::InvalidInput(_) | CheckinError::InvalidState(_) => {
            (StatusCode::BAD_REQUEST, Json(ErrorResponse::from(&error))).into_response()
        }
        CheckinError::SessionNotFound(_) => {
            let mut body = ErrorResponse::from(&error);
            body.message = INVALID_SESSION_MESSAGE.to_string();
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
        CheckinError::FallbackWriteFailed(reason) => {
            let body = ErrorResponse {
                code: error.code().to_string(),
                message: NOT_SAVED_MESSAGE.to_string(),
                details: None,
            }
            .with_details(serde_json::json!({ "reason": reason }));
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}
