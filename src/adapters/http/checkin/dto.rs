//! Data Transfer Objects for check-in HTTP endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::checkin::{CheckinError, Progress};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to start a check-in.
#[derive(Debug, Clone, Deserialize)]
pub struct StartSessionRequest {
    #[serde(default)]
    pub name: String,
    /// `start` or `end`; defaults to `start`.
    #[serde(default)]
    pub check_type: Option<String>,
}

/// One chat turn.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub message: String,
}

/// Request naming a session (cancel, previous question).
#[derive(Debug, Clone, Deserialize)]
pub struct SessionRequest {
    #[serde(default)]
    pub session_id: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Answered/total counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub current: usize,
    pub total: usize,
}

impl From<Progress> for ProgressResponse {
    fn from(progress: Progress) -> Self {
        Self {
            current: progress.current,
            total: progress.total,
        }
    }
}

/// Response for a started check-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub message: String,
    pub progress: ProgressResponse,
}

/// Bot reply to a chat turn or prompt query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: String,
    pub completed: bool,
    pub progress: ProgressResponse,
    /// `remote` or `fallback`; present only on the completing turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_to: Option<String>,
}

/// Response for stepping back one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviousQuestionResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_answer: Option<String>,
    pub progress: ProgressResponse,
}

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Service health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    /// `connected` or `degraded`.
    pub remote: String,
    pub active_sessions: usize,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&CheckinError> for ErrorResponse {
    fn from(error: &CheckinError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
            details: None,
        }
    }
}
