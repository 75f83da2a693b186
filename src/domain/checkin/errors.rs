//! Check-in specific error types.

use thiserror::Error;

use crate::domain::foundation::{ErrorCode, SessionId, ValidationError};

/// Errors surfaced to callers of the check-in flow.
///
/// Remote spreadsheet failures never appear here; they are absorbed by the
/// persistence gateway and reported as a fallback outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckinError {
    /// Caller supplied invalid input (blank name, empty answer in strict mode).
    #[error("Validation failed: {0}")]
    InvalidInput(#[from] ValidationError),

    /// No live session has this id.
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    /// Operation not allowed in the session's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Neither the spreadsheet nor the local fallback log accepted the record.
    #[error("Check-in could not be saved: {0}")]
    FallbackWriteFailed(String),
}

impl CheckinError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        CheckinError::InvalidState(message.into())
    }

    pub fn fallback_write_failed(message: impl Into<String>) -> Self {
        CheckinError::FallbackWriteFailed(message.into())
    }

    /// True for errors caused by the caller's input, including unknown ids.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            CheckinError::InvalidInput(_) | CheckinError::SessionNotFound(_)
        )
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CheckinError::InvalidInput(_) => ErrorCode::ValidationFailed,
            CheckinError::SessionNotFound(_) => ErrorCode::SessionNotFound,
            CheckinError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            CheckinError::FallbackWriteFailed(_) => ErrorCode::PersistenceFailed,
        }
    }
}
