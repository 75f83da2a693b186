//! HTTP adapter for check-in endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ChatResponse, ErrorResponse, HealthResponse, MessageResponse, PreviousQuestionResponse,
    ProgressResponse, SendMessageRequest, SessionRequest, StartSessionRequest,
    StartSessionResponse,
};
pub use handlers::{CheckinHandlers, NOT_SAVED_MESSAGE, SAVED_LOCALLY_MESSAGE, SAVED_MESSAGE};
pub use routes::checkin_routes;
