//! Application layer - Engine, gateway, and command handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Front ends talk to the handlers; the handlers drive the conversation
//! engine and hand finished check-ins to the persistence gateway.

mod conversation_engine;
pub mod handlers;
mod persistence_gateway;
mod session_registry;

pub use conversation_engine::ConversationEngine;
pub use persistence_gateway::{
    data_row, header_row, GatewayOptions, PersistenceGateway, SaveOutcome, BASE_HEADER,
};
pub use session_registry::SessionRegistry;

pub use handlers::checkin::{
    CancelCheckinCommand, CancelCheckinHandler, GetPromptHandler, GetPromptQuery,
    PreviousQuestionCommand, PreviousQuestionHandler, PreviousQuestionResult, PromptView,
    StartCheckinCommand, StartCheckinHandler, StartCheckinResult, SubmitAnswerCommand,
    SubmitAnswerHandler, SubmitAnswerResult,
};
