//! Check-in command and query handlers.

mod cancel_checkin;
mod get_prompt;
mod previous_question;
mod start_checkin;
mod submit_answer;

pub use cancel_checkin::{CancelCheckinCommand, CancelCheckinHandler};
pub use get_prompt::{GetPromptHandler, GetPromptQuery, PromptView};
pub use previous_question::{PreviousQuestionCommand, PreviousQuestionHandler, PreviousQuestionResult};
pub use start_checkin::{StartCheckinCommand, StartCheckinHandler, StartCheckinResult};
pub use submit_answer::{SubmitAnswerCommand, SubmitAnswerHandler, SubmitAnswerResult};
