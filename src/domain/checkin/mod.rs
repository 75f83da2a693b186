//! Check-in domain module.
//!
//! Holds the conversation state machine and the records it produces.
//!
//! - `CheckType` - morning (`start`) or evening (`end`)
//! - `QuestionSet` / `QuestionCatalog` - static question configuration
//! - `CheckinSession` - one user's progress through a question set
//! - `CheckinRecord` - immutable snapshot handed to persistence

mod check_type;
mod errors;
mod question;
mod record;
mod session;

pub use check_type::CheckType;
pub use errors::CheckinError;
pub use question::{Question, QuestionCatalog, QuestionSet, NAME_PLACEHOLDER};
pub use record::{AnswerRecord, CheckinRecord, DATE_FORMAT, TIME_FORMAT};
pub use session::{AnswerPolicy, CheckinSession, ConversationPhase, Progress};
