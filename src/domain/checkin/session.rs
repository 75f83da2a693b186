//! Check-in session state machine.
//!
//! A session walks one user through an ordered question set:
//!
//! ```text
//! AwaitingGreeting --next_prompt--> AwaitingAnswer(0) --submit--> ... --submit--> Complete
//! ```
//!
//! The session is pure in-memory state. It never performs I/O.
//!
//! # Invariants
//!
//! - `cursor <= questions.len()`
//! - `answers.len() == cursor`, and `answers[i]` answers question `i`

use chrono::{DateTime, Local, Timelike};
use serde::Serialize;

use super::{AnswerRecord, CheckType, CheckinError, CheckinRecord, QuestionSet};
use crate::domain::foundation::{Timestamp, ValidationError};

/// Logical state derived from the cursor and greeting flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationPhase {
    /// Greeting not yet delivered.
    AwaitingGreeting,
    /// Waiting for the answer to question `index`.
    AwaitingAnswer { index: usize },
    /// Every question answered.
    Complete,
}

/// How empty answers are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnswerPolicy {
    /// Empty text is recorded and the flow advances (chat widget behavior).
    #[default]
    AcceptEmpty,
    /// Empty text is rejected and the state is left unchanged (form behavior).
    RejectEmpty,
}

/// Answered/total counts reported to front ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

/// One user's traversal of a question set.
#[derive(Debug, Clone)]
pub struct CheckinSession {
    user_name: String,
    check_type: CheckType,
    questions: QuestionSet,
    cursor: usize,
    greeting_shown: bool,
    answers: Vec<AnswerRecord>,
}

impl CheckinSession {
    /// Starts a session for `user_name` over `questions`.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the name is blank after trimming
    pub fn start(
        user_name: &str,
        check_type: CheckType,
        questions: QuestionSet,
    ) -> Result<Self, CheckinError> {
        let user_name = user_name.trim();
        if user_name.is_empty() {
            return Err(ValidationError::empty_field("user_name").into());
        }

        Ok(Self {
            user_name: user_name.to_string(),
            check_type,
            questions,
            cursor: 0,
            greeting_shown: false,
            answers: Vec::new(),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn check_type(&self) -> CheckType {
        self.check_type
    }

    /// Answers recorded so far, in question order.
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    pub fn phase(&self) -> ConversationPhase {
        if !self.greeting_shown {
            ConversationPhase::AwaitingGreeting
        } else if self.cursor < self.questions.len() {
            ConversationPhase::AwaitingAnswer { index: self.cursor }
        } else {
            ConversationPhase::Complete
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase() == ConversationPhase::Complete
    }

    pub fn progress(&self) -> Progress {
        let total = self.questions.len();
        Progress {
            current: self.cursor.min(total),
            total,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the next thing to show the user.
    ///
    /// The first call returns the greeting and moves to the first question.
    /// While waiting for an answer, repeated calls return the same prompt.
    /// Returns `None` once complete.
    pub fn next_prompt(&mut self) -> Option<String> {
        match self.phase() {
            ConversationPhase::AwaitingGreeting => {
                self.greeting_shown = true;
                Some(self.questions.render_greeting(&self.user_name))
            }
            ConversationPhase::AwaitingAnswer { index } => {
                self.questions.get(index).map(|q| q.prompt.clone())
            }
            ConversationPhase::Complete => None,
        }
    }

    /// Records an answer to the current question and advances.
    ///
    /// Returns `Ok(true)` when an answer was recorded and `Ok(false)` when the
    /// session was not waiting for one (before the greeting, or complete).
    ///
    /// # Errors
    ///
    /// - `InvalidInput` under [`AnswerPolicy::RejectEmpty`] when the trimmed
    ///   answer is empty
    pub fn submit_answer(&mut self, raw_text: &str, policy: AnswerPolicy) -> Result<bool, CheckinError> {
        let index = match self.phase() {
            ConversationPhase::AwaitingAnswer { index } => index,
            _ => return Ok(false),
        };

        let answer = raw_text.trim();
        if answer.is_empty() && policy == AnswerPolicy::RejectEmpty {
            return Err(ValidationError::empty_field("answer").into());
        }

        let Some(question) = self.questions.get(index) else {
            return Ok(false);
        };
        self.answers.push(AnswerRecord {
            question_id: question.id.clone(),
            label: question.label.clone(),
            answer: answer.to_string(),
            answered_at: Timestamp::now(),
        });
        self.cursor += 1;
        Ok(true)
    }

    /// Steps back to the previous question.
    ///
    /// Only valid while waiting for an answer past the first question. The
    /// previous answer is removed and returned so a form can pre-fill it.
    pub fn previous_question(&mut self) -> Option<AnswerRecord> {
        match self.phase() {
            ConversationPhase::AwaitingAnswer { index } if index > 0 => {
                self.cursor -= 1;
                self.answers.pop()
            }
            _ => None,
        }
    }

    /// Builds the immutable record of a completed session, stamped now.
    pub fn snapshot(&self) -> Result<CheckinRecord, CheckinError> {
        self.snapshot_at(Local::now())
    }

    /// Builds the record using `completed_at` as the completion date/time.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the session is not complete
    pub fn snapshot_at(&self, completed_at: DateTime<Local>) -> Result<CheckinRecord, CheckinError> {
        if !self.is_complete() {
            let progress = self.progress();
            return Err(CheckinError::invalid_state(format!(
                "check-in is not complete ({}/{} answered)",
                progress.current, progress.total
            )));
        }

        let time = completed_at.time();
        let time = time.with_nanosecond(0).unwrap_or(time);

        Ok(CheckinRecord::new(
            self.user_name.clone(),
            self.check_type,
            completed_at.date_naive(),
            time,
            self.answers.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::checkin::{Question, QuestionCatalog};
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn morning() -> QuestionSet {
        QuestionCatalog::builtin().for_kind(CheckType::Start).clone()
    }

    fn started(name: &str) -> CheckinSession {
        CheckinSession::start(name, CheckType::Start, morning()).unwrap()
    }

    fn answer_all(session: &mut CheckinSession, answers: &[&str]) {
        session.next_prompt();
        for answer in answers {
            session.submit_answer(answer, AnswerPolicy::AcceptEmpty).unwrap();
        }
    }

    #[test]
    fn start_rejects_blank_name() {
        let err = CheckinSession::start("   ", CheckType::Start, morning()).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn start_trims_name() {
        assert_eq!(started("  Ava ").user_name(), "Ava");
    }

    #[test]
    fn new_session_awaits_greeting() {
        let session = started("Ava");
        assert_eq!(session.phase(), ConversationPhase::AwaitingGreeting);
        assert_eq!(session.progress(), Progress { current: 0, total: 5 });
    }

    #[test]
    fn first_prompt_is_greeting_then_first_question() {
        let mut session = started("Ava");
        let greeting = session.next_prompt().unwrap();
        assert!(greeting.contains("Ava"));
        assert_eq!(session.phase(), ConversationPhase::AwaitingAnswer { index: 0 });

        let question = session.next_prompt().unwrap();
        assert!(question.contains("Energy Check"));
    }

    #[test]
    fn next_prompt_is_idempotent_while_awaiting_answer() {
        let mut session = started("Ava");
        session.next_prompt();
        let first = session.next_prompt();
        let second = session.next_prompt();
        assert_eq!(first, second);
        assert_eq!(session.progress().current, 0);
    }

    #[test]
    fn answers_before_greeting_are_ignored() {
        let mut session = started("Ava");
        let recorded = session.submit_answer("early", AnswerPolicy::AcceptEmpty).unwrap();
        assert!(!recorded);
        assert!(session.answers().is_empty());
        assert_eq!(session.phase(), ConversationPhase::AwaitingGreeting);
    }

    #[test]
    fn scenario_ava_completes_with_ordered_answers() {
        let mut session = started("Ava");
        let texts = ["tea", "shipped X", "ship Y", "none", "focused"];
        answer_all(&mut session, &texts);

        assert!(session.is_complete());
        assert_eq!(session.next_prompt(), None);

        let record = session.snapshot().unwrap();
        let recorded: Vec<&str> = record.answers().iter().map(|a| a.answer.as_str()).collect();
        assert_eq!(recorded, texts);
        let labels: Vec<&str> = record.answers().iter().map(|a| a.label.as_str()).collect();
        assert_eq!(
            labels,
            [
                "Energy Check",
                "Yesterday's Progress",
                "Today's Priorities",
                "Blockers",
                "State of Mind"
            ]
        );
    }

    #[test]
    fn answers_are_trimmed() {
        let mut session = started("Ava");
        session.next_prompt();
        session.submit_answer("  tea \n", AnswerPolicy::AcceptEmpty).unwrap();
        assert_eq!(session.answers()[0].answer, "tea");
    }

    #[test]
    fn empty_answer_advances_by_default() {
        let mut session = started("Ava");
        session.next_prompt();
        assert!(session.submit_answer("   ", AnswerPolicy::AcceptEmpty).unwrap());
        assert_eq!(session.answers()[0].answer, "");
        assert_eq!(session.progress().current, 1);
    }

    #[test]
    fn empty_answer_rejected_in_strict_mode() {
        let mut session = started("Ava");
        session.next_prompt();
        let err = session.submit_answer("  ", AnswerPolicy::RejectEmpty).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(session.answers().is_empty());
        assert_eq!(session.phase(), ConversationPhase::AwaitingAnswer { index: 0 });
    }

    #[test]
    fn submit_after_complete_is_noop() {
        let mut session = started("Ava");
        answer_all(&mut session, &["a", "b", "c", "d", "e"]);
        let before = session.answers().to_vec();

        let recorded = session.submit_answer("extra", AnswerPolicy::AcceptEmpty).unwrap();

        assert!(!recorded);
        assert_eq!(session.answers(), before.as_slice());
        assert_eq!(session.progress(), Progress { current: 5, total: 5 });
    }

    #[test]
    fn snapshot_before_complete_fails() {
        let mut session = started("Ava");
        answer_all(&mut session, &["a", "b"]);
        let err = session.snapshot().unwrap_err();
        assert!(matches!(err, CheckinError::InvalidState(_)));
    }

    #[test]
    fn snapshot_uses_completion_clock_with_second_precision() {
        let mut session = started("Ava");
        answer_all(&mut session, &["a", "b", "c", "d", "e"]);
        let at = Local.with_ymd_and_hms(2024, 1, 1, 8, 30, 15).unwrap();

        let record = session.snapshot_at(at).unwrap();

        assert_eq!(record.partition_key(), "2024-01-01");
        assert_eq!(record.formatted_time(), "08:30:15");
        assert_eq!(record.user_name(), "Ava");
        assert_eq!(record.check_type(), CheckType::Start);
    }

    #[test]
    fn previous_question_removes_last_answer() {
        let mut session = started("Ava");
        answer_all(&mut session, &["tea", "shipped X"]);

        let removed = session.previous_question().unwrap();

        assert_eq!(removed.answer, "shipped X");
        assert_eq!(removed.question_id, "progress_yesterday");
        assert_eq!(session.phase(), ConversationPhase::AwaitingAnswer { index: 1 });
        assert_eq!(session.answers().len(), 1);

        session.submit_answer("shipped Z", AnswerPolicy::AcceptEmpty).unwrap();
        assert_eq!(session.answers()[1].answer, "shipped Z");
    }

    #[test]
    fn previous_question_is_noop_on_first_question_and_when_complete() {
        let mut session = started("Ava");
        assert!(session.previous_question().is_none());
        session.next_prompt();
        assert!(session.previous_question().is_none());

        answer_all(&mut session, &["a", "b", "c", "d", "e"]);
        assert!(session.previous_question().is_none());
        assert!(session.is_complete());
    }

    fn check_type_strategy() -> impl Strategy<Value = CheckType> {
        prop_oneof![Just(CheckType::Start), Just(CheckType::End)]
    }

    proptest! {
        #[test]
        fn greeting_comes_exactly_once_before_questions(
            name in "[A-Za-z][A-Za-z ]{0,20}",
            kind in check_type_strategy(),
        ) {
            let set = QuestionCatalog::builtin().for_kind(kind).clone();
            let greeting = set.render_greeting(name.trim());
            let mut session = CheckinSession::start(&name, kind, set.clone()).unwrap();

            prop_assert_eq!(session.next_prompt(), Some(greeting.clone()));
            for question in set.questions() {
                let prompt = session.next_prompt();
                prop_assert_eq!(prompt.as_deref(), Some(question.prompt.as_str()));
                prop_assert_ne!(prompt, Some(greeting.clone()));
                session.submit_answer("ok", AnswerPolicy::AcceptEmpty).unwrap();
            }
            prop_assert_eq!(session.next_prompt(), None);
        }

        #[test]
        fn n_submissions_complete_the_session(
            kind in check_type_strategy(),
            answers in proptest::collection::vec(".{0,12}", 5),
        ) {
            let set = QuestionCatalog::builtin().for_kind(kind).clone();
            let total = set.len();
            let mut session = CheckinSession::start("Ava", kind, set).unwrap();
            session.next_prompt();
            for answer in &answers {
                session.submit_answer(answer, AnswerPolicy::AcceptEmpty).unwrap();
                prop_assert_eq!(session.answers().len(), session.progress().current);
            }
            prop_assert!(session.is_complete());
            prop_assert_eq!(session.progress(), Progress { current: total, total });
        }
    }
}
