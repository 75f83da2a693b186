//! Answer and check-in records.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::CheckType;
use crate::domain::foundation::Timestamp;

/// Format of the partition key derived from a record's date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format of the time column written to the spreadsheet.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// One recorded answer.
///
/// The label is copied from the question when the answer is recorded, so
/// history never follows later edits to the question set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: String,
    pub label: String,
    pub answer: String,
    pub answered_at: Timestamp,
}

/// Immutable snapshot of a completed check-in.
///
/// This is the unit handed to persistence, both remote and fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinRecord {
    user_name: String,
    check_type: CheckType,
    date: NaiveDate,
    time: NaiveTime,
    answers: Vec<AnswerRecord>,
}

impl CheckinRecord {
    pub fn new(
        user_name: impl Into<String>,
        check_type: CheckType,
        date: NaiveDate,
        time: NaiveTime,
        answers: Vec<AnswerRecord>,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            check_type,
            date,
            time,
            answers,
        }
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn check_type(&self) -> CheckType {
        self.check_type
    }

    /// Calendar day of completion.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Time of completion.
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// Answers in question order.
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    /// Key of the daily partition this record belongs to (`YYYY-MM-DD`).
    pub fn partition_key(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    /// Completion time as written to the spreadsheet (`HH:MM:SS`).
    pub fn formatted_time(&self) -> String {
        self.time.format(TIME_FORMAT).to_string()
    }

    /// Answer labels in question order.
    pub fn labels(&self) -> Vec<String> {
        self.answers.iter().map(|a| a.label.clone()).collect()
    }
}
