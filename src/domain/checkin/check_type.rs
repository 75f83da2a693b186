//! CheckType enum selecting the morning or evening flow.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Which daily check-in a session belongs to.
///
/// Selects the question set and the greeting tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CheckType {
    /// Start-of-day (morning) check-in.
    #[default]
    Start,
    /// End-of-day (evening) check-out.
    End,
}

impl CheckType {
    /// Label written to the spreadsheet's `Type` column.
    pub fn display_label(&self) -> &'static str {
        match self {
            CheckType::Start => "Morning Check-in",
            CheckType::End => "Evening Check-out",
        }
    }

    /// Wire name (`start` / `end`).
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckType::Start => "start",
            CheckType::End => "end",
        }
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CheckType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(CheckType::Start),
            "end" => Ok(CheckType::End),
            other => Err(ValidationError::invalid_format(
                "check_type",
                format!("expected 'start' or 'end', got '{}'", other),
            )),
        }
    }
}
