//! Question sets and the catalog that maps each check-in kind to one.
//!
//! Question sets are static configuration. A session clones the set it was
//! started with, so swapping the catalog later never changes a session (or
//! the answers it already recorded).

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use super::CheckType;
use crate::domain::foundation::ValidationError;

/// Placeholder replaced with the user's name when rendering a greeting.
pub const NAME_PLACEHOLDER: &str = "{name}";

/// One question in a check-in flow.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Question {
    /// Stable key, unique within its set.
    pub id: String,
    /// Text shown to the user.
    pub prompt: String,
    /// Column header used when the answer is written to the spreadsheet.
    pub label: String,
}

impl Question {
    pub fn new(id: impl Into<String>, prompt: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            label: label.into(),
        }
    }
}

/// Ordered, immutable list of questions plus the greeting that opens the flow.
///
/// Cloning is cheap; the questions are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    greeting: Arc<str>,
    questions: Arc<[Question]>,
}

impl QuestionSet {
    /// Builds a validated question set.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the greeting, the list, or any id/prompt/label is empty
    /// - `InvalidFormat` if two questions share an id
    pub fn new(greeting: impl Into<String>, questions: Vec<Question>) -> Result<Self, ValidationError> {
        let greeting = greeting.into();
        if greeting.trim().is_empty() {
            return Err(ValidationError::empty_field("greeting"));
        }
        if questions.is_empty() {
            return Err(ValidationError::empty_field("questions"));
        }

        let mut seen = HashSet::new();
        for question in &questions {
            if question.id.trim().is_empty() {
                return Err(ValidationError::empty_field("question.id"));
            }
            if question.prompt.trim().is_empty() {
                return Err(ValidationError::empty_field("question.prompt"));
            }
            if question.label.trim().is_empty() {
                return Err(ValidationError::empty_field("question.label"));
            }
            if !seen.insert(question.id.as_str()) {
                return Err(ValidationError::invalid_format(
                    "question.id",
                    format!("duplicate id '{}'", question.id),
                ));
            }
        }

        Ok(Self {
            greeting: greeting.into(),
            questions: questions.into(),
        })
    }

    /// Number of questions.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false for a constructed set; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Question at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// All questions in order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Greeting with the user's name substituted.
    pub fn render_greeting(&self, user_name: &str) -> String {
        self.greeting.replace(NAME_PLACEHOLDER, user_name)
    }
}

/// One question set per check-in kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionCatalog {
    start: QuestionSet,
    end: QuestionSet,
}

impl QuestionCatalog {
    pub fn new(start: QuestionSet, end: QuestionSet) -> Self {
        Self { start, end }
    }

    /// The built-in morning and evening questions.
    pub fn builtin() -> Self {
        BUILTIN_CATALOG.clone()
    }

    /// The set used for `check_type`.
    pub fn for_kind(&self, check_type: CheckType) -> &QuestionSet {
        match check_type {
            CheckType::Start => &self.start,
            CheckType::End => &self.end,
        }
    }

    /// Parses a catalog from YAML.
    ///
    /// ```yaml
    /// start:
    ///   greeting: "Good morning, {name}!"
    ///   questions:
    ///     - id: energy_check
    ///       prompt: "How is your energy?"
    ///       label: Energy Check
    /// end:
    ///   greeting: "Good evening, {name}!"
    ///   questions: [...]
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ValidationError> {
        let raw: RawCatalog = serde_yaml::from_str(yaml)
            .map_err(|e| ValidationError::invalid_format("questions_file", e.to_string()))?;
        Ok(Self {
            start: QuestionSet::new(raw.start.greeting, raw.start.questions)?,
            end: QuestionSet::new(raw.end.greeting, raw.end.questions)?,
        })
    }

    /// Reads and parses a YAML catalog file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ValidationError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::invalid_format(
                "questions_file",
                format!("cannot read {}: {}", path.display(), e),
            )
        })?;
        Self::from_yaml_str(&yaml)
    }
}

impl Default for QuestionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Deserialize)]
struct RawCatalog {
    start: RawQuestionSet,
    end: RawQuestionSet,
}

#[derive(Deserialize)]
struct RawQuestionSet {
    greeting: String,
    questions: Vec<Question>,
}

static BUILTIN_CATALOG: Lazy<QuestionCatalog> = Lazy::new(|| QuestionCatalog {
    start: QuestionSet {
        greeting: "Good morning, {name}! 🌅 Let's do your start-of-day check-in.".into(),
        questions: vec![
            Question::new(
                "energy_check",
                "0️⃣ Energy Check: What's your energy drink or vibe this morning? ☕",
                "Energy Check",
            ),
            Question::new(
                "progress_yesterday",
                "1️⃣ Progress: What key tasks did you complete yesterday? 📋",
                "Yesterday's Progress",
            ),
            Question::new(
                "today_focus",
                "2️⃣ Today's Focus: What are the top 1–3 priorities you're focusing on today? 🎯",
                "Today's Priorities",
            ),
            Question::new(
                "blockers",
                "3️⃣ Blockers: Anything slowing you down or you need help with? 🚧",
                "Blockers",
            ),
            Question::new(
                "state_of_mind",
                "4️⃣ State of Mind: One word for how you're feeling as you start the day? 💭",
                "State of Mind",
            ),
        ]
        .into(),
    },
    end: QuestionSet {
        greeting: "Good evening, {name}! 🌇 Let's wrap up your day with a quick check-out.".into(),
        questions: vec![
            Question::new(
                "wins",
                "1️⃣ Wins: What did you accomplish today (big or small)? 🎉",
                "Today's Wins",
            ),
            Question::new(
                "learnings",
                "2️⃣ Learnings: Anything new you learned or discovered? 💡",
                "Learnings",
            ),
            Question::new(
                "stuck_points",
                "3️⃣ Stuck Points: Any challenges you faced today? 🤔",
                "Challenges",
            ),
            Question::new(
                "tomorrow_prep",
                "4️⃣ Tomorrow Prep: What will be your focus tomorrow? 🔜",
                "Tomorrow's Focus",
            ),
            Question::new(
                "mood_check",
                "5️⃣ Mood Check: How are you ending the day? 🌙",
                "Ending Mood",
            ),
        ]
        .into(),
    },
});
