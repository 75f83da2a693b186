//! Conversation engine configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::checkin::AnswerPolicy;

/// Longest accepted session TTL (one week).
pub const MAX_SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Longest accepted sweep interval (one day).
pub const MAX_SWEEP_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Conversation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationConfig {
    /// Idle time after which a session is discarded, in seconds
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// How often idle sessions are swept, in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Reject blank answers instead of recording them
    #[serde(default)]
    pub reject_empty_answers: bool,

    /// YAML question catalog replacing the built-in questions
    pub questions_file: Option<PathBuf>,
}

impl ConversationConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn answer_policy(&self) -> AnswerPolicy {
        if self.reject_empty_answers {
            AnswerPolicy::RejectEmpty
        } else {
            AnswerPolicy::AcceptEmpty
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.session_ttl_secs == 0 || self.session_ttl_secs > MAX_SESSION_TTL_SECS {
            return Err(ValidationError::InvalidSessionTtl);
        }
        if self.sweep_interval_secs == 0 || self.sweep_interval_secs > MAX_SWEEP_INTERVAL_SECS {
            return Err(ValidationError::InvalidSweepInterval);
        }
        Ok(())
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: default_session_ttl(),
            sweep_interval_secs: default_sweep_interval(),
            reject_empty_answers: false,
            questions_file: None,
        }
    }
}

fn default_session_ttl() -> u64 {
    1800
}

fn default_sweep_interval() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_config_defaults() {
        let config = ConversationConfig::default();
        assert_eq!(config.session_ttl(), Duration::from_secs(1800));
        assert_eq!(config.sweep_interval(), Duration::from_secs(60));
        assert_eq!(config.answer_policy(), AnswerPolicy::AcceptEmpty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_strict_answers() {
        let config = ConversationConfig {
            reject_empty_answers: true,
            ..Default::default()
        };
        assert_eq!(config.answer_policy(), AnswerPolicy::RejectEmpty);
    }

    #[test]
    fn test_zero_durations_are_invalid() {
        let config = ConversationConfig {
            session_ttl_secs: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidSessionTtl)));

        let config = ConversationConfig {
            sweep_interval_secs: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidSweepInterval)));
    }

    #[test]
    fn test_oversized_durations_are_invalid() {
        let config = ConversationConfig {
            session_ttl_secs: u64::MAX,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidSessionTtl)));

        let config = ConversationConfig {
            session_ttl_secs: MAX_SESSION_TTL_SECS,
            sweep_interval_secs: MAX_SWEEP_INTERVAL_SECS + 1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidSweepInterval)));
    }
}
