//! Fallback Log Port - Interface for the local durable record log.
//!
//! The fallback log is the last durability path. A failure here means the
//! record could not be stored anywhere, so it is surfaced to the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::checkin::{CheckinError, CheckinRecord};
use crate::domain::foundation::Timestamp;

/// Errors that can occur while writing or reading the fallback log.
#[derive(Debug, thiserror::Error)]
pub enum FallbackLogError {
    #[error("Failed to serialize log: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize log: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<FallbackLogError> for CheckinError {
    fn from(err: FallbackLogError) -> Self {
        CheckinError::fallback_write_failed(err.to_string())
    }
}

/// One entry of the fallback log: the full record plus when it was logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackEntry {
    #[serde(flatten)]
    pub record: CheckinRecord,
    pub logged_at: Timestamp,
}

impl FallbackEntry {
    pub fn new(record: CheckinRecord) -> Self {
        Self {
            record,
            logged_at: Timestamp::now(),
        }
    }
}

/// Port for the local append-only record log.
#[async_trait]
pub trait FallbackLog: Send + Sync {
    /// Appends one record.
    ///
    /// Implementations must serialize concurrent writers so no entry is lost.
    ///
    /// # Errors
    /// Returns `FallbackLogError` if the record could not be made durable
    async fn append_record(&self, record: &CheckinRecord) -> Result<(), FallbackLogError>;

    /// Reads every entry in write order.
    async fn read_all(&self) -> Result<Vec<FallbackEntry>, FallbackLogError>;
}
