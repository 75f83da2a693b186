//! In-Memory Fallback Log Adapter
//!
//! Keeps fallback entries in memory. Useful for testing and development,
//! including simulating a local write failure.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::checkin::CheckinRecord;
use crate::ports::{FallbackEntry, FallbackLog, FallbackLogError};

/// In-memory fallback log
#[derive(Debug, Clone, Default)]
pub struct InMemoryFallbackLog {
    entries: Arc<RwLock<Vec<FallbackEntry>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryFallbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log whose writes always fail, as if the disk were full.
    pub fn failing() -> Self {
        let log = Self::new();
        log.set_failing(true);
        log
    }

    /// Turn write failures on or off.
    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    /// Number of stored entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl FallbackLog for InMemoryFallbackLog {
    async fn append_record(&self, record: &CheckinRecord) -> Result<(), FallbackLogError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(FallbackLogError::IoError("simulated write failure".to_string()));
        }
        self.entries.write().await.push(FallbackEntry::new(record.clone()));
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<FallbackEntry>, FallbackLogError> {
        Ok(self.entries.read().await.clone())
    }
}
