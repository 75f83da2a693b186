//! JSON-file Fallback Log Adapter
//!
//! Keeps every fallback entry in one JSON array document. Each append reads
//! the whole document, pushes one entry and replaces the file, so writers are
//! serialized with an async mutex. The new document is written to a sibling
//! temporary file and renamed over the old one.

use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

use crate::domain::checkin::CheckinRecord;
use crate::ports::{FallbackEntry, FallbackLog, FallbackLogError};

/// File-backed fallback log.
///
/// One instance must own the file; two instances pointed at the same path
/// do not coordinate with each other.
#[derive(Debug)]
pub struct JsonFileFallbackLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileFallbackLog {
    /// Create a log stored at `path`.
    ///
    /// # Example
    /// ```ignore
    /// let log = JsonFileFallbackLog::new("./fallback_data.json");
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Reads the raw document. Entries written by other tools are kept as-is.
    async fn read_document(&self) -> Result<Vec<Value>, FallbackLogError> {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(FallbackLogError::IoError(e.to_string())),
        };

        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&text).map_err(|e| FallbackLogError::DeserializationFailed(e.to_string()))
    }

    async fn write_document(&self, entries: &[Value]) -> Result<(), FallbackLogError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| FallbackLogError::IoError(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| FallbackLogError::SerializationFailed(e.to_string()))?;

        let temp = self.temp_path();
        fs::write(&temp, json)
            .await
            .map_err(|e| FallbackLogError::IoError(e.to_string()))?;
        fs::rename(&temp, &self.path)
            .await
            .map_err(|e| FallbackLogError::IoError(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl FallbackLog for JsonFileFallbackLog {
    async fn append_record(&self, record: &CheckinRecord) -> Result<(), FallbackLogError> {
        let _guard = self.write_lock.lock().await;

        let entry = serde_json::to_value(FallbackEntry::new(record.clone()))
            .map_err(|e| FallbackLogError::SerializationFailed(e.to_string()))?;

        let mut entries = self.read_document().await?;
        entries.push(entry);
        self.write_document(&entries).await?;

        tracing::info!(
            path = %self.path.display(),
            user = record.user_name(),
            entries = entries.len(),
            "Check-in saved to fallback log"
        );
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<FallbackEntry>, FallbackLogError> {
        let document = self.read_document().await?;
        let total = document.len();

        let entries: Vec<FallbackEntry> = document
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect();

        if entries.len() < total {
            tracing::warn!(
                path = %self.path.display(),
                skipped = total - entries.len(),
                "Fallback log contains entries in an unrecognised format"
            );
        }
        Ok(entries)
    }
}
