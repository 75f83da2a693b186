//! Local fallback storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Fallback log configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding check-ins that could not reach the spreadsheet
    #[serde(default = "default_fallback_path")]
    pub fallback_path: PathBuf,

    /// Also write every check-in locally after a successful remote save
    #[serde(default)]
    pub always_write_local_backup: bool,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.fallback_path.as_os_str().is_empty() {
            return Err(ValidationError::EmptyFallbackPath);
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            fallback_path: default_fallback_path(),
            always_write_local_backup: false,
        }
    }
}

fn default_fallback_path() -> PathBuf {
    PathBuf::from("fallback_data.json")
}
