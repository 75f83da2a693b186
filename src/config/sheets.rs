//! Spreadsheet (remote tabular store) configuration

use secrecy::SecretString;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;

/// Remote store configuration
///
/// Missing credentials are not a validation error: the service still runs
/// and saves every check-in to the fallback log.
#[derive(Debug, Clone, Deserialize)]
pub struct SheetsConfig {
    /// Which remote store to use
    #[serde(default)]
    pub provider: SheetsProvider,

    /// Inline service-account key JSON
    pub credentials_json: Option<SecretString>,

    /// Path to a service-account key file (used when no inline JSON is set)
    pub credentials_file: Option<PathBuf>,

    /// Target spreadsheet id
    pub spreadsheet_id: Option<String>,

    /// Sheets API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Bound on the connect handshake and each save, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Remote store implementation
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SheetsProvider {
    /// Google Sheets over the REST API
    #[default]
    Google,
    /// In-process store, for local development
    Memory,
    /// No remote store; fallback log only
    Disabled,
}

impl SheetsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Spreadsheet id, if set and non-blank
    pub fn spreadsheet_id(&self) -> Option<&str> {
        self.spreadsheet_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials_json.is_some() || self.credentials_file.is_some()
    }

    /// Validate spreadsheet configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ValidationError::InvalidSheetsTimeout);
        }
        if !(self.api_base_url.starts_with("https://") || self.api_base_url.starts_with("http://")) {
            return Err(ValidationError::InvalidApiBaseUrl);
        }
        Ok(())
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            provider: SheetsProvider::default(),
            credentials_json: None,
            credentials_file: None,
            spreadsheet_id: None,
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_timeout() -> u64 {
    10
}
