//! Google service-account credentials.

use jsonwebtoken::EncodingKey;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::Path;

use crate::ports::TabularStoreError;

/// Default OAuth token endpoint for service accounts.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The subset of a service-account key file the adapter needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    private_key: SecretString,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    /// Parses a key from its JSON text.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` if the JSON is malformed, a field is missing, or
    /// the private key is not a PEM-encoded RSA key.
    pub fn from_json(json: &str) -> Result<Self, TabularStoreError> {
        let key: ServiceAccountKey = serde_json::from_str(json)
            .map_err(|e| TabularStoreError::InvalidCredentials(e.to_string()))?;
        if key.client_email.trim().is_empty() {
            return Err(TabularStoreError::InvalidCredentials(
                "client_email is empty".to_string(),
            ));
        }
        key.encoding_key()?;
        Ok(key)
    }

    /// Reads and parses a key file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TabularStoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            TabularStoreError::NotConfigured(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// RS256 signing key built from the private key.
    pub fn encoding_key(&self) -> Result<EncodingKey, TabularStoreError> {
        EncodingKey::from_rsa_pem(self.private_key.expose_secret().as_bytes())
            .map_err(|e| TabularStoreError::InvalidCredentials(format!("private_key: {}", e)))
    }
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}
