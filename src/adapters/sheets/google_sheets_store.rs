//! Google Sheets Store - Implementation of TabularStore over the Sheets v4 REST API.
//!
//! Each partition is one worksheet titled with the partition key.
//!
//! # Authentication
//!
//! Uses a service account: an RS256-signed JWT is exchanged at the key's
//! token URI for a bearer token, which is cached until shortly before it
//! expires.
//!
//! # Configuration
//!
//! ```ignore
//! let key = ServiceAccountKey::from_file("credentials.json")?;
//! let config = GoogleSheetsConfig::new("1AbC...spreadsheet-id", key)
//!     .with_timeout(Duration::from_secs(10));
//!
//! let store = GoogleSheetsStore::new(config)?;
//! ```

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, Header};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tokio::sync::Mutex;

use super::credentials::ServiceAccountKey;
use crate::domain::foundation::Timestamp;
use crate::ports::{Partition, TabularStore, TabularStoreError};

/// OAuth scope granting read/write access to spreadsheets.
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for the signed assertion.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens this close to expiry are refreshed before use.
const TOKEN_REFRESH_MARGIN_SECS: u64 = 60;

/// Size of a newly created worksheet.
const NEW_SHEET_ROWS: u32 = 100;
const NEW_SHEET_COLUMNS: u32 = 20;

/// Configuration for the Google Sheets store.
#[derive(Debug, Clone)]
pub struct GoogleSheetsConfig {
    pub spreadsheet_id: String,
    pub credentials: ServiceAccountKey,
    /// Base URL for the API (default: https://sheets.googleapis.com).
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl GoogleSheetsConfig {
    pub fn new(spreadsheet_id: impl Into<String>, credentials: ServiceAccountKey) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            credentials,
            base_url: "https://sheets.googleapis.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Builds Sheets API URLs for one spreadsheet.
#[derive(Debug, Clone)]
struct SheetsEndpoints {
    base: Url,
    spreadsheet_id: String,
}

impl SheetsEndpoints {
    fn new(base_url: &str, spreadsheet_id: &str) -> Result<Self, TabularStoreError> {
        let base = Url::parse(base_url)
            .map_err(|e| TabularStoreError::NotConfigured(format!("api base url: {}", e)))?;
        if base.cannot_be_a_base() {
            return Err(TabularStoreError::NotConfigured(format!(
                "api base url cannot be a base: {}",
                base_url
            )));
        }
        if spreadsheet_id.trim().is_empty() {
            return Err(TabularStoreError::NotConfigured("spreadsheet id is empty".to_string()));
        }
        Ok(Self {
            base,
            spreadsheet_id: spreadsheet_id.to_string(),
        })
    }

    fn with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `GET` spreadsheet metadata.
    fn spreadsheet(&self) -> Url {
        self.with_segments(&["v4", "spreadsheets", &self.spreadsheet_id])
    }

    /// `POST` structural updates (adding sheets).
    fn batch_update(&self) -> Url {
        let target = format!("{}:batchUpdate", self.spreadsheet_id);
        self.with_segments(&["v4", "spreadsheets", &target])
    }

    /// `GET` a range of values.
    fn values(&self, range: &str) -> Url {
        self.with_segments(&["v4", "spreadsheets", &self.spreadsheet_id, "values", range])
    }

    /// `POST` rows after the last row of a range.
    fn append(&self, range: &str) -> Url {
        let target = format!("{}:append", range);
        self.with_segments(&["v4", "spreadsheets", &self.spreadsheet_id, "values", &target])
    }
}

/// Quotes a sheet title for use in A1 notation.
fn quote_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Maps an unsuccessful HTTP status to a store error.
fn classify_status(status: StatusCode, body: &str) -> TabularStoreError {
    let message = format!("HTTP {}: {}", status.as_u16(), body.trim());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TabularStoreError::Unauthorized(message),
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => TabularStoreError::Structural(message),
        _ => TabularStoreError::Connectivity(message),
    }
}

fn map_transport_error(err: reqwest::Error) -> TabularStoreError {
    TabularStoreError::Connectivity(err.to_string())
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Timestamp,
}

#[derive(Debug, Default, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl ValueRange {
    /// First row as strings.
    fn first_row(self) -> Vec<String> {
        self.values
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|cell| match cell {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect()
    }
}

/// Tabular store backed by a Google spreadsheet.
pub struct GoogleSheetsStore {
    credentials: ServiceAccountKey,
    endpoints: SheetsEndpoints,
    client: Client,
    token: Mutex<Option<CachedToken>>,
}

impl GoogleSheetsStore {
    /// Creates a store for the configured spreadsheet.
    ///
    /// No network call is made here; see [`TabularStore::handshake`].
    ///
    /// # Errors
    ///
    /// - `NotConfigured` for an empty spreadsheet id or unusable base URL
    /// - `InvalidCredentials` if the private key cannot be used for signing
    pub fn new(config: GoogleSheetsConfig) -> Result<Self, TabularStoreError> {
        let endpoints = SheetsEndpoints::new(&config.base_url, &config.spreadsheet_id)?;
        config.credentials.encoding_key()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(map_transport_error)?;

        Ok(Self {
            credentials: config.credentials,
            endpoints,
            client,
            token: Mutex::new(None),
        })
    }

    /// Returns a valid bearer token, fetching a new one when needed.
    async fn access_token(&self) -> Result<String, TabularStoreError> {
        let mut cached = self.token.lock().await;
        let refresh_after = Timestamp::now().plus_secs(TOKEN_REFRESH_MARGIN_SECS);
        if let Some(token) = cached.as_ref() {
            if refresh_after.is_before(&token.expires_at) {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.fetch_token().await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    async fn fetch_token(&self) -> Result<CachedToken, TabularStoreError> {
        let now = Timestamp::now();
        let iat = now.as_datetime().timestamp();
        let claims = AssertionClaims {
            iss: &self.credentials.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.credentials.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        let assertion = jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.credentials.encoding_key()?,
        )
        .map_err(|e| TabularStoreError::InvalidCredentials(e.to_string()))?;

        tracing::debug!(token_uri = %self.credentials.token_uri, "Requesting spreadsheet access token");

        let response = self
            .client
            .post(&self.credentials.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    TabularStoreError::Unauthorized(format!("token exchange rejected: {}", body.trim()))
                }
                _ => classify_status(status, &body),
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| TabularStoreError::Connectivity(format!("token response: {}", e)))?;

        Ok(CachedToken {
            value: token.access_token,
            expires_at: now.plus_secs(token.expires_in),
        })
    }

    /// Sends an authorized request and rejects unsuccessful statuses.
    async fn send(&self, request: RequestBuilder) -> Result<Response, TabularStoreError> {
        let token = self.access_token().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(classify_status(status, &body))
        }
    }

    async fn sheet_titles(&self) -> Result<Vec<String>, TabularStoreError> {
        let request = self
            .client
            .get(self.endpoints.spreadsheet())
            .query(&[("fields", "sheets.properties.title")]);
        let meta: SpreadsheetMeta = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| TabularStoreError::Structural(format!("spreadsheet metadata: {}", e)))?;
        Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
    }

    async fn header_row(&self, key: &str) -> Result<Vec<String>, TabularStoreError> {
        let range = format!("{}!1:1", quote_title(key));
        let request = self.client.get(self.endpoints.values(&range));
        let values: ValueRange = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| TabularStoreError::Structural(format!("header row: {}", e)))?;
        Ok(values.first_row())
    }

    async fn append_values(&self, key: &str, row: &[String]) -> Result<(), TabularStoreError> {
        let range = format!("{}!A1", quote_title(key));
        let request = self
            .client
            .post(self.endpoints.append(&range))
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&json!({ "values": [row] }));
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl TabularStore for GoogleSheetsStore {
    async fn handshake(&self) -> Result<(), TabularStoreError> {
        let request = self
            .client
            .get(self.endpoints.spreadsheet())
            .query(&[("fields", "spreadsheetId")]);
        self.send(request).await?;
        tracing::debug!(spreadsheet = %self.endpoints.spreadsheet_id, "Spreadsheet reachable");
        Ok(())
    }

    async fn find_partition(&self, key: &str) -> Result<Option<Partition>, TabularStoreError> {
        let titles = self.sheet_titles().await?;
        if !titles.iter().any(|t| t == key) {
            return Ok(None);
        }
        let header = self.header_row(key).await?;
        Ok(Some(Partition {
            key: key.to_string(),
            header,
        }))
    }

    async fn create_partition(
        &self,
        key: &str,
        header: &[String],
    ) -> Result<Partition, TabularStoreError> {
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": key,
                        "gridProperties": {
                            "rowCount": NEW_SHEET_ROWS,
                            "columnCount": NEW_SHEET_COLUMNS,
                        }
                    }
                }
            }]
        });
        let request = self.client.post(self.endpoints.batch_update()).json(&body);
        self.send(request).await?;
        tracing::debug!(sheet = key, "Created worksheet");

        self.append_values(key, header).await?;
        Ok(Partition {
            key: key.to_string(),
            header: header.to_vec(),
        })
    }

    async fn append_row(&self, partition: &Partition, row: &[String]) -> Result<(), TabularStoreError> {
        self.append_values(&partition.key, row).await
    }

    fn name(&self) -> &'static str {
        "google_sheets"
    }
}
