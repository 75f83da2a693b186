//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `sheets` - Tabular store implementations (Google Sheets, in-memory)
//! - `storage` - Fallback log implementations (JSON file, in-memory)
//! - `http` - axum JSON API for chat front ends

pub mod http;
pub mod sheets;
pub mod storage;

pub use sheets::{GoogleSheetsConfig, GoogleSheetsStore, InMemoryTabularStore, ServiceAccountKey};
pub use storage::{InMemoryFallbackLog, JsonFileFallbackLog};
