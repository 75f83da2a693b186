//! Tabular Store Adapters
//!
//! - **GoogleSheetsStore** - Google Sheets v4 REST API with a service account
//! - **InMemoryTabularStore** - Partitions in memory (development/testing)

mod credentials;
mod google_sheets_store;
mod in_memory_tabular_store;

pub use credentials::{ServiceAccountKey, DEFAULT_TOKEN_URI};
pub use google_sheets_store::{GoogleSheetsConfig, GoogleSheetsStore};
pub use in_memory_tabular_store::InMemoryTabularStore;
