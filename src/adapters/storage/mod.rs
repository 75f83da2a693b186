//! Storage Adapters
//!
//! Implementations of the FallbackLog port.
//!
//! ## Available Adapters
//!
//! - **JsonFileFallbackLog** - One JSON array document on disk
//! - **InMemoryFallbackLog** - Entries in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{InMemoryFallbackLog, JsonFileFallbackLog};
//!
//! // Production: file-based log
//! let log = JsonFileFallbackLog::new("./fallback_data.json");
//!
//! // Testing: in-memory log
//! let log = InMemoryFallbackLog::new();
//! ```

mod in_memory_fallback_log;
mod json_file_fallback_log;

pub use in_memory_fallback_log::InMemoryFallbackLog;
pub use json_file_fallback_log::JsonFileFallbackLog;
