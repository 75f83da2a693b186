//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `TabularStore` - Remote spreadsheet organised in daily partitions
//! - `FallbackLog` - Local durable log used when the remote store fails

mod fallback_log;
mod tabular_store;

pub use fallback_log::{FallbackEntry, FallbackLog, FallbackLogError};
pub use tabular_store::{Partition, TabularStore, TabularStoreError};
