//! Tabular Store Port - Interface for the remote spreadsheet.
//!
//! The store is organised in partitions (one sheet per calendar day). The
//! persistence gateway only needs to find a partition, create one with a
//! header row, and append rows to it.

use async_trait::async_trait;

/// Errors returned by a tabular store.
///
/// Every variant counts as "remote unavailable" to the persistence gateway.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TabularStoreError {
    #[error("Remote store not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Connection failed: {0}")]
    Connectivity(String),

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Structural error: {0}")]
    Structural(String),

    #[error("Timed out after {0}s")]
    Timeout(u64),
}

/// Handle to one partition (worksheet) of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Partition key, e.g. `2024-01-01`.
    pub key: String,
    /// First row of the partition as currently stored.
    pub header: Vec<String>,
}

/// Port for the remote tabular store.
#[async_trait]
pub trait TabularStore: Send + Sync {
    /// Verifies the store is reachable and the target exists.
    ///
    /// Called once when the persistence gateway is constructed.
    async fn handshake(&self) -> Result<(), TabularStoreError>;

    /// Looks up a partition by key.
    ///
    /// # Returns
    /// `None` if no partition with this key exists
    async fn find_partition(&self, key: &str) -> Result<Option<Partition>, TabularStoreError>;

    /// Creates a partition and writes `header` as its first row.
    async fn create_partition(
        &self,
        key: &str,
        header: &[String],
    ) -> Result<Partition, TabularStoreError>;

    /// Appends one row to the end of a partition.
    async fn append_row(&self, partition: &Partition, row: &[String])
        -> Result<(), TabularStoreError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}
