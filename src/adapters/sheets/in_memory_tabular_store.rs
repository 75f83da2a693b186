//! In-Memory Tabular Store Adapter
//!
//! Stores partitions as row vectors in memory. Used for development without
//! spreadsheet credentials and for tests, where it can also simulate a store
//! that fails every call or answers slowly.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::ports::{Partition, TabularStore, TabularStoreError};

/// In-memory tabular store
#[derive(Debug, Clone, Default)]
pub struct InMemoryTabularStore {
    partitions: Arc<RwLock<BTreeMap<String, Vec<Vec<String>>>>>,
    failure: Arc<RwLock<Option<TabularStoreError>>>,
    delay: Option<Duration>,
    partitions_created: Arc<AtomicUsize>,
}

impl InMemoryTabularStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store where every call fails with `error`.
    pub fn failing(error: TabularStoreError) -> Self {
        Self {
            failure: Arc::new(RwLock::new(Some(error))),
            ..Self::default()
        }
    }

    /// Delays every call by `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Makes every later call fail with `error` (or succeed again with `None`).
    pub async fn set_failure(&self, error: Option<TabularStoreError>) {
        *self.failure.write().await = error;
    }

    /// All rows of a partition, header first.
    pub async fn rows(&self, key: &str) -> Option<Vec<Vec<String>>> {
        self.partitions.read().await.get(key).cloned()
    }

    /// Number of partitions
    pub async fn partition_count(&self) -> usize {
        self.partitions.read().await.len()
    }

    /// How many times `create_partition` succeeded.
    pub fn partitions_created(&self) -> usize {
        self.partitions_created.load(Ordering::SeqCst)
    }

    /// Seeds a partition directly, bypassing the port.
    pub async fn insert_partition(&self, key: &str, rows: Vec<Vec<String>>) {
        self.partitions.write().await.insert(key.to_string(), rows);
    }

    async fn before_call(&self) -> Result<(), TabularStoreError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.failure.read().await.as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TabularStore for InMemoryTabularStore {
    async fn handshake(&self) -> Result<(), TabularStoreError> {
        self.before_call().await
    }

    async fn find_partition(&self, key: &str) -> Result<Option<Partition>, TabularStoreError> {
        self.before_call().await?;
        let partitions = self.partitions.read().await;
        Ok(partitions.get(key).map(|rows| Partition {
            key: key.to_string(),
            header: rows.first().cloned().unwrap_or_default(),
        }))
    }

    async fn create_partition(
        &self,
        key: &str,
        header: &[String],
    ) -> Result<Partition, TabularStoreError> {
        self.before_call().await?;
        let mut partitions = self.partitions.write().await;
        if partitions.contains_key(key) {
            return Err(TabularStoreError::Structural(format!(
                "A sheet with the name \"{}\" already exists",
                key
            )));
        }
        partitions.insert(key.to_string(), vec![header.to_vec()]);
        self.partitions_created.fetch_add(1, Ordering::SeqCst);
        Ok(Partition {
            key: key.to_string(),
            header: header.to_vec(),
        })
    }

    async fn append_row(&self, partition: &Partition, row: &[String]) -> Result<(), TabularStoreError> {
        self.before_call().await?;
        let mut partitions = self.partitions.write().await;
        let rows = partitions.get_mut(&partition.key).ok_or_else(|| {
            TabularStoreError::Structural(format!("Unable to parse range: '{}'", partition.key))
        })?;
        rows.push(row.to_vec());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
