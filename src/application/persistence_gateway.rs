//! PersistenceGateway - records completed check-ins durably.
//!
//! The remote tabular store is the primary destination. Any remote failure
//! (connectivity, auth, structure, timeout) is absorbed here and the record
//! goes to the local fallback log instead. Only a failure of the fallback
//! log reaches the caller.
//!
//! # Modes
//!
//! - **Connected**: remote write first, fallback on failure
//! - **Degraded**: entered at construction when the store is not configured
//!   or the handshake fails; every save goes to the fallback log

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::domain::checkin::{CheckinError, CheckinRecord};
use crate::ports::{FallbackLog, Partition, TabularStore, TabularStoreError};

/// Fixed leading header columns of every partition.
pub const BASE_HEADER: [&str; 3] = ["Timestamp", "Name", "Type"];

/// Where a record ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Remote,
    Fallback,
}

impl SaveOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaveOutcome::Remote => "remote",
            SaveOutcome::Fallback => "fallback",
        }
    }
}

/// Gateway settings.
#[derive(Debug, Clone, Copy)]
pub struct GatewayOptions {
    /// Bound on the handshake and on each remote save.
    pub remote_timeout: Duration,
    /// Also write every record to the fallback log after a remote success.
    pub always_write_local_backup: bool,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            remote_timeout: Duration::from_secs(10),
            always_write_local_backup: false,
        }
    }
}

/// Durable sink for completed check-ins.
pub struct PersistenceGateway {
    remote: Option<Arc<dyn TabularStore>>,
    fallback: Arc<dyn FallbackLog>,
    options: GatewayOptions,
    // Serializes find-or-create of partitions so concurrent saves for a new
    // day do not both try to create it.
    remote_lock: Mutex<()>,
}

impl PersistenceGateway {
    /// Connects to the remote store, degrading to fallback-only on failure.
    ///
    /// `store` is the result of building the remote adapter; an `Err`
    /// (missing or malformed credentials) degrades the gateway directly.
    pub async fn connect(
        store: Result<Arc<dyn TabularStore>, TabularStoreError>,
        fallback: Arc<dyn FallbackLog>,
        options: GatewayOptions,
    ) -> Self {
        let remote = match store {
            Ok(store) => match Self::handshake(store.as_ref(), options.remote_timeout).await {
                Ok(()) => {
                    tracing::info!(store = store.name(), "Persistence gateway connected to remote store");
                    Some(store)
                }
                Err(err) => {
                    tracing::warn!(
                        store = store.name(),
                        error = %err,
                        "Remote store handshake failed; saving check-ins locally only"
                    );
                    None
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, "Remote store unavailable; saving check-ins locally only");
                None
            }
        };

        Self {
            remote,
            fallback,
            options,
            remote_lock: Mutex::new(()),
        }
    }

    /// A gateway that never contacts a remote store.
    pub fn degraded(fallback: Arc<dyn FallbackLog>, options: GatewayOptions) -> Self {
        Self {
            remote: None,
            fallback,
            options,
            remote_lock: Mutex::new(()),
        }
    }

    async fn handshake(store: &dyn TabularStore, limit: Duration) -> Result<(), TabularStoreError> {
        tokio::time::timeout(limit, store.handshake())
            .await
            .map_err(|_| TabularStoreError::Timeout(limit.as_secs()))?
    }

    pub fn is_degraded(&self) -> bool {
        self.remote.is_none()
    }

    /// Records a completed check-in.
    ///
    /// # Errors
    ///
    /// - `FallbackWriteFailed` if the record had to go to the fallback log
    ///   and that write failed
    pub async fn save(&self, record: &CheckinRecord) -> Result<SaveOutcome, CheckinError> {
        let Some(store) = self.remote.as_deref() else {
            self.write_fallback(record).await?;
            return Ok(SaveOutcome::Fallback);
        };

        match self.write_remote(store, record).await {
            Ok(()) => {
                tracing::info!(
                    partition = %record.partition_key(),
                    check_type = %record.check_type(),
                    "Check-in saved to remote store"
                );
                if self.options.always_write_local_backup {
                    if let Err(err) = self.fallback.append_record(record).await {
                        tracing::warn!(error = %err, "Local backup write failed after remote save");
                    }
                }
                Ok(SaveOutcome::Remote)
            }
            Err(err) => {
                tracing::warn!(
                    store = store.name(),
                    error = %err,
                    "Remote save failed; writing check-in to fallback log"
                );
                self.write_fallback(record).await?;
                Ok(SaveOutcome::Fallback)
            }
        }
    }

    async fn write_fallback(&self, record: &CheckinRecord) -> Result<(), CheckinError> {
        self.fallback.append_record(record).await.map_err(|err| {
            tracing::error!(error = %err, "Fallback log write failed; check-in not saved");
            CheckinError::from(err)
        })
    }

    /// Writes one row remotely within `remote_timeout`.
    ///
    /// The deadline starts once the partition lock is held, so saves queued
    /// behind a slow first save of the day are not charged for the wait.
    async fn write_remote(&self, store: &dyn TabularStore, record: &CheckinRecord) -> Result<(), TabularStoreError> {
        let key = record.partition_key();
        let header = header_row(record);
        let limit = self.options.remote_timeout;
        let timed_out = || TabularStoreError::Timeout(limit.as_secs());

        let guard = self.remote_lock.lock().await;
        let deadline = tokio::time::Instant::now() + limit;
        let partition = tokio::time::timeout_at(deadline, async {
            match store.find_partition(&key).await? {
                Some(partition) => Ok::<_, TabularStoreError>(partition),
                None => {
                    tracing::debug!(partition = %key, "Creating partition");
                    store.create_partition(&key, &header).await
                }
            }
        })
        .await
        .map_err(|_| timed_out())??;
        drop(guard);
        warn_on_header_mismatch(&partition, &header);

        tokio::time::timeout_at(deadline, store.append_row(&partition, &data_row(record)))
            .await
            .map_err(|_| timed_out())?
    }
}

/// `[Timestamp, Name, Type, <labels>]`
pub fn header_row(record: &CheckinRecord) -> Vec<String> {
    BASE_HEADER
        .iter()
        .map(|s| s.to_string())
        .chain(record.labels())
        .collect()
}

/// `[HH:MM:SS, name, type label, <answers>]`
pub fn data_row(record: &CheckinRecord) -> Vec<String> {
    [
        record.formatted_time(),
        record.user_name().to_string(),
        record.check_type().display_label().to_string(),
    ]
    .into_iter()
    .chain(record.answers().iter().map(|a| a.answer.clone()))
    .collect()
}

fn warn_on_header_mismatch(partition: &Partition, expected: &[String]) {
    if partition.header != expected {
        tracing::warn!(
            partition = %partition.key,
            existing = ?partition.header,
            incoming = ?expected,
            "Partition header differs from record labels; appending in record order"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sheets::InMemoryTabularStore;
    use crate::adapters::storage::InMemoryFallbackLog;
    use crate::domain::checkin::{AnswerRecord, CheckType};
    use crate::domain::foundation::Timestamp;
    use chrono::{NaiveDate, NaiveTime};

    fn record_on(date: NaiveDate, name: &str) -> CheckinRecord {
        let answers = [("energy_check", "Energy Check", "7"), ("blockers", "Blockers", "none")]
            .iter()
            .map(|(id, label, answer)| AnswerRecord {
                question_id: id.to_string(),
                label: label.to_string(),
                answer: answer.to_string(),
                answered_at: Timestamp::now(),
            })
            .collect();
        CheckinRecord::new(
            name,
            CheckType::Start,
            date,
            NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
            answers,
        )
    }

    fn new_year() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    async fn gateway_with(
        store: InMemoryTabularStore,
        log: InMemoryFallbackLog,
        options: GatewayOptions,
    ) -> PersistenceGateway {
        PersistenceGateway::connect(Ok(Arc::new(store)), Arc::new(log), options).await
    }

    #[test]
    fn rows_follow_record_order() {
        let record = record_on(new_year(), "Ava");
        assert_eq!(
            header_row(&record),
            vec!["Timestamp", "Name", "Type", "Energy Check", "Blockers"]
        );
        assert_eq!(
            data_row(&record),
            vec!["09:15:00", "Ava", "Morning Check-in", "7", "none"]
        );
    }

    #[tokio::test]
    async fn creates_partition_once_then_appends() {
        let store = InMemoryTabularStore::new();
        let gateway = gateway_with(store.clone(), InMemoryFallbackLog::new(), GatewayOptions::default()).await;

        let first = gateway.save(&record_on(new_year(), "Ava")).await.unwrap();
        let second = gateway.save(&record_on(new_year(), "Ben")).await.unwrap();

        assert_eq!(first, SaveOutcome::Remote);
        assert_eq!(second, SaveOutcome::Remote);
        assert_eq!(store.partitions_created(), 1);

        let rows = store.rows("2024-01-01").await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], "Timestamp");
        assert_eq!(rows[2][1], "Ben");
    }

    #[tokio::test]
    async fn remote_failure_falls_back_with_one_entry() {
        let store = InMemoryTabularStore::new();
        let log = InMemoryFallbackLog::new();
        let gateway = gateway_with(store.clone(), log.clone(), GatewayOptions::default()).await;
        assert!(!gateway.is_degraded());

        store
            .set_failure(Some(TabularStoreError::Connectivity("reset".to_string())))
            .await;
        let record = record_on(new_year(), "Ava");
        let outcome = gateway.save(&record).await.unwrap();

        assert_eq!(outcome, SaveOutcome::Fallback);
        let entries = log.read_all().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].record, record);
    }

    #[tokio::test]
    async fn failed_handshake_degrades() {
        let store = InMemoryTabularStore::failing(TabularStoreError::Unauthorized("403".to_string()));
        let log = InMemoryFallbackLog::new();
        let gateway = gateway_with(store.clone(), log.clone(), GatewayOptions::default()).await;
        assert!(gateway.is_degraded());

        // Recovery of the store does not reconnect the gateway.
        store.set_failure(None).await;
        assert_eq!(gateway.save(&record_on(new_year(), "Ava")).await.unwrap(), SaveOutcome::Fallback);
        assert_eq!(store.partition_count().await, 0);
    }

    #[tokio::test]
    async fn missing_credentials_degrade() {
        let gateway = PersistenceGateway::connect(
            Err(TabularStoreError::NotConfigured("no credentials".to_string())),
            Arc::new(InMemoryFallbackLog::new()),
            GatewayOptions::default(),
        )
        .await;
        assert!(gateway.is_degraded());
    }

    #[tokio::test]
    async fn concurrent_degraded_saves_are_both_logged() {
        let log = InMemoryFallbackLog::new();
        let gateway = PersistenceGateway::degraded(Arc::new(log.clone()), GatewayOptions::default());

        let ava = record_on(new_year(), "Ava");
        let ben = record_on(new_year(), "Ben");
        let (a, b) = futures::join!(gateway.save(&ava), gateway.save(&ben));

        assert_eq!(a.unwrap(), SaveOutcome::Fallback);
        assert_eq!(b.unwrap(), SaveOutcome::Fallback);
        assert_eq!(log.len().await, 2);
    }

    #[tokio::test]
    async fn concurrent_remote_saves_share_new_partition() {
        let store = InMemoryTabularStore::new();
        let gateway = gateway_with(store.clone(), InMemoryFallbackLog::new(), GatewayOptions::default()).await;

        let ava = record_on(new_year(), "Ava");
        let ben = record_on(new_year(), "Ben");
        let (a, b) = futures::join!(gateway.save(&ava), gateway.save(&ben));

        assert_eq!(a.unwrap(), SaveOutcome::Remote);
        assert_eq!(b.unwrap(), SaveOutcome::Remote);
        assert_eq!(store.partitions_created(), 1);
        assert_eq!(store.rows("2024-01-01").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn slow_remote_times_out_to_fallback() {
        let options = GatewayOptions {
            remote_timeout: Duration::from_millis(50),
            always_write_local_backup: false,
        };
        let log = InMemoryFallbackLog::new();
        let gateway = PersistenceGateway {
            remote: Some(Arc::new(InMemoryTabularStore::new().with_delay(Duration::from_millis(500)))),
            fallback: Arc::new(log.clone()),
            options,
            remote_lock: Mutex::new(()),
        };

        let outcome = gateway.save(&record_on(new_year(), "Ava")).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Fallback);
        assert_eq!(log.len().await, 1);
    }

    #[tokio::test]
    async fn slow_handshake_degrades() {
        let options = GatewayOptions {
            remote_timeout: Duration::from_millis(50),
            always_write_local_backup: false,
        };
        let store = InMemoryTabularStore::new().with_delay(Duration::from_millis(500));
        let gateway = gateway_with(store, InMemoryFallbackLog::new(), options).await;
        assert!(gateway.is_degraded());
    }

    #[tokio::test]
    async fn both_paths_failing_is_an_error() {
        let store = InMemoryTabularStore::new();
        let gateway = gateway_with(store.clone(), InMemoryFallbackLog::failing(), GatewayOptions::default()).await;
        store
            .set_failure(Some(TabularStoreError::Connectivity("down".to_string())))
            .await;

        let err = gateway.save(&record_on(new_year(), "Ava")).await.unwrap_err();
        assert!(matches!(err, CheckinError::FallbackWriteFailed(_)));
    }

    #[tokio::test]
    async fn remote_success_ignores_fallback_health() {
        let store = InMemoryTabularStore::new();
        let gateway = gateway_with(store, InMemoryFallbackLog::failing(), GatewayOptions::default()).await;
        assert_eq!(gateway.save(&record_on(new_year(), "Ava")).await.unwrap(), SaveOutcome::Remote);
    }

    #[tokio::test]
    async fn local_backup_is_written_after_remote_success() {
        let log = InMemoryFallbackLog::new();
        let options = GatewayOptions {
            always_write_local_backup: true,
            ..GatewayOptions::default()
        };
        let gateway = gateway_with(InMemoryTabularStore::new(), log.clone(), options).await;

        assert_eq!(gateway.save(&record_on(new_year(), "Ava")).await.unwrap(), SaveOutcome::Remote);
        assert_eq!(log.len().await, 1);
    }

    #[tokio::test]
    async fn mismatched_header_still_appends() {
        let store = InMemoryTabularStore::new();
        store
            .insert_partition("2024-01-01", vec![vec!["Timestamp".to_string(), "Name".to_string()]])
            .await;
        let gateway = gateway_with(store.clone(), InMemoryFallbackLog::new(), GatewayOptions::default()).await;

        assert_eq!(gateway.save(&record_on(new_year(), "Ava")).await.unwrap(), SaveOutcome::Remote);
        let rows = store.rows("2024-01-01").await.unwrap();
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[1].len(), 5);
        assert_eq!(store.partitions_created(), 0);
    }

    #[tokio::test]
    async fn queued_saves_are_not_timed_out_by_the_partition_lock() {
        // Each save holds the lock for two 100ms calls; the third waits ~300ms.
        let options = GatewayOptions {
            remote_timeout: Duration::from_millis(350),
            always_write_local_backup: false,
        };
        let store = InMemoryTabularStore::new().with_delay(Duration::from_millis(100));
        let log = InMemoryFallbackLog::new();
        let gateway = gateway_with(store.clone(), log.clone(), options).await;
        assert!(!gateway.is_degraded());

        let ava = record_on(new_year(), "Ava");
        let ben = record_on(new_year(), "Ben");
        let cleo = record_on(new_year(), "Cleo");
        let (a, b, c) = futures::join!(gateway.save(&ava), gateway.save(&ben), gateway.save(&cleo));

        assert_eq!(a.unwrap(), SaveOutcome::Remote);
        assert_eq!(b.unwrap(), SaveOutcome::Remote);
        assert_eq!(c.unwrap(), SaveOutcome::Remote);
        assert!(log.is_empty().await);
        assert_eq!(store.rows("2024-01-01").await.unwrap().len(), 4);
    }
}
