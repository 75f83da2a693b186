//! Integration tests for the persistence gateway over the JSON fallback file.

use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;

use daily_checkin::adapters::sheets::InMemoryTabularStore;
use daily_checkin::adapters::storage::JsonFileFallbackLog;
use daily_checkin::application::{GatewayOptions, PersistenceGateway, SaveOutcome};
use daily_checkin::domain::checkin::{AnswerRecord, CheckType, CheckinRecord};
use daily_checkin::domain::foundation::Timestamp;
use daily_checkin::ports::{FallbackLog, TabularStore, TabularStoreError};

fn record(name: &str) -> CheckinRecord {
    let answers = vec![
        AnswerRecord {
            question_id: "wins".to_string(),
            label: "Today's Wins".to_string(),
            answer: "Fixed the build".to_string(),
            answered_at: Timestamp::now(),
        },
        AnswerRecord {
            question_id: "mood_check".to_string(),
            label: "Ending Mood".to_string(),
            answer: String::new(),
            answered_at: Timestamp::now(),
        },
    ];
    CheckinRecord::new(
        name,
        CheckType::End,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveTime::from_hms_opt(17, 45, 3).unwrap(),
        answers,
    )
}

#[tokio::test]
async fn unreachable_remote_writes_identical_record_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let log = Arc::new(JsonFileFallbackLog::new(dir.path().join("fallback_data.json")));
    let store: Arc<dyn TabularStore> = Arc::new(InMemoryTabularStore::failing(
        TabularStoreError::Connectivity("no route to host".to_string()),
    ));
    let gateway = PersistenceGateway::connect(Ok(store), log.clone(), GatewayOptions::default()).await;
    assert!(gateway.is_degraded());

    let original = record("Ava");
    assert_eq!(gateway.save(&original).await.unwrap(), SaveOutcome::Fallback);

    let entries = log.read_all().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].record, original);
}

#[tokio::test]
async fn concurrent_saves_on_degraded_gateway_are_both_kept() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fallback_data.json");
    let log = Arc::new(JsonFileFallbackLog::new(&path));
    let gateway = Arc::new(PersistenceGateway::degraded(log.clone(), GatewayOptions::default()));

    let handles: Vec<_> = ["Ava", "Ben"]
        .into_iter()
        .map(|name| {
            let gateway = gateway.clone();
            tokio::spawn(async move { gateway.save(&record(name)).await })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), SaveOutcome::Fallback);
    }

    let mut names: Vec<String> = log
        .read_all()
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.record.user_name().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Ava", "Ben"]);

    // The file on disk is a single JSON array.
    let raw = std::fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unwritable_fallback_surfaces_error() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the file should be makes every write fail.
    let log = Arc::new(JsonFileFallbackLog::new(dir.path()));
    let gateway = PersistenceGateway::degraded(log, GatewayOptions::default());

    let err = gateway.save(&record("Ava")).await.unwrap_err();
    assert_eq!(err.code().to_string(), "PERSISTENCE_FAILED");
}
