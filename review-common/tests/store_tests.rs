//! Integration tests for the Record Store bindings
//!
//! Tests cover:
//! - Store creation and idempotent reopen
//! - Wholesale replace semantics for every collection kind
//! - Grouping query (match / group / sort)

use chrono::NaiveDate;
use review_common::config::CollectionNames;
use review_common::db::{
    count, find_aggregates_page, find_all_aggregates, find_all_clean, find_all_raw, group_stats,
    open_store, replace_aggregates, replace_clean, replace_raw, BUSY_TIMEOUT,
};
use review_common::{AggregateRecord, CleanRecord, Dimension};
use serde_json::json;
use sqlx::SqlitePool;
use tempfile::TempDir;

async fn setup_store() -> (TempDir, SqlitePool, CollectionNames) {
    let dir = TempDir::new().expect("Should create temp dir");
    let names = CollectionNames::default();
    let pool = open_store(&dir.path().join("store.sqlite"), &names)
        .await
        .expect("Should open store");
    (dir, pool, names)
}

fn clean(city: Option<&str>, state: Option<&str>, rating: f64) -> CleanRecord {
    CleanRecord {
        city: city.map(str::to_string),
        state: state.map(str::to_string),
        rating,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_open_store_creates_database_and_reopens() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("store.sqlite");
    let names = CollectionNames::default();

    let pool = open_store(&db_path, &names).await.unwrap();
    assert!(db_path.exists(), "Database file was not created");
    for table in [&names.raw, &names.clean, &names.city, &names.state] {
        assert_eq!(count(&pool, table).await.unwrap(), 0);
    }
    pool.close().await;

    // Second open must not fail on existing tables
    let reopened = open_store(&db_path, &names).await;
    assert!(reopened.is_ok(), "Failed to reopen store: {:?}", reopened.err());
}

#[tokio::test]
async fn test_every_pooled_connection_waits_on_locks() {
    let (_dir, pool, _names) = setup_store().await;

    // Hold several connections at once so each one is a distinct handle
    let mut connections = Vec::new();
    for _ in 0..4 {
        connections.push(pool.acquire().await.expect("Should acquire connection"));
    }
    for conn in connections.iter_mut() {
        let timeout: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
            .fetch_one(&mut **conn)
            .await
            .unwrap();
        assert_eq!(timeout, BUSY_TIMEOUT.as_millis() as i64);
    }
}

#[tokio::test]
async fn test_replace_raw_discards_previous_contents() {
    let (_dir, pool, names) = setup_store().await;

    let first = vec![json!({"City": "a"}), json!({"City": "b"}), json!({"City": "c"})];
    assert_eq!(replace_raw(&pool, &names.raw, &first).await.unwrap(), 3);

    let second = vec![json!({"City": "z"}), json!([1, 2, 3])];
    assert_eq!(replace_raw(&pool, &names.raw, &second).await.unwrap(), 2);

    let stored = find_all_raw(&pool, &names.raw).await.unwrap();
    assert_eq!(stored, second, "Raw collection should hold only the latest batch, in order");
}

#[tokio::test]
async fn test_clean_records_roundtrip_through_store() {
    let (_dir, pool, names) = setup_store().await;

    let record = CleanRecord {
        id: Some(42),
        time_gmt: NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(10, 0, 0),
        phone: Some("5551234".to_string()),
        organization: Some("Joe's Diner".to_string()),
        rating: 4.5,
        number_review: 12,
        city: Some("New York".to_string()),
        state: Some("Ny".to_string()),
        ..Default::default()
    };

    replace_clean(&pool, &names.clean, &[record.clone(), CleanRecord::default()])
        .await
        .unwrap();

    let stored = find_all_clean(&pool, &names.clean).await.unwrap();
    assert_eq!(stored, vec![record, CleanRecord::default()]);
}

#[tokio::test]
async fn test_group_stats_excludes_null_and_empty_keys() {
    let (_dir, pool, names) = setup_store().await;

    let records = vec![
        clean(Some("A"), Some("X"), 4.0),
        clean(Some("A"), Some("X"), 2.0),
        clean(Some("B"), Some("Y"), 5.0),
        clean(None, Some("Y"), 1.0),
        clean(Some(""), None, 3.0),
    ];
    replace_clean(&pool, &names.clean, &records).await.unwrap();

    let cities = group_stats(&pool, &names.clean, Dimension::City).await.unwrap();
    assert_eq!(
        cities,
        vec![
            AggregateRecord { key: "A".to_string(), avg_rating: 3.0, count: 2 },
            AggregateRecord { key: "B".to_string(), avg_rating: 5.0, count: 1 },
        ]
    );

    let states = group_stats(&pool, &names.clean, Dimension::State).await.unwrap();
    assert_eq!(states.len(), 2);
    assert_eq!(states[0].key, "X");
    assert_eq!(states[1].key, "Y");
    assert_eq!(states[1].count, 2);
    assert!((states[1].avg_rating - 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_group_stats_ties_sorted_by_key() {
    let (_dir, pool, names) = setup_store().await;

    let records = vec![
        clean(Some("Zeta"), None, 1.0),
        clean(Some("Alpha"), None, 1.0),
        clean(Some("Mid"), None, 1.0),
        clean(Some("Mid"), None, 1.0),
    ];
    replace_clean(&pool, &names.clean, &records).await.unwrap();

    let keys: Vec<String> = group_stats(&pool, &names.clean, Dimension::City)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.key)
        .collect();
    assert_eq!(keys, vec!["Mid", "Alpha", "Zeta"]);
}

#[tokio::test]
async fn test_aggregates_keep_rank_order_and_page() {
    let (_dir, pool, names) = setup_store().await;

    let records: Vec<AggregateRecord> = (0..5)
        .map(|i| AggregateRecord {
            key: format!("City{}", i),
            avg_rating: 3.0,
            count: 100 - i,
        })
        .collect();
    replace_aggregates(&pool, &names.city, &records).await.unwrap();

    assert_eq!(find_all_aggregates(&pool, &names.city).await.unwrap(), records);

    let page = find_aggregates_page(&pool, &names.city, 2, 2).await.unwrap();
    assert_eq!(page, records[2..4].to_vec());

    // Empty replace clears the collection
    replace_aggregates(&pool, &names.city, &[]).await.unwrap();
    assert_eq!(count(&pool, &names.city).await.unwrap(), 0);
}

#[tokio::test]
async fn test_invalid_collection_name_is_refused() {
    let (_dir, pool, _names) = setup_store().await;
    let result = count(&pool, "yelp_raw; DROP TABLE yelp_clean").await;
    assert!(result.is_err());
}
