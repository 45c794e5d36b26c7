//! Integration tests for the document store and the correct-and-resubmit workflow
//!
//! Tests cover:
//! - Exception queue ordering and round trip of document fields
//! - Rejected fixes (recorded on the exception, which stays queued)
//! - Accepted fixes (moved to processed, audited, removed from the queue)
//! - Concurrent fixes on an on-disk database
//! - Operator accounts and settings

use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Map, Value};
use payfix_common::db::{self, init_database, init_memory_database};
use payfix_common::fix::{fix_transaction, FixOutcome};
use payfix_common::{Error, Transaction};

fn edits(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("edits must be an object")
}

// =============================================================================
// Exception Queue
// =============================================================================

#[tokio::test]
async fn test_list_exceptions_newest_first() {
    let pool = init_memory_database().await.unwrap();
    let base = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();

    let docs = vec![
        Transaction {
            sender: Some("OLD".to_string()),
            created_at: Some(base - Duration::days(2)),
            ..Default::default()
        },
        Transaction {
            sender: Some("UNDATED".to_string()),
            ..Default::default()
        },
        Transaction {
            sender: Some("NEW".to_string()),
            created_at: Some(base),
            ..Default::default()
        },
    ];
    db::insert_exceptions(&pool, &docs).await.unwrap();

    let listed = db::list_exceptions(&pool).await.unwrap();
    let senders: Vec<&str> = listed
        .iter()
        .map(|r| r.transaction.sender.as_deref().unwrap())
        .collect();

    assert_eq!(senders, vec!["NEW", "OLD", "UNDATED"]);
}

#[tokio::test]
async fn test_document_fields_round_trip() {
    let pool = init_memory_database().await.unwrap();
    let created = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();

    let mut doc = Transaction {
        message_type: Some("MT202".to_string()),
        amount: Some("1500.25".to_string()),
        created_at: Some(created),
        ..Default::default()
    };
    doc.extra.insert("uetr".to_string(), json!("eb6305c9-1f7f-49de-aed0-16487c27b42d"));

    let ids = db::insert_exceptions(&pool, &[doc.clone()]).await.unwrap();
    let stored = db::get_exception(&pool, &ids[0]).await.unwrap().unwrap();

    assert_eq!(stored.id, ids[0]);
    assert_eq!(stored.transaction, doc);
    assert!(stored.last_error.is_none());
}

#[tokio::test]
async fn test_get_unknown_exception() {
    let pool = init_memory_database().await.unwrap();
    assert!(db::get_exception(&pool, "missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_seed_inserts_two_samples() {
    let pool = init_memory_database().await.unwrap();
    let inserted = db::seed_sample_exceptions(&pool, Utc::now()).await.unwrap();

    assert_eq!(inserted, 2);
    assert_eq!(db::count_exceptions(&pool).await.unwrap(), 2);
}

// =============================================================================
// Correct and Resubmit
// =============================================================================

#[tokio::test]
async fn test_rejected_fix_stays_queued() {
    let pool = init_memory_database().await.unwrap();
    // Whole seconds: the store keeps millisecond precision
    let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
    let samples = db::sample_exceptions(now);
    let ids = db::insert_exceptions(&pool, &samples[1..]).await.unwrap();

    let outcome = fix_transaction(&pool, &ids[0], "operator1", &edits(json!({})), now)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        FixOutcome::Rejected(vec![
            "Beneficiary name empty".to_string(),
            "Amount must be positive".to_string(),
        ])
    );

    let stored = db::get_exception(&pool, &ids[0]).await.unwrap().unwrap();
    assert_eq!(
        stored.last_error,
        Some(vec![
            "Beneficiary name empty".to_string(),
            "Amount must be positive".to_string(),
        ])
    );
    assert_eq!(stored.last_modified_by.as_deref(), Some("operator1"));
    assert!(stored.last_modified_at.is_some());

    // Rejected edits are not applied to the stored document
    assert_eq!(stored.transaction, samples[1]);
    assert_eq!(db::count_processed(&pool).await.unwrap(), 0);
    assert!(db::list_audit(&pool, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_accepted_fix_moves_to_processed() {
    let pool = init_memory_database().await.unwrap();
    let created = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
    let now = created + Duration::hours(2);
    let ids = db::insert_exceptions(&pool, &db::sample_exceptions(created))
        .await
        .unwrap();

    let outcome = fix_transaction(
        &pool,
        &ids[0],
        "operator1",
        &edits(json!({"beneficiary_name": "Johnathan Williams"})),
        now,
    )
    .await
    .unwrap();

    let FixOutcome::Processed { processed_id } = outcome else {
        panic!("expected processed outcome, got {:?}", outcome);
    };

    // Removed from the queue; the other sample remains
    assert!(db::get_exception(&pool, &ids[0]).await.unwrap().is_none());
    assert_eq!(db::count_exceptions(&pool).await.unwrap(), 1);

    let processed = db::list_processed(&pool).await.unwrap();
    assert_eq!(processed.len(), 1);
    let record = &processed[0];
    assert_eq!(record.id, processed_id);
    assert_eq!(record.source_id.as_deref(), Some(ids[0].as_str()));
    assert_eq!(record.processed_by, "operator1");
    assert_eq!(record.processed_at, now);
    assert_eq!(record.transaction.created_at, Some(created));
    assert_eq!(
        record.transaction.beneficiary_name.as_deref(),
        Some("Johnathan Williams")
    );
    assert_eq!(
        record.transaction.error.as_deref(),
        Some("Field 59 truncated when converting to MX")
    );

    let audit = db::list_audit(&pool, Some(&ids[0])).await.unwrap();
    assert_eq!(audit.len(), 1);
    let entry = &audit[0];
    assert_eq!(entry.operator, "operator1");
    assert_eq!(entry.timestamp, now);
    assert_eq!(entry.before["beneficiary_name"], "Johnathan Will...");
    assert_eq!(entry.after["beneficiary_name"], "Johnathan Williams");
    assert_eq!(entry.after["processed_by"], "operator1");
    assert!(entry.before.get("_id").is_none());
    assert!(entry.after.get("_id").is_none());
}

#[tokio::test]
async fn test_fix_after_rejection_succeeds() {
    let pool = init_memory_database().await.unwrap();
    let now = Utc::now();
    let ids = db::insert_exceptions(&pool, &db::sample_exceptions(now)[1..])
        .await
        .unwrap();

    let first = fix_transaction(&pool, &ids[0], "operator1", &edits(json!({"amount": "100"})), now)
        .await
        .unwrap();
    assert_eq!(
        first,
        FixOutcome::Rejected(vec!["Beneficiary name empty".to_string()])
    );

    let second = fix_transaction(
        &pool,
        &ids[0],
        "operator2",
        &edits(json!({"amount": 100, "beneficiary_name": "Acme Ltd"})),
        now,
    )
    .await
    .unwrap();
    assert!(matches!(second, FixOutcome::Processed { .. }));

    let processed = db::list_processed(&pool).await.unwrap();
    assert_eq!(processed[0].processed_by, "operator2");
    assert_eq!(processed[0].transaction.amount.as_deref(), Some("100"));

    // The audit trail keeps the earlier rejection
    let audit = db::list_audit(&pool, Some(&ids[0])).await.unwrap();
    assert_eq!(audit.len(), 1);
    let before = &audit[0].before;
    assert_eq!(before["last_error"], json!(["Beneficiary name empty"]));
    assert_eq!(before["last_modified_by"], "operator1");
    assert!(before.get("last_modified_at").is_some());
    assert!(before.get("_id").is_none());
}

#[tokio::test]
async fn test_fix_preserves_extra_fields() {
    let pool = init_memory_database().await.unwrap();
    let mut doc = db::sample_exceptions(Utc::now()).remove(0);
    doc.extra.insert("uetr".to_string(), json!("abc-123"));
    let ids = db::insert_exceptions(&pool, &[doc]).await.unwrap();

    let outcome = fix_transaction(
        &pool,
        &ids[0],
        "operator1",
        &edits(json!({"remittance_info": "INV 42"})),
        Utc::now(),
    )
    .await
    .unwrap();
    assert!(matches!(outcome, FixOutcome::Processed { .. }));

    let processed = db::list_processed(&pool).await.unwrap();
    let extra = &processed[0].transaction.extra;
    assert_eq!(extra.get("uetr"), Some(&json!("abc-123")));
    assert_eq!(extra.get("remittance_info"), Some(&json!("INV 42")));
}

#[tokio::test]
async fn test_fix_unknown_id() {
    let pool = init_memory_database().await.unwrap();

    let result = fix_transaction(&pool, "missing", "operator1", &edits(json!({})), Utc::now()).await;

    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_fix_with_wrong_field_type_leaves_exception_untouched() {
    let pool = init_memory_database().await.unwrap();
    let ids = db::insert_exceptions(&pool, &db::sample_exceptions(Utc::now()))
        .await
        .unwrap();

    let result = fix_transaction(
        &pool,
        &ids[0],
        "operator1",
        &edits(json!({"sender": ["not", "a", "string"]})),
        Utc::now(),
    )
    .await;

    assert!(matches!(result, Err(Error::InvalidInput(_))));

    let stored = db::get_exception(&pool, &ids[0]).await.unwrap().unwrap();
    assert!(stored.last_error.is_none());
    assert_eq!(db::count_exceptions(&pool).await.unwrap(), 2);
}

// =============================================================================
// Accounts and Settings
// =============================================================================

#[tokio::test]
async fn test_create_and_find_user() {
    let pool = init_memory_database().await.unwrap();

    let user = db::create_user(&pool, "Operator One", "operator1", "password1")
        .await
        .unwrap();
    assert_ne!(user.password_hash, "password1");

    let found = db::find_user_by_username(&pool, "operator1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found, user);
    assert!(payfix_common::auth::verify_password(
        "password1",
        &found.password_salt,
        &found.password_hash
    ));

    assert!(db::find_user_by_username(&pool, "nobody")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let pool = init_memory_database().await.unwrap();

    db::create_user(&pool, "A", "operator1", "password1").await.unwrap();
    let result = db::create_user(&pool, "B", "operator1", "password2").await;

    assert!(matches!(result, Err(Error::Conflict(_))));
}

#[tokio::test]
async fn test_default_settings_initialized() {
    let pool = init_memory_database().await.unwrap();

    assert_eq!(
        db::get_setting(&pool, "top_errors_limit").await.unwrap().as_deref(),
        Some("10")
    );
    assert_eq!(
        db::get_setting_i64(&pool, "top_errors_limit", 0).await.unwrap(),
        10
    );
    assert_eq!(db::get_setting(&pool, "missing").await.unwrap(), None);
}

#[tokio::test]
async fn test_token_secret_generated_once() {
    let pool = init_memory_database().await.unwrap();

    let first = payfix_common::auth::load_token_secret(&pool).await.unwrap();
    let second = payfix_common::auth::load_token_secret(&pool).await.unwrap();

    assert_eq!(first.len(), 64);
    assert_eq!(first, second);
}

// =============================================================================
// Concurrent Fixes
// =============================================================================

fn valid_exception(n: usize) -> Transaction {
    Transaction {
        beneficiary_name: Some(format!("Beneficiary {}", n)),
        amount: Some("100".to_string()),
        created_at: Some(Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()),
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_fixes_of_different_exceptions() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("payfix.db")).await.unwrap();

    for round in 0..10 {
        let docs: Vec<Transaction> = (0..4).map(|n| valid_exception(round * 4 + n)).collect();
        let ids = db::insert_exceptions(&pool, &docs).await.unwrap();

        let handles: Vec<_> = ids
            .into_iter()
            .map(|id| {
                let pool = pool.clone();
                tokio::spawn(async move {
                    fix_transaction(&pool, &id, "operator1", &Map::new(), Utc::now()).await
                })
            })
            .collect();

        for handle in handles {
            let outcome = handle.await.unwrap().unwrap();
            assert!(matches!(outcome, FixOutcome::Processed { .. }));
        }
    }

    assert_eq!(db::count_exceptions(&pool).await.unwrap(), 0);
    assert_eq!(db::list_processed(&pool).await.unwrap().len(), 40);
    assert_eq!(db::list_audit(&pool, None).await.unwrap().len(), 40);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_fixes_of_same_exception() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("payfix.db")).await.unwrap();

    for round in 0..10 {
        let ids = db::insert_exceptions(&pool, &[valid_exception(round)])
            .await
            .unwrap();

        let handles: Vec<_> = (0..4)
            .map(|n| {
                let pool = pool.clone();
                let id = ids[0].clone();
                tokio::spawn(async move {
                    let operator = format!("operator{}", n);
                    fix_transaction(&pool, &id, &operator, &Map::new(), Utc::now()).await
                })
            })
            .collect();

        let mut processed = 0;
        let mut not_found = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(FixOutcome::Processed { .. }) => processed += 1,
                Err(Error::NotFound(_)) => not_found += 1,
                other => panic!("unexpected fix result: {:?}", other),
            }
        }
        assert_eq!(processed, 1);
        assert_eq!(not_found, 3);

        let audit = db::list_audit(&pool, Some(&ids[0])).await.unwrap();
        assert_eq!(audit.len(), 1);
    }

    assert_eq!(db::list_processed(&pool).await.unwrap().len(), 10);
}
