//! Database file initialization tests

use chrono::{TimeZone, Utc};
use payfix_common::config::database_path;
use payfix_common::db::{self, init_database};
use tempfile::TempDir;

#[tokio::test]
async fn test_init_creates_database_file() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = database_path(&temp_dir.path().join("nested"));

    assert!(!db_path.exists());
    let pool = init_database(&db_path).await.unwrap();
    assert!(db_path.exists());

    assert_eq!(db::count_exceptions(&pool).await.unwrap(), 0);
    assert_eq!(db::count_processed(&pool).await.unwrap(), 0);
    pool.close().await;
}

#[tokio::test]
async fn test_reopen_keeps_data() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = database_path(temp_dir.path());
    let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();

    {
        let pool = init_database(&db_path).await.unwrap();
        db::seed_sample_exceptions(&pool, now).await.unwrap();
        db::set_setting(&pool, "top_errors_limit", "5").await.unwrap();
        pool.close().await;
    }

    let pool = init_database(&db_path).await.unwrap();
    assert_eq!(db::count_exceptions(&pool).await.unwrap(), 2);
    // Defaults never overwrite stored settings
    assert_eq!(
        db::get_setting(&pool, "top_errors_limit").await.unwrap().as_deref(),
        Some("5")
    );
    pool.close().await;
}
