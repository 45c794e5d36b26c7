//! Database initialization
//!
//! Creates the database file on first run and brings the schema up to date.
//! Every statement is idempotent; opening an existing database is safe.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// How long a writer waits for the database lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (creating if needed) the database at `db_path`
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // WAL allows concurrent readers with one writer; both settings apply to
    // every pooled connection
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// In-memory database with the full schema
///
/// Single connection: every pooled connection to `sqlite::memory:` would
/// otherwise see its own empty database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes, then default settings
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    create_settings_table(pool).await?;
    create_users_table(pool).await?;
    create_exceptions_table(pool).await?;
    create_processed_table(pool).await?;
    create_audit_logs_table(pool).await?;

    init_default_settings(pool).await?;

    Ok(())
}

/// Key-value application settings
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            password_salt TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_exceptions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS exceptions (
            id TEXT PRIMARY KEY,
            message_type TEXT,
            sender TEXT,
            receiver TEXT,
            beneficiary_name TEXT,
            iban TEXT,
            amount TEXT,
            currency TEXT,
            error TEXT,
            created_at INTEGER,
            extra TEXT NOT NULL DEFAULT '{}',
            last_error TEXT,
            last_modified_by TEXT,
            last_modified_at INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_exceptions_created_at ON exceptions(created_at)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_processed_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS processed (
            id TEXT PRIMARY KEY,
            message_type TEXT,
            sender TEXT,
            receiver TEXT,
            beneficiary_name TEXT,
            iban TEXT,
            amount TEXT,
            currency TEXT,
            error TEXT,
            created_at INTEGER,
            extra TEXT NOT NULL DEFAULT '{}',
            source_id TEXT,
            processed_at INTEGER NOT NULL,
            processed_by TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_processed_processed_at ON processed(processed_at)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_audit_logs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS audit_logs (
            id TEXT PRIMARY KEY,
            tx_id TEXT NOT NULL,
            operator TEXT NOT NULL,
            before_doc TEXT NOT NULL,
            after_doc TEXT NOT NULL,
            timestamp INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_audit_logs_tx_id ON audit_logs(tx_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Ensure required settings exist with default values
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    crate::db::ensure_setting(pool, "schema_version", "1").await?;
    crate::db::ensure_setting(pool, "top_errors_limit", "10").await?;

    info!("Default settings initialized");
    Ok(())
}
