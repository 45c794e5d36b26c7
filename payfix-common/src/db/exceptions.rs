//! Exception queue
//!
//! Exceptions are transactions that failed conversion. They stay queued until
//! an operator submits a fix that passes validation (see `crate::fix`).

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::rows::{bind_transaction, transaction_from_row, TRANSACTION_COLUMNS, TRANSACTION_PLACEHOLDERS};
use crate::model::{ExceptionRecord, Transaction};
use crate::time::{from_millis, to_millis};
use crate::Result;

fn exception_from_row(row: &SqliteRow) -> Result<ExceptionRecord> {
    let last_error: Option<String> = row.try_get("last_error")?;
    let last_error = match last_error {
        Some(json) => Some(serde_json::from_str::<Vec<String>>(&json)?),
        None => None,
    };
    let last_modified_at: Option<i64> = row.try_get("last_modified_at")?;

    Ok(ExceptionRecord {
        id: row.try_get("id")?,
        transaction: transaction_from_row(row)?,
        last_error,
        last_modified_by: row.try_get("last_modified_by")?,
        last_modified_at: last_modified_at.and_then(from_millis),
    })
}

fn select_sql(filter: &str) -> String {
    format!(
        "SELECT id, {}, last_error, last_modified_by, last_modified_at FROM exceptions {}",
        TRANSACTION_COLUMNS, filter
    )
}

/// All queued exceptions, newest first
pub async fn list_exceptions(pool: &SqlitePool) -> Result<Vec<ExceptionRecord>> {
    // Records without created_at sort last
    let rows = sqlx::query(&select_sql(
        "ORDER BY created_at IS NULL, created_at DESC, id",
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(exception_from_row).collect()
}

/// One queued exception
pub async fn get_exception(pool: &SqlitePool, id: &str) -> Result<Option<ExceptionRecord>> {
    let mut conn = pool.acquire().await?;
    fetch_exception(&mut conn, id).await
}

/// Fetch on an existing connection
async fn fetch_exception(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<ExceptionRecord>> {
    let row = sqlx::query(&select_sql("WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(exception_from_row).transpose()
}

/// Queue new exceptions, returning their ids in input order
pub async fn insert_exceptions(
    pool: &SqlitePool,
    docs: &[Transaction],
) -> Result<Vec<String>> {
    let mut tx = pool.begin().await?;
    let mut ids = Vec::with_capacity(docs.len());

    let sql = format!(
        "INSERT INTO exceptions (id, {}) VALUES (?, {})",
        TRANSACTION_COLUMNS, TRANSACTION_PLACEHOLDERS
    );

    for doc in docs {
        let id = Uuid::new_v4().to_string();
        let query = sqlx::query(&sql).bind(id.clone());
        bind_transaction(query, doc)?.execute(&mut *tx).await?;
        ids.push(id);
    }

    tx.commit().await?;
    Ok(ids)
}

/// Record a rejected fix on the exception; it stays queued
pub async fn record_failed_fix(
    pool: &SqlitePool,
    id: &str,
    errors: &[String],
    operator: &str,
    at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        "UPDATE exceptions SET last_error = ?, last_modified_by = ?, last_modified_at = ? WHERE id = ?",
    )
    .bind(serde_json::to_string(errors)?)
    .bind(operator)
    .bind(to_millis(at))
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Remove an exception from the queue, returning it
///
/// `None` when no such exception is queued.
pub(crate) async fn take_exception(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<ExceptionRecord>> {
    let sql = format!(
        "DELETE FROM exceptions WHERE id = ? RETURNING id, {}, last_error, last_modified_by, last_modified_at",
        TRANSACTION_COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(exception_from_row).transpose()
}

/// Number of queued exceptions
pub async fn count_exceptions(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM exceptions")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
