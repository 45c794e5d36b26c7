//! Processed (repaired) transactions

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use super::rows::{bind_transaction, transaction_from_row, TRANSACTION_COLUMNS, TRANSACTION_PLACEHOLDERS};
use crate::model::ProcessedRecord;
use crate::time::{from_millis, to_millis};
use crate::{Error, Result};

fn processed_from_row(row: &SqliteRow) -> Result<ProcessedRecord> {
    let processed_at: i64 = row.try_get("processed_at")?;
    let processed_at = from_millis(processed_at)
        .ok_or_else(|| Error::Internal(format!("processed_at out of range: {}", processed_at)))?;

    Ok(ProcessedRecord {
        id: row.try_get("id")?,
        transaction: transaction_from_row(row)?,
        source_id: row.try_get("source_id")?,
        processed_at,
        processed_by: row.try_get("processed_by")?,
    })
}

/// All processed transactions, most recently processed first
pub async fn list_processed(pool: &SqlitePool) -> Result<Vec<ProcessedRecord>> {
    let sql = format!(
        "SELECT id, {}, source_id, processed_at, processed_by FROM processed ORDER BY processed_at DESC, id",
        TRANSACTION_COLUMNS
    );
    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    rows.iter().map(processed_from_row).collect()
}

/// Store a processed record
pub(crate) async fn insert_processed(
    conn: &mut SqliteConnection,
    record: &ProcessedRecord,
) -> Result<()> {
    let sql = format!(
        "INSERT INTO processed (id, {}, source_id, processed_at, processed_by) VALUES (?, {}, ?, ?, ?)",
        TRANSACTION_COLUMNS, TRANSACTION_PLACEHOLDERS
    );

    let query = sqlx::query(&sql).bind(record.id.clone());
    bind_transaction(query, &record.transaction)?
        .bind(record.source_id.clone())
        .bind(to_millis(record.processed_at))
        .bind(record.processed_by.clone())
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Number of processed transactions
pub async fn count_processed(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM processed")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
