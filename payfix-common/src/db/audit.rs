//! Audit trail of successful fixes

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::model::AuditEntry;
use crate::time::{from_millis, to_millis};
use crate::{Error, Result};

fn audit_from_row(row: &SqliteRow) -> Result<AuditEntry> {
    let before: String = row.try_get("before_doc")?;
    let after: String = row.try_get("after_doc")?;
    let timestamp: i64 = row.try_get("timestamp")?;

    Ok(AuditEntry {
        id: row.try_get("id")?,
        tx_id: row.try_get("tx_id")?,
        operator: row.try_get("operator")?,
        before: serde_json::from_str(&before)?,
        after: serde_json::from_str(&after)?,
        timestamp: from_millis(timestamp)
            .ok_or_else(|| Error::Internal(format!("audit timestamp out of range: {}", timestamp)))?,
    })
}

/// Audit entries, newest first, optionally for one transaction
pub async fn list_audit(pool: &SqlitePool, tx_id: Option<&str>) -> Result<Vec<AuditEntry>> {
    let rows = match tx_id {
        Some(tx_id) => {
            sqlx::query(
                "SELECT id, tx_id, operator, before_doc, after_doc, timestamp FROM audit_logs WHERE tx_id = ? ORDER BY timestamp DESC, id",
            )
            .bind(tx_id)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                "SELECT id, tx_id, operator, before_doc, after_doc, timestamp FROM audit_logs ORDER BY timestamp DESC, id",
            )
            .fetch_all(pool)
            .await?
        }
    };

    rows.iter().map(audit_from_row).collect()
}

/// Append an audit entry
pub(crate) async fn insert_audit(conn: &mut SqliteConnection, entry: &AuditEntry) -> Result<()> {
    sqlx::query(
        "INSERT INTO audit_logs (id, tx_id, operator, before_doc, after_doc, timestamp) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&entry.id)
    .bind(&entry.tx_id)
    .bind(&entry.operator)
    .bind(serde_json::to_string(&entry.before)?)
    .bind(serde_json::to_string(&entry.after)?)
    .bind(to_millis(entry.timestamp))
    .execute(&mut *conn)
    .await?;

    Ok(())
}
