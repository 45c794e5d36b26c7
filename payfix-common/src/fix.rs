//! Correct-and-resubmit workflow
//!
//! An operator edit is merged over the queued exception and validated. A
//! rejected edit is recorded on the exception, which stays queued. An
//! accepted edit moves the transaction to `processed` and appends an audit
//! entry; the move is a single SQL transaction.
//!
//! The transaction opens with the delete from the queue, so it holds the
//! write lock before anything is read. Concurrent fixes then wait on the
//! busy timeout instead of failing to upgrade a read lock, and of two fixes
//! of the same record the later one finds it gone.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::{insert_audit, insert_processed, record_failed_fix, take_exception};
use crate::model::{AuditEntry, ProcessedRecord};
use crate::validation::validate_transaction;
use crate::{Error, Result};

/// Result of a fix attempt that reached validation
#[derive(Debug, Clone, PartialEq)]
pub enum FixOutcome {
    /// Moved to processed
    Processed { processed_id: String },

    /// Failed validation; the exception stays queued with these errors
    Rejected(Vec<String>),
}

/// Apply an operator's edit to a queued exception
///
/// # Errors
///
/// - `Error::NotFound` when `tx_id` is not queued
/// - `Error::InvalidInput` when an edited field has the wrong JSON type
pub async fn fix_transaction(
    pool: &SqlitePool,
    tx_id: &str,
    operator: &str,
    edits: &Map<String, Value>,
    now: DateTime<Utc>,
) -> Result<FixOutcome> {
    let mut tx = pool.begin().await?;

    let original = take_exception(&mut tx, tx_id)
        .await?
        .ok_or_else(|| Error::NotFound("Transaction not found in exceptions".to_string()))?;

    // Dropping `tx` on error rolls the delete back
    let merged = original.transaction.merged_with(edits)?;

    let errors = validate_transaction(&merged);
    if !errors.is_empty() {
        // Puts the exception back before writing through the pool
        tx.rollback().await?;
        record_failed_fix(pool, tx_id, &errors, operator, now).await?;
        warn!(
            "Fix of {} by {} rejected: {}",
            tx_id,
            operator,
            errors.join("; ")
        );
        return Ok(FixOutcome::Rejected(errors));
    }

    let processed = ProcessedRecord {
        id: Uuid::new_v4().to_string(),
        transaction: merged,
        source_id: Some(tx_id.to_string()),
        processed_at: now,
        processed_by: operator.to_string(),
    };
    insert_processed(&mut tx, &processed).await?;

    let mut after = serde_json::to_value(&processed)?;
    if let Some(obj) = after.as_object_mut() {
        obj.remove("_id");
    }
    let mut before = serde_json::to_value(&original)?;
    if let Some(obj) = before.as_object_mut() {
        obj.remove("_id");
    }
    let entry = AuditEntry {
        id: Uuid::new_v4().to_string(),
        tx_id: tx_id.to_string(),
        operator: operator.to_string(),
        before,
        after,
        timestamp: now,
    };
    insert_audit(&mut tx, &entry).await?;

    tx.commit().await?;

    info!(
        "Fix of {} by {} accepted as processed {}",
        tx_id, operator, processed.id
    );
    Ok(FixOutcome::Processed {
        processed_id: processed.id,
    })
}
