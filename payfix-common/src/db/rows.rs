//! Row <-> document mapping shared by the exceptions and processed tables

use serde_json::{Map, Value};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::Row;

use crate::model::Transaction;
use crate::time::{from_millis, to_millis};
use crate::Result;

/// Transaction columns, in bind order
pub(crate) const TRANSACTION_COLUMNS: &str =
    "message_type, sender, receiver, beneficiary_name, iban, amount, currency, error, created_at, extra";

/// Placeholders matching `TRANSACTION_COLUMNS`
pub(crate) const TRANSACTION_PLACEHOLDERS: &str = "?, ?, ?, ?, ?, ?, ?, ?, ?, ?";

/// Bind the transaction fields in `TRANSACTION_COLUMNS` order
pub(crate) fn bind_transaction<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    tx: &Transaction,
) -> Result<Query<'q, Sqlite, SqliteArguments<'q>>> {
    let extra = serde_json::to_string(&tx.extra)?;

    Ok(query
        .bind(tx.message_type.clone())
        .bind(tx.sender.clone())
        .bind(tx.receiver.clone())
        .bind(tx.beneficiary_name.clone())
        .bind(tx.iban.clone())
        .bind(tx.amount.clone())
        .bind(tx.currency.clone())
        .bind(tx.error.clone())
        .bind(tx.created_at.map(to_millis))
        .bind(extra))
}

/// Read the transaction fields of a row
pub(crate) fn transaction_from_row(row: &SqliteRow) -> Result<Transaction> {
    let extra: String = row.try_get("extra")?;
    let extra: Map<String, Value> = serde_json::from_str(&extra)?;
    let created_at: Option<i64> = row.try_get("created_at")?;

    Ok(Transaction {
        message_type: row.try_get("message_type")?,
        sender: row.try_get("sender")?,
        receiver: row.try_get("receiver")?,
        beneficiary_name: row.try_get("beneficiary_name")?,
        iban: row.try_get("iban")?,
        amount: row.try_get("amount")?,
        currency: row.try_get("currency")?,
        error: row.try_get("error")?,
        created_at: created_at.and_then(from_millis),
        extra,
    })
}
