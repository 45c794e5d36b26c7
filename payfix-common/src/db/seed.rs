//! Demo exception data

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::model::Transaction;
use crate::Result;

/// The two demo exceptions: one with a truncated beneficiary field, one with
/// several conversion errors
pub fn sample_exceptions(now: DateTime<Utc>) -> Vec<Transaction> {
    vec![
        Transaction {
            message_type: Some("MT103".to_string()),
            sender: Some("ABC BANK".to_string()),
            receiver: Some("XYZ BANK".to_string()),
            beneficiary_name: Some("Johnathan Will...".to_string()),
            iban: Some("GB29NWBK60161331926819".to_string()),
            amount: Some("5000".to_string()),
            currency: Some("USD".to_string()),
            error: Some("Field 59 truncated when converting to MX".to_string()),
            created_at: Some(now),
            ..Default::default()
        },
        Transaction {
            message_type: Some("MT103".to_string()),
            sender: Some("SOME BANK".to_string()),
            receiver: Some("OTHER BANK".to_string()),
            beneficiary_name: Some(String::new()),
            iban: Some("INVALIDIBAN".to_string()),
            amount: Some("-100".to_string()),
            currency: Some("EUR".to_string()),
            error: Some("Multiple errors detected from MT->MX conversion".to_string()),
            created_at: Some(now),
            ..Default::default()
        },
    ]
}

/// Queue the demo exceptions, returning how many were inserted
pub async fn seed_sample_exceptions(pool: &SqlitePool, now: DateTime<Utc>) -> Result<usize> {
    let ids = crate::db::insert_exceptions(pool, &sample_exceptions(now)).await?;
    tracing::info!("Seeded {} sample exceptions", ids.len());
    Ok(ids.len())
}
