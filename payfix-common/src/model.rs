//! Transaction document model
//!
//! Exception and processed records are documents: a fixed set of well-known
//! payment fields plus any further fields the upstream converter attached.
//! Unknown fields are kept in `extra` and survive a correct-and-resubmit
//! round trip unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Keys an operator edit may never overwrite
pub const SYSTEM_KEYS: &[&str] = &[
    "_id",
    "created_at",
    "processed_at",
    "processed_by",
    "source_id",
    "last_error",
    "last_modified_by",
    "last_modified_at",
];

/// A payment transaction document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beneficiary_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,

    /// Amount as submitted; numbers are accepted and kept in their JSON text form
    ///
    /// An explicit `null` becomes an empty amount, which fails validation,
    /// while a missing amount stays `None` and counts as 0.
    #[serde(
        default,
        deserialize_with = "amount_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Conversion error reported upstream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Any further document fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn amount_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None => None,
        Some(Value::Null) => Some(String::new()),
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

impl Transaction {
    /// Document form without any record identity
    pub fn to_document(&self) -> crate::Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Err(crate::Error::Internal(
                "transaction did not serialize to an object".to_string(),
            )),
        }
    }

    /// Apply an operator edit on top of this document
    ///
    /// Every key in `edits` overwrites the document key; `SYSTEM_KEYS` are
    /// ignored. The merged document must still deserialize as a transaction.
    pub fn merged_with(&self, edits: &Map<String, Value>) -> crate::Result<Transaction> {
        let mut doc = self.to_document()?;
        for (key, value) in edits {
            if SYSTEM_KEYS.contains(&key.as_str()) {
                continue;
            }
            doc.insert(key.clone(), value.clone());
        }

        serde_json::from_value(Value::Object(doc))
            .map_err(|e| crate::Error::InvalidInput(format!("Invalid transaction fields: {}", e)))
    }
}

/// A queued exception awaiting repair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionRecord {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(flatten)]
    pub transaction: Transaction,

    /// Validation errors from the last rejected fix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<DateTime<Utc>>,
}

/// A repaired transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(flatten)]
    pub transaction: Transaction,

    /// Id of the exception this record was repaired from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,

    pub processed_at: DateTime<Utc>,

    pub processed_by: String,
}

/// One audit trail entry: a successful fix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    #[serde(rename = "_id")]
    pub id: String,

    pub tx_id: String,

    pub operator: String,

    /// Exception document before the fix
    pub before: Value,

    /// Processed document after the fix
    pub after: Value,

    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_amount_accepts_number_or_string() {
        let tx: Transaction = serde_json::from_value(json!({"amount": 5000})).unwrap();
        assert_eq!(tx.amount.as_deref(), Some("5000"));

        let tx: Transaction = serde_json::from_value(json!({"amount": "12.50"})).unwrap();
        assert_eq!(tx.amount.as_deref(), Some("12.50"));

        let tx: Transaction = serde_json::from_value(json!({"amount": null})).unwrap();
        assert_eq!(tx.amount.as_deref(), Some(""));

        let tx: Transaction = serde_json::from_value(json!({"sender": "ABC BANK"})).unwrap();
        assert_eq!(tx.amount, None);
    }

    #[test]
    fn test_unknown_fields_kept_in_extra() {
        let tx: Transaction = serde_json::from_value(json!({
            "sender": "ABC BANK",
            "uetr": "abc-123"
        }))
        .unwrap();

        assert_eq!(tx.sender.as_deref(), Some("ABC BANK"));
        assert_eq!(tx.extra.get("uetr"), Some(&json!("abc-123")));

        let doc = tx.to_document().unwrap();
        assert_eq!(doc.get("uetr"), Some(&json!("abc-123")));
    }

    #[test]
    fn test_merge_overwrites_fields() {
        let tx = Transaction {
            beneficiary_name: Some("Johnathan Will...".to_string()),
            amount: Some("5000".to_string()),
            ..Default::default()
        };

        let edits = json!({"beneficiary_name": "Johnathan Williams", "amount": 5100});
        let merged = tx.merged_with(edits.as_object().unwrap()).unwrap();

        assert_eq!(merged.beneficiary_name.as_deref(), Some("Johnathan Williams"));
        assert_eq!(merged.amount.as_deref(), Some("5100"));
    }

    #[test]
    fn test_merge_ignores_system_keys() {
        let created = chrono::Utc::now();
        let tx = Transaction {
            created_at: Some(created),
            ..Default::default()
        };

        let edits = json!({
            "_id": "forged",
            "created_at": "2001-01-01T00:00:00Z",
            "processed_by": "someone"
        });
        let merged = tx.merged_with(edits.as_object().unwrap()).unwrap();

        assert_eq!(merged.created_at, Some(created));
        assert!(merged.extra.is_empty());
    }

    #[test]
    fn test_merge_rejects_wrong_field_type() {
        let tx = Transaction::default();
        let edits = json!({"sender": 42});
        assert!(tx.merged_with(edits.as_object().unwrap()).is_err());
    }

    #[test]
    fn test_exception_record_wire_shape() {
        let record = ExceptionRecord {
            id: "abc".to_string(),
            transaction: Transaction {
                sender: Some("ABC BANK".to_string()),
                ..Default::default()
            },
            last_error: None,
            last_modified_by: None,
            last_modified_at: None,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["_id"], "abc");
        assert_eq!(value["sender"], "ABC BANK");
        assert!(value.get("last_error").is_none());

        let back: ExceptionRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
