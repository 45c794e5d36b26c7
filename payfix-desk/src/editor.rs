//! Transaction editor
//!
//! An edit always starts from the record's current values for the editable
//! fields; command-line flags or interactive answers replace them.

use clap::Args;
use dialoguer::Input;
use payfix_common::Transaction;
use serde_json::{Map, Value};

use crate::error::ClientResult;

/// Editable fields: document key and display label
pub const EDITABLE_FIELDS: [(&str, &str); 7] = [
    ("message_type", "MT"),
    ("sender", "Sender"),
    ("receiver", "Receiver"),
    ("beneficiary_name", "Beneficiary"),
    ("iban", "IBAN"),
    ("amount", "Amount"),
    ("currency", "Currency"),
];

/// Field overrides given on the command line
#[derive(Debug, Clone, Default, Args)]
pub struct FieldEdits {
    /// Message type, e.g. MT103
    #[arg(long)]
    pub message_type: Option<String>,

    #[arg(long)]
    pub sender: Option<String>,

    #[arg(long)]
    pub receiver: Option<String>,

    /// Beneficiary name (max 70 characters)
    #[arg(long)]
    pub beneficiary: Option<String>,

    #[arg(long)]
    pub iban: Option<String>,

    #[arg(long)]
    pub amount: Option<String>,

    #[arg(long)]
    pub currency: Option<String>,
}

impl FieldEdits {
    fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "message_type" => &self.message_type,
            "sender" => &self.sender,
            "receiver" => &self.receiver,
            "beneficiary_name" => &self.beneficiary,
            "iban" => &self.iban,
            "amount" => &self.amount,
            "currency" => &self.currency,
            _ => return None,
        };
        value.as_deref()
    }
}

/// Current value of an editable field; empty when absent
pub fn current_value(tx: &Transaction, key: &str) -> String {
    let value = match key {
        "message_type" => &tx.message_type,
        "sender" => &tx.sender,
        "receiver" => &tx.receiver,
        "beneficiary_name" => &tx.beneficiary_name,
        "iban" => &tx.iban,
        "amount" => &tx.amount,
        "currency" => &tx.currency,
        _ => return String::new(),
    };
    value.clone().unwrap_or_default()
}

/// Edit submitted for a record: every editable field, overrides applied
pub fn build_edits(tx: &Transaction, overrides: &FieldEdits) -> Map<String, Value> {
    EDITABLE_FIELDS
        .iter()
        .map(|(key, _)| {
            let value = overrides
                .get(key)
                .map(str::to_string)
                .unwrap_or_else(|| current_value(tx, key));
            (key.to_string(), Value::String(value))
        })
        .collect()
}

/// Prompt for every editable field, offering the current (or overridden)
/// value as the default
pub fn prompt_edits(tx: &Transaction, overrides: &FieldEdits) -> ClientResult<Map<String, Value>> {
    let mut edits = Map::new();

    // Form order, not key order
    for (key, label) in EDITABLE_FIELDS {
        let default = overrides
            .get(key)
            .map(str::to_string)
            .unwrap_or_else(|| current_value(tx, key));

        let answer: String = Input::new()
            .with_prompt(label)
            .default(default)
            .allow_empty(true)
            .interact_text()?;

        edits.insert(key.to_string(), Value::String(answer));
    }

    Ok(edits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transaction {
        Transaction {
            message_type: Some("MT103".to_string()),
            sender: Some("ABC BANK".to_string()),
            beneficiary_name: Some("Johnathan Will...".to_string()),
            amount: Some("5000".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_edits_start_from_current_values() {
        let edits = build_edits(&sample(), &FieldEdits::default());

        assert_eq!(edits.len(), 7);
        assert_eq!(edits["message_type"], "MT103");
        assert_eq!(edits["sender"], "ABC BANK");
        assert_eq!(edits["amount"], "5000");
        // Absent fields are submitted empty
        assert_eq!(edits["iban"], "");
        assert_eq!(edits["currency"], "");
    }

    #[test]
    fn test_overrides_replace_values() {
        let overrides = FieldEdits {
            beneficiary: Some("Johnathan Williams".to_string()),
            currency: Some("USD".to_string()),
            ..Default::default()
        };
        let edits = build_edits(&sample(), &overrides);

        assert_eq!(edits["beneficiary_name"], "Johnathan Williams");
        assert_eq!(edits["currency"], "USD");
        assert_eq!(edits["sender"], "ABC BANK");
    }

    #[test]
    fn test_unknown_field_is_empty() {
        assert_eq!(current_value(&sample(), "uetr"), "");
        assert_eq!(FieldEdits::default().get("uetr"), None);
    }
}
