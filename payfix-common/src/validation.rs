//! Field validation for repaired transactions
//!
//! A transaction is accepted for processing only when this returns no errors.
//! Messages are stable strings; the operator client shows them verbatim.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::Transaction;

/// Maximum beneficiary name length (characters)
pub const MAX_BENEFICIARY_NAME_LEN: usize = 70;

static IBAN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    // Shape check only: 8-34 alphanumerics, no checksum
    Regex::new(r"^[A-Z0-9]{8,34}$").expect("static IBAN pattern")
});

/// Validate a merged transaction document
///
/// # Rules
///
/// - Beneficiary name must be non-blank and at most 70 characters
/// - Amount (missing counts as 0, explicit null is invalid) must parse as a
///   finite number greater than 0
/// - IBAN, when present, must be 8-34 alphanumerics once spaces are removed
///   and letters upper-cased
///
/// # Examples
///
/// ```
/// use payfix_common::validation::validate_transaction;
/// use payfix_common::Transaction;
///
/// let tx = Transaction {
///     beneficiary_name: Some("Jane Doe".to_string()),
///     amount: Some("250.00".to_string()),
///     iban: Some("GB29 NWBK 6016 1331 9268 19".to_string()),
///     ..Default::default()
/// };
/// assert!(validate_transaction(&tx).is_empty());
/// ```
pub fn validate_transaction(tx: &Transaction) -> Vec<String> {
    let mut errors = Vec::new();

    let name = tx.beneficiary_name.as_deref().unwrap_or("");
    if name.trim().is_empty() {
        errors.push("Beneficiary name empty".to_string());
    }
    if name.chars().count() > MAX_BENEFICIARY_NAME_LEN {
        errors.push(format!(
            "Beneficiary name too long (max {})",
            MAX_BENEFICIARY_NAME_LEN
        ));
    }

    match parse_amount(tx.amount.as_deref()) {
        Some(amount) if amount <= 0.0 => errors.push("Amount must be positive".to_string()),
        Some(_) => {}
        None => errors.push("Amount invalid".to_string()),
    }

    let iban = tx.iban.as_deref().unwrap_or("");
    if !iban.is_empty() {
        let normalized = iban.replace(' ', "").to_uppercase();
        if !IBAN_PATTERN.is_match(&normalized) {
            errors.push("IBAN format invalid".to_string());
        }
    }

    errors
}

/// Parse an amount field; missing means 0, non-finite values are invalid
fn parse_amount(raw: Option<&str>) -> Option<f64> {
    let Some(raw) = raw else {
        return Some(0.0);
    };

    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
}
