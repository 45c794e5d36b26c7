//! Shared API request/response types
//!
//! Every response body carries `ok`. Failures use [`ErrorBody`]: a single
//! `error` message, or an `errors` list when a fix fails validation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::model::{AuditEntry, ExceptionRecord, ProcessedRecord};

// ========================================
// Accounts
// ========================================

/// POST /api/signup
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// POST /api/login
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginResponse {
    pub ok: bool,
    pub token: String,
    pub username: String,
}

/// Plain `{ok, message}` acknowledgement (signup)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MessageResponse {
    pub ok: bool,
    pub message: String,
}

/// `GET /api/ping` body: `{ok, message: "ping"}`
pub type PingResponse = MessageResponse;

// ========================================
// Queue
// ========================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExceptionsResponse {
    pub ok: bool,
    pub exceptions: Vec<ExceptionRecord>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProcessedResponse {
    pub ok: bool,
    pub processed: Vec<ProcessedRecord>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuditResponse {
    pub ok: bool,
    pub audit: Vec<AuditEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedResponse {
    pub ok: bool,
    pub inserted_count: usize,
}

/// POST /api/fix
///
/// `tx` holds the edited fields; `operator` may be omitted when the request
/// carries a bearer token.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FixRequest {
    #[serde(default)]
    pub tx_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default)]
    pub tx: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FixResponse {
    pub ok: bool,
    pub processed_id: String,
}

// ========================================
// Dashboard
// ========================================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MessageTypeCount {
    pub message_type: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OperatorCount {
    pub operator: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ErrorCount {
    pub error: String,
    pub count: i64,
}

/// GET /api/dashboard
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DashboardStats {
    pub ok: bool,
    /// RFC 3339, UTC, `Z` suffix
    pub generated_at: String,
    pub total_exceptions: i64,
    pub total_processed: i64,
    /// Processed within the requested window
    pub processed_recent_days: i64,
    /// Processed since UTC midnight
    pub processed_today: i64,
    pub avg_resolution_seconds: Option<f64>,
    pub exceptions_by_message_type: Vec<MessageTypeCount>,
    pub processed_by_operator: Vec<OperatorCount>,
    pub top_errors: Vec<ErrorCount>,
    /// `YYYY-MM-DD` -> exceptions created that day
    pub exceptions_trend: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OperatorStat {
    pub operator: Option<String>,
    pub count: i64,
    pub avg_resolution_seconds: Option<f64>,
}

/// GET /api/operator_stats
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OperatorStatsResponse {
    pub ok: bool,
    pub stats: Vec<OperatorStat>,
}

// ========================================
// Errors
// ========================================

/// Failure envelope
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    /// Machine-readable code (NOT_FOUND, BAD_REQUEST, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorBody {
    pub fn message(code: &str, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(message.into()),
            errors: None,
            code: Some(code.to_string()),
        }
    }

    pub fn validation(errors: Vec<String>) -> Self {
        Self {
            ok: false,
            error: None,
            errors: Some(errors),
            code: Some("VALIDATION_FAILED".to_string()),
        }
    }

    /// All messages, for display
    pub fn messages(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(errors) = &self.errors {
            out.extend(errors.iter().cloned());
        }
        if let Some(error) = &self.error {
            out.push(error.clone());
        }
        out
    }
}
