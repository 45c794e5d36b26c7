//! Exception queue, processed list, audit trail, and demo seeding

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use payfix_common::api::{AuditResponse, ExceptionsResponse, ProcessedResponse, SeedResponse};
use payfix_common::db;
use serde::Deserialize;

use crate::{ApiResult, AppState};

/// GET /api/exceptions
///
/// Queued exceptions, newest first.
pub async fn list_exceptions(State(state): State<AppState>) -> ApiResult<Json<ExceptionsResponse>> {
    let exceptions = db::list_exceptions(&state.db).await?;
    Ok(Json(ExceptionsResponse {
        ok: true,
        exceptions,
    }))
}

/// GET /api/processed
///
/// Processed transactions, most recently processed first.
pub async fn list_processed(State(state): State<AppState>) -> ApiResult<Json<ProcessedResponse>> {
    let processed = db::list_processed(&state.db).await?;
    Ok(Json(ProcessedResponse {
        ok: true,
        processed,
    }))
}

/// POST /api/seed
pub async fn seed_data(State(state): State<AppState>) -> ApiResult<Json<SeedResponse>> {
    let inserted_count = db::seed_sample_exceptions(&state.db, Utc::now()).await?;
    Ok(Json(SeedResponse {
        ok: true,
        inserted_count,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub tx_id: Option<String>,
}

/// GET /api/audit?tx_id=...
///
/// Audit entries, newest first, optionally for a single exception.
pub async fn audit_log(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> ApiResult<Json<AuditResponse>> {
    let tx_id = query.tx_id.as_deref().filter(|id| !id.is_empty());
    let audit = db::list_audit(&state.db, tx_id).await?;
    Ok(Json(AuditResponse { ok: true, audit }))
}
