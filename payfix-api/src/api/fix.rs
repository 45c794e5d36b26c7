//! Correct-and-resubmit endpoint

use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use chrono::Utc;
use payfix_common::api::{FixRequest, FixResponse};
use payfix_common::auth::TokenClaims;
use payfix_common::fix::{self, FixOutcome};

use crate::{ApiError, ApiResult, AppState};

/// POST /api/fix
///
/// Body `{tx_id, operator, tx}`. `operator` falls back to the bearer token's
/// username. A validation failure answers 400 with the full error list and
/// leaves the exception queued.
pub async fn fix_transaction(
    State(state): State<AppState>,
    claims: Option<Extension<TokenClaims>>,
    payload: Result<Json<FixRequest>, JsonRejection>,
) -> ApiResult<Json<FixResponse>> {
    let Json(req) = payload?;
    let operator = req
        .operator
        .filter(|op| !op.trim().is_empty())
        .or_else(|| claims.map(|Extension(c)| c.username));

    let (Some(tx_id), Some(operator), Some(edits)) = (
        req.tx_id.filter(|id| !id.is_empty()),
        operator,
        req.tx.filter(|tx| !tx.is_empty()),
    ) else {
        return Err(ApiError::BadRequest("Missing fields".to_string()));
    };

    match fix::fix_transaction(&state.db, &tx_id, &operator, &edits, Utc::now()).await? {
        FixOutcome::Processed { processed_id } => Ok(Json(FixResponse {
            ok: true,
            processed_id,
        })),
        FixOutcome::Rejected(errors) => Err(ApiError::Validation(errors)),
    }
}
