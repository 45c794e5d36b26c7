//! Dashboard statistics endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use payfix_common::api::{DashboardStats, OperatorStatsResponse};
use payfix_common::dashboard::{self, clamp_days};
use serde::Deserialize;

use crate::{ApiError, ApiResult, AppState};

/// `days` is kept as text: non-integers fall back to the default
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub days: Option<String>,
}

/// GET /api/dashboard?days=N
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<DashboardStats>> {
    let days = clamp_days(query.days.as_deref(), state.dashboard_default_days);

    dashboard::dashboard_stats(&state.db, days, Utc::now())
        .await
        .map(Json)
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// GET /api/operator_stats
pub async fn operator_stats(State(state): State<AppState>) -> ApiResult<Json<OperatorStatsResponse>> {
    let stats = dashboard::operator_stats(&state.db).await?;
    Ok(Json(OperatorStatsResponse { ok: true, stats }))
}
