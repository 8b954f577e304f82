//! Dashboard and renewal report endpoints.

use axum::Json;
use axum::extract::{Query, State};
use chrono::Utc;
use stockroom_core::inventory::dashboard::{self, DashboardSummary, RenewalReport};

use crate::AppState;
use crate::error::AppResult;
use crate::models::SearchQuery;

/// `GET /api/dashboard`
pub async fn dashboard_handler(State(state): State<AppState>) -> AppResult<Json<DashboardSummary>> {
    let summary = dashboard::dashboard(&state.pool, &state.renewals, Utc::now()).await?;
    Ok(Json(summary))
}

/// `GET /api/renewals?query=`: renewal report, filtered by item name or owner.
pub async fn renewal_report_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<RenewalReport>> {
    let report = dashboard::renewal_report(
        &state.pool,
        &state.renewals,
        Utc::now(),
        params.query.as_deref(),
    )
    .await?;
    Ok(Json(report))
}
