//! HTML pages behind the page gate.

use axum::extract::{Query, State};
use axum::response::{Html, Redirect};
use chrono::Utc;
use stockroom_core::inventory::dashboard;
use stockroom_core::inventory::items::{self, ItemFilter};
use stockroom_core::inventory::status::{Horizon, view};

use crate::AppState;
use crate::error::AppResult;
use crate::models::SearchQuery;
use crate::routes;
use crate::services::pages;

/// Rows shown on the inventory page.
const INVENTORY_PAGE_ROWS: i64 = 100;

/// `GET /`: send signed-in users to the dashboard.
pub async fn root_handler() -> Redirect {
    Redirect::to(routes::GET_DASHBOARD)
}

/// `GET /dashboard`
pub async fn dashboard_page_handler(State(state): State<AppState>) -> AppResult<Html<String>> {
    let summary = dashboard::dashboard(&state.pool, &state.renewals, Utc::now()).await?;
    Ok(pages::dashboard_page(&summary))
}

/// `GET /inventory?query=`
pub async fn inventory_page_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Html<String>> {
    let filter = ItemFilter {
        query: params.query.clone(),
        limit: Some(INVENTORY_PAGE_ROWS),
        ..Default::default()
    };
    let now = Utc::now();
    let rows: Vec<_> = items::list_items(&state.pool, &filter)
        .await?
        .into_iter()
        .map(|item| view(item, now, Horizon::Month))
        .collect();
    Ok(pages::inventory_page(&rows, params.query.as_deref()))
}

/// `GET /renewals?query=`
pub async fn renewals_page_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Html<String>> {
    let report = dashboard::renewal_report(
        &state.pool,
        &state.renewals,
        Utc::now(),
        params.query.as_deref(),
    )
    .await?;
    Ok(pages::renewals_page(&report, params.query.as_deref()))
}
