//! License key handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use stockroom_core::inventory::license_keys::{self, LicenseKeyFilter};
use stockroom_core::models::inventory::{LicenseKey, LicenseKeyEntry, Page};

use crate::AppState;
use crate::error::AppResult;
use crate::models::{LicenseKeysQuery, LicenseStatusUpdate};

/// `GET /api/license-keys?query=&status=all|active|inactive&page=`
pub async fn list_license_keys_handler(
    State(state): State<AppState>,
    Query(params): Query<LicenseKeysQuery>,
) -> AppResult<Json<Page<LicenseKeyEntry>>> {
    let filter = LicenseKeyFilter {
        status: params.status_filter()?,
        query: params.query,
        page: params.page.unwrap_or(1),
    };
    Ok(Json(license_keys::list_license_keys(&state.pool, &filter).await?))
}

/// `PATCH /api/license-keys/{id}`: change a key's status.
pub async fn update_license_key_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<LicenseStatusUpdate>,
) -> AppResult<Json<LicenseKey>> {
    let key = license_keys::update_license_status(&state.pool, id, body.status).await?;
    Ok(Json(key))
}
