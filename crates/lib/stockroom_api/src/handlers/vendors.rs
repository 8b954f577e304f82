//! Vendor handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use stockroom_core::inventory::vendors::{self, VendorFilter};
use stockroom_core::models::inventory::{Vendor, VendorInput, VendorWithItems};

use crate::AppState;
use crate::error::AppResult;
use crate::models::{VendorsQuery, VendorsResponse};

/// `GET /api/vendors?query=&status=&page=`: 10 per page, by name.
pub async fn list_vendors_handler(
    State(state): State<AppState>,
    Query(params): Query<VendorsQuery>,
) -> AppResult<Json<VendorsResponse<VendorWithItems>>> {
    let filter = VendorFilter {
        query: params.query,
        status: params.status,
        page: params.page.unwrap_or(1),
    };
    let page = vendors::list_vendors(&state.pool, &filter).await?;
    Ok(Json(VendorsResponse {
        vendors: page.results,
        total_count: page.total_count,
        total_pages: page.total_pages,
    }))
}

/// `POST /api/vendors`
pub async fn create_vendor_handler(
    State(state): State<AppState>,
    Json(body): Json<VendorInput>,
) -> AppResult<(StatusCode, Json<Vendor>)> {
    let vendor = vendors::create_vendor(&state.pool, &body).await?;
    Ok((StatusCode::CREATED, Json(vendor)))
}

/// `GET /api/vendors/{id}`
pub async fn get_vendor_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vendor>> {
    Ok(Json(vendors::get_vendor(&state.pool, id).await?))
}

/// `PUT /api/vendors/{id}`
pub async fn update_vendor_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<VendorInput>,
) -> AppResult<Json<Vendor>> {
    Ok(Json(vendors::update_vendor(&state.pool, id, &body).await?))
}
