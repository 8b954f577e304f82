//! Item handlers: CRUD, archive, status views and renewals.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use stockroom_core::inventory::items::{self, ItemFilter};
use stockroom_core::inventory::license_keys;
use stockroom_core::inventory::renewal::{RenewalOutcome, suggest_dates};
use stockroom_core::inventory::status::{Horizon, view};
use stockroom_core::models::inventory::{
    Item, ItemUpdate, ItemView, LicenseKey, NewItem, Renewal, RenewalDates,
};

use crate::AppState;
use crate::error::AppResult;
use crate::models::{HorizonQuery, ItemsQuery, ListResponse, NewLicenseKey};

fn views(rows: Vec<Item>, horizon: Horizon) -> Vec<ItemView> {
    let now = Utc::now();
    rows.into_iter().map(|item| view(item, now, horizon)).collect()
}

/// `GET /api/items`: list items with derived status.
pub async fn list_items_handler(
    State(state): State<AppState>,
    Query(params): Query<ItemsQuery>,
) -> AppResult<Json<ListResponse<ItemView>>> {
    let filter = ItemFilter {
        query: params.query,
        archived: params.archived,
        offset: params.offset,
        limit: params.limit,
    };
    let rows = items::list_items(&state.pool, &filter).await?;
    Ok(Json(ListResponse {
        items: views(rows, Horizon::Month),
    }))
}

/// `POST /api/items`: create an item.
pub async fn create_item_handler(
    State(state): State<AppState>,
    Json(body): Json<NewItem>,
) -> AppResult<(StatusCode, Json<ItemView>)> {
    let item = items::create_item(&state.pool, &body).await?;
    Ok((
        StatusCode::CREATED,
        Json(view(item, Utc::now(), Horizon::Month)),
    ))
}

/// `GET /api/items/{id}`: one item.
pub async fn get_item_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ItemView>> {
    let item = items::get_item(&state.pool, id).await?;
    Ok(Json(view(item, Utc::now(), Horizon::Month)))
}

/// `PATCH /api/items/{id}`: update the provided fields.
pub async fn update_item_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ItemUpdate>,
) -> AppResult<Json<ItemView>> {
    let item = items::update_item(&state.pool, id, &body).await?;
    Ok(Json(view(item, Utc::now(), Horizon::Month)))
}

/// `DELETE /api/items/{id}`: delete an item and its keys; 400 once it has renewals.
pub async fn delete_item_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    items::delete_item(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/items/{id}/archive`
pub async fn archive_item_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ItemView>> {
    let item = items::set_archived(&state.pool, id, true).await?;
    Ok(Json(view(item, Utc::now(), Horizon::Month)))
}

/// `POST /api/items/{id}/unarchive`
pub async fn unarchive_item_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ItemView>> {
    let item = items::set_archived(&state.pool, id, false).await?;
    Ok(Json(view(item, Utc::now(), Horizon::Month)))
}

/// `GET /api/items/expiring?horizon=week|fortnight|month`
pub async fn expiring_items_handler(
    State(state): State<AppState>,
    Query(params): Query<HorizonQuery>,
) -> AppResult<Json<ListResponse<ItemView>>> {
    let rows = items::expiring_items(&state.pool, Utc::now(), params.horizon).await?;
    Ok(Json(ListResponse {
        items: views(rows, params.horizon),
    }))
}

/// `GET /api/items/expired`
pub async fn expired_items_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ListResponse<ItemView>>> {
    let rows = items::expired_items(&state.pool, Utc::now()).await?;
    Ok(Json(ListResponse {
        items: views(rows, Horizon::Month),
    }))
}

/// `GET /api/items/lifetime`
pub async fn lifetime_items_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ListResponse<ItemView>>> {
    let rows = items::lifetime_items(&state.pool).await?;
    Ok(Json(ListResponse {
        items: views(rows, Horizon::Month),
    }))
}

/// `POST /api/items/{id}/renew`: apply new dates and log the renewal.
pub async fn renew_item_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(dates): Json<RenewalDates>,
) -> AppResult<Json<RenewalOutcome>> {
    let outcome = state.renewals.renew(id, dates).await?;
    Ok(Json(outcome))
}

/// `GET /api/items/{id}/renewal-suggestion`: prefilled dates for the renew form.
pub async fn renewal_suggestion_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<RenewalDates>> {
    let item = items::get_item(&state.pool, id).await?;
    Ok(Json(suggest_dates(&item, Utc::now())))
}

/// `GET /api/items/{id}/renewals`: renewal history, newest first.
pub async fn item_renewals_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ListResponse<Renewal>>> {
    let items = state.renewals.history(id).await?;
    Ok(Json(ListResponse { items }))
}

/// `GET /api/items/{id}/license-keys`
pub async fn item_license_keys_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ListResponse<LicenseKey>>> {
    let items = license_keys::keys_for_item(&state.pool, id).await?;
    Ok(Json(ListResponse { items }))
}

/// `POST /api/items/{id}/license-keys`: attach a key to a software item.
pub async fn create_license_key_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<NewLicenseKey>,
) -> AppResult<(StatusCode, Json<LicenseKey>)> {
    let key = license_keys::create_license_key(&state.pool, id, &body.key, body.status).await?;
    Ok((StatusCode::CREATED, Json(key)))
}
