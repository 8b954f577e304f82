//! Expiring-item notification sweep.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use stockroom_core::notify;
use tracing::error;

use crate::AppState;

/// `GET|POST /api/notification`: mail every owner of an expiring item.
///
/// Individual delivery failures are listed in the response; only failing to
/// load the items fails the request.
pub async fn notification_handler(State(state): State<AppState>) -> Response {
    match notify::notify_expiring(
        &state.pool,
        state.mailer.as_ref(),
        &state.config.mail.from,
        Utc::now(),
    )
    .await
    {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            error!(error = %e, "notification sweep failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to send emails").into_response()
        }
    }
}
