//! Liveness check.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use crate::AppState;
use crate::models::HealthResponse;

/// `GET /health`: crate version and database reachability.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_connected = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => true,
        Err(e) => {
            warn!("database check failed: {e}");
            false
        }
    };

    Json(HealthResponse {
        version: stockroom_core::version(),
        db_connected,
    })
}
