//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use stockroom_core::auth::AuthError;
use stockroom_core::config::ConfigError;
use stockroom_core::inventory::InventoryError;
use stockroom_core::notify::NotifyError;
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database unavailable: {0}")]
    DbUnavailable(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.as_str()),
            AppError::DbUnavailable(m) => {
                error!(detail = %m, "database unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "db_unavailable",
                    "Database unavailable",
                )
            }
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "unauthorized", m.as_str()),
            AppError::Internal(m) => {
                error!(detail = %m, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("row not found".into()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::DbUnavailable(e.to_string())
            }
            _ => AppError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::CredentialMismatch => {
                AppError::Unauthorized("Invalid username or password".into())
            }
            AuthError::TokenNotFound
            | AuthError::TokenRevoked
            | AuthError::TokenExpired
            | AuthError::TokenInvalid => AppError::Unauthorized("Unauthorized".into()),
            AuthError::DbError(e) => AppError::from(e),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<InventoryError> for AppError {
    fn from(e: InventoryError) -> Self {
        match e {
            InventoryError::ItemNotFound(_)
            | InventoryError::VendorNotFound(_)
            | InventoryError::LicenseKeyNotFound(_) => AppError::NotFound(e.to_string()),
            InventoryError::Validation(msg) => AppError::Validation(msg),
            InventoryError::RenewalWriteFailure { .. } => AppError::Internal(e.to_string()),
            InventoryError::DbError(e) => AppError::from(e),
        }
    }
}

impl From<NotifyError> for AppError {
    fn from(e: NotifyError) -> Self {
        match e {
            NotifyError::Fetch(e) => AppError::from(e),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_rejections_share_one_message() {
        for e in [
            AuthError::TokenNotFound,
            AuthError::TokenRevoked,
            AuthError::TokenExpired,
            AuthError::TokenInvalid,
        ] {
            match AppError::from(e) {
                AppError::Unauthorized(m) => assert_eq!(m, "Unauthorized"),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn inventory_errors_map_to_status() {
        let not_found = AppError::from(InventoryError::ItemNotFound(3)).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let invalid =
            AppError::from(InventoryError::Validation("bad".into())).into_response();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let failed = AppError::from(InventoryError::RenewalWriteFailure {
            item_id: 3,
            reason: "deadlock".into(),
        })
        .into_response();
        assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
