//! Request and response bodies.

use serde::{Deserialize, Serialize};
use stockroom_core::inventory::status::Horizon;
use stockroom_core::models::inventory::{LicenseStatus, VendorStatus};

use crate::error::AppError;

/// JSON error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Login form fields.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// `GET /api/items` query.
#[derive(Debug, Default, Deserialize)]
pub struct ItemsQuery {
    pub query: Option<String>,
    #[serde(default)]
    pub archived: bool,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

/// `GET /api/items/expiring` query.
#[derive(Debug, Default, Deserialize)]
pub struct HorizonQuery {
    #[serde(default)]
    pub horizon: Horizon,
}

/// Paged vendor listing query.
#[derive(Debug, Default, Deserialize)]
pub struct VendorsQuery {
    pub query: Option<String>,
    pub status: Option<VendorStatus>,
    pub page: Option<i64>,
}

/// Paged license-key listing query. `status=all` disables the filter.
#[derive(Debug, Default, Deserialize)]
pub struct LicenseKeysQuery {
    pub query: Option<String>,
    pub status: Option<String>,
    pub page: Option<i64>,
}

impl LicenseKeysQuery {
    pub fn status_filter(&self) -> Result<Option<LicenseStatus>, AppError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("all") => Ok(None),
            Some("active") => Ok(Some(LicenseStatus::Active)),
            Some("inactive") => Ok(Some(LicenseStatus::Inactive)),
            Some(other) => Err(AppError::Validation(format!(
                "Unknown license status: {other}"
            ))),
        }
    }
}

/// New license key for an item.
#[derive(Debug, Deserialize)]
pub struct NewLicenseKey {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub status: LicenseStatus,
}

/// License key status change.
#[derive(Debug, Deserialize)]
pub struct LicenseStatusUpdate {
    pub status: LicenseStatus,
}

/// Free-text filter for the renewal report.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

/// Body of a list response.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
}

/// Paged vendor listing response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorsResponse<T> {
    pub vendors: Vec<T>,
    pub total_count: i64,
    pub total_pages: i64,
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub version: &'static str,
    pub db_connected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn license_status_filter_accepts_all() {
        let q = |s: &str| LicenseKeysQuery {
            status: Some(s.into()),
            ..Default::default()
        };
        assert_eq!(q("all").status_filter().unwrap(), None);
        assert_eq!(LicenseKeysQuery::default().status_filter().unwrap(), None);
        assert_eq!(
            q("inactive").status_filter().unwrap(),
            Some(LicenseStatus::Inactive)
        );
        assert!(q("bogus").status_filter().is_err());
    }
}
