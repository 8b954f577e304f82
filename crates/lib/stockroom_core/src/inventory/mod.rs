//! Inventory: items, vendors, license keys, renewals and derived status.

pub mod dashboard;
pub mod items;
pub mod license_keys;
pub mod renewal;
pub mod status;
pub mod store;
pub mod vendors;

use thiserror::Error;

/// Rows per page for paged listings.
pub const PAGE_SIZE: i64 = 10;

/// Inventory errors.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Item {0} not found")]
    ItemNotFound(i64),

    #[error("Vendor {0} not found")]
    VendorNotFound(i64),

    #[error("License key {0} not found")]
    LicenseKeyNotFound(i64),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The item update and renewal insert were rolled back together.
    #[error("Renewal of item {item_id} failed: {reason}")]
    RenewalWriteFailure { item_id: i64, reason: String },

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),
}

/// Offset for a 1-based page number.
pub(crate) fn page_offset(page: i64) -> i64 {
    (page.max(1) - 1) * PAGE_SIZE
}

/// `%query%` pattern for `ILIKE`, with wildcards in the input escaped.
pub(crate) fn contains_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
