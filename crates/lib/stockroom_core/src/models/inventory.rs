//! Inventory domain models: items, vendors, license keys and renewals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::inventory::status::ExpirationStatus;

/// Item classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "item_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemType {
    Hardware,
    Software,
}

/// Vendor status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "vendor_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum VendorStatus {
    #[default]
    Active,
    Inactive,
}

/// License key status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "license_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    #[default]
    Active,
    Inactive,
}

/// A tracked hardware or software item.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub owner: String,
    pub owner_email: String,
    pub item_type: ItemType,
    pub purchase_date: Option<DateTime<Utc>>,
    pub subscription_date: Option<DateTime<Utc>>,
    /// `None` means a lifetime item.
    pub expiration_date: Option<DateTime<Utc>>,
    pub archived: bool,
    pub attachment: String,
    pub requisition_number: Option<String>,
    pub number_of_licenses: Option<i32>,
    pub vendor_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An item together with its derived expiration status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    #[serde(flatten)]
    pub item: Item,
    pub status: ExpirationStatus,
    /// Whole days until expiry, rounded up; negative once expired.
    pub days_left: Option<i64>,
}

/// Fields for creating an item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub owner: String,
    pub owner_email: String,
    pub item_type: ItemType,
    pub purchase_date: Option<DateTime<Utc>>,
    pub subscription_date: Option<DateTime<Utc>>,
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attachment: String,
    pub requisition_number: Option<String>,
    pub number_of_licenses: Option<i32>,
    pub vendor_id: Option<i64>,
}

/// Partial item update; absent fields keep their stored value.
///
/// Nullable columns take `Some(None)` from an explicit JSON `null`, which
/// clears them (a `null` expiration date makes the item lifetime).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub owner_email: Option<String>,
    pub item_type: Option<ItemType>,
    #[serde(default, deserialize_with = "nullable")]
    pub purchase_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "nullable")]
    pub subscription_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "nullable")]
    pub expiration_date: Option<Option<DateTime<Utc>>>,
    pub attachment: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub requisition_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub number_of_licenses: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub vendor_id: Option<Option<i64>>,
}

/// Present field (value or `null`) becomes `Some`; `default` covers absence.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A vendor supplying items.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: i64,
    pub name: String,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub status: VendorStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A vendor with the names of its items.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorWithItems {
    #[serde(flatten)]
    pub vendor: Vendor,
    pub item_names: Vec<String>,
}

/// Fields for creating or replacing a vendor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorInput {
    #[serde(default)]
    pub name: String,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub status: Option<VendorStatus>,
}

/// A software license key.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LicenseKey {
    pub id: i64,
    pub key: String,
    pub status: LicenseStatus,
    pub item_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A license key with the name of the item it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LicenseKeyEntry {
    pub id: i64,
    pub key: String,
    pub status: LicenseStatus,
    pub item_id: i64,
    pub item_name: String,
    pub created_at: DateTime<Utc>,
}

/// One append-only renewal log row, joined with its item's name and owner.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Renewal {
    pub id: i64,
    pub item_id: i64,
    pub item_name: String,
    pub item_owner: String,
    pub renewed_at: DateTime<Utc>,
}

/// New lifecycle dates supplied to a renew action.
///
/// Absent fields leave the stored value unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalDates {
    pub subscription_date: Option<DateTime<Utc>>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub expiration_date: Option<DateTime<Utc>>,
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub results: Vec<T>,
    pub total_count: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, total_count: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total_count + per_page - 1) / per_page
        } else {
            0
        };
        Self {
            results,
            total_count,
            total_pages,
        }
    }
}
