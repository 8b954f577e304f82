//! License key persistence.

use sqlx::PgPool;

use super::{InventoryError, PAGE_SIZE, contains_pattern, page_offset};
use crate::models::inventory::{ItemType, LicenseKey, LicenseKeyEntry, LicenseStatus, Page};

/// Postgres unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

/// Filters for [`list_license_keys`].
#[derive(Debug, Clone, Default)]
pub struct LicenseKeyFilter {
    /// Case-insensitive match on the key or the item name.
    pub query: Option<String>,
    /// `None` lists every status.
    pub status: Option<LicenseStatus>,
    /// 1-based page number.
    pub page: i64,
}

/// Attach a new key to a software item.
pub async fn create_license_key(
    pool: &PgPool,
    item_id: i64,
    key: &str,
    status: LicenseStatus,
) -> Result<LicenseKey, InventoryError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(InventoryError::Validation("Missing required fields".into()));
    }

    let item_type = sqlx::query_scalar::<_, ItemType>("SELECT item_type FROM items WHERE id = $1")
        .bind(item_id)
        .fetch_optional(pool)
        .await?
        .ok_or(InventoryError::ItemNotFound(item_id))?;
    if item_type != ItemType::Software {
        return Err(InventoryError::Validation(
            "License keys can only be added to software items".into(),
        ));
    }

    let result = sqlx::query_as::<_, LicenseKey>(
        "INSERT INTO license_keys (key, status, item_id) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(key)
    .bind(status)
    .bind(item_id)
    .fetch_one(pool)
    .await;

    match result {
        Ok(row) => Ok(row),
        Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => Err(
            InventoryError::Validation("License key already exists.".into()),
        ),
        Err(e) => Err(e.into()),
    }
}

/// Change a key's status.
pub async fn update_license_status(
    pool: &PgPool,
    id: i64,
    status: LicenseStatus,
) -> Result<LicenseKey, InventoryError> {
    sqlx::query_as::<_, LicenseKey>(
        "UPDATE license_keys SET status = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status)
    .fetch_optional(pool)
    .await?
    .ok_or(InventoryError::LicenseKeyNotFound(id))
}

/// Keys belonging to one item, oldest first.
pub async fn keys_for_item(pool: &PgPool, item_id: i64) -> Result<Vec<LicenseKey>, InventoryError> {
    let rows = sqlx::query_as::<_, LicenseKey>(
        "SELECT * FROM license_keys WHERE item_id = $1 ORDER BY created_at ASC, id ASC",
    )
    .bind(item_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// One page of keys, newest first, with item names.
pub async fn list_license_keys(
    pool: &PgPool,
    filter: &LicenseKeyFilter,
) -> Result<Page<LicenseKeyEntry>, InventoryError> {
    let pattern = filter.query.as_deref().map(contains_pattern);

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM license_keys k
        JOIN items i ON i.id = k.item_id
        WHERE ($1::text IS NULL OR k.key ILIKE $1 OR i.name ILIKE $1)
          AND ($2::license_status IS NULL OR k.status = $2)
        "#,
    )
    .bind(&pattern)
    .bind(filter.status)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query_as::<_, LicenseKeyEntry>(
        r#"
        SELECT k.id, k.key, k.status, k.item_id, i.name AS item_name, k.created_at
        FROM license_keys k
        JOIN items i ON i.id = k.item_id
        WHERE ($1::text IS NULL OR k.key ILIKE $1 OR i.name ILIKE $1)
          AND ($2::license_status IS NULL OR k.status = $2)
        ORDER BY k.created_at DESC, k.id DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(&pattern)
    .bind(filter.status)
    .bind(PAGE_SIZE)
    .bind(page_offset(filter.page))
    .fetch_all(pool)
    .await?;

    Ok(Page::new(rows, total, PAGE_SIZE))
}
