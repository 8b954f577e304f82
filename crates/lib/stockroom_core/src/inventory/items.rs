//! Item persistence.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::status::Horizon;
use super::{InventoryError, contains_pattern};
use crate::models::inventory::{Item, ItemUpdate, NewItem};

/// Postgres foreign-key-violation SQLSTATE.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Filters for [`list_items`].
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    /// Case-insensitive match on name, owner or owner email.
    pub query: Option<String>,
    pub archived: bool,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

fn validate_new_item(item: &NewItem) -> Result<(), InventoryError> {
    if item.name.trim().is_empty() {
        return Err(InventoryError::Validation("Item name is required".into()));
    }
    if item.owner.trim().is_empty() {
        return Err(InventoryError::Validation("Item owner is required".into()));
    }
    if let (Some(start), Some(end)) = (
        item.subscription_date.or(item.purchase_date),
        item.expiration_date,
    ) && end < start
    {
        return Err(InventoryError::Validation(
            "Expiration date must not precede the subscription or purchase date".into(),
        ));
    }
    Ok(())
}

/// Create an item.
pub async fn create_item(pool: &PgPool, item: &NewItem) -> Result<Item, InventoryError> {
    validate_new_item(item)?;
    let row = sqlx::query_as::<_, Item>(
        r#"
        INSERT INTO items (
            name, description, owner, owner_email, item_type,
            purchase_date, subscription_date, expiration_date,
            attachment, requisition_number, number_of_licenses, vendor_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(&item.name)
    .bind(&item.description)
    .bind(&item.owner)
    .bind(&item.owner_email)
    .bind(item.item_type)
    .bind(item.purchase_date)
    .bind(item.subscription_date)
    .bind(item.expiration_date)
    .bind(&item.attachment)
    .bind(&item.requisition_number)
    .bind(item.number_of_licenses)
    .bind(item.vendor_id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Fetch one item.
pub async fn get_item(pool: &PgPool, id: i64) -> Result<Item, InventoryError> {
    sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(InventoryError::ItemNotFound(id))
}

fn validate_window(filter: &ItemFilter) -> Result<(), InventoryError> {
    if filter.offset.is_some_and(|o| o < 0) {
        return Err(InventoryError::Validation("offset must not be negative".into()));
    }
    if filter.limit.is_some_and(|l| l < 0) {
        return Err(InventoryError::Validation("limit must not be negative".into()));
    }
    Ok(())
}

/// List items, newest first.
pub async fn list_items(pool: &PgPool, filter: &ItemFilter) -> Result<Vec<Item>, InventoryError> {
    validate_window(filter)?;
    let pattern = filter.query.as_deref().map(contains_pattern);
    let rows = sqlx::query_as::<_, Item>(
        r#"
        SELECT *
        FROM items
        WHERE archived = $1
          AND ($2::text IS NULL
               OR name ILIKE $2 OR owner ILIKE $2 OR owner_email ILIKE $2)
        ORDER BY created_at DESC, id DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(filter.archived)
    .bind(pattern)
    .bind(filter.limit)
    .bind(filter.offset.unwrap_or(0))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Apply a partial update. Absent fields keep their value; an explicit `null`
/// clears a nullable field.
pub async fn update_item(
    pool: &PgPool,
    id: i64,
    update: &ItemUpdate,
) -> Result<Item, InventoryError> {
    if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(InventoryError::Validation("Item name is required".into()));
    }
    sqlx::query_as::<_, Item>(
        r#"
        UPDATE items
        SET name = COALESCE($2, name),
            description = COALESCE($3, description),
            owner = COALESCE($4, owner),
            owner_email = COALESCE($5, owner_email),
            item_type = COALESCE($6, item_type),
            attachment = COALESCE($7, attachment),
            purchase_date = CASE WHEN $8 THEN $9 ELSE purchase_date END,
            subscription_date = CASE WHEN $10 THEN $11 ELSE subscription_date END,
            expiration_date = CASE WHEN $12 THEN $13 ELSE expiration_date END,
            requisition_number = CASE WHEN $14 THEN $15 ELSE requisition_number END,
            number_of_licenses = CASE WHEN $16 THEN $17 ELSE number_of_licenses END,
            vendor_id = CASE WHEN $18 THEN $19 ELSE vendor_id END,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&update.name)
    .bind(&update.description)
    .bind(&update.owner)
    .bind(&update.owner_email)
    .bind(update.item_type)
    .bind(&update.attachment)
    .bind(update.purchase_date.is_some())
    .bind(update.purchase_date.flatten())
    .bind(update.subscription_date.is_some())
    .bind(update.subscription_date.flatten())
    .bind(update.expiration_date.is_some())
    .bind(update.expiration_date.flatten())
    .bind(update.requisition_number.is_some())
    .bind(update.requisition_number.clone().flatten())
    .bind(update.number_of_licenses.is_some())
    .bind(update.number_of_licenses.flatten())
    .bind(update.vendor_id.is_some())
    .bind(update.vendor_id.flatten())
    .fetch_optional(pool)
    .await?
    .ok_or(InventoryError::ItemNotFound(id))
}

/// Delete an item and its license keys.
///
/// Items with renewal history are refused; archive them instead.
pub async fn delete_item(pool: &PgPool, id: i64) -> Result<(), InventoryError> {
    let result = sqlx::query("DELETE FROM items WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await;
    match result {
        Ok(done) if done.rows_affected() == 0 => Err(InventoryError::ItemNotFound(id)),
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) => {
            Err(InventoryError::Validation(
                "Item has renewal history; archive it instead".into(),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

/// Set or clear the archived flag.
pub async fn set_archived(pool: &PgPool, id: i64, archived: bool) -> Result<Item, InventoryError> {
    sqlx::query_as::<_, Item>(
        "UPDATE items SET archived = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(archived)
    .fetch_optional(pool)
    .await?
    .ok_or(InventoryError::ItemNotFound(id))
}

/// Unarchived items expiring on or before `now + horizon`, soonest first.
///
/// Already-expired items are included.
pub async fn expiring_items(
    pool: &PgPool,
    now: DateTime<Utc>,
    horizon: Horizon,
) -> Result<Vec<Item>, InventoryError> {
    let rows = sqlx::query_as::<_, Item>(
        r#"
        SELECT *
        FROM items
        WHERE NOT archived
          AND expiration_date IS NOT NULL
          AND expiration_date <= $1
        ORDER BY expiration_date ASC, id ASC
        "#,
    )
    .bind(now + horizon.duration())
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Unarchived items whose expiration date has passed, most recently expired first.
pub async fn expired_items(pool: &PgPool, now: DateTime<Utc>) -> Result<Vec<Item>, InventoryError> {
    let rows = sqlx::query_as::<_, Item>(
        r#"
        SELECT *
        FROM items
        WHERE NOT archived
          AND expiration_date < $1
        ORDER BY expiration_date DESC, id ASC
        "#,
    )
    .bind(now)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Items with no expiration date.
pub async fn lifetime_items(pool: &PgPool) -> Result<Vec<Item>, InventoryError> {
    let rows = sqlx::query_as::<_, Item>(
        "SELECT * FROM items WHERE NOT archived AND expiration_date IS NULL ORDER BY name ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
