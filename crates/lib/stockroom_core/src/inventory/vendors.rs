//! Vendor persistence.

use std::collections::HashMap;

use sqlx::PgPool;

use super::{InventoryError, PAGE_SIZE, contains_pattern, page_offset};
use crate::models::inventory::{Page, Vendor, VendorInput, VendorStatus, VendorWithItems};

/// Filters for [`list_vendors`].
#[derive(Debug, Clone, Default)]
pub struct VendorFilter {
    /// Case-insensitive match on name, email or contact.
    pub query: Option<String>,
    pub status: Option<VendorStatus>,
    /// 1-based page number.
    pub page: i64,
}

fn require_name(input: &VendorInput) -> Result<(), InventoryError> {
    if input.name.trim().is_empty() {
        return Err(InventoryError::Validation("Vendor name is required".into()));
    }
    Ok(())
}

/// Treat blank optional text as absent.
fn blank_to_none(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Create a vendor. Status defaults to ACTIVE.
pub async fn create_vendor(pool: &PgPool, input: &VendorInput) -> Result<Vendor, InventoryError> {
    require_name(input)?;
    let row = sqlx::query_as::<_, Vendor>(
        r#"
        INSERT INTO vendors (name, contact, email, status)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(input.name.trim())
    .bind(blank_to_none(&input.contact))
    .bind(blank_to_none(&input.email))
    .bind(input.status.unwrap_or_default())
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Replace a vendor's fields. Status defaults to ACTIVE.
pub async fn update_vendor(
    pool: &PgPool,
    id: i64,
    input: &VendorInput,
) -> Result<Vendor, InventoryError> {
    require_name(input)?;
    sqlx::query_as::<_, Vendor>(
        r#"
        UPDATE vendors
        SET name = $2, contact = $3, email = $4, status = $5, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(input.name.trim())
    .bind(blank_to_none(&input.contact))
    .bind(blank_to_none(&input.email))
    .bind(input.status.unwrap_or_default())
    .fetch_optional(pool)
    .await?
    .ok_or(InventoryError::VendorNotFound(id))
}

/// Fetch one vendor.
pub async fn get_vendor(pool: &PgPool, id: i64) -> Result<Vendor, InventoryError> {
    sqlx::query_as::<_, Vendor>("SELECT * FROM vendors WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(InventoryError::VendorNotFound(id))
}

/// One page of vendors ordered by name, each with its item names.
pub async fn list_vendors(
    pool: &PgPool,
    filter: &VendorFilter,
) -> Result<Page<VendorWithItems>, InventoryError> {
    let pattern = filter.query.as_deref().map(contains_pattern);

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM vendors
        WHERE ($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1 OR contact ILIKE $1)
          AND ($2::vendor_status IS NULL OR status = $2)
        "#,
    )
    .bind(&pattern)
    .bind(filter.status)
    .fetch_one(pool)
    .await?;

    let vendors = sqlx::query_as::<_, Vendor>(
        r#"
        SELECT *
        FROM vendors
        WHERE ($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1 OR contact ILIKE $1)
          AND ($2::vendor_status IS NULL OR status = $2)
        ORDER BY name ASC, id ASC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(&pattern)
    .bind(filter.status)
    .bind(PAGE_SIZE)
    .bind(page_offset(filter.page))
    .fetch_all(pool)
    .await?;

    let ids: Vec<i64> = vendors.iter().map(|v| v.id).collect();
    let item_rows = sqlx::query_as::<_, (i64, String)>(
        "SELECT vendor_id, name FROM items WHERE vendor_id = ANY($1) ORDER BY name ASC",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut names: HashMap<i64, Vec<String>> = HashMap::new();
    for (vendor_id, name) in item_rows {
        names.entry(vendor_id).or_default().push(name);
    }

    let results = vendors
        .into_iter()
        .map(|vendor| {
            let item_names = names.remove(&vendor.id).unwrap_or_default();
            VendorWithItems { vendor, item_names }
        })
        .collect();

    Ok(Page::new(results, total, PAGE_SIZE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_name_is_required() {
        let input = VendorInput {
            name: "   ".into(),
            contact: None,
            email: None,
            status: None,
        };
        assert!(matches!(
            require_name(&input),
            Err(InventoryError::Validation(_))
        ));
    }

    #[test]
    fn blank_optionals_become_null() {
        assert_eq!(blank_to_none(&Some("  ".into())), None);
        assert_eq!(blank_to_none(&None), None);
        assert_eq!(blank_to_none(&Some(" a@b.c ".into())), Some("a@b.c"));
    }
}
