//! Dashboard and renewal-report aggregates.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;

use super::InventoryError;
use super::items::expiring_items;
use super::renewal::{RECENT_WINDOW_DAYS, RenewalEngine};
use super::status::{Horizon, view};
use crate::models::inventory::{ItemView, Renewal};

/// Expiring items shown on the dashboard overview.
const OVERVIEW_EXPIRING: usize = 3;

/// Dashboard overview.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_items: i64,
    /// Unexpired items expiring within 30 days.
    pub expiring_soon: i64,
    /// Items renewed within the last 30 days.
    pub recently_renewed: i64,
    pub lifetime: i64,
    pub recent_renewals: Vec<Renewal>,
    pub expiring: Vec<ItemView>,
}

/// Renewal report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalReport {
    pub total_renewals: i64,
    pub renewals_last_month: i64,
    pub upcoming: i64,
    pub expired: i64,
    /// Latest renewal of each item, newest first.
    pub latest: Vec<Renewal>,
}

#[derive(Debug, sqlx::FromRow)]
struct ItemCounts {
    total: i64,
    expiring_soon: i64,
    expired: i64,
    lifetime: i64,
}

async fn item_counts(
    pool: &PgPool,
    now: DateTime<Utc>,
    horizon: Horizon,
) -> Result<ItemCounts, InventoryError> {
    let counts = sqlx::query_as::<_, ItemCounts>(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(*) FILTER (WHERE expiration_date >= $1 AND expiration_date <= $2) AS expiring_soon,
            COUNT(*) FILTER (WHERE expiration_date < $1) AS expired,
            COUNT(*) FILTER (WHERE expiration_date IS NULL) AS lifetime
        FROM items
        WHERE NOT archived
        "#,
    )
    .bind(now)
    .bind(now + horizon.duration())
    .fetch_one(pool)
    .await?;
    Ok(counts)
}

#[derive(Debug, sqlx::FromRow)]
struct RenewalCounts {
    total: i64,
    in_window: i64,
    items_in_window: i64,
}

async fn renewal_counts(
    pool: &PgPool,
    since: DateTime<Utc>,
) -> Result<RenewalCounts, InventoryError> {
    let counts = sqlx::query_as::<_, RenewalCounts>(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(*) FILTER (WHERE renewed_at >= $1) AS in_window,
            COUNT(DISTINCT item_id) FILTER (WHERE renewed_at >= $1) AS items_in_window
        FROM renewals
        "#,
    )
    .bind(since)
    .fetch_one(pool)
    .await?;
    Ok(counts)
}

/// Build the dashboard overview.
pub async fn dashboard(
    pool: &PgPool,
    renewals: &RenewalEngine,
    now: DateTime<Utc>,
) -> Result<DashboardSummary, InventoryError> {
    let items = item_counts(pool, now, Horizon::Month).await?;
    let renewed = renewal_counts(pool, now - Duration::days(RECENT_WINDOW_DAYS)).await?;
    let recent_renewals = renewals.recent(now).await?;
    let expiring = expiring_items(pool, now, Horizon::Month)
        .await?
        .into_iter()
        .take(OVERVIEW_EXPIRING)
        .map(|item| view(item, now, Horizon::Month))
        .collect();

    Ok(DashboardSummary {
        total_items: items.total,
        expiring_soon: items.expiring_soon,
        recently_renewed: renewed.items_in_window,
        lifetime: items.lifetime,
        recent_renewals,
        expiring,
    })
}

/// Build the renewal report, optionally filtered by item name or owner.
pub async fn renewal_report(
    pool: &PgPool,
    renewals: &RenewalEngine,
    now: DateTime<Utc>,
    query: Option<&str>,
) -> Result<RenewalReport, InventoryError> {
    let items = item_counts(pool, now, Horizon::Month).await?;
    let counts = renewal_counts(pool, now - Duration::days(RECENT_WINDOW_DAYS)).await?;
    let latest = filter_renewals(renewals.latest_per_item().await?, query);

    Ok(RenewalReport {
        total_renewals: counts.total,
        renewals_last_month: counts.in_window,
        upcoming: items.expiring_soon,
        expired: items.expired,
        latest,
    })
}

/// Keep renewals whose item name or owner contains `query`, ignoring case.
pub fn filter_renewals(rows: Vec<Renewal>, query: Option<&str>) -> Vec<Renewal> {
    let Some(needle) = query.map(str::trim).filter(|q| !q.is_empty()) else {
        return rows;
    };
    let needle = needle.to_lowercase();
    rows.into_iter()
        .filter(|r| {
            r.item_name.to_lowercase().contains(&needle)
                || r.item_owner.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renewal(id: i64, name: &str, owner: &str) -> Renewal {
        Renewal {
            id,
            item_id: id,
            item_name: name.into(),
            item_owner: owner.into(),
            renewed_at: Utc::now(),
        }
    }

    #[test]
    fn filter_matches_name_or_owner_case_insensitively() {
        let rows = vec![
            renewal(1, "Adobe CC", "Design"),
            renewal(2, "Dell Laptop", "IT Ops"),
            renewal(3, "Slack", "Comms"),
        ];
        let by_name: Vec<i64> = filter_renewals(rows.clone(), Some("adobe"))
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(by_name, vec![1]);

        let by_owner: Vec<i64> = filter_renewals(rows.clone(), Some("ops"))
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(by_owner, vec![2]);

        assert_eq!(filter_renewals(rows.clone(), Some("  ")).len(), 3);
        assert_eq!(filter_renewals(rows, None).len(), 3);
    }
}
