//! Renewal engine: renew an item's dates and keep the append-only renewal log.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, DateTime, Duration, Months, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::InventoryError;
use crate::models::inventory::{Item, ItemType, Renewal, RenewalDates};

/// "Recent renewals" look back this many days.
pub const RECENT_WINDOW_DAYS: i64 = 30;

/// "Recent renewals" return at most this many rows.
pub const RECENT_LIMIT: i64 = 5;

/// Default hardware replacement cycle used when suggesting renewal dates.
const HARDWARE_CYCLE_YEARS: u32 = 5;

/// Storage seam for the renew transaction and the renewal log.
#[async_trait]
pub trait RenewalStore: Send + Sync {
    /// Apply `dates` to the item and append a renewal row stamped `renewed_at`.
    ///
    /// Both writes happen atomically: on any failure neither is visible.
    async fn renew(
        &self,
        item_id: i64,
        dates: &RenewalDates,
        renewed_at: DateTime<Utc>,
    ) -> Result<(Item, Renewal), InventoryError>;

    /// The most recent renewal of each item, newest first.
    ///
    /// `since` drops rows renewed before it; `limit` caps the result.
    async fn latest_per_item(
        &self,
        since: Option<DateTime<Utc>>,
        limit: Option<i64>,
    ) -> Result<Vec<Renewal>, InventoryError>;

    /// Every renewal of one item, newest first.
    async fn history(&self, item_id: i64) -> Result<Vec<Renewal>, InventoryError>;
}

/// Result of a successful renew action.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalOutcome {
    pub item: Item,
    pub renewal: Renewal,
}

/// Renews items and answers renewal-log queries.
#[derive(Clone)]
pub struct RenewalEngine {
    store: Arc<dyn RenewalStore>,
}

impl RenewalEngine {
    pub fn new(store: Arc<dyn RenewalStore>) -> Self {
        Self { store }
    }

    /// Renew an item with caller-supplied dates.
    pub async fn renew(
        &self,
        item_id: i64,
        dates: RenewalDates,
    ) -> Result<RenewalOutcome, InventoryError> {
        self.renew_at(item_id, dates, Utc::now()).await
    }

    /// [`renew`](Self::renew) with an explicit clock.
    pub async fn renew_at(
        &self,
        item_id: i64,
        dates: RenewalDates,
        now: DateTime<Utc>,
    ) -> Result<RenewalOutcome, InventoryError> {
        let (item, renewal) = self
            .store
            .renew(item_id, &dates, now)
            .await
            .inspect_err(|e| warn!(item_id, error = %e, "renewal failed"))?;
        info!(
            item_id,
            renewal_id = renewal.id,
            expiration_date = ?item.expiration_date,
            "item renewed"
        );
        Ok(RenewalOutcome { item, renewal })
    }

    /// The most recent renewal of every item, newest first.
    pub async fn latest_per_item(&self) -> Result<Vec<Renewal>, InventoryError> {
        self.store.latest_per_item(None, None).await
    }

    /// Latest renewals from the last 30 days, newest first, at most 5.
    pub async fn recent(&self, now: DateTime<Utc>) -> Result<Vec<Renewal>, InventoryError> {
        let since = now - Duration::days(RECENT_WINDOW_DAYS);
        self.store
            .latest_per_item(Some(since), Some(RECENT_LIMIT))
            .await
    }

    /// Full renewal history of one item.
    pub async fn history(&self, item_id: i64) -> Result<Vec<Renewal>, InventoryError> {
        self.store.history(item_id).await
    }
}

/// Reduce a renewal log to the newest row per item, newest first.
///
/// Ties on `renewed_at` go to the higher id.
pub fn latest_per_item(rows: &[Renewal]) -> Vec<Renewal> {
    let mut latest: HashMap<i64, &Renewal> = HashMap::new();
    for row in rows {
        latest
            .entry(row.item_id)
            .and_modify(|current| {
                if (row.renewed_at, row.id) > (current.renewed_at, current.id) {
                    *current = row;
                }
            })
            .or_insert(row);
    }
    let mut out: Vec<Renewal> = latest.into_values().cloned().collect();
    out.sort_by(|a, b| (b.renewed_at, b.id).cmp(&(a.renewed_at, a.id)));
    out
}

/// Suggest the dates a renew form should start with.
///
/// Hardware restarts a five-year cycle from today. Software with both a
/// subscription and expiration date keeps its term length in whole years.
/// Anything else carries the current expiration date over.
pub fn suggest_dates(item: &Item, today: DateTime<Utc>) -> RenewalDates {
    match item.item_type {
        ItemType::Hardware => RenewalDates {
            subscription_date: None,
            purchase_date: Some(today),
            expiration_date: add_years(today, i64::from(HARDWARE_CYCLE_YEARS))
                .or(item.expiration_date),
        },
        ItemType::Software => {
            let expiration_date = match (item.subscription_date, item.expiration_date) {
                (Some(subscribed), Some(expires)) => {
                    let term = i64::from(expires.year()) - i64::from(subscribed.year());
                    add_years(today, term).or(Some(expires))
                }
                (_, expires) => expires,
            };
            RenewalDates {
                subscription_date: Some(today),
                purchase_date: None,
                expiration_date,
            }
        }
    }
}

fn add_years(from: DateTime<Utc>, years: i64) -> Option<DateTime<Utc>> {
    let months = u32::try_from(years.unsigned_abs().checked_mul(12)?).ok()?;
    if years >= 0 {
        from.checked_add_months(Months::new(months))
    } else {
        from.checked_sub_months(Months::new(months))
    }
}
