//! Expiration status derived from an item's stored dates.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::inventory::{Item, ItemView};

const SECS_PER_DAY: i64 = 24 * 60 * 60;

/// Lifecycle status of an item at a given instant. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpirationStatus {
    /// Expiration date has passed.
    Expired,
    /// Expires within the horizon.
    ExpiringSoon,
    /// Expires beyond the horizon.
    Active,
    /// No expiration date.
    Lifetime,
}

/// How far ahead "expiring soon" looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Horizon {
    Week,
    Fortnight,
    #[default]
    Month,
}

impl Horizon {
    pub fn days(self) -> i64 {
        match self {
            Horizon::Week => 7,
            Horizon::Fortnight => 14,
            Horizon::Month => 30,
        }
    }

    pub fn duration(self) -> Duration {
        Duration::days(self.days())
    }
}

/// Classify an expiration date relative to `now`.
pub fn classify(
    expiration: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    horizon: Horizon,
) -> ExpirationStatus {
    match expiration {
        None => ExpirationStatus::Lifetime,
        Some(at) if at < now => ExpirationStatus::Expired,
        Some(at) if at <= now + horizon.duration() => ExpirationStatus::ExpiringSoon,
        Some(_) => ExpirationStatus::Active,
    }
}

/// Whole days from `now` until `expiration`, rounded up.
pub fn days_until(expiration: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let secs = (expiration - now).num_seconds();
    (secs + SECS_PER_DAY - 1).div_euclid(SECS_PER_DAY)
}

/// Attach the derived status (and days left) to an item.
pub fn view(item: Item, now: DateTime<Utc>, horizon: Horizon) -> ItemView {
    let status = classify(item.expiration_date, now, horizon);
    let days_left = item.expiration_date.map(|at| days_until(at, now));
    ItemView {
        item,
        status,
        days_left,
    }
}
