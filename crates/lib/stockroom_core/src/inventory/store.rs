//! Renewal store implementations.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::RwLock;

use super::InventoryError;
use super::renewal::{RenewalStore, latest_per_item};
use crate::models::inventory::{Item, Renewal, RenewalDates};

/// PostgreSQL-backed renewals.
#[derive(Clone)]
pub struct PgRenewalStore {
    pool: PgPool,
}

impl PgRenewalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn write_failure(item_id: i64) -> impl FnOnce(sqlx::Error) -> InventoryError {
    move |e| InventoryError::RenewalWriteFailure {
        item_id,
        reason: e.to_string(),
    }
}

#[async_trait]
impl RenewalStore for PgRenewalStore {
    async fn renew(
        &self,
        item_id: i64,
        dates: &RenewalDates,
        renewed_at: DateTime<Utc>,
    ) -> Result<(Item, Renewal), InventoryError> {
        let mut tx = self.pool.begin().await.map_err(write_failure(item_id))?;

        // Row lock serializes concurrent renewals of the same item.
        let locked = sqlx::query_scalar::<_, i64>("SELECT id FROM items WHERE id = $1 FOR UPDATE")
            .bind(item_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(write_failure(item_id))?;
        if locked.is_none() {
            return Err(InventoryError::ItemNotFound(item_id));
        }

        let item = sqlx::query_as::<_, Item>(
            r#"
            UPDATE items
            SET subscription_date = COALESCE($2, subscription_date),
                purchase_date = COALESCE($3, purchase_date),
                expiration_date = COALESCE($4, expiration_date),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(dates.subscription_date)
        .bind(dates.purchase_date)
        .bind(dates.expiration_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(write_failure(item_id))?;

        let (id, renewed_at) = sqlx::query_as::<_, (i64, DateTime<Utc>)>(
            "INSERT INTO renewals (item_id, renewed_at) VALUES ($1, $2) RETURNING id, renewed_at",
        )
        .bind(item_id)
        .bind(renewed_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(write_failure(item_id))?;

        tx.commit().await.map_err(write_failure(item_id))?;

        let renewal = Renewal {
            id,
            item_id,
            item_name: item.name.clone(),
            item_owner: item.owner.clone(),
            renewed_at,
        };
        Ok((item, renewal))
    }

    async fn latest_per_item(
        &self,
        since: Option<DateTime<Utc>>,
        limit: Option<i64>,
    ) -> Result<Vec<Renewal>, InventoryError> {
        let rows = sqlx::query_as::<_, Renewal>(
            r#"
            SELECT latest.id, latest.item_id, latest.item_name, latest.item_owner, latest.renewed_at
            FROM (
                SELECT DISTINCT ON (r.item_id)
                    r.id, r.item_id, i.name AS item_name, i.owner AS item_owner, r.renewed_at
                FROM renewals r
                JOIN items i ON i.id = r.item_id
                ORDER BY r.item_id, r.renewed_at DESC, r.id DESC
            ) latest
            WHERE $1::timestamptz IS NULL OR latest.renewed_at >= $1
            ORDER BY latest.renewed_at DESC, latest.id DESC
            LIMIT $2
            "#,
        )
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn history(&self, item_id: i64) -> Result<Vec<Renewal>, InventoryError> {
        let rows = sqlx::query_as::<_, Renewal>(
            r#"
            SELECT r.id, r.item_id, i.name AS item_name, i.owner AS item_owner, r.renewed_at
            FROM renewals r
            JOIN items i ON i.id = r.item_id
            WHERE r.item_id = $1
            ORDER BY r.renewed_at DESC, r.id DESC
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    items: HashMap<i64, Item>,
    renewals: Vec<Renewal>,
    next_renewal_id: i64,
}

/// In-process renewals, for tests.
#[derive(Debug, Default)]
pub struct MemoryRenewalStore {
    state: RwLock<MemoryState>,
    fail_writes: AtomicBool,
}

impl MemoryRenewalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an item.
    pub async fn insert_item(&self, item: Item) {
        self.state.write().await.items.insert(item.id, item);
    }

    /// Current state of an item.
    pub async fn item(&self, id: i64) -> Option<Item> {
        self.state.read().await.items.get(&id).cloned()
    }

    /// Make every subsequent renew fail after the item lookup.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RenewalStore for MemoryRenewalStore {
    async fn renew(
        &self,
        item_id: i64,
        dates: &RenewalDates,
        renewed_at: DateTime<Utc>,
    ) -> Result<(Item, Renewal), InventoryError> {
        let mut state = self.state.write().await;

        let mut item = state
            .items
            .get(&item_id)
            .cloned()
            .ok_or(InventoryError::ItemNotFound(item_id))?;

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(InventoryError::RenewalWriteFailure {
                item_id,
                reason: "simulated write failure".into(),
            });
        }

        if let Some(at) = dates.subscription_date {
            item.subscription_date = Some(at);
        }
        if let Some(at) = dates.purchase_date {
            item.purchase_date = Some(at);
        }
        if let Some(at) = dates.expiration_date {
            item.expiration_date = Some(at);
        }
        item.updated_at = renewed_at;

        state.next_renewal_id += 1;
        let renewal = Renewal {
            id: state.next_renewal_id,
            item_id,
            item_name: item.name.clone(),
            item_owner: item.owner.clone(),
            renewed_at,
        };
        state.items.insert(item_id, item.clone());
        state.renewals.push(renewal.clone());

        Ok((item, renewal))
    }

    async fn latest_per_item(
        &self,
        since: Option<DateTime<Utc>>,
        limit: Option<i64>,
    ) -> Result<Vec<Renewal>, InventoryError> {
        let state = self.state.read().await;
        let rows = latest_per_item(&state.renewals)
            .into_iter()
            .filter(|r| since.is_none_or(|since| r.renewed_at >= since));
        Ok(match limit {
            Some(n) => rows.take(usize::try_from(n).unwrap_or(0)).collect(),
            None => rows.collect(),
        })
    }

    async fn history(&self, item_id: i64) -> Result<Vec<Renewal>, InventoryError> {
        let state = self.state.read().await;
        let mut rows: Vec<Renewal> = state
            .renewals
            .iter()
            .filter(|r| r.item_id == item_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.renewed_at, b.id).cmp(&(a.renewed_at, a.id)));
        Ok(rows)
    }
}
