//! Persistence for the single session-token slot.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::RwLock;

use super::AuthError;
use crate::models::auth::TokenRecord;

/// Fixed key of the only token row.
pub const TOKEN_SLOT_ID: i16 = 1;

/// Storage for the current session token.
///
/// There is exactly one slot: `replace` overwrites whatever session existed,
/// so at most one token can validate at a time.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Overwrite the slot with a freshly issued token. Clears `revoked`.
    async fn replace(
        &self,
        token_value: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<TokenRecord, AuthError>;

    /// Look a token up by its exact value.
    async fn find_by_value(&self, token_value: &str) -> Result<Option<TokenRecord>, AuthError>;

    /// Mark the token with this value revoked. Returns whether it matched.
    async fn revoke(&self, token_value: &str) -> Result<bool, AuthError>;

    /// The token currently occupying the slot, if any.
    async fn current(&self) -> Result<Option<TokenRecord>, AuthError>;
}

/// PostgreSQL-backed token slot (`auth_token` table).
#[derive(Clone)]
pub struct PgTokenStore {
    pool: PgPool,
}

impl PgTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn replace(
        &self,
        token_value: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<TokenRecord, AuthError> {
        let record = sqlx::query_as::<_, TokenRecord>(
            r#"
            INSERT INTO auth_token (id, token_value, issued_at, expires_at, revoked)
            VALUES ($1, $2, $3, $4, false)
            ON CONFLICT (id) DO UPDATE
            SET token_value = EXCLUDED.token_value,
                issued_at = EXCLUDED.issued_at,
                expires_at = EXCLUDED.expires_at,
                revoked = false
            RETURNING id, token_value, issued_at, expires_at, revoked
            "#,
        )
        .bind(TOKEN_SLOT_ID)
        .bind(token_value)
        .bind(issued_at)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    async fn find_by_value(&self, token_value: &str) -> Result<Option<TokenRecord>, AuthError> {
        let record = sqlx::query_as::<_, TokenRecord>(
            "SELECT id, token_value, issued_at, expires_at, revoked \
             FROM auth_token WHERE token_value = $1",
        )
        .bind(token_value)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn revoke(&self, token_value: &str) -> Result<bool, AuthError> {
        let result = sqlx::query("UPDATE auth_token SET revoked = true WHERE token_value = $1")
            .bind(token_value)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn current(&self) -> Result<Option<TokenRecord>, AuthError> {
        let record = sqlx::query_as::<_, TokenRecord>(
            "SELECT id, token_value, issued_at, expires_at, revoked \
             FROM auth_token WHERE id = $1",
        )
        .bind(TOKEN_SLOT_ID)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }
}

/// In-process token slot, for tests and database-less runs.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: RwLock<Option<TokenRecord>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn replace(
        &self,
        token_value: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<TokenRecord, AuthError> {
        let record = TokenRecord {
            id: TOKEN_SLOT_ID,
            token_value: token_value.to_string(),
            issued_at,
            expires_at,
            revoked: false,
        };
        *self.slot.write().await = Some(record.clone());
        Ok(record)
    }

    async fn find_by_value(&self, token_value: &str) -> Result<Option<TokenRecord>, AuthError> {
        Ok(self
            .slot
            .read()
            .await
            .as_ref()
            .filter(|r| r.token_value == token_value)
            .cloned())
    }

    async fn revoke(&self, token_value: &str) -> Result<bool, AuthError> {
        let mut slot = self.slot.write().await;
        match slot.as_mut() {
            Some(record) if record.token_value == token_value => {
                record.revoked = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn current(&self) -> Result<Option<TokenRecord>, AuthError> {
        Ok(self.slot.read().await.clone())
    }
}
