//! Session token issuance, validation and revocation.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use super::AuthError;
use super::jwt::{sign_session_token, verify_session_token};
use super::store::TokenStore;
use crate::config::AuthConfig;
use crate::models::auth::TokenRecord;

/// Issues and validates the single active session token.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn TokenStore>,
    secret: Vec<u8>,
    lifetime: Duration,
}

impl SessionManager {
    pub fn new(store: Arc<dyn TokenStore>, config: &AuthConfig) -> Self {
        Self {
            store,
            secret: config.jwt_secret.as_bytes().to_vec(),
            lifetime: config.token_lifetime,
        }
    }

    /// Lifetime applied to every issued token.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Mint a token for `username` and make it the only live session.
    pub async fn issue(&self, username: &str) -> Result<TokenRecord, AuthError> {
        self.issue_at(username, Utc::now()).await
    }

    /// [`issue`](Self::issue) with an explicit clock.
    pub async fn issue_at(
        &self,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenRecord, AuthError> {
        let token_value = sign_session_token(username, now, self.lifetime, &self.secret)?;
        let record = self
            .store
            .replace(&token_value, now, now + self.lifetime)
            .await?;
        info!(username, expires_at = %record.expires_at, "issued session token");
        Ok(record)
    }

    /// Validate a presented token value.
    pub async fn validate(&self, token_value: &str) -> Result<TokenRecord, AuthError> {
        self.validate_at(token_value, Utc::now()).await
    }

    /// [`validate`](Self::validate) with an explicit clock.
    ///
    /// Checks run in a fixed order, each with its own failure: lookup,
    /// revocation, stored expiry, then signature.
    pub async fn validate_at(
        &self,
        token_value: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenRecord, AuthError> {
        let record = self
            .store
            .find_by_value(token_value)
            .await?
            .ok_or(AuthError::TokenNotFound)?;

        if record.revoked {
            return Err(AuthError::TokenRevoked);
        }

        if record.expires_at < now {
            return Err(AuthError::TokenExpired);
        }

        let claims = verify_session_token(token_value, &self.secret, now)?;
        debug!(sub = %claims.sub, "session token validated");

        Ok(record)
    }

    /// Revoke the token with this value. Unknown values are ignored.
    pub async fn revoke(&self, token_value: &str) -> Result<bool, AuthError> {
        let revoked = self.store.revoke(token_value).await?;
        if revoked {
            info!("session token revoked");
        }
        Ok(revoked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryTokenStore;

    fn manager_with(store: Arc<MemoryTokenStore>) -> SessionManager {
        SessionManager::new(
            store,
            &AuthConfig {
                username: "admin".into(),
                password_hash: String::new(),
                jwt_secret: "test-secret".into(),
                token_lifetime: Duration::hours(1),
            },
        )
    }

    fn manager() -> SessionManager {
        manager_with(Arc::new(MemoryTokenStore::new()))
    }

    #[tokio::test]
    async fn issued_token_validates_immediately() {
        let sessions = manager();
        let now = Utc::now();
        let record = sessions.issue_at("admin", now).await.unwrap();
        assert_eq!(record.expires_at, now + Duration::hours(1));

        let validated = sessions.validate_at(&record.token_value, now).await.unwrap();
        assert_eq!(validated.token_value, record.token_value);
    }

    #[tokio::test]
    async fn token_expires_after_lifetime() {
        let sessions = manager();
        let now = Utc::now();
        let record = sessions.issue_at("admin", now).await.unwrap();

        let just_before = now + Duration::minutes(59);
        assert!(sessions.validate_at(&record.token_value, just_before).await.is_ok());

        let after = now + Duration::hours(1) + Duration::seconds(1);
        assert!(matches!(
            sessions.validate_at(&record.token_value, after).await,
            Err(AuthError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn revoked_token_is_rejected_even_before_expiry() {
        let sessions = manager();
        let now = Utc::now();
        let record = sessions.issue_at("admin", now).await.unwrap();
        assert!(sessions.revoke(&record.token_value).await.unwrap());

        assert!(matches!(
            sessions.validate_at(&record.token_value, now).await,
            Err(AuthError::TokenRevoked)
        ));
        // Revocation is checked before expiry.
        assert!(matches!(
            sessions
                .validate_at(&record.token_value, now + Duration::days(1))
                .await,
            Err(AuthError::TokenRevoked)
        ));
    }

    #[tokio::test]
    async fn unknown_token_is_not_found() {
        assert!(matches!(
            manager().validate("never-issued").await,
            Err(AuthError::TokenNotFound)
        ));
    }

    #[tokio::test]
    async fn login_replaces_previous_session() {
        let sessions = manager();
        let now = Utc::now();
        let first = sessions.issue_at("admin", now).await.unwrap();
        let second = sessions.issue_at("admin", now).await.unwrap();

        assert_ne!(first.token_value, second.token_value);
        assert!(matches!(
            sessions.validate_at(&first.token_value, now).await,
            Err(AuthError::TokenNotFound)
        ));
        assert!(sessions.validate_at(&second.token_value, now).await.is_ok());
    }

    #[tokio::test]
    async fn reissue_after_revoke_is_usable() {
        let sessions = manager();
        let now = Utc::now();
        let first = sessions.issue_at("admin", now).await.unwrap();
        sessions.revoke(&first.token_value).await.unwrap();

        let second = sessions.issue_at("admin", now).await.unwrap();
        assert!(sessions.validate_at(&second.token_value, now).await.is_ok());
    }

    #[tokio::test]
    async fn stored_token_with_bad_signature_is_invalid() {
        let store = Arc::new(MemoryTokenStore::new());
        let now = Utc::now();
        store
            .replace("forged-token", now, now + Duration::hours(1))
            .await
            .unwrap();

        let sessions = manager_with(store);
        assert!(matches!(
            sessions.validate_at("forged-token", now).await,
            Err(AuthError::TokenInvalid)
        ));
    }
}
