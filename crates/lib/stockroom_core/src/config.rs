//! Explicit configuration handed to the credential check, token issuer and mailer.

use chrono::Duration;
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use thiserror::Error;
use tracing::warn;

/// Default session token lifetime: one hour.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 60 * 60;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Settings for the single privileged account and its session tokens.
#[derive(Clone)]
pub struct AuthConfig {
    /// The only accepted username.
    pub username: String,
    /// bcrypt hash of the account password.
    pub password_hash: String,
    /// HS256 signing secret for session tokens.
    pub jwt_secret: String,
    /// How long an issued token stays valid.
    pub token_lifetime: Duration,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("token_lifetime", &self.token_lifetime)
            .finish_non_exhaustive()
    }
}

impl AuthConfig {
    /// Reads the account settings from the environment.
    ///
    /// | Variable              | Default                              |
    /// |-----------------------|--------------------------------------|
    /// | `ACCOUNT_USERNAME`    | required                             |
    /// | `ACCOUNT_PASSWORD`    | required (bcrypt hash)               |
    /// | `JWT_SECRET`          | random per process (sessions reset)  |
    /// | `TOKEN_LIFETIME_SECS` | `3600`                               |
    pub fn from_env() -> Result<Self, ConfigError> {
        let username = non_empty_var("ACCOUNT_USERNAME")
            .ok_or(ConfigError::Missing("ACCOUNT_USERNAME"))?;
        let password_hash = non_empty_var("ACCOUNT_PASSWORD")
            .ok_or(ConfigError::Missing("ACCOUNT_PASSWORD"))?;

        let jwt_secret = match non_empty_var("JWT_SECRET") {
            Some(secret) => secret,
            None => {
                warn!("JWT_SECRET not set; generated a per-process secret, sessions end on restart");
                random_secret()
            }
        };

        let token_lifetime = match non_empty_var("TOKEN_LIFETIME_SECS") {
            Some(raw) => {
                let secs = raw.parse::<i64>().map_err(|e| ConfigError::Invalid {
                    key: "TOKEN_LIFETIME_SECS",
                    reason: e.to_string(),
                })?;
                if secs <= 0 {
                    return Err(ConfigError::Invalid {
                        key: "TOKEN_LIFETIME_SECS",
                        reason: "must be positive".into(),
                    });
                }
                Duration::seconds(secs)
            }
            None => Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS),
        };

        Ok(Self {
            username,
            password_hash,
            jwt_secret,
            token_lifetime,
        })
    }
}

/// Outbound mail settings for the expiration notification sweep.
#[derive(Clone, Debug, Default)]
pub struct MailConfig {
    /// HTTP mail relay endpoint. `None` logs messages instead of sending them.
    pub relay_url: Option<String>,
    /// Bearer key for the relay.
    pub api_key: Option<String>,
    /// Sender address.
    pub from: String,
}

impl MailConfig {
    /// Reads `MAIL_RELAY_URL`, `MAIL_API_KEY` and `MAIL_FROM`.
    pub fn from_env() -> Self {
        Self {
            relay_url: non_empty_var("MAIL_RELAY_URL"),
            api_key: non_empty_var("MAIL_API_KEY"),
            from: non_empty_var("MAIL_FROM").unwrap_or_else(|| "stockroom@localhost".into()),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn random_secret() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}
