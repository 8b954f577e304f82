//! HTTP server configuration.

use stockroom_core::config::{AuthConfig, ConfigError, MailConfig};

/// Configuration for the HTTP server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3100").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Account credentials and token settings.
    pub auth: AuthConfig,
    /// Outbound mail for the notification sweep.
    pub mail: MailConfig,
    /// Mark the session cookie `Secure`. Disable only for local plain HTTP.
    pub secure_cookies: bool,
}

impl ApiConfig {
    /// Reads configuration from environment variables.
    ///
    /// | Variable        | Default                               |
    /// |-----------------|---------------------------------------|
    /// | `BIND_ADDR`     | `127.0.0.1:3100`                      |
    /// | `DATABASE_URL`  | `postgres://localhost:5432/stockroom` |
    /// | `COOKIE_SECURE` | `true`                                |
    ///
    /// Account, token and mail settings are read by [`AuthConfig::from_env`]
    /// and [`MailConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3100".into()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/stockroom".into()),
            auth: AuthConfig::from_env()?,
            mail: MailConfig::from_env(),
            secure_cookies: parse_flag("COOKIE_SECURE", std::env::var("COOKIE_SECURE").ok())?,
        })
    }
}

fn parse_flag(key: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => Ok(false),
        Some(v) => Err(ConfigError::Invalid {
            key,
            reason: format!("expected true or false, got {v:?}"),
        }),
    }
}
