//! Credential check against the configured account.

use subtle::ConstantTimeEq;
use tracing::{debug, error};

use super::AuthError;
use super::password::verify_password;
use crate::config::AuthConfig;

/// Compares submitted credentials against the configured username and bcrypt hash.
#[derive(Clone)]
pub struct CredentialCheck {
    username: String,
    password_hash: String,
}

impl CredentialCheck {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            username: config.username.clone(),
            password_hash: config.password_hash.clone(),
        }
    }

    /// Succeeds only when both the username and password match.
    ///
    /// The bcrypt verify always runs so a wrong username costs the same as a
    /// wrong password. The error never says which field was wrong.
    pub fn verify(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let username_ok: bool = username
            .as_bytes()
            .ct_eq(self.username.as_bytes())
            .into();

        let password_ok = verify_password(password, &self.password_hash).inspect_err(|e| {
            error!(error = %e, "configured account password hash is unusable");
        })?;

        if username_ok && password_ok {
            Ok(())
        } else {
            debug!("credential check failed");
            Err(AuthError::CredentialMismatch)
        }
    }
}
