//! Authentication for the single privileged account.
//!
//! Credential checking, session token issuance and validation, and the
//! persisted single-slot token store.

pub mod credentials;
pub mod jwt;
pub mod password;
pub mod session;
pub mod store;

use thiserror::Error;

/// Authentication errors.
///
/// The four token rejections are terminal: the caller must send the user
/// back to the login form. They stay distinct for logging only.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialMismatch,

    #[error("Token not found")]
    TokenNotFound,

    #[error("Token has been revoked")]
    TokenRevoked,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token is invalid")]
    TokenInvalid,

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// True for the validator's rejections (as opposed to infrastructure failures).
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::TokenNotFound
                | AuthError::TokenRevoked
                | AuthError::TokenExpired
                | AuthError::TokenInvalid
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_rejections_are_classified() {
        assert!(AuthError::TokenNotFound.is_token_rejection());
        assert!(AuthError::TokenRevoked.is_token_rejection());
        assert!(AuthError::TokenExpired.is_token_rejection());
        assert!(AuthError::TokenInvalid.is_token_rejection());
        assert!(!AuthError::CredentialMismatch.is_token_rejection());
        assert!(!AuthError::Internal("boom".into()).is_token_rejection());
    }
}
