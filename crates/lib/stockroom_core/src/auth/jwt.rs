//! Signed session tokens (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};

use super::AuthError;
use crate::models::auth::TokenClaims;

/// Random nonce so two tokens minted in the same second still differ.
fn generate_jti() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect()
}

/// Sign a session token for `username`, valid for `lifetime` from `issued_at`.
pub fn sign_session_token(
    username: &str,
    issued_at: DateTime<Utc>,
    lifetime: Duration,
    secret: &[u8],
) -> Result<String, AuthError> {
    let claims = TokenClaims {
        sub: username.to_string(),
        iat: issued_at.timestamp(),
        exp: (issued_at + lifetime).timestamp(),
        jti: generate_jti(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
}

/// Verify signature and structure, and check the embedded expiry against `now`.
///
/// Any failure is reported as `TokenInvalid`.
pub fn verify_session_token(
    token: &str,
    secret: &[u8],
    now: DateTime<Utc>,
) -> Result<TokenClaims, AuthError> {
    let key = DecodingKey::from_secret(secret);
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is checked below against the caller's clock.
    validation.validate_exp = false;
    let claims = decode::<TokenClaims>(token, &key, &validation)
        .map_err(|_| AuthError::TokenInvalid)?
        .claims;
    if claims.exp < now.timestamp() {
        return Err(AuthError::TokenInvalid);
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";

    #[test]
    fn signed_token_verifies() {
        let now = Utc::now();
        let token = sign_session_token("admin", now, Duration::hours(1), SECRET).unwrap();
        let claims = verify_session_token(&token, SECRET, now).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn tokens_minted_together_differ() {
        let now = Utc::now();
        let a = sign_session_token("admin", now, Duration::hours(1), SECRET).unwrap();
        let b = sign_session_token("admin", now, Duration::hours(1), SECRET).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let now = Utc::now();
        let token = sign_session_token("admin", now, Duration::hours(1), SECRET).unwrap();
        assert!(matches!(
            verify_session_token(&token, b"other-secret", now),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(
            verify_session_token("not.a.jwt", SECRET, Utc::now()),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn embedded_expiry_is_checked_against_now() {
        let issued = Utc::now();
        let token = sign_session_token("admin", issued, Duration::hours(1), SECRET).unwrap();
        let later = issued + Duration::hours(2);
        assert!(matches!(
            verify_session_token(&token, SECRET, later),
            Err(AuthError::TokenInvalid)
        ));
    }
}
