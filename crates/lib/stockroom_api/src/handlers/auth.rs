//! Login, logout and session check handlers.

use axum::extract::{Form, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use stockroom_core::auth::AuthError;
use tracing::{info, warn};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::{cookie_token, header_token, is_authorized};
use crate::models::LoginForm;
use crate::routes;
use crate::services::cookies::{clear_session_cookie, session_cookie};
use crate::services::pages::login_page;

/// Message shown for any failed sign-in.
pub const LOGIN_FAILED: &str = "Invalid username or password";

/// `GET /login`: render the sign-in form.
pub async fn login_form_handler() -> Html<String> {
    login_page(None)
}

/// `POST /login`: check the credentials, issue the session and set the cookie.
///
/// A failed check re-renders the form with 401 and leaves the stored token as is.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    match state.credentials.verify(&form.username, &form.password) {
        Ok(()) => {}
        Err(AuthError::CredentialMismatch) => {
            warn!("sign-in rejected");
            return Ok((StatusCode::UNAUTHORIZED, login_page(Some(LOGIN_FAILED))).into_response());
        }
        Err(e) => return Err(e.into()),
    }

    let record = state.sessions.issue(&form.username).await?;
    info!(expires_at = %record.expires_at, "session issued");

    let cookie = session_cookie(
        &record.token_value,
        state.sessions.lifetime(),
        state.config.secure_cookies,
    );
    Ok((jar.add(cookie), Redirect::to(routes::GET_DASHBOARD)).into_response())
}

/// `POST /logout`: revoke the current session and clear the cookie.
pub async fn logout_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> AppResult<Response> {
    if let Some(token) = cookie_token(&headers) {
        let revoked = state.sessions.revoke(&token).await?;
        info!(revoked, "signed out");
    }
    let jar = jar.add(clear_session_cookie(state.config.secure_cookies));
    Ok((jar, Redirect::to(routes::LOGIN)).into_response())
}

/// `GET /api/auth`: validate the token in the `authToken` header.
pub async fn check_token_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> (StatusCode, &'static str) {
    let token = header_token(&headers);
    if is_authorized(&state, token.as_deref()).await {
        (StatusCode::OK, "Authorized")
    } else {
        (StatusCode::UNAUTHORIZED, "Unauthorized")
    }
}
