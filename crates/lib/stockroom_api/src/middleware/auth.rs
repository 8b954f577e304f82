//! Session middleware: the page gate and the API guard.
//!
//! Both validate the presented token in-process through the shared
//! [`SessionManager`](stockroom_core::auth::session::SessionManager).

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use stockroom_core::auth::AuthError;
use stockroom_core::models::auth::TokenRecord;
use tracing::{debug, warn};

use crate::AppState;
use crate::error::AppError;
use crate::routes;
use crate::services::cookies::SESSION_COOKIE;

/// Header carrying the token for `GET /api/auth` and API clients.
pub const TOKEN_HEADER: &str = "authToken";

/// The validated session, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession(pub TokenRecord);

/// Paths the page gate lets through without a session.
pub fn is_exempt(path: &str) -> bool {
    let under = |prefix: &str| {
        path == prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    };
    under(routes::API_PREFIX)
        || under(routes::LOGIN)
        || path == routes::POST_LOGOUT
        || path == routes::GET_HEALTH
}

/// Token carried by the session cookie.
pub fn cookie_token(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
}

/// Token presented in the `authToken` header.
pub fn header_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Validate a token, logging the rejection kind.
async fn check(state: &AppState, token: &str) -> Result<TokenRecord, AuthError> {
    state.sessions.validate(token).await.inspect_err(|e| {
        if e.is_token_rejection() {
            debug!(reason = %e, "session rejected");
        } else {
            warn!(error = %e, "session validation failed");
        }
    })
}

/// Page gate: every non-exempt request needs a valid `authToken` cookie,
/// otherwise it is redirected (307) to the login page.
pub async fn page_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    if is_exempt(request.uri().path()) {
        return next.run(request).await;
    }

    let Some(token) = cookie_token(request.headers()) else {
        debug!(path = %request.uri().path(), "no session cookie, redirecting to login");
        return Redirect::temporary(routes::LOGIN).into_response();
    };

    match check(&state, &token).await {
        Ok(record) => {
            request.extensions_mut().insert(AuthenticatedSession(record));
            next.run(request).await
        }
        Err(_) => Redirect::temporary(routes::LOGIN).into_response(),
    }
}

/// API guard: accepts the session cookie or the `authToken` header and
/// answers 401 instead of redirecting.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = cookie_token(request.headers())
        .or_else(|| header_token(request.headers()))
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".into()))?;

    let record = check(&state, &token).await?;
    request.extensions_mut().insert(AuthenticatedSession(record));

    Ok(next.run(request).await)
}

/// Outcome of a validation request, reused by `GET /api/auth`.
pub async fn is_authorized(state: &AppState, token: Option<&str>) -> bool {
    match token {
        Some(token) => check(state, token).await.is_ok(),
        None => false,
    }
}
