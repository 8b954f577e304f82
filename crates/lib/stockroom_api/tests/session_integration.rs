//! Integration tests: drive the router with in-memory stores.
//!
//! The pool is connected lazily to an unreachable address. Only the health
//! check and the notification sweep touch it, and both see it as unavailable.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{TimeZone, Utc};
use sqlx::postgres::PgPoolOptions;
use stockroom_api::{AppState, config::ApiConfig};
use stockroom_core::auth::store::{MemoryTokenStore, TokenStore};
use stockroom_core::config::{AuthConfig, MailConfig};
use stockroom_core::inventory::store::MemoryRenewalStore;
use stockroom_core::models::inventory::{Item, ItemType};
use stockroom_core::notify::LogMailer;
use tower::ServiceExt;

const USERNAME: &str = "admin";
const PASSWORD: &str = "correct horse";

struct Harness {
    app: Router,
    tokens: Arc<MemoryTokenStore>,
    renewals: Arc<MemoryRenewalStore>,
}

fn harness() -> Harness {
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(250))
        .connect_lazy("postgres://stockroom@127.0.0.1:1/stockroom")
        .expect("lazy pool");

    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        database_url: "postgres://stockroom@127.0.0.1:1/stockroom".into(),
        auth: AuthConfig {
            username: USERNAME.into(),
            password_hash: bcrypt::hash(PASSWORD, 4).expect("hash"),
            jwt_secret: "integration-secret".into(),
            token_lifetime: chrono::Duration::hours(1),
        },
        mail: MailConfig::default(),
        secure_cookies: true,
    };

    let tokens = Arc::new(MemoryTokenStore::new());
    let renewals = Arc::new(MemoryRenewalStore::new());
    let state = AppState::with_stores(
        pool,
        config,
        tokens.clone(),
        renewals.clone(),
        Arc::new(LogMailer),
    );

    Harness {
        app: stockroom_api::router(state),
        tokens,
        renewals,
    }
}

fn login_request(username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("username={username}&password={password}")))
        .unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = cookie {
        builder = builder.header(header::COOKIE, format!("authToken={token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn location(resp: &axum::response::Response) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Value of the `authToken` cookie set by a response.
fn set_cookie_token(resp: &axum::response::Response) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| v.strip_prefix("authToken="))
        .map(|rest| rest.split(';').next().unwrap_or_default().to_string())
}

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

async fn login(h: &Harness) -> String {
    let resp = h
        .app
        .clone()
        .oneshot(login_request(USERNAME, "correct%20horse"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    set_cookie_token(&resp).expect("session cookie")
}

#[tokio::test]
async fn login_page_is_public() {
    let h = harness();
    let resp = h.app.oneshot(get("/login", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains(r#"name="password""#));
}

#[tokio::test]
async fn correct_login_sets_cookie_and_replaces_token() {
    let h = harness();

    let resp = h
        .app
        .clone()
        .oneshot(login_request(USERNAME, "correct%20horse"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/dashboard");

    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Secure"));
    assert!(set_cookie.contains("SameSite=Strict"));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("Max-Age=3600"));

    let first = set_cookie_token(&resp).unwrap();
    let stored = h.tokens.current().await.unwrap().unwrap();
    assert_eq!(stored.token_value, first);

    let second = login(&h).await;
    assert_ne!(first, second);
    let stored = h.tokens.current().await.unwrap().unwrap();
    assert_eq!(stored.token_value, second);
}

#[tokio::test]
async fn wrong_password_shows_error_without_touching_store() {
    let h = harness();

    let resp = h
        .app
        .clone()
        .oneshot(login_request(USERNAME, "nope"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie_token(&resp).is_none());
    assert!(body_text(resp).await.contains("Invalid username or password"));
    assert!(h.tokens.current().await.unwrap().is_none());
}

#[tokio::test]
async fn wrong_username_is_rejected_the_same_way() {
    let h = harness();
    let resp = h
        .app
        .clone()
        .oneshot(login_request("root", "correct%20horse"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(h.tokens.current().await.unwrap().is_none());
}

#[tokio::test]
async fn padded_username_is_not_trimmed() {
    let h = harness();
    let resp = h
        .app
        .clone()
        .oneshot(login_request("%20admin%20", "correct%20horse"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie_token(&resp).is_none());
    assert!(h.tokens.current().await.unwrap().is_none());
}

#[tokio::test]
async fn gate_redirects_without_cookie() {
    let h = harness();
    let resp = h.app.oneshot(get("/dashboard", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn gate_redirects_unknown_cookie() {
    let h = harness();
    let resp = h
        .app
        .oneshot(get("/dashboard", Some("not-a-token")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn gate_passes_valid_cookie_consistently() {
    let h = harness();
    let token = login(&h).await;

    for _ in 0..2 {
        let resp = h.app.clone().oneshot(get("/", Some(&token))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/dashboard");
    }
}

#[tokio::test]
async fn replaced_session_is_no_longer_accepted() {
    let h = harness();
    let old = login(&h).await;
    let _new = login(&h).await;

    let resp = h.app.oneshot(get("/", Some(&old))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn auth_endpoint_reports_token_validity() {
    let h = harness();
    let token = login(&h).await;

    let check = |value: Option<String>| {
        let mut builder = Request::builder().uri("/api/auth");
        if let Some(v) = value {
            builder = builder.header("authToken", v);
        }
        builder.body(Body::empty()).unwrap()
    };

    let resp = h.app.clone().oneshot(check(Some(token))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "Authorized");

    let resp = h.app.clone().oneshot(check(Some("bogus".into()))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(resp).await, "Unauthorized");

    let resp = h.app.oneshot(check(None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_and_clears_cookie() {
    let h = harness();
    let token = login(&h).await;

    let req = Request::builder()
        .method("POST")
        .uri("/logout")
        .header(header::COOKIE, format!("authToken={token}"))
        .body(Body::empty())
        .unwrap();
    let resp = h.app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
    assert_eq!(set_cookie_token(&resp).as_deref(), Some(""));

    assert!(h.tokens.current().await.unwrap().unwrap().revoked);

    let resp = h.app.oneshot(get("/", Some(&token))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn logout_with_stale_cookie_still_clears_it() {
    let h = harness();
    let stale = login(&h).await;
    let current = login(&h).await;

    let req = Request::builder()
        .method("POST")
        .uri("/logout")
        .header(header::COOKIE, format!("authToken={stale}"))
        .body(Body::empty())
        .unwrap();
    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
    assert_eq!(set_cookie_token(&resp).as_deref(), Some(""));

    // The stale value matched nothing, so the live session survives.
    let slot = h.tokens.current().await.unwrap().unwrap();
    assert_eq!(slot.token_value, current);
    assert!(!slot.revoked);
}

#[tokio::test]
async fn data_api_answers_401_without_session() {
    let h = harness();
    let resp = h.app.oneshot(get("/api/items/1/renewals", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let json: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(json["error"], "unauthorized");
}

fn lifetime_item(id: i64) -> Item {
    let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Item {
        id,
        name: "Perpetual CAD".into(),
        description: String::new(),
        owner: "Design".into(),
        owner_email: "design@example.com".into(),
        item_type: ItemType::Software,
        purchase_date: None,
        subscription_date: Some(created),
        expiration_date: None,
        archived: false,
        attachment: String::new(),
        requisition_number: None,
        number_of_licenses: Some(3),
        vendor_id: None,
        created_at: created,
        updated_at: created,
    }
}

#[tokio::test]
async fn renew_through_api_appends_history() {
    let h = harness();
    h.renewals.insert_item(lifetime_item(7)).await;
    let token = login(&h).await;

    let req = Request::builder()
        .method("POST")
        .uri("/api/items/7/renew")
        .header("authToken", token.as_str())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"expirationDate":"2030-06-30T00:00:00Z"}"#))
        .unwrap();
    let resp = h.app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let outcome: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(outcome["item"]["expirationDate"], "2030-06-30T00:00:00Z");
    assert_eq!(outcome["renewal"]["itemId"], 7);

    let item = h.renewals.item(7).await.unwrap();
    assert_eq!(
        item.expiration_date,
        Some(Utc.with_ymd_and_hms(2030, 6, 30, 0, 0, 0).unwrap())
    );

    let resp = h
        .app
        .oneshot(get("/api/items/7/renewals", Some(&token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let history: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(history["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn negative_offset_is_a_bad_request() {
    let h = harness();
    let token = login(&h).await;

    let resp = h
        .app
        .oneshot(get("/api/items?offset=-1", Some(&token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let json: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn notification_sweep_accepts_get_and_post() {
    let h = harness();
    for method in ["GET", "POST"] {
        let req = Request::builder()
            .method(method)
            .uri("/api/notification")
            .body(Body::empty())
            .unwrap();
        let resp = h.app.clone().oneshot(req).await.unwrap();
        // No database behind the pool: the item fetch fails, never 405.
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR, "{method}");
        assert_eq!(body_text(resp).await, "Failed to send emails");
    }
}

#[tokio::test]
async fn renewing_missing_item_is_404() {
    let h = harness();
    let token = login(&h).await;

    let req = Request::builder()
        .method("POST")
        .uri("/api/items/99/renew")
        .header(header::COOKIE, format!("authToken={token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_is_public_and_reports_db_state() {
    let h = harness();
    let resp = h.app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(json["dbConnected"], false);
    assert!(json["version"].is_string());
}
