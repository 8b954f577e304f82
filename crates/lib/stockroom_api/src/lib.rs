//! # stockroom_api
//!
//! HTTP layer for Stockroom: sign-in, the page gate, the inventory API and
//! server-rendered pages.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};
use sqlx::PgPool;
use stockroom_core::auth::credentials::CredentialCheck;
use stockroom_core::auth::session::SessionManager;
use stockroom_core::auth::store::{PgTokenStore, TokenStore};
use stockroom_core::inventory::renewal::{RenewalEngine, RenewalStore};
use stockroom_core::inventory::store::PgRenewalStore;
use stockroom_core::notify::{Mailer, NotifyError, mailer_from_config};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{
    auth, dashboard, health, items, license_keys, notification, pages, vendors,
};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// Server configuration.
    pub config: ApiConfig,
    pub credentials: Arc<CredentialCheck>,
    pub sessions: Arc<SessionManager>,
    pub renewals: Arc<RenewalEngine>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// State backed by PostgreSQL stores and the configured mailer.
    pub fn new(pool: PgPool, config: ApiConfig) -> Result<Self, NotifyError> {
        let tokens = Arc::new(PgTokenStore::new(pool.clone()));
        let renewals = Arc::new(PgRenewalStore::new(pool.clone()));
        let mailer = mailer_from_config(&config.mail)?;
        Ok(Self::with_stores(pool, config, tokens, renewals, mailer))
    }

    /// State with explicit stores and mailer.
    pub fn with_stores(
        pool: PgPool,
        config: ApiConfig,
        tokens: Arc<dyn TokenStore>,
        renewals: Arc<dyn RenewalStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            credentials: Arc::new(CredentialCheck::new(&config.auth)),
            sessions: Arc::new(SessionManager::new(tokens, &config.auth)),
            renewals: Arc::new(RenewalEngine::new(renewals)),
            mailer,
            pool,
            config,
        }
    }
}

/// Run embedded database migrations.
///
/// Delegates to `stockroom_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    stockroom_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    // Open API routes: session check and the scheduled notification sweep.
    let open_api = Router::new()
        .route(routes::GET_API_AUTH, get(auth::check_token_handler))
        .route(
            routes::API_NOTIFICATION,
            get(notification::notification_handler).post(notification::notification_handler),
        );

    // Data API: session cookie or `authToken` header, 401 otherwise.
    let api = Router::new()
        .route(
            routes::API_ITEMS,
            get(items::list_items_handler).post(items::create_item_handler),
        )
        .route(
            routes::GET_API_ITEMS_EXPIRING,
            get(items::expiring_items_handler),
        )
        .route(routes::GET_API_ITEMS_EXPIRED, get(items::expired_items_handler))
        .route(
            routes::GET_API_ITEMS_LIFETIME,
            get(items::lifetime_items_handler),
        )
        .route(
            routes::API_ITEMS_ID,
            get(items::get_item_handler)
                .patch(items::update_item_handler)
                .delete(items::delete_item_handler),
        )
        .route(
            routes::POST_API_ITEMS_ID_ARCHIVE,
            post(items::archive_item_handler),
        )
        .route(
            routes::POST_API_ITEMS_ID_UNARCHIVE,
            post(items::unarchive_item_handler),
        )
        .route(routes::POST_API_ITEMS_ID_RENEW, post(items::renew_item_handler))
        .route(
            routes::GET_API_ITEMS_ID_RENEWAL_SUGGESTION,
            get(items::renewal_suggestion_handler),
        )
        .route(
            routes::GET_API_ITEMS_ID_RENEWALS,
            get(items::item_renewals_handler),
        )
        .route(
            routes::API_ITEMS_ID_LICENSE_KEYS,
            get(items::item_license_keys_handler).post(items::create_license_key_handler),
        )
        .route(
            routes::API_VENDORS,
            get(vendors::list_vendors_handler).post(vendors::create_vendor_handler),
        )
        .route(
            routes::API_VENDORS_ID,
            get(vendors::get_vendor_handler).put(vendors::update_vendor_handler),
        )
        .route(
            routes::GET_API_LICENSE_KEYS,
            get(license_keys::list_license_keys_handler),
        )
        .route(
            routes::PATCH_API_LICENSE_KEYS_ID,
            patch(license_keys::update_license_key_handler),
        )
        .route(routes::GET_API_DASHBOARD, get(dashboard::dashboard_handler))
        .route(
            routes::GET_API_RENEWALS,
            get(dashboard::renewal_report_handler),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_session,
        ));

    // Pages; everything but `/login`, `/logout` and `/health` is behind the page gate.
    let site = Router::new()
        .route(
            routes::LOGIN,
            get(auth::login_form_handler).post(auth::login_handler),
        )
        .route(routes::POST_LOGOUT, post(auth::logout_handler))
        .route(routes::GET_HEALTH, get(health::health_handler))
        .route(routes::GET_ROOT, get(pages::root_handler))
        .route(routes::GET_DASHBOARD, get(pages::dashboard_page_handler))
        .route(routes::GET_INVENTORY, get(pages::inventory_page_handler))
        .route(routes::GET_RENEWALS, get(pages::renewals_page_handler));

    Router::new()
        .merge(open_api)
        .merge(api)
        .merge(site)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::page_gate,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
