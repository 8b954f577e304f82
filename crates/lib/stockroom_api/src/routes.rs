//! Route paths.

// Pages
pub const GET_ROOT: &str = "/";
pub const GET_HEALTH: &str = "/health";
pub const LOGIN: &str = "/login";
pub const POST_LOGOUT: &str = "/logout";
pub const GET_DASHBOARD: &str = "/dashboard";
pub const GET_INVENTORY: &str = "/inventory";
pub const GET_RENEWALS: &str = "/renewals";

// Session check and notification sweep
pub const GET_API_AUTH: &str = "/api/auth";
pub const API_NOTIFICATION: &str = "/api/notification";

// Items
pub const API_ITEMS: &str = "/api/items";
pub const GET_API_ITEMS_EXPIRING: &str = "/api/items/expiring";
pub const GET_API_ITEMS_EXPIRED: &str = "/api/items/expired";
pub const GET_API_ITEMS_LIFETIME: &str = "/api/items/lifetime";
pub const API_ITEMS_ID: &str = "/api/items/{id}";
pub const POST_API_ITEMS_ID_ARCHIVE: &str = "/api/items/{id}/archive";
pub const POST_API_ITEMS_ID_UNARCHIVE: &str = "/api/items/{id}/unarchive";
pub const POST_API_ITEMS_ID_RENEW: &str = "/api/items/{id}/renew";
pub const GET_API_ITEMS_ID_RENEWAL_SUGGESTION: &str = "/api/items/{id}/renewal-suggestion";
pub const GET_API_ITEMS_ID_RENEWALS: &str = "/api/items/{id}/renewals";
pub const API_ITEMS_ID_LICENSE_KEYS: &str = "/api/items/{id}/license-keys";

// Vendors
pub const API_VENDORS: &str = "/api/vendors";
pub const API_VENDORS_ID: &str = "/api/vendors/{id}";

// License keys
pub const GET_API_LICENSE_KEYS: &str = "/api/license-keys";
pub const PATCH_API_LICENSE_KEYS_ID: &str = "/api/license-keys/{id}";

// Reports
pub const GET_API_DASHBOARD: &str = "/api/dashboard";
pub const GET_API_RENEWALS: &str = "/api/renewals";

/// Path prefix exempt from the page gate.
pub const API_PREFIX: &str = "/api";
