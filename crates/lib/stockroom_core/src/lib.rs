//! # stockroom_core
//!
//! Core domain logic for Stockroom: the single-account session, item
//! expiration status, renewals and inventory queries.

pub mod auth;
pub mod config;
pub mod inventory;
pub mod migrate;
pub mod models;
pub mod notify;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
