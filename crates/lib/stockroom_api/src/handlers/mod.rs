//! Request handlers.

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod items;
pub mod license_keys;
pub mod notification;
pub mod pages;
pub mod vendors;
