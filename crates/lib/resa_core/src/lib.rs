//! # resa_core
//!
//! Session, voucher and referral core for Resa.
//!
//! New members can only join by redeeming a voucher issued to an existing
//! member, who becomes their sponsor. The web layer talks to this crate
//! through [`auth::service::AuthService`]; the operator CLI uses
//! [`bootstrap`] and [`voucher`] directly.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod models;
pub mod registration;
pub mod schema;
pub mod voucher;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
