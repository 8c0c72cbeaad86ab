//! Domain models shared across the crate.

pub mod auth;
pub mod voucher;
