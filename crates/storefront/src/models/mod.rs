//! Storefront-owned models.
//!
//! Everything the customer sees comes from the marketplace backend (see
//! [`crate::backend::types`]); the only state the storefront keeps itself is
//! what lives in the session.

pub mod session;

pub use session::{CurrentCustomer, keys as session_keys};
