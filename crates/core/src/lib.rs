//! Souq Core - Shared domain types.
//!
//! This crate provides the types shared by the Souq components:
//! - `storefront` - Customer-facing marketplace site
//! - `cli` - Operator tooling
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! templates. Everything the marketplace backend owns (pricing, order
//! lifecycle, delivery assignment) is only *represented* here.
//!
//! # Modules
//!
//! - [`types`] - Typed ids, prices, phone numbers, coordinates, statuses and
//!   sort directions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
