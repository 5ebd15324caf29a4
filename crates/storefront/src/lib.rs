//! Souq storefront library.
//!
//! The customer-facing storefront of the Souq grocery marketplace: an axum
//! server rendering askama templates with HTMX fragments, in front of the
//! marketplace backend's JSON API. The library exposes the router and its
//! pieces so the binary and the tests share them.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod filters;
pub mod forms;
pub mod htmx;
pub mod icons;
pub mod listing;
pub mod location_filter;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
