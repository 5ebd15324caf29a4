//! Storefront-side rules that run before or around backend calls.
//!
//! # Services
//!
//! - `cart` - which cart endpoint a quantity change maps to
//! - `geolocation` - browser geolocation options and result statuses
//! - `locations` - new delivery location validation
//! - `profile` - profile validation, avatar previews, area filtering
//! - `roles` - role upgrade actions and driver application presentation

pub mod cart;
pub mod geolocation;
pub mod locations;
pub mod profile;
pub mod roles;
