//! Core types for Souq.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod geo;
pub mod id;
pub mod locale;
pub mod phone;
pub mod price;
pub mod sort;
pub mod status;

pub use geo::{Coordinates, CoordinatesError};
pub use id::*;
pub use locale::{Locale, TextDirection};
pub use phone::{Phone, PhoneError};
pub use price::{Price, SymbolPlacement};
pub use sort::SortDirection;
pub use status::*;
