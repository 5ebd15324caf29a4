//! Cache types for reference lookups.
//!
//! Only data that is the same for every visitor in a locale is cached;
//! carts, orders and profiles never are.

use souq_core::{GovernorateId, Locale};

use super::types::{Area, Category, City, Governorate};

/// Cache key for reference lookups.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Governorates(Locale),
    Cities(Locale, GovernorateId),
    Areas(Locale),
    StoreTypes(Locale),
    Categories(Locale),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Governorates(Vec<Governorate>),
    Cities(Vec<City>),
    Areas(Vec<Area>),
    StoreTypes(Vec<String>),
    Categories(Vec<Category>),
}
