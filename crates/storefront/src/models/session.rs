//! Session-related types.
//!
//! Types stored in the session for authentication state.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use souq_core::{CityId, CustomerId, Locale};

use crate::backend::{Caller, Customer};

/// Session-stored customer identity.
///
/// Holds the backend bearer token issued at login plus the few fields the
/// page shell needs before the session context arrives.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentCustomer {
    /// Customer's backend ID.
    pub id: CustomerId,
    /// Display name.
    pub name: String,
    /// Stored default city, used to pre-select listing filters.
    #[serde(default)]
    pub default_city: Option<CityId>,
    token: String,
}

impl CurrentCustomer {
    /// Build from a login response.
    #[must_use]
    pub fn new(customer: &Customer, token: String) -> Self {
        Self {
            id: customer.id,
            name: customer.name.clone(),
            default_city: customer.city_id,
            token,
        }
    }

    /// Pick up a changed name or default city after a profile update.
    pub fn refresh(&mut self, customer: &Customer) {
        self.name.clone_from(&customer.name);
        self.default_city = customer.city_id;
    }

    /// Backend caller acting for this customer.
    #[must_use]
    pub fn caller(&self, locale: Locale) -> Caller {
        Caller::customer(SecretString::from(self.token.clone()), locale)
    }
}

impl std::fmt::Debug for CurrentCustomer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentCustomer")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("default_city", &self.default_city)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// Key for the locale chosen via the language switcher.
    pub const LOCALE: &str = "locale";

    /// Key for a one-shot flash message shown on the next page.
    pub const FLASH: &str = "flash";
}
