//! Marketplace backend API client.
//!
//! # Architecture
//!
//! - JSON over HTTP via `reqwest`; the backend is the source of truth for
//!   every entity, so there is no local sync
//! - Reference lookups (governorates, cities, areas, store types,
//!   categories) are cached in memory via `moka` (5 minute TTL)
//! - Everything customer-specific is fetched per request with the
//!   customer's bearer token
//!
//! # Example
//!
//! ```rust,ignore
//! use souq_storefront::backend::{Caller, MarketClient};
//!
//! let client = MarketClient::new(&config.market)?;
//! let caller = Caller::guest(Locale::Ar);
//!
//! let stores = client.stores(&caller, &filters.to_query_pairs()).await?;
//! let cities = client.cities(&caller, governorate_id).await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use client::{MarketClient, QueryPairs};
pub use types::*;

use secrecy::SecretString;
use souq_core::Locale;
use thiserror::Error;

use crate::forms::FieldErrors;

/// Errors that can occur when calling the marketplace backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The customer's token is missing, expired or revoked.
    #[error("Unauthorized")]
    Unauthorized,

    /// The backend rejected the submitted fields.
    #[error("Validation failed: {message}")]
    Validation {
        /// Summary message from the backend.
        message: String,
        /// Messages keyed by field name.
        errors: FieldErrors,
    },

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success response.
    #[error("Upstream error {status}: {message}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Truncated response body or backend message.
        message: String,
    },

    /// The backend answered a mutation with `success: false`.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The client could not be built from configuration.
    #[error("Invalid backend configuration: {0}")]
    InvalidConfig(String),
}

impl BackendError {
    /// Message suitable for showing to the customer.
    ///
    /// Validation and rejection messages come from the backend and are meant
    /// for end users; everything else collapses to a generic sentence.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message, .. } | Self::Rejected(message) => message.clone(),
            Self::NotFound(_) => "The requested item no longer exists.".to_string(),
            Self::Unauthorized => "Your session has expired. Please sign in again.".to_string(),
            Self::RateLimited(_) => "Too many requests. Please wait a moment.".to_string(),
            Self::Http(_) | Self::Parse(_) | Self::Upstream { .. } | Self::InvalidConfig(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }

    /// Field errors, when the backend reported any.
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

/// Who a backend request is made on behalf of.
///
/// Carries the customer's bearer token (absent for guests) and the locale the
/// backend should answer in.
#[derive(Clone)]
pub struct Caller {
    token: Option<SecretString>,
    locale: Locale,
}

impl Caller {
    /// A logged-in customer.
    #[must_use]
    pub const fn customer(token: SecretString, locale: Locale) -> Self {
        Self {
            token: Some(token),
            locale,
        }
    }

    /// An anonymous visitor.
    #[must_use]
    pub const fn guest(locale: Locale) -> Self {
        Self {
            token: None,
            locale,
        }
    }

    /// Bearer token, if any.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// Response locale.
    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// Whether a token is attached.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

impl std::fmt::Debug for Caller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Caller")
            .field("authenticated", &self.token.is_some())
            .field("locale", &self.locale)
            .finish()
    }
}
