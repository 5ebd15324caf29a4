//! Dependency checks.
//!
//! # Usage
//!
//! ```bash
//! souq-cli check backend
//! ```
//!
//! # Environment Variables
//!
//! - `MARKET_API_URL` - Base URL of the marketplace backend API
//! - `MARKET_API_KEY` - Storefront service key
//! - `MARKET_API_TIMEOUT_SECS` - Request timeout (default: 15)

use thiserror::Error;

use souq_core::Locale;
use souq_storefront::backend::{BackendError, Caller, MarketClient};
use souq_storefront::config::{ConfigError, MarketApiConfig};

/// Errors that can occur while checking.
#[derive(Debug, Error)]
pub enum CheckError {
    /// Backend settings missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The backend did not answer as expected.
    #[error("Backend check failed: {0}")]
    Backend(#[from] BackendError),
}

/// Call the lookup endpoints as a guest and report what came back.
///
/// # Errors
///
/// Returns `CheckError` if the configuration is invalid or any call fails.
pub async fn backend() -> Result<(), CheckError> {
    let _ = dotenvy::dotenv();
    let config = MarketApiConfig::from_env()?;

    tracing::info!(base_url = %config.base_url, "Checking marketplace backend...");
    let client = MarketClient::new(&config)?;
    let caller = Caller::guest(Locale::En);

    let governorates = client.governorates(&caller).await?;
    tracing::info!(count = governorates.len(), "Governorates");

    let categories = client.categories(&caller).await?;
    tracing::info!(count = categories.len(), "Categories");

    let store_types = client.store_types(&caller).await?;
    tracing::info!(count = store_types.len(), "Store types");

    tracing::info!("Backend reachable");
    Ok(())
}
