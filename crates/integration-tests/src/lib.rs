//! Integration tests for the Souq storefront.
//!
//! The tests drive a running storefront over HTTP, which in turn talks to a
//! running marketplace backend. They are `#[ignore]`d by default.
//!
//! # Running Tests
//!
//! ```bash
//! cargo run -p souq-cli -- migrate sessions
//! cargo run -p souq-storefront &
//! SOUQ_TEST_PHONE=01000000000 SOUQ_TEST_PASSWORD=... \
//!     cargo test -p souq-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_TEST_URL` - Storefront under test (default: `http://localhost:3000`)
//! - `SOUQ_TEST_PHONE` / `SOUQ_TEST_PASSWORD` - A customer account on the backend

use reqwest::{Client, StatusCode, redirect};

/// Storefront under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("STOREFRONT_TEST_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Absolute URL for a storefront path.
#[must_use]
pub fn url(path: &str) -> String {
    format!("{}{path}", base_url())
}

/// A client with a cookie jar that does not follow redirects, so tests can
/// assert on `Location`.
///
/// # Errors
///
/// Returns the builder error if the TLS backend cannot initialise.
pub fn client() -> reqwest::Result<Client> {
    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .build()
}

/// Test customer credentials, if configured.
#[must_use]
pub fn credentials() -> Option<(String, String)> {
    let phone = std::env::var("SOUQ_TEST_PHONE").ok()?;
    let password = std::env::var("SOUQ_TEST_PASSWORD").ok()?;
    Some((phone, password))
}

/// Sign in through the login form; the session cookie stays in `client`.
///
/// Returns the status of the login response (303 on success).
///
/// # Errors
///
/// Returns the transport error if the storefront cannot be reached.
pub async fn sign_in(client: &Client, phone: &str, password: &str) -> reqwest::Result<StatusCode> {
    let response = client
        .post(url("/login"))
        .form(&[("phone", phone), ("password", password)])
        .send()
        .await?;
    Ok(response.status())
}

/// `Location` header of a redirect, if any.
#[must_use]
pub fn location(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
