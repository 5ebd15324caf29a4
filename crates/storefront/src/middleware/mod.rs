//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded into the span)
//! 4. CSP nonce (generated per request)
//! 5. Security headers (CSP with the nonce, permissions policy)
//! 6. Session layer (tower-sessions with `PostgreSQL` store)
//! 7. Rate limiting on mutation and login routes (governor)

pub mod auth;
pub mod csp;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    LOGIN_PATH, OptionalCustomer, RequireCustomer, clear_current_customer, current_customer,
    set_current_customer,
};
pub use csp::{CspNonce, csp_nonce_middleware};
pub use rate_limit::{login_rate_limiter, mutation_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::{SecurityPolicy, security_headers_middleware};
pub use session::create_session_layer;
