//! Security headers middleware.
//!
//! Locked down by default. The storefront needs three things beyond `'self'`:
//! HTMX from unpkg, product images from the marketplace's storage host, and
//! geolocation for the "use my location" button on the locations page.

use axum::{
    extract::{Request, State},
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};
use url::Url;

use super::csp::CspNonce;
use crate::config::StorefrontConfig;

/// Origin HTMX is loaded from.
pub const SCRIPT_CDN: &str = "https://unpkg.com";

/// Per-deployment parts of the security headers.
#[derive(Debug, Clone)]
pub struct SecurityPolicy {
    image_origins: Vec<String>,
}

impl SecurityPolicy {
    /// Build from configuration: images may come from the backend host or
    /// the configured storage host.
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        let mut image_origins = Vec::new();
        for candidate in [Some(&config.market.base_url), config.market.storage_url.as_ref()]
            .into_iter()
            .flatten()
        {
            if let Some(origin) = origin_of(candidate)
                && !image_origins.contains(&origin)
            {
                image_origins.push(origin);
            }
        }
        Self { image_origins }
    }

    /// `Content-Security-Policy` value for a response.
    #[must_use]
    pub fn content_security_policy(&self, nonce: &str) -> String {
        let mut img_src = String::from("'self' data:");
        for origin in &self.image_origins {
            img_src.push(' ');
            img_src.push_str(origin);
        }

        let script_src = if nonce.is_empty() {
            format!("'self' {SCRIPT_CDN}")
        } else {
            format!("'self' 'nonce-{nonce}' {SCRIPT_CDN}")
        };

        format!(
            "default-src 'none'; \
             script-src {script_src}; \
             style-src 'self'; \
             font-src 'self'; \
             img-src {img_src}; \
             connect-src 'self'; \
             frame-src 'none'; \
             object-src 'none'; \
             base-uri 'self'; \
             form-action 'self'; \
             frame-ancestors 'none'"
        )
    }
}

fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let origin = parsed.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

/// Add security headers to all responses.
pub async fn security_headers_middleware(
    State(policy): State<SecurityPolicy>,
    request: Request,
    next: Next,
) -> Response {
    let nonce = request
        .extensions()
        .get::<CspNonce>()
        .map(|n| n.value().to_owned())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    match HeaderValue::from_str(&policy.content_security_policy(&nonce)) {
        Ok(value) => {
            headers.insert(CONTENT_SECURITY_POLICY, value);
        }
        Err(e) => tracing::error!(error = %e, "Failed to build CSP header"),
    }

    // Geolocation stays available to our own pages only
    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "accelerometer=(), \
             autoplay=(), \
             camera=(), \
             display-capture=(), \
             fullscreen=(self), \
             geolocation=(self), \
             gyroscope=(), \
             magnetometer=(), \
             microphone=(), \
             payment=(), \
             usb=()",
        ),
    );

    // Pages are per-customer; static assets set their own caching
    if !headers.contains_key(CACHE_CONTROL) {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0"));
    }

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        HeaderName::from_static("cross-origin-resource-policy"),
        HeaderValue::from_static("same-origin"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_of() {
        assert_eq!(
            origin_of("https://api.souq.example/api/v1"),
            Some("https://api.souq.example".to_string())
        );
        assert_eq!(
            origin_of("http://localhost:8000/storage"),
            Some("http://localhost:8000".to_string())
        );
        assert_eq!(origin_of("not a url"), None);
    }

    #[test]
    fn test_csp_includes_nonce_and_image_hosts() {
        let policy = SecurityPolicy {
            image_origins: vec!["https://cdn.souq.example".to_string()],
        };
        let csp = policy.content_security_policy("abc123");
        assert!(csp.contains("script-src 'self' 'nonce-abc123' https://unpkg.com;"));
        assert!(csp.contains("img-src 'self' data: https://cdn.souq.example;"));
        assert!(csp.contains("frame-ancestors 'none'"));
    }

    #[test]
    fn test_csp_without_nonce() {
        let policy = SecurityPolicy {
            image_origins: Vec::new(),
        };
        let csp = policy.content_security_policy("");
        assert!(csp.contains("script-src 'self' https://unpkg.com;"));
        assert!(!csp.contains("nonce-"));
    }
}
