//! Page rendering and response headers.
//!
//! These tests require:
//! - A running session database (`souq-cli migrate sessions` applied)
//! - The storefront running (cargo run -p souq-storefront)
//! - A reachable marketplace backend

use reqwest::StatusCode;
use souq_integration_tests::{client, location, url};

#[tokio::test]
#[ignore = "Requires running storefront and marketplace backend"]
async fn test_health_endpoints() {
    let client = client().expect("client");

    let resp = client.get(url("/health")).send().await.expect("health");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("body"), "ok");

    let resp = client.get(url("/health/ready")).send().await.expect("ready");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront and marketplace backend"]
async fn test_security_headers_carry_nonce() {
    let client = client().expect("client");
    let resp = client.get(url("/products")).send().await.expect("products");
    assert_eq!(resp.status(), StatusCode::OK);

    let csp = resp
        .headers()
        .get("content-security-policy")
        .and_then(|v| v.to_str().ok())
        .expect("CSP header")
        .to_string();
    assert!(csp.contains("'nonce-"));
    assert!(resp.headers().contains_key("x-request-id"));

    let body = resp.text().await.expect("body");
    let nonce = csp
        .split("'nonce-")
        .nth(1)
        .and_then(|rest| rest.split('\'').next())
        .expect("nonce value");
    assert!(body.contains(&format!("nonce=\"{nonce}\"")));
}

#[tokio::test]
#[ignore = "Requires running storefront and marketplace backend"]
async fn test_listing_pages_render() {
    let client = client().expect("client");
    for path in ["/", "/products", "/stores", "/categories"] {
        let resp = client.get(url(path)).send().await.expect("page");
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
        let body = resp.text().await.expect("body");
        assert!(body.contains("<html"), "{path} should be a full page");
    }
}

#[tokio::test]
#[ignore = "Requires running storefront and marketplace backend"]
async fn test_htmx_listing_returns_fragment() {
    let client = client().expect("client");
    let resp = client
        .get(url("/products?search=milk&sort=price"))
        .header("HX-Request", "true")
        .send()
        .await
        .expect("products fragment");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.text().await.expect("body");
    assert!(!body.contains("<html"));
    assert!(body.contains(r#"name="sort" value="price""#));
}

#[tokio::test]
#[ignore = "Requires running storefront and marketplace backend"]
async fn test_malformed_filters_are_ignored() {
    let client = client().expect("client");
    let resp = client
        .get(url("/products?category=abc&page=-1&sort=bogus"))
        .send()
        .await
        .expect("products");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront and marketplace backend"]
async fn test_city_lookup_echoes_generation() {
    let client = client().expect("client");
    let resp = client
        .get(url("/lookup/cities?governorate_id=1"))
        .header("HX-Request", "true")
        .header("X-Lookup-Generation", "7")
        .send()
        .await
        .expect("cities");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["x-lookup-generation"], "7");
    // A guest has no default city, so nothing changes and no follow-up fires
    assert!(resp.headers().get("hx-trigger-after-settle").is_none());

    let body = resp.text().await.expect("body");
    assert!(body.contains(r#"id="city-select""#));
}

#[tokio::test]
#[ignore = "Requires running storefront and marketplace backend"]
async fn test_account_pages_require_login() {
    let client = client().expect("client");
    for path in ["/orders", "/profile", "/locations", "/checkout", "/driver-application"] {
        let resp = client.get(url(path)).send().await.expect("page");
        assert!(resp.status().is_redirection(), "{path}");
        assert_eq!(location(&resp).as_deref(), Some("/login"), "{path}");
    }
}

#[tokio::test]
#[ignore = "Requires running storefront and marketplace backend"]
async fn test_htmx_mutation_without_session_redirects_whole_page() {
    let client = client().expect("client");
    let resp = client
        .post(url("/cart/add"))
        .header("HX-Request", "true")
        .form(&[("product_id", "1")])
        .send()
        .await
        .expect("cart add");
    assert!(resp.status().is_redirection());
    assert_eq!(resp.headers()["hx-redirect"], "/login");

    // The login page answers the followed redirect the same way
    let resp = client
        .get(url("/login"))
        .header("HX-Request", "true")
        .send()
        .await
        .expect("login");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(resp.headers()["hx-redirect"], "/login");
}

#[tokio::test]
#[ignore = "Requires running storefront and marketplace backend"]
async fn test_locale_switch_returns_to_page() {
    let client = client().expect("client");
    let resp = client
        .post(url("/locale"))
        .form(&[("locale", "en"), ("next", "/stores")])
        .send()
        .await
        .expect("locale");
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp).as_deref(), Some("/stores"));

    let body = client
        .get(url("/stores"))
        .send()
        .await
        .expect("stores")
        .text()
        .await
        .expect("body");
    assert!(body.contains(r#"<html lang="en" dir="ltr">"#));
}

#[tokio::test]
#[ignore = "Requires running storefront and marketplace backend"]
async fn test_static_assets_are_served() {
    let client = client().expect("client");
    let page = client
        .get(url("/login"))
        .send()
        .await
        .expect("login")
        .text()
        .await
        .expect("body");

    let css = page
        .split("href=\"")
        .filter_map(|rest| rest.split('"').next())
        .find(|href| href.starts_with("/static/css/derived/"))
        .expect("stylesheet link")
        .to_string();

    let resp = client.get(url(&css)).send().await.expect("css");
    assert_eq!(resp.status(), StatusCode::OK);
    let cache = resp.headers()["cache-control"].to_str().expect("header");
    assert!(cache.contains("immutable"));
}
