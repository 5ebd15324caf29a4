//! Signed-in customer flows.
//!
//! These tests require everything `storefront_pages` does, plus a customer
//! account on the backend (`SOUQ_TEST_PHONE`, `SOUQ_TEST_PASSWORD`). They
//! skip themselves when the credentials are not set.

use reqwest::StatusCode;
use souq_integration_tests::{client, credentials, location, sign_in, url};

#[tokio::test]
#[ignore = "Requires running storefront and marketplace backend"]
async fn test_wrong_password_renders_inline_error() {
    let client = client().expect("client");
    let status = sign_in(&client, "01000000000", "definitely-wrong")
        .await
        .expect("login");
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[ignore = "Requires running storefront and marketplace backend"]
async fn test_login_and_logout() {
    let Some((phone, password)) = credentials() else {
        return;
    };
    let client = client().expect("client");

    let status = sign_in(&client, &phone, &password).await.expect("login");
    assert_eq!(status, StatusCode::SEE_OTHER);

    let resp = client.get(url("/orders")).send().await.expect("orders");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client.get(url("/login")).send().await.expect("login page");
    assert!(resp.status().is_redirection());

    let resp = client.post(url("/logout")).send().await.expect("logout");
    assert!(resp.status().is_redirection());

    let resp = client.get(url("/orders")).send().await.expect("orders");
    assert_eq!(location(&resp).as_deref(), Some("/login"));
}

#[tokio::test]
#[ignore = "Requires running storefront and marketplace backend"]
async fn test_cart_count_and_refused_update() {
    let Some((phone, password)) = credentials() else {
        return;
    };
    let client = client().expect("client");
    sign_in(&client, &phone, &password).await.expect("login");

    let resp = client
        .get(url("/cart/count"))
        .header("HX-Request", "true")
        .send()
        .await
        .expect("count");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.expect("body").contains(r#"id="cart-count""#));

    // Removing a product that is not in the cart is refused as a cart-error
    let resp = client
        .post(url("/cart/update"))
        .header("HX-Request", "true")
        .form(&[("product_id", "999999999"), ("quantity", "0")])
        .send()
        .await
        .expect("update");
    assert_eq!(resp.status(), StatusCode::OK);
    let trigger = resp.headers()["hx-trigger"].to_str().expect("header");
    assert!(trigger.contains("cart-error") || trigger.contains("cart-updated"));

    // A quantity that is not a number is refused without touching the cart
    let resp = client
        .post(url("/cart/update"))
        .header("HX-Request", "true")
        .form(&[("product_id", "1"), ("quantity", "abc")])
        .send()
        .await
        .expect("update");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["hx-reswap"], "none");
    let trigger = resp.headers()["hx-trigger"].to_str().expect("header");
    assert!(trigger.contains("cart-error"));
}

#[tokio::test]
#[ignore = "Requires running storefront and marketplace backend"]
async fn test_blank_location_address_rejected() {
    let Some((phone, password)) = credentials() else {
        return;
    };
    let client = client().expect("client");
    sign_in(&client, &phone, &password).await.expect("login");

    let resp = client
        .post(url("/locations"))
        .form(&[("label", "Home"), ("address", "   ")])
        .send()
        .await
        .expect("create location");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.text().await.expect("body").contains("form__error"));
}

#[tokio::test]
#[ignore = "Requires running storefront and marketplace backend"]
async fn test_geolocation_status_fragment() {
    let Some((phone, password)) = credentials() else {
        return;
    };
    let client = client().expect("client");
    sign_in(&client, &phone, &password).await.expect("login");

    let resp = client
        .post(url("/locations/position"))
        .json(&serde_json::json!({"status": "success", "latitude": 30.0444, "longitude": 31.2357}))
        .send()
        .await
        .expect("position");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("30.044400"));
    assert!(body.contains(r#"hx-swap-oob="true""#));

    let resp = client
        .post(url("/locations/position"))
        .json(&serde_json::json!({"status": "error", "code": 1}))
        .send()
        .await
        .expect("position");
    assert!(resp.text().await.expect("body").contains("geo-status--error"));
}
