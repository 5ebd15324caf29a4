//! HTMX request detection and response headers.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderName, HeaderValue, request::Parts},
};

/// Request header set by HTMX on every request it issues.
pub const HX_REQUEST: HeaderName = HeaderName::from_static("hx-request");

/// Set instead of a normal request when HTMX restores a page missing from
/// its history cache; such requests need the full page.
pub const HX_HISTORY_RESTORE_REQUEST: HeaderName =
    HeaderName::from_static("hx-history-restore-request");

/// Response header that fires client-side events after the swap.
pub const HX_TRIGGER: HeaderName = HeaderName::from_static("hx-trigger");

/// Response header that fires client-side events after settling.
pub const HX_TRIGGER_AFTER_SETTLE: HeaderName =
    HeaderName::from_static("hx-trigger-after-settle");

/// Response header overriding the swap style; `none` leaves the target alone.
pub const HX_RESWAP: HeaderName = HeaderName::from_static("hx-reswap");

/// Response header that makes HTMX do a full-page navigation.
pub const HX_REDIRECT: HeaderName = HeaderName::from_static("hx-redirect");

fn is_true(headers: &HeaderMap, name: &HeaderName) -> bool {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Whether the request was issued by HTMX and expects a fragment.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    is_true(headers, &HX_REQUEST) && !is_true(headers, &HX_HISTORY_RESTORE_REQUEST)
}

/// Extractor reporting whether the request came from HTMX.
///
/// Listing handlers use it to return only the results fragment.
#[derive(Debug, Clone, Copy)]
pub struct HxRequest(pub bool);

impl<S> FromRequestParts<S> for HxRequest
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(is_htmx(&parts.headers)))
    }
}

/// `HX-Trigger` value carrying one event with a JSON detail payload.
///
/// Header values must be visible ASCII, so non-ASCII characters (Arabic
/// messages) are written as JSON `\uXXXX` escapes, which the browser's JSON
/// parser restores.
#[must_use]
pub fn event_with_detail(event: &str, detail: &serde_json::Value) -> HeaderValue {
    let mut payload = serde_json::Map::new();
    payload.insert(event.to_string(), detail.clone());
    let json = ascii_json(&serde_json::Value::Object(payload).to_string());
    HeaderValue::from_str(&json).unwrap_or_else(|_| HeaderValue::from_static("{}"))
}

fn ascii_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for ch in json.chars() {
        if ch.is_ascii() && !ch.is_ascii_control() {
            out.push(ch);
        } else {
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));
        headers.insert(HX_REQUEST, HeaderValue::from_static("true"));
        assert!(is_htmx(&headers));
        headers.insert(HX_HISTORY_RESTORE_REQUEST, HeaderValue::from_static("true"));
        assert!(!is_htmx(&headers));
    }

    #[test]
    fn test_event_with_detail_ascii_only() {
        let value = event_with_detail(
            "cart-error",
            &serde_json::json!({"message": "نفدت الكمية"}),
        );
        let text = value.to_str().unwrap();
        assert!(text.starts_with(r#"{"cart-error":{"message":"\u"#));

        let parsed: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(parsed["cart-error"]["message"], "نفدت الكمية");
    }

    #[test]
    fn test_event_with_detail_plain() {
        let value = event_with_detail("cart-error", &serde_json::json!({"message": "Out of stock"}));
        assert_eq!(
            value.to_str().unwrap(),
            r#"{"cart-error":{"message":"Out of stock"}}"#
        );
    }
}
