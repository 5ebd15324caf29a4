//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart lives in the marketplace backend; the storefront never counts
//! items itself. Every successful mutation fires `cart-updated`, which makes
//! the header badge re-fetch `/cart/count`. A failed mutation fires
//! `cart-error` with the message, shown as a blocking alert.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderValue,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use souq_core::ProductId;

use crate::backend::{BackendError, Cart};
use crate::context::{DisplayFormat, PageContext, Visitor};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::forms::lenient;
use crate::htmx::{HX_RESWAP, HX_TRIGGER, event_with_detail};
use crate::middleware::CspNonce;
use crate::services::cart::{AddToCart, CartMutation};
use crate::state::AppState;

/// Event fired after any successful cart change.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

/// Event fired with `{"message": ...}` when a cart change fails.
pub const CART_ERROR_EVENT: &str = "cart-error";

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub href: String,
    pub name: String,
    pub image: Option<String>,
    pub unit: Option<String>,
    pub quantity: u32,
    /// Quantity after pressing "−"; zero removes the line.
    pub decrement: i64,
    pub increment: i64,
    pub unit_price: String,
    pub total_price: String,
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub items_count: u32,
}

impl CartView {
    #[must_use]
    pub fn new(cart: &Cart, format: &DisplayFormat) -> Self {
        Self {
            lines: cart
                .items
                .iter()
                .map(|item| {
                    let quantity = i64::from(item.quantity);
                    CartLineView {
                        product_id: item.product.id,
                        href: format!("/products/{}", item.product.id),
                        name: item.product.name.clone(),
                        image: format.image(item.product.image.as_deref()),
                        unit: item.product.unit.clone(),
                        quantity: item.quantity,
                        decrement: quantity - 1,
                        increment: quantity + 1,
                        unit_price: format.price(&item.unit_price),
                        total_price: format.price(&item.total_price),
                    }
                })
                .collect(),
            total: format.price(&cart.total),
            items_count: cart.items_count,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    #[serde(default, deserialize_with = "lenient")]
    pub quantity: Option<i64>,
}

/// Update cart form data. A quantity of zero or less removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    #[serde(default, deserialize_with = "lenient")]
    pub quantity: Option<i64>,
}

impl UpdateCartForm {
    /// The change asked for, or `None` when the quantity is missing or not a number.
    #[must_use]
    pub fn mutation(&self) -> Option<CartMutation> {
        self.quantity
            .map(|quantity| CartMutation::for_quantity(self.product_id, quantity))
    }
}

/// Shown when an update arrives without a usable quantity.
const INVALID_QUANTITY: &str = "Please enter a valid quantity.";

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub page: PageContext,
    pub nonce: String,
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Headers for a failed cart change: fire `cart-error` and keep the page as it was.
fn cart_error(message: &str) -> [(axum::http::HeaderName, HeaderValue); 2] {
    [
        (
            HX_TRIGGER,
            event_with_detail(CART_ERROR_EVENT, &serde_json::json!({ "message": message })),
        ),
        (HX_RESWAP, HeaderValue::from_static("none")),
    ]
}

/// Turn a failed mutation into the `cart-error` event.
///
/// Expired sessions still go through [`AppError`] so the customer lands on
/// the login page.
fn mutation_failure(err: BackendError) -> Result<Response> {
    match err {
        BackendError::Unauthorized => Err(AppError::Unauthorized),
        err @ (BackendError::Validation { .. }
        | BackendError::Rejected(_)
        | BackendError::NotFound(_)
        | BackendError::RateLimited(_)) => {
            tracing::warn!(error = %err, "Cart change refused");
            Ok((cart_error(&err.user_message()), ()).into_response())
        }
        err => {
            tracing::error!(error = %err, "Cart change failed");
            Ok((cart_error(&err.user_message()), ()).into_response())
        }
    }
}

fn updated() -> [(axum::http::HeaderName, HeaderValue); 1] {
    [(HX_TRIGGER, HeaderValue::from_static(CART_UPDATED_EVENT))]
}

/// Display cart page.
#[instrument(skip(state, page, nonce))]
pub async fn show(
    State(state): State<AppState>,
    page: PageContext,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse> {
    if !page.is_authenticated() {
        return Err(AppError::Unauthorized);
    }
    let cart = state.market().cart(&page.caller()).await?;

    Ok(CartShowTemplate {
        cart: CartView::new(&cart, &page.format),
        page,
        nonce,
    })
}

/// Add a product to the cart (HTMX).
///
/// Returns an empty body; the page stays as it is and the badge refreshes
/// from the `cart-updated` event.
#[instrument(skip(state, visitor))]
pub async fn add(
    State(state): State<AppState>,
    visitor: Visitor,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    if !visitor.is_authenticated() {
        return Err(AppError::Unauthorized);
    }

    let request = AddToCart::new(form.product_id, form.quantity);
    let quantity = request.quantity();
    match request.send(state.market(), &visitor.caller()).await {
        Ok(_) => {
            add_breadcrumb(
                "cart",
                "Added product",
                Some(&[
                    ("product_id", &form.product_id.to_string()),
                    ("quantity", &quantity.to_string()),
                ]),
            );
            Ok((updated(), ()).into_response())
        }
        Err(err) => mutation_failure(err),
    }
}

/// Change a line's quantity (HTMX); zero or less removes it.
///
/// Returns the re-rendered cart items.
#[instrument(skip(state, visitor))]
pub async fn update(
    State(state): State<AppState>,
    visitor: Visitor,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    if !visitor.is_authenticated() {
        return Err(AppError::Unauthorized);
    }

    let Some(mutation) = form.mutation() else {
        tracing::warn!(product_id = %form.product_id, "Cart update without a usable quantity");
        return Ok((cart_error(INVALID_QUANTITY), ()).into_response());
    };
    let caller = visitor.caller();
    if let Err(err) = mutation.send(state.market(), &caller).await {
        return mutation_failure(err);
    }

    let context = state.market().session_context(&caller).await.unwrap_or_default();
    let format = DisplayFormat::new(
        &context.settings,
        state.config().market.storage_url.as_deref(),
    );
    let cart = state.market().cart(&caller).await?;

    Ok((
        updated(),
        CartItemsTemplate {
            cart: CartView::new(&cart, &format),
        },
    )
        .into_response())
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, visitor))]
pub async fn count(State(state): State<AppState>, visitor: Visitor) -> impl IntoResponse {
    let count = if visitor.is_authenticated() {
        state
            .market()
            .cart(&visitor.caller())
            .await
            .map(|cart| cart.items_count)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to fetch cart count");
                0
            })
    } else {
        0
    };

    CartCountTemplate { count }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::{CartItem, LineProduct};
    use axum::http::StatusCode;
    use souq_core::Price;

    #[test]
    fn test_cart_view_steppers() {
        let cart = Cart {
            items: vec![CartItem {
                product: LineProduct {
                    id: ProductId::new(3),
                    name: "Milk".to_string(),
                    image: None,
                    unit: Some("1 L".to_string()),
                },
                quantity: 1,
                unit_price: Price::from_minor(2500),
                total_price: Price::from_minor(2500),
            }],
            total: Price::from_minor(2500),
            items_count: 1,
        };
        let view = CartView::new(&cart, &DisplayFormat::default());
        let line = &view.lines[0];
        assert_eq!(line.decrement, 0);
        assert_eq!(line.increment, 2);
        assert_eq!(line.total_price, "25.00 EGP");
        assert!(!view.is_empty());
    }

    #[test]
    fn test_refused_change_fires_cart_error() {
        let response = mutation_failure(BackendError::Rejected("Out of stock".into())).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let trigger = response.headers()["hx-trigger"].to_str().unwrap();
        assert_eq!(trigger, r#"{"cart-error":{"message":"Out of stock"}}"#);
        assert_eq!(response.headers()["hx-reswap"], "none");
    }

    fn update_form(json: &str) -> UpdateCartForm {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_unusable_quantity_never_removes() {
        assert_eq!(update_form(r#"{"product_id": 7, "quantity": "abc"}"#).mutation(), None);
        assert_eq!(update_form(r#"{"product_id": 7}"#).mutation(), None);
        assert_eq!(update_form(r#"{"product_id": 7, "quantity": ""}"#).mutation(), None);
    }

    #[test]
    fn test_update_quantity_routes_to_mutation() {
        assert!(matches!(
            update_form(r#"{"product_id": 7, "quantity": "0"}"#).mutation(),
            Some(CartMutation::Remove(_))
        ));
        assert!(matches!(
            update_form(r#"{"product_id": 7, "quantity": "3"}"#).mutation(),
            Some(CartMutation::Update(_))
        ));
    }

    #[test]
    fn test_invalid_quantity_fires_cart_error() {
        let response = (cart_error(INVALID_QUANTITY), ()).into_response();
        let trigger = response.headers()["hx-trigger"].to_str().unwrap();
        assert!(trigger.contains("cart-error"));
        assert!(trigger.contains(INVALID_QUANTITY));
        assert_eq!(response.headers()["hx-reswap"], "none");
    }

    #[test]
    fn test_expired_session_is_unauthorized() {
        assert!(matches!(
            mutation_failure(BackendError::Unauthorized),
            Err(AppError::Unauthorized)
        ));
    }
}
