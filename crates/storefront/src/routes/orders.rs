//! Order history, order detail and checkout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use souq_core::{Coordinates, LocationId, OrderId, OrderStatus};

use crate::backend::{BackendError, CustomerLocation, Order, PlaceOrderRequest};
use crate::context::{DisplayFormat, PageContext, set_flash};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::forms::{FieldErrors, lenient};
use crate::listing::Pagination;
use crate::middleware::{CspNonce, RequireCustomer};
use crate::routes::cart::CartView;
use crate::state::AppState;

const PATH: &str = "/orders";

/// CSS modifier for an order status badge.
#[must_use]
pub const fn status_class(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "badge badge--warning",
        OrderStatus::Confirmed | OrderStatus::Preparing => "badge badge--info",
        OrderStatus::OnDelivery => "badge badge--primary",
        OrderStatus::Delivered => "badge badge--success",
        OrderStatus::Cancelled => "badge badge--danger",
    }
}

/// Order row data for templates.
#[derive(Debug, Clone)]
pub struct OrderRowView {
    pub href: String,
    pub number: String,
    pub status_label: &'static str,
    pub status_class: &'static str,
    pub date: String,
    pub total: String,
    pub items_count: usize,
    pub store_name: Option<String>,
}

impl OrderRowView {
    #[must_use]
    pub fn new(order: &Order, format: &DisplayFormat) -> Self {
        Self {
            href: format!("{PATH}/{}", order.id),
            number: order.order_number.clone(),
            status_label: order.status.label(),
            status_class: status_class(order.status),
            date: format.date(&order.created_at),
            total: format.price(&order.total_amount),
            items_count: order.items.len(),
            store_name: order.store.as_ref().map(|s| s.name.clone()),
        }
    }
}

/// Order line data for templates.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub name: String,
    pub image: Option<String>,
    pub unit: Option<String>,
    pub quantity: u32,
    pub unit_price: String,
    pub total_price: String,
}

/// Order detail data for templates.
#[derive(Debug, Clone)]
pub struct OrderDetailView {
    pub row: OrderRowView,
    pub cancel_href: String,
    pub lines: Vec<OrderLineView>,
    pub delivery_address: Option<String>,
    pub map_url: Option<String>,
    pub notes: Option<String>,
    pub placed_at: String,
    pub updated_at: Option<String>,
    pub can_cancel: bool,
}

impl OrderDetailView {
    #[must_use]
    pub fn new(order: &Order, format: &DisplayFormat) -> Self {
        let map_url = match (order.delivery_latitude, order.delivery_longitude) {
            (Some(lat), Some(lng)) => Coordinates::new(lat, lng).ok().map(|c| c.map_url()),
            _ => None,
        };

        Self {
            row: OrderRowView::new(order, format),
            cancel_href: format!("{PATH}/{}/cancel", order.id),
            lines: order
                .items
                .iter()
                .map(|item| OrderLineView {
                    name: item.product.name.clone(),
                    image: format.image(item.product.image.as_deref()),
                    unit: item.product.unit.clone(),
                    quantity: item.quantity,
                    unit_price: format.price(&item.unit_price),
                    total_price: format.price(&item.total_price),
                })
                .collect(),
            delivery_address: order.delivery_address.clone(),
            map_url,
            notes: order.notes.clone(),
            placed_at: format.date_time(&order.created_at),
            updated_at: order.updated_at.as_ref().map(|at| format.date_time(at)),
            can_cancel: order.status.offers_cancel(),
        }
    }
}

/// Order history page query.
#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    #[serde(default, deserialize_with = "lenient")]
    pub page: Option<u32>,
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub page: PageContext,
    pub nonce: String,
    pub orders: Vec<OrderRowView>,
    pub pagination: Pagination,
}

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub page: PageContext,
    pub nonce: String,
    pub order: OrderDetailView,
}

/// A saved location offered at checkout.
#[derive(Debug, Clone)]
pub struct LocationChoiceView {
    pub id: LocationId,
    pub label: String,
    pub address: String,
    pub checked: bool,
}

impl LocationChoiceView {
    /// Choices with the selected (or default) location checked.
    #[must_use]
    pub fn list(locations: &[CustomerLocation], selected: Option<LocationId>) -> Vec<Self> {
        let selected =
            selected.or_else(|| locations.iter().find(|l| l.is_default).map(|l| l.id));
        locations
            .iter()
            .map(|location| Self {
                id: location.id,
                label: location
                    .label
                    .clone()
                    .unwrap_or_else(|| "Saved address".to_string()),
                address: location.address.clone(),
                checked: Some(location.id) == selected,
            })
            .collect()
    }
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub nonce: String,
    pub cart: CartView,
    pub locations: Vec<LocationChoiceView>,
    pub notes: String,
    pub errors: FieldErrors,
}

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    #[serde(default, deserialize_with = "lenient")]
    pub location_id: Option<LocationId>,
    #[serde(default)]
    pub notes: String,
}

/// Display order history.
#[instrument(skip(state, page, nonce, customer), fields(customer_id = %customer.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    page: PageContext,
    CspNonce(nonce): CspNonce,
    Query(query): Query<OrdersQuery>,
) -> Result<impl IntoResponse> {
    let orders = state
        .market()
        .orders(&page.caller(), query.page.filter(|p| *p > 1))
        .await?;

    Ok(OrdersIndexTemplate {
        orders: orders
            .data
            .iter()
            .map(|o| OrderRowView::new(o, &page.format))
            .collect(),
        pagination: Pagination::new(&orders, PATH),
        page,
        nonce,
    })
}

/// Display one order.
#[instrument(skip(state, page, nonce, customer), fields(customer_id = %customer.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    page: PageContext,
    CspNonce(nonce): CspNonce,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse> {
    let order = state.market().order(&page.caller(), id).await?;

    Ok(OrderShowTemplate {
        order: OrderDetailView::new(&order, &page.format),
        page,
        nonce,
    })
}

/// Cancel an order. The backend decides whether it still can be.
#[instrument(skip(state, session, page, customer), fields(customer_id = %customer.id))]
pub async fn cancel(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    session: Session,
    page: PageContext,
    Path(id): Path<OrderId>,
) -> Result<Response> {
    match state.market().cancel_order(&page.caller(), id).await {
        Ok(response) => {
            add_breadcrumb("orders", "Cancelled order", Some(&[("order_id", &id.to_string())]));
            set_flash(
                &session,
                response
                    .message
                    .unwrap_or_else(|| "Your order was cancelled.".to_string()),
            )
            .await;
        }
        Err(err @ BackendError::Rejected(_)) => {
            set_flash(&session, err.user_message()).await;
        }
        Err(err) => return Err(err.into()),
    }
    Ok(Redirect::to(&format!("{PATH}/{id}")).into_response())
}

/// Display the checkout page: cart summary and delivery location choice.
#[instrument(skip(state, page, nonce, customer), fields(customer_id = %customer.id))]
pub async fn checkout_page(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    page: PageContext,
    CspNonce(nonce): CspNonce,
) -> Result<Response> {
    let caller = page.caller();
    let cart = state.market().cart(&caller).await?;
    if cart.items.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }
    let locations = state.market().locations(&caller).await?;

    Ok(CheckoutTemplate {
        cart: CartView::new(&cart, &page.format),
        locations: LocationChoiceView::list(&locations, None),
        notes: String::new(),
        errors: FieldErrors::new(),
        page,
        nonce,
    }
    .into_response())
}

/// Place the order and go to its page.
#[instrument(skip(state, page, nonce, customer, form), fields(customer_id = %customer.id))]
pub async fn place_order(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    page: PageContext,
    CspNonce(nonce): CspNonce,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let caller = page.caller();
    let notes = form.notes.trim().to_string();

    let errors = match form.location_id {
        Some(location_id) => {
            let request = PlaceOrderRequest {
                location_id,
                notes: (!notes.is_empty()).then(|| notes.clone()),
            };
            match state.market().place_order(&caller, &request).await {
                Ok(order) => {
                    add_breadcrumb(
                        "orders",
                        "Placed order",
                        Some(&[("order_id", &order.id.to_string())]),
                    );
                    return Ok(Redirect::to(&format!("{PATH}/{}", order.id)).into_response());
                }
                Err(err) => {
                    if let Some(errors) = err.field_errors() {
                        errors.clone()
                    } else if matches!(err, BackendError::Rejected(_)) {
                        FieldErrors::new().with("order", err.user_message())
                    } else {
                        return Err(AppError::from(err));
                    }
                }
            }
        }
        None => FieldErrors::new().with("location_id", "Please choose a delivery location."),
    };

    let cart = state.market().cart(&caller).await?;
    let locations = state.market().locations(&caller).await?;
    Ok((
        axum::http::StatusCode::UNPROCESSABLE_ENTITY,
        CheckoutTemplate {
            cart: CartView::new(&cart, &page.format),
            locations: LocationChoiceView::list(&locations, form.location_id),
            notes,
            errors,
            page,
            nonce,
        },
    )
        .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::{LineProduct, OrderItem, SessionContext};
    use crate::context::Visitor;
    use crate::listing::PageLinkView;
    use chrono::{TimeZone, Utc};
    use souq_core::Locale;
    use souq_core::{Price, ProductId};

    fn order(status: OrderStatus) -> Order {
        Order {
            id: OrderId::new(15),
            order_number: "ORD-0015".to_string(),
            status,
            items: vec![OrderItem {
                product: LineProduct {
                    id: ProductId::new(1),
                    name: "Bread".to_string(),
                    image: None,
                    unit: None,
                },
                quantity: 2,
                unit_price: Price::from_minor(500),
                total_price: Price::from_minor(1000),
            }],
            store: None,
            delivery_address: Some("12 Tahrir St".to_string()),
            delivery_latitude: Some(30.0444),
            delivery_longitude: Some(31.2357),
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 0).unwrap(),
            updated_at: None,
            total_amount: Price::from_minor(1000),
            notes: None,
        }
    }

    #[test]
    fn test_order_detail_view() {
        let view = OrderDetailView::new(&order(OrderStatus::Pending), &DisplayFormat::default());
        assert_eq!(view.row.href, "/orders/15");
        assert_eq!(view.row.date, "05/03/2024");
        assert_eq!(view.placed_at, "05/03/2024 14:07");
        assert_eq!(view.lines[0].total_price, "10.00 EGP");
        assert!(view.map_url.unwrap().contains("mlat=30.044400"));
        assert!(view.can_cancel);
    }

    #[test]
    fn test_cancel_only_while_pending_or_confirmed() {
        let format = DisplayFormat::default();
        assert!(OrderDetailView::new(&order(OrderStatus::Confirmed), &format).can_cancel);
        assert!(!OrderDetailView::new(&order(OrderStatus::Preparing), &format).can_cancel);
        assert!(!OrderDetailView::new(&order(OrderStatus::Delivered), &format).can_cancel);
    }

    #[test]
    fn test_status_badges() {
        assert_eq!(status_class(OrderStatus::Cancelled), "badge badge--danger");
        assert_eq!(status_class(OrderStatus::OnDelivery), "badge badge--primary");
    }

    #[test]
    fn test_default_location_is_preselected() {
        let location = |id: i64, is_default: bool| CustomerLocation {
            id: LocationId::new(id),
            label: None,
            address: format!("Address {id}"),
            latitude: 30.0,
            longitude: 31.0,
            notes: None,
            is_default,
        };
        let locations = vec![location(1, false), location(2, true)];

        let choices = LocationChoiceView::list(&locations, None);
        assert!(!choices[0].checked);
        assert!(choices[1].checked);

        let choices = LocationChoiceView::list(&locations, Some(LocationId::new(1)));
        assert!(choices[0].checked);
        assert!(!choices[1].checked);
    }

    fn pagination(pages: u32) -> Pagination {
        let mut links = vec![PageLinkView {
            href: None,
            label: "Previous".to_string(),
            active: false,
        }];
        links.extend((1..=pages).map(|n| PageLinkView {
            href: Some(format!("/orders?page={n}")),
            label: n.to_string(),
            active: n == 1,
        }));
        links.push(PageLinkView {
            href: None,
            label: "Next".to_string(),
            active: false,
        });
        Pagination {
            links,
            total: u64::from(pages) * 15,
        }
    }

    fn render_index(orders: &[Order], pagination: Pagination) -> String {
        let format = DisplayFormat::default();
        let page = PageContext::assemble(
            Visitor {
                customer: None,
                locale: Locale::En,
            },
            &SessionContext::default(),
            None,
            PATH.to_string(),
        );
        OrdersIndexTemplate {
            orders: orders.iter().map(|o| OrderRowView::new(o, &format)).collect(),
            pagination,
            page,
            nonce: "n0nce".to_string(),
        }
        .render()
        .unwrap()
    }

    #[test]
    fn test_no_orders_renders_empty_state_only() {
        let html = render_index(&[], pagination(3));
        assert!(html.contains("class=\"empty-state\""));
        assert!(!html.contains("<table"));
        assert!(!html.contains("class=\"pagination\""));
    }

    #[test]
    fn test_order_list_pagination_needs_more_than_three_links() {
        let orders = [order(OrderStatus::Pending)];

        let html = render_index(&orders, pagination(1));
        assert!(html.contains("<table"));
        assert!(html.contains("#ORD-0015"));
        assert!(!html.contains("class=\"empty-state\""));
        assert!(!html.contains("class=\"pagination\""));

        let html = render_index(&orders, pagination(2));
        assert!(html.contains("<table"));
        assert!(html.contains("class=\"pagination\""));
        assert!(html.contains("href=\"/orders?page=2\""));
    }
}
