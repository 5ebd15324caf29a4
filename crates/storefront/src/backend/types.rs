//! Transport types for the marketplace backend API.
//!
//! These mirror the JSON the backend sends and receives. They are view
//! models only: nothing here is persisted or mutated by the storefront.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use souq_core::{
    AreaId, CategoryId, CityId, CustomerId, DriverApplicationStatus, GovernorateId, Locale,
    LocationId, OrderId, OrderStatus, Price, ProductId, StoreId, UpgradeRole,
};

use crate::forms::FieldErrors;

// =============================================================================
// Envelopes
// =============================================================================

/// `{"data": ...}` wrapper used by single-resource endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// `{"success": bool, "data": [...]}` wrapper used by lookup endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Lookup<T> {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// A paginated collection.
#[derive(Debug, Clone, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "Vec::new")]
    pub links: Vec<PageLink>,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub last_page: Option<u32>,
}

impl<T> Paginated<T> {
    /// An empty page, used when a listing could not be loaded.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            data: Vec::new(),
            total: 0,
            links: Vec::new(),
            current_page: None,
            last_page: None,
        }
    }
}

/// One navigation link of a paginated collection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageLink {
    /// Target URL, `null` for disabled links (e.g. "previous" on page one).
    pub url: Option<String>,
    /// Display label (page number, or an HTML-escaped "previous"/"next" label).
    pub label: String,
    #[serde(default)]
    pub active: bool,
}

/// Result of a mutation endpoint that does not return the resource.
#[derive(Debug, Clone, Deserialize)]
pub struct MutationResponse {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub cart_count: Option<u32>,
}

/// Body of a `422 Unprocessable Entity` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: FieldErrors,
}

const fn default_true() -> bool {
    true
}

// =============================================================================
// References
// =============================================================================

/// `{id, name}` reference to another entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference<I> {
    pub id: I,
    pub name: String,
}

/// Category reference carried by products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

// =============================================================================
// Catalogue
// =============================================================================

/// A product offered by a store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub store: Option<Reference<StoreId>>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub is_favorite: bool,
}

/// Product detail response: the product plus related products.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductDetail {
    pub data: Product,
    #[serde(default = "Vec::new")]
    pub related: Vec<Product>,
}

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub products_count: u32,
}

/// Category detail response with the filtered product page.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryDetail {
    pub data: Category,
    pub products: Paginated<Product>,
}

/// A vendor selling on the marketplace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    #[serde(rename = "type", default)]
    pub store_type: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub governorate: Option<Reference<GovernorateId>>,
    #[serde(default)]
    pub city: Option<Reference<CityId>>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub opening_time: Option<String>,
    #[serde(default)]
    pub closing_time: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub products_count: u32,
    #[serde(default)]
    pub orders_count: u32,
}

/// Store detail response with the filtered product page.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreDetail {
    pub data: Store,
    pub products: Paginated<Product>,
}

/// Toggle result of the favorite endpoint.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FavoriteState {
    pub favorited: bool,
}

// =============================================================================
// Locations (administrative)
// =============================================================================

/// Top-level administrative region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Governorate {
    pub id: GovernorateId,
    pub name: String,
}

/// City inside a governorate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
    #[serde(default)]
    pub governorate_id: Option<GovernorateId>,
}

/// Delivery area used by the customer profile.
///
/// Older backend payloads name the parent reference `city` although it holds
/// a governorate id; both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
    #[serde(default, alias = "city")]
    pub governorate_id: Option<GovernorateId>,
}

// =============================================================================
// Cart & Orders
// =============================================================================

/// Minimal product data embedded in cart and order lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineProduct {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// One line of the customer's cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product: LineProduct,
    pub quantity: u32,
    pub unit_price: Price,
    pub total_price: Price,
}

/// The customer's cart as held by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total: Price,
    #[serde(default)]
    pub items_count: u32,
}

impl Cart {
    /// An empty cart, shown to guests.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: Price::default(),
            items_count: 0,
        }
    }
}

/// One line of a placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product: LineProduct,
    pub quantity: u32,
    pub unit_price: Price,
    pub total_price: Price,
}

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub store: Option<Reference<StoreId>>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub delivery_latitude: Option<f64>,
    #[serde(default)]
    pub delivery_longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub total_amount: Price,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// Customer
// =============================================================================

/// A saved delivery location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerLocation {
    pub id: LocationId,
    #[serde(default)]
    pub label: Option<String>,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

/// The authenticated customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub governorate_id: Option<GovernorateId>,
    /// The customer's stored default city, used to pre-select listing filters.
    #[serde(default)]
    pub city_id: Option<CityId>,
    #[serde(default)]
    pub area_id: Option<AreaId>,
    #[serde(default)]
    pub is_verified: bool,
}

/// A customer's application for the driver role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverApplication {
    pub status: DriverApplicationStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Profile response: the customer plus their driver application, if any.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub data: Customer,
    #[serde(default)]
    pub driver_application: Option<DriverApplication>,
}

/// A notification shown in the header dropdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Unread count plus the most recent notifications.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationSummary {
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default)]
    pub recent: Vec<Notification>,
}

/// Currency and date formatting preferences chosen by the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default = "default_currency_code")]
    pub currency_code: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default)]
    pub symbol_before_amount: bool,
    /// strftime-style pattern, e.g. `%d/%m/%Y`.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            currency_code: default_currency_code(),
            currency_symbol: default_currency_symbol(),
            symbol_before_amount: false,
            date_format: default_date_format(),
        }
    }
}

fn default_currency_code() -> String {
    "EGP".to_string()
}

fn default_currency_symbol() -> String {
    "EGP".to_string()
}

fn default_date_format() -> String {
    "%d/%m/%Y".to_string()
}

/// Session-derived context the backend provides for every page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionContext {
    #[serde(default)]
    pub user: Option<Customer>,
    #[serde(default)]
    pub notifications: NotificationSummary,
    #[serde(default)]
    pub locale: Option<Locale>,
    #[serde(default)]
    pub settings: DisplaySettings,
}

/// Successful login response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: Customer,
}

// =============================================================================
// Request bodies
// =============================================================================

/// Phone + password login request.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub phone: &'a str,
    pub password: &'a str,
}

/// Cart line mutation (`add` and `update`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartLineRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Cart line removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartRemoveRequest {
    pub product_id: ProductId,
}

/// Place an order for the current cart.
#[derive(Debug, Clone, Serialize)]
pub struct PlaceOrderRequest {
    pub location_id: LocationId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Create a saved location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub is_default: bool,
}

/// Ask for a role upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleUpgradeRequest {
    pub role: UpgradeRole,
}

/// Submit a driver application.
#[derive(Debug, Clone, Serialize)]
pub struct DriverApplicationRequest {
    pub vehicle_type: String,
    pub license_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Profile update fields; sent as multipart together with an optional avatar.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    pub governorate_id: Option<GovernorateId>,
    pub area_id: Option<AreaId>,
    pub avatar: Option<AvatarUpload>,
}

/// An avatar file received from the browser.
#[derive(Debug, Clone)]
pub struct AvatarUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_paginated_with_links() {
        let json = r#"{
            "data": [{"id": 1, "name": "Milk", "price": "25.50", "unit": "1L"}],
            "total": 31,
            "links": [
                {"url": null, "label": "&laquo; Previous", "active": false},
                {"url": "http://api/products?page=1", "label": "1", "active": true},
                {"url": "http://api/products?page=2", "label": "2", "active": false}
            ]
        }"#;
        let page: Paginated<Product> = serde_json::from_str(json).unwrap();
        assert_eq!(page.total, 31);
        assert_eq!(page.links.len(), 3);
        assert!(page.links[0].url.is_none());
        assert_eq!(page.data[0].price, Price::from_minor(2550));
        assert!(!page.data[0].is_featured);
    }

    #[test]
    fn test_store_type_is_renamed() {
        let store: Store =
            serde_json::from_str(r#"{"id": 3, "name": "Fresh", "type": "Bakery"}"#).unwrap();
        assert_eq!(store.store_type.as_deref(), Some("Bakery"));
        assert_eq!(store.products_count, 0);
    }

    #[test]
    fn test_area_accepts_legacy_city_key() {
        let area: Area = serde_json::from_str(r#"{"id": 9, "name": "Maadi", "city": 2}"#).unwrap();
        assert_eq!(area.governorate_id, Some(GovernorateId::new(2)));

        let area: Area =
            serde_json::from_str(r#"{"id": 9, "name": "Maadi", "governorate_id": 4}"#).unwrap();
        assert_eq!(area.governorate_id, Some(GovernorateId::new(4)));
    }

    #[test]
    fn test_lookup_envelope() {
        let lookup: Lookup<City> =
            serde_json::from_str(r#"{"success": true, "data": [{"id": 1, "name": "Nasr City"}]}"#)
                .unwrap();
        assert!(lookup.success);
        assert_eq!(lookup.data[0].id, CityId::new(1));
    }

    #[test]
    fn test_order_status_and_totals() {
        let json = r#"{
            "id": 77, "order_number": "ORD-0077", "status": "on_delivery",
            "items": [{"product": {"id": 1, "name": "Bread"}, "quantity": 2,
                       "unit_price": 5, "total_price": 10}],
            "created_at": "2026-05-01T10:00:00Z", "total_amount": "10.00"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::OnDelivery);
        assert_eq!(order.items[0].total_price, Price::from_minor(1000));
    }

    #[test]
    fn test_session_context_defaults() {
        let context: SessionContext = serde_json::from_str("{}").unwrap();
        assert!(context.user.is_none());
        assert_eq!(context.notifications.unread_count, 0);
        assert_eq!(context.settings, DisplaySettings::default());
    }

    #[test]
    fn test_validation_body() {
        let body: ValidationBody = serde_json::from_str(
            r#"{"message": "The given data was invalid.", "errors": {"phone": ["taken"]}}"#,
        )
        .unwrap();
        assert_eq!(body.errors.first("phone"), Some("taken"));
    }

    #[test]
    fn test_location_request_skips_empty_optionals() {
        let request = LocationRequest {
            label: None,
            address: "12 Tahrir St".to_string(),
            latitude: 30.0,
            longitude: 31.0,
            notes: None,
            is_default: true,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("label").is_none());
        assert_eq!(json["is_default"], true);
    }
}
