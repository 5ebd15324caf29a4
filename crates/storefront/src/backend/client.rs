//! HTTP client for the marketplace backend.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use souq_core::{CategoryId, GovernorateId, LocationId, OrderId, ProductId, StoreId};

use super::cache::{CacheKey, CacheValue};
use super::types::{
    Area, Cart, CartLineRequest, CartRemoveRequest, Category, CategoryDetail, City, Customer,
    CustomerLocation, DriverApplication, DriverApplicationRequest, Envelope, FavoriteState,
    Governorate, LocationRequest, LoginRequest, LoginResponse, Lookup, MutationResponse, Order,
    Paginated, PlaceOrderRequest, Product, ProductDetail, Profile, ProfileUpdate,
    RoleUpgradeRequest, SessionContext, Store, StoreDetail, ValidationBody,
};
use super::{BackendError, Caller};
use crate::config::MarketApiConfig;

/// Characters of an error body kept in logs and error messages.
const BODY_LOG_LIMIT: usize = 500;

/// Reference lookups live this long before being refetched.
const LOOKUP_TTL: Duration = Duration::from_secs(300);

/// Query parameters for a backend request.
pub type QueryPairs<'a> = &'a [(&'a str, String)];

// =============================================================================
// MarketClient
// =============================================================================

/// Client for the marketplace backend JSON API.
///
/// Cheap to clone; all clones share one connection pool and lookup cache.
#[derive(Clone)]
pub struct MarketClient {
    inner: Arc<MarketClientInner>,
}

struct MarketClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl MarketClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or API key cannot be used, or the
    /// HTTP client fails to build.
    pub fn new(config: &MarketApiConfig) -> Result<Self, BackendError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| BackendError::InvalidConfig(format!("MARKET_API_URL: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut api_key = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|e| BackendError::InvalidConfig(format!("MARKET_API_KEY: {e}")))?;
        api_key.set_sensitive(true);
        headers.insert("X-Api-Key", api_key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(LOOKUP_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(MarketClientInner {
                client,
                base_url,
                cache,
            }),
        })
    }

    /// Build the absolute URL for a backend path.
    fn url(&self, path: &str, query: QueryPairs<'_>) -> Url {
        let mut url = self.inner.base_url.clone();
        let joined = format!("{}{path}", url.path().trim_end_matches('/'));
        url.set_path(&joined);
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    /// Start a request carrying the caller's locale and token.
    fn request(
        &self,
        method: Method,
        path: &str,
        query: QueryPairs<'_>,
        caller: &Caller,
    ) -> RequestBuilder {
        let builder = self
            .inner
            .client
            .request(method, self.url(path, query))
            .header(ACCEPT_LANGUAGE, caller.locale().as_str());

        match caller.token() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and return the body of a successful response.
    async fn execute(&self, builder: RequestBuilder, path: &str) -> Result<String, BackendError> {
        let response = builder.send().await?;
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = response.text().await?;
        check_status(status, retry_after.as_deref(), &body, path)?;
        Ok(body)
    }

    /// Send a request and decode the JSON response.
    async fn fetch<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        path: &str,
    ) -> Result<T, BackendError> {
        let body = self.execute(builder, path).await?;
        decode(&body, path)
    }

    /// Send a mutation and check the backend accepted it.
    async fn mutate(
        &self,
        builder: RequestBuilder,
        path: &str,
    ) -> Result<MutationResponse, BackendError> {
        let body = self.execute(builder, path).await?;
        decode_mutation(&body, path)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        caller: &Caller,
        path: &str,
        query: QueryPairs<'_>,
    ) -> Result<T, BackendError> {
        let builder = self.request(Method::GET, path, query, caller);
        self.fetch(builder, path).await
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        caller: &Caller,
        path: &str,
        body: &B,
    ) -> Result<MutationResponse, BackendError> {
        let builder = self.request(Method::POST, path, &[], caller).json(body);
        self.mutate(builder, path).await
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Customer, notifications and display settings for the page shell.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; callers fall back to defaults.
    #[instrument(skip(self))]
    pub async fn session_context(&self, caller: &Caller) -> Result<SessionContext, BackendError> {
        self.get(caller, "/session/context", &[]).await
    }

    /// Exchange phone + password for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for bad credentials, or an error if the request fails.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        caller: &Caller,
        phone: &str,
        password: &str,
    ) -> Result<LoginResponse, BackendError> {
        let path = "/auth/login";
        let builder = self
            .request(Method::POST, path, &[], caller)
            .json(&LoginRequest { phone, password });
        self.fetch(builder, path).await
    }

    /// Revoke the caller's token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn logout(&self, caller: &Caller) -> Result<(), BackendError> {
        self.post(caller, "/auth/logout", &serde_json::json!({}))
            .await
            .map(|_| ())
    }

    // =========================================================================
    // Catalogue
    // =========================================================================

    /// A filtered page of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn products(
        &self,
        caller: &Caller,
        query: QueryPairs<'_>,
    ) -> Result<Paginated<Product>, BackendError> {
        self.get(caller, "/products", query).await
    }

    /// A product with related products.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist, or an error if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(
        &self,
        caller: &Caller,
        id: ProductId,
    ) -> Result<ProductDetail, BackendError> {
        self.get(caller, &format!("/products/{id}"), &[]).await
    }

    /// Toggle a product in the caller's favorites.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn toggle_favorite(
        &self,
        caller: &Caller,
        id: ProductId,
    ) -> Result<FavoriteState, BackendError> {
        let path = format!("/products/{id}/favorite");
        let builder = self.request(Method::POST, &path, &[], caller);
        self.fetch(builder, &path).await
    }

    /// A filtered page of stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn stores(
        &self,
        caller: &Caller,
        query: QueryPairs<'_>,
    ) -> Result<Paginated<Store>, BackendError> {
        self.get(caller, "/stores", query).await
    }

    /// A store with a filtered page of its products.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the store does not exist, or an error if the request fails.
    #[instrument(skip(self), fields(store_id = %id))]
    pub async fn store(
        &self,
        caller: &Caller,
        id: StoreId,
        query: QueryPairs<'_>,
    ) -> Result<StoreDetail, BackendError> {
        self.get(caller, &format!("/stores/{id}"), query).await
    }

    /// All categories (cached).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self, caller: &Caller) -> Result<Vec<Category>, BackendError> {
        let cache_key = CacheKey::Categories(caller.locale());
        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let envelope: Envelope<Vec<Category>> = self.get(caller, "/categories", &[]).await?;
        self.inner
            .cache
            .insert(cache_key, CacheValue::Categories(envelope.data.clone()))
            .await;
        Ok(envelope.data)
    }

    /// A category with a filtered page of its products.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the category does not exist, or an error if the request fails.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn category(
        &self,
        caller: &Caller,
        id: CategoryId,
        query: QueryPairs<'_>,
    ) -> Result<CategoryDetail, BackendError> {
        self.get(caller, &format!("/categories/{id}"), query).await
    }

    // =========================================================================
    // Lookups (cached)
    // =========================================================================

    /// All governorates.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn governorates(&self, caller: &Caller) -> Result<Vec<Governorate>, BackendError> {
        let cache_key = CacheKey::Governorates(caller.locale());
        if let Some(CacheValue::Governorates(items)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for governorates");
            return Ok(items);
        }

        let items = self
            .lookup::<Governorate>(caller, "/lookups/governorates")
            .await?;
        self.inner
            .cache
            .insert(cache_key, CacheValue::Governorates(items.clone()))
            .await;
        Ok(items)
    }

    /// Cities of one governorate.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(governorate_id = %governorate_id))]
    pub async fn cities(
        &self,
        caller: &Caller,
        governorate_id: GovernorateId,
    ) -> Result<Vec<City>, BackendError> {
        let cache_key = CacheKey::Cities(caller.locale(), governorate_id);
        if let Some(CacheValue::Cities(items)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for cities");
            return Ok(items);
        }

        let path = format!("/lookups/governorates/{governorate_id}/cities");
        let items = self.lookup::<City>(caller, &path).await?;
        self.inner
            .cache
            .insert(cache_key, CacheValue::Cities(items.clone()))
            .await;
        Ok(items)
    }

    /// All delivery areas.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn areas(&self, caller: &Caller) -> Result<Vec<Area>, BackendError> {
        let cache_key = CacheKey::Areas(caller.locale());
        if let Some(CacheValue::Areas(items)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for areas");
            return Ok(items);
        }

        let items = self.lookup::<Area>(caller, "/lookups/areas").await?;
        self.inner
            .cache
            .insert(cache_key, CacheValue::Areas(items.clone()))
            .await;
        Ok(items)
    }

    /// Store type labels for the stores filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn store_types(&self, caller: &Caller) -> Result<Vec<String>, BackendError> {
        let cache_key = CacheKey::StoreTypes(caller.locale());
        if let Some(CacheValue::StoreTypes(items)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for store types");
            return Ok(items);
        }

        let items = self.lookup::<String>(caller, "/lookups/store-types").await?;
        self.inner
            .cache
            .insert(cache_key, CacheValue::StoreTypes(items.clone()))
            .await;
        Ok(items)
    }

    async fn lookup<T: DeserializeOwned>(
        &self,
        caller: &Caller,
        path: &str,
    ) -> Result<Vec<T>, BackendError> {
        let lookup: Lookup<T> = self.get(caller, path, &[]).await?;
        if !lookup.success {
            return Err(BackendError::Rejected(format!("lookup {path} failed")));
        }
        Ok(lookup.data)
    }

    // =========================================================================
    // Cart (not cached - mutable state)
    // =========================================================================

    /// The caller's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn cart(&self, caller: &Caller) -> Result<Cart, BackendError> {
        self.get(caller, "/cart", &[]).await
    }

    /// Add a quantity of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        caller: &Caller,
        line: CartLineRequest,
    ) -> Result<MutationResponse, BackendError> {
        self.post(caller, "/cart/add", &line).await
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn update_cart_line(
        &self,
        caller: &Caller,
        line: CartLineRequest,
    ) -> Result<MutationResponse, BackendError> {
        self.post(caller, "/cart/update", &line).await
    }

    /// Remove a product from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(
        &self,
        caller: &Caller,
        line: CartRemoveRequest,
    ) -> Result<MutationResponse, BackendError> {
        self.post(caller, "/cart/remove", &line).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// A page of the caller's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn orders(
        &self,
        caller: &Caller,
        page: Option<u32>,
    ) -> Result<Paginated<Order>, BackendError> {
        let query: Vec<(&str, String)> = page.map(|p| ("page", p.to_string())).into_iter().collect();
        self.get(caller, "/orders", &query).await
    }

    /// Recent orders for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn recent_orders(
        &self,
        caller: &Caller,
        limit: u32,
    ) -> Result<Vec<Order>, BackendError> {
        let page: Paginated<Order> = self
            .get(caller, "/orders", &[("per_page", limit.to_string())])
            .await?;
        Ok(page.data)
    }

    /// One of the caller's orders.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist, or an error if the request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn order(&self, caller: &Caller, id: OrderId) -> Result<Order, BackendError> {
        let envelope: Envelope<Order> = self.get(caller, &format!("/orders/{id}"), &[]).await?;
        Ok(envelope.data)
    }

    /// Place an order for the current cart.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the backend rejects the order, or an error if the request fails.
    #[instrument(skip(self))]
    pub async fn place_order(
        &self,
        caller: &Caller,
        request: &PlaceOrderRequest,
    ) -> Result<Order, BackendError> {
        let path = "/orders";
        let builder = self.request(Method::POST, path, &[], caller).json(request);
        let envelope: Envelope<Order> = self.fetch(builder, path).await?;
        Ok(envelope.data)
    }

    /// Ask the backend to cancel an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn cancel_order(
        &self,
        caller: &Caller,
        id: OrderId,
    ) -> Result<MutationResponse, BackendError> {
        self.post(caller, &format!("/orders/{id}/cancel"), &serde_json::json!({}))
            .await
    }

    // =========================================================================
    // Locations
    // =========================================================================

    /// The caller's saved delivery locations.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn locations(&self, caller: &Caller) -> Result<Vec<CustomerLocation>, BackendError> {
        let envelope: Envelope<Vec<CustomerLocation>> = self.get(caller, "/locations", &[]).await?;
        Ok(envelope.data)
    }

    /// Save a new delivery location.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the backend rejects the fields, or an error if the request fails.
    #[instrument(skip(self))]
    pub async fn create_location(
        &self,
        caller: &Caller,
        request: &LocationRequest,
    ) -> Result<MutationResponse, BackendError> {
        self.post(caller, "/locations", request).await
    }

    /// Delete a saved location.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(location_id = %id))]
    pub async fn delete_location(
        &self,
        caller: &Caller,
        id: LocationId,
    ) -> Result<MutationResponse, BackendError> {
        let path = format!("/locations/{id}");
        let builder = self.request(Method::DELETE, &path, &[], caller);
        self.mutate(builder, &path).await
    }

    /// Make a saved location the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(location_id = %id))]
    pub async fn set_default_location(
        &self,
        caller: &Caller,
        id: LocationId,
    ) -> Result<MutationResponse, BackendError> {
        self.post(
            caller,
            &format!("/locations/{id}/default"),
            &serde_json::json!({}),
        )
        .await
    }

    // =========================================================================
    // Profile & roles
    // =========================================================================

    /// The caller's profile and driver application.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn profile(&self, caller: &Caller) -> Result<Profile, BackendError> {
        self.get(caller, "/profile", &[]).await
    }

    /// Update the profile, including an optional new avatar.
    ///
    /// Sent as multipart with a `_method=PUT` override so the file survives
    /// the backend's form parsing.
    ///
    /// # Errors
    ///
    /// Returns `Validation` with field errors, or an error if the request fails.
    #[instrument(skip(self, update), fields(has_avatar = update.avatar.is_some()))]
    pub async fn update_profile(
        &self,
        caller: &Caller,
        update: ProfileUpdate,
    ) -> Result<Customer, BackendError> {
        let path = "/profile";
        let form = profile_form(update)?;
        let builder = self
            .request(Method::POST, path, &[], caller)
            .multipart(form);
        let envelope: Envelope<Customer> = self.fetch(builder, path).await?;
        Ok(envelope.data)
    }

    /// Ask for an upgrade to another role.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses.
    #[instrument(skip(self))]
    pub async fn request_role_upgrade(
        &self,
        caller: &Caller,
        request: RoleUpgradeRequest,
    ) -> Result<MutationResponse, BackendError> {
        self.post(caller, "/role-upgrade", &request).await
    }

    /// The caller's driver application, if one was submitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn driver_application(
        &self,
        caller: &Caller,
    ) -> Result<Option<DriverApplication>, BackendError> {
        let envelope: Envelope<Option<DriverApplication>> =
            self.get(caller, "/driver-application", &[]).await?;
        Ok(envelope.data)
    }

    /// Submit a driver application.
    ///
    /// # Errors
    ///
    /// Returns `Validation` with field errors, or an error if the request fails.
    #[instrument(skip(self, request))]
    pub async fn submit_driver_application(
        &self,
        caller: &Caller,
        request: &DriverApplicationRequest,
    ) -> Result<Option<DriverApplication>, BackendError> {
        let path = "/driver-application";
        let builder = self.request(Method::POST, path, &[], caller).json(request);
        let envelope: Envelope<Option<DriverApplication>> = self.fetch(builder, path).await?;
        Ok(envelope.data)
    }
}

// =============================================================================
// Response handling
// =============================================================================

fn truncate(body: &str) -> String {
    body.chars().take(BODY_LOG_LIMIT).collect()
}

/// Map a non-success status to the matching error.
fn check_status(
    status: StatusCode,
    retry_after: Option<&str>,
    body: &str,
    path: &str,
) -> Result<(), BackendError> {
    if status.is_success() {
        return Ok(());
    }

    match status {
        StatusCode::UNAUTHORIZED => Err(BackendError::Unauthorized),
        StatusCode::NOT_FOUND => Err(BackendError::NotFound(path.to_string())),
        StatusCode::UNPROCESSABLE_ENTITY => {
            let parsed: ValidationBody = serde_json::from_str(body).map_err(|e| {
                tracing::error!(
                    error = %e,
                    path,
                    body = %truncate(body),
                    "Backend validation response is not the expected shape"
                );
                e
            })?;
            Err(BackendError::Validation {
                message: parsed
                    .message
                    .unwrap_or_else(|| "The given data was invalid.".to_string()),
                errors: parsed.errors,
            })
        }
        StatusCode::TOO_MANY_REQUESTS => {
            let seconds = retry_after
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(1);
            Err(BackendError::RateLimited(seconds))
        }
        _ => {
            tracing::error!(
                status = %status,
                path,
                body = %truncate(body),
                "Backend returned non-success status"
            );
            Err(BackendError::Upstream {
                status: status.as_u16(),
                message: truncate(body),
            })
        }
    }
}

fn decode<T: DeserializeOwned>(body: &str, path: &str) -> Result<T, BackendError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            error = %e,
            path,
            body = %truncate(body),
            "Failed to parse backend response"
        );
        BackendError::Parse(e)
    })
}

/// Decode a mutation response; an empty body (204) counts as success.
fn decode_mutation(body: &str, path: &str) -> Result<MutationResponse, BackendError> {
    let response = if body.trim().is_empty() {
        MutationResponse {
            success: true,
            message: None,
            cart_count: None,
        }
    } else {
        decode::<MutationResponse>(body, path)?
    };

    if response.success {
        Ok(response)
    } else {
        Err(BackendError::Rejected(
            response
                .message
                .unwrap_or_else(|| "The request was not accepted.".to_string()),
        ))
    }
}

fn profile_form(update: ProfileUpdate) -> Result<reqwest::multipart::Form, BackendError> {
    let mut form = reqwest::multipart::Form::new()
        .text("_method", "PUT")
        .text("name", update.name)
        .text("phone", update.phone)
        .text("address", update.address.unwrap_or_default())
        .text(
            "governorate_id",
            update
                .governorate_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
        )
        .text(
            "area_id",
            update.area_id.map(|id| id.to_string()).unwrap_or_default(),
        );

    if let Some(avatar) = update.avatar {
        let part = reqwest::multipart::Part::bytes(avatar.bytes)
            .file_name(avatar.file_name)
            .mime_str(&avatar.content_type)?;
        form = form.part("avatar", part);
    }

    Ok(form)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use souq_core::Locale;

    use super::*;

    fn client() -> MarketClient {
        MarketClient::new(&MarketApiConfig {
            base_url: "https://api.souq.example/api/v1".to_string(),
            api_key: SecretString::from("sk_live_9f8e7d6c5b4a3f2e1d0c"),
            timeout: Duration::from_secs(5),
            storage_url: None,
        })
        .unwrap()
    }

    #[test]
    fn test_url_keeps_base_path() {
        let url = client().url("/products", &[]);
        assert_eq!(url.as_str(), "https://api.souq.example/api/v1/products");
    }

    #[test]
    fn test_url_encodes_query() {
        let query = [
            ("search", "rice & beans".to_string()),
            ("city_id", "4".to_string()),
        ];
        let url = client().url("/stores", &query);
        assert_eq!(
            url.as_str(),
            "https://api.souq.example/api/v1/stores?search=rice+%26+beans&city_id=4"
        );
    }

    #[test]
    fn test_check_status_success() {
        assert!(check_status(StatusCode::OK, None, "{}", "/cart").is_ok());
        assert!(check_status(StatusCode::NO_CONTENT, None, "", "/cart").is_ok());
    }

    #[test]
    fn test_check_status_validation() {
        let body = r#"{"message": "Invalid.", "errors": {"address": ["required"]}}"#;
        let err =
            check_status(StatusCode::UNPROCESSABLE_ENTITY, None, body, "/locations").unwrap_err();
        match err {
            BackendError::Validation { message, errors } => {
                assert_eq!(message, "Invalid.");
                assert_eq!(errors.first("address"), Some("required"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_check_status_rate_limited() {
        let err = check_status(StatusCode::TOO_MANY_REQUESTS, Some("12"), "", "/cart").unwrap_err();
        assert!(matches!(err, BackendError::RateLimited(12)));

        let err = check_status(StatusCode::TOO_MANY_REQUESTS, None, "", "/cart").unwrap_err();
        assert!(matches!(err, BackendError::RateLimited(1)));
    }

    #[test]
    fn test_check_status_unauthorized_and_not_found() {
        assert!(matches!(
            check_status(StatusCode::UNAUTHORIZED, None, "", "/profile"),
            Err(BackendError::Unauthorized)
        ));
        assert!(matches!(
            check_status(StatusCode::NOT_FOUND, None, "", "/orders/4"),
            Err(BackendError::NotFound(path)) if path == "/orders/4"
        ));
    }

    #[test]
    fn test_check_status_upstream_truncates_body() {
        let body = "x".repeat(2000);
        let err =
            check_status(StatusCode::BAD_GATEWAY, None, &body, "/products").unwrap_err();
        match err {
            BackendError::Upstream { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message.len(), BODY_LOG_LIMIT);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_mutation() {
        assert!(decode_mutation("", "/locations/1").unwrap().success);

        let ok = decode_mutation(r#"{"success": true, "cart_count": 3}"#, "/cart/add").unwrap();
        assert_eq!(ok.cart_count, Some(3));

        let err = decode_mutation(
            r#"{"success": false, "message": "Out of stock"}"#,
            "/cart/add",
        )
        .unwrap_err();
        assert!(matches!(err, BackendError::Rejected(msg) if msg == "Out of stock"));
    }

    #[test]
    fn test_decode_reports_parse_errors() {
        let err = decode::<Cart>("<html>", "/cart").unwrap_err();
        assert!(matches!(err, BackendError::Parse(_)));
    }

    #[test]
    fn test_guest_caller_has_no_token() {
        assert!(!Caller::guest(Locale::En).is_authenticated());
    }
}
