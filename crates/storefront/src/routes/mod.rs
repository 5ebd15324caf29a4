//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Customer dashboard
//! POST /dashboard/upgrade-role        - Role upgrade (store: request, driver: redirect)
//! GET  /health                        - Liveness
//! GET  /health/ready                  - Session database reachable
//!
//! # Catalogue (listing pages answer HTMX with the results fragment)
//! GET  /products                      - Filtered product listing
//! GET  /products/{id}                 - Product detail
//! POST /products/{id}/favorite        - Toggle favorite (fragment)
//! GET  /stores                        - Filtered store listing
//! GET  /stores/{id}                   - Store header + filtered products
//! GET  /categories                    - Category grid
//! GET  /categories/{id}               - Category header + filtered products
//!
//! # Dependent dropdowns (fragments)
//! GET  /lookup/cities                 - City select for a governorate
//! GET  /lookup/areas                  - Area select for a governorate
//!
//! # Cart (HTMX fragments)
//! GET  /cart                          - Cart page
//! POST /cart/add                      - Add to cart (empty body, fires cart-updated)
//! POST /cart/update                   - Set quantity, <= 0 removes (cart_items fragment)
//! GET  /cart/count                    - Cart count badge
//!
//! # Orders (requires auth)
//! GET  /checkout                      - Cart summary + delivery location choice
//! POST /checkout                      - Place order
//! GET  /orders                        - Order history
//! GET  /orders/{id}                   - Order detail
//! POST /orders/{id}/cancel            - Cancel order
//!
//! # Account (requires auth)
//! GET  /profile                       - Profile form
//! POST /profile                       - Save profile (multipart)
//! POST /profile/avatar-preview        - Avatar preview (fragment)
//! GET  /locations                     - Saved locations + add form
//! POST /locations                     - Save location
//! POST /locations/{id}/delete         - Delete location
//! POST /locations/{id}/default        - Make location the default
//! POST /locations/position            - Geolocation status (fragment)
//! GET  /driver-application            - Driver application status + form
//! POST /driver-application            - Submit driver application
//!
//! # Session
//! GET  /login                         - Login page
//! POST /login                         - Login action
//! POST /logout                        - Logout action
//! POST /locale                        - Switch language
//! ```

pub mod auth;
pub mod cart;
pub mod categories;
pub mod dashboard;
pub mod driver;
pub mod listing_page;
pub mod locale;
pub mod locations;
pub mod lookup;
pub mod orders;
pub mod products;
pub mod profile;
pub mod stores;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::middleware::{login_rate_limiter, mutation_rate_limiter};
use crate::services::profile::AVATAR_MAX_BYTES;
use crate::state::AppState;

/// Body limit for profile posts: the avatar plus the text fields and
/// multipart framing. Larger uploads are refused before the handler runs.
const PROFILE_BODY_LIMIT: usize = AVATAR_MAX_BYTES * 4;

/// Create the session routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(login_rate_limiter())),
        )
        .route("/logout", post(auth::logout))
        .route("/locale", post(locale::switch))
}

/// Create the catalogue routes router.
pub fn catalogue_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/stores", get(stores::index))
        .route("/stores/{id}", get(stores::show))
        .route("/categories", get(categories::index))
        .route("/categories/{id}", get(categories::show))
        .route("/lookup/cities", get(lookup::cities))
        .route("/lookup/areas", get(lookup::areas))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .merge(
            Router::new()
                .route("/add", post(cart::add))
                .route("/update", post(cart::update))
                .layer(mutation_rate_limiter()),
        )
}

/// Create the order and checkout routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/checkout",
            get(orders::checkout_page).post(orders::place_order),
        )
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/cancel", post(orders::cancel))
}

/// Create the customer account routes router.
pub fn account_routes() -> Router<AppState> {
    let profile = Router::new()
        .route("/profile", get(profile::show).post(profile::update))
        .route("/profile/avatar-preview", post(profile::avatar_preview))
        .layer(DefaultBodyLimit::max(PROFILE_BODY_LIMIT));

    let mutations = Router::new()
        .route("/products/{id}/favorite", post(products::toggle_favorite))
        .route("/locations/{id}/delete", post(locations::delete))
        .route("/locations/{id}/default", post(locations::make_default))
        .route("/locations/position", post(locations::position))
        .route("/dashboard/upgrade-role", post(dashboard::upgrade_role))
        .layer(mutation_rate_limiter());

    Router::new()
        .route("/", get(dashboard::show))
        .route("/locations", get(locations::index).post(locations::create))
        .route(
            "/driver-application",
            get(driver::show).post(driver::submit),
        )
        .merge(profile)
        .merge(mutations)
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(account_routes())
        .merge(catalogue_routes())
        .nest("/cart", cart_routes())
        .merge(order_routes())
        .merge(auth_routes())
}
