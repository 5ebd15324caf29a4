//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use souq_core::ProductId;

use crate::backend::Product;
use crate::context::{DisplayFormat, PageContext, Visitor};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::htmx::HxRequest;
use crate::listing::{ListingFilters, ListingKind};
use crate::middleware::CspNonce;
use crate::routes::listing_page::{
    CitySelectView, FilterFormView, ResultsMeta, location_options,
};
use crate::state::AppState;

const PATH: &str = "/products";

/// Product card data for templates.
#[derive(Debug, Clone)]
pub struct ProductCardView {
    pub id: ProductId,
    pub href: String,
    pub name: String,
    pub price: String,
    pub unit: Option<String>,
    pub image: Option<String>,
    pub is_featured: bool,
    pub store_name: Option<String>,
    pub store_href: Option<String>,
    pub category_name: Option<String>,
    pub is_favorite: bool,
    /// Guests see the product but cannot favorite or buy it.
    pub can_shop: bool,
}

impl ProductCardView {
    #[must_use]
    pub fn new(product: &Product, format: &DisplayFormat, can_shop: bool) -> Self {
        Self {
            id: product.id,
            href: format!("{PATH}/{}", product.id),
            name: product.name.clone(),
            price: format.price(&product.price),
            unit: product.unit.clone(),
            image: format.image(product.image.as_deref()),
            is_featured: product.is_featured,
            store_name: product.store.as_ref().map(|s| s.name.clone()),
            store_href: product.store.as_ref().map(|s| format!("/stores/{}", s.id)),
            category_name: product.category.as_ref().map(|c| c.name.clone()),
            is_favorite: product.is_favorite,
            can_shop,
        }
    }

    /// Cards for a page of products.
    #[must_use]
    pub fn list(products: &[Product], page: &PageContext) -> Vec<Self> {
        products
            .iter()
            .map(|p| Self::new(p, &page.format, page.is_authenticated()))
            .collect()
    }
}

/// Product detail data for templates.
#[derive(Debug, Clone)]
pub struct ProductDetailView {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub unit: Option<String>,
    pub image: Option<String>,
    pub store_name: Option<String>,
    pub store_href: Option<String>,
    pub category_name: Option<String>,
    pub category_href: Option<String>,
    pub is_favorite: bool,
    pub can_shop: bool,
}

impl ProductDetailView {
    fn new(product: &Product, page: &PageContext) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: page.format.price(&product.price),
            unit: product.unit.clone(),
            image: page.format.image(product.image.as_deref()),
            store_name: product.store.as_ref().map(|s| s.name.clone()),
            store_href: product.store.as_ref().map(|s| format!("/stores/{}", s.id)),
            category_name: product.category.as_ref().map(|c| c.name.clone()),
            category_href: product
                .category
                .as_ref()
                .map(|c| format!("/categories/{}", c.id)),
            is_favorite: product.is_favorite,
            can_shop: page.is_authenticated(),
        }
    }
}

/// A product result list with its sort buttons and pagination.
#[derive(Debug, Clone, Default)]
pub struct ProductResults {
    pub products: Vec<ProductCardView>,
    pub meta: ResultsMeta,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub page: PageContext,
    pub nonce: String,
    pub form: FilterFormView,
    pub city_select: CitySelectView,
    pub results: ProductResults,
}

/// Product results fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_results.html")]
pub struct ProductResultsTemplate {
    pub results: ProductResults,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub page: PageContext,
    pub nonce: String,
    pub product: ProductDetailView,
    pub related: Vec<ProductCardView>,
}

/// Favorite toggle fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/favorite_toggle.html")]
pub struct FavoriteToggleTemplate {
    pub product: FavoriteView,
}

/// Just enough of a product to render its favorite toggle.
#[derive(Debug, Clone)]
pub struct FavoriteView {
    pub id: ProductId,
    pub is_favorite: bool,
    pub can_shop: bool,
}

/// Display product listing page.
///
/// HTMX requests from the filter form get the results fragment only.
#[instrument(skip(state, page, nonce))]
pub async fn index(
    State(state): State<AppState>,
    page: PageContext,
    CspNonce(nonce): CspNonce,
    HxRequest(is_htmx): HxRequest,
    Query(filters): Query<ListingFilters>,
) -> Result<Response> {
    let kind = ListingKind::Products;
    let filters = filters.sanitized(kind);
    let caller = page.caller();
    let market = state.market();

    let listing = market.products(&caller, &filters.to_query_pairs()).await?;
    let results = ProductResults {
        products: ProductCardView::list(&listing.data, &page),
        meta: ResultsMeta::new(kind, &filters, &listing, PATH),
    };

    if is_htmx {
        return Ok(ProductResultsTemplate { results }.into_response());
    }

    let locations = location_options(market, &caller, &filters, page.default_city(), PATH).await;
    if let Some(target) = locations.redirect {
        return Ok(Redirect::to(&target).into_response());
    }

    let categories = market.categories(&caller).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Category lookup failed");
        Vec::new()
    });

    let form = FilterFormView::new(kind, &filters, PATH)
        .with_categories(&categories, &filters)
        .with_governorates(&locations.governorates, &filters);

    Ok(ProductsIndexTemplate {
        page,
        nonce,
        form,
        city_select: locations.city_select,
        results,
    }
    .into_response())
}

/// Display product detail page.
#[instrument(skip(state, page, nonce))]
pub async fn show(
    State(state): State<AppState>,
    page: PageContext,
    CspNonce(nonce): CspNonce,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let detail = state.market().product(&page.caller(), id).await?;

    Ok(ProductShowTemplate {
        product: ProductDetailView::new(&detail.data, &page),
        related: ProductCardView::list(&detail.related, &page),
        page,
        nonce,
    })
}

/// Toggle a product's favorite flag (HTMX).
///
/// Returns the re-rendered toggle with the state the backend reports.
#[instrument(skip(state, visitor))]
pub async fn toggle_favorite(
    State(state): State<AppState>,
    visitor: Visitor,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    if !visitor.is_authenticated() {
        return Err(AppError::Unauthorized);
    }

    let favorite = state.market().toggle_favorite(&visitor.caller(), id).await?;
    add_breadcrumb(
        "favorites",
        if favorite.favorited { "Favorited product" } else { "Unfavorited product" },
        Some(&[("product_id", &id.to_string())]),
    );

    Ok(FavoriteToggleTemplate {
        product: FavoriteView {
            id,
            is_favorite: favorite.favorited,
            can_shop: true,
        },
    })
}
