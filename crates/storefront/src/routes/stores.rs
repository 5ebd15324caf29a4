//! Store route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::{instrument, warn};

use souq_core::StoreId;

use crate::backend::Store;
use crate::context::{DisplayFormat, PageContext};
use crate::error::Result;
use crate::filters;
use crate::htmx::HxRequest;
use crate::listing::{ListingFilters, ListingKind};
use crate::middleware::CspNonce;
use crate::routes::listing_page::{
    CitySelectView, FilterFormView, ResultsMeta, location_options,
};
use crate::routes::products::{ProductCardView, ProductResults, ProductResultsTemplate};
use crate::state::AppState;

const PATH: &str = "/stores";

/// Store card data for templates.
#[derive(Debug, Clone)]
pub struct StoreCardView {
    pub href: String,
    pub name: String,
    pub store_type: Option<String>,
    pub address: Option<String>,
    /// "City, Governorate" when known.
    pub location: Option<String>,
    pub phone: Option<String>,
    /// "08:00 – 22:00" when both ends are known.
    pub hours: Option<String>,
    pub image: Option<String>,
    pub initial: String,
    pub products_count: u32,
    pub orders_count: u32,
}

impl StoreCardView {
    #[must_use]
    pub fn new(store: &Store, format: &DisplayFormat) -> Self {
        let location = match (&store.city, &store.governorate) {
            (Some(city), Some(governorate)) => Some(format!("{}, {}", city.name, governorate.name)),
            (Some(city), None) => Some(city.name.clone()),
            (None, Some(governorate)) => Some(governorate.name.clone()),
            (None, None) => None,
        };
        let hours = match (&store.opening_time, &store.closing_time) {
            (Some(open), Some(close)) => Some(format!("{} – {}", short_time(open), short_time(close))),
            _ => None,
        };

        Self {
            href: format!("{PATH}/{}", store.id),
            name: store.name.clone(),
            store_type: store.store_type.clone(),
            address: store.address.clone(),
            location,
            phone: store.phone.clone(),
            hours,
            image: format.image(store.image.as_deref()),
            initial: store
                .name
                .chars()
                .next()
                .map(|c| c.to_uppercase().collect())
                .unwrap_or_default(),
            products_count: store.products_count,
            orders_count: store.orders_count,
        }
    }
}

/// `08:00:00` → `08:00`.
fn short_time(time: &str) -> &str {
    let time = time.trim();
    match time.match_indices(':').nth(1) {
        Some((index, _)) => time.get(..index).unwrap_or(time),
        None => time,
    }
}

/// A store result list.
#[derive(Debug, Clone, Default)]
pub struct StoreResults {
    pub stores: Vec<StoreCardView>,
    pub meta: ResultsMeta,
}

/// Store listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "stores/index.html")]
pub struct StoresIndexTemplate {
    pub page: PageContext,
    pub nonce: String,
    pub form: FilterFormView,
    pub city_select: CitySelectView,
    pub results: StoreResults,
}

/// Store results fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/store_results.html")]
pub struct StoreResultsTemplate {
    pub results: StoreResults,
}

/// Store page template: store header plus its filtered products.
#[derive(Template, WebTemplate)]
#[template(path = "stores/show.html")]
pub struct StoreShowTemplate {
    pub page: PageContext,
    pub nonce: String,
    pub store: StoreCardView,
    pub form: FilterFormView,
    /// Always empty: a store's products are not filtered by location.
    pub city_select: CitySelectView,
    pub results: ProductResults,
}

/// Display store listing page.
#[instrument(skip(state, page, nonce))]
pub async fn index(
    State(state): State<AppState>,
    page: PageContext,
    CspNonce(nonce): CspNonce,
    HxRequest(is_htmx): HxRequest,
    Query(filters): Query<ListingFilters>,
) -> Result<Response> {
    let kind = ListingKind::Stores;
    let filters = filters.sanitized(kind);
    let caller = page.caller();
    let market = state.market();

    let listing = market.stores(&caller, &filters.to_query_pairs()).await?;
    let results = StoreResults {
        stores: listing
            .data
            .iter()
            .map(|store| StoreCardView::new(store, &page.format))
            .collect(),
        meta: ResultsMeta::new(kind, &filters, &listing, PATH),
    };

    if is_htmx {
        return Ok(StoreResultsTemplate { results }.into_response());
    }

    let locations = location_options(market, &caller, &filters, page.default_city(), PATH).await;
    if let Some(target) = locations.redirect {
        return Ok(Redirect::to(&target).into_response());
    }

    let store_types = market.store_types(&caller).await.unwrap_or_else(|e| {
        warn!(error = %e, "Store type lookup failed");
        Vec::new()
    });

    let form = FilterFormView::new(kind, &filters, PATH)
        .with_store_types(&store_types, &filters)
        .with_governorates(&locations.governorates, &filters);

    Ok(StoresIndexTemplate {
        page,
        nonce,
        form,
        city_select: locations.city_select,
        results,
    }
    .into_response())
}

/// Display a store with its products.
#[instrument(skip(state, page, nonce))]
pub async fn show(
    State(state): State<AppState>,
    page: PageContext,
    CspNonce(nonce): CspNonce,
    HxRequest(is_htmx): HxRequest,
    Path(id): Path<StoreId>,
    Query(filters): Query<ListingFilters>,
) -> Result<Response> {
    let kind = ListingKind::StoreProducts;
    let filters = filters.sanitized(kind);
    let path = format!("{PATH}/{id}");
    let caller = page.caller();

    let detail = state
        .market()
        .store(&caller, id, &filters.to_query_pairs())
        .await?;
    let results = ProductResults {
        products: ProductCardView::list(&detail.products.data, &page),
        meta: ResultsMeta::new(kind, &filters, &detail.products, &path),
    };

    if is_htmx {
        return Ok(ProductResultsTemplate { results }.into_response());
    }

    let categories = state.market().categories(&caller).await.unwrap_or_else(|e| {
        warn!(error = %e, "Category lookup failed");
        Vec::new()
    });
    let form = FilterFormView::new(kind, &filters, &path).with_categories(&categories, &filters);

    Ok(StoreShowTemplate {
        store: StoreCardView::new(&detail.data, &page.format),
        page,
        nonce,
        form,
        city_select: CitySelectView::default(),
        results,
    }
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Reference;
    use souq_core::{CityId, GovernorateId};

    fn store() -> Store {
        Store {
            id: StoreId::new(4),
            name: "fresh market".to_string(),
            store_type: Some("Grocery".to_string()),
            address: None,
            governorate: Some(Reference {
                id: GovernorateId::new(1),
                name: "Cairo".to_string(),
            }),
            city: Some(Reference {
                id: CityId::new(2),
                name: "Maadi".to_string(),
            }),
            phone: None,
            opening_time: Some("08:00:00".to_string()),
            closing_time: Some("22:30".to_string()),
            image: Some("stores/4.jpg".to_string()),
            products_count: 12,
            orders_count: 3,
        }
    }

    #[test]
    fn test_store_card() {
        let card = StoreCardView::new(&store(), &DisplayFormat::default());
        assert_eq!(card.href, "/stores/4");
        assert_eq!(card.location.as_deref(), Some("Maadi, Cairo"));
        assert_eq!(card.hours.as_deref(), Some("08:00 – 22:30"));
        assert_eq!(card.initial, "F");
        assert_eq!(card.image.as_deref(), Some("stores/4.jpg"));
    }

    #[test]
    fn test_short_time() {
        assert_eq!(short_time("08:00:00"), "08:00");
        assert_eq!(short_time("8:30"), "8:30");
        assert_eq!(short_time("late"), "late");
    }
}
