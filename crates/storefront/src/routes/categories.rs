//! Category route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use souq_core::CategoryId;

use crate::backend::Category;
use crate::context::{DisplayFormat, PageContext};
use crate::error::Result;
use crate::filters;
use crate::htmx::HxRequest;
use crate::icons;
use crate::listing::{ListingFilters, ListingKind};
use crate::middleware::CspNonce;
use crate::routes::listing_page::{
    CitySelectView, FilterFormView, ResultsMeta, location_options,
};
use crate::routes::products::{ProductCardView, ProductResults, ProductResultsTemplate};
use crate::state::AppState;

const PATH: &str = "/categories";

/// Category card data for templates.
#[derive(Debug, Clone)]
pub struct CategoryCardView {
    pub href: String,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub icon_key: &'static str,
    pub icon_glyph: &'static str,
    pub products_count: u32,
}

impl CategoryCardView {
    #[must_use]
    pub fn new(category: &Category, format: &DisplayFormat) -> Self {
        let icon = icons::for_category(category);
        Self {
            href: format!("{PATH}/{}", category.id),
            name: category.name.clone(),
            description: category.description.clone(),
            image: format.image(category.image.as_deref()),
            icon_key: icon.key,
            icon_glyph: icon.glyph,
            products_count: category.products_count,
        }
    }

    #[must_use]
    pub fn list(categories: &[Category], format: &DisplayFormat) -> Vec<Self> {
        categories.iter().map(|c| Self::new(c, format)).collect()
    }
}

/// Categories grid template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub page: PageContext,
    pub nonce: String,
    pub categories: Vec<CategoryCardView>,
}

/// Category page template: category header plus its filtered products.
#[derive(Template, WebTemplate)]
#[template(path = "categories/show.html")]
pub struct CategoryShowTemplate {
    pub page: PageContext,
    pub nonce: String,
    pub category: CategoryCardView,
    pub form: FilterFormView,
    pub city_select: CitySelectView,
    pub results: ProductResults,
}

/// Display the categories grid.
#[instrument(skip(state, page, nonce))]
pub async fn index(
    State(state): State<AppState>,
    page: PageContext,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse> {
    let categories = state.market().categories(&page.caller()).await?;

    Ok(CategoriesIndexTemplate {
        categories: CategoryCardView::list(&categories, &page.format),
        page,
        nonce,
    })
}

/// Display a category with its filtered products.
#[instrument(skip(state, page, nonce))]
pub async fn show(
    State(state): State<AppState>,
    page: PageContext,
    CspNonce(nonce): CspNonce,
    HxRequest(is_htmx): HxRequest,
    Path(id): Path<CategoryId>,
    Query(filters): Query<ListingFilters>,
) -> Result<Response> {
    let kind = ListingKind::CategoryProducts;
    let filters = filters.sanitized(kind);
    let path = format!("{PATH}/{id}");
    let caller = page.caller();
    let market = state.market();

    let detail = market
        .category(&caller, id, &filters.to_query_pairs())
        .await?;
    let results = ProductResults {
        products: ProductCardView::list(&detail.products.data, &page),
        meta: ResultsMeta::new(kind, &filters, &detail.products, &path),
    };

    if is_htmx {
        return Ok(ProductResultsTemplate { results }.into_response());
    }

    let locations = location_options(market, &caller, &filters, page.default_city(), &path).await;
    if let Some(target) = locations.redirect {
        return Ok(Redirect::to(&target).into_response());
    }

    let form = FilterFormView::new(kind, &filters, &path)
        .with_governorates(&locations.governorates, &filters);

    Ok(CategoryShowTemplate {
        category: CategoryCardView::new(&detail.data, &page.format),
        page,
        nonce,
        form,
        city_select: locations.city_select,
        results,
    }
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_card_icon() {
        let category = Category {
            id: CategoryId::new(7),
            name: "Rice & Pasta".to_string(),
            slug: None,
            description: None,
            icon: None,
            image: None,
            products_count: 40,
        };
        let card = CategoryCardView::new(&category, &DisplayFormat::default());
        assert_eq!(card.href, "/categories/7");
        assert_eq!(card.icon_key, "grains");
        assert!(card.image.is_none());
    }
}
