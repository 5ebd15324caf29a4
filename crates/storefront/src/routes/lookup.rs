//! Dependent dropdown fragments.
//!
//! `GET /lookup/cities` answers the governorate select of a listing filter
//! form. The browser numbers its lookups and sends the number in
//! `X-Lookup-Generation`; the response echoes it so the script can drop
//! answers to lookups that were superseded. In-flight lookups are also
//! cancelled client-side (`hx-sync="this:replace"`). When the lookup picks
//! a city (the customer's default), `filters-changed` fires after the new
//! select settles so the filter form re-requests the listing with it.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use souq_core::{AreaId, GovernorateId};

use crate::context::PageContext;
use crate::error::Result;
use crate::forms::lenient;
use crate::htmx::HX_TRIGGER_AFTER_SETTLE;
use crate::location_filter::{CityFilter, CityUpdate, FILTERS_CHANGED_EVENT, GENERATION_HEADER};
use crate::routes::listing_page::{CitySelectView, OptionView, load_cities};
use crate::services::profile::areas_for_governorate;
use crate::state::AppState;

/// City lookup query: the governorate select's value.
#[derive(Debug, Deserialize)]
pub struct CitiesQuery {
    #[serde(default, deserialize_with = "lenient")]
    pub governorate_id: Option<GovernorateId>,
}

/// Area lookup query for the profile form.
#[derive(Debug, Deserialize)]
pub struct AreasQuery {
    #[serde(default, deserialize_with = "lenient")]
    pub governorate_id: Option<GovernorateId>,
    #[serde(default, deserialize_with = "lenient")]
    pub area_id: Option<AreaId>,
}

/// City select fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/city_select.html")]
pub struct CitySelectTemplate {
    pub city_select: CitySelectView,
}

/// Area select fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/area_select.html")]
pub struct AreaSelectTemplate {
    pub areas: Vec<OptionView>,
}

/// Generation number the browser sent, 0 when absent.
fn generation(headers: &HeaderMap) -> u64 {
    headers
        .get(GENERATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

/// Cities of the chosen governorate.
///
/// The governorate changed, so the city starts out cleared; the customer's
/// default city is picked when it belongs to the governorate.
#[instrument(skip(state, page, headers))]
pub async fn cities(
    State(state): State<AppState>,
    page: PageContext,
    headers: HeaderMap,
    Query(query): Query<CitiesQuery>,
) -> Result<Response> {
    let generation = generation(&headers);
    let mut filter = CityFilter::new(None, None).at_generation(generation.wrapping_sub(1));

    let update = match filter.select_governorate(query.governorate_id) {
        Some(lookup) => {
            let cities = load_cities(state.market(), &page.caller(), lookup.governorate_id).await;
            Some(filter.apply_cities(lookup.generation, cities, page.default_city()))
        }
        None => None,
    };

    Ok(city_select_response(generation, &filter, update))
}

/// The city select fragment, echoing the lookup generation.
///
/// `filters-changed` is only fired when applying the cities changed the
/// selected city; otherwise the governorate change already re-requested
/// the listing.
fn city_select_response(
    generation: u64,
    filter: &CityFilter,
    update: Option<CityUpdate>,
) -> Response {
    let mut response = CitySelectTemplate {
        city_select: CitySelectView::from_filter(filter),
    }
    .into_response();
    let headers = response.headers_mut();
    headers.insert(
        HeaderName::from_static(GENERATION_HEADER),
        HeaderValue::from(generation),
    );
    if matches!(update, Some(CityUpdate::Applied { refetch: true, .. })) {
        headers.insert(
            HX_TRIGGER_AFTER_SETTLE,
            HeaderValue::from_static(FILTERS_CHANGED_EVENT),
        );
    }
    response
}

/// Areas of the chosen governorate, for the profile form.
#[instrument(skip(state, page))]
pub async fn areas(
    State(state): State<AppState>,
    page: PageContext,
    Query(query): Query<AreasQuery>,
) -> Result<impl IntoResponse> {
    let all = state.market().areas(&page.caller()).await?;
    Ok(AreaSelectTemplate {
        areas: area_options(&all, query.governorate_id, query.area_id),
    })
}

/// Area options for a governorate with the current area selected.
#[must_use]
pub fn area_options(
    areas: &[crate::backend::Area],
    governorate_id: Option<GovernorateId>,
    selected: Option<AreaId>,
) -> Vec<OptionView> {
    areas_for_governorate(areas, governorate_id)
        .into_iter()
        .map(|area| OptionView {
            value: area.id.to_string(),
            label: area.name,
            selected: Some(area.id) == selected,
        })
        .collect()
}
