//! Pieces shared by the filtered listing pages (products, stores, a
//! category's products, a store's products).
//!
//! A listing page is a filter form plus a results region. The form re-issues
//! `GET` on the same path whenever a filter changes; HTMX requests get back
//! only the results fragment, everything else the full page.

use tracing::warn;

use souq_core::{CityId, GovernorateId};

use crate::backend::{Caller, Category, City, Governorate, MarketClient, Paginated};
use crate::listing::{ListingFilters, ListingKind, Pagination};
use crate::location_filter::{CityFilter, CityUpdate};

/// One `<option>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// The city `<select>`, also rendered alone by `GET /lookup/cities`.
#[derive(Debug, Clone, Default)]
pub struct CitySelectView {
    pub options: Vec<OptionView>,
    /// Lookup generation this list answers.
    pub generation: u64,
    /// Disabled until a governorate is chosen.
    pub enabled: bool,
}

impl CitySelectView {
    /// Render the state of a [`CityFilter`].
    #[must_use]
    pub fn from_filter(filter: &CityFilter) -> Self {
        Self {
            options: filter
                .cities()
                .iter()
                .map(|city| OptionView {
                    value: city.id.to_string(),
                    label: city.name.clone(),
                    selected: filter.city_selected(&city.id),
                })
                .collect(),
            generation: filter.generation(),
            enabled: filter.governorate_id().is_some(),
        }
    }
}

/// A sort button.
#[derive(Debug, Clone)]
pub struct SortLinkView {
    pub href: String,
    pub label: &'static str,
    pub indicator: &'static str,
    pub active: bool,
}

/// Sort buttons, hidden sort inputs and pagination around a result list.
#[derive(Debug, Clone, Default)]
pub struct ResultsMeta {
    pub sort_links: Vec<SortLinkView>,
    /// Active sort key, carried back into the filter form.
    pub sort: String,
    pub direction: String,
    pub pagination: Pagination,
    pub is_filtered: bool,
}

impl ResultsMeta {
    #[must_use]
    pub fn new<T>(
        kind: ListingKind,
        filters: &ListingFilters,
        page: &Paginated<T>,
        path: &str,
    ) -> Self {
        let sort_links = kind
            .sort_keys()
            .iter()
            .map(|key| SortLinkView {
                href: filters.sort_href(path, key.key),
                label: key.label,
                indicator: filters.sort_indicator(key.key),
                active: filters.sort.as_deref() == Some(key.key),
            })
            .collect();

        Self {
            sort_links,
            sort: filters.sort.clone().unwrap_or_default(),
            direction: filters
                .sort
                .as_ref()
                .map(|_| filters.direction.unwrap_or_default().to_string())
                .unwrap_or_default(),
            pagination: Pagination::new(page, path),
            is_filtered: filters.is_filtered(),
        }
    }
}

/// The filter form above the results.
#[derive(Debug, Clone, Default)]
pub struct FilterFormView {
    /// Path the form re-requests.
    pub action: String,
    pub search: String,
    pub categories: Vec<OptionView>,
    pub store_types: Vec<OptionView>,
    pub governorates: Vec<OptionView>,
    pub show_location: bool,
}

impl FilterFormView {
    #[must_use]
    pub fn new(kind: ListingKind, filters: &ListingFilters, action: &str) -> Self {
        Self {
            action: action.to_string(),
            search: filters.search_value().to_string(),
            show_location: kind.has_location_filters(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_categories(mut self, categories: &[Category], filters: &ListingFilters) -> Self {
        self.categories = categories
            .iter()
            .map(|category| OptionView {
                value: category.id.to_string(),
                label: category.name.clone(),
                selected: filters.category_selected(&category.id),
            })
            .collect();
        self
    }

    #[must_use]
    pub fn with_store_types(mut self, store_types: &[String], filters: &ListingFilters) -> Self {
        self.store_types = store_types
            .iter()
            .map(|store_type| OptionView {
                value: store_type.clone(),
                label: store_type.clone(),
                selected: filters.store_type_selected(store_type),
            })
            .collect();
        self
    }

    #[must_use]
    pub fn with_governorates(
        mut self,
        governorates: &[Governorate],
        filters: &ListingFilters,
    ) -> Self {
        self.governorates = governorates
            .iter()
            .map(|governorate| OptionView {
                value: governorate.id.to_string(),
                label: governorate.name.clone(),
                selected: filters.governorate_selected(&governorate.id),
            })
            .collect();
        self
    }
}

/// Governorate and city options for a full page render.
#[derive(Debug, Default)]
pub struct LocationOptions {
    pub governorates: Vec<Governorate>,
    pub city_select: CitySelectView,
    /// Set when the city in the URL must change: either it is not in the
    /// governorate, or the customer's default city should be picked. The
    /// page answers with a redirect to this URL.
    pub redirect: Option<String>,
}

/// Load the location filter options and reconcile the selected city.
///
/// Lookup failures leave the selects empty; the listing still renders.
pub async fn location_options(
    market: &MarketClient,
    caller: &Caller,
    filters: &ListingFilters,
    default_city: Option<CityId>,
    path: &str,
) -> LocationOptions {
    let governorates = market.governorates(caller).await.unwrap_or_else(|e| {
        warn!(error = %e, "Governorate lookup failed");
        Vec::new()
    });

    let mut filter = CityFilter::new(filters.governorate_id, filters.city_id);
    let mut redirect = None;

    if let Some(lookup) = filter.current_lookup() {
        let cities = load_cities(market, caller, lookup.governorate_id).await;
        if let CityUpdate::Applied {
            city_id,
            refetch: true,
        } = filter.apply_cities(lookup.generation, cities, default_city)
        {
            redirect = Some(filters.with_city(city_id).href(path));
        }
    }

    LocationOptions {
        governorates,
        city_select: CitySelectView::from_filter(&filter),
        redirect,
    }
}

/// Cities of a governorate, empty when the lookup fails.
pub async fn load_cities(
    market: &MarketClient,
    caller: &Caller,
    governorate_id: GovernorateId,
) -> Vec<City> {
    market
        .cities(caller, governorate_id)
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, %governorate_id, "City lookup failed");
            Vec::new()
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::PageLink;

    fn city(id: i64) -> City {
        City {
            id: CityId::new(id),
            name: format!("City {id}"),
            governorate_id: None,
        }
    }

    #[test]
    fn test_city_select_reflects_filter() {
        let mut filter = CityFilter::new(Some(GovernorateId::new(1)), Some(CityId::new(2)));
        let lookup = filter.current_lookup().unwrap();
        filter.apply_cities(lookup.generation, vec![city(1), city(2)], None);

        let view = CitySelectView::from_filter(&filter);
        assert!(view.enabled);
        assert_eq!(view.options.len(), 2);
        assert!(!view.options[0].selected);
        assert!(view.options[1].selected);
    }

    #[test]
    fn test_city_select_disabled_without_governorate() {
        let view = CitySelectView::from_filter(&CityFilter::new(None, None));
        assert!(!view.enabled);
        assert!(view.options.is_empty());
    }

    #[test]
    fn test_results_meta_sort_links() {
        let filters = ListingFilters {
            sort: Some("price".to_string()),
            ..ListingFilters::default()
        };
        let page: Paginated<()> = Paginated {
            data: Vec::new(),
            total: 0,
            links: vec![PageLink {
                url: None,
                label: "1".to_string(),
                active: true,
            }],
            current_page: None,
            last_page: None,
        };

        let meta = ResultsMeta::new(ListingKind::Products, &filters, &page, "/products");
        assert_eq!(meta.sort, "price");
        assert_eq!(meta.direction, "asc");
        let price = meta.sort_links.iter().find(|l| l.label == "Price").unwrap();
        assert!(price.active);
        assert_eq!(price.href, "/products?sort=price&direction=desc");
        assert!(!meta.pagination.is_visible());
    }

    #[test]
    fn test_filter_form_marks_selection() {
        let filters = ListingFilters {
            store_type: Some("Bakery".to_string()),
            ..ListingFilters::default()
        };
        let form = FilterFormView::new(ListingKind::Stores, &filters, "/stores")
            .with_store_types(&["Bakery".to_string(), "Butcher".to_string()], &filters);
        assert!(form.store_types[0].selected);
        assert!(!form.store_types[1].selected);
        assert!(form.show_location);
    }
}
