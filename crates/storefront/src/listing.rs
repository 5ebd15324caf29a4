//! Filter, sort and pagination state for listing pages.
//!
//! Products, stores, a category's products and a store's products share one
//! query-string shape. Every filter change re-requests the same path with
//! the full filter set; [`ListingFilters::to_query_pairs`] is the single
//! place that shape is produced, for both the backend call and every link
//! the page renders.

use serde::Deserialize;
use url::Url;
use url::form_urlencoded;

use souq_core::{CategoryId, CityId, GovernorateId, SortDirection, StoreId};

use crate::backend::{PageLink, Paginated};
use crate::forms::lenient;

/// A sortable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    /// Query-string value.
    pub key: &'static str,
    /// Button label.
    pub label: &'static str,
}

const NAME: SortKey = SortKey {
    key: "name",
    label: "Name",
};
const PRICE: SortKey = SortKey {
    key: "price",
    label: "Price",
};
const NEWEST: SortKey = SortKey {
    key: "created_at",
    label: "Newest",
};
const PRODUCT_COUNT: SortKey = SortKey {
    key: "products_count",
    label: "Products",
};

/// Which listing a set of filters belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    Products,
    Stores,
    CategoryProducts,
    StoreProducts,
}

impl ListingKind {
    /// Sort keys offered on this listing.
    #[must_use]
    pub const fn sort_keys(self) -> &'static [SortKey] {
        match self {
            Self::Products => &[NAME, PRICE, NEWEST],
            Self::Stores => &[NAME, PRODUCT_COUNT, NEWEST],
            Self::CategoryProducts | Self::StoreProducts => &[NAME, PRICE],
        }
    }

    /// Whether the governorate/city filters are shown.
    #[must_use]
    pub const fn has_location_filters(self) -> bool {
        matches!(self, Self::Products | Self::Stores | Self::CategoryProducts)
    }
}

/// Filter state carried in the query string.
///
/// Blank or malformed values deserialize as unset, so a hand-edited URL
/// shows an unfiltered list rather than an error page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListingFilters {
    #[serde(default, deserialize_with = "lenient")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub category: Option<CategoryId>,
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub store_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub store_id: Option<StoreId>,
    #[serde(default, deserialize_with = "lenient")]
    pub governorate_id: Option<GovernorateId>,
    #[serde(default, deserialize_with = "lenient")]
    pub city_id: Option<CityId>,
    #[serde(default, deserialize_with = "lenient")]
    pub sort: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub direction: Option<SortDirection>,
    #[serde(default, deserialize_with = "lenient")]
    pub page: Option<u32>,
}

impl ListingFilters {
    /// Drop values this listing does not understand.
    ///
    /// Unknown sort keys are removed, a direction without a sort key is
    /// removed, and page 1 is the same as no page. A category or store page
    /// is already scoped by its path, so the matching parameter is dropped.
    #[must_use]
    pub fn sanitized(mut self, kind: ListingKind) -> Self {
        if let Some(sort) = &self.sort
            && !kind.sort_keys().iter().any(|k| k.key == sort.as_str())
        {
            self.sort = None;
        }
        if self.sort.is_none() {
            self.direction = None;
        }
        if self.page.is_some_and(|p| p <= 1) {
            self.page = None;
        }
        if !kind.has_location_filters() {
            self.governorate_id = None;
            self.city_id = None;
        }
        match kind {
            ListingKind::CategoryProducts => self.category = None,
            ListingKind::StoreProducts => self.store_id = None,
            ListingKind::Products | ListingKind::Stores => {}
        }
        self
    }

    /// The set values as query parameters, in a stable order.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(category) = self.category {
            pairs.push(("category", category.to_string()));
        }
        if let Some(store_type) = &self.store_type {
            pairs.push(("type", store_type.clone()));
        }
        if let Some(store_id) = self.store_id {
            pairs.push(("store_id", store_id.to_string()));
        }
        if let Some(governorate_id) = self.governorate_id {
            pairs.push(("governorate_id", governorate_id.to_string()));
        }
        if let Some(city_id) = self.city_id {
            pairs.push(("city_id", city_id.to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.clone()));
            pairs.push(("direction", self.direction.unwrap_or_default().to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        pairs
    }

    /// Storefront URL for these filters on `path`.
    #[must_use]
    pub fn href(&self, path: &str) -> String {
        let pairs = self.to_query_pairs();
        if pairs.is_empty() {
            return path.to_string();
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        format!("{path}?{query}")
    }

    /// Filters after clicking a sort button.
    ///
    /// The active key flips direction; a new key starts ascending. Either
    /// way the result goes back to the first page.
    #[must_use]
    pub fn toggle_sort(&self, key: &str) -> Self {
        let direction = if self.sort.as_deref() == Some(key) {
            self.direction.unwrap_or_default().flipped()
        } else {
            SortDirection::Asc
        };
        Self {
            sort: Some(key.to_string()),
            direction: Some(direction),
            page: None,
            ..self.clone()
        }
    }

    /// Link for a sort button.
    #[must_use]
    pub fn sort_href(&self, path: &str, key: &str) -> String {
        self.toggle_sort(key).href(path)
    }

    /// Arrow shown next to the active sort button.
    #[must_use]
    pub fn sort_indicator(&self, key: &str) -> &'static str {
        if self.sort.as_deref() != Some(key) {
            return "";
        }
        match self.direction.unwrap_or_default() {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }

    /// Whether any filter (other than sorting and paging) is set.
    #[must_use]
    pub const fn is_filtered(&self) -> bool {
        self.search.is_some()
            || self.category.is_some()
            || self.store_type.is_some()
            || self.store_id.is_some()
            || self.governorate_id.is_some()
            || self.city_id.is_some()
    }

    /// Search input value.
    #[must_use]
    pub fn search_value(&self) -> &str {
        self.search.as_deref().unwrap_or_default()
    }

    /// Whether a category option is selected.
    #[must_use]
    pub fn category_selected(&self, id: &CategoryId) -> bool {
        self.category == Some(*id)
    }

    /// Whether a store-type option is selected.
    #[must_use]
    pub fn store_type_selected(&self, value: &str) -> bool {
        self.store_type.as_deref() == Some(value)
    }

    /// Whether a governorate option is selected.
    #[must_use]
    pub fn governorate_selected(&self, id: &GovernorateId) -> bool {
        self.governorate_id == Some(*id)
    }

    /// Same filters with a different city.
    #[must_use]
    pub fn with_city(&self, city_id: Option<CityId>) -> Self {
        Self {
            city_id,
            page: None,
            ..self.clone()
        }
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// A pagination link rebased onto the storefront path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLinkView {
    /// `None` renders a disabled link.
    pub href: Option<String>,
    pub label: String,
    pub active: bool,
}

/// Pagination controls for a listing.
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    pub links: Vec<PageLinkView>,
    pub total: u64,
}

impl Pagination {
    /// Rebase a backend page's links onto `path`.
    #[must_use]
    pub fn new<T>(page: &Paginated<T>, path: &str) -> Self {
        Self {
            links: rebase_links(&page.links, path),
            total: page.total,
        }
    }

    /// Controls are shown only when there is more than one page, i.e. more
    /// than the previous/current/next trio.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.links.len() > 3
    }
}

/// Carry each link's query string onto the storefront path.
///
/// The backend builds links against its own URL; only the query string is
/// meaningful to the storefront, and it is kept verbatim.
#[must_use]
pub fn rebase_links(links: &[PageLink], path: &str) -> Vec<PageLinkView> {
    links
        .iter()
        .map(|link| PageLinkView {
            href: link.url.as_deref().map(|url| rebase(url, path)),
            label: clean_label(&link.label),
            active: link.active,
        })
        .collect()
}

fn rebase(url: &str, path: &str) -> String {
    let query = Url::parse(url)
        .ok()
        .and_then(|u| u.query().map(str::to_owned))
        .or_else(|| url.split_once('?').map(|(_, q)| q.to_owned()));

    match query {
        Some(q) if !q.is_empty() => format!("{path}?{q}"),
        _ => path.to_string(),
    }
}

/// Backend labels are HTML-escaped and sometimes untranslated keys.
fn clean_label(label: &str) -> String {
    let label = label
        .replace("&laquo;", "«")
        .replace("&raquo;", "»")
        .replace("&amp;", "&");
    match label.trim() {
        "pagination.previous" => "« Previous".to_string(),
        "pagination.next" => "Next »".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(query: &str) -> ListingFilters {
        serde_json::from_value(serde_json::Value::Object(
            form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), serde_json::Value::String(v.into_owned())))
                .collect(),
        ))
        .unwrap()
    }

    fn link(url: Option<&str>, label: &str, active: bool) -> PageLink {
        PageLink {
            url: url.map(str::to_string),
            label: label.to_string(),
            active,
        }
    }

    #[test]
    fn test_query_pairs_are_exactly_the_set_values() {
        let filters = parse("search=rice&category=3&governorate_id=&city_id=9&page=");
        assert_eq!(
            filters.to_query_pairs(),
            vec![
                ("search", "rice".to_string()),
                ("category", "3".to_string()),
                ("city_id", "9".to_string()),
            ]
        );
    }

    #[test]
    fn test_unset_filters_produce_bare_path() {
        assert!(ListingFilters::default().to_query_pairs().is_empty());
        assert_eq!(ListingFilters::default().href("/stores"), "/stores");
    }

    #[test]
    fn test_malformed_values_are_ignored() {
        let filters = parse("category=abc&page=-2&direction=sideways&type=Bakery");
        assert_eq!(filters.category, None);
        assert_eq!(filters.page, None);
        assert_eq!(filters.direction, None);
        assert_eq!(filters.store_type.as_deref(), Some("Bakery"));
    }

    #[test]
    fn test_href_encodes_values() {
        let filters = parse("search=rice%20%26%20beans&type=Fruit%20Shop");
        assert_eq!(
            filters.href("/stores"),
            "/stores?search=rice+%26+beans&type=Fruit+Shop"
        );
    }

    #[test]
    fn test_sort_toggle_same_key_flips() {
        let filters = ListingFilters::default().toggle_sort("price");
        assert_eq!(filters.direction, Some(SortDirection::Asc));

        let filters = filters.toggle_sort("price");
        assert_eq!(filters.direction, Some(SortDirection::Desc));

        let filters = filters.toggle_sort("price");
        assert_eq!(filters.direction, Some(SortDirection::Asc));
    }

    #[test]
    fn test_sort_toggle_new_key_is_ascending_and_resets_page() {
        let filters = parse("sort=price&direction=desc&page=4");
        let toggled = filters.toggle_sort("name");
        assert_eq!(toggled.sort.as_deref(), Some("name"));
        assert_eq!(toggled.direction, Some(SortDirection::Asc));
        assert_eq!(toggled.page, None);
    }

    #[test]
    fn test_sanitize_drops_unknown_sort_keys() {
        let filters = parse("sort=price&direction=desc").sanitized(ListingKind::Stores);
        assert_eq!(filters.sort, None);
        assert_eq!(filters.direction, None);

        let filters = parse("sort=products_count&direction=desc").sanitized(ListingKind::Stores);
        assert_eq!(filters.sort.as_deref(), Some("products_count"));
    }

    #[test]
    fn test_sanitize_store_products_has_no_location_filters() {
        let filters = parse("governorate_id=1&city_id=2").sanitized(ListingKind::StoreProducts);
        assert!(filters.to_query_pairs().is_empty());
    }

    #[test]
    fn test_sanitize_scoped_listings_drop_their_own_scope() {
        let filters =
            parse("category=5&search=milk&sort=price").sanitized(ListingKind::CategoryProducts);
        assert_eq!(filters.category, None);
        assert_eq!(
            filters.sort_href("/categories/3", "price"),
            "/categories/3?search=milk&sort=price&direction=desc"
        );

        let filters = parse("store_id=9&category=2").sanitized(ListingKind::StoreProducts);
        assert_eq!(filters.store_id, None);
        assert_eq!(filters.to_query_pairs(), vec![("category", "2".to_string())]);

        let filters = parse("category=5&store_id=9").sanitized(ListingKind::Products);
        assert_eq!(filters.category, Some(CategoryId::new(5)));
        assert_eq!(filters.store_id, Some(StoreId::new(9)));
    }

    #[test]
    fn test_sort_indicator() {
        let filters = parse("sort=name&direction=desc");
        assert_eq!(filters.sort_indicator("name"), "▼");
        assert_eq!(filters.sort_indicator("price"), "");
    }

    #[test]
    fn test_rebase_links_keeps_query_verbatim() {
        let links = [
            link(None, "&laquo; Previous", false),
            link(
                Some("https://api.souq.example/api/v1/products?category=3&page=1"),
                "1",
                true,
            ),
            link(
                Some("https://api.souq.example/api/v1/products?category=3&page=2"),
                "2",
                false,
            ),
            link(
                Some("https://api.souq.example/api/v1/products?category=3&page=2"),
                "Next &raquo;",
                false,
            ),
        ];
        let views = rebase_links(&links, "/categories/3");
        assert_eq!(views[0].href, None);
        assert_eq!(views[0].label, "« Previous");
        assert_eq!(views[2].href.as_deref(), Some("/categories/3?category=3&page=2"));
        assert!(views[1].active);
        assert_eq!(views[3].label, "Next »");
    }

    #[test]
    fn test_rebase_relative_link() {
        assert_eq!(rebase("/products?page=3", "/products"), "/products?page=3");
        assert_eq!(rebase("?page=3", "/stores"), "/stores?page=3");
        assert_eq!(rebase("https://api.example/products", "/products"), "/products");
    }

    #[test]
    fn test_pagination_visible_only_above_three_links() {
        let mut page: Paginated<()> = Paginated::empty();
        page.links = vec![
            link(None, "&laquo; Previous", false),
            link(Some("http://api/x?page=1"), "1", true),
            link(None, "Next &raquo;", false),
        ];
        assert!(!Pagination::new(&page, "/orders").is_visible());

        page.links.insert(2, link(Some("http://api/x?page=2"), "2", false));
        assert!(Pagination::new(&page, "/orders").is_visible());
    }

    #[test]
    fn test_with_city_resets_page() {
        let filters = parse("governorate_id=1&page=3").with_city(Some(CityId::new(4)));
        assert_eq!(filters.city_id, Some(CityId::new(4)));
        assert_eq!(filters.page, None);
    }
}
