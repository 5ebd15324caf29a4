//! Governorate → city dependent dropdown.
//!
//! Picking a governorate clears the city and starts a city lookup. Lookups
//! are numbered; only the answer to the latest one is applied, so a slow
//! response for a governorate the customer already moved away from cannot
//! overwrite the newer list. When the answer arrives:
//!
//! - a selected city that is not in the list is cleared;
//! - with no city selected, the customer's default city is picked if it
//!   belongs to the list;
//! - any change to the city means the listing must be fetched again.
//!
//! The browser runs the same rules (see `static/js/app.js`) with the
//! generation echoed back in the `X-Lookup-Generation` header; the server
//! uses this type when rendering the city select and on the initial page
//! load.

use souq_core::{CityId, GovernorateId};

use crate::backend::City;

/// Header carrying the lookup generation to and from the browser.
pub const GENERATION_HEADER: &str = "x-lookup-generation";

/// Event the listing form listens to for a follow-up request.
pub const FILTERS_CHANGED_EVENT: &str = "filters-changed";

/// A city lookup that was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CityLookup {
    pub governorate_id: GovernorateId,
    pub generation: u64,
}

/// Outcome of applying a lookup result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CityUpdate {
    /// The result belongs to an older lookup and was ignored.
    Stale,
    /// The result was applied.
    Applied {
        city_id: Option<CityId>,
        /// The city changed, so the listing needs a follow-up request.
        refetch: bool,
    },
}

/// State of the governorate and city selects.
#[derive(Debug, Clone, Default)]
pub struct CityFilter {
    governorate_id: Option<GovernorateId>,
    city_id: Option<CityId>,
    generation: u64,
    cities: Vec<City>,
}

impl CityFilter {
    /// Start from the current filter values.
    #[must_use]
    pub const fn new(governorate_id: Option<GovernorateId>, city_id: Option<CityId>) -> Self {
        Self {
            governorate_id,
            city_id,
            generation: 0,
            cities: Vec::new(),
        }
    }

    /// Resume at a generation the browser reported.
    #[must_use]
    pub const fn at_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    /// The customer picked a governorate (or cleared it).
    ///
    /// The city is cleared in the same step. Returns the lookup to issue,
    /// or `None` when the governorate was cleared and there is nothing to
    /// look up.
    pub fn select_governorate(&mut self, governorate_id: Option<GovernorateId>) -> Option<CityLookup> {
        self.governorate_id = governorate_id;
        self.city_id = None;
        self.cities.clear();
        self.generation = self.generation.wrapping_add(1);
        self.current_lookup()
    }

    /// Lookup for the current governorate without clearing the city.
    ///
    /// Used on first render, when the city in the URL should survive if it
    /// belongs to the governorate.
    #[must_use]
    pub fn current_lookup(&self) -> Option<CityLookup> {
        self.governorate_id.map(|governorate_id| CityLookup {
            governorate_id,
            generation: self.generation,
        })
    }

    /// Apply the cities returned for a lookup.
    pub fn apply_cities(
        &mut self,
        generation: u64,
        cities: Vec<City>,
        default_city: Option<CityId>,
    ) -> CityUpdate {
        if generation != self.generation {
            return CityUpdate::Stale;
        }

        let contains = |id: CityId| cities.iter().any(|c| c.id == id);
        let before = self.city_id;

        if let Some(city_id) = self.city_id
            && !contains(city_id)
        {
            self.city_id = None;
        }
        if self.city_id.is_none()
            && let Some(default_city) = default_city
            && contains(default_city)
        {
            self.city_id = Some(default_city);
        }

        self.cities = cities;
        CityUpdate::Applied {
            city_id: self.city_id,
            refetch: self.city_id != before,
        }
    }

    #[must_use]
    pub const fn governorate_id(&self) -> Option<GovernorateId> {
        self.governorate_id
    }

    #[must_use]
    pub const fn city_id(&self) -> Option<CityId> {
        self.city_id
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Cities of the current governorate, once loaded.
    #[must_use]
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    /// Whether a city option is selected.
    #[must_use]
    pub fn city_selected(&self, id: &CityId) -> bool {
        self.city_id == Some(*id)
    }
}
