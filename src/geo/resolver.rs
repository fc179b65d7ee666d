//! Geo resolver: runs the fallback cascade.
//!
//! Flow: full address → street only → ZIP table → city (table, then
//! geocoder) → city re-extracted from the address → failed.

use super::address::{clean_address, extract_city, extract_zip, strip_state_suffix};
use super::cache::GeocodeCache;
use super::providers::{Candidate, Geocoder, SearchQuery};
use super::tables::{city_lookup, zip_lookup};
use super::types::{GeoPoint, GeocodeMethod, Region, Resolution};
use tracing::debug;

const ADDRESS_RESULT_LIMIT: usize = 3;

/// The address resolver with its fallback cascade.
pub struct GeoResolver<G> {
    geocoder: G,
    region: Region,
    cache: Option<GeocodeCache>,
    offline: bool,
}

impl<G: Geocoder> GeoResolver<G> {
    pub fn new(geocoder: G, region: Region) -> Self {
        Self {
            geocoder,
            region,
            cache: None,
            offline: false,
        }
    }

    /// Attach an on-disk cache consulted before every geocoder call.
    pub fn with_cache(mut self, cache: GeocodeCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Offline mode: skip geocoder calls, keep tables and cache.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Run an address (plus optional city) through the cascade.
    pub fn resolve(&mut self, address: &str, city: &str) -> Resolution {
        // 1. Full address
        if let Some(p) = self.geocode_address(address, city) {
            return Resolution::found(p, GeocodeMethod::FullAddress);
        }

        // 2. Street only (state marker and everything after it removed)
        let street = strip_state_suffix(address);
        if street != address && !street.trim().is_empty() {
            if let Some(p) = self.geocode_address(&street, city) {
                return Resolution::found(p, GeocodeMethod::StreetOnly);
            }
        }

        // 3. ZIP table
        if let Some(p) = extract_zip(address).and_then(zip_lookup) {
            return Resolution::found(p, GeocodeMethod::ZipCode);
        }

        // 4. Caller-supplied city
        if let Some(p) = self.city_fallback(city) {
            return Resolution::found(p, GeocodeMethod::CityFallback);
        }

        // 5. City re-derived from the address text
        let extracted = extract_city(address);
        if !extracted.is_empty() && extracted != city {
            if let Some(p) = self.city_fallback(&extracted) {
                return Resolution::found(p, GeocodeMethod::ExtractedCity);
            }
        }

        debug!(address, city, "all geocoding strategies exhausted");
        Resolution::failed()
    }

    fn geocode_address(&mut self, address: &str, city: &str) -> Option<GeoPoint> {
        let cleaned = clean_address(address);
        if cleaned.is_empty() {
            return None;
        }
        let text = [cleaned.as_str(), city.trim(), self.region.state_code.as_str(), "USA"]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(", ");
        let query = SearchQuery::Address {
            text,
            country_code: self.region.country_code.clone(),
            limit: ADDRESS_RESULT_LIMIT,
        };
        self.lookup(&query)
    }

    fn city_fallback(&mut self, city: &str) -> Option<GeoPoint> {
        let city = city.trim();
        if city.is_empty() {
            return None;
        }
        if let Some(p) = city_lookup(city) {
            return Some(p);
        }
        let query = SearchQuery::City {
            city: city.to_string(),
            state: self.region.state_code.clone(),
            country: "USA".into(),
        };
        self.lookup(&query)
    }

    /// Cache first, then the geocoder. Errors count as "no result".
    fn lookup(&mut self, query: &SearchQuery) -> Option<GeoPoint> {
        if let Some(p) = self.cache.as_ref().and_then(|c| c.get(query)) {
            return Some(p);
        }
        if self.offline {
            return None;
        }

        let candidates = match self.geocoder.search(query) {
            Ok(c) => c,
            Err(e) => {
                debug!(error = %e, "geocoder returned no usable result");
                return None;
            }
        };

        let chosen = match query {
            SearchQuery::Address { .. } => select_candidate(&self.region, &candidates),
            SearchQuery::City { .. } => candidates.first(),
        }?;

        let point = chosen.point;
        if let Some(cache) = self.cache.as_mut() {
            cache.put(query, point, Some(&chosen.display_name));
        }
        Some(point)
    }
}

/// Prefer a candidate that names the region's state; otherwise take the
/// first candidate only if it lies inside the region's bounding box.
pub fn select_candidate<'a>(region: &Region, candidates: &'a [Candidate]) -> Option<&'a Candidate> {
    let state_name = region.state_name.to_lowercase();
    let code_marker = format!(", {},", region.state_code.to_lowercase());

    candidates
        .iter()
        .find(|c| {
            let display = c.display_name.to_lowercase();
            c.state.as_deref().is_some_and(|s| region.matches_state(s))
                || display.contains(&state_name)
                || display.contains(&code_marker)
        })
        .or_else(|| candidates.first().filter(|c| region.bounds.contains(c.point)))
}
