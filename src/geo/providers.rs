//! Geocoding providers: the `Geocoder` seam and the Nominatim client.

use super::types::{GeoError, GeoPoint};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = "ForeclosureAtlas/0.3 (auction-listing-pipeline)";

/// A geocoder query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Free-text search restricted to one country.
    Address {
        text: String,
        country_code: String,
        limit: usize,
    },
    /// Structured city-level search.
    City {
        city: String,
        state: String,
        country: String,
    },
}

impl SearchQuery {
    /// Stable key used by the on-disk cache.
    pub fn cache_key(&self) -> String {
        match self {
            Self::Address { text, country_code, .. } => {
                format!("q:{}|{}", text.to_lowercase(), country_code.to_lowercase())
            }
            Self::City { city, state, country } => format!(
                "city:{}|{}|{}",
                city.trim().to_lowercase(),
                state.to_lowercase(),
                country.to_lowercase()
            ),
        }
    }

    fn describe(&self) -> &str {
        match self {
            Self::Address { text, .. } => text,
            Self::City { city, .. } => city,
        }
    }
}

/// One geocoder hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub point: GeoPoint,
    pub display_name: String,
    /// Administrative state from the structured address, when requested.
    pub state: Option<String>,
}

/// Anything that can turn a [`SearchQuery`] into candidates.
///
/// Closures implement it too, which keeps resolver tests off the network.
pub trait Geocoder {
    fn search(&self, query: &SearchQuery) -> Result<Vec<Candidate>, GeoError>;
}

impl<F> Geocoder for F
where
    F: Fn(&SearchQuery) -> Result<Vec<Candidate>, GeoError>,
{
    fn search(&self, query: &SearchQuery) -> Result<Vec<Candidate>, GeoError> {
        self(query)
    }
}

// ─── Nominatim ──────────────────────────────────────────────────

#[derive(Deserialize, Debug, Clone)]
struct NominatimResult {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    address: Option<NominatimAddress>,
}

#[derive(Deserialize, Debug, Clone)]
struct NominatimAddress {
    #[serde(default)]
    state: Option<String>,
}

impl NominatimResult {
    fn into_candidate(self) -> Result<Candidate, GeoError> {
        let lat: f64 = self
            .lat
            .parse()
            .map_err(|_| GeoError::InvalidResponse(format!("bad latitude '{}'", self.lat)))?;
        let lon: f64 = self
            .lon
            .parse()
            .map_err(|_| GeoError::InvalidResponse(format!("bad longitude '{}'", self.lon)))?;
        Ok(Candidate {
            point: GeoPoint::new(lat, lon),
            display_name: self.display_name,
            state: self.address.and_then(|a| a.state),
        })
    }
}

/// Blocking client for an OpenStreetMap Nominatim `/search` endpoint.
pub struct NominatimClient {
    agent: ureq::Agent,
    base_url: String,
    address_timeout: Duration,
    city_timeout: Duration,
}

impl NominatimClient {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().user_agent(user_agent).build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            address_timeout: timeout,
            city_timeout: timeout.min(Duration::from_secs(10)),
        }
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }
}

impl Default for NominatimClient {
    fn default() -> Self {
        Self::new(DEFAULT_NOMINATIM_URL, DEFAULT_USER_AGENT, Duration::from_secs(15))
    }
}

impl Geocoder for NominatimClient {
    fn search(&self, query: &SearchQuery) -> Result<Vec<Candidate>, GeoError> {
        let url = self.search_url();
        let request = match query {
            SearchQuery::Address { text, country_code, limit } => self
                .agent
                .get(&url)
                .timeout(self.address_timeout)
                .query("q", text)
                .query("format", "json")
                .query("addressdetails", "1")
                .query("limit", &limit.to_string())
                .query("countrycodes", country_code),
            SearchQuery::City { city, state, country } => self
                .agent
                .get(&url)
                .timeout(self.city_timeout)
                .query("city", city)
                .query("state", state)
                .query("country", country)
                .query("format", "json")
                .query("limit", "1"),
        };

        let response = request
            .call()
            .map_err(|e| GeoError::Network(e.to_string()))?;

        let results: Vec<NominatimResult> = response
            .into_json()
            .map_err(|e| GeoError::InvalidResponse(e.to_string()))?;

        usable_candidates(results, query)
    }
}

/// Keep the hits with parseable coordinates. `NotFound` when none are left.
fn usable_candidates(
    results: Vec<NominatimResult>,
    query: &SearchQuery,
) -> Result<Vec<Candidate>, GeoError> {
    let candidates: Vec<Candidate> = results
        .into_iter()
        .filter_map(|r| match r.into_candidate() {
            Ok(c) => Some(c),
            Err(e) => {
                debug!(query = query.describe(), error = %e, "candidate skipped");
                None
            }
        })
        .collect();

    if candidates.is_empty() {
        return Err(GeoError::NotFound(query.describe().to_string()));
    }
    Ok(candidates)
}
