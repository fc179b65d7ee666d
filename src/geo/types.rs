//! Core types for the geocoding subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which step of the resolver cascade produced the coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeocodeMethod {
    FullAddress,
    StreetOnly,
    ZipCode,
    CityFallback,
    ExtractedCity,
    Failed,
}

impl GeocodeMethod {
    pub const ALL: [GeocodeMethod; 6] = [
        Self::FullAddress,
        Self::StreetOnly,
        Self::ZipCode,
        Self::CityFallback,
        Self::ExtractedCity,
        Self::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullAddress => "full_address",
            Self::StreetOnly => "street_only",
            Self::ZipCode => "zip_code",
            Self::CityFallback => "city_fallback",
            Self::ExtractedCity => "extracted_city",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for GeocodeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Outcome of running an address through the resolver cascade.
///
/// `point` is `None` exactly when `method` is [`GeocodeMethod::Failed`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub point: Option<GeoPoint>,
    pub method: GeocodeMethod,
}

impl Resolution {
    pub fn found(point: GeoPoint, method: GeocodeMethod) -> Self {
        Self { point: Some(point), method }
    }

    pub fn failed() -> Self {
        Self { point: None, method: GeocodeMethod::Failed }
    }

    pub fn is_resolved(&self) -> bool {
        self.point.is_some()
    }
}

/// Latitude/longitude rectangle used to sanity-check geocoder hits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn contains(&self, p: GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&p.lat)
            && (self.min_lon..=self.max_lon).contains(&p.lon)
    }
}

/// The state every listing is expected to fall in.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Two-letter postal code, e.g. "TN".
    pub state_code: String,
    /// Full state name, e.g. "Tennessee".
    pub state_name: String,
    /// ISO 3166-1 alpha-2 country code passed to the geocoder.
    pub country_code: String,
    pub bounds: BoundingBox,
}

impl Region {
    pub fn tennessee() -> Self {
        Self {
            state_code: "TN".into(),
            state_name: "Tennessee".into(),
            country_code: "us".into(),
            bounds: BoundingBox {
                min_lat: 35.0,
                max_lat: 36.7,
                min_lon: -90.0,
                max_lon: -81.0,
            },
        }
    }

    /// Whether a free-form state string names this region.
    pub fn matches_state(&self, state: &str) -> bool {
        let s = state.trim();
        s.eq_ignore_ascii_case(&self.state_name) || s.eq_ignore_ascii_case(&self.state_code)
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::tennessee()
    }
}

/// Geocoding errors. None of them are fatal to a batch.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid geocoder response: {0}")]
    InvalidResponse(String),
    #[error("No geocoder result for '{0}'")]
    NotFound(String),
}
