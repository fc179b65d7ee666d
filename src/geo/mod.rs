//! Geocoding subsystem.
//!
//! Resolves listing addresses to coordinates through a cascade of network
//! and table-driven strategies, with a local on-disk cache in front of the
//! network calls.

pub mod address;
pub mod cache;
pub mod providers;
pub mod resolver;
pub mod tables;
pub mod types;

pub use cache::GeocodeCache;
pub use providers::{Candidate, Geocoder, NominatimClient, SearchQuery};
pub use resolver::GeoResolver;
pub use tables::{default_references, ReferenceLocation};
pub use types::{BoundingBox, GeoError, GeoPoint, GeocodeMethod, Region, Resolution};
