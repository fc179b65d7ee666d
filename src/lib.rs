//! Foreclosure Atlas: unified foreclosure-auction listings for Middle Tennessee.
//!
//! Normalizes the CSV output of five auction-listing scrapers into one record
//! shape, drops duplicate listings, geocodes every property through a cascade
//! of strategies and flags the ones within driving range of the reference
//! locations.

pub mod config;
pub mod dedup;
pub mod distance;
pub mod error;
pub mod geo;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod records;
pub mod server;
pub mod store;
