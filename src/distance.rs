//! Great-circle distance, drive-time estimates and proximity checks.

use crate::geo::{GeoPoint, ReferenceLocation};
use crate::records::WithinThreshold;

/// Earth's radius in miles.
const EARTH_RADIUS_MILES: f64 = 3956.0;

/// Average speed bands as (max distance in miles, mph). Bounds are inclusive.
const SPEED_BANDS: &[(f64, f64)] = &[(5.0, 25.0), (15.0, 35.0), (30.0, 45.0)];
const HIGHWAY_MPH: f64 = 55.0;

/// Haversine distance between two points in miles.
#[inline]
pub fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_MILES * c
}

/// Estimated drive time in minutes for a straight-line distance.
///
/// Short trips are assumed to be city driving, long ones highway.
pub fn estimate_drive_minutes(miles: f64) -> f64 {
    let mph = SPEED_BANDS
        .iter()
        .find(|(max, _)| miles <= *max)
        .map(|&(_, mph)| mph)
        .unwrap_or(HIGHWAY_MPH);
    miles / mph * 60.0
}

/// Result of measuring a point against the reference set.
#[derive(Debug, Clone, PartialEq)]
pub struct Proximity {
    pub within: WithinThreshold,
    pub closest: Option<String>,
    /// Rounded to 0.1 mile.
    pub distance_miles: Option<f64>,
    /// Rounded to whole minutes.
    pub drive_minutes: Option<f64>,
}

impl Proximity {
    pub fn unknown() -> Self {
        Self {
            within: WithinThreshold::Unknown,
            closest: None,
            distance_miles: None,
            drive_minutes: None,
        }
    }
}

/// Classify a point against the closest reference location.
///
/// Only the closest reference decides the flag; the threshold is inclusive
/// and compared against the unrounded drive time.
pub fn classify_proximity(
    point: Option<GeoPoint>,
    references: &[ReferenceLocation],
    threshold_minutes: f64,
) -> Proximity {
    let Some(p) = point else {
        return Proximity::unknown();
    };

    let mut closest: Option<(&ReferenceLocation, f64)> = None;
    for reference in references {
        let d = haversine_miles(p.lat, p.lon, reference.point.lat, reference.point.lon);
        if closest.map_or(true, |(_, best)| d < best) {
            closest = Some((reference, d));
        }
    }

    let Some((reference, miles)) = closest else {
        return Proximity::unknown();
    };

    let minutes = estimate_drive_minutes(miles);
    let within = if minutes <= threshold_minutes {
        WithinThreshold::Yes
    } else {
        WithinThreshold::No
    };

    Proximity {
        within,
        closest: Some(reference.name.clone()),
        distance_miles: Some(round_to(miles, 1)),
        drive_minutes: Some(round_to(minutes, 0)),
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
