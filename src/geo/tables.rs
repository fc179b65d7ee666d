//! Built-in coordinate tables for Middle Tennessee.
//!
//! Used by the offline strategies of the resolver cascade and as the
//! default reference set for proximity checks.

use super::types::GeoPoint;

/// A named point that listings are measured against.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLocation {
    pub name: String,
    pub point: GeoPoint,
}

impl ReferenceLocation {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            point: GeoPoint::new(lat, lon),
        }
    }
}

const REFERENCE_LOCATIONS: &[(&str, f64, f64)] = &[
    ("Nashville", 36.1627, -86.7816),
    ("Mt Juliet", 36.2009, -86.5186),
];

/// The default reference set: downtown Nashville and Mt. Juliet.
pub fn default_references() -> Vec<ReferenceLocation> {
    REFERENCE_LOCATIONS
        .iter()
        .map(|&(name, lat, lon)| ReferenceLocation::new(name, lat, lon))
        .collect()
}

// ─── City table ─────────────────────────────────────────────────

const CITY_COORDINATES: &[(&str, f64, f64)] = &[
    ("nashville", 36.1627, -86.7816),
    ("mt juliet", 36.2009, -86.5186),
    ("mount juliet", 36.2009, -86.5186),
    ("antioch", 36.0632, -86.6652),
    ("hermitage", 36.1534, -86.5986),
    ("murfreesboro", 35.8456, -86.3903),
    ("franklin", 35.9251, -86.8689),
    ("brentwood", 36.0331, -86.7828),
    ("gallatin", 36.3889, -86.4467),
    ("hendersonville", 36.3048, -86.6200),
    ("smyrna", 35.9828, -86.5186),
    ("lebanon", 36.2081, -86.2911),
    ("la vergne", 36.0156, -86.5819),
    ("goodlettsville", 36.3231, -86.7133),
    ("madison", 36.2587, -86.7483),
    ("old hickory", 36.2267, -86.6289),
    ("bellevue", 36.0706, -87.0069),
    ("donelson", 36.1700, -86.6900),
    ("joelton", 36.3217, -86.8947),
    ("whites creek", 36.2945, -86.7878),
    ("forest hills", 36.0689, -86.8244),
    ("berry hill", 36.1292, -86.7644),
    ("oak hill", 36.1023, -86.8425),
    ("spring hill", 35.7512, -86.9300),
    ("nolensville", 35.9523, -86.8694),
    ("thompson station", 35.8245, -86.9080),
    ("columbia", 35.6151, -87.0353),
    ("dickson", 36.0770, -87.3878),
    ("clarksville", 36.5298, -87.3595),
    ("cookeville", 36.1628, -85.5016),
    ("crossville", 35.9487, -85.0269),
    ("sparta", 36.0742, -85.4669),
    ("shelbyville", 35.4834, -86.4603),
    ("manchester", 35.4817, -86.0886),
    ("tullahoma", 35.3620, -86.2094),
    ("mcminnville", 35.6834, -85.7697),
    ("livingston", 36.3831, -85.3230),
    ("carthage", 36.2509, -85.9519),
    ("lafayette", 36.5209, -86.0264),
    ("woodbury", 35.8270, -86.0711),
];

/// Exact, case-insensitive city lookup. Surrounding whitespace is ignored.
pub fn city_lookup(city: &str) -> Option<GeoPoint> {
    let key = city.trim().to_lowercase();
    if key.is_empty() {
        return None;
    }
    CITY_COORDINATES
        .iter()
        .find(|(name, _, _)| *name == key)
        .map(|&(_, lat, lon)| GeoPoint::new(lat, lon))
}

// ─── ZIP table ──────────────────────────────────────────────────

const ZIP_COORDINATES: &[(&str, f64, f64)] = &[
    ("37013", 36.0632, -86.6652), // Antioch
    ("37027", 36.2009, -86.5186), // Mt. Juliet
    ("37115", 36.1534, -86.5986), // Hermitage
    ("37129", 35.9828, -86.5186), // Smyrna
    ("37130", 35.8456, -86.3903), // Murfreesboro
    ("37201", 36.1627, -86.7816), // Downtown
    ("37203", 36.1627, -86.7816),
    ("37204", 36.1300, -86.7900),
    ("37205", 36.0900, -86.8200), // Belle Meade
    ("37206", 36.1800, -86.7200),
    ("37207", 36.1900, -86.7600),
    ("37208", 36.1700, -86.8000),
    ("37209", 36.1500, -86.8100), // Sylvan Park
    ("37210", 36.1200, -86.7700),
    ("37211", 36.1000, -86.7400), // Oak Hill
    ("37212", 36.1400, -86.8000),
    ("37213", 36.1100, -86.6800),
    ("37214", 36.2000, -86.6900), // Donelson
    ("37215", 36.1200, -86.8000), // Green Hills
    ("37216", 36.2200, -86.6700),
    ("37217", 36.0900, -86.7000),
    ("37218", 36.2000, -86.7500),
    ("37219", 36.1600, -86.7800),
    ("37220", 36.1100, -86.6500),
    ("37221", 36.0700, -87.0100), // Bellevue
    ("37228", 36.1800, -86.7400),
    ("37076", 36.3048, -86.6200), // Hendersonville
    ("37122", 35.9251, -86.8689), // Franklin
    ("37135", 36.2081, -86.2911), // Lebanon
];

pub fn zip_lookup(zip: &str) -> Option<GeoPoint> {
    ZIP_COORDINATES
        .iter()
        .find(|(code, _, _)| *code == zip)
        .map(|&(_, lat, lon)| GeoPoint::new(lat, lon))
}
