//! Record shapes shared by every stage of the pipeline.

use crate::geo::GeocodeMethod;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One auction listing after source normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub source: String,
    pub date: String,
    pub time: String,
    /// First letter of the county, uppercased.
    pub priority_letter: String,
    pub firm: String,
    pub address: String,
    pub city: String,
}

impl CanonicalRecord {
    /// True when every field is empty.
    pub fn is_blank(&self) -> bool {
        [
            &self.source,
            &self.date,
            &self.time,
            &self.priority_letter,
            &self.firm,
            &self.address,
            &self.city,
        ]
        .iter()
        .all(|f| f.is_empty())
    }
}

/// Tri-state result of the drive-time check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WithinThreshold {
    Yes,
    No,
    Unknown,
}

impl fmt::Display for WithinThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => write!(f, "Yes"),
            Self::No => write!(f, "No"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A canonical record plus its geocoding and proximity results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub record: CanonicalRecord,
    pub within_threshold: WithinThreshold,
    pub closest_reference: Option<String>,
    pub distance_miles: Option<f64>,
    pub estimated_drive_minutes: Option<f64>,
    pub geocode_method: GeocodeMethod,
}

impl EnrichedRecord {
    /// A record that could not be placed on the map.
    pub fn unresolved(record: CanonicalRecord) -> Self {
        Self {
            record,
            within_threshold: WithinThreshold::Unknown,
            closest_reference: None,
            distance_miles: None,
            estimated_drive_minutes: None,
            geocode_method: GeocodeMethod::Failed,
        }
    }

    pub fn closest_reference_label(&self) -> &str {
        self.closest_reference.as_deref().unwrap_or("Unknown")
    }
}
