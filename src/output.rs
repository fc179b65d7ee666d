//! Unified CSV output.

use crate::error::PipelineError;
use crate::records::EnrichedRecord;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Column order of the unified table.
pub const OUTPUT_HEADER: [&str; 12] = [
    "SOURCE",
    "DATE",
    "TIME",
    "PL",
    "FIRM",
    "ADDRESS",
    "CTY",
    "WITHIN_30MIN",
    "CLOSEST_CITY",
    "DISTANCE_MILES",
    "EST_DRIVE_TIME",
    "GEOCODE_METHOD",
];

/// One output line, borrowing from the enriched record.
#[derive(Debug, Serialize)]
pub struct OutputRow<'a> {
    #[serde(rename = "SOURCE")]
    pub source: &'a str,
    #[serde(rename = "DATE")]
    pub date: &'a str,
    #[serde(rename = "TIME")]
    pub time: &'a str,
    #[serde(rename = "PL")]
    pub priority_letter: &'a str,
    #[serde(rename = "FIRM")]
    pub firm: &'a str,
    #[serde(rename = "ADDRESS")]
    pub address: &'a str,
    #[serde(rename = "CTY")]
    pub city: &'a str,
    #[serde(rename = "WITHIN_30MIN")]
    pub within: String,
    #[serde(rename = "CLOSEST_CITY")]
    pub closest: &'a str,
    #[serde(rename = "DISTANCE_MILES")]
    pub distance_miles: Option<f64>,
    #[serde(rename = "EST_DRIVE_TIME")]
    pub drive_minutes: Option<i64>,
    #[serde(rename = "GEOCODE_METHOD")]
    pub method: &'static str,
}

impl<'a> From<&'a EnrichedRecord> for OutputRow<'a> {
    fn from(r: &'a EnrichedRecord) -> Self {
        Self {
            source: &r.record.source,
            date: &r.record.date,
            time: &r.record.time,
            priority_letter: &r.record.priority_letter,
            firm: &r.record.firm,
            address: &r.record.address,
            city: &r.record.city,
            within: r.within_threshold.to_string(),
            closest: r.closest_reference_label(),
            distance_miles: r.distance_miles,
            drive_minutes: r.estimated_drive_minutes.map(|m| m.round() as i64),
            method: r.geocode_method.as_str(),
        }
    }
}

/// Write the unified table. The header is always written, even for zero rows.
pub fn to_writer<W: Write>(writer: W, records: &[EnrichedRecord]) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(OUTPUT_HEADER)?;
    for record in records {
        wtr.serialize(OutputRow::from(record))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the unified table to `path`, creating parent directories.
pub fn write_csv(path: &Path, records: &[EnrichedRecord]) -> Result<(), PipelineError> {
    let io_err = |source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = File::create(path).map_err(io_err)?;
    to_writer(file, records)?;
    Ok(())
}
