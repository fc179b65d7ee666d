//! Row store client for a Supabase (PostgREST) table.
//!
//! Credentials come from the environment:
//! `SUPABASE_URL` (or `NEXT_PUBLIC_SUPABASE_URL`), `SUPABASE_SERVICE_ROLE_KEY`
//! and optionally `SUPABASE_TABLE`.

use crate::records::EnrichedRecord;
use serde::Serialize;
use std::env;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_TABLE: &str = "foreclosure_data";
pub const INSERT_BATCH_SIZE: usize = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("missing environment variable {0}")]
    MissingConfig(&'static str),

    #[error("store request failed with status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("store transport error: {0}")]
    Transport(String),

    #[error("invalid store response: {0}")]
    InvalidResponse(String),
}

impl From<ureq::Error> for StoreError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(status, response) => StoreError::Http {
                status,
                body: response.into_string().unwrap_or_default(),
            },
            ureq::Error::Transport(t) => StoreError::Transport(t.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub service_key: String,
    pub table: String,
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, StoreError> {
        let url = env::var("SUPABASE_URL")
            .or_else(|_| env::var("NEXT_PUBLIC_SUPABASE_URL"))
            .map_err(|_| StoreError::MissingConfig("SUPABASE_URL"))?;
        let service_key = env::var("SUPABASE_SERVICE_ROLE_KEY")
            .map_err(|_| StoreError::MissingConfig("SUPABASE_SERVICE_ROLE_KEY"))?;
        let table = env::var("SUPABASE_TABLE").unwrap_or_else(|_| DEFAULT_TABLE.to_string());
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            service_key,
            table,
        })
    }
}

/// One stored row. Field names match the table's columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreRow {
    pub source: String,
    pub date: String,
    pub time: String,
    pub pl: String,
    pub firm: String,
    pub address: String,
    pub city: String,
    pub within_30min: String,
    pub closest_city: String,
    pub distance_miles: Option<f64>,
    pub est_drive_time: Option<String>,
    pub geocode_method: String,
}

impl From<&EnrichedRecord> for StoreRow {
    fn from(r: &EnrichedRecord) -> Self {
        let rec = &r.record;
        Self {
            source: rec.source.clone(),
            date: rec.date.clone(),
            time: rec.time.clone(),
            pl: rec.priority_letter.clone(),
            firm: rec.firm.clone(),
            address: rec.address.clone(),
            city: rec.city.clone(),
            within_30min: r.within_threshold.to_string(),
            closest_city: r.closest_reference_label().to_string(),
            distance_miles: r.distance_miles,
            est_drive_time: r.estimated_drive_minutes.map(|m| format!("{}", m.round() as i64)),
            geocode_method: r.geocode_method.as_str().to_string(),
        }
    }
}

/// Blocking PostgREST client for the listings table.
pub struct SupabaseClient {
    agent: ureq::Agent,
    config: StoreConfig,
}

impl SupabaseClient {
    pub fn new(config: StoreConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self { agent, config }
    }

    pub fn from_env() -> Result<Self, StoreError> {
        Ok(Self::new(StoreConfig::from_env()?))
    }

    pub fn table(&self) -> &str {
        &self.config.table
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.config.url, self.config.table)
    }

    fn request(&self, method: &str) -> ureq::Request {
        self.agent
            .request(method, &self.table_url())
            .set("apikey", &self.config.service_key)
            .set("Authorization", &format!("Bearer {}", self.config.service_key))
    }

    /// Select a single id to confirm the URL, key and table are usable.
    pub fn test_connection(&self) -> Result<(), StoreError> {
        self.request("GET").query("select", "id").query("limit", "1").call()?;
        info!(table = %self.config.table, "store connection ok");
        Ok(())
    }

    /// Delete every row of the table.
    pub fn clear_existing(&self) -> Result<(), StoreError> {
        self.request("DELETE").query("id", "neq.0").call()?;
        info!(table = %self.config.table, "cleared existing rows");
        Ok(())
    }

    /// Insert rows in batches of [`INSERT_BATCH_SIZE`]. Returns the number inserted.
    pub fn insert_records(&self, records: &[EnrichedRecord]) -> Result<usize, StoreError> {
        let rows: Vec<StoreRow> = records.iter().map(StoreRow::from).collect();
        for (i, batch) in rows.chunks(INSERT_BATCH_SIZE).enumerate() {
            let body = serde_json::to_value(batch)
                .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
            self.request("POST")
                .set("Prefer", "return=minimal")
                .send_json(body)?;
            info!(batch = i + 1, rows = batch.len(), "inserted batch");
        }
        info!(total = rows.len(), table = %self.config.table, "rows inserted");
        Ok(rows.len())
    }

    /// Exact row count of the table.
    pub fn count(&self) -> Result<u64, StoreError> {
        let response = self
            .request("GET")
            .set("Prefer", "count=exact")
            .set("Range", "0-0")
            .query("select", "id")
            .call()?;
        let header = response
            .header("Content-Range")
            .ok_or_else(|| StoreError::InvalidResponse("missing Content-Range header".into()))?;
        parse_content_range_total(header).ok_or_else(|| {
            warn!(header, "unparseable Content-Range");
            StoreError::InvalidResponse(format!("bad Content-Range '{}'", header))
        })
    }
}

/// Total from a PostgREST `Content-Range` header such as `0-0/57` or `*/0`.
fn parse_content_range_total(header: &str) -> Option<u64> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeocodeMethod;
    use crate::records::{CanonicalRecord, WithinThreshold};

    #[test]
    fn test_content_range_total() {
        assert_eq!(parse_content_range_total("0-0/57"), Some(57));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-24/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[test]
    fn test_row_mapping() {
        let rec = EnrichedRecord {
            record: CanonicalRecord {
                source: "logs.com".into(),
                date: "09/03/2025".into(),
                priority_letter: "R".into(),
                firm: "Logs.com".into(),
                address: "300 Fox Run, Murfreesboro, TN 37130".into(),
                city: "Murfreesboro".into(),
                ..Default::default()
            },
            within_threshold: WithinThreshold::No,
            closest_reference: Some("Nashville".into()),
            distance_miles: Some(29.6),
            estimated_drive_minutes: Some(39.0),
            geocode_method: GeocodeMethod::FullAddress,
        };
        let row = StoreRow::from(&rec);
        assert_eq!(row.time, "");
        assert_eq!(row.pl, "R");
        assert_eq!(row.within_30min, "No");
        assert_eq!(row.est_drive_time.as_deref(), Some("39"));
        assert_eq!(row.geocode_method, "full_address");

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["city"], "Murfreesboro");
        assert_eq!(json["closest_city"], "Nashville");
        assert_eq!(json["time"], "");
    }

    #[test]
    fn test_unresolved_row_matches_csv_text() {
        let row = StoreRow::from(&EnrichedRecord::unresolved(CanonicalRecord::default()));
        assert_eq!(row.within_30min, "Unknown");
        assert_eq!(row.closest_city, "Unknown");
        assert_eq!(row.time, "");
        assert!(row.distance_miles.is_none() && row.est_drive_time.is_none());

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["closest_city"], "Unknown");
        assert_eq!(json["time"], "");
    }
}
