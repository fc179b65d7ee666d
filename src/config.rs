//! Batch configuration.
//!
//! Built from CLI flags in the binary; [`Default`] gives the values the
//! scrapers and the HTTP trigger expect.

use crate::geo::providers::{DEFAULT_NOMINATIM_URL, DEFAULT_USER_AGENT};
use crate::geo::{default_references, GeocodeCache, ReferenceLocation, Region};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_INPUT_DIR: &str = ".";
pub const DEFAULT_OUTPUT_FILE: &str = "data/processed/unified_data.csv";
pub const DEFAULT_THRESHOLD_MINUTES: f64 = 30.0;
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(300);
pub const DEFAULT_GEOCODE_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding the per-source CSV files.
    pub input_dir: PathBuf,
    pub output_path: PathBuf,
    /// Inclusive drive-time limit for `WITHIN_30MIN`.
    pub threshold_minutes: f64,
    /// Minimum spacing between successive records' geocoding.
    pub request_delay: Duration,
    pub offline: bool,
    pub use_cache: bool,
    /// `None` means the default cache location.
    pub cache_path: Option<PathBuf>,
    pub nominatim_url: String,
    pub user_agent: String,
    pub geocode_timeout: Duration,
    pub region: Region,
    pub references: Vec<ReferenceLocation>,
    /// Push the enriched rows to the row store after writing the CSV.
    pub push_to_store: bool,
    /// Clear the store table before pushing.
    pub clear_store: bool,
}

impl PipelineConfig {
    pub fn cache_file(&self) -> PathBuf {
        self.cache_path.clone().unwrap_or_else(GeocodeCache::default_path)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            threshold_minutes: DEFAULT_THRESHOLD_MINUTES,
            request_delay: DEFAULT_REQUEST_DELAY,
            offline: false,
            use_cache: true,
            cache_path: None,
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            geocode_timeout: DEFAULT_GEOCODE_TIMEOUT,
            region: Region::tennessee(),
            references: default_references(),
            push_to_store: false,
            clear_store: false,
        }
    }
}
