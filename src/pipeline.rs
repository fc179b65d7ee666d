//! Enrichment pipeline and batch runner.
//!
//! Flow: per-source CSV → normalize → concatenate → dedupe → geocode and
//! classify each record → unified CSV → optional row store push.

use crate::config::PipelineConfig;
use crate::dedup::dedupe;
use crate::distance::classify_proximity;
use crate::error::PipelineError;
use crate::geo::{GeoResolver, GeocodeCache, GeocodeMethod, Geocoder, NominatimClient, ReferenceLocation};
use crate::normalize::{load_file, normalize_table, SourceKind};
use crate::output::write_csv;
use crate::records::{CanonicalRecord, EnrichedRecord, WithinThreshold};
use crate::store::SupabaseClient;
use governor::clock::{Clock, DefaultClock};
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

const PROGRESS_EVERY: usize = 5;

// ─── Rate limiting ───────────────────────────────────────────────

/// Enforces a minimum interval between successive calls to [`wait`],
/// backed by a single-cell GCRA limiter. A zero interval never waits.
///
/// [`wait`]: RateLimiter::wait
pub struct RateLimiter {
    inner: Option<Governor<NotKeyed, InMemoryState, DefaultClock>>,
    clock: DefaultClock,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        let clock = DefaultClock::default();
        let inner = Quota::with_period(interval).map(|quota| Governor::direct_with_clock(quota, &clock));
        Self { inner, clock }
    }

    /// Block until the next call is allowed. The first call returns immediately.
    pub fn wait(&mut self) {
        let Some(limiter) = &self.inner else {
            return;
        };
        while let Err(not_until) = limiter.check() {
            thread::sleep(not_until.wait_time_from(self.clock.now()));
        }
    }
}

// ─── Statistics ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
struct ReferenceTally {
    records: usize,
    total_miles: f64,
}

/// Per-batch geocoding counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GeocodeStats {
    pub total: usize,
    /// Records per cascade step, failures included.
    pub by_method: BTreeMap<GeocodeMethod, usize>,
    pub within_threshold: usize,
    #[serde(skip)]
    references: BTreeMap<String, ReferenceTally>,
}

impl GeocodeStats {
    pub fn record(&mut self, rec: &EnrichedRecord) {
        self.total += 1;
        *self.by_method.entry(rec.geocode_method).or_default() += 1;
        if rec.within_threshold != WithinThreshold::Yes {
            return;
        }
        self.within_threshold += 1;
        if let (Some(name), Some(miles)) = (&rec.closest_reference, rec.distance_miles) {
            let tally = self.references.entry(name.clone()).or_default();
            tally.records += 1;
            tally.total_miles += miles;
        }
    }

    pub fn count(&self, method: GeocodeMethod) -> usize {
        self.by_method.get(&method).copied().unwrap_or(0)
    }

    pub fn failures(&self) -> usize {
        self.count(GeocodeMethod::Failed)
    }

    pub fn successes(&self) -> usize {
        self.total - self.failures()
    }

    /// Percentage of records placed on the map; 0 for an empty batch.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.successes() as f64 / self.total as f64 * 100.0
    }

    /// Average distance of the within-threshold records, grouped by their
    /// closest reference.
    pub fn reference_averages(&self) -> Vec<(String, f64)> {
        self.references
            .iter()
            .map(|(name, t)| (name.clone(), t.total_miles / t.records as f64))
            .collect()
    }

    fn log_summary(&self) {
        info!(
            total = self.total,
            successes = self.successes(),
            success_rate = %format!("{:.1}%", self.success_rate()),
            within_threshold = self.within_threshold,
            "geocoding complete"
        );
        for method in GeocodeMethod::ALL {
            let n = self.count(method);
            if n > 0 {
                info!(method = %method, records = n, "geocode method");
            }
        }
        for (name, avg) in self.reference_averages() {
            info!(reference = %name, avg_miles = %format!("{:.1}", avg), "within-threshold average by closest reference");
        }
    }
}

// ─── Enrichment ──────────────────────────────────────────────────

/// Sequential geocode-then-classify over a batch of records.
pub struct EnrichmentPipeline<G> {
    resolver: GeoResolver<G>,
    references: Vec<ReferenceLocation>,
    threshold_minutes: f64,
    limiter: RateLimiter,
}

impl<G: Geocoder> EnrichmentPipeline<G> {
    pub fn new(
        resolver: GeoResolver<G>,
        references: Vec<ReferenceLocation>,
        threshold_minutes: f64,
        request_delay: Duration,
    ) -> Self {
        Self {
            resolver,
            references,
            threshold_minutes,
            limiter: RateLimiter::new(request_delay),
        }
    }

    /// Geocode and classify one record. An empty address is marked failed
    /// without touching the resolver or the rate limiter.
    pub fn enrich_one(&mut self, record: CanonicalRecord) -> EnrichedRecord {
        if record.address.trim().is_empty() {
            return EnrichedRecord::unresolved(record);
        }

        self.limiter.wait();
        let resolution = self.resolver.resolve(&record.address, &record.city);
        let proximity = classify_proximity(resolution.point, &self.references, self.threshold_minutes);

        EnrichedRecord {
            record,
            within_threshold: proximity.within,
            closest_reference: proximity.closest,
            distance_miles: proximity.distance_miles,
            estimated_drive_minutes: proximity.drive_minutes,
            geocode_method: resolution.method,
        }
    }

    pub fn enrich(&mut self, records: Vec<CanonicalRecord>) -> (Vec<EnrichedRecord>, GeocodeStats) {
        let total = records.len();
        info!(
            total,
            threshold_minutes = self.threshold_minutes,
            "enriching records"
        );

        let mut stats = GeocodeStats::default();
        let mut out = Vec::with_capacity(total);
        for (i, record) in records.into_iter().enumerate() {
            let enriched = self.enrich_one(record);
            stats.record(&enriched);
            out.push(enriched);

            let done = i + 1;
            if done % PROGRESS_EVERY == 0 {
                info!(processed = done, total, successes = stats.successes(), "progress");
            }
        }

        stats.log_summary();
        (out, stats)
    }
}

// ─── Batch runner ────────────────────────────────────────────────

/// Records contributed by one source.
#[derive(Debug, Clone, Serialize)]
pub struct SourceCount {
    pub source: &'static str,
    pub records: usize,
}

/// What a completed batch did.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub sources: Vec<SourceCount>,
    /// Records after concatenation, before deduplication.
    pub loaded: usize,
    /// Blank and duplicate records dropped.
    pub removed: usize,
    pub records: usize,
    pub stats: GeocodeStats,
    pub output_path: PathBuf,
    /// Rows pushed to the row store, when enabled.
    pub pushed: Option<usize>,
}

/// Run a full batch against the configured Nominatim endpoint.
pub fn run_batch(config: &PipelineConfig) -> Result<BatchReport, PipelineError> {
    let geocoder = NominatimClient::new(&config.nominatim_url, &config.user_agent, config.geocode_timeout);
    run_batch_with(config, geocoder)
}

/// Run a full batch with the given geocoder.
pub fn run_batch_with<G: Geocoder>(config: &PipelineConfig, geocoder: G) -> Result<BatchReport, PipelineError> {
    let (combined, sources) = load_sources(&config.input_dir);
    if combined.is_empty() {
        return Err(PipelineError::NoRecords);
    }
    let loaded = combined.len();
    info!(loaded, sources = sources.iter().filter(|s| s.records > 0).count(), "combined sources");

    let unique = dedupe(combined);
    let removed = loaded - unique.len();

    let mut resolver = GeoResolver::new(geocoder, config.region.clone());
    if config.use_cache {
        resolver = resolver.with_cache(GeocodeCache::load_from(config.cache_file()));
    }
    resolver.set_offline(config.offline);

    let mut pipeline = EnrichmentPipeline::new(
        resolver,
        config.references.clone(),
        config.threshold_minutes,
        if config.offline { Duration::ZERO } else { config.request_delay },
    );
    let (enriched, stats) = pipeline.enrich(unique);

    write_csv(&config.output_path, &enriched)?;
    info!(path = %config.output_path.display(), records = enriched.len(), "wrote unified table");

    let pushed = if config.push_to_store {
        Some(push_to_store(&enriched, config.clear_store)?)
    } else {
        None
    };

    Ok(BatchReport {
        sources,
        loaded,
        removed,
        records: enriched.len(),
        stats,
        output_path: config.output_path.clone(),
        pushed,
    })
}

/// Load and normalize every source in concatenation order. Missing or
/// unreadable files contribute zero records.
pub fn load_sources(dir: &Path) -> (Vec<CanonicalRecord>, Vec<SourceCount>) {
    let mut combined = Vec::new();
    let mut counts = Vec::with_capacity(SourceKind::ALL.len());

    for kind in SourceKind::ALL {
        let path = dir.join(kind.default_file_name());
        let normalized = if !path.exists() {
            info!(source = %kind, path = %path.display(), "source file not found, skipping");
            Vec::new()
        } else {
            match load_file(kind, &path) {
                Ok(rows) => {
                    let records = normalize_table(kind, &rows);
                    info!(source = %kind, rows = rows.len(), records = records.len(), "normalized source");
                    records
                }
                Err(e) => {
                    warn!(source = %kind, error = %e, "could not read source, skipping");
                    Vec::new()
                }
            }
        };
        counts.push(SourceCount {
            source: kind.name(),
            records: normalized.len(),
        });
        combined.extend(normalized);
    }

    (combined, counts)
}

fn push_to_store(records: &[EnrichedRecord], clear: bool) -> Result<usize, PipelineError> {
    let client = SupabaseClient::from_env()?;
    client.test_connection()?;
    if clear {
        client.clear_existing()?;
    }
    Ok(client.insert_records(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::{estimate_drive_minutes, haversine_miles};
    use crate::geo::{default_references, Candidate, GeoError, GeoPoint, Region, SearchQuery};
    use std::cell::Cell;
    use std::fs;
    use std::time::Instant;
    use tempfile::TempDir;

    type SearchResult = Result<Vec<Candidate>, GeoError>;

    fn unreachable_network(_: &SearchQuery) -> SearchResult {
        Err(GeoError::Network("timed out".into()))
    }

    fn pipeline<G: Geocoder>(geocoder: G, offline: bool, threshold: f64) -> EnrichmentPipeline<G> {
        let mut resolver = GeoResolver::new(geocoder, Region::tennessee());
        resolver.set_offline(offline);
        EnrichmentPipeline::new(resolver, default_references(), threshold, Duration::ZERO)
    }

    fn rec(address: &str, city: &str) -> CanonicalRecord {
        CanonicalRecord {
            address: address.into(),
            city: city.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_rate_limiter_spacing() {
        let mut limiter = RateLimiter::new(Duration::from_millis(20));
        let start = Instant::now();
        limiter.wait();
        assert!(start.elapsed() < Duration::from_millis(20));
        limiter.wait();
        limiter.wait();
        assert!(start.elapsed() >= Duration::from_millis(35));
    }

    #[test]
    fn test_zero_interval_never_waits() {
        let mut limiter = RateLimiter::new(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..100 {
            limiter.wait();
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_offline_zip_record() {
        let mut p = pipeline(unreachable_network, true, 30.0);
        let out = p.enrich_one(rec("123 Main St, Nashville, TN 37201", "Nashville"));
        assert_eq!(out.geocode_method, GeocodeMethod::ZipCode);
        assert_eq!(out.within_threshold, WithinThreshold::Yes);
        assert_eq!(out.closest_reference.as_deref(), Some("Nashville"));
        assert_eq!(out.distance_miles, Some(0.0));
        assert_eq!(out.estimated_drive_minutes, Some(0.0));
    }

    #[test]
    fn test_unresolvable_record() {
        let mut p = pipeline(unreachable_network, false, 30.0);
        let out = p.enrich_one(rec("77 Nowhere Rd", ""));
        assert_eq!(out, EnrichedRecord::unresolved(rec("77 Nowhere Rd", "")));
        assert_eq!(out.closest_reference_label(), "Unknown");
    }

    #[test]
    fn test_threshold_exactly_met() {
        let point = GeoPoint::new(35.9251, -86.8689);
        let geocoder = move |_: &SearchQuery| -> SearchResult {
            Ok(vec![Candidate {
                point,
                display_name: "Franklin, Williamson County, Tennessee".into(),
                state: Some("Tennessee".into()),
            }])
        };
        let refs = default_references();
        let miles = haversine_miles(point.lat, point.lon, refs[0].point.lat, refs[0].point.lon);
        let exact = estimate_drive_minutes(miles);

        let mut p = pipeline(geocoder, false, exact);
        let out = p.enrich_one(rec("1 Main St, Franklin, TN", "Franklin"));
        assert_eq!(out.geocode_method, GeocodeMethod::FullAddress);
        assert_eq!(out.within_threshold, WithinThreshold::Yes);
    }

    #[test]
    fn test_empty_address_skips_geocoder() {
        let calls = Cell::new(0);
        let geocoder = |_: &SearchQuery| -> SearchResult {
            calls.set(calls.get() + 1);
            Ok(vec![])
        };
        let mut p = pipeline(geocoder, false, 30.0);
        let out = p.enrich_one(rec("   ", "Nashville"));
        assert_eq!(out.geocode_method, GeocodeMethod::Failed);
        assert_eq!(out.within_threshold, WithinThreshold::Unknown);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_enrich_stats() {
        let mut p = pipeline(unreachable_network, true, 30.0);
        let (out, stats) = p.enrich(vec![
            rec("123 Main St, Nashville, TN 37201", ""),
            rec("9 Elm St", "Hermitage"),
            rec("77 Nowhere Rd", ""),
            rec("", ""),
        ]);
        assert_eq!(out.len(), 4);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.count(GeocodeMethod::ZipCode), 1);
        assert_eq!(stats.count(GeocodeMethod::CityFallback), 1);
        assert_eq!(stats.failures(), 2);
        assert_eq!(stats.successes(), 2);
        assert!((stats.success_rate() - 50.0).abs() < 1e-9);
        assert_eq!(stats.within_threshold, 2);

        let averages = stats.reference_averages();
        assert_eq!(averages.len(), 2);
        assert!(averages.iter().any(|(name, avg)| name == "Nashville" && *avg == 0.0));
    }

    #[test]
    fn test_averages_ignore_records_outside_threshold() {
        let placed = |within, miles| EnrichedRecord {
            record: rec("1 Main St", ""),
            within_threshold: within,
            closest_reference: Some("Nashville".to_string()),
            distance_miles: Some(miles),
            estimated_drive_minutes: Some(miles),
            geocode_method: GeocodeMethod::FullAddress,
        };
        let mut stats = GeocodeStats::default();
        stats.record(&placed(WithinThreshold::Yes, 4.0));
        stats.record(&placed(WithinThreshold::Yes, 6.0));
        stats.record(&placed(WithinThreshold::No, 80.0));

        assert_eq!(stats.total, 3);
        assert_eq!(stats.within_threshold, 2);
        assert_eq!(stats.reference_averages(), vec![("Nashville".to_string(), 5.0)]);
    }

    // ─── Batch ───────────────────────────────────────────────────

    fn batch_config(dir: &TempDir) -> PipelineConfig {
        PipelineConfig {
            input_dir: dir.path().to_path_buf(),
            output_path: dir.path().join("out").join("unified.csv"),
            offline: true,
            use_cache: false,
            request_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    #[test]
    fn test_batch_end_to_end() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(SourceKind::ClearRecon.default_file_name()),
            "SourceWebsite,TrusteeSaleNumber,PropertyAddress,SaleDate,CurrentBid\n\
             clearrecon-tn.com,TS-1,\"123 Main St, Nashville, TN 37201\",07/04/2025,\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(SourceKind::Wilson.default_file_name()),
            "SourceWebsite,SaleDate,SaleTime,PropertyAddress,City,County\n\
             wilson-assoc.com,07/04/2025,10:00 AM,\"123 Main St, Nashville, TN 37201\",Nashville,Davidson\n\
             wilson-assoc.com,08/01/2025,11:00 AM,77 Nowhere Rd,,\n",
        )
        .unwrap();

        let cfg = batch_config(&dir);
        let report = run_batch_with(&cfg, unreachable_network).unwrap();
        assert_eq!(report.loaded, 3);
        assert_eq!(report.removed, 1);
        assert_eq!(report.records, 2);
        assert_eq!(report.sources.len(), 5);
        assert_eq!(report.sources[0].records, 1);
        assert_eq!(report.sources[4].records, 2);
        assert!(report.pushed.is_none());

        let text = fs::read_to_string(&cfg.output_path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("clearrecon-tn.com,07/04/2025,,,ClearRecon,"));
        assert!(lines[1].ends_with(",Yes,Nashville,0.0,0,zip_code"));
        assert!(lines[2].ends_with(",Unknown,Unknown,,,failed"));
    }

    #[test]
    fn test_batch_without_records_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let cfg = batch_config(&dir);
        let err = run_batch_with(&cfg, unreachable_network).unwrap_err();
        assert!(matches!(err, PipelineError::NoRecords));
        assert!(!cfg.output_path.exists());
    }

    #[test]
    fn test_unreadable_source_is_skipped() {
        let dir = TempDir::new().unwrap();
        // A directory where a file is expected cannot be opened as CSV.
        fs::create_dir(dir.path().join(SourceKind::TnLedger.default_file_name())).unwrap();
        fs::write(
            dir.path().join(SourceKind::PowerBi.default_file_name()),
            "COUNTY_NAME,FULL_ADDRESS,SALE_DATE\nDavidson,\"5 Oak Ave, Antioch, TN 37013\",2025-09-01\n",
        )
        .unwrap();

        let (records, counts) = load_sources(dir.path());
        assert_eq!(records.len(), 1);
        assert_eq!(counts[2].records, 0);
        assert_eq!(counts[3].records, 1);
    }
}
