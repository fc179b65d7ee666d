use clap::{Args, Parser, Subcommand};
use foreclosure_atlas::config::{
    PipelineConfig, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_FILE, DEFAULT_THRESHOLD_MINUTES,
};
use foreclosure_atlas::geo::providers::{DEFAULT_NOMINATIM_URL, DEFAULT_USER_AGENT};
use foreclosure_atlas::pipeline::{run_batch, BatchReport};
use foreclosure_atlas::store::SupabaseClient;
use std::path::PathBuf;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Foreclosure Atlas: unified foreclosure-auction listings for Middle Tennessee
///
/// Normalizes the per-source scraper CSVs into one table, geocodes every
/// listing and flags those within driving range of Nashville / Mt. Juliet.
///
/// Examples:
///   atlas run --input-dir scraped --output data/processed/unified_data.csv
///   atlas run --offline --threshold 45
///   atlas serve --port 8080
///   atlas store count
#[derive(Parser)]
#[command(name = "atlas", version, about, long_about = None)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one batch: normalize, dedupe, geocode, write CSV.
    Run(RunArgs),
    /// Serve the HTTP trigger.
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, short = 'p', default_value_t = 3000)]
        port: u16,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Row store maintenance.
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
}

#[derive(Subcommand)]
enum StoreAction {
    /// Check that the table is reachable.
    Ping,
    /// Print the number of stored rows.
    Count,
    /// Delete every stored row.
    Clear,
}

#[derive(Args, Clone)]
struct RunArgs {
    /// Directory holding the scraper CSV files.
    #[arg(long, default_value = DEFAULT_INPUT_DIR)]
    input_dir: PathBuf,

    /// Unified CSV to write.
    #[arg(long, short = 'o', default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Drive-time threshold in minutes (inclusive).
    #[arg(long, default_value_t = DEFAULT_THRESHOLD_MINUTES)]
    threshold: f64,

    /// Minimum milliseconds between successive geocoded records.
    #[arg(long, default_value_t = 300)]
    delay_ms: u64,

    /// Offline mode: only use cache and built-in tables.
    #[arg(long)]
    offline: bool,

    /// Skip the on-disk geocode cache.
    #[arg(long)]
    no_cache: bool,

    /// Geocode cache file (defaults to ~/.foreclosure_atlas/geocode_cache.json).
    #[arg(long)]
    cache_file: Option<PathBuf>,

    /// Nominatim-compatible search endpoint.
    #[arg(long, default_value = DEFAULT_NOMINATIM_URL)]
    nominatim_url: String,

    /// User agent sent to the geocoder.
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Geocoder timeout in seconds.
    #[arg(long, default_value_t = 15)]
    timeout_secs: u64,

    /// Push the enriched rows to the row store.
    #[arg(long)]
    push: bool,

    /// Clear the row store table before pushing.
    #[arg(long, requires = "push")]
    clear: bool,
}

impl RunArgs {
    fn into_config(self) -> PipelineConfig {
        PipelineConfig {
            input_dir: self.input_dir,
            output_path: self.output,
            threshold_minutes: self.threshold,
            request_delay: Duration::from_millis(self.delay_ms),
            offline: self.offline,
            use_cache: !self.no_cache,
            cache_path: self.cache_file,
            nominatim_url: self.nominatim_url,
            user_agent: self.user_agent,
            geocode_timeout: Duration::from_secs(self.timeout_secs),
            push_to_store: self.push,
            clear_store: self.clear,
            ..Default::default()
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("foreclosure_atlas=info,atlas=info,tower_http=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let result = match cli.command {
        Command::Run(args) => cmd_run(args.into_config()),
        Command::Serve { host, port, run } => cmd_serve(&host, port, run.into_config()),
        Command::Store { action } => cmd_store(action),
    };

    if let Err(msg) = result {
        error!("{}", msg);
        eprintln!("Error: {}", msg);
        std::process::exit(1);
    }
}

// ─── Commands ────────────────────────────────────────────────────

fn cmd_run(config: PipelineConfig) -> Result<(), String> {
    let report = run_batch(&config).map_err(|e| e.to_string())?;
    print_report(&report, config.threshold_minutes);
    Ok(())
}

fn cmd_serve(host: &str, port: u16, config: PipelineConfig) -> Result<(), String> {
    let runtime = tokio::runtime::Runtime::new().map_err(|e| format!("Cannot start runtime: {}", e))?;
    runtime
        .block_on(foreclosure_atlas::server::start(host, port, config))
        .map_err(|e| format!("Server error on {}:{}: {}", host, port, e))
}

fn cmd_store(action: StoreAction) -> Result<(), String> {
    let client = SupabaseClient::from_env().map_err(|e| e.to_string())?;
    match action {
        StoreAction::Ping => {
            client.test_connection().map_err(|e| e.to_string())?;
            println!("Connected to table '{}'", client.table());
        }
        StoreAction::Count => {
            let n = client.count().map_err(|e| e.to_string())?;
            println!("{}", n);
        }
        StoreAction::Clear => {
            client.clear_existing().map_err(|e| e.to_string())?;
            println!("Cleared table '{}'", client.table());
        }
    }
    Ok(())
}

// ─── Output ──────────────────────────────────────────────────────

fn print_report(report: &BatchReport, threshold: f64) {
    println!();
    println!("  Foreclosure Atlas: batch complete");
    println!("  ──────────────────────────────────");
    for s in &report.sources {
        println!("  {:<16} {:>5} records", s.source, s.records);
    }
    println!("  {:<16} {:>5}", "loaded", report.loaded);
    println!("  {:<16} {:>5}", "removed", report.removed);
    println!("  {:<16} {:>5}", "unified", report.records);
    println!();
    println!(
        "  Geocoded {}/{} ({:.1}%), {} within {} min",
        report.stats.successes(),
        report.stats.total,
        report.stats.success_rate(),
        report.stats.within_threshold,
        threshold
    );
    for (method, n) in &report.stats.by_method {
        println!("    {:<16} {:>5}", method.as_str(), n);
    }
    for (name, avg) in report.stats.reference_averages() {
        println!("    within, avg to {:<10} {:>6.1} mi", name, avg);
    }
    if let Some(pushed) = report.pushed {
        println!("  Pushed {} rows to the row store", pushed);
    }
    println!("  Saved to {}", report.output_path.display());
    println!();
}
